//! Role authorization gate.
//!
//! Every request carries a [`RequestContext`] holding an optional
//! [`Principal`]. Services ask [`AuthorizationGate::authorize`] whether the
//! principal may perform an [`Action`]; the answer is always a [`Decision`],
//! never a panic or an error. Callers convert denials into domain errors with
//! [`Decision::into_result`].
//!
//! Route-level checks use [`RouteScope::for_path`], which only inspects the
//! role. Ownership is checked once the target resource has been loaded.

use serde::Serialize;
use tracing::debug;

use super::{Error, Role, UniversityId, User, UserId};

/// Universities a university admin may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "university")]
pub enum UniversityScope {
    /// Every university.
    Global,
    /// A single university.
    University(UniversityId),
}

impl UniversityScope {
    /// Whether the scope includes `target`.
    #[must_use]
    pub fn covers(&self, target: &UniversityId) -> bool {
        match self {
            Self::Global => true,
            Self::University(own) => own == target,
        }
    }
}

/// Authenticated identity attached to a request, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A student of `university`.
    Student {
        /// Account id.
        id: UserId,
        /// Home university.
        university: UniversityId,
    },
    /// The admin of one club in `university`.
    ClubAdmin {
        /// Account id.
        id: UserId,
        /// University of the administered club.
        university: UniversityId,
    },
    /// A university administrator.
    UniversityAdmin {
        /// Account id.
        id: UserId,
        /// Universities the admin may manage.
        scope: UniversityScope,
    },
}

impl Principal {
    /// Build the principal for a stored user.
    ///
    /// Returns `None` for students and club admins without a university,
    /// which the account invariants rule out.
    #[must_use]
    pub fn from_user(user: &User) -> Option<Self> {
        match (user.role, user.university) {
            (Role::Student, Some(university)) => Some(Self::Student {
                id: user.id,
                university,
            }),
            (Role::ClubAdmin, Some(university)) => Some(Self::ClubAdmin {
                id: user.id,
                university,
            }),
            (Role::UniversityAdmin, university) => Some(Self::UniversityAdmin {
                id: user.id,
                scope: university.map_or(UniversityScope::Global, UniversityScope::University),
            }),
            (Role::Student | Role::ClubAdmin, None) => None,
        }
    }

    /// Account id of the principal.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Student { id, .. } | Self::ClubAdmin { id, .. } | Self::UniversityAdmin { id, .. } => {
                *id
            }
        }
    }

    /// Role of the principal.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::ClubAdmin { .. } => Role::ClubAdmin,
            Self::UniversityAdmin { .. } => Role::UniversityAdmin,
        }
    }
}

/// Request-scoped identity passed explicitly into every service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    principal: Option<Principal>,
}

impl RequestContext {
    /// Context for a request without a signed-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    /// Context for a signed-in user.
    #[must_use]
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// The signed-in principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Authorize `action` and return the acting principal.
    ///
    /// Anonymous requests are rejected even for actions the gate allows
    /// without identity, because the caller needs someone to act as.
    pub fn acting(&self, action: Action) -> Result<&Principal, Error> {
        AuthorizationGate::authorize(self, action).into_result(action)?;
        self.principal
            .as_ref()
            .ok_or_else(|| Error::unauthenticated(action.prompt()))
    }
}

/// Social actions open to every signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialAction {
    /// Follow or unfollow a club.
    Follow,
    /// Apply to a club or withdraw a pending application.
    Apply,
    /// Publish or delete a post.
    Post,
    /// Comment on a post.
    Comment,
    /// Like or unlike a post.
    Like,
}

/// Something a requester wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read public pages.
    Browse,
    /// Use the student area (feed, notifications, own applications).
    StudentArea,
    /// A mutating social action.
    Social(SocialAction),
    /// Manage the club administered by `admin`.
    ManageClub {
        /// Admin of the target club.
        admin: UserId,
    },
    /// Manage a university; `None` targets global administration.
    ManageUniversity {
        /// Target university.
        university: Option<UniversityId>,
    },
}

impl Action {
    fn prompt(self) -> &'static str {
        match self {
            Self::Social(SocialAction::Follow) => "sign in to follow clubs",
            Self::Social(SocialAction::Apply) => "sign in to apply to clubs",
            Self::Social(SocialAction::Post) => "sign in to post",
            Self::Social(SocialAction::Comment) => "sign in to comment",
            Self::Social(SocialAction::Like) => "sign in to like posts",
            Self::Browse
            | Self::StudentArea
            | Self::ManageClub { .. }
            | Self::ManageUniversity { .. } => "sign in to continue",
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity is attached to the request.
    Unauthenticated,
    /// The principal's role does not match.
    WrongRole,
    /// The principal does not own the target.
    NotOwner,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action may proceed.
    Allow,
    /// The action is refused.
    Deny(DenyReason),
}

impl Decision {
    /// Convert a denial into the matching domain error.
    pub fn into_result(self, action: Action) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Unauthenticated) => Err(Error::unauthenticated(action.prompt())),
            Self::Deny(DenyReason::WrongRole) => {
                Err(Error::wrong_role("your role does not permit this action"))
            }
            Self::Deny(DenyReason::NotOwner) => {
                Err(Error::not_owner("you can only manage what you administer"))
            }
        }
    }
}

/// Role required by a path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    /// No identity needed at the route level.
    Public,
    /// `/student/**` and `/me/posts/**`.
    Student,
    /// `/club/**`.
    ClubAdmin,
    /// `/university/**`.
    UniversityAdmin,
}

impl RouteScope {
    /// Resolve the scope for a request path by its leading segments.
    ///
    /// # Examples
    /// ```
    /// use campus_clubs::domain::RouteScope;
    ///
    /// assert_eq!(RouteScope::for_path("/club/1/members"), RouteScope::ClubAdmin);
    /// assert_eq!(RouteScope::for_path("/clubs/1"), RouteScope::Public);
    /// assert_eq!(RouteScope::for_path("/me/posts"), RouteScope::Student);
    /// ```
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let mut segments = path.trim_start_matches('/').split('/');
        match (segments.next(), segments.next()) {
            (Some("student"), _) | (Some("me"), Some("posts")) => Self::Student,
            (Some("club"), _) => Self::ClubAdmin,
            (Some("university"), _) => Self::UniversityAdmin,
            _ => Self::Public,
        }
    }
}

/// Stateless authorization rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Decide whether the request may perform `action`.
    #[must_use]
    pub fn authorize(ctx: &RequestContext, action: Action) -> Decision {
        let decision = match (action, ctx.principal()) {
            (Action::Browse, _) => Decision::Allow,
            (_, None) => Decision::Deny(DenyReason::Unauthenticated),
            (Action::Social(_), Some(_)) => Decision::Allow,
            (Action::StudentArea, Some(Principal::Student { .. })) => Decision::Allow,
            (Action::StudentArea, Some(_)) => Decision::Deny(DenyReason::WrongRole),
            (Action::ManageClub { admin }, Some(Principal::ClubAdmin { id, .. })) => {
                if *id == admin {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::NotOwner)
                }
            }
            (Action::ManageClub { .. }, Some(_)) => Decision::Deny(DenyReason::WrongRole),
            (
                Action::ManageUniversity { university },
                Some(Principal::UniversityAdmin { scope, .. }),
            ) => match (scope, university) {
                (UniversityScope::Global, _) => Decision::Allow,
                (UniversityScope::University(_), Some(target)) if scope.covers(&target) => {
                    Decision::Allow
                }
                (UniversityScope::University(_), _) => Decision::Deny(DenyReason::NotOwner),
            },
            (Action::ManageUniversity { .. }, Some(_)) => Decision::Deny(DenyReason::WrongRole),
        };
        if let Decision::Deny(reason) = decision {
            debug!(?action, ?reason, "authorization denied");
        }
        decision
    }

    /// Decide whether the request may enter a route scope (role only).
    #[must_use]
    pub fn authorize_scope(ctx: &RequestContext, scope: RouteScope) -> Decision {
        let required = match scope {
            RouteScope::Public => return Decision::Allow,
            RouteScope::Student => Role::Student,
            RouteScope::ClubAdmin => Role::ClubAdmin,
            RouteScope::UniversityAdmin => Role::UniversityAdmin,
        };
        match ctx.principal() {
            None => Decision::Deny(DenyReason::Unauthenticated),
            Some(principal) if principal.role() == required => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::WrongRole),
        }
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
