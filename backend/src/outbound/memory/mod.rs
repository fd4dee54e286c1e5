//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by the HTTP and behaviour
//! tests. All state lives behind one mutex, so each port call is atomic with
//! respect to every other call: the application compare-and-set, the
//! club-with-admin insert and club deletion all run under a single lock
//! acquisition.
//!
//! Uniqueness constraints mirror the PostgreSQL schema (unique email, one
//! pending application per student and club, one club per admin). Deletion
//! walks [`CLUB_DELETION_CASCADE`] and [`USER_DELETION_CASCADE`] the way the
//! database walks its foreign keys.

mod accounts;
mod applications;
mod clubs;
mod posts;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    ApplicationId, CLUB_DELETION_CASCADE, CascadeAction, CascadeRule, Club, ClubApplication,
    ClubId, ClubMember, Comment, CommentId, Notification, NotificationId, Post, PostId,
    USER_DELETION_CASCADE, University, UniversityId, UserAccount, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

/// Shared in-memory store. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserAccount>,
    universities: BTreeMap<UniversityId, University>,
    clubs: BTreeMap<ClubId, Club>,
    follows: BTreeSet<(UserId, ClubId)>,
    members: BTreeMap<(ClubId, UserId), ClubMember>,
    applications: BTreeMap<ApplicationId, ClubApplication>,
    notifications: BTreeMap<NotificationId, Notification>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    likes: BTreeSet<(PostId, UserId)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `apply` with exclusive access to the state.
    fn with_state<T, E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
        apply: impl FnOnce(&mut MemoryState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut state = self.state.lock().map_err(|_| poisoned(POISONED))?;
        apply(&mut state)
    }

    /// Run an infallible read against the state.
    fn read<T, E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
        view: impl FnOnce(&MemoryState) -> T,
    ) -> Result<T, E> {
        let state = self.state.lock().map_err(|_| poisoned(POISONED))?;
        Ok(view(&state))
    }
}

impl MemoryState {
    fn email_taken(&self, account: &UserAccount) -> bool {
        self.users
            .values()
            .any(|existing| existing.user.email == account.user.email)
    }

    /// Remove a club and everything the cascade rules attach to it.
    fn delete_club(&mut self, id: &ClubId) -> bool {
        let Some(club) = self.clubs.remove(id) else {
            return false;
        };
        self.cascade_from("clubs", &BTreeSet::from([*id.as_uuid()]));
        for rule in CLUB_DELETION_CASCADE
            .iter()
            .filter(|rule| rule.action == CascadeAction::DeleteReferenced)
        {
            match (rule.dependent, rule.column) {
                ("clubs", "admin_id") => {
                    self.delete_user(&club.admin);
                }
                (dependent, column) => {
                    warn!(dependent, column, "no in-memory handler for referenced deletion");
                }
            }
        }
        true
    }

    fn delete_user(&mut self, id: &UserId) -> bool {
        if self.users.remove(id).is_none() {
            return false;
        }
        self.cascade_from("users", &BTreeSet::from([*id.as_uuid()]));
        true
    }

    /// Apply every rule whose parent table lost `removed` rows, recursing
    /// into tables that lose rows in turn.
    fn cascade_from(&mut self, parent: &str, removed: &BTreeSet<Uuid>) {
        if removed.is_empty() {
            return;
        }
        for rule in CLUB_DELETION_CASCADE.iter().chain(USER_DELETION_CASCADE) {
            if rule.parent != parent || rule.action == CascadeAction::DeleteReferenced {
                continue;
            }
            let dependents = self.apply_rule(rule, removed);
            self.cascade_from(rule.dependent, &dependents);
        }
    }

    /// Apply one rule and return the ids of the rows it deleted.
    fn apply_rule(&mut self, rule: &CascadeRule, parents: &BTreeSet<Uuid>) -> BTreeSet<Uuid> {
        let hit = |id: &Uuid| parents.contains(id);
        match (rule.dependent, rule.column, rule.action) {
            ("posts", "club_id", CascadeAction::Delete) => {
                drain(&mut self.posts, |post| hit(post.club.as_uuid()), |id| *id.as_uuid())
            }
            ("posts", "author_id", CascadeAction::Delete) => {
                drain(&mut self.posts, |post| hit(post.author.as_uuid()), |id| *id.as_uuid())
            }
            ("post_comments", "post_id", CascadeAction::Delete) => drain(
                &mut self.comments,
                |comment| hit(comment.post.as_uuid()),
                |id| *id.as_uuid(),
            ),
            ("post_comments", "author_id", CascadeAction::Delete) => drain(
                &mut self.comments,
                |comment| hit(comment.author.as_uuid()),
                |id| *id.as_uuid(),
            ),
            ("post_likes", "post_id", CascadeAction::Delete) => {
                self.likes.retain(|(post, _)| !hit(post.as_uuid()));
                BTreeSet::new()
            }
            ("post_likes", "user_id", CascadeAction::Delete) => {
                self.likes.retain(|(_, user)| !hit(user.as_uuid()));
                BTreeSet::new()
            }
            ("club_applications", "club_id", CascadeAction::Delete) => drain(
                &mut self.applications,
                |application| hit(application.club.as_uuid()),
                |id| *id.as_uuid(),
            ),
            ("club_applications", "user_id", CascadeAction::Delete) => drain(
                &mut self.applications,
                |application| hit(application.user.as_uuid()),
                |id| *id.as_uuid(),
            ),
            ("notifications", "application_id", CascadeAction::Detach) => {
                for notification in self.notifications.values_mut() {
                    if notification
                        .application
                        .is_some_and(|application| hit(application.as_uuid()))
                    {
                        notification.application = None;
                    }
                }
                BTreeSet::new()
            }
            ("notifications", "user_id", CascadeAction::Delete) => drain(
                &mut self.notifications,
                |notification| hit(notification.user.as_uuid()),
                |id| *id.as_uuid(),
            ),
            ("club_members", "club_id", CascadeAction::Delete) => {
                self.members.retain(|(club, _), _| !hit(club.as_uuid()));
                BTreeSet::new()
            }
            ("club_members", "user_id", CascadeAction::Delete) => {
                self.members.retain(|(_, user), _| !hit(user.as_uuid()));
                BTreeSet::new()
            }
            ("follows", "club_id", CascadeAction::Delete) => {
                self.follows.retain(|(_, club)| !hit(club.as_uuid()));
                BTreeSet::new()
            }
            ("follows", "user_id", CascadeAction::Delete) => {
                self.follows.retain(|(user, _)| !hit(user.as_uuid()));
                BTreeSet::new()
            }
            (dependent, column, action) => {
                warn!(dependent, column, ?action, "no in-memory handler for cascade rule");
                BTreeSet::new()
            }
        }
    }
}

/// Remove matching rows from `rows`, returning the removed keys as UUIDs.
fn drain<K: Ord, V>(
    rows: &mut BTreeMap<K, V>,
    matches: impl Fn(&V) -> bool,
    key: impl Fn(&K) -> Uuid,
) -> BTreeSet<Uuid> {
    let mut removed = BTreeSet::new();
    rows.retain(|id, row| {
        if matches(row) {
            removed.insert(key(id));
            false
        } else {
            true
        }
    });
    removed
}
