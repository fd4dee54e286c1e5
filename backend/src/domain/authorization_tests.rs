//! Tests for the authorization gate rules.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::{Email, ErrorCode};

#[fixture]
fn university() -> UniversityId {
    UniversityId::random()
}

fn student(university: UniversityId) -> RequestContext {
    RequestContext::authenticated(Principal::Student {
        id: UserId::random(),
        university,
    })
}

fn club_admin(id: UserId, university: UniversityId) -> RequestContext {
    RequestContext::authenticated(Principal::ClubAdmin { id, university })
}

fn university_admin(scope: UniversityScope) -> RequestContext {
    RequestContext::authenticated(Principal::UniversityAdmin {
        id: UserId::random(),
        scope,
    })
}

#[rstest]
fn browse_is_always_allowed(university: UniversityId) {
    assert_eq!(
        AuthorizationGate::authorize(&RequestContext::anonymous(), Action::Browse),
        Decision::Allow
    );
    assert_eq!(
        AuthorizationGate::authorize(&student(university), Action::Browse),
        Decision::Allow
    );
}

#[rstest]
#[case(SocialAction::Follow)]
#[case(SocialAction::Apply)]
#[case(SocialAction::Post)]
#[case(SocialAction::Comment)]
#[case(SocialAction::Like)]
fn social_actions_need_identity(#[case] action: SocialAction, university: UniversityId) {
    assert_eq!(
        AuthorizationGate::authorize(&RequestContext::anonymous(), Action::Social(action)),
        Decision::Deny(DenyReason::Unauthenticated)
    );
    let admin = club_admin(UserId::random(), university);
    assert_eq!(
        AuthorizationGate::authorize(&admin, Action::Social(action)),
        Decision::Allow
    );
}

#[rstest]
fn student_area_requires_student_role(university: UniversityId) {
    assert_eq!(
        AuthorizationGate::authorize(&student(university), Action::StudentArea),
        Decision::Allow
    );
    assert_eq!(
        AuthorizationGate::authorize(
            &club_admin(UserId::random(), university),
            Action::StudentArea
        ),
        Decision::Deny(DenyReason::WrongRole)
    );
}

#[rstest]
fn manage_club_checks_role_then_ownership(university: UniversityId) {
    let owner = UserId::random();
    let action = Action::ManageClub { admin: owner };

    assert_eq!(
        AuthorizationGate::authorize(&club_admin(owner, university), action),
        Decision::Allow
    );
    assert_eq!(
        AuthorizationGate::authorize(&club_admin(UserId::random(), university), action),
        Decision::Deny(DenyReason::NotOwner)
    );
    assert_eq!(
        AuthorizationGate::authorize(&student(university), action),
        Decision::Deny(DenyReason::WrongRole)
    );
    assert_eq!(
        AuthorizationGate::authorize(&RequestContext::anonymous(), action),
        Decision::Deny(DenyReason::Unauthenticated)
    );
}

#[rstest]
fn scoped_university_admin_matches_only_own_university(university: UniversityId) {
    let admin = university_admin(UniversityScope::University(university));

    assert_eq!(
        AuthorizationGate::authorize(
            &admin,
            Action::ManageUniversity {
                university: Some(university)
            }
        ),
        Decision::Allow
    );
    assert_eq!(
        AuthorizationGate::authorize(
            &admin,
            Action::ManageUniversity {
                university: Some(UniversityId::random())
            }
        ),
        Decision::Deny(DenyReason::NotOwner)
    );
    assert_eq!(
        AuthorizationGate::authorize(&admin, Action::ManageUniversity { university: None }),
        Decision::Deny(DenyReason::NotOwner)
    );
}

#[rstest]
fn global_university_admin_manages_everything(university: UniversityId) {
    let admin = university_admin(UniversityScope::Global);
    for target in [Some(university), None] {
        assert_eq!(
            AuthorizationGate::authorize(&admin, Action::ManageUniversity { university: target }),
            Decision::Allow
        );
    }
}

#[rstest]
fn club_admin_cannot_manage_universities(university: UniversityId) {
    assert_eq!(
        AuthorizationGate::authorize(
            &club_admin(UserId::random(), university),
            Action::ManageUniversity {
                university: Some(university)
            }
        ),
        Decision::Deny(DenyReason::WrongRole)
    );
}

#[rstest]
#[case("/", RouteScope::Public)]
#[case("/explore", RouteScope::Public)]
#[case("/clubs/abc/posts", RouteScope::Public)]
#[case("/login", RouteScope::Public)]
#[case("/uploads/x.png", RouteScope::Public)]
#[case("/student/feed", RouteScope::Student)]
#[case("/me/posts", RouteScope::Student)]
#[case("/me/posts/abc", RouteScope::Student)]
#[case("/club/abc/applications", RouteScope::ClubAdmin)]
#[case("/club", RouteScope::ClubAdmin)]
#[case("/university/clubs", RouteScope::UniversityAdmin)]
fn route_scopes_follow_prefix_table(#[case] path: &str, #[case] expected: RouteScope) {
    assert_eq!(RouteScope::for_path(path), expected);
}

#[rstest]
fn scope_check_reports_wrong_role(university: UniversityId) {
    assert_eq!(
        AuthorizationGate::authorize_scope(&student(university), RouteScope::ClubAdmin),
        Decision::Deny(DenyReason::WrongRole)
    );
    assert_eq!(
        AuthorizationGate::authorize_scope(&RequestContext::anonymous(), RouteScope::Student),
        Decision::Deny(DenyReason::Unauthenticated)
    );
    assert_eq!(
        AuthorizationGate::authorize_scope(&RequestContext::anonymous(), RouteScope::Public),
        Decision::Allow
    );
}

#[rstest]
#[case(DenyReason::Unauthenticated, ErrorCode::Unauthenticated)]
#[case(DenyReason::WrongRole, ErrorCode::WrongRole)]
#[case(DenyReason::NotOwner, ErrorCode::NotOwner)]
fn denials_map_to_error_codes(#[case] reason: DenyReason, #[case] expected: ErrorCode) {
    let error = Decision::Deny(reason)
        .into_result(Action::Social(SocialAction::Follow))
        .expect_err("denial");
    assert_eq!(error.code(), expected);
}

#[rstest]
fn acting_rejects_anonymous_browse() {
    let error = RequestContext::anonymous()
        .acting(Action::Browse)
        .expect_err("no principal to act as");
    assert_eq!(error.code(), ErrorCode::Unauthenticated);
}

#[rstest]
fn principal_from_user_derives_scope(university: UniversityId) {
    let email = Email::parse("dean@uni.example").expect("valid email");
    let global = User {
        id: UserId::random(),
        email: email.clone(),
        role: Role::UniversityAdmin,
        university: None,
    };
    let scoped = User {
        university: Some(university),
        ..global.clone()
    };
    let orphan_student = User {
        role: Role::Student,
        university: None,
        ..global.clone()
    };

    assert!(matches!(
        Principal::from_user(&global),
        Some(Principal::UniversityAdmin {
            scope: UniversityScope::Global,
            ..
        })
    ));
    assert!(matches!(
        Principal::from_user(&scoped),
        Some(Principal::UniversityAdmin {
            scope: UniversityScope::University(id),
            ..
        }) if id == university
    ));
    assert!(Principal::from_user(&orphan_student).is_none());
}
