//! Behaviour tests for the clubs service over real HTTP.
//!
//! Scenarios drive a running server through named actors: the bootstrap
//! university admin, club admins provisioned with their clubs, and students
//! who sign up during the scenario. They cover the application workflow,
//! route authorization, club cascades, posts with uploads and anti-forgery
//! enforcement.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Harness helpers are shared across every feature bound below.
#[allow(dead_code)]
#[path = "support/campus_harness.rs"]
mod harness;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use harness::{
    Call, MAX_UPLOAD_BYTES, ROOT_EMAIL, ROOT_PASSWORD, SharedWorld, WorldFixture, issue_token,
    last_reply, recall, remember, send, send_without_token, sign_in, sign_up,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

const UNIVERSITY_ADMIN: &str = "university admin";
const CLUB_ADMIN: &str = "club admin";
const SECOND_CLUB_ADMIN: &str = "second club admin";
const STUDENT: &str = "student";
const VISITOR: &str = "visitor";

const CLUB_ADMIN_EMAIL: &str = "chess-admin@northfield.example";
const CLUB_ADMIN_PASSWORD: &str = "club-admin-pass";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

fn png(len: usize) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.resize(len, 0);
    bytes
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id in response").to_owned()
}

fn create_club(world: &SharedWorld, name: &str, admin_email: &str) -> Value {
    let university = recall(world, "university");
    send(
        world,
        Some(UNIVERSITY_ADMIN),
        Call::post(
            "/university/clubs",
            json!({
                "name": name,
                "description": "Meets every week.",
                "universityId": university,
                "adminEmail": admin_email,
                "adminPassword": CLUB_ADMIN_PASSWORD,
            }),
        ),
    )
    .body
}

fn apply(world: &SharedWorld) {
    let club = recall(world, "club");
    let reply = send(
        world,
        Some(STUDENT),
        Call::post_empty(&format!("/clubs/{club}/application")),
    );
    assert_eq!(reply.status, 201, "apply: {}", reply.body);
    remember(world, "application", &id_of(&reply.body));
}

fn resolve(world: &SharedWorld, verb: &str) {
    let application = recall(world, "application");
    send(
        world,
        Some(CLUB_ADMIN),
        Call::post_empty(&format!("/club/applications/{application}/{verb}")),
    );
}

fn post_message(world: &SharedWorld, image: Option<Vec<u8>>) {
    let club = recall(world, "club");
    let mut payload = json!({ "clubId": club, "text": "Board night on Friday." });
    if let Some(bytes) = image {
        payload["image"] = json!({ "contentType": "image/png", "data": STANDARD.encode(bytes) });
    }
    send(world, Some(STUDENT), Call::post("/me/posts", payload));
}

fn my_clubs(world: &SharedWorld) -> Value {
    let reply = send(world, Some(STUDENT), Call::get("/student/clubs"));
    assert_eq!(reply.status, 200, "my clubs: {}", reply.body);
    reply.body
}

fn my_applications(world: &SharedWorld) -> Vec<Value> {
    let reply = send(world, Some(STUDENT), Call::get("/student/applications"));
    assert_eq!(reply.status, 200, "my applications: {}", reply.body);
    reply.body.as_array().cloned().expect("applications array")
}

#[given("a university with a club")]
fn a_university_with_a_club(world: &WorldFixture) {
    let world = world.world();
    let reply = sign_in(&world, UNIVERSITY_ADMIN, ROOT_EMAIL, ROOT_PASSWORD);
    assert_eq!(reply.status, 200, "root sign-in: {}", reply.body);

    let university = send(
        &world,
        Some(UNIVERSITY_ADMIN),
        Call::post(
            "/university/universities",
            json!({ "name": "Northfield University", "countryCode": "GB" }),
        ),
    );
    assert_eq!(university.status, 201, "university: {}", university.body);
    remember(&world, "university", &id_of(&university.body));

    let club = create_club(&world, "Chess Society", CLUB_ADMIN_EMAIL);
    remember(&world, "club", &id_of(&club));

    let reply = sign_in(&world, CLUB_ADMIN, CLUB_ADMIN_EMAIL, CLUB_ADMIN_PASSWORD);
    assert_eq!(reply.status, 200, "club admin sign-in: {}", reply.body);
}

#[given("a second club in the same university")]
fn a_second_club_in_the_same_university(world: &WorldFixture) {
    let world = world.world();
    let club = create_club(&world, "Film Club", "film-admin@northfield.example");
    remember(&world, "second club", &id_of(&club));
    let reply = sign_in(
        &world,
        SECOND_CLUB_ADMIN,
        "film-admin@northfield.example",
        CLUB_ADMIN_PASSWORD,
    );
    assert_eq!(reply.status, 200, "second admin sign-in: {}", reply.body);
}

#[given("a signed-in student")]
fn a_signed_in_student(world: &WorldFixture) {
    let world = world.world();
    let university = recall(&world, "university");
    sign_up(&world, STUDENT, "ada@northfield.example", &university);
}

#[given("an anonymous visitor with an anti-forgery token")]
fn an_anonymous_visitor_with_an_anti_forgery_token(world: &WorldFixture) {
    issue_token(&world.world(), VISITOR);
}

#[given("the student has applied to the club")]
fn the_student_has_applied_to_the_club(world: &WorldFixture) {
    apply(&world.world());
}

#[given("the club admin has rejected the application")]
fn the_club_admin_has_rejected_the_application(world: &WorldFixture) {
    let world = world.world();
    resolve(&world, "reject");
    assert_eq!(last_reply(&world).status, 200);
}

#[given("the student is an accepted member of the club")]
fn the_student_is_an_accepted_member_of_the_club(world: &WorldFixture) {
    let world = world.world();
    apply(&world);
    resolve(&world, "accept");
    assert_eq!(last_reply(&world).status, 200);
}

#[given("the student has posted in the club")]
fn the_student_has_posted_in_the_club(world: &WorldFixture) {
    let world = world.world();
    post_message(&world, None);
    assert_eq!(last_reply(&world).status, 201);
}

#[when("the club admin accepts the application")]
fn the_club_admin_accepts_the_application(world: &WorldFixture) {
    resolve(&world.world(), "accept");
}

#[when("the club admin rejects the application")]
fn the_club_admin_rejects_the_application(world: &WorldFixture) {
    resolve(&world.world(), "reject");
}

#[when("the student applies to the club")]
fn the_student_applies_to_the_club(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(
        &world,
        Some(STUDENT),
        Call::post_empty(&format!("/clubs/{club}/application")),
    );
}

#[when("the student applies to the club without the anti-forgery token")]
fn the_student_applies_without_the_token(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send_without_token(
        &world,
        STUDENT,
        Call::post_empty(&format!("/clubs/{club}/application")),
    );
}

#[when("the student cancels the application")]
fn the_student_cancels_the_application(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(
        &world,
        Some(STUDENT),
        Call::delete(&format!("/clubs/{club}/application")),
    );
}

#[when("an anonymous visitor requests {path}")]
fn an_anonymous_visitor_requests(world: &WorldFixture, path: String) {
    send(&world.world(), None, Call::get(&path));
}

#[when("an anonymous visitor opens the club page")]
fn an_anonymous_visitor_opens_the_club_page(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(&world, None, Call::get(&format!("/clubs/{club}")));
}

#[when("the anonymous visitor follows the club")]
fn the_anonymous_visitor_follows_the_club(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(
        &world,
        Some(VISITOR),
        Call::post_empty(&format!("/clubs/{club}/follow")),
    );
}

#[when("the student lists the club applications")]
fn the_student_lists_the_club_applications(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(
        &world,
        Some(STUDENT),
        Call::get(&format!("/club/{club}/applications")),
    );
}

#[when("the club admin lists the second club applications")]
fn the_club_admin_lists_the_second_club_applications(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "second club");
    send(
        &world,
        Some(CLUB_ADMIN),
        Call::get(&format!("/club/{club}/applications")),
    );
}

#[when("the university admin deletes the club")]
fn the_university_admin_deletes_the_club(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    send(
        &world,
        Some(UNIVERSITY_ADMIN),
        Call::delete(&format!("/university/clubs/{club}")),
    );
}

#[when("the university admin creates another club with the same admin email")]
fn the_university_admin_reuses_the_admin_email(world: &WorldFixture) {
    create_club(&world.world(), "Go Society", CLUB_ADMIN_EMAIL);
}

#[when("the student posts a message with a small PNG image")]
fn the_student_posts_a_small_image(world: &WorldFixture) {
    post_message(&world.world(), Some(png(64)));
}

#[when("the student posts a message with an oversized PNG image")]
fn the_student_posts_an_oversized_image(world: &WorldFixture) {
    let len = usize::try_from(MAX_UPLOAD_BYTES * 2).expect("fits usize");
    post_message(&world.world(), Some(png(len)));
}

#[when("the student posts a text-only message")]
fn the_student_posts_a_text_only_message(world: &WorldFixture) {
    post_message(&world.world(), None);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.status, status, "body: {}", reply.body);
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.body["code"].as_str(), Some(code.as_str()));
}

#[then("the error points to the login page")]
fn the_error_points_to_the_login_page(world: &WorldFixture) {
    let reply = last_reply(&world.world());
    assert_eq!(reply.body["details"]["loginUrl"], "/login");
}

#[then("the response carries its trace id")]
fn the_response_carries_its_trace_id(world: &WorldFixture) {
    let reply = last_reply(&world.world());
    let trace_id = reply.trace_id.as_deref().expect("trace id header");
    assert_eq!(reply.body["traceId"].as_str(), Some(trace_id));
}

#[then("the application is {status}")]
fn the_application_is(world: &WorldFixture, status: String) {
    let world = world.world();
    let application = recall(&world, "application");
    let applications = my_applications(&world);
    let found = applications
        .iter()
        .find(|entry| entry["id"] == application.as_str())
        .expect("application listed");
    assert_eq!(found["status"].as_str(), Some(status.as_str()));
    assert!(!found["resolvedAt"].is_null());
}

#[then("the student has no applications")]
fn the_student_has_no_applications(world: &WorldFixture) {
    assert!(my_applications(&world.world()).is_empty());
}

#[then("the student is a member of the club")]
fn the_student_is_a_member_of_the_club(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    let clubs = my_clubs(&world);
    let member_of = clubs["memberOf"].as_array().expect("memberOf");
    assert!(member_of.iter().any(|id| id == club.as_str()));
}

#[then("the student is not a member of the club")]
fn the_student_is_not_a_member_of_the_club(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    let clubs = my_clubs(&world);
    let member_of = clubs["memberOf"].as_array().expect("memberOf");
    assert!(member_of.iter().all(|id| id != club.as_str()));
}

#[then("the student is notified that the application was {outcome}")]
fn the_student_is_notified(world: &WorldFixture, outcome: String) {
    let world = world.world();
    let application = recall(&world, "application");
    let reply = send(&world, Some(STUDENT), Call::get("/student/notifications"));
    assert_eq!(reply.status, 200, "notifications: {}", reply.body);
    assert_eq!(reply.body["unread"], 1);
    let items = reply.body["items"].as_array().expect("items");
    let notification = items.first().expect("one notification");
    assert_eq!(notification["application"], application.as_str());
    let message = notification["message"].as_str().expect("message");
    assert!(
        message.ends_with(&format!("was {outcome}.")),
        "unexpected message {message}"
    );
}

#[then("the club page is not found")]
fn the_club_page_is_not_found(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    let reply = send(&world, None, Call::get(&format!("/clubs/{club}")));
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body["code"], "not_found");
}

#[then("the student feed holds {count} posts")]
fn the_student_feed_holds(world: &WorldFixture, count: usize) {
    let reply = send(&world.world(), Some(STUDENT), Call::get("/student/feed"));
    assert_eq!(reply.status, 200, "feed: {}", reply.body);
    assert_eq!(reply.body.as_array().map(Vec::len), Some(count));
}

#[then("the club admin can sign in")]
fn the_club_admin_can_sign_in(world: &WorldFixture) {
    let world = world.world();
    let reply = sign_in(&world, CLUB_ADMIN, CLUB_ADMIN_EMAIL, CLUB_ADMIN_PASSWORD);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["role"], "CLUB_ADMIN");
    assert_eq!(reply.body["university"], recall(&world, "university").as_str());
}

#[then("the club admin can no longer sign in")]
fn the_club_admin_can_no_longer_sign_in(world: &WorldFixture) {
    let world = world.world();
    let club = recall(&world, "club");
    let stale = send(
        &world,
        Some(CLUB_ADMIN),
        Call::get(&format!("/club/{club}/members")),
    );
    assert_eq!(stale.status, 401, "stale session: {}", stale.body);

    let reply = sign_in(&world, CLUB_ADMIN, CLUB_ADMIN_EMAIL, CLUB_ADMIN_PASSWORD);
    assert_eq!(reply.status, 401);
}

#[then("the university has {count} club")]
fn the_university_has_clubs(world: &WorldFixture, count: usize) {
    let world = world.world();
    let university = recall(&world, "university");
    let reply = send(
        &world,
        None,
        Call::get(&format!("/explore?university={university}")),
    );
    assert_eq!(reply.status, 200, "explore: {}", reply.body);
    assert_eq!(reply.body.as_array().map(Vec::len), Some(count));
}

#[then("the post image is served as {content_type}")]
fn the_post_image_is_served_as(world: &WorldFixture, content_type: String) {
    let world = world.world();
    let post = last_reply(&world).body;
    let url = post["imageUrl"].as_str().expect("image url").to_owned();
    assert!(url.starts_with("/uploads/"), "unexpected url {url}");

    let image = send(&world, None, Call::get(&url));
    assert_eq!(image.status, 200);
    assert_eq!(image.content_type.as_deref(), Some(content_type.as_str()));
    assert_eq!(image.raw, png(64));
    assert!(
        image
            .cache_control
            .as_deref()
            .is_some_and(|value| value.contains("immutable"))
    );
}

#[scenario(
    path = "tests/features/club_applications.feature",
    name = "Accepting an application makes the student a member"
)]
fn accepting_an_application_makes_the_student_a_member(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_applications.feature",
    name = "Rejecting an application leaves the student outside the club"
)]
fn rejecting_an_application_leaves_the_student_outside(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_applications.feature",
    name = "A second pending application is refused"
)]
fn a_second_pending_application_is_refused(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_applications.feature",
    name = "Resolved applications cannot be resolved again"
)]
fn resolved_applications_cannot_be_resolved_again(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_applications.feature",
    name = "Withdrawing a pending application removes it"
)]
fn withdrawing_a_pending_application_removes_it(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization.feature",
    name = "Anonymous visitors are asked to sign in for the student area"
)]
fn anonymous_visitors_are_asked_to_sign_in(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization.feature",
    name = "Anonymous visitors can browse club pages"
)]
fn anonymous_visitors_can_browse_club_pages(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization.feature",
    name = "Anonymous visitors are prompted to sign in before following"
)]
fn anonymous_visitors_are_prompted_before_following(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization.feature",
    name = "Students cannot review club applications"
)]
fn students_cannot_review_club_applications(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization.feature",
    name = "Club admins only manage their own club"
)]
fn club_admins_only_manage_their_own_club(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_lifecycle.feature",
    name = "Creating a club provisions its admin account"
)]
fn creating_a_club_provisions_its_admin_account(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_lifecycle.feature",
    name = "A taken admin email leaves no club behind"
)]
fn a_taken_admin_email_leaves_no_club_behind(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/club_lifecycle.feature",
    name = "Deleting a club removes its members, posts and admin"
)]
fn deleting_a_club_removes_its_members_posts_and_admin(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/posts_and_uploads.feature",
    name = "Members post an image that is served from uploads"
)]
fn members_post_an_image_that_is_served(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/posts_and_uploads.feature",
    name = "Oversized images are refused"
)]
fn oversized_images_are_refused(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/posts_and_uploads.feature",
    name = "Students outside the club cannot post there"
)]
fn students_outside_the_club_cannot_post(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/posts_and_uploads.feature",
    name = "Requests without the anti-forgery token are refused"
)]
fn requests_without_the_token_are_refused(world: WorldFixture) {
    drop(world);
}
