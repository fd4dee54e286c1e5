//! Integration tests for the Diesel club adapters against PostgreSQL.
//!
//! The suite runs against the database named by `CLUBS_TEST_DATABASE_URL`
//! after applying the embedded migrations. Each test seeds its own
//! university, so runs do not interfere. Without the variable the tests print
//! a skip marker and pass.

use chrono::Utc;
use rstest::{fixture, rstest};

use campus_clubs::domain::ports::{
    ApplicationRepository, ClubRepository, ClubRepositoryError, MembershipRepository,
    PostRepository, UniversityRepository, UserRepository,
};
use campus_clubs::domain::{
    Club, ClubApplication, ClubId, Email, PasswordHash, Post, PostId, Resolution, Role,
    University, User, UserAccount, UserId,
};
use campus_clubs::outbound::persistence::{
    DbPool, DieselApplicationRepository, DieselClubRepository, DieselMembershipRepository,
    DieselPostRepository, DieselUniversityRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};

const DATABASE_URL_ENV: &str = "CLUBS_TEST_DATABASE_URL";

struct Adapters {
    users: DieselUserRepository,
    universities: DieselUniversityRepository,
    clubs: DieselClubRepository,
    memberships: DieselMembershipRepository,
    applications: DieselApplicationRepository,
    posts: DieselPostRepository,
}

async fn adapters() -> Option<Adapters> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-CLUSTER: {DATABASE_URL_ENV} is not set");
        return None;
    };
    run_pending_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(&url)).await.expect("pool");
    Some(Adapters {
        users: DieselUserRepository::new(pool.clone()),
        universities: DieselUniversityRepository::new(pool.clone()),
        clubs: DieselClubRepository::new(pool.clone()),
        memberships: DieselMembershipRepository::new(pool.clone()),
        applications: DieselApplicationRepository::new(pool.clone()),
        posts: DieselPostRepository::new(pool),
    })
}

fn unique_email(prefix: &str) -> Email {
    Email::parse(&format!("{prefix}-{}@uni.example", UserId::random())).expect("valid email")
}

fn account(prefix: &str, role: Role, university: &University) -> UserAccount {
    UserAccount {
        user: User {
            id: UserId::random(),
            email: unique_email(prefix),
            role,
            university: Some(university.id),
        },
        password_hash: PasswordHash::new("hash"),
    }
}

#[fixture]
fn university() -> University {
    University::try_new("Diesel University", "GB").expect("valid university")
}

fn club_for(university: &University, admin: &UserAccount) -> Club {
    Club {
        id: ClubId::random(),
        name: "Rowing Club".into(),
        description: "On the river at dawn.".into(),
        university: university.id,
        admin: admin.user.id,
        created_at: Utc::now(),
    }
}

#[rstest]
#[tokio::test]
async fn club_deletion_cascades_to_members_posts_and_admin(university: University) {
    let Some(db) = adapters().await else {
        return;
    };
    db.universities.insert(&university).await.expect("university");
    let admin = account("admin", Role::ClubAdmin, &university);
    let club = club_for(&university, &admin);
    db.clubs
        .create_with_admin(&club, &admin)
        .await
        .expect("club with admin");
    let student = account("student", Role::Student, &university);
    db.users.insert(&student).await.expect("student");
    let application = ClubApplication::pending(student.user.id, club.id, Utc::now());
    db.applications
        .insert_pending(&application)
        .await
        .expect("pending");
    db.applications
        .resolve_pending(&application.id, Resolution::Accept, Utc::now())
        .await
        .expect("accepted");
    let post = Post {
        id: PostId::random(),
        club: club.id,
        author: student.user.id,
        text: "First outing".into(),
        image_url: None,
        created_at: Utc::now(),
    };
    db.posts.insert(&post).await.expect("post");

    assert!(db.clubs.delete_cascading(&club.id).await.expect("delete"));

    assert!(db.clubs.find_by_id(&club.id).await.expect("lookup").is_none());
    assert!(db.users.find_by_id(&admin.user.id).await.expect("lookup").is_none());
    assert!(db.users.find_by_id(&student.user.id).await.expect("lookup").is_some());
    assert!(
        !db.memberships
            .is_member(&student.user.id, &club.id)
            .await
            .expect("membership")
    );
    assert!(db.posts.find_by_id(&post.id).await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test]
async fn taken_admin_email_leaves_no_club(university: University) {
    let Some(db) = adapters().await else {
        return;
    };
    db.universities.insert(&university).await.expect("university");
    let student = account("taken", Role::Student, &university);
    db.users.insert(&student).await.expect("student");
    let admin = UserAccount {
        user: User {
            id: UserId::random(),
            email: student.user.email.clone(),
            role: Role::ClubAdmin,
            university: Some(university.id),
        },
        password_hash: PasswordHash::new("hash"),
    };
    let club = club_for(&university, &admin);

    let error = db
        .clubs
        .create_with_admin(&club, &admin)
        .await
        .expect_err("duplicate email");

    assert!(matches!(error, ClubRepositoryError::DuplicateAdminEmail { .. }));
    assert!(db.clubs.find_by_id(&club.id).await.expect("lookup").is_none());
}
