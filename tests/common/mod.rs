#![allow(dead_code)]

use gigboard::{
    db,
    gigs::{self, Gig, SkillsInput},
    users::{self, Profile, Role, User},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

/// One connection only: every connection to `sqlite::memory:` would
/// otherwise get its own empty database.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_schema(&pool).await.unwrap();
    pool
}

pub async fn seed_user(pool: &SqlitePool, name: &str, role: Role) -> User {
    let user = User {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        email: format!("{name}@example.com"),
        password_hash: "unverifiable-placeholder".to_owned(),
        role,
        profile: Profile::default(),
        date_joined: db::now_ts(),
    };
    users::insert(pool, &user).await.unwrap();
    user
}

pub async fn seed_gig(pool: &SqlitePool, client: Uuid, title: &str, budget: f64, skills: &str) -> Gig {
    let gig = Gig::create(
        client,
        title.to_owned(),
        format!("{title} description"),
        "Leeds".to_owned(),
        budget,
        Some(SkillsInput::Csv(skills.to_owned())),
    )
    .unwrap();
    gigs::insert(pool, &gig).await.unwrap();
    gig
}
