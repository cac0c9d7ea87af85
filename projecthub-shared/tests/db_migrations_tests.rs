/// Integration tests for schema migrations
///
/// Requires `DATABASE_URL`; skipped otherwise.

use projecthub_shared::db::migrations::{ensure_database_exists, get_migration_status, run_migrations};
use projecthub_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use sqlx::PgPool;
use std::env;

async fn migrated_pool() -> Option<PgPool> {
    let url = env::var("DATABASE_URL").ok()?;

    ensure_database_exists(&url)
        .await
        .expect("Failed to create database");

    let pool = create_pool(DatabaseConfig {
        url,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");
    Some(pool)
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let before = get_migration_status(&pool).await.expect("Status failed");
    run_migrations(&pool).await.expect("Second run failed");
    let after = get_migration_status(&pool).await.expect("Status failed");

    assert_eq!(before.applied_migrations, after.applied_migrations);
    assert_eq!(before.latest_version, after.latest_version);
    assert!(after.applied_migrations >= 5);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let expected_tables = [
        "users",
        "projects",
        "comments",
        "likes",
        "project_members",
        "project_references",
        "files",
        "project_files",
        "tags",
        "project_tags",
    ];

    for table_name in expected_tables {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for table {}: {}", table_name, e));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    let role_enum: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT FROM pg_type WHERE typname = 'member_role')")
            .fetch_one(&pool)
            .await
            .expect("Failed to check enum");
    assert!(role_enum, "Enum 'member_role' should exist after migrations");

    close_pool(pool).await;
}
