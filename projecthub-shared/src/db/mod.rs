//! Database layer for ProjectHub
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: Embedded schema migrations (from the workspace `migrations/` directory)
//!
//! # Example
//!
//! ```no_run
//! use projecthub_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig {
//!     url: std::env::var("DATABASE_URL")?,
//!     ..Default::default()
//! })
//! .await?;
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod migrations;
pub mod pool;
