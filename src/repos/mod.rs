/*
 * Responsibility
 * - Persistence collaborators behind small async traits
 * - In-memory implementations (default) and PostgreSQL via sqlx (DATABASE_URL)
 */
pub mod error;
pub mod schema;
pub mod user_repo;
pub mod weather_repo;
