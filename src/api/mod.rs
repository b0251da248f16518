/*
 * Responsibility
 * - HTTP surface: routes, handlers, DTOs, extractors
 * - Paths are served at the root (/auth/login, /weather/{location_id})
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
