//! HTTP routes and handlers.

pub mod forward;
pub mod handlers;
pub mod monitoring;
pub mod routes;
