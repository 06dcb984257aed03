//! HTTP surface

pub mod protocol;
pub mod routes;

pub use routes::build_router;
