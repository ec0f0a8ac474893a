//! HTTP response types and the RouteModule trait for organizing routes.

pub mod response;
pub mod routes;

pub use response::MessageResponse;
pub use routes::RouteModule;
