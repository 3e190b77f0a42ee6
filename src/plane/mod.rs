pub mod client;
pub mod routes;
pub mod types;

pub use client::{PlaneClient, PlaneError};
pub use routes::{classify, ApiVersion, AuthMode, RouteClassification, RouteRule, ROUTE_RULES};
