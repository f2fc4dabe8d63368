pub mod client;
pub mod endpoints;

pub use client::{PortalClient, SESSION_COOKIE};
pub use endpoints::PortalApi;
