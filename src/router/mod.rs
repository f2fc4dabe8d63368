//! The single-page application's route table.

pub mod pattern;
pub mod routes;
pub mod table;

pub use pattern::PathPattern;
pub use routes::{portal_routes, Page, RouteRecord};
pub use table::{RouteMatch, RouteTable};
