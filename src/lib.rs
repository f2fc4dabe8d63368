//! Library exports for autolab-portal, shared between the binary and tests.

pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod router;
pub mod session;
pub mod startup;
pub mod state;
pub mod utils;
