pub mod data_loader;
pub mod options;
pub mod state;

// Re-export so callers can "use crate::loader::*;"
pub use data_loader::PortalApiDataLoader;
pub use options::{FetchOptions, RequestBody};
pub use state::{LoadPhase, LoaderState};
