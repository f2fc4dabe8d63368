// Re-export the payload shapes so callers can "use crate::models::*".
pub mod course;
pub mod envelope;
pub mod gat;
pub mod sections;
pub mod user;

pub use course::*;
pub use envelope::ApiEnvelope;
pub use gat::*;
pub use sections::*;
pub use user::UserProfile;
