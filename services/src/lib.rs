pub mod access;
pub mod attendance;
pub mod class_section;
pub mod code;
pub mod error;
pub mod geo;
pub mod progress;

pub use error::ServiceError;
