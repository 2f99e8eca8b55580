//! Core abstractions shared by every resource.

pub mod error;
pub mod record;
pub mod service;
pub mod validation;

pub use error::ApiError;
pub use record::Record;
pub use service::{RecordStore, SharedStore};
