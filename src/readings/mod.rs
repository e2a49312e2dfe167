pub mod service;
pub mod validate;

pub use service::{IngestError, ReadingService};
pub use validate::ValidationError;
