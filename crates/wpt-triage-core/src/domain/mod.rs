//! Domain model: sources, observations, unified records, status categories.

pub mod error;
pub mod record;
pub mod source;
pub mod status;

pub use error::{Result, TriageError};
pub use record::{Observation, SourceObservation, UnifiedRecord};
pub use source::Source;
pub use status::{classify, Status};
