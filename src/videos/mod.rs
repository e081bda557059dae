//! Video catalog domain: record types, field validation, and the in-memory store.

mod store;
pub mod types;
pub mod validation;

pub use store::{InMemoryVideoStore, VideoRepository, sample_video};
pub use types::{
    FieldError, NewVideo, Resolution, StoreError, ValidationErrors, VideoId, VideoInput,
    VideoRecord, VideoUpdate,
};
pub use validation::{ValidationMode, validate, validate_create, validate_update};
