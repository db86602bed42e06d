//! Validation functionality
//!
//! Provides structural validation of produced collections:
//! - uid uniqueness across the whole tree
//! - auth and body mode/payload pairing

pub mod collection;

pub use collection::{
    CollectionValidationError, CollectionValidationResult, CollectionValidator, ShapeViolation,
};
