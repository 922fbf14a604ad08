//! This module contains all the built-in sanitizers which can be applied to record fields.
//!
//! Each sanitizer takes a [`serde_json::Value`] as input and returns a
//! `FlatDbResult<serde_json::Value>` with the sanitized value or an error if the value could not be
//! sanitized.
//!
//! This module contains the [`Sanitize`] trait which should be implemented by all sanitizers.

mod clamp;
mod null_if_empty;
mod trim;

pub use self::clamp::ClampSanitizer;
pub use self::null_if_empty::NullIfEmptySanitizer;
pub use self::trim::TrimSanitizer;
use crate::prelude::FlatDbResult;

/// Trait for sanitizing [`serde_json::Value`]s.
pub trait Sanitize {
    /// Sanitizes the given [`serde_json::Value`].
    ///
    /// In case of error it should return a [`crate::prelude::FlatDbError::Sanitize`] error.
    ///
    /// Sanitizers should not return error if the value is not of the expected type, they should just return the value as is.
    fn sanitize(&self, value: serde_json::Value) -> FlatDbResult<serde_json::Value>;
}
