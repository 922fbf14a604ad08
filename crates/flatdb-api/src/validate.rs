//! This module contains all the built-in validations which can be applied to record fields.
//!
//! Each validation function takes a [`serde_json::Value`] as input and returns a `FlatDbResult<()>`
//! indicating whether the value passes the validation or not.

mod datetime;
mod email;
mod number;
mod one_of;
mod strlen;

pub use self::datetime::DueDateValidator;
pub use self::email::EmailValidator;
pub use self::number::NonNegativeValidator;
pub use self::one_of::OneOfValidator;
pub use self::strlen::{MaxStrlenValidator, MinStrlenValidator};
use crate::error::FlatDbResult;

/// Trait for validating [`serde_json::Value`]s.
pub trait Validate {
    /// Validates the given [`serde_json::Value`].
    ///
    /// In case of error it should return a [`crate::prelude::FlatDbError::Validation`] error.
    fn validate(&self, value: &serde_json::Value) -> FlatDbResult<()>;
}
