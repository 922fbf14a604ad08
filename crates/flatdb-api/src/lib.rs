#![crate_name = "flatdb_api"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # flatdb API
//!
//! This crate exposes all the types shared between the flatdb store engine and the features
//! built on top of it.
//!
//! You can import all the useful types and traits by using the prelude module:
//!
//! ```rust
//! use flatdb_api::prelude::*;
//! ```
//!
//! ## Types
//!
//! ### Store
//!
//! - [`TableStore`](crate::prelude::TableStore)
//!
//! ### Query
//!
//! - [`Conditions`](crate::prelude::Conditions)
//! - [`loose_eq`](crate::prelude::loose_eq)
//!
//! ### Table
//!
//! - [`IdStrategy`](crate::prelude::IdStrategy)
//! - [`Layout`](crate::prelude::Layout)
//! - [`Record`](crate::prelude::Record)
//! - [`RecordId`](crate::prelude::RecordId)
//! - [`TableDef`](crate::prelude::TableDef)
//!
//! ### Errors
//!
//! - [`ErrorKind`](crate::prelude::ErrorKind)
//! - [`FlatDbError`](crate::prelude::FlatDbError)
//! - [`FlatDbResult`](crate::prelude::FlatDbResult)
//!
//! ### Utils
//!
//! - [`now_timestamp`](crate::prelude::now_timestamp)
//!
//! ### Sanitizers
//!
//! - [`Sanitize`](crate::prelude::Sanitize)
//! - [`ClampSanitizer`](crate::prelude::ClampSanitizer)
//! - [`NullIfEmptySanitizer`](crate::prelude::NullIfEmptySanitizer)
//! - [`TrimSanitizer`](crate::prelude::TrimSanitizer)
//!
//! ### Validate
//!
//! - [`Validate`](crate::prelude::Validate)
//! - [`DueDateValidator`](crate::prelude::DueDateValidator)
//! - [`EmailValidator`](crate::prelude::EmailValidator)
//! - [`MaxStrlenValidator`](crate::prelude::MaxStrlenValidator)
//! - [`MinStrlenValidator`](crate::prelude::MinStrlenValidator)
//! - [`NonNegativeValidator`](crate::prelude::NonNegativeValidator)
//! - [`OneOfValidator`](crate::prelude::OneOfValidator)

mod error;
pub mod prelude;
mod query;
mod sanitize;
mod store;
mod table;
mod utils;
mod validate;
