//! This module contains the query conditions and the value comparison they rely on.

mod conditions;
mod loose;

pub use self::conditions::Conditions;
pub use self::loose::loose_eq;
