//! # SenCare Types
//!
//! Small validated domain primitives shared by every SenCare crate:
//! - [`NonEmptyText`] for free-text fields that must carry content
//! - [`Condition`] and [`ConditionFilter`] for the categorical risk label
//! - [`TestType`] for the kind of clinical measurement a reading holds
//!
//! Wire names follow the SenCare REST interface, so these types serialise to exactly the
//! strings the store exchanges.

mod condition;
mod test_type;
mod text;

pub use condition::{Condition, ConditionFilter};
pub use test_type::TestType;
pub use text::NonEmptyText;

/// Errors that can occur when creating validated domain types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input was not one of the accepted condition labels
    #[error("unknown condition: {0:?} (expected Normal or Critical)")]
    UnknownCondition(String),

    /// The input was not one of the accepted filter labels
    #[error("unknown condition filter: {0:?} (expected All, Normal or Critical)")]
    UnknownFilter(String),
}
