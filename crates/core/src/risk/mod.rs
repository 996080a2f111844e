//! Clinical risk classification engine.
//!
//! Three stages, leaf first:
//!
//! 1. [`normalize`](crate::config::RiskConfig::normalize): one reading → abnormality signal
//!    (0 inside the normal band, 1 outside).
//! 2. [`aggregate`](crate::config::RiskConfig::aggregate): weighted fraction of abnormal
//!    readings, in `[0, 1]`.
//! 3. [`classify`]: score → [`Condition`](sencare_types::Condition), critical at or above
//!    [`CRITICAL_THRESHOLD`](crate::constants::CRITICAL_THRESHOLD).
//!
//! [`project_condition`] is the read path built on top: it prefers a fresh classification
//! of the readings and falls back to the cached patient field.

mod aggregate;
mod classify;
mod normalize;
mod projection;

pub use classify::classify;
pub use projection::project_condition;
