//! # API Shared
//!
//! Shared utilities and definitions for the SenCare APIs.
//!
//! Contains:
//! - Wire bodies for patients and clinical readings, with conversions to and from the core
//!   records
//! - The `{ status, data | message }` response envelope
//! - Shared services like `HealthService`
//! - Authentication utilities (usable by the server and its tests)
//!
//! Used by `api-rest` on the serving side and by `sencare-client` on the calling side, so
//! both ends agree on a single encoding.

pub mod auth;
pub mod envelope;
pub mod health;
pub mod patients;
pub mod readings;
mod wire;

pub use auth::{ApiKeyAuthenticator, AuthError, Authenticator, Credentials, API_KEY_HEADER};
pub use envelope::{Envelope, STATUS_ERROR, STATUS_SUCCESS};
pub use health::{HealthRes, HealthService};
pub use patients::{PatientBody, PatientInput};
pub use readings::{ReadingBody, ReadingInput};
