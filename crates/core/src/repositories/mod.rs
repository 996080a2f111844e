//! Repository management modules.
//!
//! This module contains the services that operate on the patient store: the patient
//! directory and the clinical readings with their condition write-back.

pub mod clinical;
pub mod directory;
pub(crate) mod shared;
