//! This module contains the data models of the sentinel pipeline.

pub mod alert;
pub mod candidate;
pub mod transaction;
pub mod verification;

pub use alert::{AlertButton, AlertPayload};
pub use candidate::{ContractCandidate, normalize_address};
pub use verification::{MetadataRecord, SocialKind, SourceCodeEntry, VerificationRecord, is_verified};
