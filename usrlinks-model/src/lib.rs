//! Core data model definitions shared across usrlinks crates.
#![allow(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod recon;
pub mod result;
pub mod status;
pub mod verdict;

pub use descriptor::{
    DetectionMethod, EndpointDescriptor, HANDLE_SLOT, PlatformRule,
    UrlTemplate,
};
pub use error::{ModelError, Result as ModelResult};
pub use recon::{AvatarRef, ContactInfo, ReconPayload};
pub use result::ScanResult;
pub use status::ScanStatus;
pub use verdict::Verdict;
