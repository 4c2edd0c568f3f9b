//! Utility functions shared across layers.
//!
//! - [`machine_name`] - Machine name validation for bundles and fields

pub mod machine_name;
