//! Grouping capability implementations.
//!
//! - [`MemoryGroupRepository`] - Groups and memberships kept in memory
//! - [`NullGroupRepository`] - No grouping capability, all operations are no-ops

mod memory_grouping;
mod null_grouping;

pub use memory_grouping::MemoryGroupRepository;
pub use null_grouping::NullGroupRepository;
