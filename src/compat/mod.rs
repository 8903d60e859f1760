//! Container/codec compatibility decisions.
//!
//! A [`CompatPolicy`] pairs a [`CompatibilityTable`] with a
//! [`TargetEncoding`] and turns a [`MediaDescriptor`] into a
//! [`ConversionPlan`]. Evaluation is pure; a policy can be shared across
//! threads by reference.

mod descriptor;
mod evaluator;
mod table;

#[cfg(test)]
mod test_fixtures;

pub use descriptor::{container_from_path, MediaDescriptor, StreamDescriptor, StreamType};
pub use evaluator::{evaluate, ConversionPlan, RejectedStream};
pub use table::{CompatibilityTable, ContainerCodecs, TargetEncoding};

use serde::{Deserialize, Serialize};

/// The immutable rules a batch runs under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatPolicy {
    pub table: CompatibilityTable,
    pub target: TargetEncoding,
}

impl CompatPolicy {
    pub fn new(table: CompatibilityTable, target: TargetEncoding) -> Self {
        Self { table, target }
    }

    /// Evaluate one file against this policy.
    pub fn evaluate(&self, media: &MediaDescriptor) -> ConversionPlan {
        evaluate(media, &self.table, &self.target)
    }
}
