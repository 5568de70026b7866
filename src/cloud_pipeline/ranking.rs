//! Instance ranking module
//!
//! This module merges overlapping instance masks into a single label image
//! according to a named paint-order policy.

mod policy;
mod ranker;
pub mod types;

pub use policy::{AreaPriority, InputOrderOverwrite, RankingPolicy};
pub use ranker::rank_instances;
pub use types::{LabelImage, RankedInstances, BACKGROUND};
