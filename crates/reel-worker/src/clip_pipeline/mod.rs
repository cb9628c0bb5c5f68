//! Export pipeline stages.
//!
//! Clips are transformed one at a time into the job's workspace, then joined
//! by the concatenation stage.

pub mod clip;
pub mod concat;

pub use clip::ClipTransformStage;
pub use concat::ConcatenationStage;
