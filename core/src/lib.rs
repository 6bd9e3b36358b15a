pub mod aggregation;
pub mod attribution;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod log;
pub mod segmentation;

// Re-exports for convenience
pub use aggregation::{CharacterAggregation, CharacterSummary};
pub use context::{
    EngineContext, FeatureLookup, FeatureTimeline, LogFeature, ZoneIndex, ZoneLookup,
};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use engine::{BuildOutcome, BuildPipeline, build, build_async, build_with_context};
pub use error::AttributionError;
pub use log::*;
pub use segmentation::{LevelSegmentation, RangeList, TimeRange};
