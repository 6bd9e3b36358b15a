//! Build driver.
//!
//! A build runs three passes over one sorted batch: foreign classification,
//! attribution, then segmentation. The two scanning passes are resumable so
//! long batches can be processed in work units, yielding to the async
//! runtime between units.

use crate::aggregation::CharacterAggregation;
use crate::attribution::{AttributionBuilder, ForeignClassifier};
use crate::context::{EngineContext, FeatureLookup, ZoneLookup};
use crate::diagnostics::Diagnostics;
use crate::error::AttributionError;
use crate::log::LogEvent;
use crate::segmentation::build_segmentation;

/// Result of a successful build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub aggregation: CharacterAggregation,
    pub diagnostics: Diagnostics,
}

enum Phase<'a> {
    Classify(ForeignClassifier<'a>),
    Attribute(AttributionBuilder<'a>),
    Scanned(AttributionBuilder<'a>),
    Failed,
}

/// Resumable build over one event batch.
pub struct BuildPipeline<'a> {
    events: &'a [LogEvent],
    features: &'a dyn FeatureLookup,
    zones: &'a dyn ZoneLookup,
    phase: Phase<'a>,
    diagnostics: Diagnostics,
}

impl<'a> BuildPipeline<'a> {
    /// Validate the batch and prepare the first pass.
    pub fn new(
        events: &'a [LogEvent],
        features: &'a dyn FeatureLookup,
        zones: &'a dyn ZoneLookup,
    ) -> Result<Self, AttributionError> {
        check_sorted(events)?;
        Ok(Self {
            events,
            features,
            zones,
            phase: Phase::Classify(ForeignClassifier::new(events, features)),
            diagnostics: Diagnostics::new(),
        })
    }

    /// Process one work unit of at most `budget` events.
    /// Returns true once both scanning passes are complete. Any call after a
    /// failed step returns [`AttributionError::Aborted`].
    pub fn step(&mut self, budget: usize) -> Result<bool, AttributionError> {
        let phase = std::mem::replace(&mut self.phase, Phase::Failed);
        self.phase = match phase {
            Phase::Classify(mut classifier) => {
                if classifier.step(budget) {
                    let foreign = classifier.finish(&mut self.diagnostics);
                    Phase::Attribute(AttributionBuilder::new(
                        self.events,
                        foreign,
                        self.features,
                        self.zones,
                    ))
                } else {
                    Phase::Classify(classifier)
                }
            }
            Phase::Attribute(mut builder) => {
                if builder.step(budget)? {
                    Phase::Scanned(builder)
                } else {
                    Phase::Attribute(builder)
                }
            }
            Phase::Scanned(builder) => Phase::Scanned(builder),
            Phase::Failed => return Err(AttributionError::Aborted),
        };
        Ok(matches!(self.phase, Phase::Scanned(_)))
    }

    /// Drive any remaining work and assemble the queryable result.
    pub fn finish(mut self) -> Result<BuildOutcome, AttributionError> {
        while !matches!(self.phase, Phase::Scanned(_) | Phase::Failed) {
            self.step(usize::MAX)?;
        }
        let Phase::Scanned(builder) = self.phase else {
            return Err(AttributionError::Aborted);
        };

        let (attribution, builder_diagnostics) = builder.finish()?;
        self.diagnostics.extend(builder_diagnostics);

        let segmentation = build_segmentation(
            &attribution.sequence,
            &attribution.level_index,
            &mut self.diagnostics,
        )?;

        let aggregation = CharacterAggregation::new(attribution, segmentation);
        tracing::debug!(
            owned = aggregation.summaries().len(),
            foreign = aggregation.foreign().len(),
            diagnostics = self.diagnostics.len(),
            "Build complete"
        );

        Ok(BuildOutcome {
            aggregation,
            diagnostics: self.diagnostics,
        })
    }
}

/// Run a whole build synchronously.
pub fn build(
    events: &[LogEvent],
    features: &dyn FeatureLookup,
    zones: &dyn ZoneLookup,
) -> Result<BuildOutcome, AttributionError> {
    BuildPipeline::new(events, features, zones)?.finish()
}

/// Run a build, yielding to the runtime after every `work_unit` events.
pub async fn build_async(
    events: &[LogEvent],
    features: &dyn FeatureLookup,
    zones: &dyn ZoneLookup,
    work_unit: usize,
) -> Result<BuildOutcome, AttributionError> {
    let mut pipeline = BuildPipeline::new(events, features, zones)?;
    while !pipeline.step(work_unit.max(1))? {
        tokio::task::yield_now().await;
    }
    pipeline.finish()
}

/// Build with the collaborators and work unit of a loaded config.
pub async fn build_with_context(
    events: &[LogEvent],
    context: &EngineContext,
) -> Result<BuildOutcome, AttributionError> {
    build_async(events, &context.features, &context.zones, context.work_unit).await
}

fn check_sorted(events: &[LogEvent]) -> Result<(), AttributionError> {
    match events
        .windows(2)
        .position(|pair| pair[0].ts() > pair[1].ts())
    {
        Some(i) => Err(AttributionError::UnsortedInput {
            index: i + 1,
            previous: events[i].ts(),
            next: events[i + 1].ts(),
        }),
        None => Ok(()),
    }
}
