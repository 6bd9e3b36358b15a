use crate::log::Timestamp;

/// Fatal failures of an attribution build.
///
/// Any of these aborts the whole build. No partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributionError {
    /// Input events are not sorted by timestamp.
    #[error("events out of order at index {index}: {previous} > {next}")]
    UnsortedInput {
        index: usize,
        previous: Timestamp,
        next: Timestamp,
    },

    /// A switch would hand attribution from a character to itself.
    #[error("switch from '{character}' to itself at {ts}")]
    SelfSwitch { character: String, ts: Timestamp },

    /// The closing boundary would precede the outgoing character's last level event.
    #[error(
        "closing boundary for '{character}' at {closing_ts} precedes its last level event at {last_level_ts}"
    )]
    SwitchBeforeLastLevel {
        character: String,
        closing_ts: Timestamp,
        last_level_ts: Timestamp,
    },

    /// No zone entry explains a character switch under modern telemetry.
    #[error("no origin candidate for switch to '{character}' at {ts}")]
    MissingOrigin { character: String, ts: Timestamp },

    /// An attributed character has no level index.
    #[error("character '{character}' has no level index")]
    MissingLevelIndex { character: String },

    /// No level-defining event exists for a character span.
    #[error("cannot determine level of '{character}' at {ts}")]
    UndeterminedLevel { character: String, ts: Timestamp },

    /// The pipeline was resumed after an earlier step failed.
    #[error("build aborted by an earlier error")]
    Aborted,
}
