mod facade;
mod summary;

pub use facade::CharacterAggregation;
pub use summary::CharacterSummary;
