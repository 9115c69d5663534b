pub mod insight_generator;
pub mod request_coordinator;
pub mod series_normalizer;
pub mod trend_analyzer;
