pub mod insight;
pub mod price;
pub mod settings;
pub mod snapshot;
pub mod timeframe;
pub mod trend;
