pub mod registry;
pub mod traits;

mod http;

// API provider implementations, each with its payload adapter
pub mod coingecko;
pub mod yahoo_finance;
