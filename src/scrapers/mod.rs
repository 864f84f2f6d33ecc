pub mod base;
pub mod coingecko;
