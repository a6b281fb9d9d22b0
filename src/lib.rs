//! Foldbeacon library
//!
//! Runs the above-the-fold candidate scan and the lazy render scan against a
//! rendered page and assembles the beacon report. Exposed for the CLI and for
//! integration testing.

pub mod beacon;
pub mod errors;
pub mod report;

pub use beacon::{Beacon, GeneratedBefore, NoPriorResults, PriorResults, StaticPriorResults};
pub use errors::BeaconError;
pub use report::{BeaconOutcome, BeaconReport, BeaconResults, BeaconSkip};
