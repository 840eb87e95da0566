//! Core engine: find → aggregate → alert.

pub mod aggregator;
pub mod finder;
pub mod pacer;
pub mod scanner;

pub use aggregator::Aggregator;
pub use finder::CandidateFinder;
pub use pacer::Pacer;
pub use scanner::{ScanReport, Scanner};
