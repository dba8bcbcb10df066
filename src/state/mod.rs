// Sat Feb 07 2026 - Alex

pub mod capture;
pub mod correlator;

pub use capture::ScanState;
pub use correlator::{StateCorrelator, MAX_STATES, MIN_STATES};
