// Tue Jan 15 2026 - Alex

pub mod filter;
pub mod refine;

pub use filter::{filter_once, ContinuousFilter, FilterOutcome, StopReason};
pub use refine::{refine, refine_with_scan};
