// Wed Feb 04 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Pointer path needs at least one offset")]
    EmptyOffsets,
}

/// Configuration problems, reported before any memory is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Static range start 0x{start:08X} is after its end 0x{end:08X}")]
    InvalidStaticRange { start: u32, end: u32 },
    #[error("Maximum level must be at least 1")]
    ZeroMaxLevel,
    #[error("Maximum level {0} exceeds the supported depth of {1}")]
    MaxLevelTooDeep(usize, usize),
    #[error("Maximum results must be at least 1")]
    ZeroMaxResults,
    #[error("Candidate limits must be at least 1")]
    ZeroCandidates,
    #[error("Target 0x{0:08X} is not inside any memory window")]
    TargetNotInMemory(u32),
    #[error("Adapter is not attached to a process")]
    NotAttached,
    #[error("State-based scan needs at least {required} states, got {given}")]
    TooFewStates { required: usize, given: usize },
    #[error("State-based scan supports at most {supported} states, got {given}")]
    TooManyStates { supported: usize, given: usize },
    #[error("State '{label}' holds {actual} bytes, expected {expected}")]
    StateSizeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
}
