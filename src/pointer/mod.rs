// Wed Feb 04 2026 - Alex

pub mod error;
pub mod params;
pub mod path;
pub mod resolve;

pub use error::{PathError, ScanError};
pub use params::{ScanParameters, MAX_LEVEL};
pub use path::{sort_paths, PointerPath};
pub use resolve::resolve_path;
