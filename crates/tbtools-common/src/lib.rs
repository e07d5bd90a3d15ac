//! tbtools-common: shared error type and path utilities.
//!
//! - **Error Handling**: the [`Error`] enum every tbtools crate reports through
//! - **Path Utilities**: manifest-style path resolution that tolerates both
//!   POSIX and Windows spellings (see [`paths`])
//!
//! # Examples
//!
//! ```
//! use tbtools_common::paths::resolve_path;
//! use tbtools_common::{Error, Result};
//!
//! assert_eq!(resolve_path("scenes", Some("/proj")), "/proj/scenes");
//! assert_eq!(resolve_path("D:/shows/ep01", Some("/proj")), "D:/shows/ep01");
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("frame count must be positive"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
