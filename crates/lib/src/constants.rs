//! Constants used throughout the docview library.
//!
//! This module provides central definitions for reserved path tokens and
//! other fixed values shared between the document engine and the models.

/// Reserved path token meaning "the enclosing map itself".
///
/// Field-groups bind to this token so that their sub-model reads and writes
/// the same map as the parent model.
pub const SAME_LEVEL: &str = "<same>";

/// Closing marker appended to same-level cache keys.
pub const SAME_LEVEL_END: &str = "</same>";

/// Sort depth used for same-level paths when materializing.
///
/// Same-level groups are folded in before every keyed field so that deeper
/// writes always land on structure the group merge has already shaped.
pub const SAME_LEVEL_DEPTH: usize = 0;

/// Path component separator.
pub const SEPARATOR: char = '.';

/// Default number of idle guards kept by a [`crate::lock::GuardPool`].
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Maximum number of memoized date parses held by a conversion service.
pub const DATE_MEMO_CAPACITY: usize = 1024;

/// Smallest integer accepted as a `yyyyMMdd` date (Jan 1 1900).
pub const MIN_INTEGER_DATE: i64 = 19000101;

/// Largest integer accepted as a `yyyyMMdd` date (Dec 31 9999).
pub const MAX_INTEGER_DATE: i64 = 99991231;
