//! Centralized validation and helper functions.

use std::collections::HashSet;

use crate::core::types::LibraryName;

/// Records between progress log lines
pub const PROGRESS_INTERVAL: usize = 1_000_000;

/// Return the first library name that appears more than once.
///
/// # Examples
///
/// ```
/// use bin_by_sam::core::types::LibraryName;
/// use bin_by_sam::utils::validation::find_duplicate_library;
///
/// let a = LibraryName::new("a");
/// let b = LibraryName::new("b");
/// assert_eq!(find_duplicate_library(&[&a, &b, &a]), Some(&a));
/// assert_eq!(find_duplicate_library(&[&a, &b]), None);
/// ```
#[must_use]
pub fn find_duplicate_library<'a>(names: &[&'a LibraryName]) -> Option<&'a LibraryName> {
    let mut seen = HashSet::new();
    names.iter().copied().find(|name| !seen.insert(*name))
}

/// Whether `records_read` should trigger a progress log line
#[must_use]
pub fn is_progress_checkpoint(records_read: usize) -> bool {
    records_read > 0 && records_read % PROGRESS_INTERVAL == 0
}
