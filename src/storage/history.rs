//! Search history policy.
//!
//! History is kept most-recent-first. Adding a keyword trims it, drops blank
//! input, removes any earlier entry equal to it ignoring case, puts it at the
//! front, and truncates the list to the configured limit.

/// Default number of keywords kept in the search history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Records `keyword` at the front of `history`.
///
/// Returns `false` (and leaves `history` untouched) for blank keywords.
///
/// # Examples
///
/// ```
/// use vidshelf::storage::history::record_keyword;
///
/// let mut history = vec!["dog".to_string(), "cat".to_string()];
/// assert!(record_keyword(&mut history, " Cat ", 20));
/// assert_eq!(history, vec!["Cat", "dog"]);
/// ```
pub fn record_keyword(history: &mut Vec<String>, keyword: &str, limit: usize) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return false;
    }

    let folded = keyword.to_lowercase();
    history.retain(|entry| entry.to_lowercase() != folded);
    history.insert(0, keyword.to_string());
    history.truncate(limit.max(1));
    true
}
