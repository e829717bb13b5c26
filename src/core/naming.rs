//! core::naming
//!
//! Branch naming rules and validation.
//!
//! # Features
//!
//! - Generate branch names from commit messages
//! - Validate branch name format
//! - Apply configured naming conventions
//! - Recognize a VCS-configured upstream as belonging to a given remote
//!   (§4.7 step 3 of the Submit Pipeline)

/// Generate a branch name slug from a commit message.
///
/// Converts the first line of a commit message into a valid branch name:
/// - Lowercase
/// - Spaces become hyphens
/// - Remove invalid characters
/// - Truncate to reasonable length
///
/// # Example
///
/// ```
/// use lattice::core::naming::slugify;
///
/// assert_eq!(slugify("Add user authentication"), "add-user-authentication");
/// assert_eq!(slugify("Fix bug #123"), "fix-bug-123");
/// ```
pub fn slugify(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");

    first_line
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c == ' ' || c == '_' {
                '-'
            } else {
                // Skip invalid characters
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50) // Reasonable max length
        .collect()
}

/// Recognize a VCS-configured upstream (as reported by `git rev-parse
/// --abbrev-ref branch@{upstream}`, e.g. `origin/feature`) as belonging to
/// `remote`, returning the bare branch name portion if so.
///
/// Submit only trusts a pre-existing upstream tracking branch when it sits
/// under the remote being submitted to; an upstream tracking a different
/// remote (a fork added for local testing, say) is not a signal about the
/// name to use on `remote`.
///
/// # Example
///
/// ```
/// use lattice::core::naming::upstream_under_remote;
///
/// assert_eq!(upstream_under_remote("origin/feature", "origin"), Some("feature"));
/// assert_eq!(upstream_under_remote("fork/feature", "origin"), None);
/// ```
pub fn upstream_under_remote<'a>(configured: &'a str, remote: &str) -> Option<&'a str> {
    let name = configured.strip_prefix(remote)?.strip_prefix('/')?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("fix: something"), "fix-something");
        assert_eq!(slugify("Add feature"), "add-feature");
    }

    #[test]
    fn slugify_removes_invalid_chars() {
        assert_eq!(slugify("Fix bug [WIP]"), "fix-bug-wip");
        // Note: `/` is removed (not replaced) since it's not a valid branch name character
        assert_eq!(slugify("Test: foo/bar"), "test-foobar");
    }

    #[test]
    fn slugify_handles_empty() {
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_uses_first_line() {
        assert_eq!(slugify("First line\nSecond line"), "first-line");
    }

    #[test]
    fn upstream_under_remote_matches() {
        assert_eq!(upstream_under_remote("origin/feature", "origin"), Some("feature"));
        assert_eq!(
            upstream_under_remote("origin/feature/nested", "origin"),
            Some("feature/nested")
        );
    }

    #[test]
    fn upstream_under_remote_rejects_other_remotes() {
        assert_eq!(upstream_under_remote("fork/feature", "origin"), None);
    }

    #[test]
    fn upstream_under_remote_rejects_bare_remote_name() {
        assert_eq!(upstream_under_remote("origin", "origin"), None);
        assert_eq!(upstream_under_remote("origin/", "origin"), None);
    }

    #[test]
    fn upstream_under_remote_rejects_prefix_collision() {
        assert_eq!(upstream_under_remote("origin2/feature", "origin"), None);
    }
}
