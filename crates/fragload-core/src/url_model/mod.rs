//! Request URL construction for code fragments.
//!
//! Wire format: `base + directory + build_id + "/" + fragment + ".cache.js"`,
//! with `?serial=N` appended for every attempt after the first.

mod location;
mod path;

pub use location::ModuleLocation;
pub use path::filename_from_url_path;

use crate::fragment::FragmentId;

/// Subdirectory (relative to the module base) holding deferred fragments.
pub const DEFAULT_DEFERRED_DIRECTORY: &str = "deferredjs/";

/// Suffix of every fragment artifact.
const FRAGMENT_SUFFIX: &str = ".cache.js";

/// Builds the URL for one attempt at fetching `fragment`.
///
/// Plain concatenation; `base` and `directory` are expected to carry their own
/// trailing slashes. A zero `serial` leaves the query string off entirely.
///
/// # Examples
///
/// - `build_url("https://x/", "abc123", "deferredjs/", FragmentId(7), 0)` → `"https://x/deferredjs/abc123/7.cache.js"`
/// - same with serial 2 → `"https://x/deferredjs/abc123/7.cache.js?serial=2"`
pub fn build_url(
    base: &str,
    build_id: &str,
    directory: &str,
    fragment: FragmentId,
    serial: u64,
) -> String {
    let mut url = format!("{base}{directory}{build_id}/{fragment}{FRAGMENT_SUFFIX}");
    if serial != 0 {
        url.push_str("?serial=");
        url.push_str(&serial.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_has_no_serial() {
        assert_eq!(
            build_url("https://x/", "abc123", "deferredjs/", FragmentId(7), 0),
            "https://x/deferredjs/abc123/7.cache.js"
        );
    }

    #[test]
    fn later_attempts_carry_serial() {
        assert_eq!(
            build_url("https://x/", "abc123", "deferredjs/", FragmentId(7), 1),
            "https://x/deferredjs/abc123/7.cache.js?serial=1"
        );
        assert_eq!(
            build_url("https://x/", "abc123", "deferredjs/", FragmentId(7), 2),
            "https://x/deferredjs/abc123/7.cache.js?serial=2"
        );
    }

    #[test]
    fn directory_override_only_changes_prefix() {
        assert_eq!(
            build_url("https://x/app/", "B", "chunks/", FragmentId(0), 0),
            "https://x/app/chunks/B/0.cache.js"
        );
        assert_eq!(
            build_url("https://x/app/", "B", "", FragmentId(0), 4),
            "https://x/app/B/0.cache.js?serial=4"
        );
    }
}
