//! Rename-aware file name resolution
//!
//! Rendered file names encode moves as `{old → new}` markers, e.g.
//! `{src → lib}/app.js` or `src/{old.js → new.js}`. Each marker collapses to
//! its `new` half to give the file's current path.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Separator diff2html puts between the old and new halves of a marker
pub const RENAME_ARROW: &str = "→";

static RENAME_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^{}→]*? → ([^{}→]*)\}").expect("rename marker regex")
});

/// Rewrites every `{old → new}` marker in `display` to `new`
pub fn resolve_renamed_path(display: &str) -> Cow<'_, str> {
    RENAME_MARKER_RE.replace_all(display, "$1")
}

/// Formats a rename the way diff2html displays it: shared leading and
/// trailing path segments stay outside the marker
pub fn rename_display_name(old: &str, new: &str) -> String {
    if old == new {
        return new.to_string();
    }
    let old_parts: Vec<&str> = old.split('/').collect();
    let new_parts: Vec<&str> = new.split('/').collect();

    let max_shared = old_parts.len().min(new_parts.len()) - 1;
    let prefix = old_parts
        .iter()
        .zip(&new_parts)
        .take(max_shared)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old_parts
        .iter()
        .rev()
        .zip(new_parts.iter().rev())
        .take(max_shared - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = old_parts[prefix..old_parts.len() - suffix].join("/");
    let new_mid = new_parts[prefix..new_parts.len() - suffix].join("/");

    let mut out = String::new();
    for part in &new_parts[..prefix] {
        out.push_str(part);
        out.push('/');
    }
    out.push_str(&format!("{{{} {} {}}}", old_mid, RENAME_ARROW, new_mid));
    for part in &new_parts[new_parts.len() - suffix..] {
        out.push('/');
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_rename() {
        assert_eq!(resolve_renamed_path("{src → lib}/app.js"), "lib/app.js");
    }

    #[test]
    fn test_file_rename() {
        assert_eq!(resolve_renamed_path("src/{old.js → new.js}"), "src/new.js");
    }

    #[test]
    fn test_no_marker_is_unchanged() {
        let resolved = resolve_renamed_path("src/app.js");
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert_eq!(resolved, "src/app.js");
    }

    #[test]
    fn test_multiple_markers_resolve_independently() {
        assert_eq!(
            resolve_renamed_path("{a → b}/mid/{c.rs → d.rs}"),
            "b/mid/d.rs"
        );
        assert_eq!(
            resolve_renamed_path("pkg/{x → y}/{one → two}/z"),
            "pkg/y/two/z"
        );
    }

    #[test]
    fn test_marker_inside_segment() {
        assert_eq!(resolve_renamed_path("lib/{util → helpers}.rs"), "lib/helpers.rs");
    }

    #[test]
    fn test_marker_with_nested_path() {
        assert_eq!(
            resolve_renamed_path("{old/dir → new/place}/mod.rs"),
            "new/place/mod.rs"
        );
    }

    #[test]
    fn test_display_name_round_trips_through_resolution() {
        let cases = [
            ("src/app.js", "lib/app.js", "{src → lib}/app.js"),
            ("src/old.js", "src/new.js", "src/{old.js → new.js}"),
            ("a/b/c.rs", "a/x/c.rs", "a/{b → x}/c.rs"),
            ("same.rs", "same.rs", "same.rs"),
            ("one.rs", "two.rs", "{one.rs → two.rs}"),
        ];
        for (old, new, display) in cases {
            assert_eq!(rename_display_name(old, new), display);
            assert_eq!(resolve_renamed_path(display), new);
        }
    }

    #[test]
    fn test_display_name_keeps_both_halves_non_empty() {
        let display = rename_display_name("a/b.rs", "a/c/b.rs");
        assert_eq!(display, "a/{b.rs → c/b.rs}");
        assert_eq!(resolve_renamed_path(&display), "a/c/b.rs");
    }
}
