//! Output path and file extension utilities.
//!
//! Output paths are handled as text: overrides follow textual rules, not
//! filesystem semantics, so `page.html` and `dir.d/page` behave the same on
//! every platform.

use std::path::Path;

/// Get the file extension of an output path, without the leading dot.
///
/// Returns an empty string when the path has no extension.
///
/// # Examples
/// ```ignore
/// file_extension("_site/index.html") => "html"
/// file_extension("_site/feed") => ""
/// ```
pub fn file_extension(output_path: &str) -> &str {
    Path::new(output_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

/// Check whether `path` already ends with the given extension.
///
/// The extension may be given with or without its leading dot. An empty
/// extension never matches.
pub fn is_matching_extension(path: &str, extension: &str) -> bool {
    if extension.is_empty() {
        return false;
    }
    if extension.starts_with('.') {
        path.ends_with(extension)
    } else {
        path.ends_with(&format!(".{extension}"))
    }
}

/// Compute the output path a manual transform run should report.
///
/// - No override (or an empty one): the output path is unchanged.
/// - `.ext` (leading dot): the extension is replaced with `ext`.
/// - `other.txt` (dot, no leading dot): the override is the whole new path.
/// - `ext` (no dot): the extension is replaced with `ext`.
///
/// Replacing drops everything after the final `.` of the original path; a
/// path without any `.` is dropped entirely.
///
/// # Examples
/// ```ignore
/// override_output_path("page.html", Some(".json")) => "page.json"
/// override_output_path("page.html", Some("json")) => "page.json"
/// override_output_path("page.html", Some("other.txt")) => "other.txt"
/// override_output_path("page.html", None) => "page.html"
/// ```
pub fn override_output_path(output_path: &str, extension_override: Option<&str>) -> String {
    let Some(extension) = extension_override.filter(|ext| !ext.is_empty()) else {
        return output_path.to_string();
    };

    let extension = if extension.contains('.') {
        match extension.strip_prefix('.') {
            Some(rest) => rest,
            None => return extension.to_string(),
        }
    } else {
        extension
    };

    let stem = output_path
        .rsplit_once('.')
        .map_or("", |(stem, _)| stem);
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("page.html"), "html");
        assert_eq!(file_extension("_site/blog/post/index.html"), "html");
        assert_eq!(file_extension("_site/feed.xml"), "xml");
        assert_eq!(file_extension("_site/feed"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_is_matching_extension() {
        assert!(is_matching_extension("page.json", ".json"));
        assert!(is_matching_extension("page.json", "json"));
        assert!(!is_matching_extension("page.html", ".json"));
        assert!(!is_matching_extension("page.html", "other.txt"));
        assert!(!is_matching_extension("page.html", ""));
    }

    #[test]
    fn test_override_with_leading_dot() {
        assert_eq!(override_output_path("page.html", Some(".json")), "page.json");
        assert_eq!(
            override_output_path("_site/blog/index.html", Some(".min.html")),
            "_site/blog/index.min.html"
        );
    }

    #[test]
    fn test_override_bare_extension() {
        assert_eq!(override_output_path("page.html", Some("json")), "page.json");
        assert_eq!(override_output_path("a.b/page.html", Some("txt")), "a.b/page.txt");
    }

    #[test]
    fn test_override_full_path() {
        assert_eq!(override_output_path("page.html", Some("other.txt")), "other.txt");
    }

    #[test]
    fn test_override_absent_or_empty() {
        assert_eq!(override_output_path("page.html", None), "page.html");
        assert_eq!(override_output_path("page.html", Some("")), "page.html");
    }

    #[test]
    fn test_override_path_without_extension() {
        // Everything after the final dot goes; with no dot, everything goes
        assert_eq!(override_output_path("page", Some("json")), ".json");
    }
}
