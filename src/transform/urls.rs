//! URL aggregation stage.
//!
//! Finds every URL-bearing attribute in a document and threads each URL
//! through the registered callbacks, highest priority first.

use lol_html::element;
use lol_html::html_content::Element;

use super::stage::{Stage, UrlCallbackFn};
use crate::error::BoxError;
use crate::page::Page;

/// How an attribute stores its URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrKind {
    /// A single URL
    Single,
    /// Whitespace-separated URLs (`ping`, `archive`)
    List,
    /// Comma-separated image candidates (`srcset`)
    SrcSet,
}

use AttrKind::{List, Single, SrcSet};

/// URL-bearing attributes per (lowercase) tag name.
fn url_attributes(tag: &str) -> &'static [(&'static str, AttrKind)] {
    match tag {
        "a" | "area" => &[("href", Single), ("ping", List)],
        "applet" => &[
            ("archive", List),
            ("code", Single),
            ("codebase", Single),
            ("object", Single),
            ("src", Single),
        ],
        "audio" | "embed" | "script" | "track" => &[("src", Single)],
        "base" | "link" => &[("href", Single)],
        "blockquote" | "del" | "ins" | "q" => &[("cite", Single)],
        "body" | "table" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" => {
            &[("background", Single)]
        }
        "button" => &[("formaction", Single)],
        "form" => &[("action", Single)],
        "frame" | "iframe" => &[("longdesc", Single), ("src", Single)],
        "head" => &[("profile", Single)],
        "html" => &[("manifest", Single)],
        "img" => &[("longdesc", Single), ("src", Single), ("srcset", SrcSet)],
        "input" => &[("formaction", Single), ("src", Single)],
        "menuitem" => &[("icon", Single)],
        "object" => &[
            ("archive", List),
            ("classid", Single),
            ("codebase", Single),
            ("data", Single),
            ("usemap", Single),
        ],
        "source" => &[("src", Single), ("srcset", SrcSet)],
        "video" => &[("poster", Single), ("src", Single)],
        _ => &[],
    }
}

/// Build the terminal stage that threads every URL through `callbacks` in
/// order, each callback receiving the previous one's output.
pub(crate) fn chain_stage<'c>(callbacks: Vec<&'c UrlCallbackFn>, page: &'c Page) -> Stage<'c> {
    url_stage(move |url: &str| {
        let mut url = url.to_string();
        for callback in &callbacks {
            url = callback(page, &url)?;
        }
        Ok(url)
    })
}

/// Build a stage that rewrites every URL-bearing attribute with `rewrite_url`.
pub(crate) fn url_stage<'c, F>(rewrite_url: F) -> Stage<'c>
where
    F: Fn(&str) -> Result<String, BoxError> + 'c,
{
    Stage::new().on(element!("*", move |el| rewrite_element(el, |url| rewrite_url(url))))
}

fn rewrite_element(
    el: &mut Element<'_, '_>,
    mut rewrite: impl FnMut(&str) -> Result<String, BoxError>,
) -> Result<(), BoxError> {
    let tag = el.tag_name().to_ascii_lowercase();

    for &(attr, kind) in url_attributes(&tag) {
        let Some(value) = el.get_attribute(attr) else {
            continue;
        };
        let rewritten = match kind {
            Single => rewrite_single(&value, &mut rewrite)?,
            List => rewrite_list(&value, &mut rewrite)?,
            SrcSet => rewrite_srcset(&value, &mut rewrite)?,
        };
        if rewritten != value {
            el.set_attribute(attr, &rewritten)?;
        }
    }

    if tag == "meta" && is_refresh(el) {
        if let Some(content) = el.get_attribute("content") {
            let rewritten = rewrite_refresh(&content, &mut rewrite)?;
            if rewritten != content {
                el.set_attribute("content", &rewritten)?;
            }
        }
    }

    Ok(())
}

fn rewrite_single(
    value: &str,
    rewrite: &mut impl FnMut(&str) -> Result<String, BoxError>,
) -> Result<String, BoxError> {
    if value.trim().is_empty() {
        return Ok(value.to_string());
    }
    rewrite(value)
}

/// Rewrite each whitespace-separated URL, keeping the separators as written.
fn rewrite_list(
    value: &str,
    rewrite: &mut impl FnMut(&str) -> Result<String, BoxError>,
) -> Result<String, BoxError> {
    let mut output = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(|c: char| !c.is_ascii_whitespace()) {
        output.push_str(&rest[..start]);
        rest = &rest[start..];
        let end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
        output.push_str(&rewrite(&rest[..end])?);
        rest = &rest[end..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Rewrite the URL of every image candidate in a `srcset`.
///
/// Candidates are split the way browsers split them: a URL runs until
/// whitespace, so commas inside it (`data:` URIs) belong to the URL, and
/// trailing commas end the candidate. Only URLs are replaced; separators and
/// descriptors are copied through unchanged.
fn rewrite_srcset(
    value: &str,
    rewrite: &mut impl FnMut(&str) -> Result<String, BoxError>,
) -> Result<String, BoxError> {
    let mut output = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(|c: char| !(c.is_ascii_whitespace() || c == ',')) {
        output.push_str(&rest[..start]);
        rest = &rest[start..];

        let url_end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
        let url = rest[..url_end].trim_end_matches(',');
        output.push_str(&rewrite(url)?);
        rest = &rest[url.len()..];
        if url.len() < url_end {
            continue;
        }

        let end = descriptors_end(rest);
        output.push_str(&rest[..end]);
        rest = &rest[end..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Byte offset of the comma ending a candidate's descriptors, ignoring
/// commas inside parentheses.
fn descriptors_end(descriptors: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in descriptors.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return i,
            _ => {}
        }
    }
    descriptors.len()
}

fn is_refresh(el: &Element<'_, '_>) -> bool {
    el.get_attribute("http-equiv")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
}

/// Rewrite the `url=` part of `<meta http-equiv="refresh" content="5; url=...">`.
///
/// A quoted target is rewritten without its quotes, which are kept.
fn rewrite_refresh(
    content: &str,
    rewrite: &mut impl FnMut(&str) -> Result<String, BoxError>,
) -> Result<String, BoxError> {
    // ASCII lowercasing keeps byte offsets intact
    let Some(start) = content.to_ascii_lowercase().find("url=").map(|i| i + 4) else {
        return Ok(content.to_string());
    };
    let target = &content[start..];
    let trimmed = target.trim();
    let leading = &target[..target.len() - target.trim_start().len()];
    let trailing = &target[target.trim_end().len()..];

    let quote = trimmed.chars().next().filter(|c| matches!(c, '\'' | '"'));
    let (url, closing) = match quote {
        Some(q) => match trimmed[1..].strip_suffix(q) {
            Some(url) => (url, Some(q)),
            None => (&trimmed[1..], None),
        },
        None => (trimmed, None),
    };
    if url.trim().is_empty() {
        return Ok(content.to_string());
    }

    let mut output = String::with_capacity(content.len());
    output.push_str(&content[..start]);
    output.push_str(leading);
    output.extend(quote);
    output.push_str(&rewrite(url)?);
    output.extend(closing);
    output.push_str(trailing);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::transform::stage::{rewrite, url_callback};
    use crate::transform::ProcessOptions;

    fn run(html: &str, callback: impl Fn(&str) -> String + Send + Sync + 'static) -> String {
        let callback = url_callback(move |_page, url| Ok(callback(url)));
        let page = Page::default();
        let stage = chain_stage(vec![callback.as_ref()], &page);
        rewrite(html, vec![stage], &ProcessOptions::default()).unwrap()
    }

    #[test]
    fn test_rewrites_href_and_src() {
        let output = run(
            r#"<a href="/about">About</a><img src="/cat.png" alt="cat">"#,
            |url| format!("/docs{url}"),
        );
        assert_eq!(
            output,
            r#"<a href="/docs/about">About</a><img src="/docs/cat.png" alt="cat">"#
        );
    }

    #[test]
    fn test_ignores_non_url_attributes() {
        let html = r#"<p title="/not-a-url" class="/x">text</p><div data-src="/y"></div>"#;
        assert_eq!(run(html, |url| format!("/docs{url}")), html);
    }

    #[test]
    fn test_rewrites_srcset_candidates() {
        let output = run(
            r#"<img srcset="/a.png 1x,/b.png   2x, /c.png">"#,
            |url| format!("/docs{url}"),
        );
        assert_eq!(
            output,
            r#"<img srcset="/docs/a.png 1x,/docs/b.png   2x, /docs/c.png">"#
        );
    }

    #[test]
    fn test_identity_leaves_attributes_untouched() {
        let html = concat!(
            r#"<img srcset=" /a.png 1x ,/b.png   2x,, /c.png" src="/a.png">"#,
            r#"<a href="/x" ping="  /p1   /p2 ">x</a>"#,
            r#"<meta http-equiv="refresh" content="0;  URL= '/next' ">"#,
        );
        assert_eq!(run(html, |url| url.to_string()), html);
    }

    #[test]
    fn test_srcset_keeps_commas_inside_urls() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let output = run(
            r#"<img srcset="data:image/png;base64,AAAA 1x, /b.png 2x">"#,
            move |url| {
                record.lock().unwrap().push(url.to_string());
                if url.starts_with('/') {
                    format!("/docs{url}")
                } else {
                    url.to_string()
                }
            },
        );
        assert_eq!(
            output,
            r#"<img srcset="data:image/png;base64,AAAA 1x, /docs/b.png 2x">"#
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["data:image/png;base64,AAAA", "/b.png"]
        );
    }

    #[test]
    fn test_srcset_trailing_commas_end_a_candidate() {
        let output = run(r#"<img srcset="/a.png,, /b.png 2x">"#, |url| format!("/docs{url}"));
        assert_eq!(output, r#"<img srcset="/docs/a.png,, /docs/b.png 2x">"#);
    }

    #[test]
    fn test_rewrites_ping_list() {
        let output = run(r#"<a href="/x" ping="/p1 /p2">x</a>"#, |url| format!("{url}?t"));
        assert_eq!(output, r#"<a href="/x?t" ping="/p1?t /p2?t">x</a>"#);
    }

    #[test]
    fn test_rewrites_meta_refresh() {
        let output = run(
            r#"<meta http-equiv="refresh" content="5; URL=/next">"#,
            |url| format!("/docs{url}"),
        );
        assert_eq!(
            output,
            r#"<meta http-equiv="refresh" content="5; URL=/docs/next">"#
        );

        let html = r#"<meta name="description" content="/not-a-url">"#;
        assert_eq!(run(html, |url| format!("/docs{url}")), html);
    }

    #[test]
    fn test_rewrites_quoted_meta_refresh() {
        let output = run(
            r#"<meta http-equiv="refresh" content="0; url='/next'">"#,
            |url| format!("/docs{url}"),
        );
        assert_eq!(
            output,
            r#"<meta http-equiv="refresh" content="0; url='/docs/next'">"#
        );

        let html = r#"<meta http-equiv="refresh" content="0; url=''">"#;
        assert_eq!(run(html, |url| format!("/docs{url}")), html);
    }

    #[test]
    fn test_empty_attribute_is_left_alone() {
        let html = r#"<a href="">empty</a>"#;
        assert_eq!(run(html, |url| format!("/docs{url}")), html);
    }

    #[test]
    fn test_callbacks_are_chained() {
        let first = url_callback(|_page, url| Ok(format!("{url}/one")));
        let second = url_callback(|_page, url| Ok(format!("{url}/two")));
        let page = Page::default();
        let stage = chain_stage(vec![first.as_ref(), second.as_ref()], &page);

        let output = rewrite(r#"<a href="/x">x</a>"#, vec![stage], &ProcessOptions::default())
            .unwrap();
        assert_eq!(output, r#"<a href="/x/one/two">x</a>"#);
    }

    #[test]
    fn test_callbacks_see_the_page() {
        let callback = url_callback(|page, url| Ok(format!("{}{url}", page.url)));
        let page = Page::new("index.md", "_site/blog/index.html", "/blog/");
        let stage = chain_stage(vec![callback.as_ref()], &page);

        let output = rewrite(r#"<a href="post">x</a>"#, vec![stage], &ProcessOptions::default())
            .unwrap();
        assert_eq!(output, r#"<a href="/blog/post">x</a>"#);
    }
}
