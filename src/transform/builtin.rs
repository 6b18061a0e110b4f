//! Built-in plugins and URL callbacks selectable by name from configuration.

use std::sync::Arc;

use lol_html::{doc_comments, element};

use super::{PluginFn, RegisterOptions, Stage, Transformer, UrlCallbackFn, plugin, url_callback};
use crate::config::Config;
use crate::error::{BoxError, TransformError};
use crate::page::Page;

/// Add `rel="noopener noreferrer"` to links pointing off-site.
///
/// Links that already carry a `rel` attribute are left alone.
pub fn external_links(_page: &Page) -> Stage<'_> {
    Stage::new().on(element!("a[href]", |el| {
        let external = el
            .get_attribute("href")
            .is_some_and(|href| href.starts_with("http://") || href.starts_with("https://"));
        if external && !el.has_attribute("rel") {
            el.set_attribute("rel", "noopener noreferrer")?;
        }
        Ok(())
    }))
}

/// Remove every HTML comment.
pub fn strip_comments(_page: &Page) -> Stage<'_> {
    Stage::new().on_document(doc_comments!(|comment| {
        comment.remove();
        Ok(())
    }))
}

/// Prefix root-relative URLs (`/about`) with a deployment path prefix.
///
/// Protocol-relative (`//cdn`), absolute and page-relative URLs are kept.
pub fn path_prefix(
    prefix: &str,
) -> impl Fn(&Page, &str) -> Result<String, BoxError> + Send + Sync + 'static {
    let prefix = prefix.trim_end_matches('/').to_string();
    move |_page, url| {
        if prefix.is_empty() || !is_root_relative(url) {
            return Ok(url.to_string());
        }
        Ok(format!("{prefix}{url}"))
    }
}

/// Turn root-relative URLs into URLs relative to the current page.
///
/// With a page served at `/blog/post/`, `/css/site.css` becomes
/// `../../css/site.css`.
pub fn relative(page: &Page, url: &str) -> Result<String, BoxError> {
    if !is_root_relative(url) {
        return Ok(url.to_string());
    }

    let dir = page.url.rsplit_once('/').map_or("", |(dir, _)| dir);
    let depth = dir.split('/').filter(|segment| !segment.is_empty()).count();
    let up = if depth == 0 {
        "./".to_string()
    } else {
        "../".repeat(depth)
    };

    Ok(format!("{up}{}", &url[1..]))
}

fn is_root_relative(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

/// Look up a built-in plugin by name.
pub fn plugin_by_name(name: &str) -> Option<Arc<PluginFn>> {
    match name {
        "external-links" => Some(plugin(external_links)),
        "strip-comments" => Some(plugin(strip_comments)),
        _ => None,
    }
}

/// Look up a built-in URL callback by name.
pub fn url_transform_by_name(
    name: &str,
    config: &Config,
) -> Result<Arc<UrlCallbackFn>, TransformError> {
    match name {
        "path-prefix" => {
            let prefix = config.path_prefix.as_deref().ok_or_else(|| {
                TransformError::configuration(
                    "url transform `path-prefix` requires `path_prefix` to be set",
                )
            })?;
            Ok(url_callback(path_prefix(prefix)))
        }
        "relative" => Ok(url_callback(relative)),
        _ => Err(TransformError::configuration(format!(
            "unknown url transform `{name}`"
        ))),
    }
}

/// Register every plugin and URL callback named in the configuration.
pub fn configure(transformer: &mut Transformer, config: &Config) -> Result<(), TransformError> {
    transformer.set_process_options(config.processing);

    for stage in &config.plugins {
        let factory = plugin_by_name(&stage.name).ok_or_else(|| {
            TransformError::configuration(format!("unknown plugin `{}`", stage.name))
        })?;
        transformer.add_boxed_plugin(
            &stage.extensions,
            factory,
            RegisterOptions::priority(stage.priority),
        );
    }

    for stage in &config.url_transforms {
        let callback = url_transform_by_name(&stage.name, config)?;
        transformer.add_boxed_url_transform(
            &stage.extensions,
            callback,
            RegisterOptions::priority(stage.priority),
        );
    }

    tracing::debug!(
        plugins = config.plugins.len(),
        url_transforms = config.url_transforms.len(),
        "registered configured stages"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::transform::{Aggregate, ProcessOptions, transform_standalone};

    fn page(url: &str) -> Page {
        Page::new("in.md", "out.html", url)
    }

    fn stage(name: &str, priority: i32) -> StageConfig {
        StageConfig {
            name: name.to_string(),
            extensions: "html".to_string(),
            priority,
        }
    }

    #[test]
    fn test_external_links() {
        let html = r#"<a href="https://example.com">x</a><a href="/local">y</a><a href="http://a.b" rel="me">z</a>"#;
        let output = transform_standalone(html, external_links, &ProcessOptions::default()).unwrap();
        assert_eq!(
            output,
            r#"<a href="https://example.com" rel="noopener noreferrer">x</a><a href="/local">y</a><a href="http://a.b" rel="me">z</a>"#
        );
    }

    #[test]
    fn test_strip_comments() {
        let output = transform_standalone(
            "<p>a<!-- hidden -->b</p><!-- gone -->",
            strip_comments,
            &ProcessOptions::default(),
        )
        .unwrap();
        assert_eq!(output, "<p>ab</p>");
    }

    #[test]
    fn test_path_prefix() {
        let prefix = path_prefix("/docs/");
        let page = page("/");
        assert_eq!(prefix(&page, "/about").unwrap(), "/docs/about");
        assert_eq!(prefix(&page, "about").unwrap(), "about");
        assert_eq!(prefix(&page, "//cdn.example.com/a.js").unwrap(), "//cdn.example.com/a.js");
        assert_eq!(prefix(&page, "https://example.com/").unwrap(), "https://example.com/");

        let root = path_prefix("/");
        assert_eq!(root(&page, "/about").unwrap(), "/about");
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative(&page("/blog/post/"), "/css/site.css").unwrap(), "../../css/site.css");
        assert_eq!(relative(&page("/about.html"), "/css/site.css").unwrap(), "./css/site.css");
        assert_eq!(relative(&page("/"), "/").unwrap(), "./");
        assert_eq!(relative(&page("/blog/"), "img.png").unwrap(), "img.png");
        assert_eq!(relative(&page("/blog/"), "https://a.b/c").unwrap(), "https://a.b/c");
    }

    #[test]
    fn test_configure_registers_by_priority() {
        let config = Config {
            path_prefix: Some("/docs/".to_string()),
            plugins: vec![stage("strip-comments", 0), stage("external-links", 5)],
            url_transforms: vec![stage("relative", 0), stage("path-prefix", 10)],
            ..Config::default()
        };
        let mut transformer = Transformer::new();
        transformer.set_benchmarks(Arc::new(Aggregate::new()));
        configure(&mut transformer, &config).unwrap();

        assert_eq!(transformer.plugins_for("html").len(), 2);
        assert_eq!(transformer.url_transforms_for("html").len(), 2);

        // path-prefix (10) runs before relative (0)
        let output = transformer
            .run(
                "_site/blog/index.html",
                r#"<!-- c --><a href="/about">x</a>"#.to_string(),
                &page("/blog/"),
            )
            .unwrap();
        assert_eq!(output, r#"<a href="../docs/about">x</a>"#);
    }

    #[test]
    fn test_configure_rejects_unknown_names() {
        let config = Config {
            plugins: vec![stage("minify", 0)],
            ..Config::default()
        };
        let err = configure(&mut Transformer::new(), &config).unwrap_err();
        assert!(matches!(err, TransformError::Configuration(_)));

        let config = Config {
            url_transforms: vec![stage("path-prefix", 0)],
            ..Config::default()
        };
        let err = configure(&mut Transformer::new(), &config).unwrap_err();
        assert!(err.to_string().contains("path_prefix"));
    }
}
