//! Server-side rendering.
//!
//! Templates under `assets/views` and files under `assets/static` are embedded
//! into the binary at compile time.

pub mod form;

use std::sync::Arc;

use include_dir::{include_dir, Dir, DirEntry};
use serde::Serialize;

use crate::Result;

static VIEWS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/views");
static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/static");

pub trait ViewRenderer {
    /// Renders the view registered under `key`.
    ///
    /// # Errors
    /// When the template is unknown, or rendering fails.
    fn render<S: Serialize>(&self, key: &str, data: S) -> Result<String>;
}

/// Tera engine loaded with the embedded templates.
#[derive(Clone, Debug)]
pub struct TeraView {
    tera: Arc<tera::Tera>,
}

impl TeraView {
    /// Compiles every embedded template.
    ///
    /// # Errors
    /// Fails when a template does not parse or is not UTF-8.
    pub fn build() -> Result<Self> {
        let mut templates = Vec::new();
        collect_templates(&VIEWS, &mut templates)?;

        let mut tera = tera::Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(templates)?;
        tracing::debug!(templates = tera.get_template_names().count(), "views compiled");
        Ok(Self {
            tera: Arc::new(tera),
        })
    }
}

fn collect_templates(dir: &Dir<'_>, out: &mut Vec<(String, String)>) -> Result<()> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(child) => collect_templates(child, out)?,
            DirEntry::File(file) => {
                let name = file.path().to_string_lossy().replace('\\', "/");
                let body = file.contents_utf8().ok_or_else(|| {
                    crate::Error::Message(format!("template `{name}` is not valid UTF-8"))
                })?;
                out.push((name, body.to_owned()));
            }
        }
    }
    Ok(())
}

impl ViewRenderer for TeraView {
    fn render<S: Serialize>(&self, key: &str, data: S) -> Result<String> {
        let context = tera::Context::from_serialize(data)?;
        Ok(self.tera.render(key, &context)?)
    }
}

/// Looks up an embedded static file by its path below `assets/static`.
#[must_use]
pub fn static_asset(path: &str) -> Option<&'static [u8]> {
    let path = path.trim_start_matches('/');
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    STATIC_ASSETS.get_file(path).map(include_dir::File::contents)
}

/// Content type derived from the file extension.
#[must_use]
pub fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_compile() {
        let view = TeraView::build().expect("templates");
        let html = view
            .render(
                "view_graph.html",
                serde_json::json!({ "triples": [], "total": 0, "messages": [] }),
            )
            .expect("rendered");
        assert!(html.contains("0 statements"));
    }

    #[test]
    fn static_lookup_rejects_traversal() {
        assert!(static_asset("form.js").is_some());
        assert!(static_asset("/form.js").is_some());
        assert!(static_asset("../views/index.html").is_none());
        assert_eq!(content_type("form.js"), "text/javascript; charset=utf-8");
    }
}
