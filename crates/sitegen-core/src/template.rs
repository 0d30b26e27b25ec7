//! Document rendering via `minijinja`.
//!
//! The built-in template is compiled into the binary. Operators can point
//! `generation.template_path` at a file on disk to replace it without
//! recompiling. The template is registered under a `.html` name, so every
//! interpolated value is HTML-escaped.

use minijinja::{Environment, context};

use crate::error::SiteError;

/// Template used when no override is configured.
const BUILTIN_TEMPLATE: &str = include_str!("../templates/site.html.j2");

/// Name the document template is registered under.
const TEMPLATE_NAME: &str = "site.html";

/// Upper bound on highlight bullets derived from a prompt.
const MAX_HIGHLIGHTS: usize = 5;

/// Renders the HTML document for a prompt.
pub struct DocumentRenderer {
    env: Environment<'static>,
}

impl DocumentRenderer {
    /// Renderer backed by the built-in template.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if the built-in template fails to
    /// compile.
    pub fn builtin() -> Result<Self, SiteError> {
        Self::from_source(BUILTIN_TEMPLATE.to_owned())
    }

    /// Renderer backed by a template file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if the file cannot be read or does
    /// not compile.
    pub fn from_file(path: &str) -> Result<Self, SiteError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| SiteError::Template(format!("failed to read {path}: {e}")))?;
        Self::from_source(source)
    }

    /// Renderer backed by the given template source.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if the source does not compile.
    pub fn from_source(source: String) -> Result<Self, SiteError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source)
            .map_err(|e| SiteError::Template(format!("failed to add site template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the full document.
    ///
    /// The output depends only on `title` and `prompt`, so identical input
    /// renders byte-identical documents.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if rendering fails.
    pub fn render(&self, title: Option<&str>, prompt: &str) -> Result<String, SiteError> {
        let title = title.unwrap_or(prompt);
        self.env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| SiteError::Template(format!("missing site template: {e}")))?
            .render(context! {
                title => title,
                prompt => prompt,
                highlights => highlights(prompt),
            })
            .map_err(|e| SiteError::Template(format!("site render failed: {e}")))
    }
}

impl std::fmt::Debug for DocumentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRenderer").finish_non_exhaustive()
    }
}

/// Split a prompt into short bullet points, one per sentence or line.
fn highlights(prompt: &str) -> Vec<&str> {
    let items: Vec<&str> = prompt
        .split(['.', '\n', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_HIGHLIGHTS)
        .collect();

    if items.is_empty() {
        vec![prompt.trim()]
    } else {
        items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_template_renders_prompt() {
        let html = DocumentRenderer::builtin()
            .unwrap()
            .render(None, "fan site")
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>fan site</title>"));
        assert!(html.contains("<p>fan site</p>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn title_overrides_heading() {
        let html = DocumentRenderer::builtin()
            .unwrap()
            .render(Some("Fan Club"), "a site for fans")
            .unwrap();
        assert!(html.contains("<h1>Fan Club</h1>"));
        assert!(html.contains("a site for fans"));
    }

    #[test]
    fn prompt_is_html_escaped() {
        let html = DocumentRenderer::from_source(String::from("<p>{{ prompt }}</p>"))
            .unwrap()
            .render(None, "<script>alert(1)</script>")
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = DocumentRenderer::builtin().unwrap();
        let a = renderer.render(None, "Bakery. Fresh bread daily!").unwrap();
        let b = renderer.render(None, "Bakery. Fresh bread daily!").unwrap();
        assert_eq!(a, b);
        assert!(a.contains("<li>Fresh bread daily</li>"));
    }

    #[test]
    fn broken_template_is_reported() {
        let result = DocumentRenderer::from_source(String::from("{% for %}"));
        assert!(matches!(result, Err(SiteError::Template(_))));
    }

    #[test]
    fn missing_template_file_is_reported() {
        let result = DocumentRenderer::from_file("/nonexistent/sitegen/template.html");
        assert!(matches!(result, Err(SiteError::Template(_))));
    }

    #[test]
    fn highlights_split_sentences() {
        assert_eq!(
            highlights("Bakery. Fresh bread daily!\nOpen late?"),
            ["Bakery", "Fresh bread daily", "Open late"]
        );
        assert_eq!(highlights("   "), [""]);
        assert_eq!(highlights("a.b.c.d.e.f.g").len(), MAX_HIGHLIGHTS);
    }
}
