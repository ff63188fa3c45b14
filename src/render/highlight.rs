use super::DiffHtmlRenderer;
use crate::error::RenderError;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Diff highlighter using syntect's classed HTML output
pub struct SyntectRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Stylesheet for the classes emitted by [`render_fragment`](DiffHtmlRenderer::render_fragment)
    pub fn stylesheet(&self, theme_name: &str) -> Result<String, RenderError> {
        let theme = self
            .theme_set
            .themes
            .get(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(theme_name.to_string()))?;
        Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.theme_set.themes.keys().map(String::as_str)
    }
}

impl Default for SyntectRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffHtmlRenderer for SyntectRenderer {
    fn render_fragment(&self, diff: &str) -> Result<String, RenderError> {
        if diff.trim().is_empty() {
            return Ok(r#"<pre class="diff-fragment diff-empty">No changes</pre>"#.to_string());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_extension("diff")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(diff) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(format!(
            r#"<pre class="diff-fragment">{}</pre>"#,
            generator.finalize()
        ))
    }
}
