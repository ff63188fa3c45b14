mod highlight;
mod page;

pub use highlight::SyntectRenderer;
pub use page::{
    render_page, PageAssets, PREVIEW_CSS, PREVIEW_JS, SCRIPT_ASSETS, STYLESHEET_ASSETS,
};

use crate::error::RenderError;

/// Turns raw diff text into an HTML fragment.
pub trait DiffHtmlRenderer {
    fn render_fragment(&self, diff: &str) -> Result<String, RenderError>;
}
