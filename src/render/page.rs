use maud::{html, PreEscaped, DOCTYPE};

/// Layout styles shipped next to the theme stylesheet.
pub const PREVIEW_CSS: &str = r#"body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
    background: #1e1e1e;
    color: #d4d4d4;
}
.diff-command {
    padding: 0.5rem 1rem;
    background: #252526;
    border-bottom: 1px solid #333;
}
.diff-command code {
    font-family: "SF Mono", Menlo, Consolas, monospace;
    white-space: pre-wrap;
}
.diff-preview {
    padding: 1rem;
    overflow-x: auto;
}
.diff-fragment {
    margin: 0;
    font-family: "SF Mono", Menlo, Consolas, monospace;
    font-size: 13px;
    line-height: 1.4;
}
.diff-empty {
    color: #808080;
    font-style: italic;
}
"#;

/// Keeps the scroll position across reloads of the same preview.
pub const PREVIEW_JS: &str = r#"(function () {
    var key = "diffpane-scroll:" + location.pathname;
    window.addEventListener("beforeunload", function () {
        sessionStorage.setItem(key, String(window.scrollY));
    });
    window.addEventListener("load", function () {
        var y = parseInt(sessionStorage.getItem(key) || "0", 10);
        if (y > 0) window.scrollTo(0, y);
    });
})();
"#;

/// Media-relative stylesheet paths every page links, theme first
pub const STYLESHEET_ASSETS: &[&str] = &["diff.css", "preview.css"];
pub const SCRIPT_ASSETS: &[&str] = &["preview.js"];

/// Resolved URIs of the resources the page links to
#[derive(Debug, Clone, Default)]
pub struct PageAssets {
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
}

/// Build the complete preview document.
///
/// `fragment` is already-rendered markup and is inserted unescaped; `command`
/// is shown verbatim (escaped) above it.
pub fn render_page(title: &str, assets: &PageAssets, fragment: &str, command: Option<&str>) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for href in &assets.stylesheets {
                    link rel="stylesheet" href=(href);
                }
                @for src in &assets.scripts {
                    script src=(src) {}
                }
            }
            body {
                @if let Some(command) = command {
                    header class="diff-command" {
                        code { (command) }
                    }
                }
                main class="diff-preview" {
                    (PreEscaped(fragment))
                }
            }
        }
    }
    .into_string()
}
