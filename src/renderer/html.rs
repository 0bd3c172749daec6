//! HTML generation from compile results

use crate::diagnostics::Diagnostic;
use crate::style::StyleMap;
use crate::template::{RuntimeLayout, RuntimeNode};
use crate::CompileResult;

use super::PreviewConfig;

const PAGE_STYLE: &str = r#"      body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 16px; background: #f8fafc; }
      .luming-label { font-size: 12px; color: #334155; margin-bottom: 6px; font-weight: 600; }
      .luming-scene { margin-bottom: 12px; }
      .luming-diags { background: #fff7ed; border: 1px solid #fdba74; border-radius: 8px; padding: 10px 14px; }
      .luming-diags h2 { margin: 0 0 8px; font-size: 14px; }
      .luming-diags ul { margin: 0; padding-left: 18px; }"#;

/// Build the preview page incrementally
pub struct PreviewBuilder<'c> {
    config: &'c PreviewConfig,
    scenes: Vec<String>,
    diagnostics: Vec<String>,
}

impl<'c> PreviewBuilder<'c> {
    pub fn new(config: &'c PreviewConfig) -> Self {
        Self {
            config,
            scenes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Add one scene; scenes are numbered from 1 in insertion order
    pub fn add_scene(&mut self, scene: &RuntimeLayout) {
        let number = self.scenes.len() + 1;
        let mut out = String::new();
        self.render_layout(scene, 0, &mut out);
        self.scenes.push(format!(
            r#"<section class="luming-scene" data-scene="{}">{}</section>"#,
            number, out
        ));
    }

    pub fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(format!(
            "<li>[{}] {}</li>",
            diagnostic.level,
            escape_html(&diagnostic.message)
        ));
    }

    fn render_layout(&self, layout: &RuntimeLayout, level: usize, out: &mut String) {
        match layout {
            RuntimeLayout::Entity { node } => self.render_node(node, level, out),
            RuntimeLayout::Group {
                direction,
                children,
            } => {
                out.push_str(&format!(
                    r#"<div class="luming-group" style="display:flex; flex-direction:{}; align-items:stretch; gap:{};">"#,
                    direction.as_css(),
                    escape_html(&self.config.gap)
                ));
                for child in children {
                    self.render_layout(child, level, out);
                }
                out.push_str("</div>");
            }
        }
    }

    fn render_node(&self, node: &RuntimeNode, level: usize, out: &mut String) {
        let mut styles = self.config.node_styles.clone();
        styles.extend(node.styles.iter().map(|(k, v)| (k.clone(), v.clone())));

        out.push_str(&format!(
            r#"<div class="luming-node level-{}" style="{}">"#,
            level,
            escape_html(&inline_style(&styles))
        ));
        out.push_str(r#"<div class="luming-label">"#);
        out.push_str(&escape_html(&node.template_name));
        if node.terminated {
            out.push_str(&format!(" ({})", escape_html(&self.config.terminus_label)));
        }
        out.push_str("</div>");
        if let Some(content) = &node.content {
            self.render_layout(content, level + 1, out);
        }
        out.push_str("</div>");
    }

    pub fn build(self) -> String {
        let scenes = if self.scenes.is_empty() {
            "<p>No structure scene parsed.</p>".to_string()
        } else {
            self.scenes.join("\n")
        };
        let diagnostics = if self.diagnostics.is_empty() {
            String::new()
        } else {
            format!(
                r#"<aside class="luming-diags"><h2>Diagnostics</h2><ul>{}</ul></aside>"#,
                self.diagnostics.concat()
            )
        };

        format!(
            r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{}</title>
    <style>
{}
    </style>
  </head>
  <body>
    {}
    {}
  </body>
</html>
"#,
            escape_html(&self.config.title),
            PAGE_STYLE,
            scenes,
            diagnostics
        )
    }
}

/// Render every scene and diagnostic of `result` as a standalone HTML page
pub fn render_preview_html(result: &CompileResult, config: &PreviewConfig) -> String {
    let mut builder = PreviewBuilder::new(config);
    for scene in &result.scenes {
        builder.add_scene(scene);
    }
    for diagnostic in &result.diagnostics {
        builder.add_diagnostic(diagnostic);
    }
    builder.build()
}

/// `key: value;` pairs joined by spaces
fn inline_style(styles: &StyleMap) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape special HTML characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
