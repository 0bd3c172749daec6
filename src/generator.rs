//! Component code generation
//!
//! Emits one file per template, in first-seen order. Markup mirrors the
//! template's content expression: an entity becomes a self-closing component
//! tag, a container wraps its content, and a group becomes a flex `div`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::ast::Expression;
use crate::style::StyleMap;
use crate::template::TemplateDefinition;
use crate::CompileResult;

/// Output flavour of generated components
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Html,
    Vue,
    React,
}

impl Framework {
    fn uses_components(self) -> bool {
        !matches!(self, Framework::Html)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Html => f.write_str("html"),
            Framework::Vue => f.write_str("vue"),
            Framework::React => f.write_str("react"),
        }
    }
}

/// Configuration for the `generate` step
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub framework: Framework,
    pub out_dir: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            framework: Framework::default(),
            out_dir: PathBuf::from("generated"),
        }
    }
}

impl GenerateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }
}

/// A generated file, with its path relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Generate one file per template of `result`
pub fn generate_files(result: &CompileResult, framework: Framework) -> Vec<GeneratedFile> {
    result
        .document
        .templates
        .iter()
        .map(|template| generate_file(template, framework))
        .collect()
}

fn generate_file(template: &TemplateDefinition, framework: Framework) -> GeneratedFile {
    let name = template.name.as_str();
    let content = template.content.as_ref();
    match framework {
        Framework::Html => GeneratedFile {
            path: format!("{}.html", name),
            content: html_file(name, content, &template.styles),
        },
        Framework::Vue => GeneratedFile {
            path: format!("{}.vue", to_pascal_name(name)),
            content: vue_file(name, content, &template.styles),
        },
        Framework::React => GeneratedFile {
            path: format!("{}.tsx", to_pascal_name(name)),
            content: react_file(name, content, &template.styles),
        },
    }
}

/// Write `files` into `dir`, creating it if needed
pub fn write_files(dir: &Path, files: &[GeneratedFile]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for file in files {
        let path = dir.join(&file.path);
        fs::write(&path, &file.content)?;
        tracing::debug!(path = %path.display(), "wrote generated file");
    }
    Ok(())
}

/// Uppercase the first character
pub fn to_pascal_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Components used by `content`, excluding the template itself, deduplicated
/// in first-use order
fn component_refs<'e>(name: &str, content: Option<&'e Expression>) -> Vec<&'e str> {
    let mut refs: Vec<&str> = Vec::new();
    for referenced in content.map(Expression::referenced_names).unwrap_or_default() {
        if referenced != name && !refs.contains(&referenced) {
            refs.push(referenced);
        }
    }
    refs
}

fn css_lines(styles: &StyleMap) -> Vec<String> {
    styles
        .iter()
        .map(|(k, v)| format!("  {}: {};", k, v))
        .collect()
}

/// Append the markup for `expr`, one tag per line, indented by `depth`
fn push_markup(expr: &Expression, framework: Framework, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let tag = |name: &str| {
        if framework.uses_components() {
            to_pascal_name(name)
        } else {
            name.to_string()
        }
    };

    match expr {
        Expression::Entity { name } => out.push(format!("{}<{} />", indent, tag(name))),
        Expression::Container { name, content } => {
            let tag = tag(name);
            out.push(format!("{}<{}>", indent, tag));
            push_markup(content, framework, depth + 1, out);
            out.push(format!("{}</{}>", indent, tag));
        }
        Expression::Group {
            direction,
            children,
        } => {
            let open = match framework {
                Framework::React => format!(
                    r#"<div style={{{{ display: "flex", flexDirection: "{}", gap: "8px" }}}}>"#,
                    direction.as_css()
                ),
                Framework::Html | Framework::Vue => format!(
                    r#"<div style="display:flex; flex-direction:{}; gap:8px;">"#,
                    direction.as_css()
                ),
            };
            out.push(format!("{}{}", indent, open));
            for child in children {
                push_markup(child, framework, depth + 1, out);
            }
            out.push(format!("{}</div>", indent));
        }
    }
}

fn markup(content: Option<&Expression>, framework: Framework, depth: usize) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(expr) = content {
        push_markup(expr, framework, depth, &mut out);
    }
    out
}

fn html_file(name: &str, content: Option<&Expression>, styles: &StyleMap) -> String {
    let mut lines = vec![format!(r#"<section class="{}">"#, name)];
    lines.extend(markup(content, Framework::Html, 1));
    lines.push("</section>".to_string());
    lines.push(String::new());
    lines.push("<style>".to_string());
    lines.push(format!(".{} {{", name));
    lines.extend(css_lines(styles));
    lines.push("}".to_string());
    lines.push("</style>".to_string());
    lines.join("\n") + "\n"
}

fn vue_file(name: &str, content: Option<&Expression>, styles: &StyleMap) -> String {
    let mut lines = vec![r#"<script setup lang="ts">"#.to_string()];
    for component in component_refs(name, content) {
        let pascal = to_pascal_name(component);
        lines.push(format!("import {} from './{}.vue';", pascal, pascal));
    }
    lines.push("</script>".to_string());
    lines.push(String::new());
    lines.push("<template>".to_string());
    lines.push(format!(r#"  <section class="{}">"#, name));
    lines.extend(markup(content, Framework::Vue, 2));
    lines.push("  </section>".to_string());
    lines.push("</template>".to_string());
    lines.push(String::new());
    lines.push("<style scoped>".to_string());
    lines.push(format!(".{} {{", name));
    lines.extend(css_lines(styles));
    lines.push("}".to_string());
    lines.push("</style>".to_string());
    lines.join("\n") + "\n"
}

fn react_file(name: &str, content: Option<&Expression>, styles: &StyleMap) -> String {
    let mut lines = vec!["import React from 'react';".to_string()];
    for component in component_refs(name, content) {
        let pascal = to_pascal_name(component);
        lines.push(format!("import {{ {} }} from './{}';", pascal, pascal));
    }
    lines.push(String::new());
    lines.push(format!("export function {}() {{", to_pascal_name(name)));
    lines.push("  return (".to_string());
    lines.push("    <section style={{".to_string());
    let entries: Vec<String> = styles
        .iter()
        .map(|(k, v)| {
            format!(
                "      {}: {}",
                serde_json::Value::from(k.as_str()),
                serde_json::Value::from(v.as_str())
            )
        })
        .collect();
    if !entries.is_empty() {
        lines.push(entries.join(",\n"));
    }
    lines.push("    }}>".to_string());
    lines.extend(markup(content, Framework::React, 3));
    lines.push("    </section>".to_string());
    lines.push("  );".to_string());
    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, CompileOptions};
    use pretty_assertions::assert_eq;

    const DASHBOARD: &str = "main: bg #fda; 70\nmain[tabs / content]";

    fn generate(source: &str, framework: Framework) -> Vec<GeneratedFile> {
        generate_files(&compile(source, &CompileOptions::default()), framework)
    }

    fn paths(files: &[GeneratedFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_one_file_per_template_in_order() {
        assert_eq!(
            paths(&generate(DASHBOARD, Framework::Html)),
            vec!["main.html", "tabs.html", "content.html"]
        );
        assert_eq!(
            paths(&generate(DASHBOARD, Framework::Vue)),
            vec!["Main.vue", "Tabs.vue", "Content.vue"]
        );
        assert_eq!(
            paths(&generate(DASHBOARD, Framework::React)),
            vec!["Main.tsx", "Tabs.tsx", "Content.tsx"]
        );
    }

    #[test]
    fn test_pascal_name() {
        assert_eq!(to_pascal_name("navBar"), "NavBar");
        assert_eq!(to_pascal_name("x"), "X");
        assert_eq!(to_pascal_name(""), "");
    }

    #[test]
    fn test_component_refs_dedup_and_skip_self() {
        let expr = crate::parser::parse_structure("a + b[c + a] + b").unwrap();
        assert_eq!(component_refs("a", Some(&expr)), vec!["b", "c"]);
        assert!(component_refs("a", None).is_empty());
    }

    #[test]
    fn test_html_file() {
        let files = generate(DASHBOARD, Framework::Html);
        insta::assert_snapshot!(&files[0].content, @r###"
        <section class="main">
          <div style="display:flex; flex-direction:column; gap:8px;">
            <tabs />
            <content />
          </div>
        </section>

        <style>
        .main {
          background-color: #fda;
          width: 70%;
        }
        </style>
        "###);
    }

    #[test]
    fn test_vue_file() {
        let files = generate(DASHBOARD, Framework::Vue);
        insta::assert_snapshot!(&files[0].content, @r###"
        <script setup lang="ts">
        import Tabs from './Tabs.vue';
        import Content from './Content.vue';
        </script>

        <template>
          <section class="main">
            <div style="display:flex; flex-direction:column; gap:8px;">
              <Tabs />
              <Content />
            </div>
          </section>
        </template>

        <style scoped>
        .main {
          background-color: #fda;
          width: 70%;
        }
        </style>
        "###);
    }

    #[test]
    fn test_react_file() {
        let files = generate(DASHBOARD, Framework::React);
        insta::assert_snapshot!(&files[0].content, @r###"
        import React from 'react';
        import { Tabs } from './Tabs';
        import { Content } from './Content';

        export function Main() {
          return (
            <section style={{
              "background-color": "#fda",
              "width": "70%"
            }}>
              <div style={{ display: "flex", flexDirection: "column", gap: "8px" }}>
                <Tabs />
                <Content />
              </div>
            </section>
          );
        }
        "###);
    }

    #[test]
    fn test_container_wraps_content() {
        let files = generate("card[title]", Framework::Vue);
        let card = &files[0].content;
        assert!(card.contains("    <Title />"));
        assert!(card.contains("import Title from './Title.vue';"));
    }

    #[test]
    fn test_nested_container_markup() {
        let files = generate("page[box[item]]", Framework::Html);
        let page = &files[0].content;
        assert!(page.contains("  <box>\n    <item />\n  </box>"));
    }

    #[test]
    fn test_template_without_content() {
        let files = generate("leaf: color red", Framework::Html);
        assert_eq!(
            files[0].content,
            "<section class=\"leaf\">\n</section>\n\n<style>\n.leaf {\n  color: red;\n}\n</style>\n"
        );
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir().join(format!("luming-generate-{}", std::process::id()));
        let files = generate(DASHBOARD, Framework::Html);
        write_files(&dir, &files).unwrap();

        let written = fs::read_to_string(dir.join("main.html")).unwrap();
        assert_eq!(written, files[0].content);
        assert!(dir.join("content.html").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_framework_display() {
        assert_eq!(Framework::Vue.to_string(), "vue");
        assert_eq!(Framework::default(), Framework::Html);
    }
}
