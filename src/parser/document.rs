//! Line-by-line statement processing
//!
//! Every non-empty line is either a style line (`name: token; token`) or a
//! structural line. A structural line may carry inline style anchors
//! (`a + b: bg red / c`), which style `b` in place and leave `a + b / c` to be
//! parsed as the layout expression.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Statement, StructureStatement, StyleStatement};
use crate::parser::grammar::parse_structure;
use crate::style::{split_tokens, ShorthandResolver, StyleResolver};
use crate::template::{TemplateDefinition, TemplateRegistry};

static STYLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*:\s*(.*)$").unwrap());

static STYLE_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^A-Za-z0-9_])([A-Za-z][A-Za-z0-9_]*)\s*:\s*").unwrap());

/// Characters that end an inline style body
const STRUCTURAL_DELIMITERS: &[char] = &['/', '+', '[', ']', '(', ')'];

/// Result of parsing a whole source text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub source: String,
    pub statements: Vec<Statement>,
    pub templates: TemplateRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    /// Template names in the order they were first seen
    pub fn template_order(&self) -> Vec<&str> {
        self.templates.names().collect()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&TemplateDefinition> {
        self.templates.get(name)
    }

    /// Structure statements in source order
    pub fn structures(&self) -> impl Iterator<Item = &StructureStatement> {
        self.statements.iter().filter_map(Statement::as_structure)
    }
}

/// Parse source text with the built-in shorthand dictionary
pub fn parse(source: &str) -> ParsedDocument {
    parse_with_resolver(source, &ShorthandResolver)
}

/// Parse source text, resolving style tokens with `resolver`
pub fn parse_with_resolver(source: &str, resolver: &dyn StyleResolver) -> ParsedDocument {
    let mut builder = DocumentBuilder::new(resolver);
    for (index, raw_line) in source.lines().enumerate() {
        builder.process_line(raw_line, index + 1);
    }
    builder.finish(source)
}

/// Inline `name: body` found inside a structural line
#[derive(Debug, Clone, PartialEq)]
struct InlineStyle {
    entity: String,
    tokens: Vec<String>,
}

/// Mutable state threaded through every line of one document
struct DocumentBuilder<'r> {
    resolver: &'r dyn StyleResolver,
    statements: Vec<Statement>,
    templates: TemplateRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> DocumentBuilder<'r> {
    fn new(resolver: &'r dyn StyleResolver) -> Self {
        Self {
            resolver,
            statements: Vec::new(),
            templates: TemplateRegistry::new(),
            diagnostics: Vec::new(),
        }
    }

    fn finish(self, source: &str) -> ParsedDocument {
        ParsedDocument {
            source: source.to_string(),
            statements: self.statements,
            templates: self.templates,
            diagnostics: self.diagnostics,
        }
    }

    fn process_line(&mut self, raw_line: &str, line: usize) {
        let text = raw_line.trim();
        if text.is_empty() {
            return;
        }

        if let Some(style) = self.style_statement(text, line) {
            self.statements.push(Statement::Style(style));
            return;
        }

        let leading = raw_line.len() - raw_line.trim_start().len();
        if let Some(structure) = self.structure_statement(text, line, leading) {
            self.statements.push(Statement::Structure(structure));
        }
    }

    /// Whole-line `name: body`
    fn style_statement(&mut self, text: &str, line: usize) -> Option<StyleStatement> {
        let caps = STYLE_LINE.captures(text)?;
        let entity = caps[1].to_string();
        let tokens = split_tokens(&caps[2]);

        self.apply_styles(&entity, &tokens, line);
        tracing::debug!(line, entity = %entity, tokens = tokens.len(), "style statement");

        Some(StyleStatement {
            line,
            raw: text.to_string(),
            entity,
            tokens,
        })
    }

    /// Resolve tokens into the entity's template, warning on unsupported ones
    fn apply_styles(&mut self, entity: &str, tokens: &[String], line: usize) {
        let resolver = self.resolver;
        let template = self.templates.ensure(entity, line);
        for token in tokens {
            match resolver.resolve(token) {
                Some(declaration) => template.apply_style(declaration),
                None => self.diagnostics.push(
                    Diagnostic::warning(format!("unsupported style token: {}", token))
                        .at_line(line),
                ),
            }
        }
    }

    /// Structural line, possibly with inline style anchors
    ///
    /// `leading` is the whitespace trimmed off the raw line, used to report
    /// error columns against the raw text.
    fn structure_statement(
        &mut self,
        text: &str,
        line: usize,
        leading: usize,
    ) -> Option<StructureStatement> {
        let (remainder, inline_styles) = extract_inline_styles(text);
        for inline in &inline_styles {
            self.apply_styles(&inline.entity, &inline.tokens, line);
        }

        if remainder.is_empty() {
            return None;
        }

        match parse_structure(&remainder) {
            Ok(expression) => {
                self.templates.register_expression(&expression, line);
                tracing::debug!(line, "structure statement");
                Some(StructureStatement {
                    line,
                    raw: text.to_string(),
                    top_level_entities: expression.top_level_entities(),
                    expression,
                })
            }
            Err(err) => {
                tracing::debug!(line, error = %err, "structure line rejected");
                let mut diagnostic = Diagnostic::error(err.to_string()).at_line(line);
                // Offsets only map back onto the raw line when nothing was cut out
                if remainder == text {
                    diagnostic = diagnostic.at_column(leading + err.offset() + 1);
                }
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }
}

/// Split a structural line into its layout text and inline style anchors.
///
/// The anchor name stays in the layout text; only `: body` is removed. A body
/// runs up to the next structural delimiter or the end of the line.
fn extract_inline_styles(text: &str) -> (String, Vec<InlineStyle>) {
    let mut structure = String::new();
    let mut styles = Vec::new();
    let mut index = 0;

    while index < text.len() {
        let segment = &text[index..];
        let anchor = STYLE_ANCHOR.captures(segment).and_then(|caps| caps.get(2));
        let Some(name) = anchor else {
            structure.push_str(segment);
            break;
        };

        let after_name = index + name.end();
        let Some(colon) = text[after_name..].find(':').map(|i| after_name + i) else {
            structure.push_str(segment);
            break;
        };
        structure.push_str(&text[index..colon]);

        let body_start = colon + 1;
        let body_end = text[body_start..]
            .find(STRUCTURAL_DELIMITERS)
            .map_or(text.len(), |i| body_start + i);

        let tokens = split_tokens(&text[body_start..body_end]);
        if !tokens.is_empty() {
            styles.push(InlineStyle {
                entity: name.as_str().to_string(),
                tokens,
            });
        }

        index = body_end;
    }

    (structure.trim().to_string(), styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::parser::ast::{Direction, Expression};
    use pretty_assertions::assert_eq;

    fn styles_of(doc: &ParsedDocument, name: &str) -> Vec<(String, String)> {
        doc.template(name)
            .expect("template should exist")
            .styles
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn test_style_line() {
        let doc = parse("tab: bg blue; rd 8");
        assert_eq!(doc.statements.len(), 1);
        match &doc.statements[0] {
            Statement::Style(s) => {
                assert_eq!(s.entity, "tab");
                assert_eq!(s.tokens, vec!["bg blue", "rd 8"]);
                assert_eq!(s.line, 1);
            }
            other => panic!("Expected style statement, got {:?}", other),
        }
        assert_eq!(
            styles_of(&doc, "tab"),
            vec![
                ("background-color".to_string(), "blue".to_string()),
                ("border-radius".to_string(), "8px".to_string()),
            ]
        );
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn test_later_style_lines_overwrite() {
        let doc = parse("a: bg red; bg green\na: bg blue; color white");
        assert_eq!(
            styles_of(&doc, "a"),
            vec![
                ("background-color".to_string(), "blue".to_string()),
                ("color".to_string(), "white".to_string()),
            ]
        );
    }

    #[test]
    fn test_unsupported_style_token_warns() {
        let doc = parse("\nbox: bg red; wobble");
        assert_eq!(doc.diagnostics.len(), 1);
        let d = &doc.diagnostics[0];
        assert_eq!(d.level, Level::Warning);
        assert_eq!(d.message, "unsupported style token: wobble");
        assert_eq!(d.line, Some(2));
        assert_eq!(styles_of(&doc, "box").len(), 1);
    }

    #[test]
    fn test_empty_style_body_still_registers() {
        let doc = parse("ghost:");
        assert_eq!(doc.statements.len(), 1);
        assert!(doc.template("ghost").unwrap().styles.is_empty());
    }

    #[test]
    fn test_blank_lines_skipped_and_lines_numbered() {
        let doc = parse("\n   \na+b\r\n\nc");
        let lines: Vec<_> = doc.statements.iter().map(Statement::line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_structure_statement() {
        let doc = parse("header / body[nav + main] / footer");
        let s = doc.structures().next().expect("structure statement");
        assert_eq!(s.top_level_entities, vec!["header", "body", "footer"]);
        assert_eq!(
            doc.template_order(),
            vec!["header", "body", "nav", "main", "footer"]
        );
        assert_eq!(doc.template("body").unwrap().default_children, vec!["nav", "main"]);
    }

    #[test]
    fn test_inline_styles_extracted() {
        let (structure, styles) = extract_inline_styles("a + b: bg red; rd 4 / c");
        assert_eq!(structure, "a + b/ c");
        assert_eq!(
            styles,
            vec![InlineStyle {
                entity: "b".to_string(),
                tokens: vec!["bg red".to_string(), "rd 4".to_string()],
            }]
        );
    }

    #[test]
    fn test_inline_style_inside_brackets() {
        let (structure, styles) = extract_inline_styles("page[title: color red + body]");
        assert_eq!(structure, "page[title+ body]");
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].entity, "title");
    }

    #[test]
    fn test_inline_style_applied_and_name_kept() {
        let doc = parse("a + b: bg red");
        let s = doc.structures().next().expect("structure statement");
        assert_eq!(
            s.expression,
            Expression::group(
                Direction::Row,
                vec![Expression::entity("a"), Expression::entity("b")]
            )
        );
        assert_eq!(
            styles_of(&doc, "b"),
            vec![("background-color".to_string(), "red".to_string())]
        );
        // Inline styling registers `b` before the layout is parsed
        assert_eq!(doc.template_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_unsupported_inline_token_warns() {
        let doc = parse("a + b: bg red; wobble / c");
        assert_eq!(doc.diagnostics.len(), 1);
        let d = &doc.diagnostics[0];
        assert_eq!(d.level, Level::Warning);
        assert_eq!(d.message, "unsupported style token: wobble");
        assert_eq!(d.line, Some(1));
        assert_eq!(
            styles_of(&doc, "b"),
            vec![("background-color".to_string(), "red".to_string())]
        );
        let s = doc.structures().next().expect("structure statement");
        assert_eq!(s.top_level_entities, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_non_ascii_whitespace_separates_names() {
        let doc = parse("a +\u{00A0}b");
        assert!(doc.diagnostics.is_empty());
        let s = doc.structures().next().expect("structure statement");
        assert_eq!(s.top_level_entities, vec!["a", "b"]);
    }

    #[test]
    fn test_no_anchor_leaves_line_untouched() {
        let (structure, styles) = extract_inline_styles("a + b");
        assert_eq!(structure, "a + b");
        assert!(styles.is_empty());
    }

    #[test]
    fn test_malformed_line_reports_error() {
        let doc = parse("a: bg red\na[b");
        assert_eq!(doc.statements.len(), 1);
        assert_eq!(doc.diagnostics.len(), 1);
        let d = &doc.diagnostics[0];
        assert_eq!(d.level, Level::Error);
        assert_eq!(d.line, Some(2));
        assert_eq!(d.message, "unexpected end of input");
        assert!(doc.template("a").is_some());
        assert!(doc.template("b").is_none());
    }

    #[test]
    fn test_error_column_points_into_raw_line() {
        let doc = parse("  a + %");
        assert_eq!(doc.diagnostics.len(), 1);
        let d = &doc.diagnostics[0];
        assert_eq!(d.message, "invalid character '%' at 4");
        assert_eq!(d.line, Some(1));
        assert_eq!(d.column, Some(7));
    }

    #[test]
    fn test_inline_styles_survive_parse_failure() {
        let doc = parse("(a + b: bg red");
        assert_eq!(doc.statements.len(), 0);
        assert_eq!(doc.diagnostics.len(), 1);
        assert!(doc.diagnostics[0].is_error());
        assert_eq!(doc.diagnostics[0].column, None);
        assert_eq!(
            styles_of(&doc, "b"),
            vec![("background-color".to_string(), "red".to_string())]
        );
    }

    #[test]
    fn test_custom_resolver() {
        let upper = |token: &str| {
            Some(crate::style::StyleDeclaration::new(
                "content",
                token.to_uppercase(),
            ))
        };
        let doc = parse_with_resolver("x: hello", &upper);
        assert_eq!(
            styles_of(&doc, "x"),
            vec![("content".to_string(), "HELLO".to_string())]
        );
    }
}
