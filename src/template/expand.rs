//! Template expansion - instantiates templates into a runtime tree
//!
//! Every instantiation gets its own [`RuntimeNode`] with a fresh id and a copy
//! of the template's styles. Self-referential templates are cut at the first
//! re-entry, so the runtime tree is finite even when the template graph has
//! cycles.

use std::collections::HashSet;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Direction, Expression};
use crate::parser::ParsedDocument;
use crate::style::StyleMap;
use crate::CompileOptions;

use super::registry::TemplateRegistry;

/// One instantiation of a template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeNode {
    /// `<template>_<sequence>`, unique within a compilation
    pub id: String,
    pub template_name: String,
    pub content: Option<RuntimeLayout>,
    pub styles: StyleMap,
    /// Set when expansion stopped here (recursion cut or unknown template)
    pub terminated: bool,
}

impl RuntimeNode {
    fn terminal(id: String, template_name: &str, styles: StyleMap) -> Self {
        Self {
            id,
            template_name: template_name.to_string(),
            content: None,
            styles,
            terminated: true,
        }
    }
}

/// Layout of instantiated nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuntimeLayout {
    Entity {
        node: Box<RuntimeNode>,
    },
    Group {
        direction: Direction,
        children: Vec<RuntimeLayout>,
    },
}

impl RuntimeLayout {
    pub fn entity(node: RuntimeNode) -> Self {
        RuntimeLayout::Entity {
            node: Box::new(node),
        }
    }

    /// Entity nodes at the top of this layout, looking through groups but not
    /// into node content
    pub fn top_level_nodes(&self) -> Vec<&RuntimeNode> {
        let mut out = Vec::new();
        self.push_top_level(&mut out);
        out
    }

    fn push_top_level<'a>(&'a self, out: &mut Vec<&'a RuntimeNode>) {
        match self {
            RuntimeLayout::Entity { node } => out.push(node),
            RuntimeLayout::Group { children, .. } => {
                for child in children {
                    child.push_top_level(out);
                }
            }
        }
    }
}

/// Output of expanding one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Expansion {
    pub roots: Vec<RuntimeNode>,
    pub scenes: Vec<RuntimeLayout>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Mutable state for one expansion run
pub struct ExpansionContext<'a> {
    templates: &'a TemplateRegistry,
    /// Templates currently being expanded
    active: HashSet<String>,
    sequence: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(templates: &'a TemplateRegistry) -> Self {
        Self {
            templates,
            active: HashSet::new(),
            sequence: 1,
            diagnostics: Vec::new(),
        }
    }

    fn next_id(&mut self, name: &str) -> String {
        let id = format!("{}_{}", name, self.sequence);
        self.sequence += 1;
        id
    }

    /// Instantiate `name`.
    ///
    /// `explicit` replaces the template's own content. When `from_template` is
    /// set and `name` is already being expanded, a terminal node is returned.
    pub fn expand_entity(
        &mut self,
        name: &str,
        explicit: Option<&Expression>,
        from_template: bool,
    ) -> RuntimeNode {
        let id = self.next_id(name);
        let templates = self.templates;

        let Some(template) = templates.get(name) else {
            tracing::debug!(template = name, id = %id, "unknown template");
            self.diagnostics
                .push(Diagnostic::error(format!("unknown template: {}", name)));
            return RuntimeNode::terminal(id, name, StyleMap::new());
        };

        if from_template && self.active.contains(name) {
            tracing::debug!(template = name, id = %id, "recursive reference cut");
            return RuntimeNode::terminal(id, name, template.styles.clone());
        }

        // An outer expansion of the same name keeps it on the path
        let entered = self.active.insert(name.to_string());
        let content = explicit
            .or(template.content.as_ref())
            .map(|expr| self.expand_layout(expr, true));
        if entered {
            self.active.remove(name);
        }

        tracing::trace!(template = name, id = %id, "instantiated");
        RuntimeNode {
            id,
            template_name: name.to_string(),
            content,
            styles: template.styles.clone(),
            terminated: false,
        }
    }

    /// Instantiate every entity in `expr`
    pub fn expand_layout(&mut self, expr: &Expression, from_template: bool) -> RuntimeLayout {
        match expr {
            Expression::Entity { name } => {
                RuntimeLayout::entity(self.expand_entity(name, None, from_template))
            }
            Expression::Container { name, content } => {
                RuntimeLayout::entity(self.expand_entity(name, Some(content.as_ref()), false))
            }
            Expression::Group {
                direction,
                children,
            } => RuntimeLayout::Group {
                direction: *direction,
                children: children
                    .iter()
                    .map(|child| self.expand_layout(child, from_template))
                    .collect(),
            },
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Expand a parsed document into scenes and roots.
///
/// Each structure statement becomes one scene. Without any, roots are chosen
/// from `options.root_names` or inferred from the templates, and each root is
/// its own scene.
pub fn expand(document: &ParsedDocument, options: &CompileOptions) -> Expansion {
    let mut ctx = ExpansionContext::new(&document.templates);

    let structures: Vec<_> = document.structures().collect();
    if !structures.is_empty() {
        let scenes: Vec<RuntimeLayout> = structures
            .iter()
            .map(|statement| ctx.expand_layout(&statement.expression, false))
            .collect();
        let roots = scenes
            .iter()
            .flat_map(RuntimeLayout::top_level_nodes)
            .cloned()
            .collect();
        tracing::debug!(scenes = scenes.len(), "expanded structure scenes");
        return Expansion {
            roots,
            scenes,
            diagnostics: ctx.into_diagnostics(),
        };
    }

    let root_names = if options.root_names.is_empty() {
        infer_root_names(document)
    } else {
        options.root_names.clone()
    };
    tracing::debug!(roots = ?root_names, "expanding roots");

    let roots: Vec<RuntimeNode> = root_names
        .iter()
        .map(|name| ctx.expand_entity(name, None, true))
        .collect();
    let scenes = roots.iter().cloned().map(RuntimeLayout::entity).collect();

    Expansion {
        roots,
        scenes,
        diagnostics: ctx.into_diagnostics(),
    }
}

/// Templates not referenced inside any template's content, in first-seen
/// order. Falls back to every template when each one is referenced somewhere.
pub fn infer_root_names(document: &ParsedDocument) -> Vec<String> {
    let contained: HashSet<&str> = document
        .templates
        .iter()
        .filter_map(|template| template.content.as_ref())
        .flat_map(Expression::referenced_names)
        .collect();

    let roots: Vec<String> = document
        .templates
        .names()
        .filter(|name| !contained.contains(name))
        .map(str::to_string)
        .collect();

    if roots.is_empty() {
        document.templates.names().map(str::to_string).collect()
    } else {
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn expand_source(source: &str) -> Expansion {
        expand(&parse(source), &CompileOptions::default())
    }

    fn node(layout: &RuntimeLayout) -> &RuntimeNode {
        match layout {
            RuntimeLayout::Entity { node } => node,
            other => panic!("Expected entity layout, got {:?}", other),
        }
    }

    fn ids(nodes: &[RuntimeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_scene_per_structure_statement() {
        let expansion = expand_source("a + b\nc");
        assert_eq!(expansion.scenes.len(), 2);
        assert_eq!(ids(&expansion.roots), vec!["a_1", "b_2", "c_3"]);
        assert!(expansion.diagnostics.is_empty());
    }

    #[test]
    fn test_group_direction_preserved() {
        let expansion = expand_source("a / b");
        match &expansion.scenes[0] {
            RuntimeLayout::Group {
                direction,
                children,
            } => {
                assert_eq!(*direction, Direction::Column);
                assert_eq!(children.len(), 2);
            }
            other => panic!("Expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_self_container_is_cut_once() {
        let expansion = expand_source("a: bg red\na[a]");
        let outer = node(&expansion.scenes[0]);
        assert!(!outer.terminated);
        assert_eq!(outer.id, "a_1");

        let inner = node(outer.content.as_ref().expect("outer content"));
        assert_eq!(inner.template_name, "a");
        assert!(inner.terminated);
        assert!(inner.content.is_none());
        assert_eq!(inner.styles.get("background-color").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_indirect_cycle_terminates() {
        // a -> b -> a through stored content
        let expansion = expand_source("a[b]\nb[a]\na");
        let scene = node(&expansion.scenes[2]);
        assert_eq!(scene.template_name, "a");
        let b = node(scene.content.as_ref().unwrap());
        assert_eq!(b.template_name, "b");
        assert!(!b.terminated);
        let a_again = node(b.content.as_ref().unwrap());
        assert!(a_again.terminated);
    }

    #[test]
    fn test_container_overrides_stored_content() {
        let expansion = expand_source("box[x]\nbox[y]");
        let first = node(&expansion.scenes[0]);
        assert_eq!(node(first.content.as_ref().unwrap()).template_name, "x");
        let second = node(&expansion.scenes[1]);
        assert_eq!(node(second.content.as_ref().unwrap()).template_name, "y");
    }

    #[test]
    fn test_plain_reference_uses_latest_content() {
        let expansion = expand_source("box[x]\nbox[y]\nbox");
        let third = node(&expansion.scenes[2]);
        assert_eq!(node(third.content.as_ref().unwrap()).template_name, "y");
    }

    #[test]
    fn test_styles_copied_per_instance() {
        let expansion = expand_source("tab: bg blue; rd 8\ntab+tab");
        assert_eq!(ids(&expansion.roots), vec!["tab_1", "tab_2"]);
        assert_eq!(expansion.roots[0].styles, expansion.roots[1].styles);
        assert!(expansion.roots.iter().all(|n| !n.terminated));
    }

    #[test]
    fn test_unknown_root_name() {
        let options = CompileOptions::new().with_root("nonexistent");
        let expansion = expand(&parse(""), &options);
        assert_eq!(expansion.roots.len(), 1);
        let root = &expansion.roots[0];
        assert!(root.terminated);
        assert!(root.styles.is_empty());
        assert_eq!(root.id, "nonexistent_1");

        assert_eq!(expansion.diagnostics.len(), 1);
        let d = &expansion.diagnostics[0];
        assert_eq!(d.level, Level::Error);
        assert!(d.message.contains("nonexistent"));
    }

    #[test]
    fn test_unknown_names_consume_sequence() {
        let options = CompileOptions::new().with_root("ghost").with_root("a");
        let expansion = expand(&parse("a: bg red"), &options);
        assert_eq!(ids(&expansion.roots), vec!["ghost_1", "a_2"]);
        assert_eq!(expansion.scenes.len(), 2);
    }

    #[test]
    fn test_roots_inferred_in_first_seen_order() {
        let expansion = expand_source("b: bg red\na: color blue");
        assert_eq!(ids(&expansion.roots), vec!["b_1", "a_2"]);
        assert_eq!(node(&expansion.scenes[1]).template_name, "a");
    }

    #[test]
    fn test_root_names_win_over_structure_free_inference() {
        let options = CompileOptions::new().with_root("a");
        let expansion = expand(&parse("a: bg red\nb: bg blue"), &options);
        assert_eq!(ids(&expansion.roots), vec!["a_1"]);
    }

    #[test]
    fn test_infer_root_names_excludes_contained() {
        let mut document = parse("");
        let content = Expression::entity("child");
        document.templates.ensure("parent", 1).set_content(content);
        document.templates.ensure("child", 1);
        document.templates.ensure("other", 2);
        assert_eq!(infer_root_names(&document), vec!["parent", "other"]);
    }

    #[test]
    fn test_infer_root_names_falls_back_to_all() {
        let mut document = parse("");
        document
            .templates
            .ensure("loop", 1)
            .set_content(Expression::entity("loop"));
        assert_eq!(infer_root_names(&document), vec!["loop"]);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let source = "a: bg red\na[b + c]\nb[a]\nc / a";
        assert_eq!(expand_source(source), expand_source(source));
    }
}
