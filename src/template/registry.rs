//! Template registry for storing and retrieving template definitions

use std::collections::HashMap;

use serde::Serialize;

use crate::parser::ast::Expression;
use crate::style::{StyleDeclaration, StyleMap};

/// A stored template definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDefinition {
    /// Template name
    pub name: String,
    /// Line on which the name was first seen
    pub first_defined_line: usize,
    /// Top-level entity names of the content expression
    pub default_children: Vec<String>,
    /// Resolved styles, last write wins
    pub styles: StyleMap,
    /// Content from the most recent `name[...]` occurrence
    pub content: Option<Expression>,
}

impl TemplateDefinition {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            first_defined_line: line,
            default_children: Vec::new(),
            styles: StyleMap::new(),
            content: None,
        }
    }

    /// Insert or overwrite one style property
    pub fn apply_style(&mut self, declaration: StyleDeclaration) {
        self.styles.insert(declaration.key, declaration.value);
    }

    /// Replace the content expression and its default children
    pub fn set_content(&mut self, content: Expression) {
        self.default_children = content.top_level_entities();
        self.content = Some(content);
    }
}

/// Registry for storing template definitions in first-seen order
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<TemplateDefinition>")]
pub struct TemplateRegistry {
    templates: Vec<TemplateDefinition>,
    index: HashMap<String, usize>,
}

impl From<TemplateRegistry> for Vec<TemplateDefinition> {
    fn from(registry: TemplateRegistry) -> Self {
        registry.templates
    }
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the template for `name`, creating it if this is the first sighting
    pub fn ensure(&mut self, name: &str, line: usize) -> &mut TemplateDefinition {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                tracing::debug!(template = name, line, "registering template");
                let position = self.templates.len();
                self.templates.push(TemplateDefinition::new(name, line));
                self.index.insert(name.to_string(), position);
                position
            }
        };
        &mut self.templates[position]
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&TemplateDefinition> {
        self.index.get(name).map(|&i| &self.templates[i])
    }

    /// Template names in first-seen order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    /// Templates in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Register every name in `expression`, recording container content.
    ///
    /// Names are visited in traversal order: a container registers its own name
    /// before anything inside its content.
    pub fn register_expression(&mut self, expression: &Expression, line: usize) {
        match expression {
            Expression::Entity { name } => {
                self.ensure(name, line);
            }
            Expression::Container { name, content } => {
                self.ensure(name, line).set_content(content.as_ref().clone());
                self.register_expression(content, line);
            }
            Expression::Group { children, .. } => {
                for child in children {
                    self.register_expression(child, line);
                }
            }
        }
    }
}
