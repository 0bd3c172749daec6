//! Syntax tree types for the Luming layout notation

use serde::Serialize;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Direction of a group: `+` composes a row, `/` composes a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    Column,
}

impl Direction {
    /// CSS `flex-direction` value for this direction
    pub fn as_css(&self) -> &'static str {
        match self {
            Direction::Row => "row",
            Direction::Column => "column",
        }
    }
}

/// A layout expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Expression {
    /// Bare reference to a named entity: `header`
    Entity { name: String },
    /// Ordered composition: `a + b` or `a / b`
    Group {
        direction: Direction,
        children: Vec<Expression>,
    },
    /// Entity with explicit inline content: `card[title + body]`
    Container {
        name: String,
        content: Box<Expression>,
    },
}

impl Expression {
    pub fn entity(name: impl Into<String>) -> Self {
        Expression::Entity { name: name.into() }
    }

    pub fn container(name: impl Into<String>, content: Expression) -> Self {
        Expression::Container {
            name: name.into(),
            content: Box::new(content),
        }
    }

    /// Build a group, flattening direct children that share its direction.
    ///
    /// A single item collapses to the item itself, so `a + (b + c)` and
    /// `a + b + c` produce the same three-child row.
    pub fn group(direction: Direction, mut items: Vec<Expression>) -> Self {
        if items.len() == 1 {
            return items.remove(0);
        }

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Expression::Group {
                    direction: inner,
                    children: nested,
                } if inner == direction => children.extend(nested),
                other => children.push(other),
            }
        }

        Expression::Group {
            direction,
            children,
        }
    }

    /// Names at the top of this expression, looking through groups but not into
    /// container content
    pub fn top_level_entities(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.push_top_level(&mut out);
        out
    }

    fn push_top_level(&self, out: &mut Vec<String>) {
        match self {
            Expression::Entity { name } | Expression::Container { name, .. } => {
                out.push(name.clone())
            }
            Expression::Group { children, .. } => {
                for child in children {
                    child.push_top_level(out);
                }
            }
        }
    }

    /// Every entity name in the expression, in traversal order, including
    /// container targets and everything nested inside container content
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.push_referenced(&mut out);
        out
    }

    fn push_referenced<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Entity { name } => out.push(name),
            Expression::Container { name, content } => {
                out.push(name);
                content.push_referenced(out);
            }
            Expression::Group { children, .. } => {
                for child in children {
                    child.push_referenced(out);
                }
            }
        }
    }
}

/// Structural line: a layout expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureStatement {
    /// 1-based source line
    pub line: usize,
    pub raw: String,
    pub top_level_entities: Vec<String>,
    pub expression: Expression,
}

/// Style line: `name: token; token`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleStatement {
    /// 1-based source line
    pub line: usize,
    pub raw: String,
    pub entity: String,
    pub tokens: Vec<String>,
}

/// One recorded source line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Statement {
    Structure(StructureStatement),
    Style(StyleStatement),
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::Structure(s) => s.line,
            Statement::Style(s) => s.line,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Statement::Structure(s) => &s.raw,
            Statement::Style(s) => &s.raw,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureStatement> {
        match self {
            Statement::Structure(s) => Some(s),
            Statement::Style(_) => None,
        }
    }
}
