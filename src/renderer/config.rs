//! Configuration for preview rendering

use crate::style::StyleMap;

/// Configuration options for the HTML preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    /// Page title
    pub title: String,

    /// CSS gap between the children of a group
    pub gap: String,

    /// Suffix label for nodes where expansion stopped
    pub terminus_label: String,

    /// Styles every node starts from, overridden key-by-key by its own styles
    pub node_styles: StyleMap,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        let node_styles = [
            ("border", "1px solid #94a3b8"),
            ("padding", "8px"),
            ("margin", "6px"),
            ("border-radius", "8px"),
            ("background-color", "#ffffff"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            title: "Luming Preview".to_string(),
            gap: "6px".to_string(),
            terminus_label: "Terminus".to_string(),
            node_styles,
        }
    }
}

impl PreviewConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the gap between group children
    pub fn with_gap(mut self, gap: impl Into<String>) -> Self {
        self.gap = gap.into();
        self
    }

    /// Set the label shown on terminated nodes
    pub fn with_terminus_label(mut self, label: impl Into<String>) -> Self {
        self.terminus_label = label.into();
        self
    }

    /// Set or replace one default node style
    pub fn with_node_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_styles.insert(key.into(), value.into());
        self
    }
}
