//! Template system
//!
//! Every name seen in a document becomes a template in the
//! [`TemplateRegistry`]. Expansion turns structure statements (or inferred
//! roots) into a runtime tree with one node per instantiation.
//!
//! # Example
//!
//! ```text
//! card: bg white; rd 8
//! page[header / card + card]
//! ```

mod expand;
mod registry;

pub use expand::{
    expand, infer_root_names, Expansion, ExpansionContext, RuntimeLayout, RuntimeNode,
};
pub use registry::{TemplateDefinition, TemplateRegistry};
