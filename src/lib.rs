//! # hidetree
//!
//! Staged, regex-driven hiding of text regions into a reversible node tree.
//!
//! A [`Tree`] starts as a single root node holding some text. Each hide pass
//! matches a regular expression against the visible text of the target nodes,
//! moves every match into a new child node and leaves a placeholder glyph in
//! its place. Later passes no longer see what was hidden, so strings can be
//! protected from the comment pass, comments from the bracket pass, and so
//! on. [`Tree::unhide_all`] puts everything back byte for byte.
//!
//! ```text
//! let mut tree = Tree::new("x = 'a(b)' ! note\n");
//! tree.define("<String>")?;
//! tree.hide_all("string", "'[^'\\n]*'", "<String>", "*")?;
//! tree.hide_all("comment", "!.*\\n", "\n", "*")?;
//! // root text: "x = ◆ \n"
//! tree.unhide_all();
//! ```
//!
//! ## Modules
//!
//! - [`labels`]: labels, glyphs and pattern macros
//! - [`node`]: the node record
//! - [`tree`]: the arena, the hide family, folding and the query API
//! - [`dump`]: debug dump and serde snapshots
//! - [`pipeline`]: passes loaded from JSON or YAML
//! - [`config`] and [`error`]

pub mod config;
pub mod dump;
pub mod error;
pub mod labels;
pub mod node;
pub mod pipeline;
pub mod tree;

pub use config::{ConfigError, GlyphPool, TreeConfig};
pub use dump::NodeSnapshot;
pub use error::HideError;
pub use labels::{Label, LabelRegistry};
pub use node::{FoldRecord, Node, NodeId};
pub use pipeline::{GroupPromotion, Pass, Pipeline, PipelineError, PipelineReport};
pub use tree::{Tree, ROOT};
