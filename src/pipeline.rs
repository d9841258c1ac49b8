//! Declarative pass pipelines
//!
//! A [`Pipeline`] is an ordered list of [`Pass`]es run against one tree. It
//! can be written in JSON or YAML, each pass tagged by `op`:
//!
//! ```yaml
//! - op: define
//!   label: "<String>"
//! - op: hide_all
//!   name: string
//!   pattern: '"[^"\n]*"'
//!   label: "<String>"
//! - op: ignore
//!   name: string
//! - op: hide_nested
//!   name: _Brackets
//!   pattern: '\(([^()<Content>]*)\)'
//!   label: "<Brackets>"
//!   content: { name: content, label: "<Content>", group: 1 }
//!   rename: Brackets
//! ```
//!
//! `hide_nested` extracts nested structures from the inside out: it repeats
//! `hide_any` until nothing matches, and after every round can promote a
//! capture group of the fresh nodes into its own child and rename them, so
//! the next round sees a glyph where the inner structure was.

use crate::error::HideError;
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::fmt;

fn wildcard() -> String {
    "*".to_string()
}

/// Capture group promotion run after every `hide_nested` round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPromotion {
    pub name: String,
    pub label: String,
    pub group: usize,
}

/// One step of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Pass {
    /// Define a label, with a macro body when `pattern` is given
    Define {
        label: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    HideAll {
        name: String,
        pattern: String,
        label: String,
        #[serde(default = "wildcard")]
        target: String,
    },
    HideNested {
        name: String,
        pattern: String,
        label: String,
        #[serde(default = "wildcard")]
        target: String,
        #[serde(default)]
        content: Option<GroupPromotion>,
        #[serde(default)]
        rename: Option<String>,
    },
    HideGroup {
        name: String,
        label: String,
        group: usize,
        #[serde(default = "wildcard")]
        target: String,
        source: String,
    },
    HideRest {
        name: String,
        label: String,
        #[serde(default = "wildcard")]
        target: String,
    },
    Ignore {
        name: String,
    },
    Unignore,
    Rename {
        name: String,
        #[serde(default = "wildcard")]
        target: String,
        from: String,
    },
    ReplaceAll {
        from: String,
        to: String,
        #[serde(default = "wildcard")]
        target: String,
    },
}

impl Pass {
    /// The `op` tag of the pass
    pub fn op(&self) -> &'static str {
        match self {
            Pass::Define { .. } => "define",
            Pass::HideAll { .. } => "hide_all",
            Pass::HideNested { .. } => "hide_nested",
            Pass::HideGroup { .. } => "hide_group",
            Pass::HideRest { .. } => "hide_rest",
            Pass::Ignore { .. } => "ignore",
            Pass::Unignore => "unignore",
            Pass::Rename { .. } => "rename",
            Pass::ReplaceAll { .. } => "replace_all",
        }
    }
}

/// Errors that can occur while loading or running a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The pipeline definition could not be parsed
    Definition(String),
    /// A pass failed; the tree is as the previous passes left it
    Pass { index: usize, source: HideError },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Definition(msg) => write!(f, "Invalid pipeline: {}", msg),
            PipelineError::Pass { index, source } => {
                write!(f, "Pass {} failed: {}", index, source)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Definition(_) => None,
            PipelineError::Pass { source, .. } => Some(source),
        }
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Nodes created by each pass, in pass order
    pub created: Vec<usize>,
}

impl PipelineReport {
    pub fn total(&self) -> usize {
        self.created.iter().sum()
    }
}

/// An ordered list of passes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    pub passes: Vec<Pass>,
}

impl Pipeline {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }

    pub fn from_json(source: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(source).map_err(|e| PipelineError::Definition(e.to_string()))
    }

    pub fn from_yaml(source: &str) -> Result<Self, PipelineError> {
        serde_yaml::from_str(source).map_err(|e| PipelineError::Definition(e.to_string()))
    }

    /// Run every pass in order, stopping at the first failure
    pub fn run(&self, tree: &mut Tree) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();
        for (index, pass) in self.passes.iter().enumerate() {
            let before = tree.len();
            run_pass(tree, pass).map_err(|source| PipelineError::Pass { index, source })?;
            let created = tree.len() - before;
            log::debug!(
                target: "hidetree",
                "pass {} ({}) created {} node(s)",
                index,
                pass.op(),
                created
            );
            report.created.push(created);
        }
        Ok(report)
    }
}

fn run_pass(tree: &mut Tree, pass: &Pass) -> Result<(), HideError> {
    match pass {
        Pass::Define { label, pattern } => {
            match pattern {
                Some(body) => tree.define_macro(label, body)?,
                None => tree.define(label)?,
            };
        }
        Pass::HideAll {
            name,
            pattern,
            label,
            target,
        } => tree.hide_all(name, pattern, label, target)?,
        Pass::HideNested {
            name,
            pattern,
            label,
            target,
            content,
            rename,
        } => hide_nested(
            tree,
            name,
            pattern,
            label,
            target,
            content.as_ref(),
            rename.as_deref(),
        )?,
        Pass::HideGroup {
            name,
            label,
            group,
            target,
            source,
        } => tree.hide_node_group(name, label, *group, target, source)?,
        Pass::HideRest {
            name,
            label,
            target,
        } => tree.hide_the_rest(name, label, target)?,
        Pass::Ignore { name } => tree.ignore_all(name),
        Pass::Unignore => tree.unignore_all(),
        Pass::Rename { name, target, from } => {
            tree.set_node_name_all(name, target, from);
        }
        Pass::ReplaceAll { from, to, target } => {
            tree.replace_all(from, to, target);
        }
    }
    Ok(())
}

fn hide_nested(
    tree: &mut Tree,
    name: &str,
    pattern: &str,
    label: &str,
    target: &str,
    content: Option<&GroupPromotion>,
    rename: Option<&str>,
) -> Result<(), HideError> {
    let max_rounds = tree.config().max_rounds;
    let mut rounds = 0;
    while tree.hide_any(name, pattern, label, target)? {
        if let Some(promotion) = content {
            tree.hide_node_group(&promotion.name, &promotion.label, promotion.group, target, name)?;
        }
        if let Some(new_name) = rename {
            tree.set_node_name_all(new_name, target, name);
        }
        rounds += 1;
        if rounds >= max_rounds {
            log::warn!(
                target: "hidetree",
                "hide_nested '{}' stopped after {} rounds with matches left",
                name,
                rounds
            );
            break;
        }
    }
    log::debug!(target: "hidetree", "hide_nested '{}' ran {} round(s)", name, rounds);
    Ok(())
}
