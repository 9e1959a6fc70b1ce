// canvasdel-core/src/layout/mod.rs
//! Post-deletion layout repair, one strategy per layout engine.

pub mod auto;
pub mod constraint;

use crate::tree::WidgetTree;
use crate::widget::{WidgetId, WidgetType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Transient per-widget runtime state (measured heights, visibility, ...)
pub type WidgetsMeta = HashMap<WidgetId, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("canvas width must be a positive number, got {0}")]
    InvalidCanvasWidth(f64),
    #[error("zones of section {parent} claim {total} columns, more than {max}")]
    DistributionOverflow {
        parent: WidgetId,
        total: u32,
        max: u32,
    },
    #[error("unknown layout system: {0}")]
    UnknownSystem(String),
}

/// Environment facts some engines need while repairing
#[derive(Debug, Clone, Default)]
pub struct LayoutContext {
    pub canvas_width: f64,
    pub is_mobile: bool,
    pub meta: WidgetsMeta,
}

impl LayoutContext {
    pub fn new(canvas_width: f64, is_mobile: bool) -> Self {
        Self {
            canvas_width,
            is_mobile,
            meta: WidgetsMeta::new(),
        }
    }

    pub fn with_meta(mut self, meta: WidgetsMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Repairs a parent's layout metadata after one child left the tree.
///
/// Implementations receive the already-pruned tree, must never reintroduce
/// `removed`, and must never drop widgets on their own.
pub trait LayoutAdapter {
    fn repair(
        &self,
        tree: WidgetTree,
        parent: &WidgetId,
        removed: &WidgetId,
        removed_type: WidgetType,
        ctx: &LayoutContext,
    ) -> Result<WidgetTree, LayoutError>;
}

/// The layout engine active for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSystem {
    /// Absolute positioning; pruning plus dropping stale references is enough
    #[default]
    Fixed,
    /// Flex layers that flow and wrap with the canvas width
    Auto,
    /// Nested sections and zones sharing a column budget
    Constraint,
}

impl LayoutAdapter for LayoutSystem {
    fn repair(
        &self,
        tree: WidgetTree,
        parent: &WidgetId,
        removed: &WidgetId,
        removed_type: WidgetType,
        ctx: &LayoutContext,
    ) -> Result<WidgetTree, LayoutError> {
        let tree = match self {
            LayoutSystem::Fixed => tree,
            LayoutSystem::Auto => auto::repair(tree, parent, removed, ctx)?,
            LayoutSystem::Constraint => constraint::repair(tree, parent, removed, removed_type)?,
        };
        Ok(forget(tree, parent, removed))
    }
}

/// Drop whatever the parent still says about `removed`, whichever engine wrote it.
///
/// Documents converted between engines keep the old engine's metadata around.
fn forget(mut tree: WidgetTree, parent: &WidgetId, removed: &WidgetId) -> WidgetTree {
    if let Some(p) = tree.get_mut(parent)
        && p.references_in_layout(removed)
    {
        p.flex_layers = auto::without(&p.flex_layers, removed);
        p.sections = constraint::prune(std::mem::take(&mut p.sections), removed);
        p.space_distribution.shift_remove(removed);
    }
    tree
}

impl fmt::Display for LayoutSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutSystem::Fixed => "fixed",
            LayoutSystem::Auto => "auto",
            LayoutSystem::Constraint => "constraint",
        };
        f.write_str(name)
    }
}

impl FromStr for LayoutSystem {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "none" => Ok(LayoutSystem::Fixed),
            "auto" | "flex" => Ok(LayoutSystem::Auto),
            "constraint" | "anvil" => Ok(LayoutSystem::Constraint),
            other => Err(LayoutError::UnknownSystem(other.to_string())),
        }
    }
}
