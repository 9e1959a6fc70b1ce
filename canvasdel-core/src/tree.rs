// canvasdel-core/src/tree.rs
use crate::widget::{Widget, WidgetId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("widget {0} is not in the tree")]
    Missing(WidgetId),
    #[error("root widget {0} is not in the tree")]
    MissingRoot(WidgetId),
    #[error("root widget {0} must not have a parent")]
    RootHasParent(WidgetId),
    #[error("widget {0} has no parent but is not the root")]
    Orphan(WidgetId),
    #[error("widget {child} points at missing parent {parent}")]
    DanglingParent { child: WidgetId, parent: WidgetId },
    #[error("widget {parent} lists missing child {child}")]
    DanglingChild { parent: WidgetId, child: WidgetId },
    #[error("widget {child} is listed {count} times by parent {parent}")]
    ChildCount {
        parent: WidgetId,
        child: WidgetId,
        count: usize,
    },
    #[error("widget {child} is listed by {listed_by} but its parent is {parent:?}")]
    ParentMismatch {
        child: WidgetId,
        listed_by: WidgetId,
        parent: Option<WidgetId>,
    },
    #[error("cycle detected at widget {0}")]
    Cycle(WidgetId),
    #[error("widget {0} is unreachable from the root")]
    Unreachable(WidgetId),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arena of widgets keyed by id with exactly one root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetTree {
    root: WidgetId,
    widgets: IndexMap<WidgetId, Widget>,
}

impl WidgetTree {
    /// Start a tree from its root widget
    pub fn new(mut root: Widget) -> Self {
        root.parent_id = None;
        let id = root.id.clone();
        let mut widgets = IndexMap::new();
        widgets.insert(id.clone(), root);
        Self { root: id, widgets }
    }

    /// Parse a `{ "root": .., "widgets": {..} }` document and check its invariants
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        let tree: WidgetTree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn root(&self) -> &WidgetId {
        &self.root
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.widgets.keys()
    }

    /// Attach `widget` as the last child of `parent`
    pub fn add_child(&mut self, parent: &WidgetId, mut widget: Widget) -> Result<(), TreeError> {
        let Some(parent_widget) = self.widgets.get_mut(parent) else {
            return Err(TreeError::DanglingParent {
                child: widget.id.clone(),
                parent: parent.clone(),
            });
        };
        parent_widget.children.push(widget.id.clone());
        widget.parent_id = Some(parent.clone());
        self.widgets.insert(widget.id.clone(), widget);
        Ok(())
    }

    /// Snapshot `id` and all of its descendants, `id` first, depth-first in child order
    pub fn collect_subtree(&self, id: &WidgetId) -> Result<Vec<Widget>, TreeError> {
        let mut out = Vec::new();
        let mut seen = IndexSet::new();
        let mut stack = vec![(None::<&WidgetId>, id)];

        while let Some((parent, current)) = stack.pop() {
            let Some(widget) = self.widgets.get(current) else {
                return Err(match parent {
                    Some(parent) => TreeError::DanglingChild {
                        parent: parent.clone(),
                        child: current.clone(),
                    },
                    None => TreeError::Missing(current.clone()),
                });
            };
            if !seen.insert(current.clone()) {
                return Err(TreeError::Cycle(current.clone()));
            }
            out.push(widget.clone());
            // Reverse so the first child is visited first
            for child in widget.children.iter().rev() {
                stack.push((Some(&widget.id), child));
            }
        }

        Ok(out)
    }

    /// Stable-filter `child` out of `parent.children`. Returns true if it was listed.
    pub fn detach_child(&mut self, parent: &WidgetId, child: &WidgetId) -> bool {
        match self.widgets.get_mut(parent) {
            Some(p) => {
                let before = p.children.len();
                p.children.retain(|c| c != child);
                before != p.children.len()
            }
            None => false,
        }
    }

    /// Stable-filter the children of `parent`, keeping those for which `keep` holds
    pub fn retain_children<F>(&mut self, parent: &WidgetId, mut keep: F)
    where
        F: FnMut(&WidgetId) -> bool,
    {
        if let Some(p) = self.widgets.get_mut(parent) {
            p.children.retain(|c| keep(c));
        }
    }

    /// Drop the given ids from the arena. The root is never removed.
    pub fn remove_all<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a WidgetId>,
    {
        let mut removed = 0;
        for id in ids {
            if id == &self.root {
                continue;
            }
            if self.widgets.shift_remove(id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Closest ancestor of `id` (excluding `id` itself) matching `pred`
    pub fn nearest_ancestor<F>(&self, id: &WidgetId, pred: F) -> Option<&Widget>
    where
        F: Fn(&Widget) -> bool,
    {
        let mut current = self.widgets.get(id)?.parent_id.as_ref();
        let mut hops = 0;
        while let Some(parent_id) = current {
            let parent = self.widgets.get(parent_id)?;
            if pred(parent) {
                return Some(parent);
            }
            hops += 1;
            if hops > self.widgets.len() {
                return None;
            }
            current = parent.parent_id.as_ref();
        }
        None
    }

    /// Check every structural invariant of the document
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self
            .widgets
            .get(&self.root)
            .ok_or_else(|| TreeError::MissingRoot(self.root.clone()))?;
        if root.parent_id.is_some() {
            return Err(TreeError::RootHasParent(self.root.clone()));
        }

        for widget in self.widgets.values() {
            for child in &widget.children {
                let Some(child_widget) = self.widgets.get(child) else {
                    return Err(TreeError::DanglingChild {
                        parent: widget.id.clone(),
                        child: child.clone(),
                    });
                };
                if child_widget.parent_id.as_ref() != Some(&widget.id) {
                    return Err(TreeError::ParentMismatch {
                        child: child.clone(),
                        listed_by: widget.id.clone(),
                        parent: child_widget.parent_id.clone(),
                    });
                }
            }

            if widget.id == self.root {
                continue;
            }
            let Some(parent_id) = &widget.parent_id else {
                return Err(TreeError::Orphan(widget.id.clone()));
            };
            let Some(parent) = self.widgets.get(parent_id) else {
                return Err(TreeError::DanglingParent {
                    child: widget.id.clone(),
                    parent: parent_id.clone(),
                });
            };
            let count = parent.children.iter().filter(|c| *c == &widget.id).count();
            if count != 1 {
                return Err(TreeError::ChildCount {
                    parent: parent_id.clone(),
                    child: widget.id.clone(),
                    count,
                });
            }
        }

        // Parent links are consistent, so reaching everything from the root rules out cycles
        let reachable = self.collect_subtree(&self.root)?;
        if reachable.len() != self.widgets.len() {
            let seen: IndexSet<&WidgetId> = reachable.iter().map(|w| &w.id).collect();
            if let Some(stray) = self.widgets.keys().find(|id| !seen.contains(id)) {
                return Err(TreeError::Unreachable(stray.clone()));
            }
        }

        Ok(())
    }
}
