// canvasdel-core/src/tabs.rs
use crate::error::{DeleteError, Rejection};
use crate::planner::{DeletionPlan, DeletionPlanner};
use crate::tree::WidgetTree;
use crate::widget::{TabEntry, WidgetId};
use serde::{Deserialize, Serialize};

/// Remove one tab: `widget_id` is the tab's canvas, `index` its display position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabChildRequest {
    pub widget_id: WidgetId,
    pub index: usize,
    pub label: String,
}

impl TabChildRequest {
    pub fn new(widget_id: impl Into<WidgetId>, index: usize, label: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            index,
            label: label.into(),
        }
    }
}

pub struct TabChildDeletionHandler<'a> {
    tree: &'a WidgetTree,
}

impl<'a> TabChildDeletionHandler<'a> {
    pub fn new(tree: &'a WidgetTree) -> Self {
        Self { tree }
    }

    /// Plan removal of the tab's widget and rewrite the container's entries in the same tree
    pub fn delete(&self, request: &TabChildRequest) -> Result<DeletionPlan, DeleteError> {
        let tab = self
            .tree
            .get(&request.widget_id)
            .ok_or_else(|| Rejection::MissingNode(request.widget_id.clone()))?;
        let container_id = tab
            .parent_id
            .clone()
            .ok_or_else(|| Rejection::MissingNode(request.widget_id.clone()))?;
        let container = self
            .tree
            .get(&container_id)
            .ok_or_else(|| Rejection::MissingNode(container_id.clone()))?;

        let entries = container.tabs_in_order();
        if entries.len() <= 1 {
            return Err(Rejection::SoleEntryRemaining(container_id).into());
        }

        // The entry owning this widget wins; the requested position is the fallback
        let position = entries
            .iter()
            .position(|e| e.widget_id == request.widget_id)
            .or_else(|| (request.index < entries.len()).then_some(request.index))
            .ok_or_else(|| Rejection::MissingNode(request.widget_id.clone()))?;
        let remaining = reindex(
            entries
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != position)
                .map(|(_, entry)| entry),
        );

        let mut plan = DeletionPlanner::new(self.tree).plan(&request.widget_id, &container_id)?;
        if let Some(container) = plan.tree.get_mut(&container_id) {
            container.tabs = remaining;
        }
        plan.resolved_name = request.label.clone();

        Ok(plan)
    }
}

/// Renumber entries 0..N-1 in the order given
pub fn reindex<I>(entries: I) -> Vec<TabEntry>
where
    I: IntoIterator<Item = TabEntry>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| TabEntry { index, ..entry })
        .collect()
}
