// canvasdel-core/src/bulk.rs
use crate::error::{DeleteError, Rejection};
use crate::layout::{LayoutAdapter, LayoutContext};
use crate::planner::DeletionPlan;
use crate::tree::WidgetTree;
use crate::widget::WidgetId;
use indexmap::IndexSet;

/// Deletes a multi-selection that shares one parent.
///
/// Every target is cascaded, the union is removed in one pass, and the layout
/// adapter is folded over the result once per target in selection order.
pub struct BulkDeletionCoordinator<'a, A: LayoutAdapter + ?Sized> {
    adapter: &'a A,
    ctx: &'a LayoutContext,
}

impl<'a, A: LayoutAdapter + ?Sized> BulkDeletionCoordinator<'a, A> {
    pub fn new(adapter: &'a A, ctx: &'a LayoutContext) -> Self {
        Self { adapter, ctx }
    }

    pub fn delete_many(
        &self,
        tree: &WidgetTree,
        targets: &[WidgetId],
        shared_parent: &WidgetId,
    ) -> Result<DeletionPlan, DeleteError> {
        let targets: IndexSet<&WidgetId> = targets.iter().collect();
        if targets.is_empty() {
            return Err(Rejection::NothingSelected.into());
        }
        if !tree.contains(shared_parent) {
            return Err(Rejection::MissingNode(shared_parent.clone()).into());
        }
        for id in &targets {
            let widget = tree
                .get(id)
                .ok_or_else(|| Rejection::MissingNode((*id).clone()))?;
            if !widget.is_deletable() {
                return Err(Rejection::NotDeletable((*id).clone()).into());
            }
        }

        // Union of all cascades; an ancestor and its selected descendant count once
        let mut union = IndexSet::new();
        let mut removed = Vec::new();
        for id in &targets {
            for widget in tree.collect_subtree(id)? {
                if union.insert(widget.id.clone()) {
                    removed.push(widget);
                }
            }
        }

        let mut next = tree.clone();
        next.retain_children(shared_parent, |child| !union.contains(child));
        for widget in &removed {
            // Selections are expected to share a parent; detach strays from their own parent anyway
            if let Some(parent) = &widget.parent_id
                && parent != shared_parent
                && !union.contains(parent)
            {
                tracing::warn!(
                    widget = %widget.id,
                    %parent,
                    %shared_parent,
                    "bulk selection spans more than one parent"
                );
                next.detach_child(parent, &widget.id);
            }
        }
        next.remove_all(&union);

        for id in &targets {
            let removed_type = tree
                .get(id)
                .map(|w| w.widget_type)
                .ok_or_else(|| Rejection::MissingNode((*id).clone()))?;
            next = self
                .adapter
                .repair(next, shared_parent, id, removed_type, self.ctx)?;
        }

        tracing::debug!(
            targets = targets.len(),
            removed = removed.len(),
            %shared_parent,
            "planned bulk deletion"
        );

        Ok(DeletionPlan {
            tree: next,
            removed,
            resolved_name: targets.len().to_string(),
        })
    }
}
