// canvasdel-core/src/planner.rs
use crate::error::{DeleteError, Rejection};
use crate::tree::WidgetTree;
use crate::widget::{Widget, WidgetId, WidgetType};

/// Outcome of planning a deletion: the pruned tree plus what was taken out of it
#[derive(Debug, Clone)]
pub struct DeletionPlan {
    pub tree: WidgetTree,
    /// Snapshots of every removed widget, targets first, then their descendants
    pub removed: Vec<Widget>,
    /// Name shown to the user for this deletion
    pub resolved_name: String,
}

impl DeletionPlan {
    pub fn removed_ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.removed.iter().map(|w| &w.id)
    }
}

/// Computes the tree that results from removing one widget and its subtree.
///
/// Planning never touches the source tree; committing the plan is up to the caller.
pub struct DeletionPlanner<'a> {
    tree: &'a WidgetTree,
}

impl<'a> DeletionPlanner<'a> {
    pub fn new(tree: &'a WidgetTree) -> Self {
        Self { tree }
    }

    pub fn plan(&self, target: &WidgetId, parent: &WidgetId) -> Result<DeletionPlan, DeleteError> {
        let widget = self
            .tree
            .get(target)
            .ok_or_else(|| Rejection::MissingNode(target.clone()))?;
        let parent_widget = self
            .tree
            .get(parent)
            .ok_or_else(|| Rejection::MissingNode(parent.clone()))?;
        if !widget.is_deletable() {
            return Err(Rejection::NotDeletable(target.clone()).into());
        }

        let removed = self.tree.collect_subtree(target)?;
        let mut tree = self.tree.clone();

        tree.detach_child(parent, target);
        if let Some(actual) = &widget.parent_id
            && actual != parent
        {
            tracing::warn!(%target, %parent, %actual, "deleting widget through a parent that does not own it");
            tree.detach_child(actual, target);
        }

        sync_list_template(&mut tree, target, &removed);

        let resolved_name = match (&parent_widget.widget_type, &widget.tab_name) {
            (WidgetType::Tabs, Some(tab_name)) => tab_name.clone(),
            _ => widget.name.clone(),
        };

        tree.remove_all(removed.iter().map(|w| &w.id));

        tracing::debug!(
            %target,
            %parent,
            cascade = removed.len(),
            "planned widget deletion"
        );

        Ok(DeletionPlan {
            tree,
            removed,
            resolved_name,
        })
    }
}

/// Clear the nearest list ancestor's template of everything that was removed under it
fn sync_list_template(tree: &mut WidgetTree, target: &WidgetId, removed: &[Widget]) {
    let Some(list_id) = tree
        .nearest_ancestor(target, Widget::is_list)
        .map(|w| w.id.clone())
    else {
        return;
    };
    let Some(template) = tree.get_mut(&list_id).and_then(|w| w.list.as_mut()) else {
        return;
    };

    for widget in removed {
        if template.forget(&widget.name) {
            tracing::debug!(list = %list_id, name = %widget.name, "dropped list template entry");
        }
    }
}
