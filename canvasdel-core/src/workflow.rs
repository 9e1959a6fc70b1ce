// canvasdel-core/src/workflow.rs
use crate::bulk::BulkDeletionCoordinator;
use crate::error::{DeleteError, Rejection};
use crate::layout::LayoutAdapter;
use crate::notifier::{
    AnalyticsEvent, AnalyticsEventName, CommandTag, EntityDeleted, Notification, Notifier,
    OperationError, SelectionRequest, UndoToast,
};
use crate::planner::{DeletionPlan, DeletionPlanner};
use crate::store::CanvasStore;
use crate::tabs::{TabChildDeletionHandler, TabChildRequest};
use crate::widget::{Widget, WidgetId, WidgetType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound deletion commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DeleteCommand {
    /// Delete one widget, or the current selection when it holds more than one
    Delete {
        #[serde(default)]
        widget_id: Option<WidgetId>,
        #[serde(default)]
        parent_id: Option<WidgetId>,
        #[serde(default)]
        disallow_undo: bool,
        #[serde(default)]
        is_shortcut: bool,
    },
    DeleteSelected {
        #[serde(default)]
        disallow_undo: bool,
    },
    DeleteTabChild(TabChildRequest),
}

impl DeleteCommand {
    pub fn delete(widget_id: impl Into<WidgetId>) -> Self {
        DeleteCommand::Delete {
            widget_id: Some(widget_id.into()),
            parent_id: None,
            disallow_undo: false,
            is_shortcut: false,
        }
    }

    pub fn tag(&self) -> CommandTag {
        match self {
            DeleteCommand::Delete { .. } => CommandTag::Delete,
            DeleteCommand::DeleteSelected { .. } => CommandTag::DeleteSelected,
            DeleteCommand::DeleteTabChild(_) => CommandTag::DeleteTabChild,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Requested,
    Classified,
    Planned,
    LayoutRepaired,
    Committed,
    Rejected(Rejection),
    Failed(String),
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Committed | WorkflowState::Rejected(_) | WorkflowState::Failed(_)
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Requested => f.write_str("requested"),
            WorkflowState::Classified => f.write_str("classified"),
            WorkflowState::Planned => f.write_str("planned"),
            WorkflowState::LayoutRepaired => f.write_str("layout repaired"),
            WorkflowState::Committed => f.write_str("committed"),
            WorkflowState::Rejected(reason) => write!(f, "rejected: {reason}"),
            WorkflowState::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// What a command turned into once checked against the selection
#[derive(Debug, Clone, PartialEq, Eq)]
enum Classified {
    Single {
        target: WidgetId,
        parent: WidgetId,
        disallow_undo: bool,
        is_shortcut: bool,
    },
    Bulk {
        targets: Vec<WidgetId>,
        parent: WidgetId,
        disallow_undo: bool,
    },
    TabChild(TabChildRequest),
}

/// Runs one command against the store: classify, plan, repair, commit, notify.
///
/// Failures never escape `run`; they end the workflow in `Rejected` or `Failed`.
pub struct DeletionWorkflow<'a, S: CanvasStore + ?Sized, N: Notifier + ?Sized> {
    store: &'a mut S,
    notifier: &'a N,
    history: Vec<WorkflowState>,
}

impl<'a, S: CanvasStore + ?Sized, N: Notifier + ?Sized> DeletionWorkflow<'a, S, N> {
    pub fn new(store: &'a mut S, notifier: &'a N) -> Self {
        Self {
            store,
            notifier,
            history: Vec::new(),
        }
    }

    /// Every state this workflow passed through, oldest first
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    pub fn run(&mut self, command: DeleteCommand) -> WorkflowState {
        let tag = command.tag();
        self.history.clear();
        self.advance(WorkflowState::Requested);

        let terminal = match self.execute(command) {
            Ok(()) => WorkflowState::Committed,
            Err(DeleteError::Rejected(reason)) => {
                tracing::debug!(action = %tag, %reason, "deletion rejected");
                WorkflowState::Rejected(reason)
            }
            Err(e) => {
                let error = e.to_string();
                self.notifier
                    .notify(Notification::OperationError(OperationError {
                        action: tag,
                        error: error.clone(),
                    }));
                WorkflowState::Failed(error)
            }
        };

        self.advance(terminal.clone());
        terminal
    }

    fn advance(&mut self, next: WorkflowState) {
        tracing::trace!(state = %next, "deletion workflow transition");
        self.history.push(next);
    }

    fn execute(&mut self, command: DeleteCommand) -> Result<(), DeleteError> {
        let classified = self.classify(command)?;
        self.advance(WorkflowState::Classified);

        match classified {
            Classified::Single {
                target,
                parent,
                disallow_undo,
                is_shortcut,
            } => self.delete_single(target, parent, disallow_undo, is_shortcut),
            Classified::Bulk {
                targets,
                parent,
                disallow_undo,
            } => self.delete_bulk(targets, parent, disallow_undo),
            Classified::TabChild(request) => self.delete_tab_child(request),
        }
    }

    fn classify(&self, command: DeleteCommand) -> Result<Classified, DeleteError> {
        match command {
            DeleteCommand::Delete {
                widget_id,
                parent_id,
                disallow_undo,
                is_shortcut,
            } => {
                if self.store.selected_widgets().len() > 1 {
                    return self.classify_bulk(disallow_undo);
                }
                let target = match widget_id {
                    Some(id) => id,
                    None => self
                        .store
                        .selected_widget()
                        .map(|w| w.id.clone())
                        .ok_or(Rejection::NothingSelected)?,
                };
                let parent = match parent_id {
                    Some(parent) => parent,
                    None => self.parent_of(&target)?,
                };
                Ok(Classified::Single {
                    target,
                    parent,
                    disallow_undo,
                    is_shortcut,
                })
            }
            DeleteCommand::DeleteSelected { disallow_undo } => {
                match self.store.selected_widgets() {
                    [] => Err(Rejection::NothingSelected.into()),
                    [_] => Err(Rejection::SingleSelection.into()),
                    _ => self.classify_bulk(disallow_undo),
                }
            }
            DeleteCommand::DeleteTabChild(request) => Ok(Classified::TabChild(request)),
        }
    }

    fn classify_bulk(&self, disallow_undo: bool) -> Result<Classified, DeleteError> {
        let targets = self.store.selected_widgets().to_vec();
        let first = targets.first().ok_or(Rejection::NothingSelected)?;
        // The selection is assumed to share the first widget's parent
        let parent = self.parent_of(first)?;
        Ok(Classified::Bulk {
            targets,
            parent,
            disallow_undo,
        })
    }

    fn parent_of(&self, id: &WidgetId) -> Result<WidgetId, Rejection> {
        self.store
            .widget(id)
            .and_then(|w| w.parent_id.clone())
            .ok_or_else(|| Rejection::MissingNode(id.clone()))
    }

    fn delete_single(
        &mut self,
        target: WidgetId,
        parent: WidgetId,
        disallow_undo: bool,
        is_shortcut: bool,
    ) -> Result<(), DeleteError> {
        let plan = DeletionPlanner::new(self.store.widgets()).plan(&target, &parent)?;
        self.advance(WorkflowState::Planned);

        let (widget_name, widget_type) = target_snapshot(&plan, &target)?;
        let resolved_name = plan.resolved_name.clone();
        let removed = self.repair_and_commit(plan, &parent, &target, widget_type)?;

        let name = if is_shortcut {
            AnalyticsEventName::WidgetDeleteViaShortcut
        } else {
            AnalyticsEventName::WidgetDelete
        };
        self.notifier.notify(Notification::Analytics(AnalyticsEvent {
            name,
            widget_name,
            widget_type,
            template_title: self.store.template_title().map(str::to_owned),
        }));
        if !disallow_undo {
            self.notifier.notify(Notification::ClosePropertyPane);
            self.notifier
                .notify(Notification::Select(SelectionRequest::Unselect(vec![
                    target.clone(),
                ])));
            self.announce(UndoToast::deleted(resolved_name, false), &removed);
        }
        self.notifier.notify(Notification::RemoveFocusHistory(
            self.store.current_path().to_string(),
        ));
        Ok(())
    }

    fn delete_bulk(
        &mut self,
        targets: Vec<WidgetId>,
        parent: WidgetId,
        disallow_undo: bool,
    ) -> Result<(), DeleteError> {
        let system = self.store.layout_system();
        let ctx = self.store.layout_context();
        let plan = BulkDeletionCoordinator::new(&system, &ctx).delete_many(
            self.store.widgets(),
            &targets,
            &parent,
        )?;
        self.advance(WorkflowState::Planned);
        // The coordinator folds the adapter itself
        self.advance(WorkflowState::LayoutRepaired);

        let DeletionPlan {
            tree,
            removed,
            resolved_name,
        } = plan;
        self.store.commit(tree)?;

        self.notifier
            .notify(Notification::Select(SelectionRequest::Clear));
        if !disallow_undo {
            self.notifier.notify(Notification::ClosePropertyPane);
            self.notifier.notify(Notification::CloseFilterPane);
            self.announce(UndoToast::deleted(resolved_name, true), &removed);
        }
        let path = self.store.current_path().trim_end_matches('/').to_string();
        for id in &targets {
            self.notifier
                .notify(Notification::RemoveFocusHistory(format!("{path}/widgets/{id}")));
        }
        Ok(())
    }

    fn delete_tab_child(&mut self, request: TabChildRequest) -> Result<(), DeleteError> {
        let plan = TabChildDeletionHandler::new(self.store.widgets()).delete(&request)?;
        self.advance(WorkflowState::Planned);

        let container = self.parent_of(&request.widget_id)?;
        let (_, widget_type) = target_snapshot(&plan, &request.widget_id)?;
        let resolved_name = plan.resolved_name.clone();
        let removed = self.repair_and_commit(plan, &container, &request.widget_id, widget_type)?;

        self.announce(UndoToast::deleted(resolved_name, false), &removed);
        Ok(())
    }

    /// Run the active layout adapter over a single-target plan and commit the result
    fn repair_and_commit(
        &mut self,
        plan: DeletionPlan,
        parent: &WidgetId,
        target: &WidgetId,
        widget_type: WidgetType,
    ) -> Result<Vec<Widget>, DeleteError> {
        let system = self.store.layout_system();
        let ctx = self.store.layout_context();
        let tree = system.repair(plan.tree, parent, target, widget_type, &ctx)?;
        self.advance(WorkflowState::LayoutRepaired);

        self.store.commit(tree)?;
        tracing::info!(%target, %parent, removed = plan.removed.len(), layout = %system, "widget deleted");
        Ok(plan.removed)
    }

    fn announce(&self, toast: UndoToast, removed: &[Widget]) {
        self.notifier.notify(Notification::UndoToast(toast));
        for widget in removed {
            self.notifier
                .notify(Notification::EntityDeleted(EntityDeleted::from(widget)));
        }
    }
}

fn target_snapshot(plan: &DeletionPlan, target: &WidgetId) -> Result<(String, WidgetType), Rejection> {
    plan.removed
        .iter()
        .find(|w| &w.id == target)
        .map(|w| (w.name.clone(), w.widget_type))
        .ok_or_else(|| Rejection::MissingNode(target.clone()))
}
