// canvasdel-core/src/notifier.rs
use crate::event::{EventBus, topics};
use crate::widget::{Widget, WidgetId, WidgetType};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoToast {
    pub label: String,
    pub is_bulk: bool,
    pub is_undo: bool,
    pub is_redo: bool,
}

impl UndoToast {
    /// Toast offered right after a deletion: "<label> deleted, undo?"
    pub fn deleted(label: impl Into<String>, is_bulk: bool) -> Self {
        Self {
            label: label.into(),
            is_bulk,
            is_undo: false,
            is_redo: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalyticsEventName {
    #[serde(rename = "WIDGET_DELETE")]
    WidgetDelete,
    #[serde(rename = "WIDGET_DELETE_VIA_SHORTCUT")]
    WidgetDeleteViaShortcut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsEvent {
    pub name: AnalyticsEventName,
    pub widget_name: String,
    pub widget_type: WidgetType,
    pub template_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Widget,
}

/// Console record for one removed widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDeleted {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: WidgetId,
    pub widget_type: WidgetType,
}

impl From<&Widget> for EntityDeleted {
    fn from(widget: &Widget) -> Self {
        Self {
            name: widget.name.clone(),
            entity_type: EntityType::Widget,
            id: widget.id.clone(),
            widget_type: widget.widget_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionRequest {
    Unselect(Vec<WidgetId>),
    Clear,
}

/// Which command a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandTag {
    #[serde(rename = "WIDGET_DELETE")]
    Delete,
    #[serde(rename = "WIDGET_BULK_DELETE")]
    DeleteSelected,
    #[serde(rename = "WIDGET_DELETE_TAB_CHILD")]
    DeleteTabChild,
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CommandTag::Delete => "WIDGET_DELETE",
            CommandTag::DeleteSelected => "WIDGET_BULK_DELETE",
            CommandTag::DeleteTabChild => "WIDGET_DELETE_TAB_CHILD",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    pub action: CommandTag,
    pub error: String,
}

/// Everything a deletion tells the rest of the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Notification {
    UndoToast(UndoToast),
    Analytics(AnalyticsEvent),
    EntityDeleted(EntityDeleted),
    RemoveFocusHistory(String),
    ClosePropertyPane,
    CloseFilterPane,
    Select(SelectionRequest),
    OperationError(OperationError),
}

impl Notification {
    pub fn topic(&self) -> &'static str {
        match self {
            Notification::UndoToast(_) => topics::UNDO_TOAST,
            Notification::Analytics(_) => topics::ANALYTICS,
            Notification::EntityDeleted(_) => topics::ENTITY_DELETED,
            Notification::RemoveFocusHistory(_) => topics::FOCUS_HISTORY,
            Notification::ClosePropertyPane => topics::PROPERTY_PANE,
            Notification::CloseFilterPane => topics::FILTER_PANE,
            Notification::Select(_) => topics::SELECTION,
            Notification::OperationError(_) => topics::OPERATION_ERROR,
        }
    }
}

/// Outbound boundary of the deletion workflows. Fire-and-forget.
pub trait Notifier: Send {
    fn notify(&self, notification: Notification);
}

/// Publishes notifications on the event bus and mirrors console records to `tracing`
#[derive(Clone)]
pub struct BusNotifier {
    bus: EventBus,
}

impl BusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl Notifier for BusNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::EntityDeleted(record) => tracing::info!(
                name = %record.name,
                id = %record.id,
                widget_type = %record.widget_type,
                "Widget was deleted"
            ),
            Notification::OperationError(failure) => tracing::error!(
                action = %failure.action,
                error = %failure.error,
                "widget operation failed"
            ),
            _ => {}
        }

        let topic = notification.topic();
        let delivered = self.bus.publish(notification);
        tracing::trace!(topic, delivered, "published notification");
    }
}
