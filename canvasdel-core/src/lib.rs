pub mod bulk;
pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod notifier;
pub mod planner;
pub mod queue;
pub mod store;
pub mod tabs;
pub mod tree;
pub mod widget;
pub mod workflow;

pub use bulk::BulkDeletionCoordinator;
pub use config::{ConfigError, EditorConfig};
pub use error::{DeleteError, Rejection};
pub use event::{BusEvent, EventBus, Subscription, TopicPattern, topics};
pub use layout::{LayoutAdapter, LayoutContext, LayoutError, LayoutSystem, WidgetsMeta};
pub use notifier::{BusNotifier, Notification, Notifier};
pub use planner::{DeletionPlan, DeletionPlanner};
pub use queue::{DeletionQueue, QueueError};
pub use store::{CanvasStore, InMemoryStore, StoreError};
pub use tabs::{TabChildDeletionHandler, TabChildRequest};
pub use tree::{TreeError, WidgetTree};
pub use widget::{Widget, WidgetId, WidgetType};
pub use workflow::{DeleteCommand, DeletionWorkflow, WorkflowState};
