// canvasdel-core/src/error.rs
use crate::layout::LayoutError;
use crate::store::StoreError;
use crate::tree::TreeError;
use crate::widget::WidgetId;

/// Expected refusals. The editor state is left untouched and nothing is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("widget not found: {0}")]
    MissingNode(WidgetId),
    #[error("widget is not deletable: {0}")]
    NotDeletable(WidgetId),
    #[error("tab container {0} must keep at least one tab")]
    SoleEntryRemaining(WidgetId),
    #[error("nothing is selected")]
    NothingSelected,
    #[error("deleting a selection needs more than one selected widget")]
    SingleSelection,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("layout repair failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DeleteError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DeleteError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}
