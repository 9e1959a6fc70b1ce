// canvasdel-core/src/store.rs
use crate::config::EditorConfig;
use crate::layout::{LayoutContext, LayoutSystem, WidgetsMeta};
use crate::tree::{TreeError, WidgetTree};
use crate::widget::{Widget, WidgetId};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("refusing to commit an invalid tree: {0}")]
    InvalidTree(#[from] TreeError),
}

/// Read access to editor state plus the single write: `commit`
pub trait CanvasStore: Send {
    fn widgets(&self) -> &WidgetTree;

    fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets().get(id)
    }

    fn widgets_meta(&self) -> &WidgetsMeta;

    fn selected_widgets(&self) -> &[WidgetId];

    /// The widget behind a single selection
    fn selected_widget(&self) -> Option<&Widget> {
        match self.selected_widgets() {
            [only] => self.widget(only),
            _ => None,
        }
    }

    fn layout_system(&self) -> LayoutSystem;

    fn canvas_width(&self) -> f64;

    fn is_mobile(&self) -> bool;

    fn template_title(&self) -> Option<&str>;

    fn current_path(&self) -> &str;

    fn layout_context(&self) -> LayoutContext {
        LayoutContext::new(self.canvas_width(), self.is_mobile()).with_meta(self.widgets_meta().clone())
    }

    /// Replace the whole tree in one step. On error the previous tree stays in place.
    fn commit(&mut self, tree: WidgetTree) -> Result<(), StoreError>;
}

/// Store that keeps the document in memory and can mirror it to a JSON file
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tree: WidgetTree,
    meta: WidgetsMeta,
    selection: Vec<WidgetId>,
    layout_system: LayoutSystem,
    canvas_width: f64,
    mobile_breakpoint: f64,
    template_title: Option<String>,
    current_path: String,
    persist_path: Option<PathBuf>,
    commits: usize,
}

impl InMemoryStore {
    pub fn new(tree: WidgetTree) -> Self {
        Self::from_config(tree, &EditorConfig::default())
    }

    pub fn from_config(tree: WidgetTree, config: &EditorConfig) -> Self {
        Self {
            tree,
            meta: WidgetsMeta::new(),
            selection: Vec::new(),
            layout_system: config.layout_system,
            canvas_width: config.canvas_width,
            mobile_breakpoint: config.mobile_breakpoint,
            template_title: config.template_title.clone(),
            current_path: config.current_path.clone(),
            persist_path: config.persist_path.clone(),
            commits: 0,
        }
    }

    pub fn with_selection(mut self, selection: Vec<WidgetId>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_meta(mut self, meta: WidgetsMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_layout_system(mut self, layout_system: LayoutSystem) -> Self {
        self.layout_system = layout_system;
        self
    }

    pub fn with_canvas_width(mut self, canvas_width: f64) -> Self {
        self.canvas_width = canvas_width;
        self
    }

    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    pub fn set_selection(&mut self, selection: Vec<WidgetId>) {
        self.selection = selection;
    }

    /// Number of successful commits so far
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn into_tree(self) -> WidgetTree {
        self.tree
    }
}

impl CanvasStore for InMemoryStore {
    fn widgets(&self) -> &WidgetTree {
        &self.tree
    }

    fn widgets_meta(&self) -> &WidgetsMeta {
        &self.meta
    }

    fn selected_widgets(&self) -> &[WidgetId] {
        &self.selection
    }

    fn layout_system(&self) -> LayoutSystem {
        self.layout_system
    }

    fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    fn is_mobile(&self) -> bool {
        self.canvas_width <= self.mobile_breakpoint
    }

    fn template_title(&self) -> Option<&str> {
        self.template_title.as_deref()
    }

    fn current_path(&self) -> &str {
        &self.current_path
    }

    fn commit(&mut self, tree: WidgetTree) -> Result<(), StoreError> {
        tree.validate()?;
        if let Some(path) = &self.persist_path {
            persist(path, &tree)?;
        }

        self.meta.retain(|id, _| tree.contains(id));
        self.selection.retain(|id| tree.contains(id));
        self.tree = tree;
        self.commits += 1;

        tracing::debug!(widgets = self.tree.len(), commit = self.commits, "committed canvas tree");
        Ok(())
    }
}

/// Write next to the target and rename over it so readers never see half a document
fn persist(path: &Path, tree: &WidgetTree) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(tree)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    std::fs::write(&staging, bytes)?;
    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetType;

    fn tree() -> WidgetTree {
        let mut tree = WidgetTree::new(Widget::new("root", WidgetType::Canvas, "Main"));
        tree.add_child(&"root".into(), Widget::new("a", WidgetType::Text, "Text1"))
            .unwrap();
        tree.add_child(&"root".into(), Widget::new("b", WidgetType::Text, "Text2"))
            .unwrap();
        tree
    }

    #[test]
    fn test_single_selection_resolves_widget() {
        let store = InMemoryStore::new(tree()).with_selection(vec!["a".into()]);
        assert_eq!(store.selected_widget().map(|w| w.name.as_str()), Some("Text1"));

        let store = store.with_selection(vec!["a".into(), "b".into()]);
        assert!(store.selected_widget().is_none());
    }

    #[test]
    fn test_commit_rejects_invalid_tree_and_keeps_previous() {
        let mut store = InMemoryStore::new(tree());
        let mut broken = store.widgets().clone();
        broken.detach_child(&"root".into(), &"a".into());

        assert!(matches!(
            store.commit(broken),
            Err(StoreError::InvalidTree(_))
        ));
        assert_eq!(store.widgets().len(), 3);
        assert_eq!(store.commits(), 0);
    }

    #[test]
    fn test_commit_prunes_stale_selection_and_meta() {
        let mut meta = WidgetsMeta::new();
        meta.insert("a".into(), serde_json::json!({ "height": 3 }));
        let mut store = InMemoryStore::new(tree())
            .with_selection(vec!["a".into(), "b".into()])
            .with_meta(meta);

        let mut next = store.widgets().clone();
        next.detach_child(&"root".into(), &"a".into());
        next.remove_all([&WidgetId::from("a")]);
        store.commit(next).unwrap();

        assert_eq!(store.selected_widgets(), &[WidgetId::from("b")]);
        assert!(store.widgets_meta().is_empty());
        assert_eq!(store.commits(), 1);
    }

    #[test]
    fn test_commit_persists_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        let mut store = InMemoryStore::new(tree()).with_persist_path(&path);

        let next = store.widgets().clone();
        store.commit(next).unwrap();

        let saved = WidgetTree::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(&saved, store.widgets());
        assert!(!dir.path().join("page.json.tmp").exists());
    }

    #[test]
    fn test_failed_persist_keeps_tree_and_cleans_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail after the staging write
        let path = dir.path().join("page.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"occupied").unwrap();
        let mut store = InMemoryStore::new(tree())
            .with_selection(vec!["b".into()])
            .with_persist_path(&path);

        let mut next = store.widgets().clone();
        next.detach_child(&"root".into(), &"b".into());
        next.remove_all([&WidgetId::from("b")]);

        assert!(matches!(store.commit(next), Err(StoreError::Io(_))));
        assert_eq!(store.widgets(), &tree());
        assert_eq!(store.selected_widgets(), &[WidgetId::from("b")]);
        assert_eq!(store.commits(), 0);
        assert!(path.is_dir());
        assert!(!dir.path().join("page.json.tmp").exists());
    }

    #[test]
    fn test_mobile_follows_breakpoint() {
        let store = InMemoryStore::new(tree()).with_canvas_width(375.0);
        assert!(store.is_mobile());
        assert_eq!(store.layout_context().canvas_width, 375.0);
    }
}
