// canvasdel-core/src/widget.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a widget inside one canvas document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Closed set of widget kinds the editor knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetType {
    #[serde(rename = "CANVAS_WIDGET")]
    Canvas,
    #[serde(rename = "CONTAINER_WIDGET")]
    Container,
    #[serde(rename = "FORM_WIDGET")]
    Form,
    #[serde(rename = "MODAL_WIDGET")]
    Modal,
    #[serde(rename = "TABS_WIDGET")]
    Tabs,
    #[serde(rename = "LIST_WIDGET")]
    List,
    #[serde(rename = "SECTION_WIDGET")]
    Section,
    #[serde(rename = "ZONE_WIDGET")]
    Zone,
    #[serde(rename = "TEXT_WIDGET")]
    Text,
    #[serde(rename = "BUTTON_WIDGET")]
    Button,
    #[serde(rename = "INPUT_WIDGET")]
    Input,
    #[serde(rename = "TABLE_WIDGET")]
    Table,
    #[serde(rename = "IMAGE_WIDGET")]
    Image,
}

impl WidgetType {
    /// Wire tag used in documents, analytics payloads and log records
    pub fn tag(&self) -> &'static str {
        match self {
            WidgetType::Canvas => "CANVAS_WIDGET",
            WidgetType::Container => "CONTAINER_WIDGET",
            WidgetType::Form => "FORM_WIDGET",
            WidgetType::Modal => "MODAL_WIDGET",
            WidgetType::Tabs => "TABS_WIDGET",
            WidgetType::List => "LIST_WIDGET",
            WidgetType::Section => "SECTION_WIDGET",
            WidgetType::Zone => "ZONE_WIDGET",
            WidgetType::Text => "TEXT_WIDGET",
            WidgetType::Button => "BUTTON_WIDGET",
            WidgetType::Input => "INPUT_WIDGET",
            WidgetType::Table => "TABLE_WIDGET",
            WidgetType::Image => "IMAGE_WIDGET",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One tab of a tab container. `index` is the display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub id: String,
    pub index: usize,
    pub label: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    pub widget_id: WidgetId,
}

fn default_visible() -> bool {
    true
}

impl TabEntry {
    pub fn new(id: impl Into<String>, index: usize, label: impl Into<String>, widget_id: impl Into<WidgetId>) -> Self {
        Self {
            id: id.into(),
            index,
            label: label.into(),
            is_visible: true,
            widget_id: widget_id.into(),
        }
    }
}

/// Template state of a list container.
///
/// `template` holds one property snapshot per templated child, keyed by the
/// child's name. Binding and trigger paths look like `template.<name>.<prop>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTemplate {
    #[serde(default)]
    pub template: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub dynamic_binding_paths: Vec<String>,
    #[serde(default)]
    pub dynamic_trigger_paths: Vec<String>,
}

impl ListTemplate {
    /// Drop every template entry and generated path that belongs to `name`.
    /// Returns true when anything was removed.
    pub fn forget(&mut self, name: &str) -> bool {
        let root = format!("template.{name}");
        let under = |path: &String| path == &root || path.starts_with(&format!("{root}."));

        let before = self.dynamic_binding_paths.len() + self.dynamic_trigger_paths.len();
        let had_entry = self.template.shift_remove(name).is_some();
        self.dynamic_binding_paths.retain(|p| !under(p));
        self.dynamic_trigger_paths.retain(|p| !under(p));
        let after = self.dynamic_binding_paths.len() + self.dynamic_trigger_paths.len();

        had_entry || before != after
    }
}

/// Horizontal alignment of a child inside a flex layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerChild {
    pub id: WidgetId,
    #[serde(default)]
    pub align: FlexAlign,
}

impl LayerChild {
    pub fn new(id: impl Into<WidgetId>, align: FlexAlign) -> Self {
        Self {
            id: id.into(),
            align,
        }
    }
}

/// One row of an auto-layout canvas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexLayer {
    pub children: Vec<LayerChild>,
}

impl FlexLayer {
    pub fn new(children: Vec<LayerChild>) -> Self {
        Self { children }
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.children.iter().any(|c| &c.id == id)
    }
}

/// How an auto-layout child claims horizontal space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsiveBehavior {
    Fill,
    #[default]
    Hug,
}

/// Grid placement in columns and rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left_column: u32,
    pub right_column: u32,
    pub top_row: u32,
    pub bottom_row: u32,
}

impl Geometry {
    pub fn new(left_column: u32, right_column: u32, top_row: u32, bottom_row: u32) -> Self {
        Self {
            left_column,
            right_column,
            top_row,
            bottom_row,
        }
    }

    pub fn width(&self) -> u32 {
        self.right_column.saturating_sub(self.left_column)
    }

    pub fn height(&self) -> u32 {
        self.bottom_row.saturating_sub(self.top_row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Row,
    Column,
    Section,
    Zone,
}

/// Region of a constraint-based layout. Regions nest and own widget ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSection {
    pub id: String,
    pub kind: SectionKind,
    #[serde(default)]
    pub widgets: Vec<WidgetId>,
    #[serde(default)]
    pub children: Vec<LayoutSection>,
    /// Permanent regions survive even when they hold nothing
    #[serde(default)]
    pub is_permanent: bool,
}

impl LayoutSection {
    pub fn new(id: impl Into<String>, kind: SectionKind, widgets: Vec<WidgetId>) -> Self {
        Self {
            id: id.into(),
            kind,
            widgets,
            children: Vec::new(),
            is_permanent: false,
        }
    }

    pub fn with_children(mut self, children: Vec<LayoutSection>) -> Self {
        self.children = children;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.is_permanent = true;
        self
    }

    /// True when `id` appears anywhere in this region or below it
    pub fn references(&self, id: &WidgetId) -> bool {
        self.widgets.contains(id) || self.children.iter().any(|c| c.references(id))
    }
}

/// A node of the canvas document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    #[serde(default)]
    pub parent_id: Option<WidgetId>,
    #[serde(default)]
    pub children: Vec<WidgetId>,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deletable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flex_layers: Vec<FlexLayer>,
    #[serde(default)]
    pub responsive_behavior: ResponsiveBehavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_column_space: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<LayoutSection>,
    /// Zone id -> columns, in zone order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub space_distribution: IndexMap<WidgetId, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_count: Option<u32>,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, widget_type: WidgetType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            children: Vec::new(),
            widget_type,
            name: name.into(),
            is_deletable: None,
            tab_name: None,
            tabs: Vec::new(),
            list: None,
            flex_layers: Vec::new(),
            responsive_behavior: ResponsiveBehavior::default(),
            geometry: None,
            mobile_geometry: None,
            parent_column_space: None,
            sections: Vec::new(),
            space_distribution: IndexMap::new(),
            zone_count: None,
        }
    }

    pub fn deletable(mut self, deletable: bool) -> Self {
        self.is_deletable = Some(deletable);
        self
    }

    pub fn with_tab_name(mut self, tab_name: impl Into<String>) -> Self {
        self.tab_name = Some(tab_name.into());
        self
    }

    pub fn with_tabs(mut self, tabs: Vec<TabEntry>) -> Self {
        self.tabs = tabs;
        self
    }

    pub fn with_list(mut self, list: ListTemplate) -> Self {
        self.list = Some(list);
        self
    }

    pub fn with_flex_layers(mut self, layers: Vec<FlexLayer>) -> Self {
        self.flex_layers = layers;
        self
    }

    pub fn with_behavior(mut self, behavior: ResponsiveBehavior) -> Self {
        self.responsive_behavior = behavior;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_sections(mut self, sections: Vec<LayoutSection>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_space_distribution(
        mut self,
        distribution: impl IntoIterator<Item = (WidgetId, u32)>,
    ) -> Self {
        self.space_distribution = distribution.into_iter().collect();
        self.zone_count = Some(self.space_distribution.len() as u32);
        self
    }

    /// Only an explicit `false` blocks deletion
    pub fn is_deletable(&self) -> bool {
        self.is_deletable != Some(false)
    }

    pub fn is_tab_container(&self) -> bool {
        self.widget_type == WidgetType::Tabs
    }

    pub fn is_list(&self) -> bool {
        self.widget_type == WidgetType::List
    }

    /// Tab entries sorted by their display index (stable for equal indices)
    pub fn tabs_in_order(&self) -> Vec<TabEntry> {
        let mut tabs = self.tabs.clone();
        tabs.sort_by_key(|t| t.index);
        tabs
    }

    /// Whether any layout metadata on this widget still points at `id`
    pub fn references_in_layout(&self, id: &WidgetId) -> bool {
        self.flex_layers.iter().any(|l| l.contains(id))
            || self.sections.iter().any(|s| s.references(id))
            || self.space_distribution.contains_key(id)
    }
}
