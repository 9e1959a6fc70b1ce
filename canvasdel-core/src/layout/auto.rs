// canvasdel-core/src/layout/auto.rs
use super::{LayoutContext, LayoutError};
use crate::tree::WidgetTree;
use crate::widget::{FlexAlign, FlexLayer, Geometry, ResponsiveBehavior, WidgetId};

/// Columns in one auto-layout row
pub const GRID_COLUMNS: u32 = 64;
/// Rows given to a child that has neither geometry nor a measured height
pub const DEFAULT_ROWS: u32 = 4;
const DEFAULT_HUG_COLUMNS: u32 = 16;

/// Drop `removed` from the parent's flex layers and re-flow what is left
pub(crate) fn repair(
    mut tree: WidgetTree,
    parent: &WidgetId,
    removed: &WidgetId,
    ctx: &LayoutContext,
) -> Result<WidgetTree, LayoutError> {
    if !(ctx.canvas_width.is_finite() && ctx.canvas_width > 0.0) {
        return Err(LayoutError::InvalidCanvasWidth(ctx.canvas_width));
    }

    let layers = match tree.get_mut(parent) {
        Some(p) if !p.flex_layers.is_empty() => {
            p.flex_layers = without(&p.flex_layers, removed);
            p.parent_column_space = Some(ctx.canvas_width / f64::from(GRID_COLUMNS));
            p.flex_layers.clone()
        }
        Some(_) => return Ok(tree),
        None => {
            tracing::debug!(%parent, "auto layout parent is gone, nothing to re-flow");
            return Ok(tree);
        }
    };

    place_layers(&mut tree, &layers, ctx);
    Ok(tree)
}

/// Layers with `removed` filtered out. Layers left empty disappear.
pub fn without(layers: &[FlexLayer], removed: &WidgetId) -> Vec<FlexLayer> {
    layers
        .iter()
        .filter_map(|layer| {
            let children: Vec<_> = layer
                .children
                .iter()
                .filter(|c| &c.id != removed)
                .cloned()
                .collect();
            (!children.is_empty()).then(|| FlexLayer::new(children))
        })
        .collect()
}

#[derive(Debug, Clone)]
struct Slot {
    id: WidgetId,
    align: FlexAlign,
    width: u32,
    height: u32,
    fill: bool,
}

fn place_layers(tree: &mut WidgetTree, layers: &[FlexLayer], ctx: &LayoutContext) {
    let mut top = 0u32;
    for layer in layers {
        let slots = measure(tree, layer, ctx);
        let rows = if ctx.is_mobile {
            wrap(slots)
        } else {
            vec![slots]
        };
        for row in rows {
            top = top.saturating_add(place_row(tree, &row, top, ctx.is_mobile));
        }
    }
}

fn measure(tree: &WidgetTree, layer: &FlexLayer, ctx: &LayoutContext) -> Vec<Slot> {
    layer
        .children
        .iter()
        .filter_map(|child| {
            let widget = tree.get(&child.id)?;
            let geometry = if ctx.is_mobile {
                widget.mobile_geometry.or(widget.geometry)
            } else {
                widget.geometry
            };
            let width = geometry
                .map(|g| g.width())
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_HUG_COLUMNS)
                .min(GRID_COLUMNS);
            let height = measured_height(ctx, &child.id)
                .or_else(|| geometry.map(|g| g.height()).filter(|h| *h > 0))
                .unwrap_or(DEFAULT_ROWS);

            Some(Slot {
                id: child.id.clone(),
                align: child.align,
                width,
                height,
                fill: widget.responsive_behavior == ResponsiveBehavior::Fill,
            })
        })
        .collect()
}

fn measured_height(ctx: &LayoutContext, id: &WidgetId) -> Option<u32> {
    let height = ctx.meta.get(id)?.get("height")?.as_u64()?;
    Some(u32::try_from(height).unwrap_or(u32::MAX))
}

/// Break a layer into rows that fit the grid; a fill child wants a whole row
fn wrap(slots: Vec<Slot>) -> Vec<Vec<Slot>> {
    let mut rows = Vec::new();
    let mut current: Vec<Slot> = Vec::new();
    let mut used = 0u32;

    for slot in slots {
        let claim = if slot.fill { GRID_COLUMNS } else { slot.width };
        if !current.is_empty() && used + claim > GRID_COLUMNS {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        used += claim;
        current.push(slot);
    }
    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Assign columns inside one row and return the row height
fn place_row(tree: &mut WidgetTree, row: &[Slot], top: u32, mobile: bool) -> u32 {
    // First pass: hug children keep their width
    let mut widths: Vec<u32> = row.iter().map(|s| if s.fill { 0 } else { s.width }).collect();
    let hug_total: u32 = widths.iter().sum();
    let fill_count = row.iter().filter(|s| s.fill).count() as u32;

    // Second pass: fill children split the free columns, rounding goes to the last one
    if fill_count > 0 {
        let free = GRID_COLUMNS.saturating_sub(hug_total);
        let share = free / fill_count;
        let mut handed = 0;
        for (i, slot) in row.iter().enumerate() {
            if slot.fill {
                widths[i] = share;
                handed += share;
            }
        }
        if handed < free
            && let Some(last) = row.iter().rposition(|s| s.fill)
        {
            widths[last] += free - handed;
        }
    }

    let group_total = |align: FlexAlign| -> u32 {
        row.iter()
            .zip(&widths)
            .filter(|(s, _)| s.align == align)
            .map(|(_, w)| *w)
            .sum()
    };
    let start_total = group_total(FlexAlign::Start);
    let center_total = group_total(FlexAlign::Center);
    let end_total = group_total(FlexAlign::End);

    let mut start_cursor = 0;
    let mut center_cursor = (GRID_COLUMNS.saturating_sub(center_total) / 2).max(start_total);
    let mut end_cursor = GRID_COLUMNS
        .saturating_sub(end_total)
        .max(center_cursor + center_total);

    let mut height = 0;
    for (slot, width) in row.iter().zip(widths.iter().copied()) {
        let cursor = match slot.align {
            FlexAlign::Start => &mut start_cursor,
            FlexAlign::Center => &mut center_cursor,
            FlexAlign::End => &mut end_cursor,
        };
        let geometry = Geometry::new(
            *cursor,
            cursor.saturating_add(width),
            top,
            top.saturating_add(slot.height),
        );
        *cursor = cursor.saturating_add(width);
        height = height.max(slot.height);

        if let Some(widget) = tree.get_mut(&slot.id) {
            if mobile {
                widget.mobile_geometry = Some(geometry);
            } else {
                widget.geometry = Some(geometry);
            }
        }
    }

    height
}
