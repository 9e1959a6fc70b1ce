// canvasdel-core/src/layout/constraint.rs
use super::LayoutError;
use crate::tree::WidgetTree;
use crate::widget::{LayoutSection, Widget, WidgetId, WidgetType};

/// Column budget shared by the zones of one section
pub const SECTION_COLUMNS: u32 = 12;

/// Remove `removed` from the parent's regions and hand its space to a neighbour
pub(crate) fn repair(
    mut tree: WidgetTree,
    parent: &WidgetId,
    removed: &WidgetId,
    removed_type: WidgetType,
) -> Result<WidgetTree, LayoutError> {
    let Some(parent_widget) = tree.get_mut(parent) else {
        tracing::debug!(%parent, "constraint layout parent is gone, nothing to repair");
        return Ok(tree);
    };

    parent_widget.sections = prune(std::mem::take(&mut parent_widget.sections), removed);

    if removed_type == WidgetType::Zone && parent_widget.widget_type == WidgetType::Section {
        redistribute(parent_widget, removed)?;
    } else {
        parent_widget.space_distribution.shift_remove(removed);
    }

    Ok(tree)
}

/// Regions without `removed`; regions left with nothing inside are dropped unless permanent
pub fn prune(sections: Vec<LayoutSection>, removed: &WidgetId) -> Vec<LayoutSection> {
    sections
        .into_iter()
        .filter_map(|mut section| {
            section.widgets.retain(|w| w != removed);
            section.children = prune(std::mem::take(&mut section.children), removed);
            let keep =
                section.is_permanent || !section.widgets.is_empty() || !section.children.is_empty();
            keep.then_some(section)
        })
        .collect()
}

/// Give the removed zone's columns to the zone before it, or the one after it when it was first
fn redistribute(section: &mut Widget, removed: &WidgetId) -> Result<(), LayoutError> {
    let total: u32 = section.space_distribution.values().sum();
    if total > SECTION_COLUMNS {
        return Err(LayoutError::DistributionOverflow {
            parent: section.id.clone(),
            total,
            max: SECTION_COLUMNS,
        });
    }

    if let Some(position) = section.space_distribution.get_index_of(removed)
        && let Some((_, vacated)) = section.space_distribution.shift_remove_index(position)
    {
        let neighbour = position.saturating_sub(1);
        if let Some((_, columns)) = section.space_distribution.get_index_mut(neighbour) {
            *columns += vacated;
        }
    }

    section.zone_count = Some(section.space_distribution.len() as u32);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::SectionKind;

    fn section_with_zones(zones: &[(&str, u32)]) -> WidgetTree {
        let layout = LayoutSection::new(
            "layout_section",
            SectionKind::Section,
            zones.iter().map(|(id, _)| WidgetId::from(*id)).collect(),
        );
        let mut tree = WidgetTree::new(Widget::new("main", WidgetType::Canvas, "Main"));
        let section = Widget::new("s", WidgetType::Section, "Section1")
            .with_sections(vec![layout])
            .with_space_distribution(zones.iter().map(|(id, c)| (WidgetId::from(*id), *c)));
        tree.add_child(&"main".into(), section).unwrap();
        for (id, _) in zones {
            tree.add_child(&"s".into(), Widget::new(*id, WidgetType::Zone, *id))
                .unwrap();
        }
        tree
    }

    fn distribution(tree: &WidgetTree) -> Vec<(String, u32)> {
        tree.get(&"s".into())
            .unwrap()
            .space_distribution
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_zone_space_goes_to_previous_neighbour() {
        let tree = section_with_zones(&[("z1", 4), ("z2", 4), ("z3", 4)]);
        let tree = repair(tree, &"s".into(), &"z2".into(), WidgetType::Zone).unwrap();

        assert_eq!(
            distribution(&tree),
            vec![("z1".to_string(), 8), ("z3".to_string(), 4)]
        );
        let section = tree.get(&"s".into()).unwrap();
        assert_eq!(section.zone_count, Some(2));
        assert!(!section.references_in_layout(&"z2".into()));
    }

    #[test]
    fn test_first_zone_space_goes_to_next_neighbour() {
        let tree = section_with_zones(&[("z1", 3), ("z2", 9)]);
        let tree = repair(tree, &"s".into(), &"z1".into(), WidgetType::Zone).unwrap();
        assert_eq!(distribution(&tree), vec![("z2".to_string(), 12)]);
    }

    #[test]
    fn test_overflowing_distribution_is_an_error() {
        let tree = section_with_zones(&[("z1", 8), ("z2", 8)]);
        assert!(matches!(
            repair(tree, &"s".into(), &"z1".into(), WidgetType::Zone),
            Err(LayoutError::DistributionOverflow { total: 16, .. })
        ));
    }

    #[test]
    fn test_prune_drops_empty_regions_but_keeps_permanent_ones() {
        let sections = vec![
            LayoutSection::new("root", SectionKind::Column, vec![])
                .permanent()
                .with_children(vec![
                    LayoutSection::new("row1", SectionKind::Row, vec!["a".into()]),
                    LayoutSection::new("row2", SectionKind::Row, vec!["b".into(), "c".into()]),
                ]),
        ];

        let pruned = prune(sections.clone(), &"a".into());
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].children.len(), 1);
        assert_eq!(pruned[0].children[0].id, "row2");

        let emptied = prune(prune(pruned, &"b".into()), &"c".into());
        assert_eq!(emptied.len(), 1);
        assert!(emptied[0].children.is_empty());
        assert!(emptied[0].is_permanent);
    }

    #[test]
    fn test_plain_widget_removal_leaves_distribution_alone() {
        let tree = section_with_zones(&[("z1", 6), ("z2", 6)]);
        let tree = repair(tree, &"s".into(), &"other".into(), WidgetType::Text).unwrap();
        assert_eq!(
            distribution(&tree),
            vec![("z1".to_string(), 6), ("z2".to_string(), 6)]
        );
    }
}
