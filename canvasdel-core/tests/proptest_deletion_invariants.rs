//! Property-based invariant tests for widget deletion.
//!
//! 1. Removing a widget keeps the relative order of its siblings.
//! 2. Removing a container removes its whole subtree and nothing else.
//! 3. Tab entries stay contiguous after one is removed.
//! 4. Overlapping bulk selections remove the union exactly once.
//! 5. No layout system leaves a reference to the removed widget behind.

use std::collections::HashSet;

use canvasdel_core::widget::{FlexAlign, FlexLayer, LayerChild, LayoutSection, SectionKind, TabEntry};
use canvasdel_core::{
    BulkDeletionCoordinator, DeletionPlanner, LayoutAdapter, LayoutContext, LayoutSystem,
    TabChildDeletionHandler, TabChildRequest, Widget, WidgetId, WidgetTree, WidgetType,
};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Node `i` hangs under one of the nodes created before it
fn build_tree(parents: &[Index]) -> WidgetTree {
    let mut tree = WidgetTree::new(Widget::new("w0", WidgetType::Canvas, "MainContainer"));
    for (i, pick) in parents.iter().enumerate() {
        let id = i + 1;
        let parent = WidgetId::from(format!("w{}", pick.index(id)));
        tree.add_child(
            &parent,
            Widget::new(format!("w{id}"), WidgetType::Container, format!("Container{id}")),
        )
        .unwrap();
    }
    decorate(&mut tree);
    tree
}

/// Give every parent flex layers, a section and a column distribution over its children
fn decorate(tree: &mut WidgetTree) {
    let aligns = [FlexAlign::Start, FlexAlign::Center, FlexAlign::End];
    let parents: Vec<(WidgetId, Vec<WidgetId>)> = tree
        .iter()
        .filter(|w| !w.children.is_empty())
        .map(|w| (w.id.clone(), w.children.clone()))
        .collect();

    for (id, children) in parents {
        let layers = children
            .chunks(2)
            .map(|chunk| {
                FlexLayer::new(
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, c)| LayerChild::new(c.clone(), aligns[i % aligns.len()]))
                        .collect(),
                )
            })
            .collect();
        let section = LayoutSection::new(format!("{id}_row"), SectionKind::Row, children.clone());

        let widget = tree.get_mut(&id).unwrap();
        widget.flex_layers = layers;
        widget.sections = vec![section];
        widget.space_distribution = children.iter().map(|c| (c.clone(), 1)).collect();
    }
}

fn tree_strategy() -> impl Strategy<Value = WidgetTree> {
    prop::collection::vec(any::<Index>(), 1..24).prop_map(|parents| build_tree(&parents))
}

/// A random tree plus one of its non-root widgets
fn tree_and_target() -> impl Strategy<Value = (WidgetTree, WidgetId)> {
    (tree_strategy(), any::<Index>()).prop_map(|(tree, pick)| {
        let candidates: Vec<WidgetId> = tree.ids().filter(|id| *id != tree.root()).cloned().collect();
        let target = candidates[pick.index(candidates.len())].clone();
        (tree, target)
    })
}

fn parent_of(tree: &WidgetTree, id: &WidgetId) -> WidgetId {
    tree.get(id).and_then(|w| w.parent_id.clone()).unwrap()
}

fn id_set(tree: &WidgetTree) -> HashSet<WidgetId> {
    tree.ids().cloned().collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Sibling order survives removal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn removal_keeps_sibling_order((tree, target) in tree_and_target()) {
        let parent = parent_of(&tree, &target);
        let plan = DeletionPlanner::new(&tree).plan(&target, &parent).unwrap();

        let expected: Vec<WidgetId> = tree
            .get(&parent)
            .unwrap()
            .children
            .iter()
            .filter(|c| **c != target)
            .cloned()
            .collect();
        prop_assert!(!plan.tree.contains(&target));
        prop_assert_eq!(&plan.tree.get(&parent).unwrap().children, &expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Cascade completeness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cascade_removes_exactly_the_subtree((tree, target) in tree_and_target()) {
        let parent = parent_of(&tree, &target);
        let subtree: HashSet<WidgetId> = tree
            .collect_subtree(&target)
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        let plan = DeletionPlanner::new(&tree).plan(&target, &parent).unwrap();

        let removed: HashSet<WidgetId> = plan.removed_ids().cloned().collect();
        prop_assert_eq!(&removed, &subtree);
        for id in &subtree {
            prop_assert!(!plan.tree.contains(id), "{} survived its ancestor", id);
        }
        prop_assert_eq!(plan.tree.len(), tree.len() - subtree.len());
        prop_assert!(plan.tree.validate().is_ok());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Tab reindexing is contiguous and keeps relative order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tab_indices_stay_contiguous(count in 2usize..8, pick in any::<Index>()) {
        let labels: Vec<String> = (0..count).map(|i| format!("Tab {i}")).collect();
        let mut tree = WidgetTree::new(Widget::new("root", WidgetType::Canvas, "Main"));
        let entries = labels
            .iter()
            .enumerate()
            .map(|(i, label)| TabEntry::new(format!("tab{i}"), i, label.as_str(), format!("c{i}")))
            .collect();
        tree.add_child(&"root".into(), Widget::new("T", WidgetType::Tabs, "Tabs1").with_tabs(entries))
            .unwrap();
        for (i, label) in labels.iter().enumerate() {
            tree.add_child(
                &"T".into(),
                Widget::new(format!("c{i}"), WidgetType::Canvas, format!("Canvas{i}"))
                    .with_tab_name(label.as_str()),
            )
            .unwrap();
        }

        let index = pick.index(count);
        let request = TabChildRequest::new(format!("c{index}"), index, labels[index].as_str());
        let plan = TabChildDeletionHandler::new(&tree).delete(&request).unwrap();

        let tabs = &plan.tree.get(&"T".into()).unwrap().tabs;
        let indices: Vec<usize> = tabs.iter().map(|t| t.index).collect();
        prop_assert_eq!(indices, (0..count - 1).collect::<Vec<_>>());

        let mut expected = labels.clone();
        expected.remove(index);
        let remaining: Vec<String> = tabs.iter().map(|t| t.label.clone()).collect();
        prop_assert_eq!(remaining, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Bulk selections remove their union once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bulk_union_is_removed_once(
        tree in tree_strategy(),
        picks in prop::collection::vec(any::<Index>(), 1..6),
    ) {
        let candidates: Vec<WidgetId> = tree.ids().filter(|id| *id != tree.root()).cloned().collect();
        let targets: Vec<WidgetId> = picks
            .iter()
            .map(|p| candidates[p.index(candidates.len())].clone())
            .collect();
        let shared_parent = parent_of(&tree, &targets[0]);

        let mut union = HashSet::new();
        for target in &targets {
            union.extend(tree.collect_subtree(target).unwrap().into_iter().map(|w| w.id));
        }

        let ctx = LayoutContext::default();
        let plan = BulkDeletionCoordinator::new(&LayoutSystem::Fixed, &ctx)
            .delete_many(&tree, &targets, &shared_parent)
            .unwrap();

        let removed: Vec<WidgetId> = plan.removed_ids().cloned().collect();
        let unique: HashSet<WidgetId> = removed.iter().cloned().collect();
        prop_assert_eq!(removed.len(), unique.len(), "a widget was removed twice");
        prop_assert_eq!(&unique, &union);
        prop_assert_eq!(plan.tree.len(), tree.len() - union.len());
        prop_assert!(plan.tree.validate().is_ok());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Layout repair never references the removed widget
// ═════════════════════════════════════════════════════════════════════════

fn layout_system() -> impl Strategy<Value = LayoutSystem> {
    prop_oneof![
        Just(LayoutSystem::Fixed),
        Just(LayoutSystem::Auto),
        Just(LayoutSystem::Constraint),
    ]
}

proptest! {
    #[test]
    fn repair_drops_every_reference(
        (tree, target) in tree_and_target(),
        system in layout_system(),
        canvas_width in 320.0f64..1600.0,
        is_mobile in any::<bool>(),
    ) {
        // Every parent carries flex, section and distribution metadata at once
        let parent = parent_of(&tree, &target);
        let target_type = tree.get(&target).unwrap().widget_type;
        let plan = DeletionPlanner::new(&tree).plan(&target, &parent).unwrap();
        let pruned_ids = id_set(&plan.tree);

        let ctx = LayoutContext::new(canvas_width, is_mobile);
        let repaired = system
            .repair(plan.tree, &parent, &target, target_type, &ctx)
            .unwrap();

        prop_assert_eq!(id_set(&repaired), pruned_ids);
        for widget in repaired.iter() {
            prop_assert!(
                !widget.references_in_layout(&target),
                "{} still references {} under {}",
                widget.id,
                target,
                system
            );
        }
    }
}
