// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end sessions: a host store, a block list and pointer input.

use std::rc::Rc;

use kurbo::{Insets, Point};
use understory_block_layout::Measurement;
use understory_block_list::{BlockList, BlockListEvent, BlockListOptions};
use understory_block_tree::{
    BlockOptions, Container, FnSource, ItemId, Place, ReorderEvent, TreeSource,
};
use understory_dnd::insertion_index;
use understory_selection::{Modifiers, Selection};

#[derive(Debug)]
struct Card {
    key: &'static str,
    tag: Option<&'static str>,
    slot: Option<(&'static str, Vec<&'static str>, Vec<Rc<Card>>)>,
}

fn card(key: &'static str) -> Rc<Card> {
    Rc::new(Card {
        key,
        tag: None,
        slot: None,
    })
}

fn source() -> impl TreeSource<&'static str, Card> {
    FnSource::new(
        |c: &Card| c.key,
        |c: &Card| match &c.slot {
            Some((key, accepts, blocks)) => vec![
                Container::new(*key)
                    .with_options(BlockOptions::new().accepting(accepts.iter().copied()))
                    .with_blocks(blocks.clone()),
            ],
            None => Vec::new(),
        },
        |c: &Card| BlockOptions {
            tag: c.tag.map(Into::into),
            ..BlockOptions::default()
        },
    )
}

/// Move flat root blocks the way a host store would.
fn apply(order: &mut Vec<Rc<Card>>, reorder: &ReorderEvent<&'static str>) {
    let (moved, mut rest): (Vec<_>, Vec<_>) = order
        .drain(..)
        .partition(|c| reorder.keys.contains(&c.key));
    let keys: Vec<_> = rest.iter().map(|c| c.key).collect();
    let at = insertion_index(&keys, &reorder.place);
    for (i, card) in moved.into_iter().enumerate() {
        rest.insert(at + i, card);
    }
    *order = rest;
}

fn reorders(events: &[BlockListEvent<&'static str, Card>]) -> Vec<ReorderEvent<&'static str>> {
    events
        .iter()
        .filter_map(|e| match e {
            BlockListEvent::Reorder(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn drag_first_block_before_last() {
    let mut order = vec![card("A"), card("B"), card("C")];
    let source = source();
    let mut list = BlockList::new(
        &Container::new("root").with_blocks(order.clone()),
        &source,
        BlockListOptions::with_width(300.0),
    );
    for key in ["A", "B", "C"] {
        list.geometry_mut()
            .set(ItemId::Block(key), Measurement::leaf(40.0));
    }

    list.pointer_down("A", Point::new(10.0, 20.0), Modifiers::empty());
    list.pointer_move(Point::new(10.0, 70.0));
    assert_eq!(
        list.insertion().map(|p| p.place.clone()),
        Some(Place::before("root", "C"))
    );
    let events = list.pointer_up();
    let reorder = reorders(&events);
    assert_eq!(
        reorder,
        vec![ReorderEvent {
            keys: vec!["A"],
            place: Place::before("root", "C"),
        }]
    );

    apply(&mut order, &reorder[0]);
    let events = list.set_root(&Container::new("root").with_blocks(order.clone()), &source);
    assert!(matches!(&events[..], [BlockListEvent::Animate(_)]));
    let tree = list.tree();
    assert_eq!(
        tree.child_ids(tree.root_id()),
        &[
            ItemId::Block("B"),
            ItemId::Block("A"),
            ItemId::Block("C"),
            ItemId::Placeholder("root"),
        ]
    );
}

#[test]
fn tagged_block_only_lands_in_accepting_group() {
    let other = Rc::new(Card {
        key: "other",
        tag: None,
        slot: Some(("other_slot", vec![], vec![card("o1")])),
    });
    let group = Rc::new(Card {
        key: "group_host",
        tag: None,
        slot: Some(("group", vec!["item"], vec![card("g1")])),
    });
    let x = Rc::new(Card {
        key: "x",
        tag: Some("item"),
        slot: None,
    });
    let source = source();
    let mut list = BlockList::new(
        &Container::new("root").with_blocks(vec![x, other, group]),
        &source,
        BlockListOptions::with_width(300.0),
    );
    let header = Measurement::framed(Insets::new(0.0, 20.0, 0.0, 0.0));
    for key in ["x", "o1", "g1"] {
        list.geometry_mut()
            .set(ItemId::Block(key), Measurement::leaf(40.0));
    }
    list.geometry_mut().set(ItemId::Block("other"), header);
    list.geometry_mut().set(ItemId::Block("group_host"), header);

    // Without x: other 0..60 holding o1 at 20, group_host 72..132 holding g1 at 92.
    list.pointer_down("x", Point::new(5.0, 5.0), Modifiers::empty());
    list.pointer_move(Point::new(5.0, 25.0));
    assert!(list.is_dragging());
    assert!(list.insertion().is_none(), "other_slot accepts nothing");

    list.pointer_move(Point::new(5.0, 100.0));
    assert_eq!(
        list.insertion().map(|p| p.place.clone()),
        Some(Place::before("group", "g1"))
    );
    assert_eq!(
        reorders(&list.pointer_up()),
        vec![ReorderEvent {
            keys: vec!["x"],
            place: Place::before("group", "g1"),
        }]
    );
}

#[test]
fn drag_view_animates_the_gap_open() {
    let order = vec![card("A"), card("B"), card("C")];
    let source = source();
    let mut list = BlockList::new(
        &Container::new("root").with_blocks(order),
        &source,
        BlockListOptions::with_width(300.0),
    );
    for key in ["A", "B", "C"] {
        list.geometry_mut()
            .set(ItemId::Block(key), Measurement::leaf(40.0));
    }

    list.pointer_down("A", Point::new(10.0, 20.0), Modifiers::empty());
    let events = list.pointer_move(Point::new(10.0, 70.0));
    let schedule = events
        .iter()
        .find_map(|e| match e {
            BlockListEvent::Animate(schedule) => Some(*schedule),
            _ => None,
        })
        .expect("drag start should animate");

    let mut timer = Some(schedule);
    let mut saw_gap_growing = false;
    while let Some(schedule) = timer {
        timer = list.advance_animation(schedule.token);
        if let Some(state) = list.animation_state(&ItemId::Gap) {
            saw_gap_growing |= state.delta_size.y < 0.0;
        }
    }
    assert!(saw_gap_growing);
    let view = list.view();
    assert_eq!(
        view.child_ids(view.root_id()),
        &[
            ItemId::Block("B"),
            ItemId::Gap,
            ItemId::Block("C"),
            ItemId::Placeholder("root"),
        ]
    );
    assert!(!list.is_animating());
}

#[test]
fn selection_never_holds_a_block_and_its_ancestor() {
    let host = Rc::new(Card {
        key: "host",
        tag: None,
        slot: Some(("group", vec![], vec![card("inner")])),
    });
    let source = source();
    let mut list = BlockList::new(
        &Container::new("root").with_blocks(vec![host, card("after")]),
        &source,
        BlockListOptions::with_width(300.0),
    );

    list.pointer_down("host", Point::new(5.0, 5.0), Modifiers::empty());
    list.pointer_up();
    let events = list.pointer_down("inner", Point::new(5.0, 25.0), Modifiers::CTRL);
    assert!(events.is_empty(), "toggling a covered block changes nothing");
    list.pointer_up();
    assert_eq!(list.selection().blocks(), &["host"]);

    list.set_selection(Selection::Blocks(vec!["inner", "after", "host"]));
    assert_eq!(list.selection().blocks(), &["after", "host"]);
}
