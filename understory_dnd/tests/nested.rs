// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragging across nested containers.

use std::rc::Rc;

use kurbo::Point;
use understory_block_layout::{GeometryCache, LayoutOptions, Measurement, calculate_layout};
use understory_block_tree::{
    BlockOptions, Container, FnSource, ItemId, Place, ReorderEvent, Snapshot, Tag, TreeBuilder,
};
use understory_dnd::{DragContext, DragController, MoveResult, insertion_points};

#[derive(Debug)]
struct Card {
    key: &'static str,
    tag: Option<&'static str>,
    group: Option<(&'static str, Vec<&'static str>)>,
    kids: Vec<Rc<Card>>,
}

fn leaf(key: &'static str, tag: Option<&'static str>) -> Rc<Card> {
    Rc::new(Card {
        key,
        tag,
        group: None,
        kids: Vec::new(),
    })
}

/// root: [x (tag "item"), host], host has container "slot" accepting `accepts`
/// holding [y].
fn tree(accepts: Vec<&'static str>) -> Snapshot<&'static str, Card> {
    let host = Rc::new(Card {
        key: "host",
        tag: None,
        group: Some(("slot", accepts)),
        kids: vec![leaf("y", Some("item"))],
    });
    let source = FnSource::new(
        |c: &Card| c.key,
        |c: &Card| match &c.group {
            Some((key, accepts)) => vec![
                Container::new(*key)
                    .with_options(BlockOptions::new().accepting(accepts.iter().copied()))
                    .with_blocks(c.kids.clone()),
            ],
            None => Vec::new(),
        },
        |c: &Card| BlockOptions {
            tag: c.tag.map(Tag::from),
            ..BlockOptions::default()
        },
    );
    let root = Container::new("root").with_blocks(vec![leaf("x", Some("item")), host]);
    TreeBuilder::new().build(&root, &source)
}

fn measure() -> GeometryCache<&'static str> {
    let mut cache = GeometryCache::new();
    cache.set(ItemId::Block("x"), Measurement::leaf(40.0));
    cache.set(ItemId::Block("y"), Measurement::leaf(40.0));
    // The host has a 20px header above its slot.
    cache.set(
        ItemId::Block("host"),
        Measurement::framed(kurbo::Insets::new(0.0, 20.0, 0.0, 0.0)),
    );
    cache
}

#[test]
fn accepting_container_offers_slots() {
    let t = tree(vec!["item"]);
    let without = t.remove_blocks([&"x"]);
    let layout = calculate_layout(&without, &measure(), &LayoutOptions::with_width(200.0));
    let points = insertion_points(&without, &[Tag::from("item")], &layout);
    let places: Vec<_> = points.iter().map(|p| p.place.clone()).collect();
    assert_eq!(
        places,
        vec![Place::before("slot", "y"), Place::append("slot")]
    );
}

#[test]
fn refusing_container_offers_nothing() {
    let t = tree(vec!["other"]);
    let without = t.remove_blocks([&"x"]);
    let layout = calculate_layout(&without, &measure(), &LayoutOptions::with_width(200.0));
    assert!(insertion_points(&without, &[Tag::from("item")], &layout).is_empty());
}

#[test]
fn drop_into_nested_slot() {
    let t = tree(vec!["item"]);
    let cache = measure();
    let options = LayoutOptions::with_width(200.0);
    let ctx = DragContext::new(&t, &cache, &options);

    // Without x: host at 0, y at 20..60, slot placeholder at 60.
    let mut drag = DragController::default();
    drag.on_down("x", Point::new(5.0, 5.0));
    assert_eq!(drag.on_move(ctx, Point::new(5.0, 25.0)), MoveResult::Started);
    assert_eq!(
        drag.insertion().map(|p| p.place.clone()),
        Some(Place::before("slot", "y"))
    );
    assert_eq!(
        drag.on_up(ctx),
        Some(ReorderEvent {
            keys: vec!["x"],
            place: Place::before("slot", "y"),
        })
    );
}

#[test]
fn host_cannot_drop_into_itself() {
    let t = tree(vec![]);
    let without = t.remove_blocks([&"host"]);
    let layout = calculate_layout(&without, &measure(), &LayoutOptions::with_width(200.0));
    let points = insertion_points(&without, &[], &layout);
    assert!(points.iter().all(|p| p.place.parent == "root"));
}
