// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless block list session driven from the command line.
//!
//! This example shows how to:
//! - keep host data in a small store and expose it through a `TreeSource`,
//! - feed renderer measurements to `understory_block_list`,
//! - drag a note into a nested group, answer the reorder and run the FLIP timers,
//! - delete and paste through the keyboard and clipboard events.
//!
//! Run:
//! - `cargo run -p understory_block_list_demos --example drag_reorder`

use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Insets, Point};
use understory_block_layout::Measurement;
use understory_block_list::{BlockList, BlockListEvent, BlockListOptions, Key};
use understory_block_tree::{
    BlockOptions, ClipboardHandle, Container, FnSource, Item, ItemId, Place, TreeSource,
};
use understory_dnd::insertion_index;
use understory_selection::Modifiers;

const ROOT: u32 = 0;

#[derive(Debug)]
struct Note {
    id: u32,
    title: &'static str,
    tag: Option<&'static str>,
    /// Key of the container this note holds, and the tags it accepts.
    slot: Option<(u32, Vec<&'static str>)>,
}

/// The host's data: notes by id, and the note ids of every container in order.
#[derive(Debug, Default)]
struct Store {
    notes: HashMap<u32, Rc<Note>>,
    lists: HashMap<u32, Vec<u32>>,
    accepts: HashMap<u32, Vec<&'static str>>,
}

impl Store {
    fn add(&mut self, parent: u32, note: Note) {
        if let Some((key, accepts)) = &note.slot {
            self.lists.insert(*key, Vec::new());
            self.accepts.insert(*key, accepts.clone());
        }
        self.lists.entry(parent).or_default().push(note.id);
        self.notes.insert(note.id, Rc::new(note));
    }

    fn container(&self, key: u32) -> Container<u32, Note> {
        let accepts = self.accepts.get(&key).cloned().unwrap_or_default();
        let blocks = self.lists[&key]
            .iter()
            .map(|id| Rc::clone(&self.notes[id]))
            .collect();
        Container::new(key)
            .with_options(BlockOptions::new().accepting(accepts))
            .with_blocks(blocks)
    }

    fn source(&self) -> impl TreeSource<u32, Note> + '_ {
        FnSource::new(
            |n: &Note| n.id,
            move |n: &Note| {
                n.slot
                    .iter()
                    .map(|(key, _)| self.container(*key))
                    .collect::<Vec<_>>()
            },
            |n: &Note| BlockOptions {
                tag: n.tag.map(Into::into),
                ..BlockOptions::default()
            },
        )
    }

    fn detach(&mut self, keys: &[u32]) {
        for list in self.lists.values_mut() {
            list.retain(|id| !keys.contains(id));
        }
    }

    fn place(&mut self, keys: &[u32], place: &Place<u32>) {
        let Some(list) = self.lists.get_mut(&place.parent) else {
            return;
        };
        let at = insertion_index(list, place);
        for (i, key) in keys.iter().enumerate() {
            list.insert(at + i, *key);
        }
    }
}

fn print_view(list: &BlockList<u32, Note>) {
    let view = list.view();
    let layout = list.layout();
    for (id, depth) in view.depth_first() {
        let Some(rect) = layout.rect(id) else {
            continue;
        };
        let label = match view.item(id) {
            Some(Item::Block(block)) => block.block.title.to_string(),
            Some(Item::Gap(_)) => "~~ drop here ~~".to_string(),
            Some(Item::Placeholder(_)) | Some(Item::Container(_)) | None => continue,
        };
        let marker = match id {
            ItemId::Block(key) if list.is_selected(key) => "*",
            _ => " ",
        };
        println!(
            "{marker} {:indent$}{label:<24} y={:>5.1}..{:<5.1}",
            "",
            rect.y0,
            rect.y1,
            indent = depth * 2
        );
    }
    println!();
}

fn measure_all(list: &mut BlockList<u32, Note>, store: &Store) {
    let geometry = list.geometry_mut();
    for note in store.notes.values() {
        let measurement = if note.slot.is_some() {
            // A 24px header above the group's children, 8px padding around them.
            Measurement::framed(Insets::new(8.0, 24.0, 8.0, 8.0))
        } else {
            Measurement::leaf(32.0)
        };
        geometry.set(ItemId::Block(note.id), measurement);
    }
}

fn run_timers(list: &mut BlockList<u32, Note>, events: &[BlockListEvent<u32, Note>]) {
    for event in events {
        let BlockListEvent::Animate(schedule) = event else {
            continue;
        };
        let mut timer = Some(*schedule);
        while let Some(schedule) = timer {
            // A real host sleeps for `schedule.delay()` and re-measures here.
            println!("  timer: {:?} after {} ms", schedule.checkpoint, schedule.delay_ms);
            timer = list.advance_animation(schedule.token);
        }
    }
}

fn main() {
    let mut store = Store::default();
    store.lists.insert(ROOT, Vec::new());
    for (id, title) in [(1, "Buy milk"), (2, "Call the bank"), (3, "Water plants")] {
        store.add(
            ROOT,
            Note {
                id,
                title,
                tag: Some("task"),
                slot: None,
            },
        );
    }
    store.add(
        ROOT,
        Note {
            id: 10,
            title: "Weekend",
            tag: None,
            slot: Some((100, vec!["task"])),
        },
    );
    store.add(
        100,
        Note {
            id: 11,
            title: "Fix the bike",
            tag: Some("task"),
            slot: None,
        },
    );

    let mut list = BlockList::new(
        &store.container(ROOT),
        &store.source(),
        BlockListOptions::with_width(320.0),
    );
    measure_all(&mut list, &store);
    println!("Initial list:");
    print_view(&list);

    // Grab "Buy milk" and drop it on "Fix the bike" inside the group.
    list.pointer_down(1, Point::new(12.0, 16.0), Modifiers::empty());
    let started = list.pointer_move(Point::new(12.0, 40.0));
    run_timers(&mut list, &started);
    let target = list.layout().rect(&ItemId::Block(11)).map(|r| r.y0);
    if let Some(y) = target {
        let moved = list.pointer_move(Point::new(12.0, y + 16.0));
        run_timers(&mut list, &moved);
    }
    println!("While dragging:");
    print_view(&list);

    for event in list.pointer_up() {
        if let BlockListEvent::Reorder(reorder) = event {
            println!("host: move {:?} to {:?}", reorder.keys, reorder.place);
            store.detach(&reorder.keys);
            store.place(&reorder.keys, &reorder.place);
        }
    }
    let rebuilt = list.set_root(&store.container(ROOT), &store.source());
    run_timers(&mut list, &rebuilt);
    println!("After the drop:");
    print_view(&list);

    // Select two notes and delete them.
    list.pointer_down(2, Point::new(12.0, 16.0), Modifiers::empty());
    list.pointer_up();
    list.pointer_down(3, Point::new(12.0, 60.0), Modifiers::CTRL);
    list.pointer_up();
    for event in list.key_down(Key::Delete) {
        if let BlockListEvent::Remove(remove) = event {
            println!("host: remove {:?}", remove.keys);
            store.detach(&remove.keys);
        }
    }
    let rebuilt = list.set_root(&store.container(ROOT), &store.source());
    run_timers(&mut list, &rebuilt);

    // Paste lands at the end of the root when nothing is selected.
    for event in list.paste(ClipboardHandle(1)) {
        if let BlockListEvent::Paste(paste) = event {
            println!("host: paste clipboard {:?} at {:?}", paste.clipboard, paste.place);
            store.add(
                paste.place.parent,
                Note {
                    id: 4,
                    title: "Pasted note",
                    tag: Some("task"),
                    slot: None,
                },
            );
        }
    }
    let rebuilt = list.set_root(&store.container(ROOT), &store.source());
    measure_all(&mut list, &store);
    run_timers(&mut list, &rebuilt);
    println!("Final list:");
    print_view(&list);
}
