// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Handler, KeyBinding, Slot};

pub const BACK_LABEL: &str = "👈 back";

/// One entry of a submenu before it is assigned to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub label: String,
    pub command: String,
}

impl ListItem {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Lays a list out over the key row: the back key first, then one item per key.
///
/// Items that do not fit are dropped; there is no second page.
pub fn paginate(items: &[ListItem], back: Handler, key_count: u8) -> Vec<(Slot, KeyBinding)> {
    let mut layout = vec![(Slot::FIRST, KeyBinding::handler(BACK_LABEL, back))];
    let slots = Slot::all(key_count).skip(1);
    layout.extend(
        slots
            .zip(items)
            .map(|(slot, item)| (slot, KeyBinding::command(&item.label, &item.command))),
    );
    layout
}

/// Sorts names, drops repeats and keeps at most `limit` of them.
pub fn bounded_sorted(mut names: Vec<String>, limit: usize) -> Vec<String> {
    names.sort();
    names.dedup();
    names.truncate(limit);
    names
}
