// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Number of programmable keys the terminal exposes.
pub const KEY_COUNT: u8 = 20;

/// One physical function key, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    pub const FIRST: Self = Self(1);

    pub const fn new(value: u8) -> Option<Self> {
        if value == 0 || value > KEY_COUNT {
            None
        } else {
            Some(Self(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// The slot after this one, or `None` once the key row is exhausted.
    pub const fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn all(count: u8) -> impl Iterator<Item = Self> {
        (1..=count.min(KEY_COUNT)).map(Self)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.0)
    }
}
