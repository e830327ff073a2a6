// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Terminal escape sequences for the programmable key row (iTerm2 OSC 1337).

use crossterm::Command;
use fnbar_app::Slot;
use std::fmt::{self, Write as _};

const OSC: &str = "\x1b]1337;";
const BEL: char = '\x07';

/// Sets the label shown on one function key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetKeyLabel {
    pub slot: Slot,
    pub label: String,
}

impl SetKeyLabel {
    pub fn new(slot: Slot, label: &str) -> Self {
        Self {
            slot,
            label: label.to_owned(),
        }
    }
}

impl Command for SetKeyLabel {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "{OSC}SetKeyLabel={}=", self.slot)?;
        // A control character would end the sequence early.
        for ch in self.label.chars().filter(|ch| !ch.is_control()) {
            f.write_char(ch)?;
        }
        f.write_char(BEL)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(unsupported())
    }
}

/// Restores the key labels saved by the last push, dropping ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopKeyLabels;

impl Command for PopKeyLabels {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "{OSC}PopKeyLabels{BEL}")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(unsupported())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushKeyLabels;

impl Command for PushKeyLabels {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "{OSC}PushKeyLabels{BEL}")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Err(unsupported())
    }
}

#[cfg(windows)]
fn unsupported() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "key labels need an ANSI terminal",
    )
}

pub fn ansi_string(command: &impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::{PopKeyLabels, PushKeyLabels, SetKeyLabel, ansi_string};
    use fnbar_app::Slot;

    #[test]
    fn set_key_label_uses_function_key_name() {
        let slot = Slot::new(3).expect("slot");
        assert_eq!(
            ansi_string(&SetKeyLabel::new(slot, "🔽 pull")),
            "\x1b]1337;SetKeyLabel=F3=🔽 pull\x07"
        );
    }

    #[test]
    fn control_characters_are_stripped_from_labels() {
        let text = ansi_string(&SetKeyLabel::new(Slot::FIRST, "evil\x07\x1b]label\n"));
        assert_eq!(text, "\x1b]1337;SetKeyLabel=F1=evil]label\x07");
    }

    #[test]
    fn push_and_pop_sequences() {
        assert_eq!(ansi_string(&PopKeyLabels), "\x1b]1337;PopKeyLabels\x07");
        assert_eq!(ansi_string(&PushKeyLabels), "\x1b]1337;PushKeyLabels\x07");
    }
}
