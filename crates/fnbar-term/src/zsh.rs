// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fnbar_app::{Handler, KeyRow, Slot};

use crate::escape::{PopKeyLabels, PushKeyLabels, SetKeyLabel, ansi_string};

/// Key sequences the terminal sends for F1 through F20, in zsh `bindkey` notation.
pub const FUNCTION_KEYS: [&str; 20] = [
    "^[OP", "^[OQ", "^[OR", "^[OS", "^[[15~", "^[[17~", "^[[18~", "^[[19~", "^[[20~", "^[[21~",
    "^[[23~", "^[[24~", "^[[1;2P", "^[[1;2Q", "^[[1;2R", "^[[1;2S", "^[[15;2~", "^[[17;2~",
    "^[[18;2~", "^[[19;2~",
];

const WIDGET_PREFIX: &str = "_fnbar_";

/// Collects key row changes as a zsh script for the shell to `eval`.
#[derive(Debug)]
pub struct ZshKeyRow {
    key_count: u8,
    lines: Vec<String>,
}

impl ZshKeyRow {
    pub fn new(key_count: u8) -> Self {
        Self {
            key_count,
            lines: Vec::new(),
        }
    }

    pub fn script(&self) -> String {
        let mut script = self.lines.join("\n");
        if !script.is_empty() {
            script.push('\n');
        }
        script
    }

    fn key(slot: Slot) -> &'static str {
        FUNCTION_KEYS[usize::from(slot.get() - 1)]
    }
}

impl KeyRow for ZshKeyRow {
    fn set_label(&mut self, slot: Slot, text: &str) {
        let escape = ansi_string(&SetKeyLabel::new(slot, text));
        self.lines.push(format!("print -n {}", quote(&escape)));
    }

    // Pop back to the labels saved before us, then save them again for the next render.
    fn clear_labels(&mut self) {
        for escape in [ansi_string(&PopKeyLabels), ansi_string(&PushKeyLabels)] {
            self.lines.push(format!("print -n {}", quote(&escape)));
        }
    }

    fn bind_command(&mut self, slot: Slot, command: &str) {
        self.lines.push(format!(
            "bindkey -s {} {}",
            quote(Self::key(slot)),
            quote(&keystrokes(command))
        ));
    }

    fn bind_handler(&mut self, slot: Slot, handler: Handler) {
        self.lines.push(format!(
            "bindkey {} {}",
            quote(Self::key(slot)),
            widget_name(handler)
        ));
    }

    fn clear_bindings(&mut self) {
        for slot in Slot::all(self.key_count) {
            self.lines
                .push(format!("bindkey -r {}", quote(Self::key(slot))));
        }
    }
}

pub fn widget_name(handler: Handler) -> String {
    format!("{WIDGET_PREFIX}{}", handler.id())
}

/// Shell glue: the mode variable, the pre-prompt hook, and one zle widget per handler.
///
/// `invocation` is the already-quoted command that runs fnbar, flags included.
pub fn init_script(invocation: &str) -> String {
    let mut script = format!(
        "# fnbar: function key toolbar\n\
typeset -g FNBAR_MODE=default\n\
\n\
_fnbar_render() {{\n  eval \"$({invocation} render --mode \"$FNBAR_MODE\" --dir \"$PWD\")\"\n}}\n\
\n\
_fnbar_precmd() {{\n  FNBAR_MODE=default\n  _fnbar_render\n}}\n\
\n\
_fnbar_enter() {{\n  FNBAR_MODE=\"$1\"\n  _fnbar_render\n}}\n"
    );

    for handler in Handler::ALL {
        let widget = widget_name(handler);
        let mode = handler.target().as_str();
        script.push_str(&format!(
            "\n{widget}() {{\n  _fnbar_enter {mode}\n}}\nzle -N {widget}\n"
        ));
    }

    script.push_str("\nautoload -Uz add-zsh-hook\nadd-zsh-hook precmd _fnbar_precmd\n");
    script
}

/// Quotes `raw` as a zsh `$'...'` string.
pub fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 3);
    quoted.push_str("$'");
    for ch in raw.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            ch if ch.is_control() => quoted.push_str(&format!("\\x{:02x}", u32::from(ch))),
            ch => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

/// The text `bindkey -s` should type: the command escaped for bindkey plus Enter.
fn keystrokes(command: &str) -> String {
    let mut typed = command.replace('\\', "\\\\").replace('^', "\\^");
    typed.push_str("\\n");
    typed
}
