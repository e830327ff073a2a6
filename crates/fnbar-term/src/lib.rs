// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod escape;
pub mod zsh;

pub use escape::{PopKeyLabels, PushKeyLabels, SetKeyLabel, ansi_string};
pub use zsh::{FUNCTION_KEYS, ZshKeyRow, init_script, quote, widget_name};
