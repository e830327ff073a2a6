// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod model;
pub mod pager;
pub mod probes;
pub mod runtime;
pub mod slot;
pub mod state;

pub use cache::*;
pub use model::*;
pub use pager::*;
pub use probes::*;
pub use runtime::*;
pub use slot::*;
pub use state::*;
