// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! initd-config: loads the declarative program manifest into an ordered
//! list of [`initd_core::ChildSpec`]s.
//!
//! Out of scope for the supervisor core itself (spec.md treats this as an
//! external collaborator), but required for a runnable binary — grounded in
//! the original `scinit::Config` loader (`examples/original_source/Config.cpp`).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod schema;

pub use error::ConfigError;
pub use loader::load_from_path;
