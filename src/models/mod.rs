// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod document;

pub use activity::{Activity, NewActivity};
pub use document::{Document, Snapshot};
