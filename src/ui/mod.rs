// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the HILITE application.
//!
//! Components only draw and report actions; all state changes go through
//! the review controller.

pub mod canvas;
pub mod properties;
pub mod timeline;
pub mod toolbar;
