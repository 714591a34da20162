// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: detections, media sessions, navigation and selections.

pub mod detection;
pub mod media;
pub mod navigator;
pub mod selection;
