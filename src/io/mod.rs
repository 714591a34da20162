// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: backend protocol and transport, media decoding and selection files.

pub mod client;
pub mod media;
pub mod protocol;
pub mod serialization;
pub mod worker;
