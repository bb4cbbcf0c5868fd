// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! - [`photo`]: still capture from the live preview

pub mod photo;
