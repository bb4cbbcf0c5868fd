// SPDX-License-Identifier: MPL-2.0

//! Capture controls module
//!
//! Round action buttons used by the live preview and the photo review:
//! capture trigger, flash toggle, accept and discard.

pub mod action_button;

pub use action_button::{ActionButton, action_button};
