// SPDX-License-Identifier: MPL-2.0

//! Camera preview module
//!
//! Turns preview frames into image handles and draws the live feed with the
//! tap-to-focus marker on top.

pub mod tap_area;
pub mod widget;

pub(crate) use widget::frame_handle;
