// SPDX-License-Identifier: MPL-2.0

//! Quickshot - a quick photo capture screen for the COSMIC desktop
//!
//! Opens a camera after a permission check, shows a live preview with
//! tap-to-focus and flash, captures a still and lets the user accept or
//! discard it. Accepted photos go to the host through a completion callback.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`capture_view`]: The capture view state machine (no I/O)
//! - [`permission`]: The camera permission gate
//! - [`backends`]: Camera backend abstraction (PipeWire, V4L2)
//! - [`pipelines`]: Photo capture pipeline
//! - [`flash`]: Flash LED control
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // quickshot
//! ```

pub mod app;
pub mod backends;
pub mod capture_view;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod i18n;
pub mod permission;
pub mod pipelines;

// Re-export commonly used types
pub use app::{AppModel, Flags, Message};
pub use capture_view::{CaptureView, PhotoDescriptor, ViewState};
pub use config::Config;
pub use permission::{CameraAccess, PermissionStatus, request_usability};
