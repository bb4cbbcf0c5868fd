// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! ```text
//! Latest preview frame → Encoding (JPEG) → Disk I/O → CaptureOutcome
//!       ↓
//! Preview continues uninterrupted
//! ```

pub mod capture;
pub mod encoding;

pub use capture::{CaptureOptions, CaptureOutcome, PhotoCapture, PhotoMetadata};
pub use encoding::{PhotoEncoder, capture_dir, default_capture_path, file_name_of};
