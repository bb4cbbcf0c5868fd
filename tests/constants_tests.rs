// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use quickshot::constants::{photo, timing, ui};
use std::time::Duration;

#[test]
fn test_button_sizes() {
    assert_eq!(ui::ACTION_BUTTON_SIZE, 70.0);
    assert_eq!(ui::FLASH_BUTTON_SIZE, 50.0);
    assert!(ui::FLASH_BUTTON_SIZE < ui::ACTION_BUTTON_SIZE);
}

#[test]
fn test_glyph_fits_inside_button() {
    assert!(ui::GLYPH_SCALE > 0.0 && ui::GLYPH_SCALE < 1.0);
    assert!((ui::GLYPH_SCALE - 0.6).abs() < 1e-6);
}

#[test]
fn test_jpeg_quality_in_range() {
    assert!(photo::JPEG_QUALITY > 0 && photo::JPEG_QUALITY <= 100);
}

#[test]
fn test_timing_values() {
    assert_eq!(timing::HOTPLUG_POLL_INTERVAL, Duration::from_secs(2));
    // Give a retried pipeline longer than a hotplug poll
    assert!(timing::PIPELINE_RETRY_DELAY >= timing::HOTPLUG_POLL_INTERVAL);
    assert!(timing::CLI_WARMUP < timing::CLI_FRAME_TIMEOUT);
}
