// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera control interface
//!
//! Just enough of the control ioctls to drive autofocus: query whether a
//! control exists, read it and write it.
//!
//! Inspired by [cameractrls](https://github.com/soyersoyer/cameractrls).

use std::fs::File;
use std::os::unix::io::AsRawFd;
use tracing::{debug, warn};

// ===== V4L2 Control Class Bases =====
const V4L2_CTRL_CLASS_CAMERA: u32 = 0x009a0000;
const V4L2_CID_CAMERA_CLASS_BASE: u32 = V4L2_CTRL_CLASS_CAMERA | 0x900;

// ===== V4L2 Control IDs (Camera Class) =====

/// Continuous autofocus enable
pub const V4L2_CID_FOCUS_AUTO: u32 = V4L2_CID_CAMERA_CLASS_BASE + 12;
/// Start a one-shot autofocus scan (button control)
pub const V4L2_CID_AUTO_FOCUS_START: u32 = V4L2_CID_CAMERA_CLASS_BASE + 28;
/// Abort a running autofocus scan (button control)
pub const V4L2_CID_AUTO_FOCUS_STOP: u32 = V4L2_CID_CAMERA_CLASS_BASE + 29;
/// Autofocus status bitmask (read-only)
pub const V4L2_CID_AUTO_FOCUS_STATUS: u32 = V4L2_CID_CAMERA_CLASS_BASE + 30;

// ===== V4L2 Autofocus Status Bits =====

/// Scan in progress
pub const V4L2_AUTO_FOCUS_STATUS_BUSY: i32 = 0x01;
/// Lens settled in focus
pub const V4L2_AUTO_FOCUS_STATUS_REACHED: i32 = 0x02;
/// Scan gave up
pub const V4L2_AUTO_FOCUS_STATUS_FAILED: i32 = 0x04;

// ===== V4L2 Control Flags =====
const V4L2_CTRL_FLAG_DISABLED: u32 = 0x0001;

// ===== V4L2 ioctl Numbers =====
// Calculated as: (dir << 30) | (size << 16) | ('V' << 8) | nr
// where dir: 2=READ, 1=WRITE, 3=READ|WRITE

/// Get control value (v4l2_control: 8 bytes)
const VIDIOC_G_CTRL: libc::c_ulong = 0xC008561B;
/// Set control value (v4l2_control: 8 bytes)
const VIDIOC_S_CTRL: libc::c_ulong = 0xC008561C;
/// Query control info (v4l2_queryctrl: 68 bytes)
const VIDIOC_QUERYCTRL: libc::c_ulong = 0xC0445624;

// ===== V4L2 ioctl Structures =====

/// V4L2 control get/set structure
#[repr(C)]
struct V4l2Control {
    id: u32,
    value: i32,
}

/// V4L2 query control structure
#[repr(C)]
struct V4l2Queryctrl {
    id: u32,
    ctrl_type: u32,
    name: [u8; 32],
    minimum: i32,
    maximum: i32,
    step: i32,
    default_value: i32,
    flags: u32,
    reserved: [u32; 2],
}

/// Information about a V4L2 control
#[derive(Debug, Clone)]
pub struct ControlInfo {
    pub id: u32,
    pub name: String,
    pub minimum: i32,
    pub maximum: i32,
    pub default_value: i32,
    pub flags: u32,
}

impl ControlInfo {
    /// Check if control is disabled
    pub fn is_disabled(&self) -> bool {
        self.flags & V4L2_CTRL_FLAG_DISABLED != 0
    }
}

/// Outcome of reading `V4L2_CID_AUTO_FOCUS_STATUS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFocusStatus {
    Idle,
    Busy,
    Reached,
    Failed,
}

impl AutoFocusStatus {
    /// Decode the status bitmask. FAILED wins over REACHED, which wins over BUSY.
    pub fn from_bits(bits: i32) -> Self {
        if bits & V4L2_AUTO_FOCUS_STATUS_FAILED != 0 {
            AutoFocusStatus::Failed
        } else if bits & V4L2_AUTO_FOCUS_STATUS_REACHED != 0 {
            AutoFocusStatus::Reached
        } else if bits & V4L2_AUTO_FOCUS_STATUS_BUSY != 0 {
            AutoFocusStatus::Busy
        } else {
            AutoFocusStatus::Idle
        }
    }
}

/// Extract a null-terminated string from a fixed-size byte array
fn extract_name(bytes: &[u8; 32]) -> String {
    let name_len = bytes.iter().position(|&c| c == 0).unwrap_or(32);
    String::from_utf8_lossy(&bytes[..name_len]).to_string()
}

/// Query if a control exists and get its information
pub fn query_control(device_path: &str, control_id: u32) -> Option<ControlInfo> {
    let file = File::open(device_path).ok()?;
    let fd = file.as_raw_fd();

    let mut qctrl = V4l2Queryctrl {
        id: control_id,
        ctrl_type: 0,
        name: [0; 32],
        minimum: 0,
        maximum: 0,
        step: 0,
        default_value: 0,
        flags: 0,
        reserved: [0; 2],
    };

    let result = unsafe { libc::ioctl(fd, VIDIOC_QUERYCTRL, &mut qctrl as *mut V4l2Queryctrl) };

    if result < 0 {
        return None;
    }

    Some(ControlInfo {
        id: qctrl.id,
        name: extract_name(&qctrl.name),
        minimum: qctrl.minimum,
        maximum: qctrl.maximum,
        default_value: qctrl.default_value,
        flags: qctrl.flags,
    })
}

/// Get current value of a control
pub fn get_control(device_path: &str, control_id: u32) -> Option<i32> {
    let file = File::open(device_path).ok()?;
    let fd = file.as_raw_fd();

    let mut ctrl = V4l2Control {
        id: control_id,
        value: 0,
    };

    let result = unsafe { libc::ioctl(fd, VIDIOC_G_CTRL, &mut ctrl as *mut V4l2Control) };

    if result < 0 {
        debug!(device_path, control_id, "Failed to get V4L2 control");
        return None;
    }

    Some(ctrl.value)
}

/// Set value of a control
pub fn set_control(device_path: &str, control_id: u32, value: i32) -> Result<(), String> {
    let file = File::options()
        .read(true)
        .write(true)
        .open(device_path)
        .map_err(|e| format!("Failed to open device: {}", e))?;
    let fd = file.as_raw_fd();

    let mut ctrl = V4l2Control {
        id: control_id,
        value,
    };

    let result = unsafe { libc::ioctl(fd, VIDIOC_S_CTRL, &mut ctrl as *mut V4l2Control) };

    if result < 0 {
        let errno = std::io::Error::last_os_error();
        warn!(
            device_path,
            control_id,
            value,
            ?errno,
            "Failed to set V4L2 control"
        );
        return Err(format!("Failed to set control: {}", errno));
    }

    Ok(())
}

/// Check if a control is available on the device
pub fn has_control(device_path: &str, control_id: u32) -> bool {
    query_control(device_path, control_id)
        .map(|info| !info.is_disabled())
        .unwrap_or(false)
}

/// Whether the node can run an autofocus scan on request
pub fn supports_autofocus(device_path: &str) -> bool {
    has_control(device_path, V4L2_CID_AUTO_FOCUS_START)
        || has_control(device_path, V4L2_CID_FOCUS_AUTO)
}

/// Read the autofocus status, `None` if the node does not report one
pub fn autofocus_status(device_path: &str) -> Option<AutoFocusStatus> {
    get_control(device_path, V4L2_CID_AUTO_FOCUS_STATUS).map(AutoFocusStatus::from_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_id_values() {
        assert_eq!(V4L2_CID_FOCUS_AUTO, 0x009a090c);
        assert_eq!(V4L2_CID_AUTO_FOCUS_START, 0x009a091c);
        assert_eq!(V4L2_CID_AUTO_FOCUS_STOP, 0x009a091d);
        assert_eq!(V4L2_CID_AUTO_FOCUS_STATUS, 0x009a091e);
    }

    #[test]
    fn test_autofocus_status_bits() {
        assert_eq!(AutoFocusStatus::from_bits(0), AutoFocusStatus::Idle);
        assert_eq!(AutoFocusStatus::from_bits(1), AutoFocusStatus::Busy);
        assert_eq!(AutoFocusStatus::from_bits(2), AutoFocusStatus::Reached);
        assert_eq!(AutoFocusStatus::from_bits(4 | 1), AutoFocusStatus::Failed);
    }

    #[test]
    fn test_missing_device_has_no_focus() {
        assert!(!supports_autofocus("/dev/nonexistent-video-node"));
        assert_eq!(autofocus_status("/dev/nonexistent-video-node"), None);
    }
}
