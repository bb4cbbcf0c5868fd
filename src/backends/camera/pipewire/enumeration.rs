// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration
//!
//! Cameras are discovered by parsing `pw-cli ls Node`. Per-node details that
//! the listing omits (libcamera rotation and location) come from `pw-cli info`.

use super::super::focus::probe_focus_support;
use super::super::types::{CameraDevice, CameraFacing, DeviceInfo, SensorRotation};
use std::os::unix::io::AsRawFd;
use tracing::{debug, info, warn};

/// Properties collected for one PipeWire node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeEntry {
    pub id: String,
    pub serial: Option<String>,
    pub description: Option<String>,
    pub nick: Option<String>,
    pub object_path: Option<String>,
    pub location: Option<String>,
    pub rotation: Option<String>,
    pub is_video_source: bool,
}

impl NodeEntry {
    /// Target for `pipewiresrc target-object`: serial when known, node ID otherwise
    fn target(&self) -> String {
        match &self.serial {
            Some(serial) => format!("pipewire-serial-{}", serial),
            None => format!("pipewire-{}", self.id),
        }
    }
}

/// Enumerate cameras using PipeWire
///
/// Returns `None` when PipeWire itself is unusable, an empty list when it
/// works but no camera is plugged in.
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    if !is_pipewire_available() {
        debug!("pipewiresrc not available");
        return None;
    }

    let output = match std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(_) | Err(_) => {
            // Without pw-cli (e.g. some sandboxes) let PipeWire pick its default camera
            info!("pw-cli unavailable, using PipeWire auto-selection (default camera)");
            return Some(vec![CameraDevice {
                name: "Default Camera (PipeWire)".to_string(),
                path: String::new(),
                node_id: None,
                device_info: None,
                rotation: SensorRotation::None,
                facing: CameraFacing::External,
                supports_focus: false,
            }]);
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let cameras: Vec<CameraDevice> = parse_node_listing(&stdout)
        .into_iter()
        .filter(|node| node.is_video_source)
        .filter_map(|mut node| {
            // `pw-cli ls` omits libcamera properties; fetch them per node
            if node.rotation.is_none() || node.location.is_none() {
                let (location, rotation) = query_node_details(&node.id);
                node.location = node.location.or(location);
                node.rotation = node.rotation.or(rotation);
            }
            camera_from_node(node)
        })
        .collect();

    debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
    Some(cameras)
}

/// Parse `pw-cli ls Node` output into node entries
pub(crate) fn parse_node_listing(stdout: &str) -> Vec<NodeEntry> {
    let mut nodes = Vec::new();
    let mut current: Option<NodeEntry> = None;

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Node header: "id 76, type PipeWire:Interface:Node/3"
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            nodes.extend(current.take());
            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                current = Some(NodeEntry {
                    id: id_num.trim().to_string(),
                    ..Default::default()
                });
            }
            continue;
        }

        let Some(node) = current.as_mut() else {
            continue;
        };
        apply_property(node, trimmed);
    }

    nodes.extend(current);
    nodes
}

/// Record one `key = "value"` line on the node being parsed
fn apply_property(node: &mut NodeEntry, line: &str) {
    let Some((key, _)) = line.split_once('=') else {
        return;
    };
    // Lines may carry a leading '*' marking changed properties
    let key = key.trim().trim_start_matches('*').trim();
    let Some(value) = extract_quoted_value(line) else {
        return;
    };

    match key {
        "media.class" => node.is_video_source = value == "Video/Source",
        "object.serial" => node.serial = Some(value),
        "object.path" => node.object_path = Some(value),
        "node.nick" => node.nick = Some(value),
        "node.description" => node.description = Some(value),
        "api.libcamera.location" => node.location = Some(value),
        "api.libcamera.rotation" => node.rotation = Some(value),
        _ => {}
    }
}

/// Turn a parsed video source node into a camera device
fn camera_from_node(node: NodeEntry) -> Option<CameraDevice> {
    let path = node.target();
    let name = node.description.clone()?;

    let device_info = node
        .object_path
        .as_deref()
        .and_then(|p| p.strip_prefix("v4l2:"))
        .map(|v4l2_path| build_device_info(v4l2_path, node.nick.as_deref()));

    let supports_focus = probe_focus_support(device_info.as_ref().map(|info| info.path.as_str()));
    let facing = node
        .location
        .as_deref()
        .map(CameraFacing::from_location)
        .unwrap_or(CameraFacing::External);
    let rotation = node
        .rotation
        .as_deref()
        .map(SensorRotation::from_degrees)
        .unwrap_or_default();

    debug!(id = %node.id, name = %name, path = %path, %facing, %rotation, supports_focus, "Found video camera");

    Some(CameraDevice {
        name,
        path,
        node_id: Some(node.id),
        device_info,
        rotation,
        facing,
        supports_focus,
    })
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Query location and rotation for a PipeWire node using pw-cli info
fn query_node_details(node_id: &str) -> (Option<String>, Option<String>) {
    let output = match std::process::Command::new("pw-cli")
        .args(["info", node_id])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => {
            debug!(node_id, "Failed to query node info");
            return (None, None);
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut node = NodeEntry::default();
    for line in stdout.lines() {
        apply_property(&mut node, line.trim());
    }
    (node.location, node.rotation)
}

/// Build DeviceInfo from a V4L2 device path and optional card name
fn build_device_info(v4l2_path: &str, card: Option<&str>) -> DeviceInfo {
    let real_path = std::fs::canonicalize(v4l2_path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| v4l2_path.to_string());

    let driver = get_v4l2_driver(v4l2_path).unwrap_or_default();

    DeviceInfo {
        card: card.unwrap_or_default().to_string(),
        driver,
        path: v4l2_path.to_string(),
        real_path,
    }
}

/// Get V4L2 driver name using ioctl
fn get_v4l2_driver(device_path: &str) -> Option<String> {
    // VIDIOC_QUERYCAP ioctl number
    const VIDIOC_QUERYCAP: libc::c_ulong = 0x80685600;

    #[repr(C)]
    struct V4l2Capability {
        driver: [u8; 16],
        card: [u8; 32],
        bus_info: [u8; 32],
        version: u32,
        capabilities: u32,
        device_caps: u32,
        reserved: [u32; 3],
    }

    let file = std::fs::File::open(device_path).ok()?;
    let fd = file.as_raw_fd();

    let mut cap = V4l2Capability {
        driver: [0; 16],
        card: [0; 32],
        bus_info: [0; 32],
        version: 0,
        capabilities: 0,
        device_caps: 0,
        reserved: [0; 3],
    };

    let result = unsafe { libc::ioctl(fd, VIDIOC_QUERYCAP, &mut cap as *mut V4l2Capability) };

    if result < 0 {
        warn!(device_path, "Failed to query V4L2 capability");
        return None;
    }

    let driver_len = cap.driver.iter().position(|&c| c == 0).unwrap_or(16);
    let driver = String::from_utf8_lossy(&cap.driver[..driver_len]).to_string();

    debug!(device_path, driver = %driver, "Got V4L2 driver name");
    Some(driver)
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::make("pipewiresrc")
        .build()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
	id 31, type PipeWire:Interface:Node/3
 		object.serial = "31"
 		factory.id = "10"
 		node.description = "Built-in Audio"
 		media.class = "Audio/Sink"
	id 62, type PipeWire:Interface:Node/3
 		object.serial = "2146"
 		object.path = "libcamera:/base/soc/i2c0/imx258"
 		node.description = "Back Camera"
 		media.class = "Video/Source"
 		api.libcamera.location = "back"
	id 70, type PipeWire:Interface:Node/3
 		object.path = "v4l2:/dev/video-nonexistent"
 		node.nick = "Webcam"
 		node.description = "Laptop Webcam (V4L2)"
 		media.class = "Video/Source"
"#;

    #[test]
    fn test_parse_node_listing() {
        let nodes = parse_node_listing(LISTING);
        assert_eq!(nodes.len(), 3);
        assert!(!nodes[0].is_video_source);
        assert_eq!(nodes[1].id, "62");
        assert_eq!(nodes[1].serial.as_deref(), Some("2146"));
        assert_eq!(nodes[1].location.as_deref(), Some("back"));
        assert_eq!(nodes[2].serial, None);
    }

    #[test]
    fn test_camera_from_node() {
        let nodes = parse_node_listing(LISTING);

        let back = camera_from_node(nodes[1].clone()).unwrap();
        assert_eq!(back.path, "pipewire-serial-2146");
        assert_eq!(back.facing, CameraFacing::Back);
        assert!(back.device_info.is_none());
        assert!(!back.supports_focus);

        let webcam = camera_from_node(nodes[2].clone()).unwrap();
        assert_eq!(webcam.path, "pipewire-70");
        assert_eq!(webcam.facing, CameraFacing::External);
        assert_eq!(webcam.v4l2_path(), Some("/dev/video-nonexistent"));
        assert_eq!(webcam.device_info.unwrap().card, "Webcam");
    }

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value(r#"node.nick = "Cam""#).as_deref(),
            Some("Cam")
        );
        assert_eq!(extract_quoted_value("no quotes"), None);
    }
}
