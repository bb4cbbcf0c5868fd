// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission gate
//!
//! Sandboxed builds ask the XDG desktop portal (`org.freedesktop.portal.Camera`).
//! Unsandboxed builds have no consent prompt; access is decided by the
//! permissions of the `/dev/video*` nodes.

use crate::constants::app_info;
use crate::errors::{AppError, PermissionError};
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_SERVICE: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Authorization state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Authorized,
    Denied,
    /// Access is impossible regardless of the user (no camera, policy)
    Restricted,
    NotDetermined,
}

impl PermissionStatus {
    /// Map a portal `Response` code
    pub fn from_portal_response(code: u32) -> Self {
        match code {
            0 => PermissionStatus::Authorized,
            1 => PermissionStatus::Denied,
            _ => PermissionStatus::Restricted,
        }
    }
}

/// Platform camera authorization
pub trait CameraAccess {
    /// Current status without prompting
    fn status(&self) -> impl Future<Output = Result<PermissionStatus, PermissionError>> + Send;

    /// Ask for access, prompting the user where the platform can
    fn request(&self) -> impl Future<Output = Result<PermissionStatus, PermissionError>> + Send;
}

/// Check whether the camera may be used, requesting access once if undecided.
///
/// Any error counts as "not usable"; nothing is retried.
pub async fn request_usability(access: &impl CameraAccess) -> bool {
    let status = match access.status().await {
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "Failed to read camera permission");
            return false;
        }
    };
    debug!(?status, "Camera permission status");

    let status = if status == PermissionStatus::NotDetermined {
        match access.request().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Camera permission request failed");
                return false;
            }
        }
    } else {
        status
    };

    info!(?status, "Camera permission resolved");
    status == PermissionStatus::Authorized
}

/// Camera access through the XDG desktop portal
#[derive(Debug, Default, Clone)]
pub struct PortalCameraAccess;

impl PortalCameraAccess {
    async fn camera_proxy(
        connection: &zbus::Connection,
    ) -> Result<zbus::Proxy<'static>, PermissionError> {
        Ok(zbus::Proxy::new(connection, PORTAL_SERVICE, PORTAL_PATH, CAMERA_INTERFACE).await?)
    }
}

impl CameraAccess for PortalCameraAccess {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        let connection = zbus::Connection::session().await?;
        let proxy = Self::camera_proxy(&connection).await?;

        let present: bool = proxy
            .get_property("IsCameraPresent")
            .await
            .map_err(|e| PermissionError::PortalUnavailable(e.to_string()))?;

        // The stored grant is only visible to the portal itself; AccessCamera
        // answers without a dialog when it already exists.
        Ok(if present {
            PermissionStatus::NotDetermined
        } else {
            PermissionStatus::Restricted
        })
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        let connection = zbus::Connection::session().await?;
        let proxy = Self::camera_proxy(&connection).await?;

        let token = format!("quickshot_{}", uuid::Uuid::new_v4().simple());
        let sender = connection
            .unique_name()
            .map(|name| portal_sender_path(name.as_str()))
            .ok_or_else(|| PermissionError::PortalUnavailable("no unique bus name".to_string()))?;
        let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);

        // Subscribe before calling so the Response cannot be missed
        let request_proxy = zbus::Proxy::new(
            &connection,
            PORTAL_SERVICE,
            request_path.clone(),
            REQUEST_INTERFACE,
        )
        .await?;
        let mut responses = request_proxy.receive_signal("Response").await?;

        let mut options: HashMap<&str, Value> = HashMap::new();
        options.insert("handle_token", Value::new(token.as_str()));

        let handle: OwnedObjectPath = proxy
            .call("AccessCamera", &(options,))
            .await
            .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;
        if handle.as_str() != request_path {
            warn!(expected = %request_path, got = %handle, "Portal returned unexpected request handle");
        }

        let message = responses.next().await.ok_or_else(|| {
            PermissionError::RequestFailed("portal closed without a response".to_string())
        })?;
        let (code, _results): (u32, HashMap<String, OwnedValue>) = message
            .body()
            .deserialize()
            .map_err(|e| PermissionError::RequestFailed(e.to_string()))?;

        debug!(code, "Camera portal response");
        Ok(PermissionStatus::from_portal_response(code))
    }
}

/// Portal request paths use the caller's unique name without ':' and with '.' as '_'
fn portal_sender_path(unique_name: &str) -> String {
    unique_name.trim_start_matches(':').replace('.', "_")
}

/// Camera access decided by `/dev/video*` node permissions
#[derive(Debug, Clone)]
pub struct DeviceNodeAccess {
    dev_dir: PathBuf,
}

impl Default for DeviceNodeAccess {
    fn default() -> Self {
        Self::with_dir("/dev")
    }
}

impl DeviceNodeAccess {
    /// Look for video nodes in `dev_dir` instead of `/dev`
    pub fn with_dir(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    fn scan(&self) -> PermissionStatus {
        let Ok(entries) = std::fs::read_dir(&self.dev_dir) else {
            return PermissionStatus::Restricted;
        };

        let nodes: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("video"))
            .map(|entry| entry.path())
            .collect();

        if nodes.is_empty() {
            return PermissionStatus::Restricted;
        }

        if nodes.iter().any(|node| is_read_writable(node)) {
            PermissionStatus::Authorized
        } else {
            PermissionStatus::Denied
        }
    }
}

fn is_read_writable(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

impl CameraAccess for DeviceNodeAccess {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        Ok(self.scan())
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        // Nothing to prompt for; file permissions are what they are
        Ok(self.scan())
    }
}

/// The access method matching how the app was installed
#[derive(Debug, Clone)]
pub enum PlatformAccess {
    Portal(PortalCameraAccess),
    DeviceNodes(DeviceNodeAccess),
}

impl PlatformAccess {
    pub fn detect() -> Self {
        if app_info::is_flatpak() {
            PlatformAccess::Portal(PortalCameraAccess)
        } else {
            PlatformAccess::DeviceNodes(DeviceNodeAccess::default())
        }
    }
}

impl CameraAccess for PlatformAccess {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        match self {
            PlatformAccess::Portal(portal) => portal.status().await,
            PlatformAccess::DeviceNodes(nodes) => nodes.status().await,
        }
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        match self {
            PlatformAccess::Portal(portal) => portal.request().await,
            PlatformAccess::DeviceNodes(nodes) => nodes.request().await,
        }
    }
}

/// Settings apps tried, in order, to let the user grant camera access
const SETTINGS_COMMANDS: &[&[&str]] = &[
    &["cosmic-settings"],
    &["gnome-control-center", "camera"],
    &["systemsettings", "kcm_cameras"],
];

/// Open the system settings so the user can grant camera access
pub fn open_privacy_settings() -> Result<(), AppError> {
    for command in SETTINGS_COMMANDS {
        let (program, args) = (command[0], &command[1..]);
        let mut process = if app_info::is_flatpak() {
            let mut host = std::process::Command::new("flatpak-spawn");
            host.arg("--host").arg(program);
            host
        } else {
            std::process::Command::new(program)
        };
        process.args(args);

        match spawn_reaped(&mut process) {
            Ok(_) => {
                info!(program, "Opened system settings");
                return Ok(());
            }
            Err(e) => debug!(program, error = %e, "Settings app not available"),
        }
    }

    Err(AppError::Other(
        "No system settings application found".to_string(),
    ))
}

/// Spawn `process` and wait for it on a background thread so it never
/// lingers as a zombie. The handle finishes once the child has exited.
fn spawn_reaped(process: &mut std::process::Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = process.spawn()?;
    let pid = child.id();
    Ok(std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!(pid, %status, "Settings app exited"),
        Err(e) => warn!(pid, error = %e, "Failed to wait for settings app"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_response_codes() {
        assert_eq!(
            PermissionStatus::from_portal_response(0),
            PermissionStatus::Authorized
        );
        assert_eq!(
            PermissionStatus::from_portal_response(1),
            PermissionStatus::Denied
        );
        assert_eq!(
            PermissionStatus::from_portal_response(2),
            PermissionStatus::Restricted
        );
    }

    #[test]
    fn test_portal_sender_path() {
        assert_eq!(portal_sender_path(":1.42"), "1_42");
    }

    #[tokio::test]
    async fn test_device_nodes() {
        let dir = std::env::temp_dir().join(format!("quickshot-dev-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let access = DeviceNodeAccess::with_dir(&dir);

        assert_eq!(access.status().await.unwrap(), PermissionStatus::Restricted);

        std::fs::write(dir.join("video0"), b"").unwrap();
        assert_eq!(access.status().await.unwrap(), PermissionStatus::Authorized);
        assert!(request_usability(&access).await);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_spawned_settings_app_is_reaped() {
        let mut process = std::process::Command::new("sh");
        process.args(["-c", "exit 0"]);
        let waiter = spawn_reaped(&mut process).unwrap();
        // Joining only returns after wait() collected the exit status
        assert!(waiter.join().is_ok());
    }

    #[test]
    fn test_missing_settings_app_is_an_error() {
        let mut process = std::process::Command::new("quickshot-no-such-settings-app");
        assert!(spawn_reaped(&mut process).is_err());
    }
}
