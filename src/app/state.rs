// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::CameraBackendManager;
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use crate::backends::camera::FocusPoint;
use crate::capture_view::{CaptureId, CaptureRequest, CaptureView, CompletionCallback};
use crate::config::Config;
use crate::errors::{CameraError, PhotoError};
use crate::flash::FlashHardware;
use crate::pipelines::photo::CaptureOutcome;
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::sync::Arc;

/// Data handed to the application at startup
#[derive(Clone)]
pub struct Flags {
    /// Receives the photos the user accepts
    pub on_complete: CompletionCallback,
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flags").finish_non_exhaustive()
    }
}

/// Outcome of the permission gate for the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Not asked yet
    #[default]
    Unknown,
    /// Request in flight
    Checking,
    Usable,
    NotUsable,
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Flash sequence currently running before a capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlashPhase {
    #[default]
    Idle,
    /// LEDs are lit and settling
    Hardware,
    /// No LEDs: the window is painted white
    Screen,
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// About page for the application.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Dropdown labels for the theme setting
    pub theme_dropdown_options: Vec<String>,
    /// Dropdown labels for the preferred camera, in `CameraFacing::ALL` order
    pub facing_dropdown_options: Vec<String>,

    // ===== Camera =====
    /// Shared camera backend handle
    pub backend_manager: CameraBackendManager,
    /// Last known camera list
    pub available_cameras: Vec<CameraDevice>,
    /// Newest preview frame, ready to render
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// Drives pause/resume of the running preview pipeline
    pub preview_active: tokio::sync::watch::Sender<bool>,

    // ===== Capture view =====
    /// Mounted capture view, `None` while closed
    pub capture_view: Option<CaptureView>,
    /// Handed to every newly mounted capture view
    pub on_complete: CompletionCallback,
    /// Result of the permission gate
    pub permission: PermissionState,
    /// Show the "permission required" dialog
    pub permission_dialog: bool,

    // ===== Flash =====
    /// Flash LEDs found at startup
    pub flash_hardware: Arc<FlashHardware>,
    pub flash_phase: FlashPhase,
    /// Capture waiting for the flash to settle
    pub pending_capture: Option<CaptureRequest>,

    // ===== Window =====
    pub window_focused: bool,
    pub window_foreground: bool,
}

/// Messages emitted by the application and its widgets.
///
/// Messages are organized into logical groups:
/// - **UI Navigation**: context pages, external URLs, dialogs
/// - **Permission**: the permission gate and its recovery dialog
/// - **Camera**: device list, frames, window signals
/// - **Capture**: capture, flash, focus, review
/// - **Settings**: configuration
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page (About, Settings)
    ToggleContextPage(ContextPage),

    // ===== Permission =====
    /// Header "Open" pressed
    OpenCamera,
    /// Header "Close" pressed
    CloseCamera,
    /// Permission gate finished
    PermissionResolved(bool),
    /// Dismiss the permission dialog
    DismissPermissionDialog,
    /// Open the system privacy settings from the permission dialog
    OpenPrivacySettings,

    // ===== Camera =====
    /// Camera list enumerated or changed (hotplug)
    CameraListChanged(Vec<CameraDevice>),
    /// New camera frame received from pipeline
    CameraFrame(Arc<CameraFrame>),
    /// Keyboard focus of the main window changed
    WindowFocusChanged(bool),
    /// Main window shown or hidden
    WindowForegroundChanged(bool),

    // ===== Capture =====
    /// Capture button pressed
    Capture,
    /// Flash settle time elapsed, grab the frame now
    FlashComplete,
    /// Capture task for the given request finished
    PhotoCaptured(CaptureId, Result<CaptureOutcome, PhotoError>),
    /// Flash button pressed
    ToggleFlash,
    /// Preview tapped at a point in preview coordinates
    FocusAt(FocusPoint),
    /// Focus task finished
    FocusResolved(Result<(), CameraError>),
    /// Keep the photo under review
    AcceptPhoto,
    /// Drop the photo under review
    DiscardPhoto,

    // ===== Settings =====
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Select app theme (System, Dark, Light)
    SetAppTheme(usize),
    /// Select preferred camera facing
    SetPreferredFacing(usize),
    ToggleAcceptExternal,
    /// Toggle mirror preview (horizontal flip)
    ToggleMirrorPreview,

    /// No-op message for async tasks that don't need a response
    Noop,
}
