// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the camera permission gate

use quickshot::errors::PermissionError;
use quickshot::{CameraAccess, PermissionStatus, request_usability};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Platform stand-in with a fixed status and request answer
struct MockAccess {
    status: Result<PermissionStatus, PermissionError>,
    answer: Result<PermissionStatus, PermissionError>,
    requests: AtomicUsize,
}

impl MockAccess {
    fn new(status: PermissionStatus, answer: PermissionStatus) -> Self {
        Self {
            status: Ok(status),
            answer: Ok(answer),
            requests: AtomicUsize::new(0),
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl CameraAccess for MockAccess {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        self.status.clone()
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

#[tokio::test]
async fn test_authorized_is_usable_without_prompt() {
    let access = MockAccess::new(PermissionStatus::Authorized, PermissionStatus::Denied);
    assert!(request_usability(&access).await);
    assert_eq!(access.requests(), 0);
}

#[tokio::test]
async fn test_denied_is_not_usable() {
    let access = MockAccess::new(PermissionStatus::Denied, PermissionStatus::Authorized);
    assert!(!request_usability(&access).await);
    assert_eq!(access.requests(), 0);
}

#[tokio::test]
async fn test_restricted_is_not_usable() {
    let access = MockAccess::new(PermissionStatus::Restricted, PermissionStatus::Authorized);
    assert!(!request_usability(&access).await);
    assert_eq!(access.requests(), 0);
}

#[tokio::test]
async fn test_undetermined_then_granted() {
    let access = MockAccess::new(PermissionStatus::NotDetermined, PermissionStatus::Authorized);
    assert!(request_usability(&access).await);
    assert_eq!(access.requests(), 1);
}

#[tokio::test]
async fn test_undetermined_then_refused() {
    let access = MockAccess::new(PermissionStatus::NotDetermined, PermissionStatus::Denied);
    assert!(!request_usability(&access).await);
    assert_eq!(access.requests(), 1);
}

#[tokio::test]
async fn test_portal_failure_is_not_usable() {
    let access = MockAccess {
        status: Err(PermissionError::PortalUnavailable("no bus".into())),
        answer: Ok(PermissionStatus::Authorized),
        requests: AtomicUsize::new(0),
    };
    assert!(!request_usability(&access).await);
    assert_eq!(access.requests(), 0);
}

#[tokio::test]
async fn test_undetermined_after_request_is_not_usable() {
    // Prompt dismissed without an answer
    let access = MockAccess::new(
        PermissionStatus::NotDetermined,
        PermissionStatus::NotDetermined,
    );
    assert!(!request_usability(&access).await);
    assert_eq!(access.requests(), 1);
}
