use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DrawingError, DrawingResult};

/// Result of asking the platform whether storage may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Not granted, and the user should be told why before asking again
    ShowRationale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A short transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Platform services the drawing session relies on but doesn't implement:
/// the storage permission, user notifications, media indexing and sharing.
pub trait Platform {
    fn storage_permission(&self) -> PermissionStatus;

    /// Ask the user for storage access. The pending action is not retried.
    fn request_storage_permission(&mut self) -> PermissionStatus {
        self.storage_permission()
    }

    fn notify(&mut self, notification: Notification);

    /// Make a freshly written file visible to the platform's media index
    fn index_media(&mut self, path: &Path) -> DrawingResult<()>;

    fn share(&mut self, path: &Path, mime: &str);
}

/// Notifications waiting to be shown. Cloning shares the same queue.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue(Arc<Mutex<VecDeque<Notification>>>);

impl NotificationQueue {
    pub fn push(&self, notification: Notification) {
        self.0.lock().push_back(notification);
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.0.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Desktop stand-in for the mobile platform services.
///
/// Storage access is granted when the export directory exists (or can be
/// created) and is writable. There is no system media index or share sheet, so
/// those calls check the file and announce it through a notification.
pub struct DesktopPlatform {
    storage_dir: PathBuf,
    notifications: NotificationQueue,
}

impl DesktopPlatform {
    pub fn new(storage_dir: impl Into<PathBuf>, notifications: NotificationQueue) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            notifications,
        }
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }
}

impl Platform for DesktopPlatform {
    fn storage_permission(&self) -> PermissionStatus {
        match fs::metadata(&self.storage_dir) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => PermissionStatus::Granted,
            _ => PermissionStatus::Denied,
        }
    }

    fn request_storage_permission(&mut self) -> PermissionStatus {
        if let Err(err) = fs::create_dir_all(&self.storage_dir) {
            log::warn!(
                "Cannot create storage directory {}: {}",
                self.storage_dir.display(),
                err
            );
        }
        self.storage_permission()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn index_media(&mut self, path: &Path) -> DrawingResult<()> {
        fs::metadata(path).map_err(|err| DrawingError::io(path, err))?;
        log::debug!("Indexed {}", path.display());
        Ok(())
    }

    fn share(&mut self, path: &Path, mime: &str) {
        log::info!("Share {} ({})", path.display(), mime);
        self.notifications
            .push(Notification::info(format!("Ready to share: {}", path.display())));
    }
}
