use std::path::PathBuf;

use crate::color::parse_color;
use crate::config::AppConfig;
use crate::error::{DrawingError, DrawingResult};
use crate::export::{self, ExportHandle, Exporter, PNG_MIME};
use crate::input::{EventResponse, PointerEvent};
use crate::platform::{Notification, PermissionStatus, Platform};
use crate::surface::DrawingSurface;

const SAVE_SUCCESS: &str = "File saved successfully :";
const SAVE_FAILURE: &str = "Something went wrong while saving the file";
const IMPORT_FAILURE: &str = "Error in parsing the image or it is corrupted";
const PERMISSION_RATIONALE: &str = "Required permission to open Gallery";
const PERMISSION_GRANTED: &str = "Permission Granted now you can access Gallery";
const PERMISSION_REQUIRED: &str = "Permission Required";

/// Ties the canvas to export and to the platform services.
///
/// User-facing failures are reported through [`Platform::notify`] and also
/// returned, so callers can decide whether to do anything beyond the message.
pub struct DrawingSession {
    surface: DrawingSurface,
    exporter: Exporter,
    pending_export: Option<ExportHandle>,
    platform: Box<dyn Platform>,
}

impl DrawingSession {
    pub fn new(surface: DrawingSurface, exporter: Exporter, platform: Box<dyn Platform>) -> Self {
        Self {
            surface,
            exporter,
            pending_export: None,
            platform,
        }
    }

    pub fn from_config(config: &AppConfig, platform: Box<dyn Platform>) -> DrawingResult<Self> {
        let mut surface = DrawingSurface::new(config.initial_brush(1.0)?, config.redo_policy);
        surface.set_background_fill(parse_color(&config.background_color)?);
        Ok(Self::new(surface, Exporter::new(config.export_dir()), platform))
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> EventResponse {
        self.surface.handle_event(event)
    }

    pub fn undo(&mut self) -> bool {
        self.surface.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.surface.redo()
    }

    pub fn set_color(&mut self, color: &str) -> DrawingResult<()> {
        let result = self.surface.set_color(color);
        self.report(result)
    }

    pub fn set_brush_size(&mut self, size_dp: f32) -> DrawingResult<()> {
        let result = self.surface.set_brush_size(size_dp);
        self.report(result)
    }

    fn report<T>(&mut self, result: DrawingResult<T>) -> DrawingResult<T> {
        if let Err(err) = &result {
            log::warn!("{}", err);
            self.platform.notify(Notification::error(err.to_string()));
        }
        result
    }

    /// Storage gate in front of import and export. When access is missing the
    /// user is asked once; the action only runs if that request grants it.
    fn ensure_storage(&mut self) -> DrawingResult<()> {
        let status = self.platform.storage_permission();
        if status == PermissionStatus::Granted {
            return Ok(());
        }
        if status == PermissionStatus::ShowRationale {
            self.platform.notify(Notification::info(PERMISSION_RATIONALE));
        }
        match self.platform.request_storage_permission() {
            PermissionStatus::Granted => {
                self.platform.notify(Notification::info(PERMISSION_GRANTED));
                Ok(())
            }
            refused => {
                log::warn!("Storage permission refused ({:?})", refused);
                self.platform.notify(Notification::error(PERMISSION_REQUIRED));
                Err(DrawingError::PermissionDenied(
                    "storage access was not granted".to_owned(),
                ))
            }
        }
    }

    /// Decode `bytes` and show the image behind the strokes.
    pub fn import_background(&mut self, bytes: &[u8]) -> DrawingResult<()> {
        self.ensure_storage()?;
        match export::decode_image(bytes) {
            Ok(image) => {
                self.surface.set_background(image);
                Ok(())
            }
            Err(err) => {
                log::error!("Background import failed: {}", err);
                self.platform.notify(Notification::error(IMPORT_FAILURE));
                Err(err)
            }
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.pending_export.is_some() || self.exporter.is_busy()
    }

    /// Capture the canvas and start writing it as PNG in the background.
    /// Completion is picked up by [`DrawingSession::poll_export`].
    pub fn save(&mut self) -> DrawingResult<()> {
        self.ensure_storage()?;
        if self.is_exporting() {
            return self.report(Err(DrawingError::ExportInFlight));
        }
        let raster = self.surface.capture_composition();
        let raster = self.report(raster)?;
        let handle = self.exporter.start(raster);
        self.pending_export = Some(self.report(handle)?);
        Ok(())
    }

    /// Deliver a finished export, if any. On success the file is indexed and
    /// shared; either way the user gets a notification.
    pub fn poll_export(&mut self) -> Option<DrawingResult<PathBuf>> {
        let result = self.pending_export.as_mut()?.try_result()?;
        self.pending_export = None;
        Some(self.deliver(result))
    }

    /// Block until the in-flight export (if any) finishes, then deliver it.
    pub fn finish_export(&mut self) -> Option<DrawingResult<PathBuf>> {
        let handle = self.pending_export.take()?;
        let result = futures::executor::block_on(handle);
        Some(self.deliver(result))
    }

    fn deliver(&mut self, result: DrawingResult<PathBuf>) -> DrawingResult<PathBuf> {
        match &result {
            Ok(path) => {
                self.platform
                    .notify(Notification::info(format!("{SAVE_SUCCESS}{}", path.display())));
                if let Err(err) = self.platform.index_media(path) {
                    log::warn!("Media indexing failed: {}", err);
                }
                self.platform.share(path, PNG_MIME);
            }
            Err(err) => {
                log::error!("Export failed: {}", err);
                self.platform.notify(Notification::error(SAVE_FAILURE));
            }
        }
        result
    }
}
