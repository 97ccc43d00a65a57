use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use futures::channel::oneshot;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use parking_lot::Mutex;

use crate::error::{DrawingError, DrawingResult};
use crate::renderer::Raster;

/// MIME type handed to the share action
pub const PNG_MIME: &str = "image/png";

const FILE_PREFIX: &str = "DrawingApp_";

/// Encode a raster as PNG (lossless, RGBA8)
pub fn encode_png(raster: &Raster) -> DrawingResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(DrawingError::Encode)?;
    Ok(bytes)
}

/// Decode any image format the `image` crate understands into RGBA8
pub fn decode_image(bytes: &[u8]) -> DrawingResult<Raster> {
    let image = image::load_from_memory(bytes).map_err(DrawingError::Decode)?;
    Ok(image.to_rgba8())
}

/// Whole seconds since the UNIX epoch, used in export file names
fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// First unused `DrawingApp_<timestamp>[_n].png` path in `dir`
pub fn export_path(dir: &Path, timestamp: u64) -> PathBuf {
    let mut path = dir.join(format!("{FILE_PREFIX}{timestamp}.png"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{FILE_PREFIX}{timestamp}_{n}.png"));
        n += 1;
    }
    path
}

/// Encode `raster` and write it under `dir`, returning the absolute file path.
///
/// Bytes go to a `.partial` sibling first and are renamed into place, so a failed
/// write never leaves a truncated `.png` behind.
pub fn save_png(raster: &Raster, dir: &Path, timestamp: u64) -> DrawingResult<PathBuf> {
    let bytes = encode_png(raster)?;
    let path = export_path(dir, timestamp);
    let partial = path.with_extension("png.partial");

    if let Err(err) = fs::write(&partial, &bytes) {
        let _ = fs::remove_file(&partial);
        return Err(DrawingError::io(partial, err));
    }
    if let Err(err) = fs::rename(&partial, &path) {
        let _ = fs::remove_file(&partial);
        return Err(DrawingError::io(path, err));
    }

    let absolute = std::path::absolute(&path).map_err(|err| DrawingError::io(&path, err))?;
    log::info!("Saved {} ({} bytes)", absolute.display(), bytes.len());
    Ok(absolute)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Running,
}

/// Resets the shared state when the worker finishes, panics, or never starts.
struct InFlight(Arc<Mutex<ExportState>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        *self.0.lock() = ExportState::Idle;
    }
}

/// Runs PNG export on a worker thread, one export at a time.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    state: Arc<Mutex<ExportState>>,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: Arc::new(Mutex::new(ExportState::Idle)),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn state(&self) -> ExportState {
        *self.state.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.state() == ExportState::Running
    }

    /// Hand a snapshot raster to the worker. Fails with
    /// [`DrawingError::ExportInFlight`] while a previous export is running.
    pub fn start(&self, raster: Raster) -> DrawingResult<ExportHandle> {
        let dir = self.output_dir.clone();
        log::info!(
            "Exporting {}x{} canvas to {}",
            raster.width(),
            raster.height(),
            dir.display()
        );
        self.spawn(move || save_png(&raster, &dir, unix_timestamp()))
    }

    fn spawn<F>(&self, job: F) -> DrawingResult<ExportHandle>
    where
        F: FnOnce() -> DrawingResult<PathBuf> + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if *state == ExportState::Running {
                return Err(DrawingError::ExportInFlight);
            }
            *state = ExportState::Running;
        }

        let in_flight = InFlight(Arc::clone(&self.state));
        let (sender, receiver) = oneshot::channel();
        thread::Builder::new()
            .name("png-export".to_owned())
            .spawn(move || {
                // Declared after `sender` so an unwinding job frees the slot first.
                let sender = sender;
                let in_flight = in_flight;
                let result = job();
                if let Err(err) = &result {
                    log::error!("Export failed: {}", err);
                }
                // Free the slot before the caller can observe the result.
                drop(in_flight);
                if sender.send(result).is_err() {
                    log::warn!("Export finished but nobody is waiting for it");
                }
            })
            .map_err(|err| DrawingError::io(&self.output_dir, err))?;

        Ok(ExportHandle { receiver })
    }
}

/// Completion of one export: `.await` it, or poll with [`ExportHandle::try_result`]
/// from a frame loop.
#[derive(Debug)]
pub struct ExportHandle {
    receiver: oneshot::Receiver<DrawingResult<PathBuf>>,
}

impl ExportHandle {
    /// `None` while the worker is still running.
    pub fn try_result(&mut self) -> Option<DrawingResult<PathBuf>> {
        match self.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::Canceled) => Some(Err(DrawingError::ExportAborted)),
        }
    }
}

impl Future for ExportHandle {
    type Output = DrawingResult<PathBuf>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|result| result.unwrap_or(Err(DrawingError::ExportAborted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn timestamps_are_epoch_seconds() {
        assert!(unix_timestamp() > 1_600_000_000);
    }

    #[test]
    fn second_export_is_rejected_while_running() {
        let exporter = Exporter::new(std::env::temp_dir());
        let (release, wait) = mpsc::channel::<()>();

        let first = exporter
            .spawn(move || {
                let _ = wait.recv();
                Ok(PathBuf::from("first.png"))
            })
            .unwrap();
        assert!(exporter.is_busy());

        let second = exporter.spawn(|| Ok(PathBuf::from("second.png")));
        assert!(matches!(second, Err(DrawingError::ExportInFlight)));

        release.send(()).unwrap();
        let path = futures::executor::block_on(first).unwrap();
        assert_eq!(path, PathBuf::from("first.png"));
        assert_eq!(exporter.state(), ExportState::Idle);

        let third = exporter.spawn(|| Ok(PathBuf::from("third.png"))).unwrap();
        assert_eq!(
            futures::executor::block_on(third).unwrap(),
            PathBuf::from("third.png")
        );
    }

    #[test]
    fn panicking_worker_frees_the_slot() {
        let exporter = Exporter::new(std::env::temp_dir());
        let handle = exporter.spawn(|| panic!("encoder exploded")).unwrap();

        let result = futures::executor::block_on(handle);
        assert!(matches!(result, Err(DrawingError::ExportAborted)));
        assert!(!exporter.is_busy());
    }

    #[test]
    fn try_result_is_none_until_done() {
        let exporter = Exporter::new(std::env::temp_dir());
        let (release, wait) = mpsc::channel::<()>();
        let mut handle = exporter
            .spawn(move || {
                let _ = wait.recv();
                Ok(PathBuf::from("done.png"))
            })
            .unwrap();

        assert!(handle.try_result().is_none());
        release.send(()).unwrap();

        let result = loop {
            if let Some(result) = handle.try_result() {
                break result;
            }
            thread::yield_now();
        };
        assert_eq!(result.unwrap(), PathBuf::from("done.png"));
    }
}
