use eframe::egui;

/// Picks up image files dropped onto the window; the first one becomes the
/// canvas background.
#[derive(Default)]
pub struct FileHandler {
    last_dropped: Option<String>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the first image dropped this frame, if any.
    pub fn take_dropped_image(&mut self, ctx: &egui::Context) -> Option<Vec<u8>> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let file = dropped.iter().find(|file| {
            let supported = is_image_file(file);
            if !supported {
                log::warn!("Dropped file is not a supported type: {}", file_name(file));
            }
            supported
        })?;

        let name = file_name(file);
        let bytes = read_bytes(file)?;
        log::info!("Processing dropped image {} ({} bytes)", name, bytes.len());
        self.last_dropped = Some(name);
        Some(bytes)
    }

    pub fn last_dropped(&self) -> Option<&str> {
        self.last_dropped.as_deref()
    }

    /// Overlay listing files being dragged over the window
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Drop an image to use it as background:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => text += &format!("\n{}", path.display()),
                    None => text += "\n(Path not available)",
                }
            }
            text
        });

        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    file.path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
        })
        .unwrap_or(false)
}

fn read_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::error!("Failed to read image file: {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dropped(path: Option<&str>, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            path: path.map(PathBuf::from),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn detects_images_by_mime_or_extension() {
        assert!(is_image_file(&dropped(None, "image/png")));
        assert!(!is_image_file(&dropped(Some("a.png"), "text/plain")));
        assert!(is_image_file(&dropped(Some("/tmp/photo.JPG"), "")));
        assert!(!is_image_file(&dropped(Some("/tmp/notes.txt"), "")));
        assert!(!is_image_file(&dropped(None, "")));
    }

    #[test]
    fn inline_bytes_win_over_path() {
        let file = egui::DroppedFile {
            path: Some(PathBuf::from("/does/not/exist.png")),
            bytes: Some(vec![1u8, 2, 3].into()),
            ..Default::default()
        };
        assert_eq!(read_bytes(&file), Some(vec![1, 2, 3]));
        assert_eq!(file_name(&file), "/does/not/exist.png");
    }
}
