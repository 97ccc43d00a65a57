use std::fs;
use std::path::PathBuf;

use drawing_app::export::{self, Exporter, PNG_MIME};
use drawing_app::DrawingError;
use drawing_app::surface::DrawingSurface;
use egui::Pos2;
use image::{Rgba, RgbaImage};

/// Unique scratch directory, removed on drop
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("drawing_app_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.0)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn create_test_raster() -> RgbaImage {
    let mut raster = RgbaImage::new(17, 9);
    for (x, y, p) in raster.enumerate_pixels_mut() {
        *p = Rgba([(x * 15) as u8, (y * 28) as u8, ((x + y) * 7) as u8, (255 - x * 3) as u8]);
    }
    raster
}

#[test]
fn test_png_round_trip_is_lossless() {
    let raster = create_test_raster();
    let bytes = export::encode_png(&raster).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = export::decode_image(&bytes).unwrap();
    assert_eq!(decoded, raster);
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(matches!(
        export::decode_image(b"definitely not an image"),
        Err(DrawingError::Decode(_))
    ));
}

#[test]
fn test_save_png_writes_timestamped_file() {
    let dir = ScratchDir::new();
    let raster = create_test_raster();

    let path = export::save_png(&raster, &dir.0, 1_700_000_000).unwrap();
    assert!(path.is_absolute());
    assert_eq!(path.file_name().unwrap(), "DrawingApp_1700000000.png");
    assert_eq!(dir.files(), vec!["DrawingApp_1700000000.png".to_owned()]);

    let written = export::decode_image(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(written, raster);
}

#[test]
fn test_same_second_exports_do_not_overwrite() {
    let dir = ScratchDir::new();
    let raster = create_test_raster();

    let first = export::save_png(&raster, &dir.0, 42).unwrap();
    let second = export::save_png(&raster, &dir.0, 42).unwrap();
    assert_ne!(first, second);
    assert_eq!(
        dir.files(),
        vec!["DrawingApp_42.png".to_owned(), "DrawingApp_42_1.png".to_owned()]
    );
}

#[test]
fn test_write_failure_leaves_no_file() {
    let dir = ScratchDir::new();
    let missing = dir.0.join("missing");

    let err = export::save_png(&create_test_raster(), &missing, 7).unwrap_err();
    assert!(matches!(err, DrawingError::IoFailure { .. }));
    assert!(!missing.exists());
    assert!(dir.files().is_empty());
}

#[test]
fn test_empty_surface_export_fails_without_file() {
    let dir = ScratchDir::new();
    let mut surface = DrawingSurface::default();
    surface.resize(64, 0);

    let err = surface.capture_composition().unwrap_err();
    assert!(matches!(err, DrawingError::EmptyBounds { width: 64, height: 0 }));
    assert!(dir.files().is_empty());
}

#[test]
fn test_exporter_writes_composition_in_background() {
    let dir = ScratchDir::new();
    let exporter = Exporter::new(&dir.0);

    let mut surface = DrawingSurface::default();
    surface.resize(32, 32);
    surface.set_color("#FF0000").unwrap();
    surface.on_pointer_down(Pos2::new(4.0, 16.0));
    surface.on_pointer_move(Pos2::new(28.0, 16.0));
    surface.on_pointer_up();
    let composition = surface.capture_composition().unwrap();

    let handle = exporter.start(composition.clone()).unwrap();
    let path = futures::executor::block_on(handle).unwrap();
    assert!(!exporter.is_busy());

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("DrawingApp_") && name.ends_with(".png"), "{name}");
    assert_eq!(dir.files(), vec![name]);

    let written = export::decode_image(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(written, composition);
    assert_eq!(written.get_pixel(16, 16).0, [255, 0, 0, 255]);
    assert_eq!(written.get_pixel(16, 2).0, [255, 255, 255, 255]);
    assert_eq!(PNG_MIME, "image/png");
}

#[test]
fn test_exporter_reports_io_failure() {
    let dir = ScratchDir::new();
    let exporter = Exporter::new(dir.0.join("gone"));

    let raster = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let handle = exporter.start(raster).unwrap();

    let result = futures::executor::block_on(handle);
    assert!(matches!(result, Err(DrawingError::IoFailure { .. })));
    assert!(!exporter.is_busy());
    assert!(dir.files().is_empty());
}
