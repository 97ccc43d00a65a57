#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod color;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod input;
pub mod panels;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod stroke;
pub mod surface;

pub use app::PaintApp;
pub use brush::{BrushSettings, BrushSize};
pub use config::AppConfig;
pub use error::{DrawingError, DrawingResult};
pub use export::{ExportHandle, Exporter};
pub use history::{RedoPolicy, StrokeLog};
pub use input::{EventResponse, GestureState, PointerEvent};
pub use platform::{Notification, PermissionStatus, Platform};
pub use renderer::Raster;
pub use session::DrawingSession;
pub use stroke::{MutableStroke, Stroke};
pub use surface::DrawingSurface;
