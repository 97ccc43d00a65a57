use std::time::Duration;

use egui::{Color32, Key, KeyboardShortcut, Modifiers, TextureHandle, TextureOptions};

use crate::brush::BrushSize;
use crate::config::AppConfig;
use crate::error::DrawingResult;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels;
use crate::platform::{DesktopPlatform, NotificationLevel, NotificationQueue};
use crate::renderer;
use crate::session::DrawingSession;

const UNDO_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
const REDO_SHIFT_SHORTCUT: KeyboardShortcut = KeyboardShortcut::new(
    Modifiers {
        shift: true,
        ..Modifiers::COMMAND
    },
    Key::Z,
);

/// How long a notification stays on screen, in seconds
const TOAST_SECONDS: f64 = 3.0;

/// Brush choices restored between runs.
/// We derive Deserialize/Serialize so we can persist them on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct UiSettings {
    pub brush_size_dp: f32,
    /// Picked palette entry; `None` keeps the configured brush color
    pub palette_index: Option<usize>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            brush_size_dp: crate::brush::DEFAULT_BRUSH_SIZE_DP,
            palette_index: None,
        }
    }
}

struct Toast {
    message: String,
    level: NotificationLevel,
    expires_at: f64,
}

pub struct PaintApp {
    pub(crate) session: DrawingSession,
    pub(crate) config: AppConfig,
    pub(crate) settings: UiSettings,
    pub(crate) input: InputHandler,
    pub(crate) show_brush_dialog: bool,
    file_handler: FileHandler,
    notifications: NotificationQueue,
    toasts: Vec<Toast>,
    background_texture: Option<TextureHandle>,
    stroke_texture: Option<TextureHandle>,
    shown_background: Option<u64>,
    shown_revision: Option<u64>,
    pixels_per_point: f32,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> DrawingResult<Self> {
        let notifications = NotificationQueue::default();
        let platform = DesktopPlatform::new(config.export_dir(), notifications.clone());
        let session = DrawingSession::from_config(&config, Box::new(platform))?;

        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<UiSettings>(storage, eframe::APP_KEY))
            .unwrap_or_else(|| UiSettings {
                brush_size_dp: config.brush_size_dp,
                palette_index: None,
            });

        let mut app = Self {
            session,
            config,
            settings,
            input: InputHandler::new(egui::Rect::NOTHING),
            show_brush_dialog: false,
            file_handler: FileHandler::new(),
            notifications,
            toasts: Vec::new(),
            background_texture: None,
            stroke_texture: None,
            shown_background: None,
            shown_revision: None,
            pixels_per_point: cc.egui_ctx.pixels_per_point(),
        };
        app.apply_density(app.pixels_per_point);
        // A palette entry picked in an earlier run overrides `brush_color`. If it no
        // longer exists or parses, the configured color stays and the pick is dropped.
        let picked = app
            .config
            .palette_color(app.settings.palette_index)
            .map(str::to_owned);
        let restored = picked.is_some_and(|color| app.session.set_color(&color).is_ok());
        if !restored {
            app.settings.palette_index = None;
        }
        Ok(app)
    }

    fn apply_density(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point;
        self.session.surface_mut().set_density(pixels_per_point);
        let _ = self.session.set_brush_size(self.settings.brush_size_dp);
    }

    pub(crate) fn select_brush_size(&mut self, size: BrushSize) {
        let dp = self.config.brush_sizes_dp.dp(size);
        if self.session.set_brush_size(dp).is_ok() {
            self.settings.brush_size_dp = dp;
        }
        self.show_brush_dialog = false;
    }

    pub(crate) fn select_palette_entry(&mut self, index: usize) {
        if self.settings.palette_index == Some(index) {
            return;
        }
        let Some(color) = self.config.palette.get(index).cloned() else {
            return;
        };
        if self.session.set_color(&color).is_ok() {
            self.settings.palette_index = Some(index);
        }
    }

    pub(crate) fn save(&mut self) {
        // Failures are already shown as notifications by the session.
        let _ = self.session.save();
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo) = ctx.input_mut(|i| {
            let redo = i.consume_shortcut(&REDO_SHIFT_SHORTCUT) | i.consume_shortcut(&REDO_SHORTCUT);
            (i.consume_shortcut(&UNDO_SHORTCUT), redo)
        });
        if undo {
            self.session.undo();
        }
        if redo {
            self.session.redo();
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if let Some(bytes) = self.file_handler.take_dropped_image(ctx) {
            let _ = self.session.import_background(&bytes);
        }
    }

    /// Feed this frame's pointer events to the canvas occupying `rect`.
    pub(crate) fn handle_canvas_input(
        &mut self,
        ctx: &egui::Context,
        rect: egui::Rect,
        accepts_new_gestures: bool,
    ) {
        let ppp = ctx.pixels_per_point();
        let width = (rect.width() * ppp).round().max(0.0) as u32;
        let height = (rect.height() * ppp).round().max(0.0) as u32;
        self.session.surface_mut().resize(width, height);

        self.input.set_canvas_rect(rect, ppp);
        for event in self.input.process_input(ctx) {
            if !accepts_new_gestures && matches!(event, crate::input::PointerEvent::Down(_)) {
                continue;
            }
            self.session.handle_event(event);
        }
    }

    /// Upload the background and stroke layers that changed since the last
    /// frame. Returns their textures, bottom first.
    pub(crate) fn canvas_layers(&mut self, ctx: &egui::Context) -> [Option<egui::TextureId>; 2] {
        let surface = self.session.surface_mut();
        if surface.take_redraw_request() {
            ctx.request_repaint();
        }

        let background_revision = surface.background_revision();
        if self.shown_background != Some(background_revision) {
            let image = surface.background_layer().map(renderer::to_color_image);
            upload(ctx, "canvas_background", &mut self.background_texture, image);
            self.shown_background = Some(background_revision);
        }

        let revision = surface.revision();
        if self.shown_revision != Some(revision) {
            let image = surface.render().as_ref().map(renderer::to_color_image);
            upload(ctx, "canvas_strokes", &mut self.stroke_texture, image);
            self.shown_revision = Some(revision);
        }

        [&self.background_texture, &self.stroke_texture]
            .map(|texture| texture.as_ref().map(TextureHandle::id))
    }

    fn poll_export(&mut self, ctx: &egui::Context) {
        self.session.poll_export();
        if self.session.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(100));
            egui::Window::new("Saving")
                .collapsible(false)
                .resizable(false)
                .title_bar(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Saving…");
                    });
                });
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for notification in self.notifications.drain() {
            self.toasts.push(Toast {
                message: notification.message,
                level: notification.level,
                expires_at: now + TOAST_SECONDS,
            });
        }
        self.toasts.retain(|toast| toast.expires_at > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let color = match toast.level {
                            NotificationLevel::Info => ui.visuals().text_color(),
                            NotificationLevel::Error => Color32::LIGHT_RED,
                        };
                        ui.colored_label(color, &toast.message);
                    });
                }
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }

    fn brush_size_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_brush_dialog {
            return;
        }
        let mut open = true;
        let mut picked = None;
        egui::Window::new("Brush Size: ")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for size in BrushSize::ALL {
                        let dp = self.config.brush_sizes_dp.dp(size);
                        if ui.button(format!("{} ({dp})", size.label())).clicked() {
                            picked = Some(size);
                        }
                    }
                });
            });
        if let Some(size) = picked {
            self.select_brush_size(size);
        } else if !open {
            self.show_brush_dialog = false;
        }
    }
}

fn upload(
    ctx: &egui::Context,
    name: &str,
    slot: &mut Option<TextureHandle>,
    image: Option<egui::ColorImage>,
) {
    // Nothing to show until the first layout.
    let Some(image) = image else {
        *slot = None;
        return;
    };
    if let Some(texture) = slot {
        texture.set(image, TextureOptions::LINEAR);
    } else {
        *slot = Some(ctx.load_texture(name, image, TextureOptions::LINEAR));
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let ppp = ctx.pixels_per_point();
        if ppp != self.pixels_per_point {
            self.apply_density(ppp);
        }

        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        panels::tools_panel(self, ctx);
        panels::central_panel(self, ctx);

        self.brush_size_dialog(ctx);
        self.poll_export(ctx);
        self.show_toasts(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(Err(err)) = self.session.finish_export() {
            log::error!("Export still failed at shutdown: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_an_older_run_still_load() {
        let settings: UiSettings =
            serde_json::from_str(r#"{ "brush_size_dp": 30.0, "palette_index": 2 }"#).unwrap();
        assert_eq!(settings.palette_index, Some(2));

        let fresh: UiSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(fresh, UiSettings::default());
        assert_eq!(fresh.palette_index, None);
    }
}
