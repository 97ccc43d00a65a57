use crate::PaintApp;
use crate::color::{parse_color, to_color32};
use crate::components::PaletteButton;

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(160.0)
        .show(ctx, |ui| {
            ui.heading("Brush");

            let brush = *app.session.surface().brush();
            ui.label(format!("Size: {} dp", app.settings.brush_size_dp));
            if ui.button("🖌 Brush size…").clicked() {
                app.show_brush_dialog = true;
            }
            let (rect, _) = ui.allocate_exact_size(egui::vec2(32.0, 32.0), egui::Sense::hover());
            let radius = (brush.thickness() / ctx.pixels_per_point() / 2.0).clamp(1.0, 16.0);
            ui.painter()
                .circle_filled(rect.center(), radius, to_color32(brush.color()));

            ui.separator();
            ui.heading("Colors");

            let mut clicked = None;
            ui.horizontal_wrapped(|ui| {
                for (index, entry) in app.config.palette.iter().enumerate() {
                    let selected = app.settings.palette_index == Some(index);
                    let button = PaletteButton::new(parse_color(entry).ok().map(to_color32), selected);
                    if button.show(ui).on_hover_text(entry).clicked() {
                        clicked = Some(index);
                    }
                }
            });
            if let Some(index) = clicked {
                log::info!("Palette entry selected: {}", index);
                app.select_palette_entry(index);
            }

            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let log = app.session.surface().log();
                let (can_undo, can_redo) = (log.can_undo(), log.can_redo());

                if ui.add_enabled(can_undo, egui::Button::new("↶ Undo")).clicked() {
                    app.session.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("↷ Redo")).clicked() {
                    app.session.redo();
                }
            });

            let log = app.session.surface().log();
            ui.label(format!(
                "Strokes: {} (redo: {})",
                log.committed().len(),
                log.undone().len()
            ));

            ui.separator();
            ui.heading("Background");
            ui.label("Drop an image file on the window to use it as background.");
            let has_background = app.session.surface().background().is_some();
            if ui
                .add_enabled(has_background, egui::Button::new("Clear background"))
                .clicked()
            {
                app.session.surface_mut().clear_background();
            }

            ui.separator();
            let saving = app.session.is_exporting();
            if ui
                .add_enabled(!saving, egui::Button::new("💾 Save & share"))
                .clicked()
            {
                app.save();
            }
            ui.small(format!(
                "Saves to {}",
                app.session.exporter().output_dir().display()
            ));
        });
}
