use crate::PaintApp;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;

            // Gestures only start when the canvas is the topmost thing under the pointer.
            app.handle_canvas_input(ctx, rect, response.contains_pointer());

            // Render the canvas: background layer, then strokes
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            for texture in app.canvas_layers(ctx).into_iter().flatten() {
                painter.image(texture, rect, uv, egui::Color32::WHITE);
            }
        });
}
