use eframe::egui;

/// A color swatch in the palette. The current entry is drawn "pressed".
pub struct PaletteButton {
    pub color: Option<egui::Color32>,
    pub selected: bool,
}

impl PaletteButton {
    /// `color` is `None` when the configured string doesn't parse; the swatch
    /// is then drawn crossed out but stays clickable so the error gets reported.
    pub fn new(color: Option<egui::Color32>, selected: bool) -> Self {
        Self { color, selected }
    }

    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let button_size = egui::vec2(32.0, 32.0);
        let (rect, response) = ui.allocate_exact_size(button_size, egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let swatch = if self.selected { rect.shrink(4.0) } else { rect.shrink(2.0) };

            match self.color {
                Some(color) => {
                    painter.rect_filled(swatch, 4.0, color);
                }
                None => {
                    painter.rect_filled(swatch, 4.0, egui::Color32::from_gray(60));
                    painter.line_segment(
                        [swatch.left_top(), swatch.right_bottom()],
                        egui::Stroke::new(2.0, egui::Color32::LIGHT_RED),
                    );
                }
            }

            let border = if self.selected {
                egui::Stroke::new(3.0, egui::Color32::from_rgb(33, 150, 243))
            } else if response.hovered() {
                egui::Stroke::new(1.0, egui::Color32::from_gray(160))
            } else {
                egui::Stroke::new(1.0, egui::Color32::from_gray(90))
            };
            painter.rect_stroke(rect, 4.0, border);
        }

        response
    }
}
