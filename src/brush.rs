use tiny_skia::ColorU8;

use crate::color::{self, parse_color};
use crate::error::{DrawingError, DrawingResult};

/// Brush thickness used before anything else is picked, in density-independent units.
pub const DEFAULT_BRUSH_SIZE_DP: f32 = 20.0;

/// Color and thickness applied to strokes started from now on.
///
/// Existing strokes copy these values when they begin, so changing the brush never
/// repaints what is already on the canvas. The thickness is always finite and
/// positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    color: ColorU8,
    /// Thickness in device pixels.
    thickness: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: color::rgb(0, 0, 0),
            thickness: DEFAULT_BRUSH_SIZE_DP,
        }
    }
}

/// Reject thicknesses a stroke can't be drawn with.
pub(crate) fn check_thickness(thickness: f32) -> DrawingResult<f32> {
    if thickness.is_finite() && thickness > 0.0 {
        Ok(thickness)
    } else {
        Err(DrawingError::InvalidBrushSize(thickness))
    }
}

impl BrushSettings {
    /// `thickness` is in device pixels.
    pub fn new(color: ColorU8, thickness: f32) -> DrawingResult<Self> {
        Ok(Self {
            color,
            thickness: check_thickness(thickness)?,
        })
    }

    pub fn color(&self) -> ColorU8 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Set the color from a hex (`#RRGGBB`, `#AARRGGBB`) or named color string.
    /// The brush is left untouched when the string doesn't parse.
    pub fn set_color(&mut self, color: &str) -> DrawingResult<()> {
        self.color = parse_color(color)?;
        Ok(())
    }

    /// Set the size in density-independent units, converting to device pixels with
    /// the display density (`pixels_per_point` on desktop).
    pub fn set_size_dp(&mut self, size_dp: f32, density: f32) -> DrawingResult<()> {
        self.thickness =
            check_thickness(size_dp * density).map_err(|_| DrawingError::InvalidBrushSize(size_dp))?;
        Ok(())
    }
}

/// The three presets offered by the brush-size chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushSize {
    Small,
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [BrushSize; 3] = [BrushSize::Small, BrushSize::Medium, BrushSize::Large];

    pub fn label(&self) -> &'static str {
        match self {
            BrushSize::Small => "Small",
            BrushSize::Medium => "Medium",
            BrushSize::Large => "Large",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_scaled_by_density() {
        let mut brush = BrushSettings::default();
        brush.set_size_dp(10.0, 2.5).unwrap();
        assert_eq!(brush.thickness(), 25.0);
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let mut brush = BrushSettings::default();
        for size in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                brush.set_size_dp(size, 1.0),
                Err(DrawingError::InvalidBrushSize(_))
            ));
        }
        assert_eq!(brush.thickness(), DEFAULT_BRUSH_SIZE_DP);
    }

    #[test]
    fn construction_rejects_unusable_thickness() {
        for thickness in [0.0, -1.0, f32::NAN, f32::NEG_INFINITY] {
            assert!(matches!(
                BrushSettings::new(color::rgb(255, 0, 0), thickness),
                Err(DrawingError::InvalidBrushSize(_))
            ));
        }
        let brush = BrushSettings::new(color::rgb(255, 0, 0), 0.5).unwrap();
        assert_eq!(brush.thickness(), 0.5);
    }

    #[test]
    fn bad_color_keeps_previous_color() {
        let blue = color::rgb(0, 0, 255);
        let mut brush = BrushSettings::new(blue, 5.0).unwrap();
        assert!(brush.set_color("#12345").is_err());
        assert_eq!(brush.color(), blue);

        brush.set_color("#FF0000").unwrap();
        assert_eq!(brush.color(), color::rgb(255, 0, 0));
    }
}
