use egui::{Pos2, Rect};
use tiny_skia::ColorU8;
use uuid::Uuid;

use crate::brush::{BrushSettings, check_thickness};
use crate::error::DrawingResult;

/// A finished freehand line. Points are frozen once the stroke is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: Uuid,
    points: Vec<Pos2>,
    color: ColorU8,
    thickness: f32,
}

/// The stroke currently being captured. Only grows by appending points.
#[derive(Debug, Clone)]
pub struct MutableStroke {
    id: Uuid,
    points: Vec<Pos2>,
    color: ColorU8,
    thickness: f32,
}

impl Stroke {
    /// Fails with [`DrawingError::InvalidBrushSize`](crate::DrawingError::InvalidBrushSize)
    /// unless `thickness` is finite and positive.
    pub fn new(color: ColorU8, thickness: f32, points: Vec<Pos2>) -> DrawingResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            points,
            color,
            thickness: check_thickness(thickness)?,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> ColorU8 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Bounding box of the painted area, including half the line width.
    pub fn bounds(&self) -> Rect {
        stroke_bounds(&self.points, self.thickness)
    }
}

impl MutableStroke {
    /// Start a stroke with the brush's current color and thickness. The brush
    /// only holds valid thicknesses, so the finished stroke does too.
    pub fn begin(brush: &BrushSettings, start: Pos2) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            color: brush.color(),
            thickness: brush.thickness(),
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> ColorU8 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze into a [`Stroke`], consuming the in-progress record so it can't be
    /// held by two owners.
    pub fn finish(self) -> Stroke {
        Stroke {
            id: self.id,
            points: self.points,
            color: self.color,
            thickness: self.thickness,
        }
    }

    /// Borrowing view used for rendering the live stroke.
    pub fn as_preview(&self) -> StrokeView<'_> {
        StrokeView {
            points: &self.points,
            color: self.color,
            thickness: self.thickness,
        }
    }
}

/// Borrowed stroke data, enough to rasterize either kind of stroke.
#[derive(Debug, Clone, Copy)]
pub struct StrokeView<'a> {
    pub points: &'a [Pos2],
    pub color: ColorU8,
    pub thickness: f32,
}

impl<'a> From<&'a Stroke> for StrokeView<'a> {
    fn from(stroke: &'a Stroke) -> Self {
        Self {
            points: &stroke.points,
            color: stroke.color,
            thickness: stroke.thickness,
        }
    }
}

fn stroke_bounds(points: &[Pos2], thickness: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }
    let rect = Rect::from_points(points);
    rect.expand(thickness / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutable_stroke_freezes_with_brush_properties() {
        let red = crate::color::rgb(255, 0, 0);
        let brush = BrushSettings::new(red, 8.0).unwrap();
        let mut live = MutableStroke::begin(&brush, Pos2::new(1.0, 2.0));
        live.add_point(Pos2::new(3.0, 4.0));
        let id = live.id;

        let stroke = live.finish();
        assert_eq!(stroke.id(), id);
        assert_eq!(stroke.color(), red);
        assert_eq!(stroke.thickness(), 8.0);
        assert_eq!(stroke.points(), &[Pos2::new(1.0, 2.0), Pos2::new(3.0, 4.0)]);
    }

    #[test]
    fn bounds_include_half_thickness() {
        let stroke = Stroke::new(
            crate::color::rgb(0, 0, 0),
            4.0,
            vec![Pos2::new(10.0, 10.0), Pos2::new(20.0, 30.0)],
        )
        .unwrap();
        let bounds = stroke.bounds();
        assert_eq!(bounds.min, Pos2::new(8.0, 8.0));
        assert_eq!(bounds.max, Pos2::new(22.0, 32.0));
    }

    #[test]
    fn zero_thickness_is_rejected() {
        let points = vec![Pos2::new(1.0, 1.0), Pos2::new(2.0, 2.0)];
        let black = crate::color::rgb(0, 0, 0);
        assert!(matches!(
            Stroke::new(black, 0.0, points.clone()),
            Err(crate::DrawingError::InvalidBrushSize(_))
        ));
        assert!(Stroke::new(black, f32::NAN, points).is_err());
    }
}
