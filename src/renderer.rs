// src/renderer.rs
use egui::Pos2;
use image::{RgbaImage, imageops::FilterType};
use tiny_skia::{
    Color, ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};

use crate::stroke::StrokeView;

/// RGBA8 pixel buffer with straight (unmultiplied) alpha, the import/export format.
pub type Raster = RgbaImage;

/// Allocate a transparent layer. `None` when either dimension is zero.
pub fn layer(width: u32, height: u32) -> Option<Pixmap> {
    Pixmap::new(width, height)
}

/// Overwrite every pixel with `color`.
pub fn fill(layer: &mut Pixmap, color: ColorU8) {
    layer.fill(Color::from_rgba8(
        color.red(),
        color.green(),
        color.blue(),
        color.alpha(),
    ));
}

/// Composite `src` over `dst`, aligned at the top-left corner.
pub fn draw_layer(dst: &mut Pixmap, src: &Pixmap) {
    dst.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Composite a decoded image over `dst`, stretched to cover all of it.
pub fn draw_image_stretched(dst: &mut Pixmap, src: &Raster) {
    if src.width() == 0 || src.height() == 0 {
        return;
    }
    let scaled;
    let src = if src.dimensions() == (dst.width(), dst.height()) {
        src
    } else {
        scaled = image::imageops::resize(src, dst.width(), dst.height(), FilterType::Triangle);
        &scaled
    };
    if let Some(image) = from_raster(src) {
        draw_layer(dst, &image);
    }
}

/// Anti-aliased polyline with round caps and joins. A single point paints a dot.
pub fn draw_stroke(layer: &mut Pixmap, stroke: StrokeView<'_>) {
    let Some(&first) = stroke.points.first() else {
        return;
    };

    let mut paint = Paint::default();
    let c = stroke.color;
    paint.set_color_rgba8(c.red(), c.green(), c.blue(), c.alpha());
    paint.anti_alias = true;

    // A zero-length path has no segments to stroke.
    if stroke.points.iter().all(|p| *p == first) {
        if let Some(dot) = PathBuilder::from_circle(first.x, first.y, stroke.thickness / 2.0) {
            layer.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let Some(path) = polyline(stroke.points) else {
        return;
    };
    let pen = tiny_skia::Stroke {
        width: stroke.thickness,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    layer.stroke_path(&path, &paint, &pen, Transform::identity(), None);
}

fn polyline(points: &[Pos2]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Straight-alpha copy of a layer, for encoding.
pub fn to_raster(layer: &Pixmap) -> Raster {
    let pixels = layer.pixels();
    let width = layer.width();
    RgbaImage::from_fn(width, layer.height(), |x, y| {
        let c = pixels[(y * width + x) as usize].demultiply();
        image::Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    })
}

/// Premultiplied copy of a decoded image. `None` for an empty image.
pub fn from_raster(raster: &Raster) -> Option<Pixmap> {
    let mut layer = Pixmap::new(raster.width(), raster.height())?;
    for (dst, src) in layer.pixels_mut().iter_mut().zip(raster.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(layer)
}

/// Straight-alpha value of one pixel; transparent outside the layer.
pub fn pixel(layer: &Pixmap, x: u32, y: u32) -> [u8; 4] {
    layer
        .pixel(x, y)
        .map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .unwrap_or([0; 4])
}

/// Convert for upload as an egui texture. Both sides store premultiplied RGBA.
pub fn to_color_image(layer: &Pixmap) -> egui::ColorImage {
    egui::ColorImage::from_rgba_premultiplied(
        [layer.width() as usize, layer.height() as usize],
        layer.data(),
    )
}
