use egui::Pos2;
use tiny_skia::{ColorU8, Pixmap};

use crate::brush::BrushSettings;
use crate::color;
use crate::error::{DrawingError, DrawingResult};
use crate::history::{RedoPolicy, StrokeLog};
use crate::input::{EventResponse, GestureState, PointerEvent};
use crate::renderer::{self, Raster};
use crate::stroke::{MutableStroke, Stroke};

/// A rendered layer tagged with the revision it was drawn from.
struct CachedLayer {
    revision: u64,
    pixmap: Pixmap,
}

/// The canvas: persistent raster buffer, stroke log, live stroke and brush.
///
/// All methods run on the UI thread and never block. Anything that changes what
/// the canvas looks like raises a redraw request, consumed with
/// [`DrawingSurface::take_redraw_request`].
pub struct DrawingSurface {
    width: u32,
    height: u32,
    /// Absent until the first layout reports a non-zero size
    buffer: Option<Pixmap>,
    log: StrokeLog,
    current: Option<MutableStroke>,
    brush: BrushSettings,
    /// Device pixels per density-independent unit
    density: f32,
    background: Option<Raster>,
    background_fill: ColorU8,
    /// Committed strokes over the buffer, keyed by the stroke log revision
    committed_layer: Option<CachedLayer>,
    /// Fill plus stretched background image, keyed by `background_revision`
    background_layer: Option<CachedLayer>,
    revision: u64,
    background_revision: u64,
    redraw_requested: bool,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new(BrushSettings::default(), RedoPolicy::default())
    }
}

impl DrawingSurface {
    pub fn new(brush: BrushSettings, policy: RedoPolicy) -> Self {
        Self {
            width: 0,
            height: 0,
            buffer: None,
            log: StrokeLog::new(policy),
            current: None,
            brush,
            density: 1.0,
            background: None,
            background_fill: color::rgb(255, 255, 255),
            committed_layer: None,
            background_layer: None,
            revision: 0,
            background_revision: 0,
            redraw_requested: false,
        }
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        self.redraw_requested = true;
    }

    fn invalidate_background(&mut self) {
        self.background_revision += 1;
        self.invalidate();
    }

    /// Pixel dimensions of the view
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Reallocate the persistent buffer for a new view size. Previous buffer
    /// content is dropped; strokes are kept and re-rendered at the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if [width, height] == self.size() {
            return;
        }
        log::info!("Canvas resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.buffer = renderer::layer(width, height);
        self.committed_layer = None;
        self.background_layer = None;
        self.invalidate_background();
    }

    pub fn on_pointer_down(&mut self, pos: Pos2) {
        log::debug!("Stroke started at {:?}", pos);
        self.current = Some(MutableStroke::begin(&self.brush, pos));
        self.invalidate();
    }

    /// Extend the live stroke. Returns false when no stroke is being captured.
    pub fn on_pointer_move(&mut self, pos: Pos2) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        stroke.add_point(pos);
        self.invalidate();
        true
    }

    /// Commit the live stroke. Returns false when no stroke is being captured.
    pub fn on_pointer_up(&mut self) -> bool {
        let Some(stroke) = self.current.take() else {
            return false;
        };
        let stroke = stroke.finish();
        log::debug!(
            "Committing stroke {} ({} points)",
            stroke.id(),
            stroke.points().len()
        );
        self.log.commit(stroke);
        self.invalidate();
        true
    }

    /// Drop the live stroke without committing it.
    pub fn cancel_stroke(&mut self) -> bool {
        if self.current.take().is_none() {
            return false;
        }
        log::debug!("Stroke cancelled");
        self.invalidate();
        true
    }

    /// Drive the Idle/Capturing gesture state machine with one pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) -> EventResponse {
        match event {
            PointerEvent::Down(pos) => {
                self.on_pointer_down(pos);
                EventResponse::Handled
            }
            PointerEvent::Move(pos) => responded(self.on_pointer_move(pos)),
            PointerEvent::Up(_) => responded(self.on_pointer_up()),
            PointerEvent::Cancel => responded(self.cancel_stroke()),
            PointerEvent::Other(code) => {
                log::trace!("Unhandled pointer action {}", code);
                EventResponse::Unhandled
            }
        }
    }

    pub fn gesture_state(&self) -> GestureState {
        if self.current.is_some() {
            GestureState::Capturing
        } else {
            GestureState::Idle
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.log.undo();
        if changed {
            log::info!("Undo ({} strokes left)", self.log.committed().len());
            self.invalidate();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.log.redo();
        if changed {
            log::info!("Redo ({} strokes)", self.log.committed().len());
            self.invalidate();
        }
        changed
    }

    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    pub fn committed_strokes(&self) -> &[Stroke] {
        self.log.committed()
    }

    pub fn current_stroke(&self) -> Option<&MutableStroke> {
        self.current.as_ref()
    }

    pub fn set_redo_policy(&mut self, policy: RedoPolicy) {
        self.log.set_policy(policy);
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// Replace the brush wholesale (e.g. restored from saved settings)
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush;
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn set_density(&mut self, density: f32) {
        if density.is_finite() && density > 0.0 {
            self.density = density;
        }
    }

    /// Brush size in density-independent units
    pub fn set_brush_size(&mut self, size_dp: f32) -> DrawingResult<()> {
        self.brush.set_size_dp(size_dp, self.density)
    }

    pub fn set_color(&mut self, color: &str) -> DrawingResult<()> {
        self.brush.set_color(color)
    }

    /// Show `image` behind the strokes, stretched to the view
    pub fn set_background(&mut self, image: Raster) {
        log::info!("Background set ({}x{})", image.width(), image.height());
        self.background = Some(image);
        self.invalidate_background();
    }

    pub fn clear_background(&mut self) {
        if self.background.take().is_some() {
            self.invalidate_background();
        }
    }

    pub fn background(&self) -> Option<&Raster> {
        self.background.as_ref()
    }

    /// Fill used under the strokes when no background image is set
    pub fn set_background_fill(&mut self, color: ColorU8) {
        self.background_fill = color;
        self.invalidate_background();
    }

    /// Counter bumped on every visible change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Counter bumped when the background layer changes
    pub fn background_revision(&self) -> u64 {
        self.background_revision
    }

    /// Returns true once per batch of changes since the last call.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Draw the stroke layer: persistent buffer, committed strokes oldest to
    /// newest, then the live stroke on top. `None` before the first layout.
    pub fn render(&mut self) -> Option<Pixmap> {
        let buffer = self.buffer.as_ref()?;

        let revision = self.log.revision();
        let stale = self
            .committed_layer
            .as_ref()
            .is_none_or(|layer| layer.revision != revision);
        if stale {
            let mut pixmap = buffer.clone();
            for stroke in self.log.committed() {
                renderer::draw_stroke(&mut pixmap, stroke.into());
            }
            self.committed_layer = Some(CachedLayer { revision, pixmap });
        }

        let mut frame = self.committed_layer.as_ref()?.pixmap.clone();
        if let Some(live) = self.current.as_ref().filter(|s| !s.is_empty()) {
            renderer::draw_stroke(&mut frame, live.as_preview());
        }
        Some(frame)
    }

    /// The layer under the strokes: fill color, then the background image
    /// stretched to the view. `None` before the first layout.
    pub fn background_layer(&mut self) -> Option<&Pixmap> {
        let revision = self.background_revision;
        let stale = self
            .background_layer
            .as_ref()
            .is_none_or(|layer| layer.revision != revision);
        if stale {
            let mut pixmap = renderer::layer(self.width, self.height)?;
            renderer::fill(&mut pixmap, self.background_fill);
            if let Some(background) = &self.background {
                renderer::draw_image_stretched(&mut pixmap, background);
            }
            self.background_layer = Some(CachedLayer { revision, pixmap });
        }
        self.background_layer.as_ref().map(|layer| &layer.pixmap)
    }

    /// Everything visible, background then strokes, as a straight-alpha raster.
    pub fn capture_composition(&mut self) -> DrawingResult<Raster> {
        let [width, height] = self.size();
        let Some(mut out) = self.background_layer().cloned() else {
            return Err(DrawingError::EmptyBounds { width, height });
        };
        if let Some(strokes) = self.render() {
            renderer::draw_layer(&mut out, &strokes);
        }
        Ok(renderer::to_raster(&out))
    }
}

fn responded(handled: bool) -> EventResponse {
    if handled {
        EventResponse::Handled
    } else {
        EventResponse::Ignored
    }
}
