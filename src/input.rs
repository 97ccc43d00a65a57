use egui::{Context, Event, PointerButton, Pos2, Rect};

/// Pointer input in view-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
    /// The gesture was aborted (pointer left the window, touch cancelled)
    Cancel,
    /// Any other platform action code; never handled by the canvas
    Other(u32),
}

/// What the canvas did with a [`PointerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// The event changed the in-progress stroke or the stroke log
    Handled,
    /// A recognised event arriving while idle (move/up without a down)
    Ignored,
    /// Unrecognised action code; the caller may route it elsewhere
    Unhandled,
}

impl EventResponse {
    pub fn is_handled(self) -> bool {
        self == EventResponse::Handled
    }
}

/// Per-gesture capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Capturing,
}

/// Turns raw egui events into [`PointerEvent`]s for a canvas occupying `canvas_rect`.
///
/// Positions are converted from egui points to canvas pixels with the context's
/// `pixels_per_point`, so strokes line up with the raster the canvas renders into.
pub struct InputHandler {
    canvas_rect: Rect,
    pixels_per_point: f32,
    capturing: bool,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            pixels_per_point: 1.0,
            capturing: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect, pixels_per_point: f32) {
        self.canvas_rect = rect;
        self.pixels_per_point = pixels_per_point;
    }

    fn to_canvas(&self, pos: Pos2) -> Pos2 {
        ((pos - self.canvas_rect.min) * self.pixels_per_point).to_pos2()
    }

    /// Collect this frame's pointer events. A gesture only starts inside the canvas;
    /// once started it is followed until release even if the pointer wanders out.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<PointerEvent> {
        let raw_events = ctx.input(|input| input.raw.events.clone());
        self.translate(&raw_events)
    }

    pub fn translate(&mut self, raw_events: &[Event]) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        for event in raw_events {
            match event {
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    ..
                } if self.canvas_rect.contains(*pos) => {
                    self.capturing = true;
                    events.push(PointerEvent::Down(self.to_canvas(*pos)));
                }
                Event::PointerMoved(pos) if self.capturing => {
                    events.push(PointerEvent::Move(self.to_canvas(*pos)));
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } if self.capturing => {
                    self.capturing = false;
                    events.push(PointerEvent::Up(self.to_canvas(*pos)));
                }
                Event::PointerGone if self.capturing => {
                    self.capturing = false;
                    events.push(PointerEvent::Cancel);
                }
                _ => {}
            }
        }
        events
    }
}
