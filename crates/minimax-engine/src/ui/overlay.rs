use crate::anim::{SpringAnimator, SpringConfig};
use crate::coords::{ColorRgba, Extent, Rect};

/// Solid quad in logical pixels with a premultiplied color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UiQuad {
    pub rect: Rect,
    pub color: ColorRgba,
}

const PANEL_WIDTH: f32 = 280.0;
const MARGIN: f32 = 16.0;
const HEADER_HEIGHT: f32 = 28.0;
const ROW_HEIGHT: f32 = 18.0;
const ROW_GAP: f32 = 10.0;
const ROWS: usize = 4;

/// Below this both springs snap to their targets.
const SETTLE_EPSILON: f64 = 1e-3;

/// Side panel that slides in from the right edge and fades while moving.
///
/// `slide` and `opacity` run from 0 (hidden) to 1 (shown); each has its own
/// spring so they can be tuned independently.
#[derive(Debug, Clone)]
pub struct Overlay {
    visible: bool,
    slide: SpringAnimator,
    opacity: SpringAnimator,
}

impl Overlay {
    /// Overlay at rest in the given state.
    pub fn new(config: SpringConfig, visible: bool) -> Self {
        let v = if visible { 1.0 } else { 0.0 };
        Self {
            visible,
            slide: SpringAnimator::with_config(config, v, v),
            opacity: SpringAnimator::with_config(config, v, v),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flips the target state; the panel animates from wherever it is.
    pub fn toggle(&mut self) {
        self.set_visible(!self.visible);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let target = if visible { 1.0 } else { 0.0 };
        self.slide.set_target(target);
        self.opacity.set_target(target);
    }

    /// Advances both springs by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        for spring in [&mut self.slide, &mut self.opacity] {
            if spring.is_settled(SETTLE_EPSILON) {
                spring.snap_to_target();
                continue;
            }
            spring.step(dt);
            if spring.is_settled(SETTLE_EPSILON) {
                spring.snap_to_target();
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        self.slide.position() != self.slide.target()
            || self.opacity.position() != self.opacity.target()
    }

    /// Current slide progress, 0 hidden .. 1 shown. May overshoot slightly.
    pub fn slide(&self) -> f64 {
        self.slide.position()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.position().clamp(0.0, 1.0)
    }

    /// Quads for a window of `logical` size, back to front.
    pub fn quads(&self, logical: Extent) -> Vec<UiQuad> {
        let alpha = self.opacity() as f32;
        if logical.is_empty() || alpha <= 0.0 {
            return Vec::new();
        }

        let width = PANEL_WIDTH.min(logical.width as f32 - 2.0 * MARGIN).max(0.0);
        let height = (logical.height as f32 - 2.0 * MARGIN).max(0.0);
        if width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }

        // slide 0 puts the panel just past the right edge.
        let shown_x = logical.width as f32 - MARGIN - width;
        let hidden_x = logical.width as f32;
        let x = hidden_x + (shown_x - hidden_x) * self.slide.position() as f32;
        let panel = Rect::new(x, MARGIN, width, height);

        let mut quads = Vec::with_capacity(2 + ROWS);
        quads.push(UiQuad {
            rect: panel,
            color: ColorRgba::new(0.06, 0.06, 0.08, 0.85).premultiplied(alpha),
        });

        let inner = width - 2.0 * MARGIN;
        quads.push(UiQuad {
            rect: Rect::new(x + MARGIN, MARGIN * 2.0, inner, HEADER_HEIGHT),
            color: ColorRgba::new(0.25, 0.45, 0.85, 1.0).premultiplied(alpha),
        });

        let mut y = MARGIN * 2.0 + HEADER_HEIGHT + ROW_GAP;
        for i in 0..ROWS {
            if y + ROW_HEIGHT > MARGIN + height {
                break;
            }
            // Rows shrink a little so the panel reads as a list.
            let w = inner * (1.0 - 0.15 * i as f32);
            quads.push(UiQuad {
                rect: Rect::new(x + MARGIN, y, w, ROW_HEIGHT),
                color: ColorRgba::new(0.8, 0.8, 0.82, 0.35).premultiplied(alpha),
            });
            y += ROW_HEIGHT + ROW_GAP;
        }

        quads
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(SpringConfig::gentle(), true)
    }
}
