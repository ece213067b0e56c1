//! The progress widget as seen by a host window: value accessors, mutators
//! that raise redraw requests, value observers, sizing hints, timer dispatch
//! and painting.

use crate::animation::{AnimationController, FrameTick, Scheduler, TimerHandle};
use crate::config::{ProgressConfig, Size};
use crate::error::Result;
use crate::geometry::Rect;
use crate::model::ProgressModel;
use crate::render::{Canvas, Renderer, Scene};
use rusttype::Font;

type ValueObserver = Box<dyn FnMut(i32)>;

pub struct ProgressWidget {
    model: ProgressModel,
    show_label: bool,
    visible: bool,
    redraw_requested: bool,
    preferred_size: Size,
    minimum_size: Size,
    animation: AnimationController,
    renderer: Renderer,
    observers: Vec<ValueObserver>,
}

impl std::fmt::Debug for ProgressWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressWidget")
            .field("model", &self.model)
            .field("show_label", &self.show_label)
            .field("visible", &self.visible)
            .field("animation", &self.animation)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl ProgressWidget {
    /// Build a hidden widget from `config`. `font` sizes and draws the label;
    /// without one the label is never drawn.
    pub fn new(config: &ProgressConfig, font: Option<Font<'static>>) -> Result<Self> {
        let mut model = ProgressModel::with_range(config.range.0, config.range.1)?;
        model.set_value(config.initial_value);
        Ok(Self {
            model,
            show_label: config.show_label,
            visible: false,
            redraw_requested: true,
            preferred_size: config.preferred_size,
            minimum_size: config.minimum_size,
            animation: AnimationController::new(config.animation()),
            renderer: Renderer::new(config.style(), font),
            observers: Vec::new(),
        })
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn value(&self) -> i32 {
        self.model.value()
    }

    pub fn minimum(&self) -> i32 {
        self.model.minimum()
    }

    pub fn maximum(&self) -> i32 {
        self.model.maximum()
    }

    pub fn model(&self) -> &ProgressModel {
        &self.model
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn display_state(&self) -> bool {
        self.show_label
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn preferred_size(&self) -> Size {
        self.preferred_size
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Clamp and store `value`, then notify observers with the stored value.
    pub fn set_value(&mut self, value: i32) {
        let stored = self.model.set_value(value);
        self.request_redraw();
        for observer in &mut self.observers {
            observer(stored);
        }
    }

    pub fn set_minimum(&mut self, min: i32) -> Result<()> {
        self.model.set_minimum(min)?;
        tracing::debug!(min, "minimum changed");
        self.request_redraw();
        Ok(())
    }

    pub fn set_maximum(&mut self, max: i32) -> Result<()> {
        self.model.set_maximum(max)?;
        tracing::debug!(max, "maximum changed");
        self.request_redraw();
        Ok(())
    }

    pub fn set_range(&mut self, min: i32, max: i32) -> Result<()> {
        self.model.set_range(min, max)?;
        tracing::debug!(min, max, "range changed");
        self.request_redraw();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.model.reset();
        self.request_redraw();
    }

    /// Toggle the percentage label.
    pub fn set_display_state(&mut self, show: bool) {
        self.show_label = show;
        self.request_redraw();
    }

    /// Register a callback run after every `set_value`.
    pub fn on_value_changed(&mut self, observer: impl FnMut(i32) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ------------------------------------------------------------------------
    // Host lifecycle
    // ------------------------------------------------------------------------

    /// Make the widget visible and start waiting for the first sweep.
    pub fn show(&mut self, scheduler: &mut dyn Scheduler) {
        self.visible = true;
        self.animation.start(scheduler);
        self.request_redraw();
    }

    /// Hide the widget and stop both animation timers.
    pub fn hide(&mut self, scheduler: &mut dyn Scheduler) {
        self.visible = false;
        self.animation.stop(scheduler);
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Dispatch a fired timer. A returned tick must be handed to the paint
    /// it triggers, which also schedules the next timer.
    pub fn on_timer(&mut self, handle: TimerHandle, scheduler: &mut dyn Scheduler) -> Option<FrameTick> {
        let tick = self.animation.on_timer(handle, scheduler);
        if tick.is_some() {
            self.request_redraw();
        }
        tick
    }

    /// Compose the frame for `bounds` without rasterising it.
    pub fn compose(&mut self, bounds: Rect, tick: Option<FrameTick>, scheduler: &mut dyn Scheduler) -> Scene {
        self.renderer.render_frame(
            bounds,
            &self.model,
            self.show_label,
            &mut self.animation,
            tick,
            scheduler,
        )
    }

    /// Paint the whole canvas.
    pub fn paint(&mut self, canvas: &mut Canvas, tick: Option<FrameTick>, scheduler: &mut dyn Scheduler) {
        let scene = self.compose(canvas.bounds(), tick, scheduler);
        self.renderer.rasterize(&scene, canvas);
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}
