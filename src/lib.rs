// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animation;
pub mod config;
pub mod error;
pub mod font_fit;
pub mod geometry;
pub mod model;
pub mod render;
pub mod widget;

pub use animation::{AnimationConfig, AnimationController, AnimationPhase, FrameTick, Scheduler, TimerHandle, TimerQueue};
pub use config::{Color, ProgressConfig, RingStyle, Size};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use model::ProgressModel;
pub use render::{Canvas, Renderer, Scene};
pub use widget::ProgressWidget;

// External crate imports
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for updates sent from other threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressCommand {
    SetValue(i32),
    SetMinimum(i32),
    SetMaximum(i32),
    SetRange(i32, i32), // minimum, maximum
    Reset,
    SetDisplayState(bool),
    Close,
}

/// A progress widget hosted in its own window.
#[derive(Debug)]
pub struct CircularProgress {
    config: ProgressConfig,
    widget: ProgressWidget,
}

impl CircularProgress {
    /// Create the widget. A missing label font only disables the label.
    pub fn new(config: ProgressConfig) -> Result<Self> {
        let font = match font_fit::load_font(config.font_path.as_deref()) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!(%err, "percentage label disabled");
                None
            }
        };
        let widget = ProgressWidget::new(&config, font)?;
        Ok(Self { config, widget })
    }

    pub fn widget(&self) -> &ProgressWidget {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut ProgressWidget {
        &mut self.widget
    }

    pub fn set_value(&mut self, value: i32) {
        self.widget.set_value(value);
    }

    pub fn set_range(&mut self, min: i32, max: i32) -> Result<()> {
        self.widget.set_range(min, max)
    }

    /// Open the window and block until it is closed.
    pub fn show(&mut self) -> Result<()> {
        self.run_window(None)
    }

    /// Like [`CircularProgress::show`], applying commands from `receiver`
    /// between frames.
    pub fn show_with_commands(&mut self, receiver: Receiver<ProgressCommand>) -> Result<()> {
        self.run_window(Some(receiver))
    }

    fn run_window(&mut self, receiver: Option<Receiver<ProgressCommand>>) -> Result<()> {
        let preferred = self.widget.preferred_size();
        let minimum = self.widget.minimum_size();

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                f64::from(preferred.width),
                f64::from(preferred.height),
            ))
            .with_min_inner_size(LogicalSize::new(
                f64::from(minimum.width),
                f64::from(minimum.height),
            ))
            .build(&event_loop)?;

        let window = Arc::new(window);
        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let command_poll = Duration::from_secs_f64(1.0 / self.config.max_framerate.max(1.0));
        let mut timers = TimerQueue::new(Instant::now());
        let mut pending_tick: Option<FrameTick> = None;
        let widget = &mut self.widget;
        widget.show(&mut timers);
        tracing::info!(width = fb_width, height = fb_height, "progress window opened");

        event_loop.run(move |event, window_target| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    widget.hide(&mut timers);
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    match pixels.resize_buffer(new_size.width, new_size.height) {
                        Ok(()) => {
                            fb_width = new_size.width as usize;
                            fb_height = new_size.height as usize;
                        }
                        Err(err) => tracing::warn!(%err, "framebuffer resize failed"),
                    }
                    if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                        tracing::warn!(%err, "surface resize failed");
                    }
                    window_clone.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let frame = pixels.frame_mut();
                    let mut canvas = Canvas::new(frame, fb_width, fb_height);
                    widget.paint(&mut canvas, pending_tick.take(), &mut timers);
                    if let Err(err) = pixels.render() {
                        tracing::error!(%err, "failed to present frame");
                        widget.hide(&mut timers);
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if let Some(ref receiver) = receiver {
                    while let Ok(command) = receiver.try_recv() {
                        if !apply_command(widget, command) {
                            tracing::info!("close requested by command");
                            widget.hide(&mut timers);
                            window_target.exit();
                            return;
                        }
                    }
                }

                let now = Instant::now();
                while let Some(handle) = timers.pop_due(now) {
                    if let Some(tick) = widget.on_timer(handle, &mut timers) {
                        pending_tick = Some(tick);
                    }
                }
                if widget.take_redraw_request() {
                    window_clone.request_redraw();
                }

                let next_timer = timers.next_deadline();
                let control_flow = match (&receiver, next_timer) {
                    (Some(_), Some(deadline)) => ControlFlow::WaitUntil(deadline.min(now + command_poll)),
                    (Some(_), None) => ControlFlow::WaitUntil(now + command_poll),
                    (None, Some(deadline)) => ControlFlow::WaitUntil(deadline),
                    (None, None) => ControlFlow::Wait,
                };
                window_target.set_control_flow(control_flow);
            }
            _ => {}
        })?;

        tracing::info!("progress window closed");
        Ok(())
    }
}

// ============================================================================
// INTERNAL IMPLEMENTATION
// ============================================================================

/// Apply one command; returns `false` when the window should close.
fn apply_command(widget: &mut ProgressWidget, command: ProgressCommand) -> bool {
    let outcome = match command {
        ProgressCommand::SetValue(value) => {
            widget.set_value(value);
            Ok(())
        }
        ProgressCommand::SetMinimum(min) => widget.set_minimum(min),
        ProgressCommand::SetMaximum(max) => widget.set_maximum(max),
        ProgressCommand::SetRange(min, max) => widget.set_range(min, max),
        ProgressCommand::Reset => {
            widget.reset();
            Ok(())
        }
        ProgressCommand::SetDisplayState(show) => {
            widget.set_display_state(show);
            Ok(())
        }
        ProgressCommand::Close => return false,
    };
    if let Err(err) = outcome {
        tracing::warn!(%err, "ignoring progress command");
    }
    true
}
