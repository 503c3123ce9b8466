//! Autoscroll processor
//!
//! Advances a viewport's horizontal offset every tick, wraps it by one cell
//! pitch at the loop boundary (asking the caller to rotate its content), and
//! pauses on user interaction with an idle timer that resumes scrolling.
//!
//! The processor is not thread-safe by itself: every entry point must be
//! invoked from one serial context. [`crate::driver`] provides that context
//! on tokio.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::clock::FrameClock;
use crate::config::{MotionConfig, ScrollDirection};
use crate::geometry::Point;
use crate::timer::ScheduledTask;
use crate::viewport::{Viewport, ViewportEvent};

pub type RotateCallback = Box<dyn FnMut(ScrollDirection) + Send>;
pub type SelectCallback = Box<dyn FnMut(usize) + Send>;

/// Scroll state owned by the processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    /// Tracked content offset
    pub offset: Point,
    /// Whether ticks are currently ignored
    pub paused: bool,
    /// Travel direction
    pub direction: ScrollDirection,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Paused, destroyed, or the viewport is gone
    Skipped,
    /// Offset advanced without crossing a boundary
    Moved { offset: f64 },
    /// Offset crossed the boundary `wraps` times and was corrected
    Wrapped { offset: f64, wraps: u32 },
}

/// Drives one viewport as an infinitely looping carousel.
pub struct AutoscrollProcessor<V: Viewport> {
    config: MotionConfig,
    state: ScrollState,
    /// Non-owning handle to the host's viewport
    viewport: Option<Weak<Mutex<V>>>,
    clock: FrameClock,
    tick_timer: ScheduledTask,
    idle_timer: ScheduledTask,
    on_rotate: Option<RotateCallback>,
    on_select: Option<SelectCallback>,
    destroyed: bool,
}

impl<V: Viewport> std::fmt::Debug for AutoscrollProcessor<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoscrollProcessor")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("stopped", &self.is_stopped())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<V: Viewport> AutoscrollProcessor<V> {
    /// Bind to `viewport` and start both timers.
    ///
    /// Scrolling starts paused; the idle timer first fires after
    /// `initial_resume_delay` and then every `idle_resume_delay`.
    pub fn new(viewport: &Arc<Mutex<V>>, config: MotionConfig) -> crate::Result<Self> {
        Self::starting_at(viewport, config, Instant::now())
    }

    /// Same as [`AutoscrollProcessor::new`] with an explicit start time.
    pub fn starting_at(
        viewport: &Arc<Mutex<V>>,
        config: MotionConfig,
        now: Instant,
    ) -> crate::Result<Self> {
        config.validate()?;

        let tick_interval = config.tick_interval();
        let tick_timer = ScheduledTask::scheduled(now, tick_interval, Some(tick_interval));
        let idle_timer = ScheduledTask::scheduled(
            now,
            config.initial_resume_delay(),
            Some(config.idle_resume_delay()),
        );

        let offset = lock_viewport(viewport)
            .map(|vp| clamp_to_strip(vp.content_offset(), scroll_limit(&*vp)))
            .unwrap_or(Point::ZERO);

        debug!(
            speed = config.speed,
            direction = ?config.direction,
            pitch = config.pitch(),
            "Autoscroll processor created"
        );

        Ok(Self {
            clock: FrameClock::new(tick_interval, config.max_frame_delta, now),
            state: ScrollState {
                offset,
                paused: true,
                direction: config.direction,
            },
            viewport: Some(Arc::downgrade(viewport)),
            tick_timer,
            idle_timer,
            on_rotate: None,
            on_select: None,
            destroyed: false,
            config,
        })
    }

    /// Register the content rotation callback
    pub fn on_rotate(mut self, callback: impl FnMut(ScrollDirection) + Send + 'static) -> Self {
        self.on_rotate = Some(Box::new(callback));
        self
    }

    /// Register the item selection callback
    pub fn on_select(mut self, callback: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    #[inline]
    pub fn offset(&self) -> Point {
        self.state.offset
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Paused with automatic resume disabled
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state.paused && self.idle_timer.is_suspended()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Earliest pending timer deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tick_timer.next_deadline(), self.idle_timer.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// When the idle-resume timer will next fire
    pub fn idle_resume_deadline(&self) -> Option<Instant> {
        self.idle_timer.next_deadline()
    }

    /// Fire whichever timers are due at `now`.
    ///
    /// The idle timer is handled first so a resume and a tick landing on the
    /// same instant produce motion in that tick.
    pub fn poll_timers(&mut self, now: Instant) -> TickOutcome {
        if self.idle_timer.poll(now) {
            self.on_idle_timer(now);
        }
        if self.tick_timer.poll(now) {
            let delta = self.clock.tick_at(now);
            return self.step(delta);
        }
        TickOutcome::Skipped
    }

    /// Tick using the wall clock.
    pub fn on_tick(&mut self) -> TickOutcome {
        let delta = self.clock.tick();
        self.step(delta)
    }

    /// Advance by `normalized_delta` nominal ticks.
    ///
    /// The delta is clamped to `[0, max_frame_delta]`. Moves the offset by
    /// `sign * speed * delta`, corrects it by one pitch per boundary crossing
    /// (rotating content each time) and writes it back to the viewport.
    pub fn step(&mut self, normalized_delta: f64) -> TickOutcome {
        if self.state.paused {
            return TickOutcome::Skipped;
        }
        let Some(limit) = self.with_viewport(|vp| scroll_limit(&*vp)) else {
            trace!("Tick skipped: viewport released");
            return TickOutcome::Skipped;
        };

        let delta = if normalized_delta.is_nan() {
            0.0
        } else {
            normalized_delta.clamp(0.0, self.config.max_frame_delta)
        };
        let direction = self.state.direction;
        let moved = self.state.offset.x + direction.sign() * self.config.speed * delta;
        let (x, wraps) = wrap_offset(moved, direction, self.config.pitch(), limit);

        self.state.offset.x = x;

        // Callbacks run without the viewport lock so they may touch the host.
        if wraps > 0 {
            debug!(offset = x, wraps, ?direction, "Carousel wrapped");
            if let Some(rotate) = self.on_rotate.as_mut() {
                for _ in 0..wraps {
                    rotate(direction);
                }
            }
        } else {
            trace!(offset = x, delta, "Carousel advanced");
        }

        let offset = self.state.offset;
        self.with_viewport(|vp| vp.set_content_offset(offset));

        if wraps > 0 {
            TickOutcome::Wrapped { offset: x, wraps }
        } else {
            TickOutcome::Moved { offset: x }
        }
    }

    /// Suspend scrolling; resume automatically after `idle_resume_delay`.
    ///
    /// Every call pushes the resume deadline back. Reads the tokio clock,
    /// see [`Self::pause_at`] for an explicit time.
    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn pause_at(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.state.paused = true;
        self.idle_timer
            .reschedule(now, self.config.idle_resume_delay(), None);
        debug!("Autoscroll paused");
    }

    /// Resume scrolling now and restart the repeating idle timer.
    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    pub fn resume_at(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        if self.state.paused {
            self.clock.reset(now);
        }
        self.state.paused = false;
        self.idle_timer
            .reschedule(now, Duration::ZERO, Some(self.config.idle_resume_delay()));
        debug!("Autoscroll resumed");
    }

    /// Suspend scrolling with no automatic resume until [`Self::resume`].
    pub fn stop(&mut self) {
        if self.destroyed {
            return;
        }
        self.state.paused = true;
        self.idle_timer.suspend();
        debug!("Autoscroll stopped");
    }

    fn on_idle_timer(&mut self, now: Instant) {
        if self.state.paused {
            debug!("Idle timeout reached, resuming autoscroll");
            self.clock.reset(now);
        }
        self.state.paused = false;
    }

    /// Dispatch a user interaction forwarded by the viewport host.
    pub fn handle_event(&mut self, event: ViewportEvent) {
        match event {
            ViewportEvent::DragBegan => self.on_drag_begin(),
            ViewportEvent::DragEnded => self.on_drag_end(),
            ViewportEvent::ItemSelected(index) => self.on_item_selected(index),
        }
    }

    /// Pause and snap the viewport to the tracked offset.
    pub fn on_drag_begin(&mut self) {
        self.pause();
        let offset = self.state.offset;
        self.with_viewport(|vp| vp.set_content_offset(offset));
    }

    /// Pause and adopt whatever offset the user left the viewport at,
    /// pulled back inside the scrollable range.
    pub fn on_drag_end(&mut self) {
        self.pause();
        let adopted = self.with_viewport(|vp| {
            let offset = clamp_to_strip(vp.content_offset(), scroll_limit(&*vp));
            vp.set_content_offset(offset);
            offset
        });
        if let Some(offset) = adopted {
            self.state.offset = offset;
        }
    }

    /// Stop scrolling and report the selection to the caller.
    pub fn on_item_selected(&mut self, index: usize) {
        if self.destroyed {
            return;
        }
        self.stop();
        debug!(index, "Carousel item selected");
        if let Some(select) = self.on_select.as_mut() {
            select(index);
        }
    }

    /// Cancel both timers and release the viewport and callbacks.
    ///
    /// Safe to call any number of times.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.state.paused = true;
        self.tick_timer.cancel();
        self.idle_timer.cancel();
        self.viewport = None;
        self.on_rotate = None;
        self.on_select = None;
        debug!("Autoscroll processor destroyed");
    }

    /// Run `f` against the viewport if it is still alive.
    fn with_viewport<R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        if self.destroyed {
            return None;
        }
        let viewport = self.viewport.as_ref()?.upgrade()?;
        let mut guard = lock_viewport(&viewport)?;
        Some(f(&mut guard))
    }
}

impl<V: Viewport> Drop for AutoscrollProcessor<V> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Largest offset before the Backward boundary
fn scroll_limit<V: Viewport + ?Sized>(viewport: &V) -> f64 {
    viewport.content_size().width - viewport.viewport_size().width
}

fn clamp_to_strip(offset: Point, limit: f64) -> Point {
    let x = if offset.x.is_finite() {
        offset.x.min(limit).max(0.0)
    } else {
        0.0
    };
    Point::new(x, offset.y)
}

/// Bring `x` back inside the loop bounds in one step.
///
/// Returns the corrected offset and the number of pitches applied. Forward
/// lands in `(0, pitch]`, Backward in `[limit - pitch, limit)`.
fn wrap_offset(x: f64, direction: ScrollDirection, pitch: f64, limit: f64) -> (f64, u32) {
    match direction {
        ScrollDirection::Forward if x <= 0.0 => {
            let wraps = (-x / pitch).floor() + 1.0;
            let rem = x.rem_euclid(pitch);
            let x = if rem > 0.0 { rem } else { pitch };
            (x, wraps as u32)
        }
        ScrollDirection::Backward if x >= limit => {
            let wraps = ((x - limit) / pitch).floor() + 1.0;
            let base = limit - pitch;
            let x = base + (x - base).rem_euclid(pitch);
            (if x < limit { x } else { base }, wraps as u32)
        }
        _ => (x, 0),
    }
}

fn lock_viewport<V>(viewport: &Arc<Mutex<V>>) -> Option<MutexGuard<'_, V>> {
    match viewport.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            warn!("Viewport lock poisoned, skipping update");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::viewport::StripViewport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scenario_config(direction: ScrollDirection) -> MotionConfig {
        MotionConfig {
            speed: 0.25,
            tick_interval_ms: 15,
            direction,
            cell_width: 108.0,
            cell_height: 108.0,
            cell_spacing: 10.0,
            ..Default::default()
        }
    }

    fn strip(offset_x: f64) -> Arc<Mutex<StripViewport>> {
        Arc::new(Mutex::new(
            StripViewport::new(Size::new(1052.0, 108.0), Size::new(320.0, 108.0))
                .with_offset(Point::new(offset_x, 0.0)),
        ))
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(ScrollDirection) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn running(
        viewport: &Arc<Mutex<StripViewport>>,
        config: MotionConfig,
    ) -> AutoscrollProcessor<StripViewport> {
        let mut processor = AutoscrollProcessor::new(viewport, config).unwrap();
        processor.resume();
        processor
    }

    #[test]
    fn test_starts_paused_with_viewport_offset() {
        let viewport = strip(40.0);
        let mut processor =
            AutoscrollProcessor::new(&viewport, scenario_config(ScrollDirection::Forward)).unwrap();

        assert!(processor.is_paused());
        assert!(!processor.is_stopped());
        assert_eq!(processor.offset().x, 40.0);
        assert_eq!(processor.step(1.0), TickOutcome::Skipped);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 40.0);
    }

    #[test]
    fn test_idle_timer_starts_scrolling_after_initial_delay() {
        let viewport = strip(100.0);
        let start = Instant::now();
        let config = scenario_config(ScrollDirection::Forward);
        let mut processor = AutoscrollProcessor::starting_at(&viewport, config, start).unwrap();

        assert_eq!(
            processor.poll_timers(start + Duration::from_millis(990)),
            TickOutcome::Skipped
        );
        assert!(processor.is_paused());

        let outcome = processor.poll_timers(start + Duration::from_millis(1005));
        assert!(!processor.is_paused());
        assert!(matches!(outcome, TickOutcome::Moved { .. }));
        assert_eq!(
            processor.idle_resume_deadline(),
            Some(start + Duration::from_millis(6000))
        );
    }

    #[test]
    fn test_forward_wraps_once_after_full_pitch() {
        let viewport = strip(118.0);
        let (rotations, on_rotate) = counter();
        let mut processor =
            running(&viewport, scenario_config(ScrollDirection::Forward)).on_rotate(on_rotate);

        for _ in 0..471 {
            assert!(matches!(processor.step(1.0), TickOutcome::Moved { .. }));
        }
        assert_eq!(rotations.load(Ordering::SeqCst), 0);
        assert!((processor.offset().x - 0.25).abs() < 1e-9);

        let outcome = processor.step(1.0);
        assert_eq!(outcome, TickOutcome::Wrapped { offset: 118.0, wraps: 1 });
        assert_eq!(rotations.load(Ordering::SeqCst), 1);

        let x = processor.offset().x;
        assert!(x > 0.0 && x <= 118.0);
        assert_eq!(viewport.lock().unwrap().content_offset().x, x);
    }

    #[test]
    fn test_backward_wraps_at_content_end() {
        let viewport = strip(731.5);
        let (rotations, on_rotate) = counter();
        let config = MotionConfig {
            speed: 1.0,
            ..scenario_config(ScrollDirection::Backward)
        };
        let mut processor = running(&viewport, config).on_rotate(on_rotate);

        let outcome = processor.step(1.0);
        assert_eq!(outcome, TickOutcome::Wrapped { offset: 614.5, wraps: 1 });
        assert_eq!(rotations.load(Ordering::SeqCst), 1);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 614.5);
    }

    #[test]
    fn test_backward_wraps_on_every_pitch_over_many_ticks() {
        let viewport = strip(700.0);
        let (rotations, on_rotate) = counter();
        let config = MotionConfig {
            speed: 1.0,
            ..scenario_config(ScrollDirection::Backward)
        };
        let mut processor = running(&viewport, config).on_rotate(on_rotate);

        for _ in 0..31 {
            assert!(matches!(processor.step(1.0), TickOutcome::Moved { .. }));
        }
        assert_eq!(processor.offset().x, 731.0);
        assert_eq!(processor.step(1.0), TickOutcome::Wrapped { offset: 614.0, wraps: 1 });

        for _ in 0..117 {
            assert!(matches!(processor.step(1.0), TickOutcome::Moved { .. }));
        }
        assert_eq!(rotations.load(Ordering::SeqCst), 1);
        assert_eq!(processor.step(1.0), TickOutcome::Wrapped { offset: 614.0, wraps: 1 });
        assert_eq!(rotations.load(Ordering::SeqCst), 2);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 614.0);
    }

    #[test]
    fn test_wrap_correction_applies_every_crossing_at_once() {
        let forward = ScrollDirection::Forward;
        let backward = ScrollDirection::Backward;

        assert_eq!(wrap_offset(-290.0, forward, 118.0, 732.0), (64.0, 3));
        assert_eq!(wrap_offset(0.0, forward, 118.0, 732.0), (118.0, 1));
        assert_eq!(wrap_offset(5.0, forward, 118.0, 732.0), (5.0, 0));
        assert_eq!(wrap_offset(732.0, backward, 118.0, 732.0), (614.0, 1));
        assert_eq!(wrap_offset(1000.0, backward, 118.0, 732.0), (646.0, 3));

        let (x, wraps) = wrap_offset(-1e18, forward, 118.0, 732.0);
        assert!(x > 0.0 && x <= 118.0);
        assert_eq!(wraps, u32::MAX);

        let (x, _) = wrap_offset(1e18, backward, 118.0, 732.0);
        assert!((614.0..732.0).contains(&x));
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));

        processor.step(1e300);
        assert_eq!(processor.offset().x, 99.0);
        processor.step(-5.0);
        processor.step(f64::NAN);
        assert_eq!(processor.offset().x, 99.0);
    }

    #[test]
    fn test_far_offset_is_pulled_into_range_on_drag_end() {
        let viewport = strip(100.0);
        let (rotations, on_rotate) = counter();
        let mut processor =
            running(&viewport, scenario_config(ScrollDirection::Forward)).on_rotate(on_rotate);

        processor.on_drag_begin();
        viewport.lock().unwrap().set_content_offset(Point::new(-1e18, 0.0));
        processor.on_drag_end();
        assert_eq!(processor.offset().x, 0.0);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 0.0);

        processor.resume();
        let outcome = processor.step(1.0);
        assert_eq!(outcome, TickOutcome::Wrapped { offset: 117.75, wraps: 1 });
        assert_eq!(rotations.load(Ordering::SeqCst), 1);

        processor.on_drag_begin();
        viewport.lock().unwrap().set_content_offset(Point::new(5000.0, 0.0));
        processor.on_drag_end();
        assert_eq!(processor.offset().x, 732.0);
    }

    #[test]
    fn test_construction_clamps_viewport_offset() {
        let viewport = strip(-40.0);
        let processor =
            AutoscrollProcessor::new(&viewport, scenario_config(ScrollDirection::Forward)).unwrap();
        assert_eq!(processor.offset().x, 0.0);
    }

    #[test]
    fn test_rejects_speed_crossing_more_than_one_pitch() {
        let viewport = strip(100.0);
        let config = MotionConfig {
            speed: 1e20,
            ..scenario_config(ScrollDirection::Forward)
        };
        let result = AutoscrollProcessor::new(&viewport, config);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_motion_is_speed_times_delta() {
        let viewport = strip(100.0);
        let config = MotionConfig {
            speed: 2.0,
            ..scenario_config(ScrollDirection::Forward)
        };
        let mut processor = running(&viewport, config);

        for delta in [1.0, 0.5, 2.0] {
            processor.step(delta);
        }
        assert!((processor.offset().x - 93.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_receives_direction() {
        let viewport = strip(0.1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward))
            .on_rotate(move |direction| sink.lock().unwrap().push(direction));

        processor.step(1.0);
        assert_eq!(*seen.lock().unwrap(), vec![ScrollDirection::Forward]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_pushes_back_idle_resume() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));

        processor.pause();
        let first = Instant::now();
        assert!(processor.is_paused());
        assert_eq!(
            processor.idle_resume_deadline(),
            Some(first + Duration::from_secs(5))
        );

        tokio::time::advance(Duration::from_secs(3)).await;
        processor.pause();
        let second = Instant::now();
        assert_eq!(
            processor.idle_resume_deadline(),
            Some(second + Duration::from_secs(5))
        );

        processor.poll_timers(first + Duration::from_secs(5));
        assert!(processor.is_paused());

        processor.poll_timers(second + Duration::from_secs(5));
        assert!(!processor.is_paused());
    }

    #[test]
    fn test_explicit_time_pause_and_resume() {
        let viewport = strip(100.0);
        let start = Instant::now();
        let config = scenario_config(ScrollDirection::Forward);
        let mut processor = AutoscrollProcessor::starting_at(&viewport, config, start).unwrap();

        processor.resume_at(start);
        assert_eq!(processor.idle_resume_deadline(), Some(start));

        let paused_at = start + Duration::from_secs(2);
        processor.pause_at(paused_at);
        assert!(processor.is_paused());
        assert_eq!(
            processor.idle_resume_deadline(),
            Some(paused_at + Duration::from_secs(5))
        );

        processor.poll_timers(paused_at + Duration::from_millis(4990));
        assert!(processor.is_paused());
        processor.poll_timers(paused_at + Duration::from_secs(5));
        assert!(!processor.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_disables_auto_resume() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));

        processor.stop();
        assert!(processor.is_stopped());
        assert_eq!(processor.idle_resume_deadline(), None);

        processor.poll_timers(Instant::now() + Duration::from_secs(60));
        assert!(processor.is_paused());
        assert_eq!(processor.step(1.0), TickOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_then_resume_restarts_idle_schedule() {
        let viewport = strip(100.0);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward))
            .on_select(move |index| sink.lock().unwrap().push(index));

        processor.handle_event(ViewportEvent::ItemSelected(3));
        assert_eq!(*selected.lock().unwrap(), vec![3]);
        assert!(processor.is_stopped());

        tokio::time::advance(Duration::from_secs(20)).await;
        processor.resume();
        let now = Instant::now();
        assert!(!processor.is_paused());
        assert!(!processor.is_stopped());
        assert_eq!(processor.idle_resume_deadline(), Some(now));

        processor.poll_timers(now);
        assert_eq!(
            processor.idle_resume_deadline(),
            Some(now + Duration::from_secs(5))
        );
    }

    #[test]
    fn test_drag_begin_snaps_viewport_to_tracked_offset() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));
        processor.step(4.0);

        viewport.lock().unwrap().set_content_offset(Point::new(250.0, 0.0));
        processor.handle_event(ViewportEvent::DragBegan);

        assert!(processor.is_paused());
        assert_eq!(viewport.lock().unwrap().content_offset().x, 99.0);
    }

    #[test]
    fn test_drag_end_adopts_viewport_offset() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));

        processor.handle_event(ViewportEvent::DragBegan);
        viewport.lock().unwrap().set_content_offset(Point::new(37.0, 0.0));
        processor.handle_event(ViewportEvent::DragEnded);

        assert!(processor.is_paused());
        assert!(!processor.is_stopped());
        assert_eq!(processor.offset().x, 37.0);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 37.0);
    }

    #[test]
    fn test_drag_without_motion_keeps_offset() {
        let viewport = strip(55.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));

        processor.on_drag_begin();
        processor.on_drag_end();

        assert!(processor.is_paused());
        assert_eq!(processor.offset().x, 55.0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let viewport = strip(0.1);
        let (rotations, on_rotate) = counter();
        let mut processor =
            running(&viewport, scenario_config(ScrollDirection::Forward)).on_rotate(on_rotate);

        processor.destroy();
        processor.destroy();

        assert!(processor.is_destroyed());
        assert_eq!(processor.next_deadline(), None);
        processor.resume();
        assert_eq!(processor.step(1.0), TickOutcome::Skipped);
        assert_eq!(
            processor.poll_timers(Instant::now() + Duration::from_secs(60)),
            TickOutcome::Skipped
        );
        processor.on_item_selected(1);
        assert_eq!(rotations.load(Ordering::SeqCst), 0);
        assert_eq!(viewport.lock().unwrap().content_offset().x, 0.1);
    }

    #[test]
    fn test_released_viewport_is_silently_skipped() {
        let viewport = strip(100.0);
        let mut processor = running(&viewport, scenario_config(ScrollDirection::Forward));
        drop(viewport);

        assert_eq!(processor.step(1.0), TickOutcome::Skipped);
        processor.on_drag_begin();
        processor.on_drag_end();
        assert_eq!(processor.offset().x, 100.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let viewport = strip(0.0);
        let config = MotionConfig {
            speed: 0.0,
            ..Default::default()
        };
        let result = AutoscrollProcessor::new(&viewport, config);
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
