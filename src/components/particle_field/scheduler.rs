//! Frame pacing and lifecycle for the particle background.
//!
//! [`RenderLoop`] owns the particle field and the drawing surface, and talks to
//! the host environment only through [`FrameHost`]: it asks for animation
//! frames, registers and removes input listeners, and resizes the backing
//! surface. The browser implementation lives in `host.rs`.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//!                    \                         /
//!                     +-------- stop ---------+--> TornDown
//! ```
//!
//! The host's frame signal is uncapped (vsync rate). [`FrameThrottle`] turns
//! it into an effective fixed rate by skipping frames that arrive too early,
//! and [`ResizeDebouncer`] coalesces bursts of resize events into a single
//! field rebuild.

use fastrand::Rng;
use log::{debug, info, warn};

use super::config::FieldConfig;
use super::particles::ParticleField;
use super::profile::{CapabilityProfile, DeviceSignal, Viewport, compute_profile, is_touch_or_small};
use super::render::Surface;

/// Identifier returned by the host for a scheduled frame callback.
pub type FrameHandle = i32;

/// What the render loop needs from its environment.
pub trait FrameHost {
	/// Schedule the next frame callback. `None` when the host refused.
	fn request_frame(&mut self) -> Option<FrameHandle>;
	fn cancel_frame(&mut self, handle: FrameHandle);
	/// Register or remove the pointer-move listener.
	fn set_pointer_tracking(&mut self, enabled: bool);
	/// Register or remove resize, orientation and visibility listeners.
	fn set_viewport_tracking(&mut self, enabled: bool);
	/// Set the backing surface resolution.
	fn resize_surface(&mut self, width: u32, height: u32);
}

/// Timestamps closer than this to the frame interval still count as due.
const FRAME_TOLERANCE_MS: f64 = 0.5;

/// Caps an uncapped frame signal at a target rate.
#[derive(Clone, Debug)]
pub struct FrameThrottle {
	interval_ms: f64,
	last: Option<f64>,
}

impl FrameThrottle {
	pub fn new(target_fps: u32) -> Self {
		Self {
			interval_ms: 1000.0 / target_fps.max(1) as f64,
			last: None,
		}
	}

	pub fn interval_ms(&self) -> f64 {
		self.interval_ms
	}

	/// Decide whether the frame at `now` should do any work.
	///
	/// Accepted frames are re-based to the interval grid so the effective rate
	/// does not drift below the target.
	pub fn accept(&mut self, now: f64) -> bool {
		let Some(last) = self.last else {
			self.last = Some(now);
			return true;
		};

		let elapsed = now - last;
		if elapsed < 0.0 || !elapsed.is_finite() {
			self.last = Some(now);
			return true;
		}
		if elapsed < self.interval_ms - FRAME_TOLERANCE_MS {
			return false;
		}

		let remainder = elapsed % self.interval_ms;
		// Early-by-tolerance frames land just under a full interval.
		let remainder = if self.interval_ms - remainder <= FRAME_TOLERANCE_MS {
			0.0
		} else {
			remainder
		};
		self.last = Some(now - remainder);
		true
	}

	/// Forget the last accepted frame; the next one is accepted unconditionally.
	pub fn reset(&mut self) {
		self.last = None;
	}
}

/// Coalesces bursts of resize notifications.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
	delay_ms: f64,
	pending: Option<PendingResize>,
}

#[derive(Clone, Copy, Debug)]
struct PendingResize {
	due: f64,
	viewport: Viewport,
	device: DeviceSignal,
}

impl ResizeDebouncer {
	pub fn new(delay_ms: f64) -> Self {
		Self {
			delay_ms: delay_ms.max(0.0),
			pending: None,
		}
	}

	/// Record a resize; it replaces any pending one and restarts the quiet period.
	pub fn note(&mut self, now: f64, viewport: Viewport, device: DeviceSignal) {
		self.pending = Some(PendingResize {
			due: now + self.delay_ms,
			viewport,
			device,
		});
	}

	/// Take the pending resize once its quiet period has passed.
	pub fn poll(&mut self, now: f64) -> Option<(Viewport, DeviceSignal)> {
		match self.pending {
			Some(pending) if now >= pending.due => {
				self.pending = None;
				Some((pending.viewport, pending.device))
			}
			_ => None,
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	pub fn clear(&mut self) {
		self.pending = None;
	}
}

/// Last known pointer position in surface space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	pub position: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
	Idle,
	Running,
	Paused,
	TornDown,
}

/// Result of a single frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
	/// The loop is not running; nothing was rescheduled.
	Inactive,
	/// Too early for the target rate; rescheduled without work.
	Skipped,
	/// Ticked and drew the field.
	Rendered,
}

/// Drives the particle field from the host's frame signal.
pub struct RenderLoop<H: FrameHost, S: Surface> {
	host: H,
	surface: Option<S>,
	config: FieldConfig,
	profile: Option<CapabilityProfile>,
	field: ParticleField,
	throttle: FrameThrottle,
	resize: ResizeDebouncer,
	pointer: PointerState,
	pointer_tracked: bool,
	pending_frame: Option<FrameHandle>,
	state: LoopState,
	reinitializations: u64,
	rng: Rng,
}

impl<H: FrameHost, S: Surface> RenderLoop<H, S> {
	/// Build an idle loop. `surface` is `None` when no drawing context could be
	/// acquired, in which case [`start`](Self::start) does nothing.
	pub fn new(host: H, surface: Option<S>, config: FieldConfig, rng: Rng) -> Self {
		let config = config.sanitized();
		Self {
			host,
			surface,
			throttle: FrameThrottle::new(config.target_fps_unconstrained),
			resize: ResizeDebouncer::new(config.resize_debounce_ms),
			config,
			profile: None,
			field: ParticleField::empty(),
			pointer: PointerState::default(),
			pointer_tracked: false,
			pending_frame: None,
			state: LoopState::Idle,
			reinitializations: 0,
			rng,
		}
	}

	/// Build the field for `viewport` and begin requesting frames.
	///
	/// Returns whether the loop is now running.
	pub fn start(&mut self, viewport: Viewport, device: DeviceSignal) -> bool {
		if self.state != LoopState::Idle {
			return self.state == LoopState::Running;
		}
		if self.surface.is_none() {
			warn!("ambient-field: no drawing surface, background disabled");
			return false;
		}

		self.reinitialize(viewport, device);
		self.host.set_viewport_tracking(true);
		self.state = LoopState::Running;
		self.pending_frame = self.host.request_frame();
		if self.pending_frame.is_none() {
			warn!("ambient-field: host refused the first animation frame");
		}
		true
	}

	/// Handle one frame signal at host time `now` (milliseconds).
	pub fn on_frame(&mut self, now: f64) -> FrameOutcome {
		self.pending_frame = None;
		if self.state != LoopState::Running {
			return FrameOutcome::Inactive;
		}
		self.pending_frame = self.host.request_frame();

		if let Some((viewport, device)) = self.resize.poll(now) {
			self.reinitialize(viewport, device);
		}

		if !self.throttle.accept(now) {
			return FrameOutcome::Skipped;
		}

		let pointer = self.pointer.position;
		self.field.tick(pointer);
		if let Some(surface) = self.surface.as_mut() {
			self.field.draw(surface, &self.config.theme);
		}
		FrameOutcome::Rendered
	}

	/// Note a viewport change; the field is rebuilt once the burst settles.
	pub fn on_resize(&mut self, now: f64, viewport: Viewport, device: DeviceSignal) {
		if matches!(self.state, LoopState::Running | LoopState::Paused) {
			self.resize.note(now, viewport, device);
		}
	}

	/// Record a pointer position given in viewport (CSS pixel) coordinates.
	pub fn pointer_moved(&mut self, client_x: f64, client_y: f64) {
		if !self.pointer_tracked {
			return;
		}
		let scale = self.profile.map_or(1.0, |p| p.render_scale);
		self.pointer.position = Some((client_x * scale, client_y * scale));
	}

	pub fn pointer_left(&mut self) {
		self.pointer.position = None;
	}

	/// Stop requesting frames while keeping the field, e.g. for a hidden page.
	pub fn pause(&mut self) {
		if self.state != LoopState::Running {
			return;
		}
		self.cancel_pending_frame();
		self.state = LoopState::Paused;
		debug!("ambient-field: paused");
	}

	pub fn resume(&mut self) {
		if self.state != LoopState::Paused {
			return;
		}
		self.throttle.reset();
		self.state = LoopState::Running;
		self.pending_frame = self.host.request_frame();
		debug!("ambient-field: resumed");
	}

	/// Release the frame callback and every listener. Safe to call repeatedly.
	pub fn stop(&mut self) {
		if self.state == LoopState::TornDown {
			return;
		}
		let was_started = self.state != LoopState::Idle;

		self.cancel_pending_frame();
		if self.pointer_tracked {
			self.host.set_pointer_tracking(false);
			self.pointer_tracked = false;
		}
		if was_started {
			self.host.set_viewport_tracking(false);
		}
		self.resize.clear();
		self.pointer = PointerState::default();
		self.state = LoopState::TornDown;
		debug!("ambient-field: torn down");
	}

	fn cancel_pending_frame(&mut self) {
		if let Some(handle) = self.pending_frame.take() {
			self.host.cancel_frame(handle);
		}
	}

	/// Recompute the profile and replace the field wholesale.
	fn reinitialize(&mut self, viewport: Viewport, device: DeviceSignal) {
		let constrained = is_touch_or_small(viewport, device, self.config.breakpoint_width);
		let profile = compute_profile(viewport.width, viewport.height, constrained, &self.config);
		let (width, height) = profile.surface_size(viewport);

		self.host.resize_surface(width, height);
		self.field = ParticleField::initialize(
			&profile,
			&self.config,
			width as f64,
			height as f64,
			&mut self.rng,
		);

		if self.profile.map(|p| p.target_fps) != Some(profile.target_fps) {
			self.throttle = FrameThrottle::new(profile.target_fps);
		}

		if profile.pointer_interaction_enabled != self.pointer_tracked {
			self.host.set_pointer_tracking(profile.pointer_interaction_enabled);
			self.pointer_tracked = profile.pointer_interaction_enabled;
		}
		if !self.pointer_tracked {
			self.pointer = PointerState::default();
		} else if let (Some(old), Some((x, y))) = (self.profile, self.pointer.position) {
			let ratio = profile.render_scale / old.render_scale;
			self.pointer.position = Some((x * ratio, y * ratio));
		}

		self.profile = Some(profile);
		self.reinitializations += 1;
		info!(
			"ambient-field: {} particles on {}x{} surface ({} fps{})",
			profile.particle_count,
			width,
			height,
			profile.target_fps,
			if profile.is_constrained { ", constrained" } else { "" }
		);
	}

	pub fn state(&self) -> LoopState {
		self.state
	}

	/// Profile in effect; `None` before the first start.
	pub fn profile(&self) -> Option<CapabilityProfile> {
		self.profile
	}

	pub fn field(&self) -> &ParticleField {
		&self.field
	}

	pub fn field_mut(&mut self) -> &mut ParticleField {
		&mut self.field
	}

	pub fn pointer(&self) -> PointerState {
		self.pointer
	}

	/// Number of times the field has been built.
	pub fn reinitializations(&self) -> u64 {
		self.reinitializations
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn surface(&self) -> Option<&S> {
		self.surface.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::particle_field::particles::Particle;
	use crate::components::particle_field::testing::{MockHost, RecordingSurface};

	const DESKTOP: Viewport = Viewport {
		width: 1280.0,
		height: 800.0,
	};
	const PHONE: Viewport = Viewport {
		width: 390.0,
		height: 844.0,
	};
	const TOUCH: DeviceSignal = DeviceSignal {
		touch_capable: true,
		coarse_pointer: true,
	};
	const MOUSE: DeviceSignal = DeviceSignal {
		touch_capable: false,
		coarse_pointer: false,
	};

	fn new_loop() -> RenderLoop<MockHost, RecordingSurface> {
		RenderLoop::new(
			MockHost::default(),
			Some(RecordingSurface::default()),
			FieldConfig::default(),
			Rng::with_seed(42),
		)
	}

	/// Frame timestamps of a 60Hz display over one second.
	fn sixty_hz() -> impl Iterator<Item = f64> {
		(0..60).map(|i| i as f64 * 1000.0 / 60.0)
	}

	#[test]
	fn throttle_caps_sixty_hz_at_target() {
		for (fps, expected) in [(15, 15), (18, 18), (30, 30), (60, 60)] {
			let mut throttle = FrameThrottle::new(fps);
			let accepted = sixty_hz().filter(|&t| throttle.accept(t)).count();
			assert!(
				accepted.abs_diff(expected) <= 1,
				"{fps} fps accepted {accepted} frames"
			);
		}
	}

	#[test]
	fn throttle_rebases_after_backwards_clock() {
		let mut throttle = FrameThrottle::new(15);
		assert!(throttle.accept(1000.0));
		assert!(!throttle.accept(1010.0));
		assert!(throttle.accept(500.0));
		assert!(!throttle.accept(510.0));
	}

	#[test]
	fn loop_renders_about_target_fps() {
		let mut rl = new_loop();
		assert!(rl.start(PHONE, TOUCH));
		assert_eq!(rl.profile().map(|p| p.target_fps), Some(18));

		let rendered = sixty_hz()
			.filter(|&t| rl.on_frame(t) == FrameOutcome::Rendered)
			.count();
		assert!(rendered.abs_diff(18) <= 1, "rendered {rendered}");
		// Every frame, skipped or not, schedules the next one.
		assert_eq!(rl.host().requested, 61);
	}

	#[test]
	fn start_builds_field_and_registers_listeners() {
		let mut rl = new_loop();
		assert_eq!(rl.state(), LoopState::Idle);
		assert!(rl.start(DESKTOP, MOUSE));

		let profile = rl.profile().unwrap();
		assert_eq!(rl.state(), LoopState::Running);
		assert_eq!(rl.field().len(), profile.particle_count);
		assert_eq!(rl.host().surface_size, Some((1280, 800)));
		assert!(rl.host().viewport_tracked);
		assert!(rl.host().pointer_tracked);
		assert_eq!(rl.host().live_frames(), 1);
	}

	#[test]
	fn start_without_surface_is_a_no_op() {
		let mut rl: RenderLoop<MockHost, RecordingSurface> = RenderLoop::new(
			MockHost::default(),
			None,
			FieldConfig::default(),
			Rng::with_seed(1),
		);
		assert!(!rl.start(DESKTOP, MOUSE));
		assert_eq!(rl.state(), LoopState::Idle);
		assert_eq!(rl.host().requested, 0);
		assert!(!rl.host().viewport_tracked);
		assert_eq!(rl.on_frame(0.0), FrameOutcome::Inactive);

		rl.stop();
		assert_eq!(rl.state(), LoopState::TornDown);
		assert_eq!(rl.host().cancelled, 0);
	}

	#[test]
	fn stop_twice_matches_stop_once() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		rl.on_frame(0.0);

		rl.stop();
		let after_first = rl.host().clone();
		rl.stop();

		assert_eq!(rl.state(), LoopState::TornDown);
		assert_eq!(rl.host(), &after_first);
		assert_eq!(after_first.cancelled, 1);
		assert_eq!(after_first.live_frames(), 0);
		assert!(!after_first.pointer_tracked);
		assert!(!after_first.viewport_tracked);
		assert_eq!(after_first.pointer_toggles, 2);
		assert_eq!(after_first.viewport_toggles, 2);
	}

	#[test]
	fn no_callbacks_survive_teardown() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		for t in sixty_hz() {
			rl.on_frame(t);
		}
		rl.stop();
		assert_eq!(rl.host().live_frames(), 0);

		// A frame already in flight when stop ran must not reschedule.
		let requested = rl.host().requested;
		assert_eq!(rl.on_frame(2000.0), FrameOutcome::Inactive);
		assert_eq!(rl.host().requested, requested);
		assert_eq!(rl.host().live_frames(), 0);
	}

	#[test]
	fn constrained_profile_ignores_pointer() {
		let mut rl = new_loop();
		rl.start(PHONE, TOUCH);
		let profile = rl.profile().unwrap();
		assert!(!profile.pointer_interaction_enabled);
		assert!(!profile.connections_enabled);
		assert!(!rl.host().pointer_tracked);
		assert_eq!(rl.host().pointer_toggles, 0);

		rl.on_frame(0.0);
		let before: Vec<Particle> = rl.field().particles().to_vec();
		rl.pointer_moved(100.0, 100.0);
		assert_eq!(rl.pointer().position, None);

		rl.on_frame(100.0);
		let (w, h) = (rl.field().width(), rl.field().height());
		for (old, new) in before.iter().zip(rl.field().particles()) {
			let mut expected = old.clone();
			crate::components::particle_field::particles::update_particle(&mut expected, w, h, None);
			assert_eq!(&expected, new);
		}
	}

	#[test]
	fn unconstrained_pointer_is_scaled_and_repels() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		*rl.field_mut().particles_mut() = vec![Particle {
			x: 110.0,
			y: 100.0,
			vx: 0.0,
			vy: 0.0,
			radius: 1.0,
			color: 0,
			weight: 2.0,
		}];

		rl.pointer_moved(100.0, 100.0);
		assert_eq!(rl.pointer().position, Some((100.0, 100.0)));
		assert_eq!(rl.on_frame(0.0), FrameOutcome::Rendered);
		assert!(rl.field().particles()[0].x > 110.0);

		rl.pointer_left();
		assert_eq!(rl.pointer().position, None);
	}

	#[test]
	fn resize_burst_reinitializes_once_with_last_dimensions() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		assert_eq!(rl.reinitializations(), 1);

		for i in 0..10 {
			let width = 1000.0 + i as f64 * 10.0;
			rl.on_resize(i as f64 * 10.0, Viewport::new(width, 700.0), MOUSE);
		}

		let mut t = 0.0;
		while t <= 1000.0 {
			rl.on_frame(t);
			t += 1000.0 / 60.0;
		}

		assert_eq!(rl.reinitializations(), 2);
		assert_eq!(rl.host().surface_size, Some((1090, 700)));
		assert_eq!(rl.field().width(), 1090.0);
		assert_eq!(rl.field().len(), rl.profile().unwrap().particle_count);
	}

	#[test]
	fn resize_waits_for_quiet_period() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		rl.on_resize(0.0, Viewport::new(900.0, 600.0), MOUSE);

		rl.on_frame(100.0);
		assert_eq!(rl.reinitializations(), 1);
		rl.on_frame(299.0);
		assert_eq!(rl.reinitializations(), 1);
		rl.on_frame(300.0);
		assert_eq!(rl.reinitializations(), 2);
	}

	#[test]
	fn crossing_breakpoint_drops_pointer_listener() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		rl.pointer_moved(10.0, 10.0);
		assert!(rl.host().pointer_tracked);

		rl.on_resize(0.0, Viewport::new(600.0, 800.0), MOUSE);
		rl.on_frame(500.0);

		let profile = rl.profile().unwrap();
		assert!(profile.is_constrained);
		assert!(!rl.host().pointer_tracked);
		assert_eq!(rl.pointer().position, None);
		assert_eq!(rl.host().surface_size, Some((300, 400)));

		rl.on_resize(600.0, DESKTOP, MOUSE);
		rl.on_frame(1000.0);
		assert!(rl.host().pointer_tracked);
	}

	#[test]
	fn zero_viewport_renders_empty_field() {
		let mut rl = new_loop();
		assert!(rl.start(Viewport::new(0.0, 0.0), MOUSE));
		assert!(rl.field().is_empty());
		assert_eq!(rl.on_frame(0.0), FrameOutcome::Rendered);
		assert_eq!(rl.surface().unwrap().circles(), 0);

		rl.on_resize(10.0, DESKTOP, MOUSE);
		rl.on_frame(400.0);
		assert!(!rl.field().is_empty());
	}

	#[test]
	fn pause_and_resume() {
		let mut rl = new_loop();
		rl.start(DESKTOP, MOUSE);
		rl.on_frame(0.0);

		rl.pause();
		assert_eq!(rl.state(), LoopState::Paused);
		assert_eq!(rl.host().live_frames(), 0);
		assert_eq!(rl.on_frame(16.0), FrameOutcome::Inactive);

		rl.resume();
		assert_eq!(rl.state(), LoopState::Running);
		assert_eq!(rl.host().live_frames(), 1);
		// Throttle was re-based, so the first frame after resume draws.
		assert_eq!(rl.on_frame(5000.0), FrameOutcome::Rendered);

		rl.stop();
		rl.resume();
		assert_eq!(rl.state(), LoopState::TornDown);
		assert_eq!(rl.host().live_frames(), 0);
	}

	#[test]
	fn start_is_ignored_once_torn_down() {
		let mut rl = new_loop();
		rl.stop();
		assert!(!rl.start(DESKTOP, MOUSE));
		assert_eq!(rl.host().requested, 0);
	}
}
