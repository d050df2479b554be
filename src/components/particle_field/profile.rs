//! Device capability classification.
//!
//! A [`CapabilityProfile`] bundles how much CPU, GPU and battery the background
//! may spend. It is derived from the viewport and the device's input signals,
//! and only changes when the viewport crosses the constrained/unconstrained
//! boundary or the particle budget for its area changes.

use super::config::FieldConfig;

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	/// Build a viewport, treating non-finite or negative sides as empty.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width: clean_dimension(width),
			height: clean_dimension(height),
		}
	}
}

fn clean_dimension(value: f64) -> f64 {
	if value.is_finite() && value > 0.0 {
		value
	} else {
		0.0
	}
}

/// Input capabilities reported by feature detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceSignal {
	/// The device reports at least one touch point.
	pub touch_capable: bool,
	/// The primary pointer is coarse (finger rather than mouse).
	pub coarse_pointer: bool,
}

/// Whether a device/viewport pair is treated as constrained.
pub fn is_touch_or_small(viewport: Viewport, device: DeviceSignal, breakpoint_width: f64) -> bool {
	device.touch_capable || device.coarse_pointer || viewport.width < breakpoint_width
}

/// Derived rendering budget. Immutable once computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapabilityProfile {
	pub is_constrained: bool,
	pub target_fps: u32,
	/// Fraction of the CSS-pixel viewport used for the backing surface, in (0, 1].
	pub render_scale: f64,
	pub particle_count: usize,
	pub connections_enabled: bool,
	pub pointer_interaction_enabled: bool,
}

impl CapabilityProfile {
	/// Minimum time between accepted frames.
	pub fn frame_interval_ms(&self) -> f64 {
		1000.0 / self.target_fps.max(1) as f64
	}

	/// Backing surface dimensions for a viewport at this profile's scale.
	pub fn surface_size(&self, viewport: Viewport) -> (u32, u32) {
		let viewport = Viewport::new(viewport.width, viewport.height);
		(
			(viewport.width * self.render_scale).floor() as u32,
			(viewport.height * self.render_scale).floor() as u32,
		)
	}
}

/// Classify a viewport and derive its rendering budget.
///
/// Constrained devices get a discrete drop in frame rate and surface scale, a
/// smaller particle cap, and neither connection lines nor pointer repulsion.
pub fn compute_profile(
	viewport_width: f64,
	viewport_height: f64,
	is_touch_or_small: bool,
	config: &FieldConfig,
) -> CapabilityProfile {
	let viewport = Viewport::new(viewport_width, viewport_height);
	let constrained = is_touch_or_small;

	let (target_fps, render_scale, cap) = if constrained {
		(
			config.target_fps_constrained,
			config.render_scale_constrained,
			config.max_particles_constrained,
		)
	} else {
		(config.target_fps_unconstrained, 1.0, config.max_particles_unconstrained)
	};
	let render_scale = if render_scale.is_finite() && render_scale > 0.0 {
		render_scale.min(1.0)
	} else {
		1.0
	};

	let area = viewport.width * viewport.height * render_scale * render_scale;
	let budget = if config.density_divisor.is_finite() && config.density_divisor > 0.0 {
		(area / config.density_divisor).floor().max(0.0)
	} else {
		0.0
	};

	CapabilityProfile {
		is_constrained: constrained,
		target_fps: target_fps.max(1),
		render_scale,
		particle_count: (budget as usize).min(cap),
		connections_enabled: !constrained && config.connections,
		pointer_interaction_enabled: !constrained && config.pointer_interaction,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn desktop_gets_full_budget() {
		let config = FieldConfig::default();
		let profile = compute_profile(1920.0, 1080.0, false, &config);

		assert!(!profile.is_constrained);
		assert_eq!(profile.target_fps, 60);
		assert_eq!(profile.render_scale, 1.0);
		assert_eq!(profile.particle_count, 150);
		assert!(profile.connections_enabled);
		assert!(profile.pointer_interaction_enabled);
	}

	#[test]
	fn density_limits_count_below_cap() {
		let config = FieldConfig::default();
		// 800 * 600 / 4000 = 120
		let profile = compute_profile(800.0, 600.0, false, &config);
		assert_eq!(profile.particle_count, 120);
	}

	#[test]
	fn constrained_profile_cuts_everything() {
		let config = FieldConfig::default();
		let profile = compute_profile(390.0, 844.0, true, &config);

		assert!(profile.is_constrained);
		assert_eq!(profile.target_fps, 18);
		assert_eq!(profile.render_scale, 0.5);
		// 390 * 844 * 0.25 / 4000 = 20.57 -> 20, cap 20
		assert_eq!(profile.particle_count, 20);
		assert!(!profile.connections_enabled);
		assert!(!profile.pointer_interaction_enabled);
	}

	#[test]
	fn toggles_apply_only_when_unconstrained() {
		let config = FieldConfig {
			connections: false,
			..FieldConfig::default()
		};
		let profile = compute_profile(1280.0, 800.0, false, &config);
		assert!(!profile.connections_enabled);
		assert!(profile.pointer_interaction_enabled);
	}

	#[test]
	fn degenerate_viewports_yield_empty_field() {
		let config = FieldConfig::default();
		for (w, h) in [(0.0, 0.0), (1024.0, 0.0), (-5.0, 300.0), (f64::NAN, 300.0)] {
			assert_eq!(compute_profile(w, h, false, &config).particle_count, 0);
		}
	}

	#[test]
	fn small_or_touch_is_constrained() {
		let desktop = DeviceSignal::default();
		let touch = DeviceSignal {
			touch_capable: true,
			coarse_pointer: false,
		};
		assert!(!is_touch_or_small(Viewport::new(1280.0, 800.0), desktop, 768.0));
		assert!(is_touch_or_small(Viewport::new(700.0, 800.0), desktop, 768.0));
		assert!(is_touch_or_small(Viewport::new(1280.0, 800.0), touch, 768.0));
	}

	#[test]
	fn surface_size_scales_and_floors() {
		let config = FieldConfig::default();
		let profile = compute_profile(391.0, 845.0, true, &config);
		assert_eq!(profile.surface_size(Viewport::new(391.0, 845.0)), (195, 422));
		assert!((profile.frame_interval_ms() - 1000.0 / 18.0).abs() < 1e-9);
	}
}
