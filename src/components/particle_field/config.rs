//! Tunable options for the particle background.
//!
//! Every option has a default, so a page can embed a partial JSON document
//! (camelCase keys) and only override what it cares about. Values read from
//! outside are passed through [`FieldConfig::sanitized`] before use.

use serde::Deserialize;

use super::error::BackgroundError;
use super::theme::{Palette, Theme};

/// Recognized configuration options.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
	/// Viewports narrower than this (CSS px) are treated as constrained.
	pub breakpoint_width: f64,
	pub max_particles_constrained: usize,
	pub max_particles_unconstrained: usize,
	pub target_fps_constrained: u32,
	pub target_fps_unconstrained: u32,
	/// Backing-surface scale used on constrained devices.
	pub render_scale_constrained: f64,
	/// Surface area (px²) per particle before the cap applies.
	pub density_divisor: f64,
	pub connection_distance: f64,
	pub connection_width: f64,
	pub pointer_interaction_radius: f64,
	/// Quiet period before a burst of resize events re-initializes the field.
	pub resize_debounce_ms: f64,
	/// Half-range of each velocity component, in surface units per tick.
	pub max_speed: f64,
	pub radius_min: f64,
	pub radius_span_constrained: f64,
	pub radius_span_unconstrained: f64,
	/// Range of the per-particle repulsion weight.
	pub weight_min: f64,
	pub weight_max: f64,
	/// Connection lines on unconstrained devices.
	pub connections: bool,
	/// Pointer repulsion on unconstrained devices.
	pub pointer_interaction: bool,
	pub theme: Theme,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			breakpoint_width: 768.0,
			max_particles_constrained: 20,
			max_particles_unconstrained: 150,
			target_fps_constrained: 18,
			target_fps_unconstrained: 60,
			render_scale_constrained: 0.5,
			density_divisor: 4000.0,
			connection_distance: 110.0,
			connection_width: 0.6,
			pointer_interaction_radius: 220.0,
			resize_debounce_ms: 300.0,
			max_speed: 0.05,
			radius_min: 0.1,
			radius_span_constrained: 0.4,
			radius_span_unconstrained: 1.2,
			weight_min: 1.0,
			weight_max: 3.0,
			connections: true,
			pointer_interaction: true,
			theme: Theme::default(),
		}
	}
}

/// Replace NaN/infinite/negative values with `fallback`.
fn non_negative(value: f64, fallback: f64) -> f64 {
	if value.is_finite() && value >= 0.0 {
		value
	} else {
		fallback
	}
}

impl FieldConfig {
	/// Parse a (possibly partial) JSON configuration and sanitize it.
	pub fn from_json(json: &str) -> Result<Self, BackgroundError> {
		let config: FieldConfig = serde_json::from_str(json)?;
		Ok(config.sanitized())
	}

	/// Clamp every option into the range the renderer can work with.
	pub fn sanitized(mut self) -> Self {
		let defaults = Self::default();

		self.breakpoint_width = non_negative(self.breakpoint_width, defaults.breakpoint_width);
		self.target_fps_constrained = self.target_fps_constrained.max(1);
		self.target_fps_unconstrained = self.target_fps_unconstrained.max(1);

		self.render_scale_constrained = if self.render_scale_constrained.is_finite()
			&& self.render_scale_constrained > 0.0
		{
			self.render_scale_constrained.min(1.0)
		} else {
			defaults.render_scale_constrained
		};

		self.density_divisor =
			if self.density_divisor.is_finite() && self.density_divisor > 0.0 {
				self.density_divisor
			} else {
				defaults.density_divisor
			};

		self.connection_distance =
			non_negative(self.connection_distance, defaults.connection_distance);
		self.connection_width = non_negative(self.connection_width, defaults.connection_width);
		self.pointer_interaction_radius = non_negative(
			self.pointer_interaction_radius,
			defaults.pointer_interaction_radius,
		);
		self.resize_debounce_ms = non_negative(self.resize_debounce_ms, defaults.resize_debounce_ms);
		self.max_speed = non_negative(self.max_speed, defaults.max_speed);
		self.radius_min = non_negative(self.radius_min, defaults.radius_min);
		self.radius_span_constrained =
			non_negative(self.radius_span_constrained, defaults.radius_span_constrained);
		self.radius_span_unconstrained = non_negative(
			self.radius_span_unconstrained,
			defaults.radius_span_unconstrained,
		);

		self.weight_min = non_negative(self.weight_min, defaults.weight_min);
		self.weight_max = non_negative(self.weight_max, defaults.weight_max);
		if self.weight_max < self.weight_min {
			std::mem::swap(&mut self.weight_min, &mut self.weight_max);
		}

		if self.theme.palette.is_empty() {
			self.theme.palette = Palette::ambient();
		}

		self
	}
}
