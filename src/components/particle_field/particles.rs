//! Ambient particles and the field that owns them.
//!
//! Particles are plain records; [`update_particle`] applies the per-tick rule
//! (pointer repulsion, velocity integration, toroidal wrap) and
//! [`render::draw_particle`](super::render::draw_particle) draws one. The
//! field is rebuilt wholesale whenever the viewport or profile changes, so
//! particles are never removed individually.

use fastrand::Rng;

use super::config::FieldConfig;
use super::profile::CapabilityProfile;
use super::render::{self, Surface};
use super::theme::Theme;

/// A single floating particle, in surface-space coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub radius: f64,
	/// Index into the theme palette, fixed at creation.
	pub color: usize,
	/// How strongly the pointer pushes this particle.
	pub weight: f64,
}

/// Pointer repulsion parameters for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Repulsion {
	pub x: f64,
	pub y: f64,
	/// Interaction radius; no force at or beyond it.
	pub radius: f64,
	pub scale: f64,
}

impl Repulsion {
	/// Displacement pushing `p` directly away from the pointer.
	fn displacement(&self, p: &Particle) -> (f64, f64) {
		let (dx, dy) = (p.x - self.x, p.y - self.y);
		let distance = (dx * dx + dy * dy).sqrt();
		if self.radius <= 0.0 || distance <= 0.0 || distance >= self.radius {
			return (0.0, 0.0);
		}
		let ceiling = (p.weight * self.scale).max(0.0);
		let force = ((1.0 - distance / self.radius) * p.weight * self.scale).clamp(0.0, ceiling);
		(dx / distance * force, dy / distance * force)
	}
}

/// Wrap a coordinate into `[0, extent)`. An empty extent pins it to 0.
fn wrap(value: f64, extent: f64) -> f64 {
	if extent <= 0.0 || !value.is_finite() {
		return 0.0;
	}
	let wrapped = value.rem_euclid(extent);
	// rem_euclid can round up to `extent` for tiny negative inputs.
	if wrapped >= extent { 0.0 } else { wrapped }
}

/// Advance one particle by one tick inside a `width` x `height` surface.
pub fn update_particle(p: &mut Particle, width: f64, height: f64, repulsion: Option<&Repulsion>) {
	if let Some(repulsion) = repulsion {
		let (ox, oy) = repulsion.displacement(p);
		p.x += ox;
		p.y += oy;
	}

	p.x += p.vx;
	p.y += p.vy;

	p.x = wrap(p.x, width);
	p.y = wrap(p.y, height);
}

/// The particle collection plus the surface it lives on.
#[derive(Clone, Debug)]
pub struct ParticleField {
	particles: Vec<Particle>,
	width: f64,
	height: f64,
	render_scale: f64,
	connections_enabled: bool,
	connection_distance: f64,
	connection_width: f64,
	pointer_enabled: bool,
	pointer_radius: f64,
}

impl ParticleField {
	/// A field with no particles on an empty surface.
	pub fn empty() -> Self {
		Self {
			particles: Vec::new(),
			width: 0.0,
			height: 0.0,
			render_scale: 1.0,
			connections_enabled: false,
			connection_distance: 0.0,
			connection_width: 0.0,
			pointer_enabled: false,
			pointer_radius: 0.0,
		}
	}

	/// Populate a fresh field of exactly `profile.particle_count` particles.
	pub fn initialize(
		profile: &CapabilityProfile,
		config: &FieldConfig,
		width: f64,
		height: f64,
		rng: &mut Rng,
	) -> Self {
		let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
		let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
		let scale = profile.render_scale;
		let radius_span = if profile.is_constrained {
			config.radius_span_constrained
		} else {
			config.radius_span_unconstrained
		};
		let colors = config.theme.palette.len().max(1);

		let particles = (0..profile.particle_count)
			.map(|_| Particle {
				x: wrap(rng.f64() * width, width),
				y: wrap(rng.f64() * height, height),
				vx: (rng.f64() * 2.0 - 1.0) * config.max_speed * scale,
				vy: (rng.f64() * 2.0 - 1.0) * config.max_speed * scale,
				radius: (rng.f64() * radius_span + config.radius_min) * scale,
				color: rng.usize(0..colors),
				weight: config.weight_min + rng.f64() * (config.weight_max - config.weight_min),
			})
			.collect();

		Self {
			particles,
			width,
			height,
			render_scale: scale,
			connections_enabled: profile.connections_enabled,
			connection_distance: config.connection_distance * scale,
			connection_width: config.connection_width,
			pointer_enabled: profile.pointer_interaction_enabled,
			pointer_radius: config.pointer_interaction_radius * scale,
		}
	}

	/// Advance every particle by one tick, in index order.
	///
	/// `pointer` is ignored unless pointer interaction was enabled for this
	/// field's profile.
	pub fn tick(&mut self, pointer: Option<(f64, f64)>) {
		let repulsion = pointer
			.filter(|_| self.pointer_enabled)
			.map(|(x, y)| Repulsion {
				x,
				y,
				radius: self.pointer_radius,
				scale: self.render_scale,
			});

		for p in &mut self.particles {
			update_particle(p, self.width, self.height, repulsion.as_ref());
		}
	}

	/// Draw background, connections and particles.
	pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, theme: &Theme) {
		render::render(self, surface, theme);
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Mutable access for placing particles directly.
	pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
		&mut self.particles
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	pub fn connections_enabled(&self) -> bool {
		self.connections_enabled
	}

	/// Connection cut-off distance in surface units.
	pub fn connection_distance(&self) -> f64 {
		self.connection_distance
	}

	pub fn connection_width(&self) -> f64 {
		self.connection_width
	}
}
