//! Drawing for the particle field.
//!
//! Each frame is drawn in three passes:
//! 1. Opaque background fill
//! 2. Connection lines between nearby particles (when enabled)
//! 3. Particles as filled circles
//!
//! Drawing goes through the [`Surface`] trait so the passes can run against
//! a canvas context in the browser and a recorder in tests.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::{Particle, ParticleField};
use super::theme::{Color, Palette, Theme};

/// The drawing operations the field needs.
pub trait Surface {
	fn fill_background(&mut self, color: Color, width: f64, height: f64);
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64);
	fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color);
}

impl Surface for CanvasRenderingContext2d {
	fn fill_background(&mut self, color: Color, width: f64, height: f64) {
		self.set_fill_style_str(&color.to_css());
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, PI * 2.0);
		self.fill();
	}
}

/// Opacity of a connection line at distance `d`. Zero at or beyond `max`.
pub fn connection_opacity(d: f64, max: f64) -> f64 {
	if max <= 0.0 || d >= max {
		return 0.0;
	}
	(1.0 - d / max).clamp(0.0, 1.0)
}

/// Renders the complete field to the surface.
pub fn render<S: Surface + ?Sized>(field: &ParticleField, surface: &mut S, theme: &Theme) {
	surface.fill_background(theme.background, field.width(), field.height());

	if field.connections_enabled() {
		draw_connections(field, surface, theme);
	}

	for p in field.particles() {
		draw_particle(surface, p, &theme.palette);
	}
}

fn draw_connections<S: Surface + ?Sized>(field: &ParticleField, surface: &mut S, theme: &Theme) {
	let max = field.connection_distance();
	if max <= 0.0 {
		return;
	}
	let line_width = field.connection_width();
	let particles = field.particles();

	for (i, a) in particles.iter().enumerate() {
		for b in &particles[i + 1..] {
			let (dx, dy) = (a.x - b.x, a.y - b.y);
			// Cheap reject before the square root.
			if dx.abs() >= max || dy.abs() >= max {
				continue;
			}
			let opacity = connection_opacity((dx * dx + dy * dy).sqrt(), max);
			if opacity <= 0.0 {
				continue;
			}
			let color = theme
				.connection
				.with_alpha((theme.connection.a * opacity).clamp(0.0, 1.0));
			surface.stroke_line((a.x, a.y), (b.x, b.y), color, line_width);
		}
	}
}

/// Draw one particle as a filled circle in its palette color.
pub fn draw_particle<S: Surface + ?Sized>(surface: &mut S, particle: &Particle, palette: &Palette) {
	if particle.radius <= 0.0 {
		return;
	}
	surface.fill_circle((particle.x, particle.y), particle.radius, palette.get(particle.color));
}
