//! Colors and palette for the particle field.
//!
//! Colors deserialize from `{ "r": .., "g": .., "b": .., "a": .. }` so a page
//! can swap the palette through its embedded configuration.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	#[serde(default = "opaque")]
	pub a: f64,
}

fn opaque() -> f64 {
	1.0
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// The fixed set of particle colors. Particles keep an index into it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Palette {
	pub colors: Vec<Color>,
}

impl Palette {
	/// Faint emerald, cyan and indigo.
	pub fn ambient() -> Self {
		Self {
			colors: vec![
				Color::rgba(16, 185, 129, 0.08), // Emerald
				Color::rgba(6, 182, 212, 0.08),  // Cyan
				Color::rgba(99, 102, 241, 0.08), // Indigo
			],
		}
	}

	pub fn len(&self) -> usize {
		self.colors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Color for a particle's token. Out-of-range tokens wrap.
	pub fn get(&self, index: usize) -> Color {
		if self.colors.is_empty() {
			return Color::rgba(0, 0, 0, 0.0);
		}
		self.colors[index % self.colors.len()]
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self::ambient()
	}
}

/// Complete visual theme.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Theme {
	/// Opaque fill painted under everything each frame.
	pub background: Color,
	/// Base color of connection lines; its alpha is the opacity at distance zero.
	pub connection: Color,
	pub palette: Palette,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(2, 6, 23),
			connection: Color::rgba(148, 163, 184, 0.12),
			palette: Palette::ambient(),
		}
	}
}
