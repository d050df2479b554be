//! Test doubles for the host and the drawing surface.

use super::render::Surface;
use super::scheduler::{FrameHandle, FrameHost};
use super::theme::Color;

/// Records every host interaction instead of touching a browser.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MockHost {
	/// Total frame requests made.
	pub requested: usize,
	/// Total cancellations made.
	pub cancelled: usize,
	/// The one frame callback currently scheduled, if any. A request while one
	/// is live means the live one already fired.
	pub live: Option<FrameHandle>,
	next_handle: FrameHandle,
	pub pointer_tracked: bool,
	pub pointer_toggles: usize,
	pub viewport_tracked: bool,
	pub viewport_toggles: usize,
	pub surface_size: Option<(u32, u32)>,
}

impl MockHost {
	pub fn live_frames(&self) -> usize {
		usize::from(self.live.is_some())
	}
}

impl FrameHost for MockHost {
	fn request_frame(&mut self) -> Option<FrameHandle> {
		self.next_handle += 1;
		self.requested += 1;
		self.live = Some(self.next_handle);
		self.live
	}

	fn cancel_frame(&mut self, handle: FrameHandle) {
		self.cancelled += 1;
		if self.live == Some(handle) {
			self.live = None;
		}
	}

	fn set_pointer_tracking(&mut self, enabled: bool) {
		self.pointer_tracked = enabled;
		self.pointer_toggles += 1;
	}

	fn set_viewport_tracking(&mut self, enabled: bool) {
		self.viewport_tracked = enabled;
		self.viewport_toggles += 1;
	}

	fn resize_surface(&mut self, width: u32, height: u32) {
		self.surface_size = Some((width, height));
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
	Background {
		color: Color,
		width: f64,
		height: f64,
	},
	Line {
		from: (f64, f64),
		to: (f64, f64),
		color: Color,
		width: f64,
	},
	Circle {
		center: (f64, f64),
		radius: f64,
		color: Color,
	},
}

/// Keeps the draw calls it receives, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
	pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
	/// Colors of every line drawn.
	pub fn lines(&self) -> Vec<Color> {
		self.calls
			.iter()
			.filter_map(|call| match call {
				DrawCall::Line { color, .. } => Some(*color),
				_ => None,
			})
			.collect()
	}

	pub fn circles(&self) -> usize {
		self.calls
			.iter()
			.filter(|call| matches!(call, DrawCall::Circle { .. }))
			.count()
	}
}

impl Surface for RecordingSurface {
	fn fill_background(&mut self, color: Color, width: f64, height: f64) {
		self.calls.push(DrawCall::Background {
			color,
			width,
			height,
		});
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
		self.calls.push(DrawCall::Line {
			from,
			to,
			color,
			width,
		});
	}

	fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Color) {
		self.calls.push(DrawCall::Circle {
			center,
			radius,
			color,
		});
	}
}
