//! Browser side of the render loop.
//!
//! [`BrowserHost`] implements [`FrameHost`] with `requestAnimationFrame` and
//! DOM event listeners. Its callbacks hold a `Weak` reference to the loop, so
//! dropping the loop after [`RenderLoop::stop`] releases everything.

use std::cell::RefCell;
use std::rc::Weak;

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, ContextAttributes2d, Document, HtmlCanvasElement, MouseEvent, Window,
};

use super::error::BackgroundError;
use super::profile::{DeviceSignal, Viewport};
use super::scheduler::{FrameHandle, FrameHost, RenderLoop};

/// The render loop as mounted in a page.
pub type BrowserLoop = RenderLoop<BrowserHost, CanvasRenderingContext2d>;

/// Current viewport size in CSS pixels. Missing values read as zero.
pub fn viewport(window: &Window) -> Viewport {
	let read = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	Viewport::new(read(window.inner_width()), read(window.inner_height()))
}

/// Feature-detect touch support and a coarse primary pointer.
pub fn detect_device(window: &Window) -> DeviceSignal {
	let coarse_pointer = window
		.match_media("(pointer: coarse)")
		.ok()
		.flatten()
		.is_some_and(|query| query.matches());

	DeviceSignal {
		touch_capable: window.navigator().max_touch_points() > 0,
		coarse_pointer,
	}
}

/// Host clock in milliseconds, on the same timeline as frame timestamps.
pub fn now(window: &Window) -> f64 {
	window
		.performance()
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

/// Acquire an opaque 2d context for the canvas.
pub fn acquire_surface(
	canvas: &HtmlCanvasElement,
) -> Result<CanvasRenderingContext2d, BackgroundError> {
	let options = ContextAttributes2d::new();
	options.set_alpha(false);

	canvas
		.get_context_with_context_options("2d", &options)
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		.ok_or(BackgroundError::ContextUnavailable)
}

/// `requestAnimationFrame`/listener plumbing for one mounted background.
pub struct BrowserHost {
	window: Window,
	document: Option<Document>,
	canvas: HtmlCanvasElement,
	on_frame: Closure<dyn FnMut(f64)>,
	on_resize: Closure<dyn FnMut()>,
	on_visibility: Closure<dyn FnMut()>,
	on_pointer_move: Closure<dyn FnMut(MouseEvent)>,
	on_pointer_out: Closure<dyn FnMut(MouseEvent)>,
	pointer_tracked: bool,
	viewport_tracked: bool,
}

impl BrowserHost {
	/// Wire callbacks that forward browser events to `target`.
	pub fn new(window: Window, canvas: HtmlCanvasElement, target: Weak<RefCell<BrowserLoop>>) -> Self {
		let frame_target = target.clone();
		let on_frame = Closure::new(move |timestamp: f64| {
			if let Some(render_loop) = frame_target.upgrade() {
				render_loop.borrow_mut().on_frame(timestamp);
			}
		});

		let (resize_target, resize_window) = (target.clone(), window.clone());
		let on_resize = Closure::new(move || {
			if let Some(render_loop) = resize_target.upgrade() {
				render_loop.borrow_mut().on_resize(
					now(&resize_window),
					viewport(&resize_window),
					detect_device(&resize_window),
				);
			}
		});

		let (visibility_target, visibility_document) = (target.clone(), window.document());
		let on_visibility = Closure::new(move || {
			let (Some(render_loop), Some(document)) =
				(visibility_target.upgrade(), visibility_document.as_ref())
			else {
				return;
			};
			if document.hidden() {
				render_loop.borrow_mut().pause();
			} else {
				render_loop.borrow_mut().resume();
			}
		});

		let move_target = target.clone();
		let on_pointer_move = Closure::new(move |ev: MouseEvent| {
			if let Some(render_loop) = move_target.upgrade() {
				render_loop
					.borrow_mut()
					.pointer_moved(ev.client_x() as f64, ev.client_y() as f64);
			}
		});

		let on_pointer_out = Closure::new(move |ev: MouseEvent| {
			// Only leaving the window counts, not moving between elements.
			if ev.related_target().is_some() {
				return;
			}
			if let Some(render_loop) = target.upgrade() {
				render_loop.borrow_mut().pointer_left();
			}
		});

		Self {
			document: window.document(),
			window,
			canvas,
			on_frame,
			on_resize,
			on_visibility,
			on_pointer_move,
			on_pointer_out,
			pointer_tracked: false,
			viewport_tracked: false,
		}
	}
}

impl FrameHost for BrowserHost {
	fn request_frame(&mut self) -> Option<FrameHandle> {
		self.window
			.request_animation_frame(self.on_frame.as_ref().unchecked_ref())
			.ok()
	}

	fn cancel_frame(&mut self, handle: FrameHandle) {
		let _ = self.window.cancel_animation_frame(handle);
	}

	fn set_pointer_tracking(&mut self, enabled: bool) {
		if enabled == self.pointer_tracked {
			return;
		}
		let listeners: [(&str, &js_sys::Function); 2] = [
			("mousemove", self.on_pointer_move.as_ref().unchecked_ref()),
			("mouseout", self.on_pointer_out.as_ref().unchecked_ref()),
		];
		for (event, callback) in listeners {
			let result = if enabled {
				self.window.add_event_listener_with_callback(event, callback)
			} else {
				self.window.remove_event_listener_with_callback(event, callback)
			};
			if result.is_err() {
				warn!("ambient-field: could not update {event} listener");
			}
		}
		self.pointer_tracked = enabled;
	}

	fn set_viewport_tracking(&mut self, enabled: bool) {
		if enabled == self.viewport_tracked {
			return;
		}
		let resize: &js_sys::Function = self.on_resize.as_ref().unchecked_ref();
		let visibility: &js_sys::Function = self.on_visibility.as_ref().unchecked_ref();

		for event in ["resize", "orientationchange"] {
			let _ = if enabled {
				self.window.add_event_listener_with_callback(event, resize)
			} else {
				self.window.remove_event_listener_with_callback(event, resize)
			};
		}
		if let Some(document) = &self.document {
			let _ = if enabled {
				document.add_event_listener_with_callback("visibilitychange", visibility)
			} else {
				document.remove_event_listener_with_callback("visibilitychange", visibility)
			};
		}
		self.viewport_tracked = enabled;
	}

	fn resize_surface(&mut self, width: u32, height: u32) {
		self.canvas.set_width(width);
		self.canvas.set_height(height);
	}
}
