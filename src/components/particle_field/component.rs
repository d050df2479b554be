//! Leptos component mounting the particle background.
//!
//! The component renders a fixed, full-viewport canvas behind the page. Once
//! the canvas exists it acquires a 2d context, builds a [`BrowserLoop`] and
//! starts it; `on_cleanup` stops the loop so no frame callback or listener
//! outlives the component.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use send_wrapper::SendWrapper;
use web_sys::HtmlCanvasElement;

use super::config::FieldConfig;
use super::error::BackgroundError;
use super::host::{self, BrowserHost, BrowserLoop};
use super::scheduler::RenderLoop;

/// Decorative only: never intercepts input and sits under page content.
const CANVAS_STYLE: &str = "position: fixed; inset: 0; width: 100vw; height: 100vh; \
	display: block; pointer-events: none; z-index: 0;";

/// Build and start the loop for a mounted canvas.
fn mount(
	canvas: HtmlCanvasElement,
	config: FieldConfig,
) -> Result<Rc<RefCell<BrowserLoop>>, BackgroundError> {
	let window = web_sys::window().ok_or(BackgroundError::NoWindow)?;

	let surface = match host::acquire_surface(&canvas) {
		Ok(ctx) => Some(ctx),
		Err(e) => {
			warn!("ambient-field: {}", e);
			None
		}
	};

	let render_loop = Rc::new_cyclic(|weak| {
		RefCell::new(RenderLoop::new(
			BrowserHost::new(window.clone(), canvas, weak.clone()),
			surface,
			config,
			fastrand::Rng::new(),
		))
	});

	let started = render_loop
		.borrow_mut()
		.start(host::viewport(&window), host::detect_device(&window));
	if started {
		info!("ambient-field: background mounted");
	}
	Ok(render_loop)
}

/// Full-viewport animated particle background.
///
/// Place it once near the root of the page; content rendered after it stacks
/// above. Pass `config` to override any rendering option.
#[component]
pub fn ParticleBackground(#[prop(optional)] config: FieldConfig) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted: Rc<RefCell<Option<Rc<RefCell<BrowserLoop>>>>> = Rc::new(RefCell::new(None));
	let mounted_init = mounted.clone();
	let config = config.sanitized();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if mounted_init.borrow().is_some() {
			return;
		}
		match mount(canvas.into(), config.clone()) {
			Ok(render_loop) => *mounted_init.borrow_mut() = Some(render_loop),
			Err(e) => warn!("ambient-field: background not mounted: {}", e),
		}
	});

	let teardown = SendWrapper::new(mounted);
	on_cleanup(move || {
		if let Some(render_loop) = teardown.borrow_mut().take() {
			render_loop.borrow_mut().stop();
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-background"
			aria-hidden="true"
			style=CANVAS_STYLE
		/>
	}
}
