//! ambient-field: adaptive particle background for a portfolio landing page.
//!
//! This crate provides a WASM canvas component that renders a drifting
//! particle field behind page content, tuned to the device's capabilities.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::particle_field::{BackgroundError, FieldConfig, ParticleBackground};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("ambient-field: logging initialized");
}

/// Load configuration overrides from a script element with id="particle-config".
/// Expected format: JSON object with camelCase option names, all optional.
fn load_config() -> Option<FieldConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("particle-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match FieldConfig::from_json(&json_text) {
		Ok(config) => {
			info!("ambient-field: loaded configuration overrides");
			Some(config)
		}
		Err(e) => {
			warn!("ambient-field: {}", e);
			None
		}
	}
}

/// Main application component.
/// Mounts the background behind an (externally supplied) page shell.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config().unwrap_or_default();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Portfolio" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleBackground config=config />
		<main class="page-content" style="position: relative; z-index: 1;"></main>
	}
}
