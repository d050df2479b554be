//! Ambient particle-field background.
//!
//! Renders a softly drifting field of particles on a full-viewport canvas
//! behind the page, with:
//! - A capability profile that scales particle count, frame rate and surface
//!   resolution to the device
//! - Optional connection lines between nearby particles
//! - Optional pointer repulsion
//! - Frame throttling on top of `requestAnimationFrame`
//! - Debounced rebuilds on resize and orientation changes
//!
//! # Example
//!
//! ```ignore
//! use ambient_field::{FieldConfig, ParticleBackground};
//!
//! let config = FieldConfig { connections: false, ..FieldConfig::default() };
//! view! { <ParticleBackground config=config /> }
//! ```

mod component;
pub mod config;
mod error;
mod host;
pub mod particles;
pub mod profile;
pub mod render;
pub mod scheduler;
pub mod theme;

#[cfg(test)]
mod testing;

pub use component::ParticleBackground;
pub use config::FieldConfig;
pub use error::BackgroundError;
pub use host::{BrowserHost, BrowserLoop};
pub use particles::{Particle, ParticleField};
pub use profile::{CapabilityProfile, DeviceSignal, Viewport, compute_profile};
pub use render::Surface;
pub use scheduler::{FrameHost, FrameOutcome, LoopState, RenderLoop};
pub use theme::{Color, Palette, Theme};
