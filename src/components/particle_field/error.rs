//! Failures that can occur while mounting the background.
//!
//! None of these reach the page: the component logs them and leaves an inert
//! canvas behind.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackgroundError {
	#[error("no browser window available")]
	NoWindow,

	#[error("2d drawing context unavailable")]
	ContextUnavailable,

	#[error("invalid particle configuration: {0}")]
	Config(#[from] serde_json::Error),
}
