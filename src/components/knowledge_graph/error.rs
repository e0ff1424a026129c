use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures inside the graph view. None of these are fatal: callers log
/// them and carry on with an empty or unchanged surface.
#[derive(Debug, Error)]
pub enum GraphError {
	#[error("browser window is not available")]
	NoWindow,
	#[error("canvas 2d context is not available")]
	NoContext,
	#[error("failed to parse graph snapshot: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("fullscreen request failed: {0}")]
	Fullscreen(String),
}

impl GraphError {
	pub fn fullscreen(err: JsValue) -> Self {
		GraphError::Fullscreen(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
	}
}
