//! Error taxonomy for the browser-facing edges of the views.

use thiserror::Error;

/// Failures surfaced by snapshot decoding and browser glue.
///
/// The layout, stacking and hit-testing code never fails; degenerate inputs
/// are floored instead.
#[derive(Debug, Error)]
pub enum VizError {
	/// A snapshot payload was not valid JSON for its contract.
	#[error("invalid snapshot payload: {0}")]
	Decode(#[from] serde_json::Error),
	/// The canvas refused to hand out a 2D context.
	#[error("canvas 2d context unavailable")]
	CanvasContext,
	/// The platform rejected a fullscreen request.
	#[error("fullscreen request rejected: {0}")]
	Fullscreen(String),
}
