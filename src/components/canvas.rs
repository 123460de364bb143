//! Paint command lists shared by both views.
//!
//! Renderers build a [`Scene`] from plain data and [`paint`] replays it onto a
//! 2D context, so everything except the final replay runs natively.

use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::VizError;

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	pub color: String,
	pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	Center,
	Right,
}

impl Align {
	fn as_str(self) -> &'static str {
		match self {
			Align::Center => "center",
			Align::Right => "right",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
	/// Fill the whole surface.
	Clear { color: String },
	/// Enter a pan/zoom transform; world coordinates until the matching pop.
	PushTransform { x: f64, y: f64, k: f64 },
	PopTransform,
	Line {
		from: (f64, f64),
		to: (f64, f64),
		stroke: Stroke,
		alpha: f64,
	},
	Circle {
		center: (f64, f64),
		radius: f64,
		fill: String,
		alpha: f64,
		stroke: Option<Stroke>,
	},
	/// Radial fade from `color` at `inner` to transparent at `outer`.
	Glow {
		center: (f64, f64),
		inner: f64,
		outer: f64,
		color: String,
	},
	Polygon {
		points: Vec<(f64, f64)>,
		fill: String,
		alpha: f64,
		stroke: Option<Stroke>,
	},
	Text {
		at: (f64, f64),
		text: String,
		color: String,
		font: String,
		align: Align,
	},
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub commands: Vec<DrawCmd>,
}

impl Scene {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			commands: Vec::new(),
		}
	}

	pub fn push(&mut self, cmd: DrawCmd) {
		self.commands.push(cmd);
	}

	/// All text drawn in the scene, in paint order.
	#[cfg(test)]
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.commands.iter().filter_map(|cmd| match cmd {
			DrawCmd::Text { text, .. } => Some(text.as_str()),
			_ => None,
		})
	}
}

/// Fetch the 2D context of a canvas element.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, VizError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		.ok_or(VizError::CanvasContext)
}

/// Replay a scene onto a canvas context.
pub fn paint(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for cmd in &scene.commands {
		match cmd {
			DrawCmd::Clear { color } => {
				ctx.set_fill_style_str(color);
				ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
			}
			DrawCmd::PushTransform { x, y, k } => {
				ctx.save();
				let _ = ctx.translate(*x, *y);
				let _ = ctx.scale(*k, *k);
			}
			DrawCmd::PopTransform => ctx.restore(),
			DrawCmd::Line {
				from,
				to,
				stroke,
				alpha,
			} => {
				ctx.set_global_alpha(*alpha);
				ctx.set_stroke_style_str(&stroke.color);
				ctx.set_line_width(stroke.width);
				ctx.begin_path();
				ctx.move_to(from.0, from.1);
				ctx.line_to(to.0, to.1);
				ctx.stroke();
				ctx.set_global_alpha(1.0);
			}
			DrawCmd::Circle {
				center,
				radius,
				fill,
				alpha,
				stroke,
			} => {
				ctx.set_global_alpha(*alpha);
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(fill);
				ctx.fill();
				ctx.set_global_alpha(1.0);
				if let Some(stroke) = stroke {
					ctx.set_stroke_style_str(&stroke.color);
					ctx.set_line_width(stroke.width);
					ctx.stroke();
				}
			}
			DrawCmd::Glow {
				center,
				inner,
				outer,
				color,
			} => {
				let Ok(gradient) =
					ctx.create_radial_gradient(center.0, center.1, *inner, center.0, center.1, *outer)
				else {
					continue;
				};
				let _ = gradient.add_color_stop(0.0, color);
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *outer, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
			DrawCmd::Polygon {
				points,
				fill,
				alpha,
				stroke,
			} => {
				let Some((first, rest)) = points.split_first() else {
					continue;
				};
				ctx.begin_path();
				ctx.move_to(first.0, first.1);
				for (x, y) in rest {
					ctx.line_to(*x, *y);
				}
				ctx.close_path();
				ctx.set_global_alpha(*alpha);
				ctx.set_fill_style_str(fill);
				ctx.fill();
				ctx.set_global_alpha(1.0);
				if let Some(stroke) = stroke {
					ctx.set_stroke_style_str(&stroke.color);
					ctx.set_line_width(stroke.width);
					ctx.stroke();
				}
			}
			DrawCmd::Text {
				at,
				text,
				color,
				font,
				align,
			} => {
				ctx.set_fill_style_str(color);
				ctx.set_font(font);
				ctx.set_text_align(align.as_str());
				let _ = ctx.fill_text(text, at.0, at.1);
			}
		}
	}
	ctx.set_text_align("left");
}
