//! Pointer handling for the graph view.
//!
//! The controller is the single owner of "what is highlighted": canvas hover,
//! legend hover and drags all go through it, and anything the host should
//! hear about is queued as a [`GraphEvent`].

use log::debug;

use super::hit_buffer::HitBuffer;
use super::state::GraphLayoutEngine;
use super::types::GraphEvent;
use crate::components::fullscreen::FullscreenState;

/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Zoom one wheel notch, keeping the world point under the pointer fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerMode {
	Idle,
	Hovering(String),
	Dragging {
		id: String,
		start: (f64, f64),
		moved: bool,
	},
	Panning {
		start: (f64, f64),
		origin: (f64, f64),
		moved: bool,
	},
}

/// Ids the renderer needs to style nodes and links.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Highlight<'a> {
	pub hovered: Option<&'a str>,
	pub selected: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct InteractionController {
	mode: PointerMode,
	selected: Option<String>,
	pub transform: ViewTransform,
	pub fullscreen: FullscreenState,
	events: Vec<GraphEvent>,
}

impl Default for InteractionController {
	fn default() -> Self {
		Self {
			mode: PointerMode::Idle,
			selected: None,
			transform: ViewTransform::default(),
			fullscreen: FullscreenState::default(),
			events: Vec::new(),
		}
	}
}

fn moved_past_slop(start: (f64, f64), x: f64, y: f64) -> bool {
	let (dx, dy) = (x - start.0, y - start.1);
	dx * dx + dy * dy > CLICK_SLOP * CLICK_SLOP
}

impl InteractionController {
	#[cfg(test)]
	pub fn mode(&self) -> &PointerMode {
		&self.mode
	}

	pub fn hovered(&self) -> Option<&str> {
		match &self.mode {
			PointerMode::Hovering(id) | PointerMode::Dragging { id, .. } => Some(id.as_str()),
			PointerMode::Idle | PointerMode::Panning { .. } => None,
		}
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn highlight(&self) -> Highlight<'_> {
		Highlight {
			hovered: self.hovered(),
			selected: self.selected(),
		}
	}

	pub fn drain_events(&mut self) -> Vec<GraphEvent> {
		std::mem::take(&mut self.events)
	}

	/// Forget hover and selection after the node set was replaced.
	pub fn reset(&mut self) {
		self.mode = PointerMode::Idle;
		self.selected = None;
	}

	pub fn pointer_down(&mut self, x: f64, y: f64, engine: &GraphLayoutEngine, hits: &HitBuffer) {
		let hit = hits
			.slot_at(x, y)
			.and_then(|slot| engine.nodes().get(slot))
			.map(|node| node.id.clone());
		self.mode = match hit {
			Some(id) => PointerMode::Dragging {
				id,
				start: (x, y),
				moved: false,
			},
			None => PointerMode::Panning {
				start: (x, y),
				origin: (self.transform.x, self.transform.y),
				moved: false,
			},
		};
	}

	pub fn pointer_move(
		&mut self,
		x: f64,
		y: f64,
		engine: &mut GraphLayoutEngine,
		hits: &HitBuffer,
	) {
		if matches!(self.mode, PointerMode::Idle | PointerMode::Hovering(_)) {
			let hovered = hits.slot_at(x, y);
			self.set_hover_slot(hovered, engine);
			return;
		}
		match &mut self.mode {
			PointerMode::Dragging { id, start, moved } => {
				*moved |= moved_past_slop(*start, x, y);
				if !*moved {
					return;
				}
				if let Some(slot) = engine.slot_of(id) {
					let (wx, wy) = self.transform.screen_to_world(x, y);
					engine.pin(slot, wx, wy);
				}
			}
			PointerMode::Panning {
				start,
				origin,
				moved,
			} => {
				*moved |= moved_past_slop(*start, x, y);
				self.transform.x = origin.0 + (x - start.0);
				self.transform.y = origin.1 + (y - start.1);
			}
			PointerMode::Idle | PointerMode::Hovering(_) => {}
		}
	}

	pub fn pointer_up(&mut self, engine: &mut GraphLayoutEngine) {
		match std::mem::replace(&mut self.mode, PointerMode::Idle) {
			PointerMode::Dragging { id, moved, .. } => {
				if let Some(slot) = engine.slot_of(&id) {
					if moved {
						engine.release(slot);
					} else {
						self.select(slot, engine);
					}
				}
				self.mode = PointerMode::Hovering(id);
			}
			PointerMode::Panning { moved, .. } => {
				if !moved && self.selected.take().is_some() {
					debug!("selection cleared");
				}
			}
			mode @ (PointerMode::Idle | PointerMode::Hovering(_)) => self.mode = mode,
		}
	}

	pub fn pointer_leave(&mut self, engine: &mut GraphLayoutEngine) {
		match std::mem::replace(&mut self.mode, PointerMode::Idle) {
			PointerMode::Dragging { id, moved, .. } => {
				if let (true, Some(slot)) = (moved, engine.slot_of(&id)) {
					engine.release(slot);
				}
				self.events.push(GraphEvent::HoverChanged(None));
			}
			PointerMode::Hovering(_) => self.events.push(GraphEvent::HoverChanged(None)),
			PointerMode::Idle | PointerMode::Panning { .. } => {}
		}
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.transform.zoom_at(x, y, delta_y);
	}

	/// Hover from the legend list; ignored while a drag or pan is in progress.
	pub fn legend_hover(&mut self, id: Option<&str>, engine: &GraphLayoutEngine) {
		let slot = id.and_then(|id| engine.slot_of(id));
		self.set_hover_slot(slot, engine);
	}

	pub fn legend_click(&mut self, id: &str, engine: &GraphLayoutEngine) {
		if let Some(slot) = engine.slot_of(id) {
			self.select(slot, engine);
		}
	}

	fn select(&mut self, slot: usize, engine: &GraphLayoutEngine) {
		let Some(node) = engine.nodes().get(slot) else {
			return;
		};
		self.selected = Some(node.id.clone());
		self.events.push(GraphEvent::NodeSelected(node.clone()));
	}

	fn set_hover_slot(&mut self, slot: Option<usize>, engine: &GraphLayoutEngine) {
		if matches!(
			self.mode,
			PointerMode::Dragging { .. } | PointerMode::Panning { .. }
		) {
			return;
		}
		let node = slot.and_then(|slot| engine.nodes().get(slot));
		if node.map(|n| n.id.as_str()) == self.hovered() {
			return;
		}
		self.mode = match node {
			Some(node) => PointerMode::Hovering(node.id.clone()),
			None => PointerMode::Idle,
		};
		self.events.push(GraphEvent::HoverChanged(node.cloned()));
	}
}
