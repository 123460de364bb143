use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use glam::DVec2;
use log::{debug, info};
use serde::Deserialize;

use super::forces::{self, Body, CenterForce, CollideForce, Force, LinkForce};
use super::types::{ActiveLink, ClusterGraphSnapshot, ClusterNode};

pub const MIN_NODE_RADIUS: f64 = 12.0;
pub const NODE_RADIUS_RANGE: f64 = 28.0;

/// Visual radius of a cluster, also the base of its collision radius.
pub fn node_radius(paper_count: u32, max_paper_count: u32) -> f64 {
	MIN_NODE_RADIUS + NODE_RADIUS_RANGE * paper_count as f64 / max_paper_count.max(1) as f64
}

/// Tuning for the graph layout. Every field has a default, so a partial JSON
/// object is enough to override a few of them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// N-body repulsion passed to the solver.
	pub charge: f32,
	/// Solver spring constant; link rest length is handled by `link_distance`.
	pub spring: f32,
	/// Cap on the solver force per node.
	pub max_force: f32,
	/// Solver velocity scale.
	pub node_speed: f32,
	/// Solver velocity damping per update.
	pub damping: f32,
	/// Mass of every node.
	pub mass: f32,
	/// Rest length of a link, in world units.
	pub link_distance: f64,
	/// How much of a link's length error is corrected per tick.
	pub link_strength: f64,
	/// Pull toward the viewport centre for linked nodes.
	pub center_strength: f64,
	/// Pull toward the viewport centre for nodes without links.
	pub isolated_center_strength: f64,
	/// Gap kept between node discs.
	pub collide_padding: f64,
	/// How much of an overlap is resolved per tick.
	pub collide_strength: f64,
	/// Fraction of alpha lost per tick.
	pub alpha_decay: f64,
	/// Alpha below which the layout stops.
	pub alpha_min: f64,
	/// Seconds after the last reheat before the layout stops.
	pub cooldown_secs: f64,
	/// Ticks run synchronously when a snapshot loads.
	pub warmup_ticks: usize,
	/// Timestep of each warm-up tick, in seconds.
	pub warmup_dt: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			charge: 150.0,
			// rest length comes from the link force instead
			spring: 0.0,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			mass: 10.0,
			link_distance: 180.0,
			link_strength: 0.1,
			center_strength: 0.02,
			isolated_center_strength: 0.15,
			collide_padding: 8.0,
			collide_strength: 0.7,
			alpha_decay: 0.01,
			alpha_min: 0.001,
			cooldown_secs: 5.0,
			warmup_ticks: 100,
			warmup_dt: 0.016,
		}
	}
}

impl LayoutConfig {
	fn solver_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.charge,
			force_spring: self.spring,
			force_max: self.max_force,
			node_speed: self.node_speed,
			damping_factor: self.damping,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub slot: usize,
}

/// Read-only view of one simulation state, handed to the renderer and the
/// hit tester. Positions are copied so a later tick cannot tear a paint.
#[derive(Clone, Debug)]
pub struct LayoutFrame<'a> {
	pub nodes: &'a [ClusterNode],
	pub links: &'a [ActiveLink],
	/// Empty until the first tick has run.
	pub positions: Vec<DVec2>,
	pub max_paper_count: u32,
	pub max_shared: u32,
}

pub struct GraphLayoutEngine {
	graph: ForceGraph<NodeInfo, ()>,
	handles: Vec<DefaultNodeIdx>,
	nodes: Vec<ClusterNode>,
	links: Vec<ActiveLink>,
	index: HashMap<String, usize>,
	bodies: Vec<Body>,
	forces: Vec<Box<dyn Force>>,
	config: LayoutConfig,
	pub width: f64,
	pub height: f64,
	alpha: f64,
	elapsed: f64,
	ticks: u64,
	running: bool,
	max_paper_count: u32,
	max_shared: u32,
}

impl GraphLayoutEngine {
	pub fn new(config: LayoutConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(config.solver_parameters()),
			handles: Vec::new(),
			nodes: Vec::new(),
			links: Vec::new(),
			index: HashMap::new(),
			bodies: Vec::new(),
			forces: Vec::new(),
			config,
			width,
			height,
			alpha: 0.0,
			elapsed: 0.0,
			ticks: 0,
			running: false,
			max_paper_count: 1,
			max_shared: 1,
		}
	}

	/// Replace the whole simulation with a new snapshot and warm it up.
	pub fn load(&mut self, snapshot: &ClusterGraphSnapshot) {
		let resolved = snapshot.resolve();
		let mut graph = ForceGraph::new(self.config.solver_parameters());
		let max_paper_count = resolved
			.nodes
			.iter()
			.map(|n| n.paper_count)
			.max()
			.unwrap_or(0)
			.max(1);
		let max_shared = resolved
			.links
			.iter()
			.map(|l| l.shared_count)
			.max()
			.unwrap_or(0)
			.max(1);

		let mut degree = vec![0usize; resolved.nodes.len()];
		for link in &resolved.links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}

		let center = self.center();
		let spread = 100f64.min(self.width.min(self.height) / 4.0);
		let count = resolved.nodes.len();
		let mut handles = Vec::with_capacity(count);
		let mut bodies = Vec::with_capacity(count);
		for (slot, node) in resolved.nodes.iter().enumerate() {
			let angle = slot as f64 * 2.0 * PI / count as f64;
			let pos = DVec2::new(
				center.x + spread * angle.cos(),
				center.y + spread * angle.sin(),
			);
			handles.push(graph.add_node(NodeData {
				x: pos.x as f32,
				y: pos.y as f32,
				mass: self.config.mass,
				is_anchor: false,
				user_data: NodeInfo { slot },
			}));
			bodies.push(Body {
				pos,
				radius: node_radius(node.paper_count, max_paper_count),
				degree: degree[slot],
				pinned: false,
			});
		}
		for link in &resolved.links {
			graph.add_edge(handles[link.source], handles[link.target], EdgeData::default());
		}

		self.graph = graph;
		self.handles = handles;
		self.bodies = bodies;
		self.nodes = resolved.nodes;
		self.links = resolved.links;
		self.index = resolved.index;
		self.max_paper_count = max_paper_count;
		self.max_shared = max_shared;
		self.ticks = 0;
		info!(
			"cluster graph loaded: {} nodes, {} links",
			self.nodes.len(),
			self.links.len()
		);

		self.apply_forces();
		if self.nodes.is_empty() {
			return;
		}
		for _ in 0..self.config.warmup_ticks {
			self.step(self.config.warmup_dt);
		}
		self.running = self.alpha >= self.config.alpha_min;
		debug!(
			"warm-up done after {} ticks, alpha {:.3}",
			self.ticks, self.alpha
		);
	}

	/// Rebuild the custom force pipeline for the current viewport and reheat.
	pub fn apply_forces(&mut self) {
		let links = self.links.iter().map(|l| (l.source, l.target)).collect();
		self.forces = vec![
			Box::new(LinkForce {
				links,
				distance: self.config.link_distance,
				strength: self.config.link_strength,
			}),
			Box::new(CollideForce {
				padding: self.config.collide_padding,
				strength: self.config.collide_strength,
			}),
			Box::new(CenterForce {
				center: self.center(),
				strength: self.config.center_strength,
				isolated_strength: self.config.isolated_center_strength,
			}),
		];
		self.reheat();
	}

	pub fn reheat(&mut self) {
		self.alpha = 1.0;
		self.elapsed = 0.0;
		self.running = !self.nodes.is_empty();
	}

	/// New viewport: re-center forces, keep positions.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.apply_forces();
	}

	/// Advance by one frame of `dt` seconds. Returns whether the layout is
	/// still moving.
	pub fn tick(&mut self, dt: f64) -> bool {
		if !self.running || self.nodes.is_empty() {
			return false;
		}
		self.step(dt);
		self.elapsed += dt;
		if self.alpha < self.config.alpha_min || self.elapsed >= self.config.cooldown_secs {
			self.running = false;
			debug!(
				"layout settled after {} ticks ({:.2}s, alpha {:.4})",
				self.ticks, self.elapsed, self.alpha
			);
		}
		self.running
	}

	fn step(&mut self, dt: f64) {
		let alpha = self.alpha;
		let displacement = forces::compose(&self.forces, &self.bodies);

		self.graph.update((dt * alpha) as f32);

		let (width, height, center) = (self.width, self.height, self.center());
		let bodies = &mut self.bodies;
		self.graph.visit_nodes_mut(|node| {
			let slot = node.data.user_data.slot;
			let Some(body) = bodies.get_mut(slot) else {
				return;
			};
			if node.data.is_anchor {
				body.pos = DVec2::new(node.data.x as f64, node.data.y as f64);
				return;
			}
			let mut pos =
				DVec2::new(node.data.x as f64, node.data.y as f64) + displacement[slot] * alpha;
			if !pos.x.is_finite() || !pos.y.is_finite() {
				pos = center;
			}
			let (mx, my) = (
				body.radius.min(width / 2.0),
				body.radius.min(height / 2.0),
			);
			pos.x = pos.x.clamp(mx, (width - mx).max(mx));
			pos.y = pos.y.clamp(my, (height - my).max(my));
			node.data.x = pos.x as f32;
			node.data.y = pos.y as f32;
			body.pos = pos;
		});

		self.alpha *= 1.0 - self.config.alpha_decay;
		self.ticks += 1;
	}

	/// Pin a node under the pointer, in world coordinates.
	pub fn pin(&mut self, slot: usize, x: f64, y: f64) {
		let Some(&handle) = self.handles.get(slot) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
		if let Some(body) = self.bodies.get_mut(slot) {
			body.pos = DVec2::new(x, y);
			body.pinned = true;
		}
		// keep neighbours reacting while dragging
		self.alpha = self.alpha.max(0.3);
		self.elapsed = 0.0;
		self.running = true;
	}

	/// Hand a pinned node back to the solver.
	pub fn release(&mut self, slot: usize) {
		let Some(&handle) = self.handles.get(slot) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.is_anchor = false;
			}
		});
		if let Some(body) = self.bodies.get_mut(slot) {
			body.pinned = false;
		}
	}

	pub fn frame(&self) -> LayoutFrame<'_> {
		LayoutFrame {
			nodes: &self.nodes,
			links: &self.links,
			positions: if self.ticks == 0 {
				Vec::new()
			} else {
				self.bodies.iter().map(|b| b.pos).collect()
			},
			max_paper_count: self.max_paper_count,
			max_shared: self.max_shared,
		}
	}

	#[cfg(test)]
	pub fn position(&self, slot: usize) -> Option<DVec2> {
		if self.ticks == 0 {
			return None;
		}
		self.bodies.get(slot).map(|b| b.pos)
	}

	pub fn slot_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn nodes(&self) -> &[ClusterNode] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn links(&self) -> &[ActiveLink] {
		&self.links
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	fn center(&self) -> DVec2 {
		DVec2::new(self.width / 2.0, self.height / 2.0)
	}
}
