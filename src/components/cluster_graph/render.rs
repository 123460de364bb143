use super::hit_buffer::HitBuffer;
use super::interaction::{Highlight, ViewTransform};
use super::state::{LayoutFrame, node_radius};
use crate::components::canvas::{Align, DrawCmd, Scene, Stroke};

pub const BACKGROUND: &str = "#1a1a2e";
pub const FALLBACK_COLOR: &str = "#9CA3AF";
/// Hit areas extend this far past the drawn disc, in world units.
pub const HIT_MARGIN: f64 = 6.0;
/// Below this zoom only emphasised nodes keep their label.
pub const LABEL_MIN_SCALE: f64 = 0.8;
pub const LABEL_BUDGET: usize = 20;

const EMPHASIS_SCALE: f64 = 1.4;
const DIMMED_SCALE: f64 = 0.75;

/// Contribution-taxonomy colors keyed by cluster slug.
const PALETTE: &[(&str, &str)] = &[
	("benchmark-evaluation", "#3B82F6"),
	("dataset-data-curation", "#10B981"),
	("architecture-model-design", "#8B5CF6"),
	("training-scaling-optimization", "#F59E0B"),
	("post-training-alignment", "#EC4899"),
	("reasoning-inference", "#6366F1"),
	("agents-tool-use", "#14B8A6"),
	("multimodal-learning", "#F97316"),
	("rag-retrieval-memory", "#06B6D4"),
	("safety-interpretability", "#EF4444"),
	("efficiency-systems", "#84CC16"),
	("generation-synthesis", "#A855F7"),
	("understanding-analysis", "#0EA5E9"),
	("domain-application", "#78716C"),
	("survey-tutorial", "#64748B"),
	("model-release-report", "#FFD21E"),
];

/// Palette colour for a cluster slug; unknown slugs get a neutral grey.
pub fn cluster_color(id: &str) -> &'static str {
	PALETTE
		.iter()
		.find(|(slug, _)| *slug == id)
		.map(|(_, color)| *color)
		.unwrap_or(FALLBACK_COLOR)
}

pub fn link_width(shared_count: u32, max_shared: u32) -> f64 {
	1.0 + 5.0 * shared_count as f64 / max_shared.max(1) as f64
}

/// Cut `name` to `budget` characters, ending in an ellipsis when shortened.
pub fn truncate_label(name: &str, budget: usize) -> String {
	if name.chars().count() <= budget {
		return name.to_string();
	}
	let kept: String = name.chars().take(budget.saturating_sub(1)).collect();
	format!("{}…", kept.trim_end())
}

fn is_emphasized(id: &str, highlight: &Highlight<'_>) -> bool {
	highlight.hovered == Some(id) || highlight.selected == Some(id)
}

/// Radius multiplier from hover/selection state.
pub fn display_scale(id: &str, highlight: &Highlight<'_>) -> f64 {
	if is_emphasized(id, highlight) {
		EMPHASIS_SCALE
	} else if highlight.hovered.is_some() {
		DIMMED_SCALE
	} else {
		1.0
	}
}

/// Slots in paint order: plain nodes first, emphasised ones on top.
fn paint_order(frame: &LayoutFrame<'_>, highlight: &Highlight<'_>) -> Vec<usize> {
	let (mut plain, mut top): (Vec<usize>, Vec<usize>) = (0..frame.positions.len())
		.partition(|&slot| !is_emphasized(&frame.nodes[slot].id, highlight));
	plain.append(&mut top);
	plain
}

fn radius_of(frame: &LayoutFrame<'_>, slot: usize, highlight: &Highlight<'_>) -> f64 {
	let node = &frame.nodes[slot];
	node_radius(node.paper_count, frame.max_paper_count) * display_scale(&node.id, highlight)
}

pub fn render(
	frame: &LayoutFrame<'_>,
	highlight: &Highlight<'_>,
	transform: &ViewTransform,
	width: f64,
	height: f64,
) -> Scene {
	let mut scene = Scene::new(width, height);
	scene.push(DrawCmd::Clear {
		color: BACKGROUND.into(),
	});
	if frame.positions.is_empty() {
		return scene;
	}

	let k = transform.k;
	scene.push(DrawCmd::PushTransform {
		x: transform.x,
		y: transform.y,
		k,
	});

	for link in frame.links {
		let (a, b) = (frame.positions[link.source], frame.positions[link.target]);
		let touches_hover = highlight.hovered.is_some_and(|id| {
			frame.nodes[link.source].id == id || frame.nodes[link.target].id == id
		});
		let mut width = link_width(link.shared_count, frame.max_shared);
		let alpha = match (highlight.hovered, touches_hover) {
			(_, true) => {
				width *= 2.0;
				0.8
			}
			(Some(_), false) => 0.15,
			(None, false) => 0.35,
		};
		scene.push(DrawCmd::Line {
			from: (a.x, a.y),
			to: (b.x, b.y),
			stroke: Stroke {
				color: "#94A3B8".into(),
				width,
			},
			alpha,
		});
	}

	let font = format!("{}px sans-serif", 12.0 / k.max(0.5));
	for slot in paint_order(frame, highlight) {
		let node = &frame.nodes[slot];
		let pos = frame.positions[slot];
		let radius = radius_of(frame, slot, highlight);
		let hovered = highlight.hovered == Some(node.id.as_str());
		let selected = highlight.selected == Some(node.id.as_str());

		if hovered {
			scene.push(DrawCmd::Glow {
				center: (pos.x, pos.y),
				inner: radius * 0.3,
				outer: radius * 1.8,
				color: "rgba(255, 255, 255, 0.35)".into(),
			});
		}
		let stroke = if selected {
			Some(Stroke {
				color: "#ffffff".into(),
				width: 3.0 / k,
			})
		} else if hovered {
			Some(Stroke {
				color: "rgba(255, 255, 255, 0.7)".into(),
				width: 1.5 / k,
			})
		} else {
			None
		};
		scene.push(DrawCmd::Circle {
			center: (pos.x, pos.y),
			radius,
			fill: cluster_color(&node.id).into(),
			alpha: if highlight.hovered.is_some() && !hovered && !selected {
				0.5
			} else {
				0.9
			},
			stroke,
		});

		if k > LABEL_MIN_SCALE || hovered || selected {
			scene.push(DrawCmd::Text {
				at: (pos.x, pos.y + radius + 14.0 / k),
				text: truncate_label(&node.name, LABEL_BUDGET),
				color: "white".into(),
				font: font.clone(),
				align: Align::Center,
			});
		}
	}

	scene.push(DrawCmd::PopTransform);
	scene
}

/// Rasterise pointer hit areas in screen space, in the same order nodes are
/// painted so the visually top-most node wins.
pub fn paint_hit_areas(
	frame: &LayoutFrame<'_>,
	highlight: &Highlight<'_>,
	transform: &ViewTransform,
	hits: &mut HitBuffer,
) {
	hits.clear();
	for slot in paint_order(frame, highlight) {
		let pos = frame.positions[slot];
		let (sx, sy) = transform.world_to_screen(pos.x, pos.y);
		let radius = (radius_of(frame, slot, highlight) + HIT_MARGIN) * transform.k;
		hits.fill_circle(sx, sy, radius, slot);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::DVec2;
	use crate::components::cluster_graph::types::{ActiveLink, ClusterNode};

	fn nodes() -> Vec<ClusterNode> {
		vec![
			ClusterNode {
				id: "agents-tool-use".into(),
				name: "Agents / Tool Use".into(),
				paper_count: 10,
				..Default::default()
			},
			ClusterNode {
				id: "mystery".into(),
				name: "A cluster with a remarkably long name".into(),
				paper_count: 5,
				..Default::default()
			},
		]
	}

	const LINKS: &[ActiveLink] = &[ActiveLink {
		source: 0,
		target: 1,
		shared_count: 3,
	}];

	fn frame(nodes: &[ClusterNode]) -> LayoutFrame<'_> {
		LayoutFrame {
			nodes,
			links: LINKS,
			positions: vec![DVec2::new(100.0, 100.0), DVec2::new(300.0, 100.0)],
			max_paper_count: 10,
			max_shared: 3,
		}
	}

	fn circles(scene: &Scene) -> Vec<(f64, String)> {
		scene
			.commands
			.iter()
			.filter_map(|cmd| match cmd {
				DrawCmd::Circle { radius, fill, .. } => Some((*radius, fill.clone())),
				_ => None,
			})
			.collect()
	}

	fn line_width(scene: &Scene) -> f64 {
		scene
			.commands
			.iter()
			.find_map(|cmd| match cmd {
				DrawCmd::Line { stroke, .. } => Some(stroke.width),
				_ => None,
			})
			.unwrap()
	}

	#[test]
	fn palette_and_fallback() {
		assert_eq!(cluster_color("agents-tool-use"), "#14B8A6");
		assert_eq!(cluster_color("mystery"), FALLBACK_COLOR);
	}

	#[test]
	fn label_truncation() {
		assert_eq!(truncate_label("Short", 20), "Short");
		let cut = truncate_label("A cluster with a remarkably long name", 20);
		assert!(cut.ends_with('…'));
		assert!(cut.chars().count() <= 20);
	}

	#[test]
	fn radii_follow_paper_counts_and_hover() {
		let nodes = nodes();
		let frame = frame(&nodes);
		let transform = ViewTransform::default();

		let scene = render(&frame, &Highlight::default(), &transform, 400.0, 400.0);
		let drawn = circles(&scene);
		assert_eq!(drawn[0], (40.0, "#14B8A6".to_string()));
		assert_eq!(drawn[1].0, 26.0);
		assert_eq!(line_width(&scene), 6.0);

		let hover = Highlight {
			hovered: Some("mystery"),
			selected: None,
		};
		let scene = render(&frame, &hover, &transform, 400.0, 400.0);
		let drawn = circles(&scene);
		// hovered node is painted last
		assert_eq!(drawn[0].0, 40.0 * 0.75);
		assert_eq!(drawn[1].0, 26.0 * 1.4);
		assert_eq!(line_width(&scene), 12.0);
	}

	#[test]
	fn selected_node_keeps_emphasis_while_other_hovered() {
		let nodes = nodes();
		let frame = frame(&nodes);
		let highlight = Highlight {
			hovered: Some("mystery"),
			selected: Some("agents-tool-use"),
		};
		let scene = render(&frame, &highlight, &ViewTransform::default(), 400.0, 400.0);
		let drawn = circles(&scene);
		assert_eq!(drawn[0].0, 40.0 * 1.4);
		assert_eq!(drawn[1].0, 26.0 * 1.4);
	}

	#[test]
	fn labels_hidden_when_zoomed_out_unless_emphasised() {
		let nodes = nodes();
		let frame = frame(&nodes);
		let zoomed_out = ViewTransform {
			k: 0.5,
			..Default::default()
		};
		let scene = render(&frame, &Highlight::default(), &zoomed_out, 400.0, 400.0);
		assert_eq!(scene.texts().count(), 0);

		let highlight = Highlight {
			hovered: Some("agents-tool-use"),
			selected: None,
		};
		let scene = render(&frame, &highlight, &zoomed_out, 400.0, 400.0);
		assert_eq!(scene.texts().collect::<Vec<_>>(), vec!["Agents / Tool Use"]);
	}

	#[test]
	fn no_positions_means_background_only() {
		let nodes = nodes();
		let mut frame = frame(&nodes);
		frame.positions.clear();
		let scene = render(&frame, &Highlight::default(), &ViewTransform::default(), 400.0, 400.0);
		assert_eq!(scene.commands.len(), 1);
	}

	#[test]
	fn hit_area_is_wider_than_the_disc() {
		let nodes = nodes();
		let frame = frame(&nodes);
		let mut hits = HitBuffer::new(400.0, 400.0);
		paint_hit_areas(&frame, &Highlight::default(), &ViewTransform::default(), &mut hits);
		// just outside the 40px disc but inside the margin
		assert_eq!(hits.slot_at(144.0, 100.0), Some(0));
		assert_eq!(hits.slot_at(100.0, 100.0), Some(0));
		assert_eq!(hits.slot_at(300.0, 100.0), Some(1));
		assert_eq!(hits.slot_at(200.0, 300.0), None);
	}
}
