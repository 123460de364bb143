use chrono::NaiveDate;

use super::hit_test::FlowInteraction;
use super::scale::ChartScales;
use super::stack::StackedChart;
use super::types::FlowSnapshot;
use crate::components::canvas::{Align, DrawCmd, Scene, Stroke};
use crate::components::cluster_graph::cluster_color;

pub const NO_DATA_MESSAGE: &str = "No data for this date range";

const BACKGROUND: &str = "#111827";
const GRID_COLOR: &str = "#374151";
const AXIS_COLOR: &str = "#6B7280";
const LABEL_COLOR: &str = "#9CA3AF";
const LABEL_FONT: &str = "11px sans-serif";
const MAX_X_LABELS: usize = 7;

const BASE_OPACITY: f64 = 0.7;
const DIMMED_OPACITY: f64 = 0.3;
const EMPHASIS_OPACITY: f64 = 0.9;

pub fn band_opacity(cluster: &str, interaction: &FlowInteraction) -> f64 {
	let hovered = interaction.hovered();
	if hovered == Some(cluster) || interaction.selected.as_deref() == Some(cluster) {
		EMPHASIS_OPACITY
	} else if hovered.is_some() {
		DIMMED_OPACITY
	} else {
		BASE_OPACITY
	}
}

pub fn band_color(snapshot: &FlowSnapshot, cluster: &str) -> String {
	snapshot
		.colors
		.get(cluster)
		.cloned()
		.unwrap_or_else(|| cluster_color(cluster).to_string())
}

/// `2025-01-07` -> `Jan 07`; anything unparseable is shown as given.
pub fn format_day(date: &str) -> String {
	NaiveDate::parse_from_str(date, "%Y-%m-%d")
		.map(|d| d.format("%b %d").to_string())
		.unwrap_or_else(|_| date.to_string())
}

/// Evenly spread day indices for x-axis labels, always including the last.
pub fn x_label_indices(day_count: usize) -> Vec<usize> {
	if day_count == 0 {
		return Vec::new();
	}
	let step = day_count.div_ceil(MAX_X_LABELS).max(1);
	let mut indices: Vec<usize> = (0..day_count).step_by(step).collect();
	let last = day_count - 1;
	if indices.last() != Some(&last) {
		if indices.len() == MAX_X_LABELS {
			indices.pop();
		}
		indices.push(last);
	}
	indices
}

fn y_ticks(max_total: f64) -> Vec<u64> {
	let mut ticks: Vec<u64> = (0..=4)
		.map(|i| (max_total * i as f64 / 4.0).round() as u64)
		.collect();
	ticks.dedup();
	ticks
}

pub fn render(
	snapshot: &FlowSnapshot,
	chart: &StackedChart,
	scales: &ChartScales,
	interaction: &FlowInteraction,
	width: f64,
	height: f64,
) -> Scene {
	let mut scene = Scene::new(width, height);
	scene.push(DrawCmd::Clear {
		color: BACKGROUND.into(),
	});
	if chart.is_empty() || snapshot.is_empty() {
		scene.push(DrawCmd::Text {
			at: (width / 2.0, height / 2.0),
			text: NO_DATA_MESSAGE.into(),
			color: LABEL_COLOR.into(),
			font: "14px sans-serif".into(),
			align: Align::Center,
		});
		return scene;
	}

	let (left, top) = (scales.margins.left, scales.margins.top);
	let (right, bottom) = (left + scales.inner_width, top + scales.inner_height);
	let grid = |from, to| DrawCmd::Line {
		from,
		to,
		stroke: Stroke {
			color: GRID_COLOR.into(),
			width: 1.0,
		},
		alpha: 0.6,
	};

	for tick in y_ticks(scales.max_total) {
		let y = scales.y(tick as f64);
		scene.push(grid((left, y), (right, y)));
		scene.push(DrawCmd::Text {
			at: (left - 8.0, y + 4.0),
			text: tick.to_string(),
			color: LABEL_COLOR.into(),
			font: LABEL_FONT.into(),
			align: Align::Right,
		});
	}
	let labels = x_label_indices(chart.days.len());
	for &day in &labels {
		let x = scales.x(day);
		scene.push(grid((x, top), (x, bottom)));
	}

	// a lone day still gets a visible band across the plot
	let xs: Vec<f64> = if chart.days.len() == 1 {
		vec![left, right]
	} else {
		(0..chart.days.len()).map(|i| scales.x(i)).collect()
	};
	let day_at = |i: usize| &chart.days[i.min(chart.days.len() - 1)];

	for (index, cluster) in snapshot.clusters.iter().enumerate().rev() {
		let mut points = Vec::with_capacity(xs.len() * 2);
		for (i, &x) in xs.iter().enumerate() {
			points.push((x, scales.y(day_at(i).values[index].y1 as f64)));
		}
		for (i, &x) in xs.iter().enumerate().rev() {
			points.push((x, scales.y(day_at(i).values[index].y0 as f64)));
		}
		let emphasized = interaction.hovered() == Some(cluster.as_str())
			|| interaction.selected.as_deref() == Some(cluster.as_str());
		scene.push(DrawCmd::Polygon {
			points,
			fill: band_color(snapshot, cluster),
			alpha: band_opacity(cluster, interaction),
			stroke: emphasized.then(|| Stroke {
				color: "#ffffff".into(),
				width: 2.0,
			}),
		});
	}

	let axis = Stroke {
		color: AXIS_COLOR.into(),
		width: 1.0,
	};
	scene.push(DrawCmd::Line {
		from: (left, bottom),
		to: (right, bottom),
		stroke: axis.clone(),
		alpha: 1.0,
	});
	scene.push(DrawCmd::Line {
		from: (left, top),
		to: (left, bottom),
		stroke: axis,
		alpha: 1.0,
	});
	for &day in &labels {
		scene.push(DrawCmd::Text {
			at: (scales.x(day), bottom + 18.0),
			text: format_day(&chart.days[day].date),
			color: LABEL_COLOR.into(),
			font: LABEL_FONT.into(),
			align: Align::Center,
		});
	}
	scene
}
