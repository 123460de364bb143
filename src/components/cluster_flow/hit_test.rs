use super::scale::ChartScales;
use super::stack::StackedChart;
use super::types::{FlowEvent, FlowSnapshot, Tooltip};
use crate::components::cluster_graph::cluster_color;

/// A band under the pointer: day and position within that day's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandHit {
	pub day: usize,
	pub value: usize,
}

/// Find the band under a screen point. Zero-count bands are never hit; on a
/// shared boundary the upper band wins.
pub fn hit_test(chart: &StackedChart, scales: &ChartScales, px: f64, py: f64) -> Option<BandHit> {
	if chart.is_empty() || !scales.inner_contains(px, py) {
		return None;
	}
	let day = scales.invert_x(px);
	let stacked = chart.days.get(day)?;
	stacked
		.values
		.iter()
		.enumerate()
		.rev()
		.find(|(_, band)| {
			band.count > 0
				&& scales.y(band.y1 as f64) <= py
				&& py <= scales.y(band.y0 as f64)
		})
		.map(|(value, _)| BandHit { day, value })
}

pub fn tooltip(chart: &StackedChart, snapshot: &FlowSnapshot, hit: BandHit) -> Option<Tooltip> {
	let stacked = chart.days.get(hit.day)?;
	let band = stacked.values.get(hit.value)?;
	let percentage = if stacked.total == 0 {
		0
	} else {
		(100.0 * band.count as f64 / stacked.total as f64).round() as u32
	};
	Some(Tooltip {
		cluster: band.cluster.clone(),
		date: stacked.date.clone(),
		count: band.count,
		total: stacked.total,
		percentage,
		color: snapshot
			.colors
			.get(&band.cluster)
			.cloned()
			.unwrap_or_else(|| cluster_color(&band.cluster).to_string()),
	})
}

/// Hover and selection for one flow view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowInteraction {
	pub tooltip: Option<Tooltip>,
	pub selected: Option<String>,
}

impl FlowInteraction {
	pub fn hovered(&self) -> Option<&str> {
		self.tooltip.as_ref().map(|t| t.cluster.as_str())
	}

	/// Re-derive hover from a pointer position. Returns an event when the
	/// tooltip content changed.
	pub fn pointer_move(
		&mut self,
		chart: &StackedChart,
		snapshot: &FlowSnapshot,
		scales: &ChartScales,
		px: f64,
		py: f64,
	) -> Option<FlowEvent> {
		let tooltip = hit_test(chart, scales, px, py).and_then(|hit| tooltip(chart, snapshot, hit));
		if tooltip == self.tooltip {
			return None;
		}
		self.tooltip = tooltip;
		Some(FlowEvent::HoverChanged(self.tooltip.clone()))
	}

	pub fn pointer_leave(&mut self) -> Option<FlowEvent> {
		self.tooltip.take()?;
		Some(FlowEvent::HoverChanged(None))
	}

	/// Toggle selection of the hovered cluster.
	pub fn click(&mut self) -> Option<FlowEvent> {
		let tooltip = self.tooltip.as_ref()?;
		let selected = self.selected.as_deref() != Some(tooltip.cluster.as_str());
		self.selected = selected.then(|| tooltip.cluster.clone());
		Some(FlowEvent::ClusterSelected {
			cluster: tooltip.cluster.clone(),
			date: tooltip.date.clone(),
			selected,
		})
	}

	/// Drop state that refers to a previous snapshot.
	pub fn reset(&mut self) {
		*self = Self::default();
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::components::cluster_flow::scale::ChartMargins;
	use crate::components::cluster_flow::types::DailyClusterCounts;

	fn snapshot() -> FlowSnapshot {
		let day = |date: &str, counts: &[(&str, u32)]| DailyClusterCounts {
			date: date.into(),
			cluster_counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
		};
		FlowSnapshot {
			start_date: "2025-01-01".into(),
			end_date: "2025-01-03".into(),
			clusters: vec!["X".into(), "Y".into(), "Z".into()],
			colors: BTreeMap::from([("X".to_string(), "#ff0000".to_string())]),
			daily_data: vec![
				day("2025-01-01", &[("X", 3), ("Y", 0), ("Z", 1)]),
				day("2025-01-02", &[("X", 2), ("Y", 5), ("Z", 3)]),
				day("2025-01-03", &[("X", 1), ("Y", 1)]),
			],
		}
	}

	fn setup() -> (FlowSnapshot, StackedChart, ChartScales) {
		let snapshot = snapshot();
		let chart = StackedChart::build(&snapshot);
		let scales = ChartScales::new(
			600.0,
			400.0,
			ChartMargins::default(),
			chart.days.len(),
			chart.max_total,
		);
		(snapshot, chart, scales)
	}

	#[test]
	fn band_midpoints_hit_their_own_cluster() {
		let (_, chart, scales) = setup();
		for (day, stacked) in chart.days.iter().enumerate() {
			for (value, band) in stacked.values.iter().enumerate() {
				if band.count == 0 {
					continue;
				}
				let mid = scales.y((band.y0 + band.y1) as f64 / 2.0);
				assert_eq!(
					hit_test(&chart, &scales, scales.x(day), mid),
					Some(BandHit { day, value }),
					"{} on {}",
					band.cluster,
					stacked.date
				);
			}
		}
	}

	#[test]
	fn zero_count_band_is_never_hit() {
		let (_, chart, scales) = setup();
		// day 0: Y spans y0 = y1 = 3
		let boundary = scales.y(3.0);
		let hit = hit_test(&chart, &scales, scales.x(0), boundary).unwrap();
		assert_ne!(chart.days[0].values[hit.value].cluster, "Y");
		for step in 0..=100 {
			let py = scales.margins.top + scales.inner_height * step as f64 / 100.0;
			if let Some(hit) = hit_test(&chart, &scales, scales.x(0), py) {
				assert_ne!(chart.days[0].values[hit.value].cluster, "Y");
			}
		}
	}

	#[test]
	fn shared_boundary_goes_to_upper_band() {
		let (_, chart, scales) = setup();
		// day 1: X [0,2], Y [2,7]
		let hit = hit_test(&chart, &scales, scales.x(1), scales.y(2.0)).unwrap();
		assert_eq!(chart.days[1].values[hit.value].cluster, "Y");
	}

	#[test]
	fn outside_plot_area_misses() {
		let (_, chart, scales) = setup();
		assert_eq!(hit_test(&chart, &scales, 10.0, 200.0), None);
		assert_eq!(hit_test(&chart, &scales, 300.0, 395.0), None);
		// above the tallest stack but inside the plot
		assert_eq!(hit_test(&chart, &scales, scales.x(2), scales.margins.top + 1.0), None);
	}

	#[test]
	fn tooltip_payload() {
		let (snapshot, chart, _) = setup();
		let tip = tooltip(&chart, &snapshot, BandHit { day: 1, value: 1 }).unwrap();
		assert_eq!(
			tip,
			Tooltip {
				cluster: "Y".into(),
				date: "2025-01-02".into(),
				count: 5,
				total: 10,
				percentage: 50,
				color: "#9CA3AF".into(),
			}
		);
		let tip = tooltip(&chart, &snapshot, BandHit { day: 0, value: 0 }).unwrap();
		assert_eq!(tip.color, "#ff0000");
		assert_eq!(tip.percentage, 75);
	}

	#[test]
	fn click_toggles_selection() {
		let (snapshot, chart, scales) = setup();
		let mut state = FlowInteraction::default();
		assert_eq!(state.click(), None);

		let (px, py) = (scales.x(1), scales.y(1.0));
		assert!(matches!(
			state.pointer_move(&chart, &snapshot, &scales, px, py),
			Some(FlowEvent::HoverChanged(Some(_)))
		));
		assert_eq!(state.hovered(), Some("X"));
		assert_eq!(state.pointer_move(&chart, &snapshot, &scales, px, py), None);

		assert_eq!(
			state.click(),
			Some(FlowEvent::ClusterSelected {
				cluster: "X".into(),
				date: "2025-01-02".into(),
				selected: true,
			})
		);
		assert_eq!(state.selected.as_deref(), Some("X"));
		assert!(matches!(
			state.click(),
			Some(FlowEvent::ClusterSelected {
				selected: false,
				..
			})
		));
		assert_eq!(state.selected, None);

		assert_eq!(state.pointer_leave(), Some(FlowEvent::HoverChanged(None)));
		assert_eq!(state.pointer_leave(), None);
	}
}
