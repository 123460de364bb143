use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::VizError;

/// Paper counts per cluster for one ISO day. Absent clusters count as zero.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DailyClusterCounts {
	/// ISO `YYYY-MM-DD` day.
	pub date: String,
	/// Papers per cluster id on that day.
	#[serde(default)]
	pub cluster_counts: BTreeMap<String, u32>,
}

impl DailyClusterCounts {
	/// Papers for `cluster` on this day, zero when absent.
	pub fn count(&self, cluster: &str) -> u32 {
		self.cluster_counts.get(cluster).copied().unwrap_or(0)
	}
}

/// Everything the flow chart draws.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FlowSnapshot {
	/// First day of the requested range.
	#[serde(default)]
	pub start_date: String,
	/// Last day of the requested range.
	#[serde(default)]
	pub end_date: String,
	/// Stacking order bottom-up, and z-order back-to-front.
	#[serde(default)]
	pub clusters: Vec<String>,
	/// Band colour per cluster id; the taxonomy palette fills gaps.
	#[serde(default)]
	pub colors: BTreeMap<String, String>,
	/// One entry per day, in date order.
	#[serde(default)]
	pub daily_data: Vec<DailyClusterCounts>,
}

impl FlowSnapshot {
	/// Decode a snapshot from the host's JSON payload.
	pub fn from_json(json: &str) -> Result<Self, VizError> {
		Ok(serde_json::from_str(json)?)
	}

	/// True when there is nothing to stack.
	pub fn is_empty(&self) -> bool {
		self.daily_data.is_empty() || self.clusters.is_empty()
	}
}

/// One cluster's segment of a stacked day. Bounds are widened so a day of
/// `u32` counts cannot overflow its running total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandValue {
	pub cluster: String,
	pub y0: u64,
	pub y1: u64,
	pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackedDay {
	pub date: String,
	pub values: Vec<BandValue>,
	pub total: u64,
}

/// Payload shown next to the pointer for the band under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
	/// Cluster id of the band.
	pub cluster: String,
	/// Day under the pointer.
	pub date: String,
	/// Papers in the band that day.
	pub count: u32,
	/// Papers across all clusters that day.
	pub total: u64,
	/// `count` as a rounded share of `total`.
	pub percentage: u32,
	/// Band colour.
	pub color: String,
}

/// Notifications the flow view sends to its host.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowEvent {
	/// A click toggled `cluster`; `selected` is its state after the click.
	ClusterSelected {
		/// Cluster id of the clicked band.
		cluster: String,
		/// Day the click landed on.
		date: String,
		/// Whether the cluster is selected after the click.
		selected: bool,
	},
	/// The band under the pointer changed; `None` when it left every band.
	HoverChanged(Option<Tooltip>),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_flow_payload_with_missing_keys() {
		let snapshot = FlowSnapshot::from_json(
			r##"{
				"start_date": "2025-01-01",
				"end_date": "2025-01-02",
				"clusters": ["X", "Y"],
				"colors": {"X": "#3B82F6"},
				"daily_data": [
					{"date": "2025-01-01", "cluster_counts": {"X": 3}},
					{"date": "2025-01-02", "cluster_counts": {"X": 1, "Y": 2}}
				]
			}"##,
		)
		.unwrap();
		assert_eq!(snapshot.daily_data[0].count("Y"), 0);
		assert_eq!(snapshot.daily_data[1].count("Y"), 2);
		assert!(!snapshot.is_empty());
	}

	#[test]
	fn empty_payload_is_empty() {
		let snapshot = FlowSnapshot::from_json("{}").unwrap();
		assert!(snapshot.is_empty());
		assert!(FlowSnapshot::from_json("[1, 2]").is_err());
	}
}
