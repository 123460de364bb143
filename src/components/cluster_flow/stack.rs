use super::types::{BandValue, FlowSnapshot, StackedDay};

/// Stacked days plus the largest day total, floored at 1.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackedChart {
	pub days: Vec<StackedDay>,
	pub max_total: u64,
}

impl StackedChart {
	pub fn build(snapshot: &FlowSnapshot) -> Self {
		let days = stack_days(snapshot);
		let max_total = days.iter().map(|d| d.total).max().unwrap_or(0).max(1);
		Self { days, max_total }
	}

	pub fn is_empty(&self) -> bool {
		self.days.is_empty()
	}
}

/// Running prefix sums of each day's counts, in the snapshot's cluster order.
pub fn stack_days(snapshot: &FlowSnapshot) -> Vec<StackedDay> {
	snapshot
		.daily_data
		.iter()
		.map(|day| {
			let mut y0 = 0u64;
			let values = snapshot
				.clusters
				.iter()
				.map(|cluster| {
					let count = day.count(cluster);
					let band = BandValue {
						cluster: cluster.clone(),
						y0,
						y1: y0 + u64::from(count),
						count,
					};
					y0 = band.y1;
					band
				})
				.collect();
			StackedDay {
				date: day.date.clone(),
				values,
				total: y0,
			}
		})
		.collect()
}
