//! Index-based x scale and linear y scale for the stacked chart.
//!
//! Days are spaced evenly by position in the series, not by elapsed time, so
//! calendar gaps do not stretch the chart.

use serde::Deserialize;

/// Space around the plot area, in CSS pixels. The left and bottom margins hold
/// the axis labels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartMargins {
	/// Above the tallest stack.
	pub top: f64,
	/// Right of the last day.
	pub right: f64,
	/// Below the x axis, room for date labels.
	pub bottom: f64,
	/// Left of the y axis, room for tick labels.
	pub left: f64,
}

impl Default for ChartMargins {
	fn default() -> Self {
		Self {
			top: 20.0,
			right: 20.0,
			bottom: 40.0,
			left: 50.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartScales {
	pub margins: ChartMargins,
	pub inner_width: f64,
	pub inner_height: f64,
	pub day_count: usize,
	pub max_total: f64,
}

impl ChartScales {
	pub fn new(
		width: f64,
		height: f64,
		margins: ChartMargins,
		day_count: usize,
		max_total: u64,
	) -> Self {
		Self {
			margins,
			inner_width: (width - margins.left - margins.right).max(0.0),
			inner_height: (height - margins.top - margins.bottom).max(0.0),
			day_count,
			max_total: max_total.max(1) as f64,
		}
	}

	fn step_count(&self) -> f64 {
		self.day_count.saturating_sub(1).max(1) as f64
	}

	pub fn x(&self, index: usize) -> f64 {
		self.margins.left + index as f64 / self.step_count() * self.inner_width
	}

	pub fn y(&self, value: f64) -> f64 {
		self.margins.top + self.inner_height - value / self.max_total * self.inner_height
	}

	/// Nearest day index to a screen x, clamped to the series.
	pub fn invert_x(&self, px: f64) -> usize {
		if self.day_count == 0 || self.inner_width <= 0.0 {
			return 0;
		}
		let raw = (px - self.margins.left) / self.inner_width * self.step_count();
		let last = self.day_count - 1;
		(raw.round().max(0.0) as usize).min(last)
	}

	pub fn inner_contains(&self, px: f64, py: f64) -> bool {
		let (left, top) = (self.margins.left, self.margins.top);
		px >= left && px <= left + self.inner_width && py >= top && py <= top + self.inner_height
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scales(days: usize) -> ChartScales {
		ChartScales::new(650.0, 360.0, ChartMargins::default(), days, 40)
	}

	#[test]
	fn x_spans_inner_width() {
		let s = scales(5);
		assert_eq!(s.inner_width, 580.0);
		assert_eq!(s.x(0), 50.0);
		assert_eq!(s.x(4), 630.0);
		for i in 0..4 {
			assert!(s.x(i) <= s.x(i + 1));
		}
	}

	#[test]
	fn y_is_non_increasing() {
		let s = scales(5);
		assert_eq!(s.y(0.0), 320.0);
		assert_eq!(s.y(40.0), 20.0);
		let mut prev = f64::INFINITY;
		for v in 0..=40 {
			let y = s.y(v as f64);
			assert!(y <= prev);
			prev = y;
		}
	}

	#[test]
	fn invert_x_snaps_to_nearest_day() {
		let s = scales(7);
		for i in 0..7 {
			assert_eq!(s.invert_x(s.x(i)), i);
			assert_eq!(s.invert_x(s.x(i) + 10.0), i);
		}
		assert_eq!(s.invert_x(-100.0), 0);
		assert_eq!(s.invert_x(10_000.0), 6);
	}

	#[test]
	fn degenerate_denominators_stay_finite() {
		let single = ChartScales::new(100.0, 100.0, ChartMargins::default(), 1, 0);
		assert_eq!(single.x(0), 50.0);
		assert!(single.y(0.0).is_finite());
		assert_eq!(single.invert_x(80.0), 0);

		let tiny = ChartScales::new(10.0, 10.0, ChartMargins::default(), 0, 0);
		assert_eq!(tiny.inner_width, 0.0);
		assert_eq!(tiny.invert_x(5.0), 0);
		assert!(tiny.x(3).is_finite());
	}
}
