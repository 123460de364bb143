//! Offscreen pick buffer: every node's hit area is rasterised with its own
//! non-zero key, so the node under the pointer is a single cell read.
//!
//! Clearing only touches the boxes painted since the last clear, so a frame
//! costs what its discs cover rather than the whole viewport.

#[derive(Clone, Debug, Default)]
pub struct HitBuffer {
	width: usize,
	height: usize,
	keys: Vec<u32>,
	/// `(x0, y0, x1, y1)` cell boxes written since the last clear.
	painted: Vec<(usize, usize, usize, usize)>,
}

impl HitBuffer {
	pub fn new(width: f64, height: f64) -> Self {
		let mut buffer = Self::default();
		buffer.resize(width, height);
		buffer
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(0.0).ceil() as usize;
		self.height = height.max(0.0).ceil() as usize;
		self.keys = vec![0; self.width * self.height];
		self.painted.clear();
	}

	pub fn clear(&mut self) {
		for (x0, y0, x1, y1) in self.painted.drain(..) {
			for py in y0..y1 {
				let row = py * self.width;
				self.keys[row + x0..row + x1].fill(0);
			}
		}
	}

	/// Paint a disc in screen pixels. Later discs overwrite earlier ones, the
	/// same way later nodes are painted on top.
	pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, slot: usize) {
		if !(cx.is_finite() && cy.is_finite() && radius > 0.0) || self.keys.is_empty() {
			return;
		}
		let key = slot as u32 + 1;
		let r2 = radius * radius;
		let x0 = (cx - radius).floor().max(0.0) as usize;
		let y0 = (cy - radius).floor().max(0.0) as usize;
		let x1 = ((cx + radius).ceil().max(0.0) as usize).min(self.width);
		let y1 = ((cy + radius).ceil().max(0.0) as usize).min(self.height);
		if x0 >= x1 || y0 >= y1 {
			return;
		}
		self.painted.push((x0, y0, x1, y1));
		for py in y0..y1 {
			let dy = py as f64 + 0.5 - cy;
			let row = py * self.width;
			for px in x0..x1 {
				let dx = px as f64 + 0.5 - cx;
				if dx * dx + dy * dy <= r2 {
					self.keys[row + px] = key;
				}
			}
		}
	}

	pub fn slot_at(&self, x: f64, y: f64) -> Option<usize> {
		if !(x >= 0.0 && y >= 0.0) {
			return None;
		}
		let (px, py) = (x as usize, y as usize);
		if px >= self.width || py >= self.height {
			return None;
		}
		match self.keys[py * self.width + px] {
			0 => None,
			key => Some(key as usize - 1),
		}
	}
}
