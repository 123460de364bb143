//! Custom forces layered on top of the n-body solver.
//!
//! Each force reads an immutable body snapshot and adds its contribution into a
//! displacement buffer; the engine sums them and scales by alpha.

use glam::DVec2;

/// What a force may know about a node during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
	pub pos: DVec2,
	/// Visual radius before interaction scaling.
	pub radius: f64,
	pub degree: usize,
	pub pinned: bool,
}

pub trait Force {
	/// Add this force's displacement for every body into `out`.
	fn accumulate(&self, bodies: &[Body], out: &mut [DVec2]);
}

/// Pull toward a point; isolated nodes get the stronger pull.
#[derive(Clone, Debug)]
pub struct CenterForce {
	pub center: DVec2,
	pub strength: f64,
	pub isolated_strength: f64,
}

impl Force for CenterForce {
	fn accumulate(&self, bodies: &[Body], out: &mut [DVec2]) {
		for (body, delta) in bodies.iter().zip(out.iter_mut()) {
			let strength = if body.degree == 0 {
				self.isolated_strength
			} else {
				self.strength
			};
			*delta += (self.center - body.pos) * strength;
		}
	}
}

/// Springs with a fixed rest length along each active link.
#[derive(Clone, Debug)]
pub struct LinkForce {
	pub links: Vec<(usize, usize)>,
	pub distance: f64,
	pub strength: f64,
}

impl Force for LinkForce {
	fn accumulate(&self, bodies: &[Body], out: &mut [DVec2]) {
		for &(source, target) in &self.links {
			let (Some(a), Some(b)) = (bodies.get(source), bodies.get(target)) else {
				continue;
			};
			let delta = b.pos - a.pos;
			let dist = delta.length();
			if dist < f64::EPSILON {
				continue;
			}
			// positive when stretched, negative when compressed
			let correction = delta * ((dist - self.distance) / dist * self.strength * 0.5);
			out[source] += correction;
			out[target] -= correction;
		}
	}
}

/// Pushes overlapping nodes apart so their padded discs no longer intersect.
#[derive(Clone, Debug)]
pub struct CollideForce {
	pub padding: f64,
	pub strength: f64,
}

impl CollideForce {
	pub fn exclusion_radius(&self, body: &Body) -> f64 {
		body.radius + self.padding
	}
}

impl Force for CollideForce {
	fn accumulate(&self, bodies: &[Body], out: &mut [DVec2]) {
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let (a, b) = (&bodies[i], &bodies[j]);
				let min_dist = self.exclusion_radius(a) + self.exclusion_radius(b);
				let mut delta = b.pos - a.pos;
				let mut dist = delta.length();
				if dist >= min_dist {
					continue;
				}
				if dist < f64::EPSILON {
					// coincident; separate along a direction derived from the pair
					let angle = (i * 31 + j * 17) as f64;
					delta = DVec2::from_angle(angle);
					dist = 1.0;
				}
				let push = delta * ((min_dist - dist) / dist * self.strength * 0.5);
				out[i] -= push;
				out[j] += push;
			}
		}
	}
}

/// Sum every force over the snapshot. Pinned bodies receive nothing.
pub fn compose(forces: &[Box<dyn Force>], bodies: &[Body]) -> Vec<DVec2> {
	let mut out = vec![DVec2::ZERO; bodies.len()];
	for force in forces {
		force.accumulate(bodies, &mut out);
	}
	for (body, delta) in bodies.iter().zip(out.iter_mut()) {
		if body.pinned {
			*delta = DVec2::ZERO;
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn body(x: f64, y: f64, degree: usize) -> Body {
		Body {
			pos: DVec2::new(x, y),
			radius: 20.0,
			degree,
			pinned: false,
		}
	}

	#[test]
	fn isolated_nodes_get_a_stronger_center_pull() {
		let force = CenterForce {
			center: DVec2::new(200.0, 200.0),
			strength: 0.02,
			isolated_strength: 0.15,
		};
		// same distance from center, opposite sides
		let bodies = [body(300.0, 200.0, 0), body(100.0, 200.0, 2)];
		let mut out = [DVec2::ZERO; 2];
		force.accumulate(&bodies, &mut out);

		assert!(out[0].length() > out[1].length());
		assert!(out[0].x < 0.0 && out[1].x > 0.0);
	}

	#[test]
	fn link_pulls_stretched_pair_together() {
		let force = LinkForce {
			links: vec![(0, 1)],
			distance: 180.0,
			strength: 0.5,
		};
		let bodies = [body(0.0, 0.0, 1), body(400.0, 0.0, 1)];
		let mut out = [DVec2::ZERO; 2];
		force.accumulate(&bodies, &mut out);
		assert!(out[0].x > 0.0);
		assert!(out[1].x < 0.0);
	}

	#[test]
	fn link_pushes_compressed_pair_apart() {
		let force = LinkForce {
			links: vec![(0, 1)],
			distance: 180.0,
			strength: 0.5,
		};
		let bodies = [body(0.0, 0.0, 1), body(50.0, 0.0, 1)];
		let mut out = [DVec2::ZERO; 2];
		force.accumulate(&bodies, &mut out);
		assert!(out[0].x < 0.0);
		assert!(out[1].x > 0.0);
	}

	#[test]
	fn collision_separates_overlap_and_ignores_distant() {
		let force = CollideForce {
			padding: 4.0,
			strength: 1.0,
		};
		let bodies = [body(0.0, 0.0, 0), body(10.0, 0.0, 0), body(500.0, 500.0, 0)];
		let mut out = [DVec2::ZERO; 3];
		force.accumulate(&bodies, &mut out);
		assert!(out[0].x < 0.0);
		assert!(out[1].x > 0.0);
		assert_eq!(out[2], DVec2::ZERO);
		// full strength resolves the overlap exactly
		let gap = (bodies[1].pos + out[1]) - (bodies[0].pos + out[0]);
		assert!((gap.length() - 48.0).abs() < 1e-9);
	}

	#[test]
	fn coincident_bodies_still_separate() {
		let force = CollideForce {
			padding: 0.0,
			strength: 1.0,
		};
		let bodies = [body(5.0, 5.0, 0), body(5.0, 5.0, 0)];
		let mut out = [DVec2::ZERO; 2];
		force.accumulate(&bodies, &mut out);
		assert!(out[0].length() > 0.0);
		assert!(out[0].x.is_finite() && out[0].y.is_finite());
	}

	#[test]
	fn compose_sums_and_skips_pinned() {
		let forces: Vec<Box<dyn Force>> = vec![
			Box::new(CenterForce {
				center: DVec2::ZERO,
				strength: 0.1,
				isolated_strength: 0.1,
			}),
			Box::new(CenterForce {
				center: DVec2::ZERO,
				strength: 0.2,
				isolated_strength: 0.2,
			}),
		];
		let mut pinned = body(10.0, 0.0, 0);
		pinned.pinned = true;
		let out = compose(&forces, &[body(10.0, 0.0, 0), pinned]);
		assert!((out[0].x + 3.0).abs() < 1e-9);
		assert_eq!(out[1], DVec2::ZERO);
	}
}
