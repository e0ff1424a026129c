//! Force layout over a graph snapshot.
//!
//! Charge and spring forces are integrated by [`ForceGraph`]; link rest
//! lengths, centering and collisions are applied as position corrections
//! after each integration step. Everything is scaled by `alpha`, which cools
//! toward `alpha_target` and stops the simulation once it drops below
//! `alpha_min`.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::config::GraphConfig;
use super::scale::{category_color, link_distance, node_radius};
use super::types::{EdgeKind, GraphData, NodeKind};

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct LayoutNode {
	pub id: String,
	pub name: String,
	pub kind: NodeKind,
	pub color: &'static str,
	pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct Link {
	pub source: usize,
	pub target: usize,
	pub kind: EdgeKind,
	pub strength: f64,
	pub label: Option<String>,
	distance: f64,
	/// Share of the correction applied to the target.
	bias: f64,
	pull: f64,
}

impl Link {
	pub fn is_loop(&self) -> bool {
		self.source == self.target
	}

	pub fn touches(&self, idx: usize) -> bool {
		self.source == idx || self.target == idx
	}
}

pub struct LayoutSimulation {
	graph: ForceGraph<usize, ()>,
	nodes: Vec<LayoutNode>,
	positions: Vec<(f64, f64)>,
	pinned: Vec<bool>,
	links: Vec<Link>,
	adjacency: Vec<Vec<usize>>,
	alpha: f64,
	alpha_target: f64,
	config: GraphConfig,
}

impl LayoutSimulation {
	pub fn new(data: &GraphData, config: &GraphConfig) -> Self {
		let data = data.sanitized();
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.charge as f32,
			force_spring: config.spring as f32,
			force_max: config.force_max as f32,
			node_speed: config.node_speed as f32,
			damping_factor: config.velocity_damping as f32,
		});

		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
		let mut handles = Vec::with_capacity(data.nodes.len());
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut positions = Vec::with_capacity(data.nodes.len());
		let mut index = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			// Phyllotaxis seeding: deterministic and never coincident.
			let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden_angle;
			let (x, y) = (r * angle.cos(), r * angle.sin());

			handles.push(graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: config.mass(node.kind) as f32,
				is_anchor: false,
				user_data: i,
			}));
			nodes.push(LayoutNode {
				id: node.id.clone(),
				name: node.name.clone(),
				kind: node.kind,
				color: category_color(&node.category),
				radius: node_radius(node.size(), config),
			});
			positions.push((x, y));
			index.insert(node.id.as_str(), i);
		}

		let mut adjacency = vec![Vec::new(); nodes.len()];
		let mut degree = vec![0usize; nodes.len()];
		let mut links = Vec::with_capacity(data.edges.len());
		for edge in &data.edges {
			let (Some(&source), Some(&target)) =
				(index.get(edge.source.as_str()), index.get(edge.target.as_str()))
			else {
				continue;
			};
			if source != target {
				graph.add_edge(handles[source], handles[target], EdgeData::default());
				degree[source] += 1;
				degree[target] += 1;
				if !adjacency[source].contains(&target) {
					adjacency[source].push(target);
					adjacency[target].push(source);
				}
			}
			let strength = edge.strength();
			links.push(Link {
				source,
				target,
				kind: edge.kind,
				strength,
				label: edge.label.clone(),
				distance: link_distance(edge.kind, strength, config),
				bias: 0.5,
				pull: 1.0,
			});
		}

		for link in links.iter_mut().filter(|l| !l.is_loop()) {
			let (ds, dt) = (degree[link.source] as f64, degree[link.target] as f64);
			link.bias = ds / (ds + dt);
			link.pull = 1.0 / ds.min(dt);
		}

		Self {
			graph,
			pinned: vec![false; nodes.len()],
			nodes,
			positions,
			links,
			adjacency,
			alpha: 1.0,
			alpha_target: 0.0,
			config: config.clone(),
		}
	}

	pub fn nodes(&self) -> &[LayoutNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn position(&self, idx: usize) -> (f64, f64) {
		self.positions[idx]
	}

	pub fn radius(&self, idx: usize) -> f64 {
		self.nodes[idx].radius
	}

	pub fn neighbors(&self, idx: usize) -> &[usize] {
		&self.adjacency[idx]
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Raise alpha so a cooled layout moves again.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	/// Keep the simulation warm (alpha converges to `target`) until released.
	pub fn hold_heat(&mut self, target: f64) {
		self.alpha_target = target;
		self.alpha = self.alpha.max(self.config.alpha_min);
	}

	pub fn release_heat(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		self.pinned[idx] = true;
		self.positions[idx] = (x, y);
		self.write_positions();
	}

	pub fn unpin(&mut self, idx: usize) {
		self.pinned[idx] = false;
		self.write_positions();
	}

	pub fn is_pinned(&self, idx: usize) -> bool {
		self.pinned[idx]
	}

	/// Nearest node whose hit circle contains the graph-space point.
	pub fn node_at(&self, x: f64, y: f64, hit_floor: f64) -> Option<usize> {
		let mut best: Option<(usize, f64)> = None;
		for (i, &(nx, ny)) in self.positions.iter().enumerate() {
			let dist = ((nx - x).powi(2) + (ny - y).powi(2)).sqrt();
			if dist > self.nodes[i].radius.max(hit_floor) {
				continue;
			}
			if best.is_none_or(|(_, d)| dist < d) {
				best = Some((i, dist));
			}
		}
		best.map(|(i, _)| i)
	}

	pub fn run_ticks(&mut self, ticks: usize) {
		for _ in 0..ticks {
			if self.settled() {
				break;
			}
			self.tick();
		}
	}

	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		if self.nodes.is_empty() {
			return;
		}
		self.graph.update((self.config.tick_dt * self.alpha) as f32);
		self.read_positions();
		self.apply_links();
		self.apply_center();
		self.apply_collisions();
		self.write_positions();
	}

	fn read_positions(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			// A degenerate step keeps the previous position.
			if x.is_finite() && y.is_finite() {
				positions[node.data.user_data] = (x, y);
			}
		});
	}

	fn write_positions(&mut self) {
		let (positions, pinned) = (&self.positions, &self.pinned);
		self.graph.visit_nodes_mut(|node| {
			let i = node.data.user_data;
			node.data.x = positions[i].0 as f32;
			node.data.y = positions[i].1 as f32;
			node.data.is_anchor = pinned[i];
		});
	}

	fn apply_links(&mut self) {
		for link in self.links.iter().filter(|l| !l.is_loop()) {
			let (sx, sy) = self.positions[link.source];
			let (tx, ty) = self.positions[link.target];
			let (dx, dy) = (tx - sx, ty - sy);
			let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
			let l = (dist - link.distance) / dist * self.alpha * link.pull;
			let (dx, dy) = (dx * l, dy * l);
			if !self.pinned[link.target] {
				self.positions[link.target].0 -= dx * link.bias;
				self.positions[link.target].1 -= dy * link.bias;
			}
			if !self.pinned[link.source] {
				self.positions[link.source].0 += dx * (1.0 - link.bias);
				self.positions[link.source].1 += dy * (1.0 - link.bias);
			}
		}
	}

	fn apply_center(&mut self) {
		let n = self.positions.len() as f64;
		let (sum_x, sum_y) = self
			.positions
			.iter()
			.fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
		let strength = self.config.center_strength;
		let (shift_x, shift_y) = (sum_x / n * strength, sum_y / n * strength);
		for (i, p) in self.positions.iter_mut().enumerate() {
			if !self.pinned[i] {
				p.0 -= shift_x;
				p.1 -= shift_y;
			}
		}
	}

	fn apply_collisions(&mut self) {
		let (padding, strength) = (self.config.collide_padding, self.config.collide_strength);
		let n = self.positions.len();
		for i in 0..n {
			for j in i + 1..n {
				let (wi, wj) = match (self.pinned[i], self.pinned[j]) {
					(true, true) => continue,
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					(false, false) => (0.5, 0.5),
				};
				let (xi, yi) = self.positions[i];
				let (xj, yj) = self.positions[j];
				let (mut dx, mut dy) = (xj - xi, yj - yi);
				let min = self.nodes[i].radius + self.nodes[j].radius + padding;
				let mut d2 = dx * dx + dy * dy;
				if d2 >= min * min {
					continue;
				}
				if d2 < 1e-12 {
					let a = (i * 31 + j) as f64;
					(dx, dy) = (a.cos() * 1e-3, a.sin() * 1e-3);
					d2 = dx * dx + dy * dy;
				}
				let d = d2.sqrt();
				let push = (min - d) / d * strength;
				self.positions[i].0 -= dx * push * wi;
				self.positions[i].1 -= dy * push * wi;
				self.positions[j].0 += dx * push * wj;
				self.positions[j].1 += dy * push * wj;
			}
		}
	}
}
