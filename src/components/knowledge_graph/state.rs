use std::collections::HashSet;

use super::config::GraphConfig;
use super::layout::{LayoutSimulation, Link};
use super::types::GraphData;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scale by `factor` around a screen point, keeping that point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, config: &GraphConfig) {
		let new_k = config.clamp_zoom(self.k * factor);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Pointer travelled beyond the click tolerance.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

pub struct GraphViewState {
	pub layout: LayoutSimulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub show_labels: bool,
}

impl GraphViewState {
	pub fn new(data: &GraphData, config: &GraphConfig, width: f64, height: f64) -> Self {
		let mut layout = LayoutSimulation::new(data, config);
		layout.run_ticks(config.warmup_ticks);
		Self {
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			show_labels: false,
		}
	}

	pub fn config(&self) -> &GraphConfig {
		self.layout.config()
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		self.layout.node_at(gx, gy, self.config().hit_radius)
	}

	pub fn node_id(&self, idx: usize) -> Option<&str> {
		self.layout.nodes().get(idx).map(|n| n.id.as_str())
	}

	pub fn hovered_id(&self) -> Option<String> {
		self.hover
			.node
			.and_then(|idx| self.node_id(idx))
			.map(str::to_owned)
	}

	/// Press at a screen point: grab a node or start panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			let (nx, ny) = self.layout.position(idx);
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start_x: nx,
				node_start_y: ny,
				moved: false,
			};
			self.layout.pin(idx, nx, ny);
			let reheat = self.config().alpha_reheat;
			self.layout.hold_heat(reheat);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer motion. Returns true when the hovered node changed.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		let mut hover_changed = false;
		if !self.drag.active {
			let before = self.hover.node;
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
			hover_changed = before != self.hover.node;
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
				if dx.hypot(dy) > self.config().click_tolerance {
					self.drag.moved = true;
				}
				let k = self.transform.k;
				self.layout.pin(
					idx,
					self.drag.node_start_x + dx / k,
					self.drag.node_start_y + dy / k,
				);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
		hover_changed
	}

	/// Release. Returns the node index when the press was a click on a node.
	pub fn pointer_up(&mut self) -> Option<usize> {
		let clicked = match (self.drag.active, self.drag.node_idx) {
			(true, Some(idx)) => {
				self.layout.unpin(idx);
				self.layout.release_heat();
				(!self.drag.moved).then_some(idx)
			}
			_ => None,
		};
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	/// Pointer left the surface. Returns true when a hover was cleared.
	pub fn pointer_leave(&mut self) -> bool {
		if let Some(idx) = self.drag.node_idx {
			self.layout.unpin(idx);
			self.layout.release_heat();
		}
		self.drag = DragState::default();
		self.pan.active = false;
		let had_hover = self.hover.node.is_some();
		self.set_hover(None);
		had_hover
	}

	/// Zoom around the pointer. Horizontal-only scrolls leave the zoom alone.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if delta_y == 0.0 || delta_y.is_nan() {
			return;
		}
		let step = self.config().zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.transform.zoom_at(sx, sy, factor, self.layout.config());
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight for the fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover
				.neighbors
				.extend(self.layout.neighbors(idx).iter().copied());
		}
	}

	/// The hovered node or one of its direct neighbors.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn is_neighbor(&self, idx: usize) -> bool {
		self.hover.neighbors.contains(&idx) || self.hover.prev_neighbors.contains(&idx)
	}

	/// Edges incident to the hovered node. Self-loops never light up.
	pub fn is_edge_highlighted(&self, link: &Link) -> bool {
		!link.is_loop()
			&& [self.hover.node, self.hover.prev_node]
				.into_iter()
				.flatten()
				.any(|idx| link.touches(idx))
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Advance the layout (until it settles) and the hover fade.
	pub fn tick(&mut self, dt: f64) {
		if !self.layout.settled() {
			self.layout.tick();
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 6.0)
		} else {
			(0.0, 0.0, 4.5)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn show_labels(&mut self, show: bool) {
		if self.show_labels != show {
			self.show_labels = show;
			let reheat = self.config().alpha_reheat;
			self.layout.reheat(reheat);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		// Keep the graph origin at the same relative spot
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::types::{EdgeKind, GraphEdge, GraphNode, NodeKind};

	fn data() -> GraphData {
		let node = |id: &str| GraphNode {
			id: id.into(),
			name: id.into(),
			kind: NodeKind::Page,
			category: String::new(),
			description: None,
			size: 1.0,
			secondary_type: None,
			parent: None,
		};
		let edge = |s: &str, t: &str| GraphEdge {
			source: s.into(),
			target: t.into(),
			kind: EdgeKind::Reference,
			strength: 0.4,
			label: Some("links".into()),
		};
		// hub - a - far, hub - b, c isolated
		GraphData {
			nodes: ["hub", "a", "b", "far", "c"].into_iter().map(node).collect(),
			edges: vec![edge("hub", "a"), edge("b", "hub"), edge("a", "far"), edge("c", "ghost")],
		}
	}

	fn state() -> GraphViewState {
		GraphViewState::new(&data(), &GraphConfig::default(), 800.0, 600.0)
	}

	fn screen_pos(s: &GraphViewState, idx: usize) -> (f64, f64) {
		let (x, y) = s.layout.position(idx);
		(x * s.transform.k + s.transform.x, y * s.transform.k + s.transform.y)
	}

	#[test]
	fn hover_highlights_exactly_one_hop() {
		let mut s = state();
		s.set_hover(Some(0));
		let highlighted: Vec<usize> = (0..5).filter(|&i| s.is_highlighted(i)).collect();
		assert_eq!(highlighted, vec![0, 1, 2]);

		let lit: Vec<(usize, usize)> = s
			.layout
			.links()
			.iter()
			.filter(|l| s.is_edge_highlighted(l))
			.map(|l| (l.source, l.target))
			.collect();
		assert_eq!(lit, vec![(0, 1), (2, 0)]);
	}

	#[test]
	fn self_loop_is_never_highlighted() {
		let mut looped = data();
		looped.edges.push(GraphEdge {
			source: "hub".into(),
			target: "hub".into(),
			kind: EdgeKind::Direct,
			strength: 1.0,
			label: None,
		});
		let mut s = GraphViewState::new(&looped, &GraphConfig::default(), 800.0, 600.0);
		s.set_hover(Some(0));
		assert!(!s.hover.neighbors.contains(&0));
		let lit = s.layout.links().iter().filter(|l| s.is_edge_highlighted(l)).count();
		assert_eq!(lit, 2);
	}

	#[test]
	fn hover_moves_between_nodes() {
		let mut s = state();
		s.set_hover(Some(0));
		s.set_hover(Some(3));
		let highlighted: Vec<usize> = (0..5).filter(|&i| s.is_highlighted(i)).collect();
		assert_eq!(highlighted, vec![1, 3]);
		assert_eq!(s.hovered_id().as_deref(), Some("far"));
	}

	#[test]
	fn hover_fades_out_then_clears() {
		let mut s = state();
		s.set_hover(Some(0));
		for _ in 0..60 {
			s.tick(0.016);
		}
		assert!(s.hover.highlight_t > 0.5);
		s.set_hover(None);
		assert!(s.has_active_highlight());
		for _ in 0..200 {
			s.tick(0.016);
		}
		assert!(!s.has_active_highlight());
		assert!((0..5).all(|i| !s.is_highlighted(i)));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		let config = GraphConfig::default();
		for _ in 0..200 {
			s.wheel(10.0, 10.0, -1.0);
			assert!(s.transform.k <= config.max_zoom);
		}
		assert_eq!(s.transform.k, config.max_zoom);
		for _ in 0..400 {
			s.wheel(400.0, 300.0, 1.0);
			assert!(s.transform.k >= config.min_zoom);
		}
		assert_eq!(s.transform.k, config.min_zoom);
	}

	#[test]
	fn horizontal_scroll_keeps_zoom() {
		let mut s = state();
		let before = s.transform.clone();
		s.wheel(100.0, 100.0, 0.0);
		assert_eq!(s.transform, before);
	}

	#[test]
	fn inverted_zoom_bounds_still_clamp() {
		let config = GraphConfig {
			min_zoom: 5.0,
			max_zoom: 1.0,
			..GraphConfig::default()
		};
		let mut s = GraphViewState::new(&data(), &config, 800.0, 600.0);
		for _ in 0..50 {
			s.wheel(10.0, 10.0, -1.0);
		}
		assert_eq!(s.transform.k, 5.0);
		for _ in 0..50 {
			s.wheel(10.0, 10.0, 1.0);
		}
		assert_eq!(s.transform.k, 1.0);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut t = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 1.0,
		};
		let before = t.screen_to_graph(300.0, 200.0);
		t.zoom_at(300.0, 200.0, 2.0, &GraphConfig::default());
		let after = t.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn drag_pins_then_releases() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, 3);
		s.pointer_down(sx, sy);
		assert!(s.drag.active);
		assert!(s.layout.is_pinned(3));

		s.pointer_move(sx + 40.0, sy - 20.0);
		let (gx, gy) = s.layout.position(3);
		let (ex, ey) = s.transform.screen_to_graph(sx + 40.0, sy - 20.0);
		assert!((gx - ex).abs() < 1e-3 && (gy - ey).abs() < 1e-3);
		for _ in 0..10 {
			s.tick(0.016);
		}
		assert!(!s.layout.settled());

		assert_eq!(s.pointer_up(), None);
		assert!(!s.layout.is_pinned(3));
		assert!(!s.drag.active);
	}

	#[test]
	fn press_without_motion_is_click() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, 4);
		s.pointer_down(sx, sy);
		s.pointer_move(sx + 1.0, sy);
		assert_eq!(s.pointer_up(), Some(4));
	}

	#[test]
	fn background_press_pans() {
		let mut s = state();
		let right_edge = (0..5)
			.map(|i| s.layout.position(i).0 + s.layout.radius(i))
			.fold(f64::MIN, f64::max);
		let (px, py) = ((right_edge + 100.0) * s.transform.k + s.transform.x, 0.0);
		assert_eq!(s.node_at_position(px, py), None);
		s.pointer_down(px, py);
		assert!(s.pan.active);
		let (x0, y0) = (s.transform.x, s.transform.y);
		s.pointer_move(px + 20.0, py - 10.0);
		assert!((s.transform.x - (x0 + 20.0)).abs() < 1e-9);
		assert!((s.transform.y - (y0 - 10.0)).abs() < 1e-9);
		assert_eq!(s.pointer_up(), None);
		assert!(!s.pan.active);
	}

	#[test]
	fn leaving_clears_hover() {
		let mut s = state();
		let (sx, sy) = screen_pos(&s, 0);
		assert!(s.pointer_move(sx, sy));
		assert_eq!(s.hovered_id().as_deref(), Some("hub"));
		assert!(s.pointer_leave());
		assert_eq!(s.hovered_id(), None);
	}
}
