use super::types::{EdgeKind, NodeKind};

/// Tunables for the layout simulation and the view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	// Cooling schedule.
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub alpha_reheat: f64,
	/// Ticks run synchronously when a layout is built.
	pub warmup_ticks: usize,
	pub tick_dt: f64,

	// Forces.
	pub charge: f64,
	/// Node mass before the per-kind multiplier; repulsion scales with it.
	pub mass_base: f64,
	pub mass_container: f64,
	pub mass_page: f64,
	pub mass_property: f64,
	pub spring: f64,
	pub force_max: f64,
	pub node_speed: f64,
	pub velocity_damping: f64,
	pub distance_direct: f64,
	pub distance_reference: f64,
	pub distance_dependency: f64,
	pub distance_containment: f64,
	pub center_strength: f64,
	pub collide_padding: f64,
	pub collide_strength: f64,

	// View.
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub zoom_step: f64,
	pub node_scale: f64,
	pub min_node_radius: f64,
	pub hit_radius: f64,
	pub min_edge_width: f64,
	pub max_edge_width: f64,
	pub click_tolerance: f64,
	pub dim_alpha: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_reheat: 0.3,
			warmup_ticks: 30,
			tick_dt: 0.016,

			charge: 150.0,
			mass_base: 10.0,
			mass_container: 3.0,
			mass_page: 2.0,
			mass_property: 1.0,
			spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			velocity_damping: 0.9,
			distance_direct: 80.0,
			distance_reference: 120.0,
			distance_dependency: 100.0,
			distance_containment: 60.0,
			center_strength: 0.05,
			collide_padding: 4.0,
			collide_strength: 0.7,

			min_zoom: 0.1,
			max_zoom: 4.0,
			zoom_step: 1.1,
			node_scale: 8.0,
			min_node_radius: 4.0,
			hit_radius: 8.0,
			min_edge_width: 0.75,
			max_edge_width: 4.0,
			click_tolerance: 3.0,
			dim_alpha: 0.15,
		}
	}
}

impl GraphConfig {
	/// Simulation mass for a node kind.
	pub fn mass(&self, kind: NodeKind) -> f64 {
		self.mass_base
			* match kind {
				NodeKind::Container => self.mass_container,
				NodeKind::Page => self.mass_page,
				NodeKind::Property => self.mass_property,
			}
	}

	/// Rest length for an edge kind before strength is applied.
	pub fn base_distance(&self, kind: EdgeKind) -> f64 {
		match kind {
			EdgeKind::Direct => self.distance_direct,
			EdgeKind::Reference => self.distance_reference,
			EdgeKind::Dependency => self.distance_dependency,
			EdgeKind::Containment => self.distance_containment,
		}
	}

	/// Clamp a zoom scale into the configured range. Inverted bounds are
	/// swapped rather than trusted.
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		let (lo, hi) = (
			self.min_zoom.min(self.max_zoom),
			self.min_zoom.max(self.max_zoom),
		);
		if k.is_nan() || lo.is_nan() {
			return lo;
		}
		k.clamp(lo, hi)
	}
}
