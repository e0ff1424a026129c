//! Visual scales: colors, widths and sizes derived from graph data.

use super::config::GraphConfig;
use super::types::{EdgeKind, NodeKind};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Categories with a fixed color; everything else is hashed into `COLORS`.
const KNOWN_CATEGORIES: &[(&str, &str)] = &[
	("database", "#4f8cff"),
	("project", "#ff9f43"),
	("task", "#2ecc71"),
	("note", "#a66bff"),
	("person", "#ff6b81"),
	("document", "#17becf"),
	("property", "#8395a7"),
];

pub fn category_color(category: &str) -> &'static str {
	let key = category.trim().to_lowercase();
	if key.is_empty() {
		return COLORS[0];
	}
	if let Some((_, color)) = KNOWN_CATEGORIES.iter().find(|(name, _)| *name == key) {
		return *color;
	}
	COLORS[(fnv1a(&key) % COLORS.len() as u64) as usize]
}

fn fnv1a(s: &str) -> u64 {
	s.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
		(hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
	})
}

pub fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Container => "#4f8cff",
		NodeKind::Page => "#2ecc71",
		NodeKind::Property => "#8395a7",
	}
}

pub fn edge_color(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::Direct => "#64b4ff",
		EdgeKind::Reference => "#ffb86c",
		EdgeKind::Dependency => "#ff6b6b",
		EdgeKind::Containment => "#9aa5b1",
	}
}

/// Line width for a strength; never decreases as strength grows.
pub fn edge_width(strength: f64, config: &GraphConfig) -> f64 {
	let s = if strength.is_finite() {
		strength.clamp(0.0, 1.0)
	} else {
		0.0
	};
	config.min_edge_width + (config.max_edge_width - config.min_edge_width).max(0.0) * s
}

/// Target layout distance; stronger edges pull their endpoints closer.
pub fn link_distance(kind: EdgeKind, strength: f64, config: &GraphConfig) -> f64 {
	config.base_distance(kind) * (1.5 - strength.clamp(0.0, 1.0))
}

pub fn node_radius(size: f64, config: &GraphConfig) -> f64 {
	(config.node_scale * size.max(0.0).sqrt()).max(config.min_node_radius)
}

/// `#rrggbb` to `rgba(r, g, b, a)`.
pub fn with_alpha(hex: &str, alpha: f64) -> String {
	let digits = hex.trim_start_matches('#');
	let channel = |i: usize| {
		digits
			.get(i..i + 2)
			.and_then(|c| u8::from_str_radix(c, 16).ok())
			.unwrap_or(255)
	};
	format!(
		"rgba({}, {}, {}, {})",
		channel(0),
		channel(2),
		channel(4),
		alpha.clamp(0.0, 1.0)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn category_color_is_stable() {
		assert_eq!(category_color("Reading List"), category_color("reading list"));
		assert_eq!(category_color("database"), "#4f8cff");
		assert_eq!(category_color(""), COLORS[0]);
		assert!(COLORS.contains(&category_color("something-unusual")));
	}

	#[test]
	fn edge_width_is_monotonic() {
		let config = GraphConfig::default();
		let mut last = f64::MIN;
		for step in -10..=30 {
			let w = edge_width(step as f64 / 20.0, &config);
			assert!(w >= last, "width dropped at step {step}");
			last = w;
		}
		assert_eq!(edge_width(0.0, &config), config.min_edge_width);
		assert_eq!(edge_width(1.0, &config), config.max_edge_width);
		assert_eq!(edge_width(f64::NAN, &config), config.min_edge_width);
	}

	#[test]
	fn stronger_links_are_shorter() {
		let config = GraphConfig::default();
		for kind in EdgeKind::ALL {
			assert!(link_distance(kind, 1.0, &config) < link_distance(kind, 0.0, &config));
		}
	}

	#[test]
	fn radius_has_floor() {
		let config = GraphConfig::default();
		assert_eq!(node_radius(0.0, &config), config.min_node_radius);
		assert!(node_radius(4.0, &config) > node_radius(1.0, &config));
	}

	#[test]
	fn alpha_colors() {
		assert_eq!(with_alpha("#ff7f0e", 0.5), "rgba(255, 127, 14, 0.5)");
		assert_eq!(with_alpha("#ff7f0e", 2.0), "rgba(255, 127, 14, 1)");
	}
}
