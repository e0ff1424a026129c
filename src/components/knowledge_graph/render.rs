use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::Link;
use super::scale::{edge_color, edge_width, with_alpha};
use super::state::GraphViewState;
use super::types::NodeKind;

const BACKGROUND: &str = "#1a1a2e";
const BASE_EDGE_ALPHA: f64 = 0.6;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	if state.layout.is_empty() {
		return;
	}
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: Option<(f64, f64)>) {
	let pattern = match segments {
		Some((dash, gap)) => js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn edge_alpha(state: &GraphViewState, link: &Link, t: f64) -> (bool, f64) {
	if !state.has_active_highlight() {
		return (false, BASE_EDGE_ALPHA);
	}
	if state.is_edge_highlighted(link) {
		(true, BASE_EDGE_ALPHA + (1.0 - BASE_EDGE_ALPHA) * t)
	} else {
		let dim = state.config().dim_alpha;
		(false, BASE_EDGE_ALPHA - (BASE_EDGE_ALPHA - dim) * t)
	}
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (k, config, nodes) = (state.transform.k, state.config(), state.layout.nodes());
	let arrow_size = 7.0 / k;
	let t = ease_out_cubic(state.hover.highlight_t);

	for link in state.layout.links() {
		if link.is_loop() {
			continue;
		}
		let ((x1, y1), (x2, y2)) = (
			state.layout.position(link.source),
			state.layout.position(link.target),
		);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		let (r1, r2) = (state.layout.radius(link.source), state.layout.radius(link.target));
		if dist < r1 + r2 + 0.001 {
			continue;
		}

		let (highlighted, alpha) = edge_alpha(state, link, t);
		let emphasis = if highlighted { 1.0 + 0.4 * t } else { 1.0 };
		let width = edge_width(link.strength, config) / k * emphasis;

		let (ux, uy) = (dx / dist, dy / dist);
		let (sx, sy) = (x1 + ux * r1, y1 + uy * r1);
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);

		let (source_color, target_color) = (nodes[link.source].color, nodes[link.target].color);
		let gradient = ctx.create_linear_gradient(sx, sy, tip_x, tip_y);
		let _ = gradient.add_color_stop(0.0, &with_alpha(source_color, alpha));
		let _ = gradient.add_color_stop(0.5, &with_alpha(edge_color(link.kind), alpha));
		let _ = gradient.add_color_stop(1.0, &with_alpha(target_color, alpha));
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width(width);
		set_dash(ctx, link.kind.is_dashed().then_some((6.0 / k, 4.0 / k)));

		ctx.begin_path();
		ctx.move_to(sx, sy);
		ctx.line_to(back_x, back_y);
		ctx.stroke();

		set_dash(ctx, None);
		ctx.set_fill_style_str(&with_alpha(target_color, alpha));
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if state.show_labels {
			if let Some(label) = &link.label {
				ctx.set_fill_style_str(&format!("rgba(220, 230, 255, {})", alpha));
				ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
				ctx.set_text_align("center");
				let _ = ctx.fill_text(label, (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 3.0 / k);
				ctx.set_text_align("start");
			}
		}
	}
	set_dash(ctx, None);
}

/// Circle for containers and pages, rounded rectangle for properties.
fn trace_shape(ctx: &CanvasRenderingContext2d, kind: NodeKind, x: f64, y: f64, r: f64) {
	ctx.begin_path();
	match kind {
		NodeKind::Container | NodeKind::Page => {
			let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		}
		NodeKind::Property => {
			let (w, h, corner) = (2.0 * r, 1.4 * r, 0.35 * r);
			let (left, top) = (x - r, y - h / 2.0);
			ctx.move_to(left + corner, top);
			let _ = ctx.arc_to(left + w, top, left + w, top + h, corner);
			let _ = ctx.arc_to(left + w, top + h, left, top + h, corner);
			let _ = ctx.arc_to(left, top + h, left, top, corner);
			let _ = ctx.arc_to(left, top, left + w, top, corner);
			ctx.close_path();
		}
	}
}

fn draw_node_body(
	state: &GraphViewState,
	ctx: &CanvasRenderingContext2d,
	idx: usize,
	radius: f64,
	label_alpha: f64,
) {
	let node = &state.layout.nodes()[idx];
	let (x, y) = state.layout.position(idx);
	let k = state.transform.k;

	trace_shape(ctx, node.kind, x, y, radius);
	ctx.set_fill_style_str(node.color);
	ctx.fill();
	if node.kind == NodeKind::Container {
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
		ctx.set_line_width(2.0 / k);
		ctx.stroke();
	}
	// Held by a drag
	if state.layout.is_pinned(idx) {
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.95)");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}

	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", label_alpha));
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(&node.name, x + radius + 3.0, y + 3.0);
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let dim = state.config().dim_alpha;

	for idx in 0..state.layout.node_count() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		let radius = state.layout.radius(idx);
		let (alpha, radius) = if has_highlight {
			(1.0 - (1.0 - dim) * t, radius * (1.0 - 0.15 * t))
		} else {
			(1.0, radius)
		};
		ctx.set_global_alpha(alpha);
		draw_node_body(state, ctx, idx, radius, 0.8);
		ctx.set_global_alpha(1.0);
	}

	if !has_highlight {
		return;
	}

	for idx in (0..state.layout.node_count()).filter(|&i| state.is_highlighted(i)) {
		let base = state.layout.radius(idx);
		let (x, y) = state.layout.position(idx);
		let is_hovered = state.is_hovered(idx);

		let (radius, glow_radius) = if is_hovered {
			(base * (1.0 + 0.35 * t), base * (1.8 + 1.2 * t))
		} else if state.is_neighbor(idx) {
			(base * (1.0 + 0.2 * t), base * (1.4 + 0.6 * t))
		} else {
			(base, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			let glow = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius);
			if let Ok(gradient) = glow {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let halo = format!("rgba(200, 220, 255, {})", alpha * 0.3);
				let _ = gradient.add_color_stop(0.6, &halo);
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		draw_node_body(state, ctx, idx, radius, 1.0);

		if is_hovered && t > 0.01 {
			trace_shape(ctx, state.layout.nodes()[idx].kind, x, y, radius + 2.0 / k);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
	}
}
