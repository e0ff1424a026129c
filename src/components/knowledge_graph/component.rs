use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::GraphConfig;
use super::error::GraphError;
use super::render;
use super::state::GraphViewState;
use super::types::GraphData;

const FRAME_DT: f64 = 0.016;
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// Size of the element hosting the canvas.
fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(FALLBACK_SIZE)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		.ok_or(GraphError::NoContext)
}

/// Drop the view state and the frame callback. The callback holds the slot
/// it lives in, so the cycle has to be cut by hand.
fn release_frame_loop<S, F>(state: &RefCell<Option<S>>, frame: &RefCell<Option<F>>) {
	state.borrow_mut().take();
	let _ = frame.borrow_mut().take();
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn KnowledgeGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] show_labels: Signal<bool>,
	#[prop(default = GraphConfig::default())] config: GraphConfig,
	#[prop(optional, into)] on_node_click: Option<Callback<String>>,
	#[prop(optional, into)] on_node_hover: Option<Callback<Option<String>>>,
	/// Receives the id of the hovered node.
	#[prop(optional)]
	hovered: Option<RwSignal<Option<String>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let alive = RwSignal::new(true);
	on_cleanup(move || {
		alive.try_set(false);
	});

	let publish_hover = move |id: Option<String>| {
		if let Some(hovered) = hovered {
			hovered.set(id.clone());
		}
		if let Some(cb) = on_node_hover {
			cb.run(id);
		}
	};

	// Rebuild the layout whenever the snapshot changes; the frame loop starts once.
	let (state_init, animate_init) = (state.clone(), animate.clone());
	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut next = GraphViewState::new(&snapshot, &config, w, h);
		next.show_labels = show_labels.get_untracked();
		debug!(
			"graph layout built: {} nodes, {} links",
			next.layout.node_count(),
			next.layout.links().len()
		);
		let had_hover = state_init
			.borrow()
			.as_ref()
			.is_some_and(|s| s.hover.node.is_some());
		*state_init.borrow_mut() = Some(next);
		if had_hover {
			publish_hover(None);
		}

		if animate_init.borrow().is_some() {
			return;
		}
		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("graph canvas disabled: {}", err);
				return;
			}
		};

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive.try_get_untracked().unwrap_or(false) {
				debug!("graph unmounted, stopping frame loop");
				release_frame_loop(&state_anim, &animate_inner);
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		match (animate_init.borrow().as_ref(), web_sys::window()) {
			(Some(cb), Some(window)) => {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
			_ => error!("graph canvas disabled: {}", GraphError::NoWindow),
		}
	});

	let state_labels = state.clone();
	Effect::new(move |_| {
		let show = show_labels.get();
		if let Some(ref mut s) = *state_labels.borrow_mut() {
			s.show_labels(show);
		}
	});

	let state_resize = state.clone();
	let resize_surface = move || {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		if let Some(ref mut s) = *state_resize.borrow_mut() {
			s.resize(w, h);
		}
	};
	let resize_on_fullscreen = resize_surface.clone();
	let resize_handle = window_event_listener(ev::resize, move |_| resize_surface());
	let fullscreen_handle =
		window_event_listener_untyped("fullscreenchange", move |_| resize_on_fullscreen());
	on_cleanup(move || {
		resize_handle.remove();
		fullscreen_handle.remove();
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let changed = match *state_mm.borrow_mut() {
			Some(ref mut s) => s.pointer_move(x, y).then(|| s.hovered_id()),
			None => None,
		};
		if let Some(id) = changed {
			publish_hover(id);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = match *state_mu.borrow_mut() {
			Some(ref mut s) => s
				.pointer_up()
				.and_then(|idx| s.node_id(idx).map(str::to_owned)),
			None => None,
		};
		if let (Some(id), Some(cb)) = (clicked, on_node_click) {
			debug!("node clicked: {}", id);
			cb.run(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let cleared = match *state_ml.borrow_mut() {
			Some(ref mut s) => s.pointer_leave(),
			None => false,
		};
		if cleared {
			publish_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	type Frame = Box<dyn FnMut()>;

	#[test]
	fn releasing_the_loop_breaks_the_self_reference() {
		let state = Rc::new(RefCell::new(Some(vec![1.0_f64; 8])));
		let frame: Rc<RefCell<Option<Frame>>> = Rc::new(RefCell::new(None));
		let (state_inner, frame_inner) = (state.clone(), frame.clone());
		*frame.borrow_mut() = Some(Box::new(move || {
			let _ = (&state_inner, &frame_inner);
		}));
		assert_eq!(Rc::strong_count(&frame), 2);
		assert_eq!(Rc::strong_count(&state), 2);

		release_frame_loop(&state, &frame);
		assert!(state.borrow().is_none());
		assert!(frame.borrow().is_none());
		assert_eq!(Rc::strong_count(&frame), 1);
		assert_eq!(Rc::strong_count(&state), 1);
	}
}
