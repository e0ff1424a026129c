use js_sys::Promise;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::error::GraphError;
use super::scale::{edge_color, kind_color};
use super::types::{EdgeKind, NodeKind};

// The web-sys bindings drop the promises these return.
#[wasm_bindgen]
extern "C" {
	type FullscreenElement;
	type FullscreenDocument;

	#[wasm_bindgen(method, catch, js_name = requestFullscreen)]
	fn request_fullscreen_promise(this: &FullscreenElement) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, js_name = exitFullscreen)]
	fn exit_fullscreen_promise(this: &FullscreenDocument) -> Result<JsValue, JsValue>;
}

/// Logs a rejected fullscreen request.
pub type RejectHandler = Closure<dyn FnMut(JsValue)>;

fn reject_handler() -> RejectHandler {
	Closure::new(|err: JsValue| warn!("{}", GraphError::fullscreen(err)))
}

/// Whether the document currently has a fullscreen element.
#[derive(Clone, Copy)]
pub struct FullscreenState {
	pub is_fullscreen: RwSignal<bool>,
}

fn document_is_fullscreen() -> bool {
	web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.fullscreen_element())
		.is_some()
}

/// Track `fullscreenchange` for the lifetime of the calling component.
pub fn use_fullscreen() -> FullscreenState {
	let is_fullscreen = RwSignal::new(document_is_fullscreen());
	let change = window_event_listener_untyped("fullscreenchange", move |_| {
		let now = document_is_fullscreen();
		debug!("fullscreen changed: {}", now);
		is_fullscreen.set(now);
	});
	let refused = window_event_listener_untyped("fullscreenerror", move |_| {
		warn!("{}", GraphError::Fullscreen("refused by the browser".into()));
		is_fullscreen.set(document_is_fullscreen());
	});
	on_cleanup(move || {
		change.remove();
		refused.remove();
	});
	FullscreenState { is_fullscreen }
}

fn catch_rejection(
	result: Result<JsValue, JsValue>,
	on_reject: &RejectHandler,
) -> Result<(), GraphError> {
	// Older engines return undefined instead of a promise.
	if let Ok(promise) = result.map_err(GraphError::fullscreen)?.dyn_into::<Promise>() {
		let _ = promise.catch(on_reject);
	}
	Ok(())
}

/// Enter fullscreen on `target`, or leave it if something is already
/// fullscreen. Synchronous failures are returned; a rejected promise goes to
/// `on_reject`.
pub fn toggle_fullscreen(target: &Element, on_reject: &RejectHandler) -> Result<(), GraphError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(GraphError::NoWindow)?;
	if document.fullscreen_element().is_some() {
		return catch_rejection(document.unchecked_ref::<FullscreenDocument>().exit_fullscreen_promise(), on_reject);
	}
	catch_rejection(target.unchecked_ref::<FullscreenElement>().request_fullscreen_promise(), on_reject)
}

#[component]
pub fn Legend(
	/// Element that goes fullscreen.
	target: NodeRef<leptos::html::Div>,
) -> impl IntoView {
	let fullscreen = use_fullscreen();
	let on_reject = StoredValue::new_local(reject_handler());
	let on_toggle = move |_| {
		let Some(el) = target.get_untracked() else {
			return;
		};
		let result = on_reject.with_value(|handler| toggle_fullscreen(el.as_ref(), handler));
		if let Err(err) = result {
			warn!("{}", err);
		}
	};

	view! {
		<aside class="graph-legend">
			<h3>"Nodes"</h3>
			<ul>
				{NodeKind::ALL
					.into_iter()
					.map(|kind| {
						let shape = if kind == NodeKind::Property {
							"legend-swatch legend-rect"
						} else {
							"legend-swatch legend-dot"
						};
						view! {
							<li>
								<span
									class=shape
									style=format!("background: {};", kind_color(kind))
								/>
								{kind.label()}
							</li>
						}
					})
					.collect_view()}
			</ul>
			<h3>"Links"</h3>
			<ul>
				{EdgeKind::ALL
					.into_iter()
					.map(|kind| {
						let style = format!(
							"border-top: 2px {} {};",
							if kind.is_dashed() { "dashed" } else { "solid" },
							edge_color(kind),
						);
						view! {
							<li>
								<span class="legend-line" style=style />
								{kind.label()}
							</li>
						}
					})
					.collect_view()}
			</ul>
			<button class="fullscreen-toggle" on:click=on_toggle>
				{move || {
					if fullscreen.is_fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }
				}}
			</button>
		</aside>
	}
}
