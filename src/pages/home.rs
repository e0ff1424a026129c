use leptos::prelude::*;

use crate::components::knowledge_graph::{KnowledgeGraph, Legend, NodeDetails};
use crate::data::sample_graph;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = RwSignal::new(sample_graph());
	let show_labels = RwSignal::new(false);
	let hovered = RwSignal::new(None::<String>);
	let selected = RwSignal::new(None::<String>);
	let shell = NodeRef::<leptos::html::Div>::new();

	let on_node_click = Callback::new(move |id: String| selected.set(Some(id)));
	let selected_name = move || -> Option<String> {
		let id = selected.get()?;
		graph_data.with(|d| d.node(&id).map(|n| n.name.clone()))
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph" node_ref=shell>
				<KnowledgeGraph
					data=graph_data
					show_labels=show_labels
					hovered=hovered
					on_node_click=on_node_click
				/>
				<div class="graph-overlay">
					<h1>"Workspace Graph"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Scroll to zoom. Drag background to pan."
					</p>
					<label class="label-toggle">
						<input
							type="checkbox"
							prop:checked=move || show_labels.get()
							on:change=move |ev| show_labels.set(event_target_checked(&ev))
						/>
						"Show link labels"
					</label>
					{move || {
						selected_name()
							.map(|name| view! { <p class="selected">"Selected: " {name}</p> })
					}}
				</div>
				<Legend target=shell />
				<NodeDetails data=graph_data hovered=hovered />
			</div>
		</ErrorBoundary>
	}
}
