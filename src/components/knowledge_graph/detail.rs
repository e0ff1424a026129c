use leptos::prelude::*;

use super::scale::category_color;
use super::types::{GraphData, GraphNode};

#[component]
pub fn NodeDetails(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] hovered: Signal<Option<String>>,
) -> impl IntoView {
	let details = Memo::new(move |_| -> Option<(GraphNode, usize)> {
		let id = hovered.get()?;
		data.with(|d| -> Option<(GraphNode, usize)> {
			let node = d.node(&id)?.clone();
			Some((node, d.neighbors(&id).len()))
		})
	});

	move || {
		details.get().map(|(node, connections)| {
			let swatch = format!("background: {};", category_color(&node.category));
			let category = if node.category.is_empty() {
				"uncategorized".to_string()
			} else {
				node.category
			};
			view! {
				<aside class="node-details">
					<h2>{node.name}</h2>
					<p class="node-meta">
						<span class="legend-swatch legend-dot" style=swatch />
						{format!("{} · {}", node.kind.label(), category)}
					</p>
					{node.description.map(|text| view! { <p class="node-description">{text}</p> })}
					{node
						.secondary_type
						.map(|kind| view! { <p class="node-field">"Type: " {kind}</p> })}
					{node
						.parent
						.map(|parent| view! { <p class="node-field">"Parent: " {parent}</p> })}
					<p class="node-field">
						{format!(
							"{} connection{}",
							connections,
							if connections == 1 { "" } else { "s" },
						)}
					</p>
				</aside>
			}
		})
	}
}
