//! Side panel for the selected connection: relationship and notes.

use leptos::prelude::*;

use crate::board::model::{Edge, Relationship};
use crate::board::store::BoardIntent;

#[component]
pub fn EdgeInspector(
	#[prop(into)] edge: Signal<Option<Edge>>,
	#[prop(into)] read_only: Signal<bool>,
	on_intent: Callback<BoardIntent>,
	on_close: Callback<()>,
) -> impl IntoView {
	move || {
		edge.get().map(|edge| {
			let Edge { id, source, target, data, .. } = edge;
			let current = data.relationship;
			let notes = data.notes.clone().unwrap_or_default();

			let (id_rel, notes_rel) = (id.clone(), data.notes.clone());
			let on_relationship = move |ev| {
				on_intent.run(BoardIntent::RelabelEdge {
					id: id_rel.clone(),
					relationship: Relationship::parse(&event_target_value(&ev)),
					notes: notes_rel.clone(),
				})
			};
			let id_notes = id.clone();
			let on_notes = move |ev| {
				on_intent.run(BoardIntent::RelabelEdge {
					id: id_notes.clone(),
					relationship: current,
					notes: Some(event_target_value(&ev)),
				})
			};
			let on_delete = move |_| {
				on_intent.run(BoardIntent::RemoveEdge(id.clone()));
				on_close.run(());
			};

			let options = Relationship::ALL
				.into_iter()
				.map(|r| {
					view! {
						<option value=r.as_str() selected=r == current>
							{r.label()}
						</option>
					}
				})
				.collect_view();

			view! {
				<div class="edge-inspector">
					<h3>"Connection"</h3>
					<p class="edge-endpoints">{source} " → " {target}</p>
					<label>
						"Relationship"
						<select on:change=on_relationship disabled=move || read_only.get()>
							{options}
						</select>
					</label>
					<label>
						"Notes"
						<textarea prop:value=notes on:change=on_notes disabled=move || read_only.get() />
					</label>
					<div class="edge-actions">
						<button on:click=on_delete disabled=move || read_only.get()>
							"Delete"
						</button>
						<button on:click=move |_| on_close.run(())>"Close"</button>
					</div>
				</div>
			}
		})
	}
}
