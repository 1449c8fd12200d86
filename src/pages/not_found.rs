use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Board not found"</h1>
			<p>"Open a board from a case: /cases/<case id>/board"</p>
		</div>
	}
}
