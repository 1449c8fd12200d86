//! Leptos client-side app wiring and routes.

use leptos::ev;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, debug, info};

// Modules
pub mod board;
mod components;
pub mod config;
pub mod error;
mod pages;

use crate::board::permission::stored_actor;
use crate::config::BoardConfig;
// Top-Level pages
use crate::pages::board::BoardPage;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the case board and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = BoardConfig::load();
	info!("Board API at {}", config.api_base_url);

	// The signed-in user, refreshed when another tab logs in or out.
	let actor = RwSignal::new(stored_actor(&config.user_storage_key));
	let user_key = config.user_storage_key.clone();
	let _ = window_event_listener(ev::storage, move |ev| {
		if ev.key().is_none_or(|key| key == user_key) {
			debug!("Stored user changed; re-reading actor");
			actor.set(stored_actor(&user_key));
		}
	});
	provide_context(actor);
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Investigation Board" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/cases/:case_id/board") view=BoardPage />
			</Routes>
		</Router>
	}
}
