//! Canvas views for a research-paper cluster map: a force-directed graph of
//! topic clusters and a stacked daily flow chart, wired into a Leptos CSR app.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod error;
mod pages;

pub use components::cluster_flow::{
	ChartMargins, ClusterFlowChart, DailyClusterCounts, FlowEvent, FlowSnapshot, Tooltip,
};
pub use components::cluster_graph::{
	ClusterGraphCanvas, ClusterGraphSnapshot, ClusterLink, ClusterNode, GraphEvent, LayoutConfig,
	cluster_color,
};
pub use error::VizError;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the cluster map and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Paper Cluster Map" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
