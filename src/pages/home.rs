use std::collections::{BTreeMap, BTreeSet};

use leptos::callback::Callback;
use leptos::prelude::*;
use log::info;

use crate::components::cluster_flow::{ClusterFlowChart, DailyClusterCounts, FlowEvent, FlowSnapshot};
use crate::components::cluster_graph::{
	ClusterGraphCanvas, ClusterGraphSnapshot, ClusterLink, ClusterNode, GraphEvent, cluster_color,
};

const SAMPLE_CLUSTERS: &[(&str, &str)] = &[
	("benchmark-evaluation", "Benchmark & Evaluation"),
	("dataset-data-curation", "Dataset & Data Curation"),
	("architecture-model-design", "Architecture & Model Design"),
	("training-scaling-optimization", "Training, Scaling & Optimization"),
	("post-training-alignment", "Post-training & Alignment"),
	("reasoning-inference", "Reasoning & Inference"),
	("agents-tool-use", "Agents & Tool Use"),
	("multimodal-learning", "Multimodal Learning"),
	("rag-retrieval-memory", "RAG, Retrieval & Memory"),
	("safety-interpretability", "Safety & Interpretability"),
	("efficiency-systems", "Efficiency & Systems"),
	("survey-tutorial", "Survey & Tutorial"),
];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Clusters with random paper sets; links wherever two sets overlap.
fn generate_sample_graph() -> ClusterGraphSnapshot {
	let nodes: Vec<ClusterNode> = SAMPLE_CLUSTERS
		.iter()
		.enumerate()
		.map(|(i, (id, name))| {
			let paper_ids: BTreeSet<String> = (0..120)
				.filter(|p| rand_simple(i * 977 + p * 13) < 0.08 + 0.02 * (i % 5) as f64)
				.map(|p| format!("2501.{:05}", p))
				.collect();
			ClusterNode {
				id: id.to_string(),
				name: name.to_string(),
				paper_count: paper_ids.len() as u32,
				top_task_tags: vec!["question-answering".into(), "code-generation".into()],
				top_modalities: vec!["text".into()],
				paper_ids,
			}
		})
		.collect();

	let mut links = Vec::new();
	for (i, a) in nodes.iter().enumerate() {
		for b in &nodes[i + 1..] {
			let shared: BTreeSet<String> = a.paper_ids.intersection(&b.paper_ids).cloned().collect();
			if !shared.is_empty() {
				links.push(ClusterLink {
					source: a.id.clone(),
					target: b.id.clone(),
					shared_count: shared.len() as u32,
					shared_paper_ids: shared,
				});
			}
		}
	}
	ClusterGraphSnapshot { nodes, links }
}

/// A month of daily paper counts for the first few clusters.
fn generate_sample_flow(days: usize) -> FlowSnapshot {
	let clusters: Vec<String> = SAMPLE_CLUSTERS
		.iter()
		.take(8)
		.map(|(id, _)| id.to_string())
		.collect();
	let colors = clusters
		.iter()
		.map(|id| (id.clone(), cluster_color(id).to_string()))
		.collect();
	let daily_data: Vec<DailyClusterCounts> = (0..days)
		.map(|day| DailyClusterCounts {
			date: format!("2025-01-{:02}", day + 1),
			cluster_counts: clusters
				.iter()
				.enumerate()
				.map(|(c, id)| (id.clone(), (rand_simple(day * 31 + c * 7) * 9.0) as u32))
				.collect::<BTreeMap<_, _>>(),
		})
		.collect();
	FlowSnapshot {
		start_date: daily_data.first().map(|d| d.date.clone()).unwrap_or_default(),
		end_date: daily_data.last().map(|d| d.date.clone()).unwrap_or_default(),
		clusters,
		colors,
		daily_data,
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(generate_sample_graph);
	let flow_data = Signal::derive(move || generate_sample_flow(30));

	let picked = RwSignal::new(None::<ClusterNode>);
	let flow_status = RwSignal::new(String::from("Hover a band for details."));

	let on_graph_event = Callback::new(move |event: GraphEvent| match event {
		GraphEvent::NodeSelected(node) => {
			info!("cluster selected: {}", node.id);
			picked.set(Some(node));
		}
		GraphEvent::HoverChanged(_) => {}
	});
	let on_flow_event = Callback::new(move |event: FlowEvent| match event {
		FlowEvent::ClusterSelected {
			cluster,
			date,
			selected,
		} => {
			let verb = if selected { "Selected" } else { "Cleared" };
			flow_status.set(format!("{verb} {cluster} on {date}"));
		}
		FlowEvent::HoverChanged(Some(tip)) => {
			flow_status.set(format!("{}: {} papers on {}", tip.cluster, tip.count, tip.date));
		}
		FlowEvent::HoverChanged(None) => {}
	});

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

			<div class="cluster-map">
				<ClusterGraphCanvas data=graph_data height=Some(520.0) on_event=on_graph_event />
				<aside class="cluster-details">
					{move || match picked.get() {
						Some(node) => {
							view! {
								<h2>{node.name}</h2>
								<p>{node.paper_count} " papers"</p>
								<p class="tags">{node.top_task_tags.join(", ")}</p>
							}
								.into_any()
						}
						None => view! { <p>"Click a cluster to inspect it."</p> }.into_any(),
					}}
				</aside>
			</div>
			<div class="cluster-timeline">
				<h2>"Papers per day"</h2>
				<ClusterFlowChart data=flow_data height=Some(320.0) on_event=on_flow_event />
				<p class="subtitle">{move || flow_status.get()}</p>
			</div>
		</ErrorBoundary>
	}
}
