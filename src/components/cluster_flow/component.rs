use leptos::callback::{Callable, Callback};
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent};

use super::hit_test::FlowInteraction;
use super::render;
use super::scale::{ChartMargins, ChartScales};
use super::stack::StackedChart;
use super::types::{FlowEvent, FlowSnapshot};
use crate::components::canvas;
use crate::components::lifecycle::Mounted;

fn measure(canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or(400.0),
	)
}

/// Stacked daily paper counts per cluster, with a hover tooltip and
/// click-to-select bands.
#[component]
pub fn ClusterFlowChart(
	#[prop(into)] data: Signal<FlowSnapshot>,
	#[prop(optional)] margins: Option<ChartMargins>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_event: Option<Callback<FlowEvent>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let margins = margins.unwrap_or_default();
	let chart = Memo::new(move |_| data.with(StackedChart::build));
	let interaction = RwSignal::new(FlowInteraction::default());
	// tracked apart from the interaction so the tooltip can follow without a repaint
	let pointer = RwSignal::new((0.0, 0.0));
	let size = RwSignal::new((width.unwrap_or(800.0), height.unwrap_or(400.0)));
	let mounted = Mounted::default();
	mounted.release_on_cleanup();

	let scales = move || {
		let (w, h) = size.get_untracked();
		chart.with_untracked(|c| ChartScales::new(w, h, margins, c.days.len(), c.max_total))
	};
	let emit = move |event: Option<FlowEvent>| {
		if let (Some(cb), Some(event)) = (on_event, event) {
			cb.run(event);
		}
	};

	// a new series invalidates hover and selection
	Effect::new(move |_| {
		data.track();
		interaction.update(FlowInteraction::reset);
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		size.set(measure(&canvas, width, height));
		if mounted.has_listeners() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let closure = Closure::<dyn FnMut()>::new(move || {
			if let Some(canvas) = canvas_ref.get_untracked() {
				let canvas: HtmlCanvasElement = canvas.into();
				let next = measure(&canvas, width, height);
				if next != size.get_untracked() {
					size.set(next);
				}
			}
		});
		mounted.listen(&window, "resize", closure);
	});

	// repaint only when the series, the size or the interaction changes
	Effect::new(move |_| {
		let (w, h) = size.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let ctx = match canvas::context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("cluster flow disabled: {err}");
				return;
			}
		};
		let scene = data.with(|snapshot| {
			chart.with(|chart| {
				let scales = ChartScales::new(w, h, margins, chart.days.len(), chart.max_total);
				interaction.with(|state| render::render(snapshot, chart, &scales, state, w, h))
			})
		});
		debug!("flow chart repaint: {} commands", scene.commands.len());
		canvas::paint(&scene, &ctx);
	});

	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let rect = canvas.get_bounding_client_rect();
		let (px, py) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		let scales = scales();
		let mut event = None;
		data.with_untracked(|snapshot| {
			chart.with_untracked(|chart| {
				let mut state = interaction.get_untracked();
				event = state.pointer_move(chart, snapshot, &scales, px, py);
				if event.is_some() {
					interaction.set(state);
				}
			})
		});
		pointer.set((px, py));
		emit(event);
	};

	let on_mouseleave = move |_: MouseEvent| {
		let mut state = interaction.get_untracked();
		let event = state.pointer_leave();
		if event.is_some() {
			interaction.set(state);
		}
		emit(event);
	};

	let on_click = move |_: MouseEvent| {
		let mut state = interaction.get_untracked();
		let event = state.click();
		if event.is_some() {
			interaction.set(state);
		}
		emit(event);
	};

	view! {
		<div class="cluster-flow" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="cluster-flow-canvas"
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				on:click=on_click
				style="display: block; cursor: pointer;"
			/>
			{move || {
				let (px, py) = pointer.get();
				interaction
					.with(|state| state.tooltip.clone())
					.map(|tip| {
						let style = format!(
							"position: absolute; left: {}px; top: {}px; pointer-events: none;",
							px + 12.0,
							py + 12.0,
						);
						let swatch = format!("background: {}", tip.color);
						view! {
							<div class="flow-tooltip" style=style>
								<span class="legend-swatch" style=swatch></span>
								<strong>{tip.cluster}</strong>
								<div>{render::format_day(&tip.date)}</div>
								<div>
									{tip.count} " of " {tip.total} " papers (" {tip.percentage} "%)"
								</div>
							</div>
						}
					})
			}}
		</div>
	}
}
