use std::cell::RefCell;
use std::rc::Rc;

use leptos::callback::{Callable, Callback};
use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::hit_buffer::HitBuffer;
use super::interaction::InteractionController;
use super::render::{self, cluster_color};
use super::state::{GraphLayoutEngine, LayoutConfig};
use super::types::{ClusterGraphSnapshot, GraphEvent};
use crate::components::canvas;
use crate::components::fullscreen;
use crate::components::lifecycle::Mounted;

/// A settled, untouched view keeps its last paint. The tick that settles the
/// layout still moved it.
fn needs_repaint(moving: bool, was_moving: bool, dirty: bool) -> bool {
	moving || was_moving || dirty
}

/// Everything one graph view owns between frames.
struct GraphView {
	engine: GraphLayoutEngine,
	controller: InteractionController,
	hits: HitBuffer,
	last_frame: Option<f64>,
	/// Layout was moving on the previous frame.
	was_moving: bool,
	/// Something other than the layout changed since the last paint.
	dirty: bool,
}

impl GraphView {
	fn draw(&mut self, ctx: &CanvasRenderingContext2d) {
		let frame = self.engine.frame();
		let highlight = self.controller.highlight();
		let scene = render::render(
			&frame,
			&highlight,
			&self.controller.transform,
			self.engine.width,
			self.engine.height,
		);
		render::paint_hit_areas(&frame, &highlight, &self.controller.transform, &mut self.hits);
		canvas::paint(&scene, ctx);
		self.dirty = false;
	}

	/// Advance the layout one frame and repaint only if anything changed.
	fn frame(&mut self, now: f64, ctx: &CanvasRenderingContext2d) {
		let dt = self
			.last_frame
			.map_or(0.016, |last| ((now - last) / 1000.0).clamp(0.0, 0.1));
		self.last_frame = Some(now);
		let moving = self.engine.tick(dt);
		let was_moving = std::mem::replace(&mut self.was_moving, moving);
		if needs_repaint(moving, was_moving, self.dirty) {
			self.draw(ctx);
		}
	}

	/// Match the canvas to its container (or the screen when fullscreen).
	fn fit(&mut self, canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) {
		let (w, h) = measure(
			canvas,
			width,
			height,
			self.controller.fullscreen.is_fullscreen(),
		);
		if (w, h) == (self.engine.width, self.engine.height) {
			return;
		}
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		self.engine.resize(w, h);
		self.hits.resize(w, h);
		self.dirty = true;
	}
}

fn measure(
	canvas: &HtmlCanvasElement,
	width: Option<f64>,
	height: Option<f64>,
	fullscreen: bool,
) -> (f64, f64) {
	if fullscreen {
		let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
		let window = web_sys::window();
		let size = window
			.as_ref()
			.map(|w| (inner(w.inner_width()), inner(w.inner_height())));
		if let Some((Some(w), Some(h))) = size {
			return (w, h);
		}
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn pointer_position(ev: &MouseEvent, canvas: &HtmlCanvasElement) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Force-directed map of clusters with a legend and a fullscreen toggle.
///
/// A new `data` value replaces the layout. Hover, selection and legend picks
/// are reported through `on_event`.
#[component]
pub fn ClusterGraphCanvas(
	#[prop(into)] data: Signal<ClusterGraphSnapshot>,
	#[prop(optional)] config: Option<LayoutConfig>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let state: Rc<RefCell<Option<GraphView>>> = Rc::new(RefCell::new(None));
	let mounted = Mounted::default();
	mounted.release_on_cleanup();

	// mirrors of controller state for the legend and the fullscreen button
	let hovered = RwSignal::new(None::<String>);
	let selected = RwSignal::new(None::<String>);
	let is_fullscreen = RwSignal::new(false);
	// legend intents, applied to the controller by the effects below
	let legend_hover = RwSignal::new(None::<String>);
	let legend_pick = RwSignal::new(None::<String>);

	let sync = move |controller: &InteractionController| {
		let (h, s) = (
			controller.hovered().map(str::to_string),
			controller.selected().map(str::to_string),
		);
		if hovered.get_untracked() != h {
			hovered.set(h);
		}
		if selected.get_untracked() != s {
			selected.set(s);
		}
	};
	let emit = move |events: Vec<GraphEvent>| {
		if let Some(cb) = on_event {
			for event in events {
				cb.run(event);
			}
		}
	};

	let (state_init, mounted_init) = (state.clone(), mounted.clone());
	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		{
			let mut guard = state_init.borrow_mut();
			match guard.as_mut() {
				Some(view) => {
					view.engine.load(&snapshot);
					view.controller.reset();
					view.dirty = true;
				}
				None => {
					let (w, h) = measure(&canvas, width, height, false);
					canvas.set_width(w as u32);
					canvas.set_height(h as u32);
					let mut engine =
						GraphLayoutEngine::new(config.clone().unwrap_or_default(), w, h);
					engine.load(&snapshot);
					*guard = Some(GraphView {
						engine,
						controller: InteractionController::default(),
						hits: HitBuffer::new(w, h),
						last_frame: None,
						was_moving: false,
						dirty: true,
					});
				}
			}
		}
		hovered.set(None);
		selected.set(None);

		if mounted_init.animation.is_started() {
			return;
		}
		let ctx = match canvas::context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("cluster graph disabled: {err}");
				return;
			}
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		let on_resize = Closure::<dyn FnMut()>::new(move || {
			if let Some(ref mut view) = *state_resize.borrow_mut() {
				view.fit(&canvas_resize, width, height);
			}
		});
		mounted_init.listen(&window, "resize", on_resize);

		if let Some(document) = window.document() {
			let (state_fs, canvas_fs) = (state_init.clone(), canvas.clone());
			let doc = document.clone();
			let on_change = Closure::<dyn FnMut()>::new(move || {
				let Some(container) = container_ref.get_untracked() else {
					return;
				};
				if let Some(ref mut view) = *state_fs.borrow_mut() {
					view.controller
						.fullscreen
						.reconcile(fullscreen::platform_fullscreen(&doc, &container));
					is_fullscreen.set(view.controller.fullscreen.is_fullscreen());
					view.fit(&canvas_fs, width, height);
				}
			});
			mounted_init.listen(&document, "fullscreenchange", on_change);

			let state_err = state_init.clone();
			let on_error = Closure::<dyn FnMut()>::new(move || {
				if let Some(ref mut view) = *state_err.borrow_mut() {
					warn!("fullscreen request failed");
					view.controller.fullscreen.request_failed();
					view.dirty = true;
					is_fullscreen.set(false);
				}
			});
			mounted_init.listen(&document, "fullscreenerror", on_error);
		}

		let state_anim = state_init.clone();
		mounted_init.animation.start(move |now: f64| {
			if let Some(ref mut view) = *state_anim.borrow_mut() {
				let document = web_sys::window().and_then(|w| w.document());
				if let (Some(document), Some(container)) = (document, container_ref.get_untracked()) {
					let platform = fullscreen::platform_fullscreen(&document, &container);
					if view.controller.fullscreen.reconcile(platform) {
						is_fullscreen.set(view.controller.fullscreen.is_fullscreen());
						view.dirty = true;
					}
				}
				view.frame(now, &ctx);
			}
		});
	});

	let state_hover = state.clone();
	Effect::new(move |_| {
		let id = legend_hover.get();
		let events = match *state_hover.borrow_mut() {
			Some(ref mut view) => {
				view.controller.legend_hover(id.as_deref(), &view.engine);
				sync(&view.controller);
				view.dirty = true;
				view.controller.drain_events()
			}
			None => return,
		};
		emit(events);
	});

	let state_pick = state.clone();
	Effect::new(move |_| {
		let Some(id) = legend_pick.get() else {
			return;
		};
		let events = match *state_pick.borrow_mut() {
			Some(ref mut view) => {
				view.controller.legend_click(&id, &view.engine);
				sync(&view.controller);
				view.dirty = true;
				view.controller.drain_events()
			}
			None => return,
		};
		emit(events);
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&ev, &canvas);
		if let Some(ref mut view) = *state_md.borrow_mut() {
			view.controller.pointer_down(x, y, &view.engine, &view.hits);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&ev, &canvas);
		let events = match *state_mm.borrow_mut() {
			Some(ref mut view) => {
				let GraphView {
					engine,
					controller,
					hits,
					dirty,
					..
				} = view;
				controller.pointer_move(x, y, engine, hits);
				sync(controller);
				*dirty = true;
				controller.drain_events()
			}
			None => return,
		};
		emit(events);
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let events = match *state_mu.borrow_mut() {
			Some(ref mut view) => {
				view.controller.pointer_up(&mut view.engine);
				sync(&view.controller);
				view.dirty = true;
				view.controller.drain_events()
			}
			None => return,
		};
		emit(events);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let events = match *state_ml.borrow_mut() {
			Some(ref mut view) => {
				view.controller.pointer_leave(&mut view.engine);
				sync(&view.controller);
				view.dirty = true;
				view.controller.drain_events()
			}
			None => return,
		};
		emit(events);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = pointer_position(&ev, &canvas);
		if let Some(ref mut view) = *state_wh.borrow_mut() {
			view.controller.wheel(x, y, ev.delta_y());
			view.dirty = true;
		}
	};

	let state_fs = state.clone();
	let on_toggle_fullscreen = move |_: MouseEvent| {
		let (Some(container), Some(document)) = (
			container_ref.get_untracked(),
			web_sys::window().and_then(|w| w.document()),
		) else {
			return;
		};
		if let Some(ref mut view) = *state_fs.borrow_mut() {
			let fs = &mut view.controller.fullscreen;
			if let Some(request) = fs.toggle() {
				// failures are logged and revert the state
				let _ = fullscreen::apply_request(fs, request, &document, &container);
			}
			is_fullscreen.set(fs.is_fullscreen());
			view.dirty = true;
		}
	};

	view! {
		<div node_ref=container_ref class="cluster-graph">
			<canvas
				node_ref=canvas_ref
				class="cluster-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<button class="fullscreen-toggle" on:click=on_toggle_fullscreen>
				{move || if is_fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }}
			</button>
			<ul class="cluster-legend">
				{move || {
					data.with(|d| d.nodes.clone())
						.into_iter()
						.map(|node| {
							let (enter_id, click_id, class_id) =
								(node.id.clone(), node.id.clone(), node.id.clone());
							let swatch = format!("background: {}", cluster_color(&node.id));
							view! {
								<li
									class="legend-item"
									class:active=move || {
										hovered.get().as_deref() == Some(class_id.as_str())
											|| selected.get().as_deref() == Some(class_id.as_str())
									}
									on:mouseenter=move |_| legend_hover.set(Some(enter_id.clone()))
									on:mouseleave=move |_| legend_hover.set(None)
									on:click=move |_| legend_pick.set(Some(click_id.clone()))
								>
									<span class="legend-swatch" style=swatch></span>
									{node.name}
									" ("
									{node.paper_count}
									")"
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
