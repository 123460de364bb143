//! Browser resources a mounted view holds: window and document listeners and
//! the animation frame loop. Both are released when the view unmounts.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

/// Bookkeeping for a self-rescheduling frame loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSchedule {
	pending: Option<i32>,
	stopped: bool,
}

impl FrameSchedule {
	pub fn may_request(&self) -> bool {
		!self.stopped && self.pending.is_none()
	}

	pub fn requested(&mut self, id: i32) {
		self.pending = Some(id);
	}

	pub fn fired(&mut self) {
		self.pending = None;
	}

	/// Stop for good. Returns the outstanding request to cancel, if any.
	pub fn stop(&mut self) -> Option<i32> {
		self.stopped = true;
		self.pending.take()
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}
}

/// `requestAnimationFrame` loop that re-requests itself after every frame.
#[derive(Clone, Default)]
pub struct AnimationLoop {
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	schedule: Rc<RefCell<FrameSchedule>>,
}

impl AnimationLoop {
	/// True once started, and stays true after a stop so a loop never restarts.
	pub fn is_started(&self) -> bool {
		self.callback.borrow().is_some() || self.schedule.borrow().is_stopped()
	}

	pub fn start(&self, mut frame: impl FnMut(f64) + 'static) {
		let this = self.clone();
		*self.callback.borrow_mut() = Some(Closure::new(move |now: f64| {
			this.schedule.borrow_mut().fired();
			frame(now);
			this.request();
		}));
		self.request();
	}

	fn request(&self) {
		if !self.schedule.borrow().may_request() {
			return;
		}
		let callback = self.callback.borrow();
		let (Some(cb), Some(window)) = (callback.as_ref(), web_sys::window()) else {
			return;
		};
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => self.schedule.borrow_mut().requested(id),
			Err(err) => warn!("animation frame request failed: {err:?}"),
		}
	}

	/// Cancel the pending frame and drop the callback, which also breaks the
	/// callback's reference back to this loop.
	pub fn stop(&self) {
		let pending = self.schedule.borrow_mut().stop();
		if let (Some(id), Some(window)) = (pending, web_sys::window()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.callback.borrow_mut().take();
	}
}

/// Listeners attached outside the view's own DOM.
#[derive(Default)]
pub struct ListenerSet {
	entries: Vec<(EventTarget, &'static str, Closure<dyn FnMut()>)>,
}

impl ListenerSet {
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn listen(&mut self, target: &EventTarget, event: &'static str, callback: Closure<dyn FnMut()>) {
		match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
			Ok(()) => self.entries.push((target.clone(), event, callback)),
			Err(err) => warn!("could not listen for {event}: {err:?}"),
		}
	}

	pub fn remove_all(&mut self) {
		for (target, event, callback) in self.entries.drain(..) {
			let _ = target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
		}
	}
}

/// Everything a view releases on unmount.
#[derive(Clone, Default)]
pub struct Mounted {
	pub listeners: Rc<RefCell<ListenerSet>>,
	pub animation: AnimationLoop,
}

impl Mounted {
	pub fn listen(&self, target: &EventTarget, event: &'static str, callback: Closure<dyn FnMut()>) {
		self.listeners.borrow_mut().listen(target, event, callback);
	}

	pub fn has_listeners(&self) -> bool {
		!self.listeners.borrow().is_empty()
	}

	pub fn release(&self) {
		self.animation.stop();
		self.listeners.borrow_mut().remove_all();
		debug!("view resources released");
	}

	/// Release when the current reactive owner is cleaned up.
	pub fn release_on_cleanup(&self) {
		let stored = StoredValue::new_local(self.clone());
		on_cleanup(move || {
			stored.try_with_value(Mounted::release);
		});
	}
}
