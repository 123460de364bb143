//! Fullscreen toggling, reconciled against what the browser actually reports.
//!
//! Requests are asynchronous and the user can leave fullscreen without going
//! through the app, so the flag is never trusted on its own: every
//! `fullscreenchange`, `fullscreenerror` and animation frame feeds the
//! platform's status back through [`FullscreenState::reconcile`].

use log::warn;
use web_sys::{Document, Element, Node};

use crate::error::VizError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FullscreenState {
	#[default]
	Windowed,
	Entering,
	Fullscreen,
	Exiting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenRequest {
	Enter,
	Exit,
}

impl FullscreenState {
	/// Whether the view should lay itself out as fullscreen.
	pub fn is_fullscreen(self) -> bool {
		matches!(self, FullscreenState::Fullscreen | FullscreenState::Exiting)
	}

	/// A request was made and the platform has not confirmed it yet.
	pub fn is_pending(self) -> bool {
		matches!(self, FullscreenState::Entering | FullscreenState::Exiting)
	}

	/// User asked to toggle. Returns the platform call to make, if any; none
	/// while a transition is already in flight.
	pub fn toggle(&mut self) -> Option<FullscreenRequest> {
		if self.is_pending() {
			return None;
		}
		let (next, request) = if self.is_fullscreen() {
			(FullscreenState::Exiting, FullscreenRequest::Exit)
		} else {
			(FullscreenState::Entering, FullscreenRequest::Enter)
		};
		*self = next;
		Some(request)
	}

	/// Fold the platform's reported status into the state. Returns true if the
	/// state changed.
	pub fn reconcile(&mut self, platform_fullscreen: bool) -> bool {
		let next = match (*self, platform_fullscreen) {
			(FullscreenState::Entering, false) => FullscreenState::Entering,
			(FullscreenState::Exiting, true) => FullscreenState::Exiting,
			(_, true) => FullscreenState::Fullscreen,
			(_, false) => FullscreenState::Windowed,
		};
		let changed = next != *self;
		*self = next;
		changed
	}

	/// The platform refused the request.
	pub fn request_failed(&mut self) {
		*self = FullscreenState::Windowed;
	}
}

/// Whether `element` is the document's current fullscreen element.
pub fn platform_fullscreen(document: &Document, element: &Element) -> bool {
	let node: &Node = element;
	document
		.fullscreen_element()
		.is_some_and(|current| current.is_same_node(Some(node)))
}

/// Carry out a toggle decision against the browser. On rejection the state
/// reverts to windowed and the error is logged and returned.
pub fn apply_request(
	state: &mut FullscreenState,
	request: FullscreenRequest,
	document: &Document,
	element: &Element,
) -> Result<(), VizError> {
	match request {
		FullscreenRequest::Enter => element.request_fullscreen().map_err(|err| {
			state.request_failed();
			let err = VizError::Fullscreen(format!("{err:?}"));
			warn!("{err}");
			err
		}),
		FullscreenRequest::Exit => {
			document.exit_fullscreen();
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn toggle_enters_then_waits_for_platform() {
		let mut state = FullscreenState::default();
		assert_eq!(state.toggle(), Some(FullscreenRequest::Enter));
		assert_eq!(state, FullscreenState::Entering);
		assert!(!state.is_fullscreen());

		// platform has not switched yet
		assert!(!state.reconcile(false));
		assert_eq!(state, FullscreenState::Entering);
		assert_eq!(state.toggle(), None);

		assert!(state.reconcile(true));
		assert_eq!(state, FullscreenState::Fullscreen);
	}

	#[test]
	fn external_exit_is_picked_up() {
		let mut state = FullscreenState::Fullscreen;
		// user pressed escape outside the app
		assert!(state.reconcile(false));
		assert_eq!(state, FullscreenState::Windowed);
		assert!(!state.is_fullscreen());
	}

	#[test]
	fn exit_request_completes_on_platform_report() {
		let mut state = FullscreenState::Fullscreen;
		assert_eq!(state.toggle(), Some(FullscreenRequest::Exit));
		assert!(state.is_pending());
		assert!(!state.reconcile(true));
		assert!(state.reconcile(false));
		assert_eq!(state, FullscreenState::Windowed);
	}

	#[test]
	fn failed_request_reverts() {
		let mut state = FullscreenState::default();
		state.toggle();
		state.request_failed();
		assert_eq!(state, FullscreenState::Windowed);
		assert_eq!(state.toggle(), Some(FullscreenRequest::Enter));
	}
}
