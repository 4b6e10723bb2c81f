//! `requestAnimationFrame` loop and long-task observation.

use crate::document::describe;
use folio::{FolioError, FolioResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    PerformanceEntry, PerformanceObserver, PerformanceObserverEntryList, PerformanceObserverInit,
    Window,
};

type FrameCallback = Closure<dyn FnMut(f64)>;

fn request_animation_frame(window: &Window, callback: &FrameCallback) -> FolioResult<i32> {
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|e| FolioError::host(format!("requestAnimationFrame: {}", describe(&e))))
}

#[derive(Debug)]
struct FrameState {
    window: Window,
    handle: Cell<Option<i32>>,
    closure: RefCell<Option<FrameCallback>>,
}

impl FrameState {
    fn request(&self) {
        if self.handle.get().is_some() {
            return;
        }
        if let Some(frame) = self.closure.borrow().as_ref() {
            match request_animation_frame(&self.window, frame) {
                Ok(id) => self.handle.set(Some(id)),
                Err(err) => warn!(error = %err, "frame loop stopped"),
            }
        }
    }
}

/// Calls back once per animation frame while there is work.
///
/// The callback returns whether another frame is wanted; once it returns
/// `false` the loop sleeps until [`FrameLoop::wake`]. Clones share the loop.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: Rc<FrameState>,
}

impl FrameLoop {
    /// Create a sleeping loop around `callback`
    pub fn new<F>(window: &Window, mut callback: F) -> Self
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let state = Rc::new(FrameState {
            window: window.clone(),
            handle: Cell::new(None),
            closure: RefCell::new(None),
        });
        let weak = Rc::downgrade(&state);
        *state.closure.borrow_mut() = Some(Closure::new(move |now: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.handle.set(None);
            if callback(now) {
                state.request();
            }
        }));
        Self { state }
    }

    /// Request a frame unless one is already pending
    pub fn wake(&self) {
        self.state.request();
    }

    /// Whether a frame is pending
    pub fn is_running(&self) -> bool {
        self.state.handle.get().is_some()
    }

    /// Cancel the pending frame and release the callback
    pub fn stop(&self) {
        if let Some(id) = self.state.handle.take() {
            let _ = self.state.window.cancel_animation_frame(id);
        }
        self.state.closure.borrow_mut().take();
    }
}

/// Browser `longtask` observer
#[derive(Debug)]
pub struct LongTaskObserver {
    observer: PerformanceObserver,
    _callback: Closure<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>,
}

impl LongTaskObserver {
    /// Report each long task's duration to `on_task`
    pub fn start<F>(mut on_task: F) -> FolioResult<Self>
    where
        F: FnMut(f64) + 'static,
    {
        let callback = Closure::<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>::new(
            move |list: PerformanceObserverEntryList, _observer: PerformanceObserver| {
                for entry in list.get_entries().iter() {
                    if let Ok(entry) = entry.dyn_into::<PerformanceEntry>() {
                        on_task(entry.duration());
                    }
                }
            },
        );
        let observer = PerformanceObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| FolioError::host(format!("PerformanceObserver: {}", describe(&e))))?;
        let init =
            PerformanceObserverInit::new(&js_sys::Array::of1(&JsValue::from_str("longtask")));
        observer.observe(&init);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    /// Stop observing
    pub fn disconnect(self) {
        self.observer.disconnect();
    }
}
