//! `IntersectionObserver` wiring for the reveal watch set.

use crate::document::{describe, WebDocument};
use crate::frame::FrameLoop;
use folio::{FolioError, FolioResult, IntersectionEntry, Page, WatchOptions};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Whether the browser offers `IntersectionObserver`
pub fn intersection_observer_supported(window: &web_sys::Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// One observer per distinct set of watch options
#[derive(Debug)]
pub struct RevealObservers {
    observers: Vec<IntersectionObserver>,
    _callbacks: Vec<ObserverCallback>,
}

impl RevealObservers {
    /// Observe every pending target of `page`.
    ///
    /// Fired targets are unobserved from inside the callback, and `frames`
    /// is woken so started counters animate.
    pub fn attach(page: &Rc<RefCell<Page<WebDocument>>>, frames: &FrameLoop) -> FolioResult<Self> {
        let mut groups: Vec<(WatchOptions, Vec<Element>)> = Vec::new();
        for (target, options) in page.borrow().animator().watched() {
            match groups.iter_mut().find(|(o, _)| o == options) {
                Some((_, targets)) => targets.push(target.clone()),
                None => groups.push((options.clone(), vec![target.clone()])),
            }
        }

        let mut observers = Vec::with_capacity(groups.len());
        let mut callbacks = Vec::with_capacity(groups.len());
        for (options, targets) in groups {
            let callback = on_entries(Rc::clone(page), frames.clone());
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(options.threshold));
            if let Some(margin) = &options.root_margin {
                init.set_root_margin(margin);
            }
            let observer =
                IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                    .map_err(|e| {
                        FolioError::host(format!("IntersectionObserver: {}", describe(&e)))
                    })?;
            for target in &targets {
                observer.observe(target);
            }
            debug!(
                threshold = options.threshold,
                targets = targets.len(),
                "intersection observer attached"
            );
            observers.push(observer);
            callbacks.push(callback);
        }

        Ok(Self {
            observers,
            _callbacks: callbacks,
        })
    }

    /// Number of observers created
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer was needed
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Stop every observer
    pub fn disconnect(self) {
        for observer in &self.observers {
            observer.disconnect();
        }
    }
}

fn on_entries(page: Rc<RefCell<Page<WebDocument>>>, frames: FrameLoop) -> ObserverCallback {
    Closure::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
        let entries: Vec<IntersectionEntry<Element>> = entries
            .iter()
            .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
            .map(|entry| IntersectionEntry {
                target: entry.target(),
                ratio: entry.intersection_ratio(),
                is_intersecting: entry.is_intersecting(),
            })
            .collect();

        let Ok(mut page) = page.try_borrow_mut() else {
            warn!("page busy, dropping intersection batch");
            return;
        };
        let fired = page.observe(&entries, crate::now_ms());
        for target in &fired {
            observer.unobserve(target);
        }
        if !page.is_idle() {
            frames.wake();
        }
    })
}
