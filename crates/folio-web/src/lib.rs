//! Folio browser binding.
//!
//! Mounts the [`folio`] page runtime on the live DOM: an
//! `IntersectionObserver` per distinct watch option set feeds the reveal
//! engine, a `requestAnimationFrame` loop drives the scheduler and counters
//! while either has work, and DOM listeners forward scroll, click, key, focus
//! and load events.
//!
//! The module mounts itself when loaded; call `unmount()` from JavaScript to
//! tear everything down.

#![warn(missing_docs)]

pub mod document;
pub mod events;
pub mod frame;
pub mod logging;
pub mod observer;

pub use document::WebDocument;

use events::Listener;
use folio::{FolioError, FolioResult, HostEnv, Page, SiteConfig};
use frame::{FrameLoop, LongTaskObserver};
use observer::{intersection_observer_supported, RevealObservers};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Id of the `<script type="application/json">` holding configuration
pub const CONFIG_ELEMENT_ID: &str = "folio-config";

/// Hosts that get performance monitoring
const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

struct Mounted {
    page: Rc<RefCell<Page<WebDocument>>>,
    observers: Option<RevealObservers>,
    listeners: Vec<Listener>,
    frames: FrameLoop,
    long_tasks: Option<LongTaskObserver>,
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

/// `performance.now()`, or 0 without a window
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// Whether monitoring should be on for `hostname`
pub fn is_local_host(hostname: &str) -> bool {
    LOCAL_HOSTS.contains(&hostname)
}

/// Read the embedded configuration; `Ok(None)` when there is none
pub fn read_config(document: &web_sys::Document) -> FolioResult<Option<SiteConfig>> {
    let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return Ok(None);
    };
    let json = element.text_content().unwrap_or_default();
    SiteConfig::from_json(&json).map(Some)
}

/// Module entry point
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let deferred = Closure::once_into_js(move || {
            if let Err(err) = mount() {
                web_sys::console::error_1(&err.to_string().into());
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", deferred.unchecked_ref())?;
        return Ok(());
    }
    mount().map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Mount the page runtime on the current document. Mounting twice is a no-op.
pub fn mount() -> FolioResult<()> {
    if MOUNTED.with(|m| m.borrow().is_some()) {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| FolioError::host("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| FolioError::host("no document"))?;

    let embedded = read_config(&document);
    let mut config = match &embedded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => SiteConfig::default(),
    };
    if let Err(err) = logging::init_logging(&config.log_level) {
        web_sys::console::warn_1(&err.to_string().into());
    }
    if let Err(err) = &embedded {
        warn!(error = %err, "ignoring embedded configuration");
    }

    let hostname = window.location().hostname().unwrap_or_default();
    if is_local_host(&hostname) {
        config = config.with_performance_monitoring(true);
    }

    let saved_theme = window
        .local_storage()
        .ok()
        .flatten()
        .and_then(|storage| storage.get_item(&config.theme.storage_key).ok().flatten());
    let supported = intersection_observer_supported(&window);
    let env = HostEnv {
        intersection_observer: supported,
        saved_theme,
        now_ms: now_ms(),
    };

    let monitoring = config.load.performance_monitoring;
    let page = Rc::new(RefCell::new(Page::init(
        WebDocument::new(document.clone()),
        config,
        &env,
    )));

    let frame_page = Rc::clone(&page);
    let frames = FrameLoop::new(&window, move |now| match frame_page.try_borrow_mut() {
        Ok(mut page) => {
            page.tick(now);
            !page.is_idle()
        }
        Err(_) => true,
    });

    let observers = if supported {
        Some(RevealObservers::attach(&page, &frames)?)
    } else {
        None
    };
    let listeners = events::attach_all(&window, &page, &frames)?;

    let long_tasks = if monitoring {
        let task_page = Rc::clone(&page);
        match LongTaskObserver::start(move |duration| {
            if let Ok(mut page) = task_page.try_borrow_mut() {
                page.record_long_task(duration);
            }
        }) {
            Ok(observer) => Some(observer),
            Err(err) => {
                warn!(error = %err, "long task monitoring unavailable");
                None
            }
        }
    } else {
        None
    };

    if document.ready_state() == "complete" {
        page.borrow_mut().on_load(Some(now_ms()));
    }
    frames.wake();

    info!(
        observers = observers.as_ref().map_or(0, RevealObservers::len),
        listeners = listeners.len(),
        "folio mounted"
    );
    MOUNTED.with(|m| {
        *m.borrow_mut() = Some(Mounted {
            page,
            observers,
            listeners,
            frames,
            long_tasks,
        });
    });
    Ok(())
}

/// Tear down everything [`mount`] set up
#[wasm_bindgen]
pub fn unmount() {
    let Some(mounted) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        return;
    };
    mounted.frames.stop();
    if let Some(observers) = mounted.observers {
        observers.disconnect();
    }
    if let Some(long_tasks) = mounted.long_tasks {
        long_tasks.disconnect();
    }
    drop(mounted.listeners);

    match Rc::try_unwrap(mounted.page) {
        Ok(page) => {
            page.into_inner().dispose();
            info!("folio unmounted");
        }
        Err(_) => warn!("page still referenced after unmount"),
    }
}
