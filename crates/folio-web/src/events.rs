//! DOM event listeners that forward to the page runtime.

use crate::document::{describe, WebDocument};
use crate::frame::FrameLoop;
use folio::{FolioError, FolioResult, Page};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventTarget, HtmlElement, KeyboardEvent, ScrollBehavior, ScrollToOptions, Window,
};

type SharedPage = Rc<RefCell<Page<WebDocument>>>;

/// An attached listener, removed again on drop
#[derive(Debug)]
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    /// Attach `handler` for `event` on `target`
    pub fn attach<F>(target: &EventTarget, event: &'static str, handler: F) -> FolioResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| FolioError::host(format!("addEventListener({event}): {}", describe(&e))))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Run `f` with the page unless it is already borrowed
fn with_page(page: &SharedPage, f: impl FnOnce(&mut Page<WebDocument>)) {
    match page.try_borrow_mut() {
        Ok(mut page) => f(&mut page),
        Err(_) => warn!("page busy, dropping event"),
    }
}

/// Attach every page listener: scroll, back-to-top and filter clicks, card
/// keys, skip link focus and window load.
///
/// Listeners that queue scheduled work wake `frames`.
pub fn attach_all(
    window: &Window,
    page: &SharedPage,
    frames: &FrameLoop,
) -> FolioResult<Vec<Listener>> {
    let mut listeners = Vec::new();

    let scroll_page = Rc::clone(page);
    let scroll_window = window.clone();
    listeners.push(Listener::attach(window, "scroll", move |_| {
        let scroll_y = scroll_window.scroll_y().unwrap_or(0.0);
        with_page(&scroll_page, |page| page.on_scroll(scroll_y));
    })?);

    let (back_to_top, buttons, cards, skip_link) = {
        let page = page.borrow();
        (
            page.back_to_top().cloned(),
            page.filter_buttons().to_vec(),
            page.cards().to_vec(),
            page.skip_link().cloned(),
        )
    };

    if let Some(button) = back_to_top {
        let top_page = Rc::clone(page);
        let top_window = window.clone();
        listeners.push(Listener::attach(&button, "click", move |_| {
            let Some(top) = top_page.try_borrow().ok().and_then(|page| page.on_back_to_top())
            else {
                return;
            };
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            top_window.scroll_to_with_scroll_to_options(&options);
        })?);
    }

    for button in buttons {
        let click_page = Rc::clone(page);
        let click_frames = frames.clone();
        let target = button.clone();
        listeners.push(Listener::attach(&button, "click", move |_| {
            with_page(&click_page, |page| {
                page.select_filter(&target);
            });
            click_frames.wake();
        })?);
    }

    for card in cards {
        let key_page = Rc::clone(page);
        let target = card.clone();
        listeners.push(Listener::attach(&card, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let activate = key_page
                .try_borrow()
                .is_ok_and(|page| page.on_card_key(&target, &key));
            if activate {
                event.prevent_default();
                if let Some(element) = target.dyn_ref::<HtmlElement>() {
                    element.click();
                }
            }
        })?);
    }

    if let Some(link) = skip_link {
        for (event, focused) in [("focus", true), ("blur", false)] {
            let focus_page = Rc::clone(page);
            listeners.push(Listener::attach(&link, event, move |_| {
                with_page(&focus_page, |page| page.on_skip_link_focus(focused));
            })?);
        }
    }

    let load_page = Rc::clone(page);
    let load_frames = frames.clone();
    let load_window = window.clone();
    listeners.push(Listener::attach(window, "load", move |_| {
        let load_ms = load_window.performance().map(|p| p.now());
        with_page(&load_page, |page| page.on_load(load_ms));
        load_frames.wake();
    })?);

    Ok(listeners)
}
