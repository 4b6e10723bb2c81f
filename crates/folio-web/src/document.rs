//! [`Document`] over the live browser DOM.

use folio::{Document, FolioError, Selector};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, NodeList};

/// The page's `document`, addressed by [`Element`]
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    /// Wrap a browser document
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The wrapped document
    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }
}

/// Log a failed DOM call; mutations are best effort
pub(crate) fn report(operation: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        let err = FolioError::host(format!("{operation}: {}", describe(&err)));
        warn!(error = %err, "DOM operation failed");
    }
}

/// Readable text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn elements(list: Result<NodeList, JsValue>, css: &str) -> Vec<Element> {
    match list {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(err) => {
            warn!(selector = css, error = %describe(&err), "query failed");
            Vec::new()
        }
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        let css = selector.to_css();
        elements(self.document.query_selector_all(&css), &css)
    }

    fn query_within(&self, scope: &Element, selector: &Selector) -> Vec<Element> {
        let css = selector.to_css();
        elements(scope.query_selector_all(&css), &css)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        report("setAttribute", node.set_attribute(name, value));
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        report("removeAttribute", node.remove_attribute(name));
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn classes(&self, node: &Element) -> Vec<String> {
        let list = node.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        report("classList.add", node.class_list().add_1(class));
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        report("classList.remove", node.class_list().remove_1(class));
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        element
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        if value.is_empty() {
            report("style.removeProperty", style.remove_property(property).map(drop));
        } else {
            report("style.setProperty", style.set_property(property, value));
        }
    }

    fn is_renderable(&self, node: &Element) -> bool {
        node.is_connected() && node.get_client_rects().length() > 0
    }

    fn create_element(&mut self, tag: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(element) => Some(element),
            Err(err) => {
                report("createElement", Err(err));
                None
            }
        }
    }

    fn prepend_child(&mut self, parent: &Element, child: &Element) {
        report("prepend", parent.prepend_with_node_1(child));
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }
}
