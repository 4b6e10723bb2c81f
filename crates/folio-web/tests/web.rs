//! Browser tests for the DOM binding. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use folio::{Document, HostEnv, Page, Selector, SiteConfig};
use folio_web::frame::FrameLoop;
use folio_web::WebDocument;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Replace the body with `html` and return a wrapper around the document
fn fixture(html: &str) -> WebDocument {
    let document = document();
    document.body().unwrap().set_inner_html(html);
    WebDocument::new(document)
}

fn by_id(doc: &WebDocument, id: &str) -> Element {
    doc.inner().get_element_by_id(id).unwrap()
}

// ===== WebDocument tests =====

#[wasm_bindgen_test]
fn test_query_and_attributes() {
    let mut doc = fixture(r#"<span id="n" data-count="12">0</span><img data-src="/a.png">"#);
    let found = doc.query_all(&Selector::attr("data-count"));
    assert_eq!(found.len(), 1);
    let node = by_id(&doc, "n");
    assert_eq!(doc.attribute(&node, "data-count").as_deref(), Some("12"));

    doc.set_text(&node, "7");
    assert_eq!(doc.text(&node), "7");

    let images = doc.query_all(&Selector::tag("img").and(Selector::attr("data-src")));
    assert_eq!(images.len(), 1);
    doc.remove_attribute(&images[0], "data-src");
    assert!(doc.attribute(&images[0], "data-src").is_none());
}

#[wasm_bindgen_test]
fn test_classes_and_styles() {
    let mut doc = fixture(r#"<div id="d" class="skill-progress"></div>"#);
    let node = by_id(&doc, "d");
    doc.add_class(&node, "visible");
    assert!(doc.has_class(&node, "visible"));
    assert_eq!(doc.classes(&node), vec!["skill-progress", "visible"]);

    doc.set_style(&node, "width", "75%");
    assert_eq!(doc.style(&node, "width").as_deref(), Some("75%"));
    doc.set_style(&node, "width", "");
    assert_eq!(doc.style(&node, "width"), None);
}

#[wasm_bindgen_test]
fn test_renderable() {
    let mut doc = fixture(r#"<div id="shown">x</div><div id="gone" style="display:none">x</div>"#);
    assert!(doc.is_renderable(&by_id(&doc, "shown")));
    assert!(!doc.is_renderable(&by_id(&doc, "gone")));

    let detached = doc.create_element("div").unwrap();
    assert!(!doc.is_renderable(&detached));
}

#[wasm_bindgen_test]
fn test_prepend_and_remove() {
    let mut doc = fixture(r#"<p id="first">a</p>"#);
    let body = doc.body().unwrap();
    let link = doc.create_element("a").unwrap();
    doc.prepend_child(&body, &link);
    assert_eq!(body.first_element_child(), Some(link.clone()));
    doc.remove(&link);
    assert_eq!(body.first_element_child(), Some(by_id(&doc, "first")));
}

// ===== Page tests =====

#[wasm_bindgen_test]
fn test_page_fallback_on_live_dom() {
    let doc = fixture(
        r#"<section id="s" data-reveal style="height:100px">x</section>
           <div id="bar" class="skill-progress" data-progress="75" style="height:4px"></div>"#,
    );
    let page = Page::init(doc, SiteConfig::default(), &HostEnv::without_observer());
    let doc = page.document();
    assert!(doc.has_class(&by_id(doc, "s"), "visible"));
    assert_eq!(doc.style(&by_id(doc, "bar"), "width").as_deref(), Some("75%"));

    let skip = doc.body().unwrap().first_element_child().unwrap();
    assert!(skip.class_list().contains("skip-link"));
    page.dispose();
}

#[wasm_bindgen_test]
fn test_card_activation_clicks() {
    let doc = fixture(r#"<div id="c" class="project-card" data-category="web">card</div>"#);
    let page = Page::init(doc, SiteConfig::default(), &HostEnv::new());
    let card = by_id(page.document(), "c");
    assert_eq!(card.get_attribute("tabindex").as_deref(), Some("0"));
    assert!(page.on_card_key(&card, "Enter"));
    assert!(card.dyn_ref::<HtmlElement>().is_some());
}

// ===== FrameLoop tests =====

#[wasm_bindgen_test]
fn test_frame_loop_sleeps_until_woken() {
    let window = web_sys::window().unwrap();
    let frames = FrameLoop::new(&window, |_| false);
    assert!(!frames.is_running());
    frames.wake();
    assert!(frames.is_running());
    frames.wake();
    assert!(frames.is_running());
    frames.stop();
    assert!(!frames.is_running());
    frames.wake();
    assert!(!frames.is_running());
}
