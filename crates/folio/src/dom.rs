//! Document abstraction and in-memory mock DOM.
//!
//! [`Document`] is the seam between page logic and the host element tree.
//! The browser binding implements it over `web_sys::Element`; [`MockDom`]
//! implements it over an arena of [`DomElement`]s so every feature can be
//! tested natively.

use crate::geometry::{Rect, RootMargin, Viewport};
use crate::reveal::{IntersectionEntry, WatchOptions};
use crate::selector::Selector;
use std::collections::HashMap;
use std::fmt;

/// Host element tree operations used by the page runtime.
///
/// Mutations are infallible from the caller's point of view: a host that
/// fails to apply one logs the failure and carries on, so one broken element
/// never takes down the rest of the page.
pub trait Document {
    /// Element handle
    type Node: Clone + PartialEq + fmt::Debug;

    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &Selector) -> Vec<Self::Node>;

    /// Elements inside `scope` (excluding `scope`) matching `selector`
    fn query_within(&self, scope: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    /// First element matching `selector`
    fn query_first(&self, selector: &Selector) -> Option<Self::Node> {
        self.query_all(selector).into_iter().next()
    }

    /// The `<body>` element
    fn body(&self) -> Option<Self::Node>;

    /// The document root (`<html>`)
    fn root(&self) -> Option<Self::Node>;

    /// Attribute value
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set an attribute
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Remove an attribute
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Text content
    fn text(&self, node: &Self::Node) -> String;

    /// Replace text content
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Class list, in order
    fn classes(&self, node: &Self::Node) -> Vec<String>;

    /// Whether the class list contains `class`
    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    /// Add a class (no-op if present)
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Remove a class (no-op if absent)
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Add or remove a class
    fn toggle_class(&mut self, node: &Self::Node, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Inline style property, `None` when unset
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Set an inline style property
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Whether the element is attached and can be rendered
    fn is_renderable(&self, node: &Self::Node) -> bool;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> Option<Self::Node>;

    /// Insert `child` as the first child of `parent`
    fn prepend_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Detach an element from the tree
    fn remove(&mut self, node: &Self::Node);
}

/// Handle into a [`MockDom`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Represents a DOM element for testing
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Element tag name
    pub tag: String,
    /// Text content
    pub text_content: String,
    /// Element attributes (including `id`)
    pub attributes: HashMap<String, String>,
    /// CSS classes
    pub classes: Vec<String>,
    /// Inline style properties
    pub styles: HashMap<String, String>,
    /// Whether the element can be rendered
    pub visible: bool,
    /// Layout box in document coordinates
    pub rect: Rect,
    /// Child elements (only used while building; flattened on insert)
    pub children: Vec<DomElement>,
}

impl Default for DomElement {
    fn default() -> Self {
        Self::new("div")
    }
}

impl DomElement {
    /// Creates a new DOM element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text_content: String::new(),
            attributes: HashMap::new(),
            classes: Vec::new(),
            styles: HashMap::new(),
            visible: true,
            rect: Rect::default(),
            children: Vec::new(),
        }
    }

    /// Sets the `id` attribute
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    /// Sets the text content
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text_content = text.to_string();
        self
    }

    /// Adds a class
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Sets an attribute
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the layout box
    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Marks the element as not renderable
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Adds a child element
    #[must_use]
    pub fn with_child(mut self, child: DomElement) -> Self {
        self.children.push(child);
        self
    }

    /// Checks if element has a class
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Gets an attribute value
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    element: DomElement,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// In-memory document for testing page logic without a browser
#[derive(Debug, Clone)]
pub struct MockDom {
    slots: Vec<Slot>,
    root: NodeId,
    body: NodeId,
    mutations: usize,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDom {
    /// Creates an empty `<html><body></body></html>` document
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            slots: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            mutations: 0,
        };
        dom.root = dom.alloc(DomElement::new("html"), None, true);
        dom.body = dom.insert(dom.root, DomElement::new("body"));
        dom
    }

    /// Creates a document whose body holds `children`
    #[must_use]
    pub fn with_body(children: Vec<DomElement>) -> Self {
        let mut dom = Self::new();
        for child in children {
            dom.append(dom.body, child);
        }
        dom
    }

    /// A representative portfolio page.
    ///
    /// Viewport-sized sections stacked vertically (800px each); counters,
    /// skill bars, reveal sections, lazy images, project filter, parallax
    /// decorations, social links and a loader.
    #[must_use]
    pub fn portfolio() -> Self {
        let w = 1280.0;
        let hero = DomElement::new("section")
            .with_id("home")
            .with_rect(Rect::new(0.0, 0.0, w, 800.0))
            .with_child(DomElement::new("div").with_class("gradient-orb"))
            .with_child(DomElement::new("div").with_class("phone-mockup"))
            .with_child(DomElement::new("div").with_class("floating-icons"))
            .with_child(
                DomElement::new("span")
                    .with_class("typing-text")
                    .with_attr("data-phrases", "Rust Developer|Open Source Author"),
            );

        let about = DomElement::new("section")
            .with_id("about")
            .with_attr("data-scroll-animate", "")
            .with_rect(Rect::new(0.0, 800.0, w, 800.0))
            .with_child(
                DomElement::new("span")
                    .with_id("stat-projects")
                    .with_attr("data-count", "250")
                    .with_text("0")
                    .with_rect(Rect::new(100.0, 1000.0, 200.0, 40.0)),
            )
            .with_child(
                DomElement::new("span")
                    .with_id("stat-years")
                    .with_attr("data-count", "8")
                    .with_text("0")
                    .with_rect(Rect::new(400.0, 1000.0, 200.0, 40.0)),
            );

        let skills = DomElement::new("section")
            .with_id("skills")
            .with_rect(Rect::new(0.0, 1600.0, w, 800.0))
            .with_child(
                DomElement::new("div")
                    .with_class("skills-grid")
                    .with_child(
                        DomElement::new("div").with_class("skill-category").with_child(
                            DomElement::new("div")
                                .with_id("bar-rust")
                                .with_class("skill-progress")
                                .with_attr("data-progress", "75")
                                .with_rect(Rect::new(100.0, 1800.0, 400.0, 10.0)),
                        ),
                    )
                    .with_child(
                        DomElement::new("div").with_class("skill-category").with_child(
                            DomElement::new("div")
                                .with_id("bar-kotlin")
                                .with_class("skill-progress")
                                .with_attr("data-progress", "90")
                                .with_rect(Rect::new(100.0, 1900.0, 400.0, 10.0)),
                        ),
                    ),
            );

        let card = |id: &str, category: &str, top: f64| {
            DomElement::new("div")
                .with_id(id)
                .with_class("project-card")
                .with_attr("data-category", category)
                .with_rect(Rect::new(0.0, top, 400.0, 300.0))
        };
        let filter_btn = |id: &str, filter: &str| {
            DomElement::new("button")
                .with_id(id)
                .with_class("filter-btn")
                .with_attr("data-filter", filter)
        };
        let projects = DomElement::new("section")
            .with_id("projects")
            .with_attr("data-reveal", "")
            .with_rect(Rect::new(0.0, 2400.0, w, 800.0))
            .with_child(filter_btn("filter-all", "all").with_class("active"))
            .with_child(filter_btn("filter-mobile", "mobile"))
            .with_child(filter_btn("filter-web", "web"))
            .with_child(
                DomElement::new("div")
                    .with_class("projects-grid")
                    .with_child(card("card-1", "mobile", 2500.0).with_child(
                        DomElement::new("img")
                            .with_id("shot-1")
                            .with_attr("data-src", "/img/project-1.png")
                            .with_rect(Rect::new(0.0, 2500.0, 400.0, 200.0)),
                    ))
                    .with_child(card("card-2", "web", 2500.0))
                    .with_child(card("card-3", "mobile", 2850.0)),
            );

        let testimonials = DomElement::new("section")
            .with_id("testimonials")
            .with_rect(Rect::new(0.0, 3200.0, w, 800.0))
            .with_child(
                DomElement::new("div")
                    .with_class("testimonials-slider")
                    .with_child(DomElement::new("div").with_class("testimonial-card"))
                    .with_child(DomElement::new("div").with_class("testimonial-card")),
            );

        let social = |platform: &str| {
            DomElement::new("a")
                .with_id(&format!("social-{platform}"))
                .with_class("social-link")
                .with_child(
                    DomElement::new("i")
                        .with_class("fab")
                        .with_class(&format!("fa-{platform}")),
                )
        };
        let contact = DomElement::new("section")
            .with_id("contact")
            .with_rect(Rect::new(0.0, 4000.0, w, 800.0))
            .with_child(social("github"))
            .with_child(social("linkedin"))
            .with_child(
                DomElement::new("a")
                    .with_id("social-plain")
                    .with_class("social-link")
                    .with_text("Blog"),
            );

        Self::with_body(vec![
            DomElement::new("div").with_class("loader"),
            hero,
            about,
            skills,
            projects,
            testimonials,
            contact,
            DomElement::new("button").with_id("backToTop"),
        ])
    }

    fn alloc(&mut self, mut element: DomElement, parent: Option<NodeId>, attached: bool) -> NodeId {
        let children = std::mem::take(&mut element.children);
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            element,
            parent,
            children: Vec::new(),
            attached,
        });
        for child in children {
            let child_id = self.alloc(child, Some(id), attached);
            self.slots[id.0].children.push(child_id);
        }
        id
    }

    fn insert(&mut self, parent: NodeId, element: DomElement) -> NodeId {
        let attached = self.slot(parent).map_or(false, |s| s.attached);
        let id = self.alloc(element, Some(parent), attached);
        if let Some(slot) = self.slots.get_mut(parent.0) {
            slot.children.push(id);
        }
        id
    }

    /// Appends `element` (and its nested children) under `parent`
    pub fn append(&mut self, parent: NodeId, element: DomElement) -> NodeId {
        self.mutations += 1;
        self.insert(parent, element)
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0)
    }

    /// Gets an element by handle
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&DomElement> {
        self.slot(id).map(|s| &s.element)
    }

    /// Gets an attached element by its `id` attribute
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(&Selector::id(id))
    }

    /// Children of an element, in order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |s| s.children.as_slice())
    }

    /// Parent of an element
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.parent)
    }

    /// Number of mutating calls that changed the document
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Replace an element's layout box
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(slot) = self.slot_mut(id) {
            slot.element.rect = rect;
        }
    }

    /// Mark an element as (not) renderable
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(slot) = self.slot_mut(id) {
            slot.element.visible = visible;
        }
    }

    /// Compute the intersection entries a browser observer would deliver
    /// for `targets` when the page shows `viewport`.
    ///
    /// Detached targets are reported as not intersecting.
    #[must_use]
    pub fn intersections<'a, I>(
        &self,
        viewport: &Viewport,
        targets: I,
    ) -> Vec<IntersectionEntry<NodeId>>
    where
        I: IntoIterator<Item = (&'a NodeId, &'a WatchOptions)>,
    {
        targets
            .into_iter()
            .map(|(node, options)| {
                let margin = options
                    .root_margin
                    .as_deref()
                    .and_then(|m| RootMargin::parse(m).ok())
                    .unwrap_or_default();
                match self.slot(*node).filter(|s| s.attached) {
                    Some(slot) => {
                        let rect = slot.element.rect;
                        IntersectionEntry {
                            target: *node,
                            ratio: viewport.visible_ratio(&rect, &margin),
                            is_intersecting: viewport.intersects(&rect, &margin),
                        }
                    }
                    None => IntersectionEntry::leaving(*node),
                }
            })
            .collect()
    }

    fn preorder(&self, start: NodeId, out: &mut Vec<NodeId>) {
        out.push(start);
        for &child in self.children(start) {
            self.preorder(child, out);
        }
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let el = &slot.element;
        match selector {
            Selector::Id(want) => el.get_attr("id") == Some(want.as_str()),
            Selector::Class(class) => el.has_class(class),
            Selector::Attr(name) => el.attributes.contains_key(name),
            Selector::Tag(tag) => el.tag.eq_ignore_ascii_case(tag),
            Selector::All(parts) => parts.iter().all(|p| self.matches(id, p)),
            Selector::Any(group) => group.iter().any(|p| self.matches(id, p)),
            Selector::Descendant { ancestor, target } => {
                if !self.matches(id, target) {
                    return false;
                }
                let mut cursor = slot.parent;
                while let Some(parent) = cursor {
                    if self.matches(parent, ancestor) {
                        return true;
                    }
                    cursor = self.parent(parent);
                }
                false
            }
        }
    }
}

impl Document for MockDom {
    type Node = NodeId;

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.preorder(self.root, &mut order);
        order
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    fn query_within(&self, scope: &NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut order = Vec::new();
        for &child in self.children(*scope) {
            self.preorder(child, &mut order);
        }
        order
            .into_iter()
            .filter(|&id| self.matches(id, selector))
            .collect()
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn root(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(*node)
            .and_then(|e| e.get_attr(name))
            .map(str::to_string)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            if slot.element.get_attr(name) != Some(value) {
                slot.element
                    .attributes
                    .insert(name.to_string(), value.to_string());
                self.mutations += 1;
            }
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            if slot.element.attributes.remove(name).is_some() {
                self.mutations += 1;
            }
        }
    }

    fn text(&self, node: &NodeId) -> String {
        self.element(*node)
            .map(|e| e.text_content.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            if slot.element.text_content != text {
                slot.element.text_content = text.to_string();
                self.mutations += 1;
            }
        }
    }

    fn classes(&self, node: &NodeId) -> Vec<String> {
        self.element(*node)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            if !slot.element.has_class(class) {
                slot.element.classes.push(class.to_string());
                self.mutations += 1;
            }
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            let before = slot.element.classes.len();
            slot.element.classes.retain(|c| c != class);
            if slot.element.classes.len() != before {
                self.mutations += 1;
            }
        }
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.element(*node)
            .and_then(|e| e.styles.get(property))
            .cloned()
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        if let Some(slot) = self.slot_mut(*node) {
            let styles = &mut slot.element.styles;
            if value.is_empty() {
                if styles.remove(property).is_some() {
                    self.mutations += 1;
                }
            } else if styles.get(property).map(String::as_str) != Some(value) {
                styles.insert(property.to_string(), value.to_string());
                self.mutations += 1;
            }
        }
    }

    fn is_renderable(&self, node: &NodeId) -> bool {
        self.slot(*node)
            .is_some_and(|s| s.attached && s.element.visible)
    }

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        Some(self.alloc(DomElement::new(tag), None, false))
    }

    fn prepend_child(&mut self, parent: &NodeId, child: &NodeId) {
        if parent == child || self.slot(*parent).is_none() || self.slot(*child).is_none() {
            return;
        }
        self.remove(child);
        let attached = self.slots[parent.0].attached;
        self.slots[parent.0].children.insert(0, *child);
        self.slots[child.0].parent = Some(*parent);
        self.set_attached(*child, attached);
        self.mutations += 1;
    }

    fn remove(&mut self, node: &NodeId) {
        let Some(parent) = self.parent(*node) else {
            return;
        };
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.retain(|c| c != node);
        }
        if let Some(slot) = self.slot_mut(*node) {
            slot.parent = None;
        }
        self.set_attached(*node, false);
        self.mutations += 1;
    }
}

impl MockDom {
    fn set_attached(&mut self, id: NodeId, attached: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slot_mut(current) {
                slot.attached = attached;
                stack.extend(slot.children.iter().copied());
            }
        }
    }
}
