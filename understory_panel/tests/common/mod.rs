// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory document used by the panel integration tests.

#![allow(dead_code, reason = "not every test file uses every helper")]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::{Insets, Rect, Size, Vec2};
use understory_listener::{ListenerHost, Phase, UiEvent};
use understory_panel::{Environment, PanelContext, VisualTree, offsets_in_viewport};

pub const WINDOW: u32 = 0;
pub const HTML: u32 = 1;
pub const BODY: u32 = 2;
pub const ESCAPE: u32 = 27;

#[derive(Clone, Debug, Default)]
struct NodeData {
    parent: Option<u32>,
    children: Vec<u32>,
    attributes: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    rect: Rect,
    margins: Insets,
}

/// A tiny document: a parentless window, `html`, and `body` under `html`.
///
/// Inline style lives in the `style` attribute as `name: value` pairs joined
/// by `"; "`, so snapshots of that attribute capture every style change.
#[derive(Debug)]
pub struct MockDom {
    nodes: RefCell<BTreeMap<u32, NodeData>>,
    next: Cell<u32>,
    pub scroll: Cell<Vec2>,
    pub viewport: Cell<Size>,
    pub pointer_pressed: Cell<bool>,
    /// Edge offsets reported instead of the ones derived from geometry.
    pub offsets: RefCell<BTreeMap<u32, Insets>>,
}

impl Default for MockDom {
    fn default() -> Self {
        let dom = Self {
            nodes: RefCell::default(),
            next: Cell::new(BODY + 1),
            scroll: Cell::new(Vec2::ZERO),
            viewport: Cell::new(Size::new(800.0, 600.0)),
            pointer_pressed: Cell::new(false),
            offsets: RefCell::default(),
        };
        {
            let mut nodes = dom.nodes.borrow_mut();
            nodes.insert(WINDOW, NodeData::default());
            nodes.insert(HTML, NodeData::default());
            nodes.insert(BODY, NodeData::default());
        }
        dom.attach(BODY, HTML, None);
        dom
    }
}

impl MockDom {
    /// A new node appended to `parent`.
    pub fn create(&self, parent: u32) -> u32 {
        let id = self.create_orphan();
        self.attach(id, parent, None);
        id
    }

    /// A new node outside the document.
    pub fn create_orphan(&self) -> u32 {
        let id = self.next.get();
        self.next.set(id + 1);
        self.nodes.borrow_mut().insert(id, NodeData::default());
        id
    }

    pub fn children(&self, node: u32) -> Vec<u32> {
        self.nodes.borrow()[&node].children.clone()
    }

    pub fn parent_of(&self, node: u32) -> Option<u32> {
        self.nodes.borrow()[&node].parent
    }

    pub fn set_rect(&self, node: u32, rect: Rect) {
        self.nodes.borrow_mut().get_mut(&node).unwrap().rect = rect;
    }

    pub fn set_margins(&self, node: u32, margins: Insets) {
        self.nodes.borrow_mut().get_mut(&node).unwrap().margins = margins;
    }

    /// Set a cascaded style value; descendants inherit it.
    pub fn set_computed(&self, node: u32, name: &str, value: &str) {
        self.nodes
            .borrow_mut()
            .get_mut(&node)
            .unwrap()
            .computed
            .insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, node: u32, name: &str) -> Option<String> {
        self.nodes.borrow()[&node].attributes.get(name).cloned()
    }

    pub fn attributes(&self, node: u32) -> BTreeMap<String, String> {
        self.nodes.borrow()[&node].attributes.clone()
    }

    pub fn style(&self, node: u32, name: &str) -> Option<String> {
        self.style_property(node, name)
    }

    fn detach(&self, node: u32) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes.get_mut(&node).unwrap().parent.take() else {
            return;
        };
        nodes
            .get_mut(&parent)
            .unwrap()
            .children
            .retain(|&child| child != node);
    }

    /// Insert `node` under `parent`, at `index` or at the end.
    fn attach(&self, node: u32, parent: u32, index: Option<usize>) {
        self.detach(node);
        let mut nodes = self.nodes.borrow_mut();
        let children = &mut nodes.get_mut(&parent).unwrap().children;
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        nodes.get_mut(&node).unwrap().parent = Some(parent);
    }

    fn parse_style(style: Option<String>) -> Vec<(String, String)> {
        style
            .unwrap_or_default()
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect()
    }
}

impl ListenerHost<u32> for MockDom {
    fn attribute(&self, node: u32, name: &str) -> Option<String> {
        self.attr(node, name)
    }

    fn set_attribute(&self, node: u32, name: &str, value: &str) {
        self.nodes
            .borrow_mut()
            .get_mut(&node)
            .unwrap()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, node: u32, name: &str) {
        self.nodes
            .borrow_mut()
            .get_mut(&node)
            .unwrap()
            .attributes
            .remove(name);
    }
}

impl VisualTree<u32> for MockDom {
    fn root(&self) -> u32 {
        BODY
    }

    fn document_element(&self) -> u32 {
        HTML
    }

    fn window(&self) -> u32 {
        WINDOW
    }

    fn parent(&self, node: u32) -> Option<u32> {
        self.parent_of(node)
    }

    fn clone_node(&self, node: u32) -> u32 {
        let id = self.create_orphan();
        let mut nodes = self.nodes.borrow_mut();
        let source = nodes[&node].clone();
        let copy = nodes.get_mut(&id).unwrap();
        copy.attributes = source.attributes;
        copy.computed = source.computed;
        copy.rect = source.rect;
        copy.margins = source.margins;
        id
    }

    fn insert_after(&self, node: u32, reference: u32) {
        let Some(parent) = self.parent_of(reference) else {
            self.detach(node);
            return;
        };
        self.detach(node);
        let index = self
            .children(parent)
            .iter()
            .position(|&child| child == reference)
            .map(|i| i + 1);
        self.attach(node, parent, index);
    }

    fn append_to_root(&self, node: u32) {
        self.attach(node, BODY, None);
    }

    fn remove(&self, node: u32) {
        self.detach(node);
    }

    fn bounding_rect(&self, node: u32) -> Rect {
        self.nodes.borrow()[&node].rect
    }

    fn margins(&self, node: u32) -> Insets {
        self.nodes.borrow()[&node].margins
    }

    fn style_property(&self, node: u32, name: &str) -> Option<String> {
        Self::parse_style(self.attr(node, "style"))
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    fn set_style_property(&self, node: u32, name: &str, value: &str) {
        let mut decls = Self::parse_style(self.attr(node, "style"));
        match decls.iter_mut().find(|(n, _)| n == name) {
            Some(decl) => decl.1 = value.to_string(),
            None => decls.push((name.to_string(), value.to_string())),
        }
        let style = decls
            .iter()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(node, "style", &style);
    }

    fn computed_style(&self, node: u32, name: &str) -> Option<String> {
        if let Some(inline) = self.style_property(node, name) {
            return Some(inline);
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(value) = self.nodes.borrow()[&current].computed.get(name) {
                return Some(value.clone());
            }
            cursor = self.parent_of(current);
        }
        None
    }
}

impl Environment<u32> for MockDom {
    fn current_scroll(&self) -> Vec2 {
        self.scroll.get()
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn offset_from_visible(&self, node: u32, size: Option<Size>) -> Insets {
        if let Some(offsets) = self.offsets.borrow().get(&node) {
            return *offsets;
        }
        let rect = self.bounding_rect(node);
        let rect = size.map_or(rect, |size| Rect::from_origin_size(rect.origin(), size));
        offsets_in_viewport(rect, self.viewport_size())
    }

    fn key_code(&self, name: &str) -> Option<u32> {
        (name == "escape").then_some(ESCAPE)
    }

    fn is_pointer_pressed(&self) -> bool {
        self.pointer_pressed.get()
    }
}

/// Event payload with a target, an optional key code, and a default-prevented flag.
#[derive(Debug, Default)]
pub struct Ev {
    pub target: Option<u32>,
    pub key_code: Option<u32>,
    pub prevented: Cell<bool>,
}

impl Ev {
    pub fn at(target: u32) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn key(code: u32) -> Self {
        Self {
            key_code: Some(code),
            ..Self::default()
        }
    }
}

impl UiEvent<u32> for Ev {
    fn target(&self) -> Option<u32> {
        self.target
    }

    fn key_code(&self) -> Option<u32> {
        self.key_code
    }

    fn prevent_default(&self) {
        self.prevented.set(true);
    }
}

pub type Ctx = PanelContext<u32, Ev, MockDom>;

pub fn setup() -> (Rc<MockDom>, Ctx) {
    let dom = Rc::new(MockDom::default());
    let ctx = PanelContext::new(dom.clone());
    (dom, ctx)
}

/// Deliver a pointer release on `target` to document-level listeners.
pub fn click(ctx: &Ctx, target: u32) -> Ev {
    let event = Ev::at(target);
    ctx.hub().dispatch(HTML, "pointerup", Phase::Bubble, &event);
    event
}

/// Deliver an Escape key press to document-level listeners.
pub fn press_escape(ctx: &Ctx) {
    ctx.hub()
        .dispatch(HTML, "keydown", Phase::Bubble, &Ev::key(ESCAPE));
}
