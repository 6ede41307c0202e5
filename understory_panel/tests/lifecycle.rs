// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open/close lifecycle, hooks, overflow attribution, and fitting.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{BODY, ESCAPE, Ev, HTML, setup};
use kurbo::{Insets, Rect};
use understory_listener::Phase;
use understory_panel::attributes::{
    FITTED, OPEN, OVERFLOW_LEFT, OVERFLOW_RIGHT, X_DIRECTION, Y_DIRECTION,
};
use understory_panel::{
    Edge, Namespace, OpenParams, Panel, PanelBuilder, PanelFeatures, PanelOptions, PanelState,
};

#[test]
fn starts_closed_and_toggles_strictly() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let panel = Panel::new(&ctx, node, PanelOptions::default());
    assert_eq!(panel.state(), PanelState::Closed);

    for n in 1..=5 {
        panel.toggle();
        assert_eq!(panel.is_open(), n % 2 == 1, "after {n} toggles");
    }
}

#[test]
fn double_open_and_double_close_are_no_ops() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let opens = Rc::new(Cell::new(0));
    let closes = Rc::new(Cell::new(0));
    let panel = {
        let (opens, closes) = (opens.clone(), closes.clone());
        PanelBuilder::new(node)
            .on_open(move |_| opens.set(opens.get() + 1))
            .on_close(move || closes.set(closes.get() + 1))
            .build(&ctx)
    };

    panel.close();
    panel.open(OpenParams::new());
    panel.open(OpenParams::new());
    assert_eq!(opens.get(), 1);
    assert_eq!(ctx.hub().queue_len(HTML, "keydown", Some(ESCAPE)), 1);

    panel.close();
    panel.close();
    assert_eq!(closes.get(), 1);
    assert_eq!(ctx.hub().bound_count(), 0);
}

#[test]
fn open_then_close_restores_attributes() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.set_rect(node, Rect::new(-10.0, 5.0, 90.0, 45.0));
    {
        use understory_listener::ListenerHost;
        dom.set_attribute(node, "style", "color: red");
        dom.set_attribute(node, X_DIRECTION, "left");
    }
    let before = dom.attributes(node);

    let options = PanelOptions::new().enable(PanelFeatures::ATTRIBUTE_OVERFLOW | PanelFeatures::FIT);
    let panel = Panel::new(&ctx, node, options);
    panel.open(OpenParams::new());

    assert_eq!(dom.attr(node, OPEN).as_deref(), Some(""));
    assert_eq!(dom.attr(node, OVERFLOW_LEFT).as_deref(), Some("-10"));
    assert_eq!(dom.attr(node, X_DIRECTION).as_deref(), Some("right"));
    assert_eq!(dom.attr(node, FITTED).as_deref(), Some(""));
    assert_eq!(dom.style(node, "transform").as_deref(), Some("translate(10px, 0px)"));
    assert!(panel.is_fitted());

    panel.close();
    assert_eq!(dom.attributes(node), before);
    assert!(!panel.is_fitted());
    assert_eq!(panel.overflow(), None);

    panel.close();
    assert_eq!(dom.attributes(node), before);
}

#[test]
fn overflow_prefers_the_roomier_side() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.offsets
        .borrow_mut()
        .insert(node, Insets::new(-10.0, 5.0, 50.0, 5.0));

    let options = PanelOptions::new().enable(PanelFeatures::ATTRIBUTE_OVERFLOW);
    let panel = Panel::new(&ctx, node, options);
    panel.open(OpenParams::new());

    let overflow = panel.overflow().unwrap();
    assert_eq!(overflow.left, Some(-10.0));
    assert_eq!(overflow.x_direction, Some(Edge::Right));
    assert_eq!(overflow.y_direction, None);
    assert_eq!(dom.attr(node, OVERFLOW_LEFT).as_deref(), Some("-10"));
    assert_eq!(dom.attr(node, OVERFLOW_RIGHT), None);
    assert_eq!(dom.attr(node, X_DIRECTION).as_deref(), Some("right"));
    assert_eq!(dom.attr(node, Y_DIRECTION), None);
    // Attribution alone does not move the node.
    assert_eq!(dom.attr(node, FITTED), None);
    assert_eq!(dom.style(node, "transform"), None);

    panel.close();
    assert_eq!(dom.attr(node, OVERFLOW_LEFT), None);
    assert_eq!(dom.attr(node, X_DIRECTION), None);
}

#[test]
fn fitting_in_place_translates_vertically() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.set_rect(node, Rect::new(10.0, 580.0, 60.0, 640.0));

    let panel = Panel::new(&ctx, node, PanelOptions::new().enable(PanelFeatures::FIT));
    panel.open(OpenParams::new());
    assert_eq!(dom.style(node, "transform").as_deref(), Some("translate(0px, -40px)"));

    // Fitting again uses the recorded overflow and does not compound.
    panel.fit();
    assert_eq!(dom.style(node, "transform").as_deref(), Some("translate(0px, -40px)"));

    panel.close();
    assert_eq!(dom.style(node, "transform"), None);
}

#[test]
fn panel_inside_the_viewport_is_not_fitted() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.set_rect(node, Rect::new(10.0, 10.0, 60.0, 60.0));

    let panel = Panel::new(&ctx, node, PanelOptions::new().enable(PanelFeatures::FIT));
    panel.open(OpenParams::new());
    assert!(!panel.is_fitted());
    assert_eq!(dom.attr(node, FITTED), None);
    assert_eq!(dom.attr(node, "style"), None);
}

#[test]
fn hooks_and_closing_callback_run_in_order() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let log = Rc::new(RefCell::new(Vec::new()));
    let panel = {
        let (on_open, on_close) = (log.clone(), log.clone());
        let hub = ctx.hub().clone();
        PanelBuilder::new(node)
            .on_open(move |_| on_open.borrow_mut().push("open"))
            .on_close(move || {
                // Session bindings are still live while the hook runs.
                assert_eq!(hub.queue_len(HTML, "keydown", Some(ESCAPE)), 1);
                on_close.borrow_mut().push("close");
            })
            .build(&ctx)
    };

    let closed = log.clone();
    panel.open(OpenParams::new().on_closed(move || closed.borrow_mut().push("closed")));
    panel.close();
    assert_eq!(*log.borrow(), ["open", "close", "closed"]);

    // The callback belonged to the first session only.
    panel.open(OpenParams::new());
    panel.close();
    assert_eq!(*log.borrow(), ["open", "close", "closed", "open", "close"]);
}

#[test]
fn close_without_open_has_no_callback_to_run() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let panel = Panel::new(&ctx, node, PanelOptions::default());
    panel.close();
    assert_eq!(panel.state(), PanelState::Closed);
    assert_eq!(dom.attr(node, OPEN), None);
}

#[test]
fn hook_that_closes_ends_the_session_immediately() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let slot: Rc<RefCell<Option<Panel<u32, Ev, common::MockDom>>>> = Rc::default();
    let panel = {
        let slot = slot.clone();
        PanelBuilder::new(node)
            .on_open(move |_| {
                if let Some(panel) = slot.borrow().as_ref() {
                    panel.close();
                }
            })
            .build(&ctx)
    };
    *slot.borrow_mut() = Some(panel.clone());

    let closed = Rc::new(Cell::new(false));
    let flag = closed.clone();
    panel.open(OpenParams::new().on_closed(move || flag.set(true)));
    assert!(!panel.is_open());
    assert!(closed.get());
    assert_eq!(ctx.hub().bound_count(), 0);
    slot.borrow_mut().take();
}

#[test]
fn context_menu_is_suppressed_until_the_next_tick() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let panel = Panel::new(&ctx, node, PanelOptions::default());
    panel.open(OpenParams::new());

    let event = Ev::at(BODY);
    ctx.hub().dispatch(HTML, "contextmenu", Phase::Bubble, &event);
    assert!(event.prevented.get());
    assert_eq!(panel.listener_count(Namespace::ContextMenu), 1);

    ctx.ticks().run_pending();
    let event = Ev::at(BODY);
    ctx.hub().dispatch(HTML, "contextmenu", Phase::Bubble, &event);
    assert!(!event.prevented.get());
    assert_eq!(panel.listener_count(Namespace::ContextMenu), 0);
    assert_eq!(ctx.hub().native_count(HTML, "contextmenu"), 0);
}

#[test]
fn context_menu_suppression_can_be_disabled() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let options = PanelOptions::new().disable(PanelFeatures::SUPPRESS_CONTEXT_MENU);
    let panel = Panel::new(&ctx, node, options);
    panel.open(OpenParams::new());
    assert_eq!(ctx.hub().native_count(HTML, "contextmenu"), 0);
}

#[test]
fn waiting_for_layout_defers_measurement_by_one_tick() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.set_rect(node, Rect::new(-10.0, 5.0, 90.0, 45.0));
    let options = PanelOptions::new()
        .enable(PanelFeatures::WAIT_FOR_LAYOUT | PanelFeatures::ATTRIBUTE_OVERFLOW);
    let panel = Panel::new(&ctx, node, options);

    panel.open(OpenParams::new());
    assert!(panel.is_open());
    assert_eq!(panel.overflow(), None);
    assert_eq!(dom.attr(node, OVERFLOW_LEFT), None);
    assert_eq!(ctx.hub().queue_len(HTML, "keydown", Some(ESCAPE)), 0);

    ctx.ticks().run_pending();
    assert_eq!(panel.overflow().and_then(|o| o.left), Some(-10.0));
    assert_eq!(dom.attr(node, OVERFLOW_LEFT).as_deref(), Some("-10"));
    assert_eq!(ctx.hub().queue_len(HTML, "keydown", Some(ESCAPE)), 1);
}

#[test]
fn deferred_steps_of_an_ended_session_do_nothing() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    dom.set_rect(node, Rect::new(-10.0, 5.0, 90.0, 45.0));
    let options = PanelOptions::new()
        .enable(PanelFeatures::WAIT_FOR_LAYOUT | PanelFeatures::ATTRIBUTE_OVERFLOW);
    let panel = Panel::new(&ctx, node, options);

    panel.open(OpenParams::new());
    panel.close();
    ctx.ticks().run_pending();
    assert_eq!(panel.overflow(), None);
    assert_eq!(dom.attr(node, OVERFLOW_LEFT), None);
    assert_eq!(ctx.hub().bound_count(), 0);

    // Reopening before the tick: only the newest session's steps run.
    panel.open(OpenParams::new());
    panel.close();
    panel.open(OpenParams::new());
    ctx.ticks().run_pending();
    assert_eq!(ctx.hub().queue_len(HTML, "keydown", Some(ESCAPE)), 1);
}

#[test]
fn destroy_releases_everything_and_forgets_the_node() {
    let (dom, ctx) = setup();
    let node = dom.create(BODY);
    let panel = Panel::new(&ctx, node, PanelOptions::new().enable(PanelFeatures::DETACH));
    assert!(ctx.panel_for(node).is_some_and(|p| p.ptr_eq(&panel)));

    panel.open(OpenParams::new());
    ctx.ticks().run_pending();
    assert!(panel.is_detached());

    panel.destroy();
    assert!(!panel.is_open());
    assert!(!panel.is_detached());
    assert_eq!(ctx.hub().bound_count(), 0);
    assert!(ctx.panel_for(node).is_none());
    assert_eq!(ctx.panel_count(), 0);

    panel.open(OpenParams::new());
    assert!(!panel.is_open());
}
