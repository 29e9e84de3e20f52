use crate::input::{pointer_cell, CanvasRect};
use crate::App;
use app_core::{command_for_key, Command, PaintGesture, LAYER_COUNT};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::JsCast;
use web_sys as web;

fn canvas_cell(canvas: &web::HtmlCanvasElement, ev: &web::PointerEvent) -> Option<(usize, usize)> {
    let r = canvas.get_bounding_client_rect();
    let rect = CanvasRect {
        left: r.left(),
        top: r.top(),
        width: r.width(),
        height: r.height(),
    };
    pointer_cell(ev.client_x() as f64, ev.client_y() as f64, rect)
}

fn listen<E>(target: &web::EventTarget, event: &str, handler: impl FnMut(E) + 'static)
where
    E: 'static,
    dyn FnMut(E): WasmClosure,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("[input] could not listen for {event}: {e:?}");
    }
    closure.forget();
}

pub fn wire_keyboard(window: &web::Window, app: App) {
    listen(window, "keydown", move |ev: web::KeyboardEvent| {
        let Some(command) = command_for_key(&ev.key()) else {
            return;
        };
        if ev.repeat() && command == Command::TogglePlay {
            return;
        }
        ev.prevent_default();
        app.wake();
        app.handle_command(command);
    });
}

/// Press paints the cell under the pointer; dragging activates every cell
/// it crosses until release.
pub fn wire_pointer(window: &web::Window, canvas: &web::HtmlCanvasElement, app: App) {
    let gesture = Rc::new(RefCell::new(PaintGesture::default()));

    {
        let app = app.clone();
        let gesture = gesture.clone();
        let canvas_down = canvas.clone();
        listen(canvas, "pointerdown", move |ev: web::PointerEvent| {
            app.wake();
            let _ = canvas_down.set_pointer_capture(ev.pointer_id());
            let cell = canvas_cell(&canvas_down, &ev);
            if let Some(action) = gesture.borrow_mut().press(cell) {
                app.paint(action);
            }
            ev.prevent_default();
        });
    }
    {
        let gesture = gesture.clone();
        let canvas_move = canvas.clone();
        listen(canvas, "pointermove", move |ev: web::PointerEvent| {
            if !gesture.borrow().is_active() {
                return;
            }
            let cell = canvas_cell(&canvas_move, &ev);
            if let Some(action) = gesture.borrow_mut().drag(cell) {
                app.paint(action);
            }
        });
    }
    for name in ["pointerup", "pointercancel"] {
        let gesture = gesture.clone();
        listen(window, name, move |_: web::PointerEvent| {
            gesture.borrow_mut().release();
        });
    }
}

/// Optional on-page controls; any that are missing from the page are skipped.
pub fn wire_buttons(document: &web::Document, app: &App) {
    let bind = |id: &str, command: Command| {
        let app = app.clone();
        crate::dom::add_click_listener(document, id, move || {
            app.wake();
            app.handle_command(command);
        });
    };
    bind("play-toggle", Command::TogglePlay);
    bind("clear-layer", Command::ClearLayer);
    bind("cycle-effect", Command::CycleArchetype);
    bind("tempo-up", Command::TempoUp);
    bind("tempo-down", Command::TempoDown);
    for layer in 0..LAYER_COUNT {
        bind(&format!("layer-{layer}"), Command::SelectLayer(layer));
    }
}
