//! Start overlay and key hint panel.

use web_sys as web;

const START_OVERLAY: &str = "start-overlay";
const HINT: &str = "hint";

fn set_visible(document: &web::Document, element_id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let style = if visible { "" } else { "display:none" };
        let _ = el.set_attribute("style", style);
    }
}

fn is_hidden(document: &web::Document, element_id: &str) -> bool {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.get_attribute("style"))
        .map(|s| s.contains("display:none"))
        .unwrap_or(false)
}

/// Dismiss the "click to start" overlay after the first gesture.
#[inline]
pub fn hide_start(document: &web::Document) {
    set_visible(document, START_OVERLAY, false);
}

pub fn toggle_hint(document: &web::Document) {
    let show = is_hidden(document, HINT);
    set_visible(document, HINT, show);
}
