// Pointer position to grid cell. Free of web-sys so host tests can include it.

use app_core::cell_in_surface;

/// Canvas bounding box in CSS pixels, as `getBoundingClientRect` reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Cell under a pointer given in client coordinates. The grid is drawn as a
/// centred square, so the bands beside it map to nothing.
pub fn pointer_cell(client_x: f64, client_y: f64, rect: CanvasRect) -> Option<(usize, usize)> {
    let x = (client_x - rect.left) as f32;
    let y = (client_y - rect.top) as f32;
    cell_in_surface(x, y, rect.width as f32, rect.height as f32)
}
