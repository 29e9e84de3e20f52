//! Canvas 2D grid painter.

use app_core::{grid_rect, GridSnapshot, GRID_SIZE};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

const BACKGROUND: &str = "#07070a";
const CELL_GAP: f64 = 0.06; // fraction of a cell left as gutter

fn css_rgb([r, g, b]: [f32; 3]) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgb({},{},{})", byte(r), byte(g), byte(b))
}

pub struct GridPainter {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl GridPainter {
    pub fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("getContext failed: {e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        Ok(Self { canvas, ctx })
    }

    #[allow(deprecated)]
    fn fill(&self, css: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(css));
    }

    pub fn draw(&self, snapshot: &GridSnapshot) {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        self.fill(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, width, height);

        let (left, top, side) = grid_rect(width as f32, height as f32);
        let pitch = side as f64 / GRID_SIZE as f64;
        let gap = pitch * CELL_GAP;
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                self.fill(&css_rgb(snapshot.cell_rgb(row, col)));
                self.ctx.fill_rect(
                    left as f64 + col as f64 * pitch + gap / 2.0,
                    top as f64 + row as f64 * pitch + gap / 2.0,
                    pitch - gap,
                    pitch - gap,
                );
            }
        }
    }
}
