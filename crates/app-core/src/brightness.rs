//! Per-cell intensity from the live effects of one layer.

use crate::constants::*;
use crate::effects::{Effect, EffectKind};

fn ripple(effect: &Effect, row: usize, col: usize, age_ms: f64) -> f32 {
    if age_ms > RIPPLE_LIFETIME_MS {
        return 0.0;
    }
    let radius = age_ms as f32 * RIPPLE_SPEED_PER_MS;
    let dr = (row as f32 - effect.row as f32).abs();
    let dc = (col as f32 - effect.col as f32).abs();
    let delta = (dr.max(dc) - radius).abs();
    if delta >= RIPPLE_WIDTH {
        return 0.0;
    }
    let fade = 1.0 - (age_ms / RIPPLE_LIFETIME_MS) as f32;
    (1.0 - delta / RIPPLE_WIDTH) * fade
}

fn gravity(effect: &Effect, row: usize, col: usize, y: f32) -> f32 {
    if col != effect.col {
        return 0.0;
    }
    let dist = (row as f32 - y).abs();
    (1.0 - dist).max(0.0)
}

fn splash(effect: &Effect, row: usize, col: usize, particles: &[crate::effects::Particle]) -> f32 {
    let cell = glam::Vec2::new(col as f32, row as f32);
    let origin = glam::Vec2::new(effect.col as f32, effect.row as f32);
    particles
        .iter()
        .map(|p| {
            let dist = cell.distance(origin + p.offset);
            if dist < 1.0 {
                p.life.max(0.0) * p.scale * (1.0 - dist)
            } else {
                0.0
            }
        })
        .sum()
}

fn star(effect: &Effect, row: usize, col: usize, age_ms: f64) -> f32 {
    if age_ms >= STAR_LIFETIME_MS {
        return 0.0;
    }
    let intensity = 1.0 - (age_ms / STAR_LIFETIME_MS) as f32;
    let dr = (row as i32 - effect.row as i32).abs();
    let dc = (col as i32 - effect.col as i32).abs();
    if (dr == 0 || dc == 0) && dr.max(dc) < STAR_ARM_LENGTH {
        intensity
    } else if dr == dc && dr < STAR_DIAGONAL_LENGTH {
        intensity * STAR_DIAGONAL_WEIGHT
    } else {
        0.0
    }
}

/// Local contribution of a single effect to cell (row, col).
pub fn contribution(effect: &Effect, row: usize, col: usize, now_ms: f64) -> f32 {
    let age_ms = effect.age_ms(now_ms);
    let value = match &effect.kind {
        EffectKind::Ripple => ripple(effect, row, col, age_ms),
        EffectKind::Gravity { y, .. } => gravity(effect, row, col, *y),
        EffectKind::Splash { particles } => splash(effect, row, col, particles),
        EffectKind::Star => star(effect, row, col, age_ms),
    };
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Summed, clamped intensity at (row, col) from the effects owned by `layer`.
/// Accumulation stops as soon as the sum saturates.
pub fn brightness<'a>(
    effects: impl IntoIterator<Item = &'a Effect>,
    layer: usize,
    row: usize,
    col: usize,
    now_ms: f64,
) -> f32 {
    let mut sum = 0.0_f32;
    for effect in effects.into_iter().filter(|e| e.layer == layer) {
        sum += contribution(effect, row, col, now_ms);
        if sum >= 1.0 {
            break;
        }
    }
    sum.clamp(0.0, 1.0)
}
