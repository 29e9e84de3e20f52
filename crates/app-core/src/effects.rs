//! Visual effects spawned by fired cells, advanced once per render frame.
//!
//! Each archetype is a variant of `EffectKind`; `update` consumes an effect
//! and returns its next state, or `None` once the archetype's termination
//! condition is met. Ripple and star are purely time-driven, gravity and
//! splash carry per-frame physics state.

use crate::constants::*;
use crate::layer::EffectArchetype;
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;

/// One splash particle. `offset` and `velocity` are in grid units with
/// `x` along columns and `y` along rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub scale: f32,
}

pub type Particles = SmallVec<[Particle; SPLASH_PARTICLES]>;

#[derive(Clone, Debug, PartialEq)]
pub enum EffectKind {
    Ripple,
    Gravity {
        y: f32,
        dy: f32,
        /// Height the next rebound should reach, shrinking per contact.
        bounce_height: f32,
        last_rebound: Option<f32>,
    },
    Splash {
        particles: Particles,
    },
    Star,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub id: u64,
    pub layer: usize,
    pub row: usize,
    pub col: usize,
    pub color_rgb: [f32; 3],
    pub created_ms: f64,
    pub kind: EffectKind,
}

impl Effect {
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.created_ms).max(0.0)
    }

    pub fn archetype(&self) -> EffectArchetype {
        match self.kind {
            EffectKind::Ripple => EffectArchetype::Ripple,
            EffectKind::Gravity { .. } => EffectArchetype::Gravity,
            EffectKind::Splash { .. } => EffectArchetype::Splash,
            EffectKind::Star => EffectArchetype::Star,
        }
    }
}

/// Upward velocity that lifts a point back to `bounce_height`.
/// A non-positive or non-finite height yields 0 instead of NaN.
pub fn rebound_velocity(bounce_height: f32) -> f32 {
    let v_squared = 2.0 * GRAVITY * bounce_height;
    if v_squared.is_finite() && v_squared > 0.0 {
        -v_squared.sqrt()
    } else {
        0.0
    }
}

pub fn gravity_from_row(origin_y: f32) -> EffectKind {
    EffectKind::Gravity {
        y: origin_y,
        dy: 0.0,
        bounce_height: GRAVITY_FLOOR_ROW - origin_y,
        last_rebound: None,
    }
}

pub fn splash_particles<R: Rng + ?Sized>(rng: &mut R) -> Particles {
    (0..SPLASH_PARTICLES)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / SPLASH_PARTICLES as f32;
            let speed = rng.gen_range(SPLASH_SPEED_MIN..SPLASH_SPEED_MAX);
            Particle {
                offset: Vec2::ZERO,
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                scale: 1.0,
            }
        })
        .collect()
}

fn step_gravity(kind: EffectKind) -> Option<EffectKind> {
    let (mut y, mut dy, mut bounce_height, last_rebound) = match kind {
        EffectKind::Gravity {
            y,
            dy,
            bounce_height,
            last_rebound,
        } => (y, dy, bounce_height, last_rebound),
        other => return Some(other),
    };

    if let Some(v) = last_rebound {
        if v.abs() < GRAVITY_REST_VELOCITY && GRAVITY_FLOOR_ROW - y <= GRAVITY_REST_DISTANCE {
            return None;
        }
    }

    y += dy;
    dy += GRAVITY;
    let mut rebound = last_rebound;
    if y >= GRAVITY_FLOOR_ROW {
        y = GRAVITY_FLOOR_ROW;
        let v = rebound_velocity(bounce_height);
        dy = v;
        bounce_height *= GRAVITY_RESTITUTION;
        rebound = Some(v);
    }
    Some(EffectKind::Gravity {
        y,
        dy,
        bounce_height,
        last_rebound: rebound,
    })
}

fn step_splash(mut particles: Particles) -> Option<EffectKind> {
    for p in particles.iter_mut() {
        p.offset += p.velocity;
        p.velocity.y += SPLASH_DRIFT;
        p.life -= SPLASH_LIFE_DECAY;
        p.scale *= SPLASH_SCALE_DECAY;
    }
    particles.retain(|p| p.life > 0.0);
    (!particles.is_empty()).then_some(EffectKind::Splash { particles })
}

/// Advance one effect by a single frame.
pub fn update(mut effect: Effect, now_ms: f64) -> Option<Effect> {
    let age = effect.age_ms(now_ms);
    effect.kind = match effect.kind {
        EffectKind::Ripple if age > RIPPLE_LIFETIME_MS => return None,
        EffectKind::Star if age >= STAR_LIFETIME_MS => return None,
        EffectKind::Gravity { .. } if age > GRAVITY_TIMEOUT_MS => return None,
        kind @ (EffectKind::Ripple | EffectKind::Star) => kind,
        kind @ EffectKind::Gravity { .. } => step_gravity(kind)?,
        EffectKind::Splash { particles } => step_splash(particles)?,
    };
    Some(effect)
}

/// Bounded, creation-ordered collection of live effects.
#[derive(Debug)]
pub struct EffectStore {
    effects: Vec<Effect>,
    capacity: usize,
    next_id: u64,
    rng: StdRng,
}

impl EffectStore {
    pub fn new(seed: u64) -> Self {
        Self::with_capacity(MAX_EFFECTS, seed)
    }

    pub fn with_capacity(capacity: usize, seed: u64) -> Self {
        Self {
            effects: Vec::with_capacity(capacity),
            capacity,
            next_id: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Create an effect of `archetype` at (row, col). Rejected once the
    /// store is full; returns whether it was inserted.
    pub fn spawn(
        &mut self,
        archetype: EffectArchetype,
        layer: usize,
        row: usize,
        col: usize,
        color_rgb: [f32; 3],
        now_ms: f64,
    ) -> bool {
        if self.effects.len() >= self.capacity {
            return false;
        }
        let kind = match archetype {
            EffectArchetype::Ripple => EffectKind::Ripple,
            EffectArchetype::Gravity => gravity_from_row(row as f32),
            EffectArchetype::Splash => EffectKind::Splash {
                particles: splash_particles(&mut self.rng),
            },
            EffectArchetype::Star => EffectKind::Star,
        };
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.effects.push(Effect {
            id,
            layer,
            row,
            col,
            color_rgb,
            created_ms: now_ms,
            kind,
        });
        true
    }

    /// Advance every effect one frame, drop finished ones and keep at most
    /// `capacity` of the most recent.
    pub fn step(&mut self, now_ms: f64) {
        self.effects = std::mem::take(&mut self.effects)
            .into_iter()
            .filter_map(|e| update(e, now_ms))
            .collect();
        if self.effects.len() > self.capacity {
            let excess = self.effects.len() - self.capacity;
            self.effects.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_trims_overfull_store_to_most_recent() {
        let mut store = EffectStore::with_capacity(4, 1);
        for i in 0..6u64 {
            store.effects.push(Effect {
                id: i,
                layer: 0,
                row: 0,
                col: 0,
                color_rgb: [1.0; 3],
                created_ms: 0.0,
                kind: EffectKind::Star,
            });
        }
        store.step(10.0);
        assert_eq!(store.len(), 4);
        let ids: Vec<u64> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn gravity_step_leaves_other_kinds_alone() {
        assert_eq!(step_gravity(EffectKind::Star), Some(EffectKind::Star));
    }
}
