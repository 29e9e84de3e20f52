// Host-side tests for the effect archetypes and the bounded effect store.

use app_core::*;

const FRAME_MS: f64 = 16.0;

fn effect_at(kind: EffectKind, row: usize, col: usize) -> Effect {
    Effect {
        id: 0,
        layer: 0,
        row,
        col,
        color_rgb: [1.0; 3],
        created_ms: 0.0,
        kind,
    }
}

#[test]
fn splash_spawns_twelve_evenly_spread_particles() {
    let mut store = EffectStore::new(7);
    assert!(store.spawn(EffectArchetype::Splash, 2, 5, 5, [1.0; 3], 0.0));
    let effect = store.iter().next().unwrap();
    let EffectKind::Splash { particles } = &effect.kind else {
        panic!("expected splash");
    };
    assert_eq!(particles.len(), 12);
    for (i, p) in particles.iter().enumerate() {
        let speed = p.velocity.length();
        assert!((0.099..0.401).contains(&speed), "speed {speed}");
        let expected = i as f32 * std::f32::consts::TAU / 12.0;
        let dir = p.velocity / speed;
        assert!((dir.x - expected.cos()).abs() < 1e-4);
        assert!((dir.y - expected.sin()).abs() < 1e-4);
        assert_eq!(p.life, 1.0);
    }
}

#[test]
fn splash_is_removed_within_sixty_frames() {
    let mut store = EffectStore::new(7);
    store.spawn(EffectArchetype::Splash, 0, 8, 8, [1.0; 3], 0.0);
    for frame in 1..=40 {
        store.step(frame as f64 * FRAME_MS);
    }
    assert_eq!(store.len(), 1, "particles still alive after 40 frames");
    for frame in 41..=55 {
        store.step(frame as f64 * FRAME_MS);
    }
    assert!(store.is_empty());
}

#[test]
fn gravity_from_floor_rebounds_with_zero_velocity() {
    let effect = effect_at(gravity_from_row(15.5), 15, 0);
    let next = update(effect, FRAME_MS).expect("first frame keeps the effect");
    match next.kind {
        EffectKind::Gravity {
            y, last_rebound, ..
        } => {
            assert_eq!(y, GRAVITY_FLOOR_ROW);
            let v = last_rebound.expect("contact recorded");
            assert!(!v.is_nan());
            assert_eq!(v, 0.0);
        }
        _ => panic!("expected gravity"),
    }
    assert!(update(next, 2.0 * FRAME_MS).is_none(), "resting point is removed");
}

#[test]
fn rebound_velocity_is_never_nan() {
    assert_eq!(rebound_velocity(0.0), 0.0);
    assert_eq!(rebound_velocity(-3.0), 0.0);
    assert_eq!(rebound_velocity(f32::NAN), 0.0);
    let v = rebound_velocity(15.5);
    assert!((v + (2.0 * GRAVITY * 15.5).sqrt()).abs() < 1e-6);
}

#[test]
fn gravity_first_contact_reaches_full_rebound() {
    let mut effect = effect_at(gravity_from_row(0.0), 0, 4);
    for _ in 0..200 {
        effect = update(effect, 0.0).expect("still bouncing");
        if let EffectKind::Gravity {
            y,
            last_rebound: Some(v),
            ..
        } = effect.kind
        {
            assert_eq!(y, GRAVITY_FLOOR_ROW);
            assert!((v - rebound_velocity(GRAVITY_FLOOR_ROW)).abs() < 1e-6);
            return;
        }
    }
    panic!("point never reached the floor");
}

#[test]
fn gravity_comes_to_rest() {
    let mut effect = Some(effect_at(gravity_from_row(0.0), 0, 4));
    let mut frames = 0;
    while let Some(e) = effect {
        effect = update(e, 0.0);
        frames += 1;
        assert!(frames < 1000, "gravity never settled");
    }
}

#[test]
fn gravity_times_out() {
    let effect = effect_at(gravity_from_row(0.0), 0, 0);
    assert!(update(effect.clone(), 2999.0).is_some());
    assert!(update(effect, 3001.0).is_none());
}

#[test]
fn ripple_and_star_expire_by_age() {
    let ripple = effect_at(EffectKind::Ripple, 4, 4);
    assert!(update(ripple.clone(), 599.0).is_some());
    assert!(update(ripple.clone(), 600.0).is_some());
    assert!(update(ripple, 601.0).is_none());

    let star = effect_at(EffectKind::Star, 4, 4);
    assert!(update(star.clone(), 599.0).is_some());
    assert!(update(star, 600.0).is_none());
}

#[test]
fn spawn_beyond_capacity_is_rejected() {
    let mut store = EffectStore::new(1);
    for i in 0..MAX_EFFECTS {
        assert!(store.spawn(EffectArchetype::Star, 0, i % 16, i % 16, [1.0; 3], 0.0));
    }
    assert_eq!(store.len(), 150);
    assert!(!store.spawn(EffectArchetype::Ripple, 0, 0, 0, [1.0; 3], 0.0));
    assert_eq!(store.len(), 150);
    store.step(FRAME_MS);
    assert!(store.len() <= store.capacity());
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut store = EffectStore::new(3);
    for archetype in EffectArchetype::ALL {
        store.spawn(archetype, 1, 3, 3, [0.5; 3], 0.0);
    }
    let ids: Vec<u64> = store.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    let kinds: Vec<EffectArchetype> = store.iter().map(Effect::archetype).collect();
    assert_eq!(kinds, EffectArchetype::ALL.to_vec());
}

#[test]
fn step_drops_finished_effects_and_keeps_live_ones() {
    let mut store = EffectStore::new(3);
    store.spawn(EffectArchetype::Star, 0, 1, 1, [1.0; 3], 0.0);
    store.spawn(EffectArchetype::Ripple, 0, 1, 1, [1.0; 3], 500.0);
    store.step(650.0);
    assert_eq!(store.len(), 1);
    assert_eq!(store.iter().next().unwrap().archetype(), EffectArchetype::Ripple);
    store.clear();
    assert!(store.is_empty());
}
