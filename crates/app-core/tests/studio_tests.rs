// End-to-end tests for the studio store: ticks, triggers, effects and commands.

use app_core::*;

#[derive(Default)]
struct RecordingSynth {
    tones: Vec<(usize, Waveform, i32, f32)>,
    hits: Vec<(usize, f32)>,
}

impl Synth for RecordingSynth {
    fn trigger_tone(&mut self, row: usize, waveform: Waveform, octave_offset: i32, volume: f32) {
        self.tones.push((row, waveform, octave_offset, volume));
    }
    fn trigger_percussion(&mut self, row: usize, volume: f32) {
        self.hits.push((row, volume));
    }
}

fn run_ticks(studio: &mut Studio, n: usize, synth: &mut RecordingSynth) -> Vec<Trigger> {
    let mut all = Vec::new();
    for i in 0..n {
        let mut triggers = Vec::new();
        studio.tick(i as f64 * 125.0, &mut triggers);
        for t in &triggers {
            t.fire(synth);
        }
        all.extend(triggers);
    }
    all
}

#[test]
fn active_cell_fires_once_when_its_column_plays() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 10, 3);
    assert_eq!(studio.play(), ClockAction::Start);

    let mut synth = RecordingSynth::default();
    let triggers = run_ticks(&mut studio, 4, &mut synth);

    assert_eq!(studio.current_step_column(), 3);
    assert_eq!(
        triggers,
        vec![Trigger::Tone {
            layer: 0,
            row: 10,
            waveform: Waveform::Sine,
            octave_offset: 0,
            volume: LAYER_VOLUME_DEFAULT,
        }]
    );
    assert_eq!(synth.tones.len(), 1);
    assert_eq!(synth.tones[0].0, 10);
    assert!(synth.hits.is_empty());

    let effects: Vec<&Effect> = studio.effects().iter().collect();
    assert_eq!(effects.len(), 1);
    let e = effects[0];
    assert_eq!((e.layer, e.row, e.col), (0, 10, 3));
    assert_eq!(e.archetype(), EffectArchetype::Ripple);
    assert!(studio.has_live_effects());
}

#[test]
fn stopped_studio_produces_nothing() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 0, 0);
    let mut triggers = Vec::new();
    assert_eq!(studio.tick(0.0, &mut triggers), None);
    assert!(triggers.is_empty());
    assert!(!studio.has_live_effects());
    assert_eq!(studio.current_step_column(), -1);
}

#[test]
fn drum_layer_fires_percussion() {
    let mut studio = Studio::default();
    studio.toggle_cell(2, 13, 0);
    studio.set_volume(2, 0.5);
    studio.play();
    let mut synth = RecordingSynth::default();
    run_ticks(&mut studio, 1, &mut synth);
    assert_eq!(synth.hits, vec![(13, 0.5)]);
    assert!(synth.tones.is_empty());
    let e = studio.effects().iter().next().unwrap();
    assert_eq!(e.archetype(), EffectArchetype::Splash);
}

#[test]
fn layers_keep_their_own_voice_settings() {
    let mut studio = Studio::default();
    for layer in [0, 1, 3] {
        studio.toggle_cell(layer, 5, 0);
    }
    studio.play();
    let mut synth = RecordingSynth::default();
    run_ticks(&mut studio, 1, &mut synth);
    let mut tones = synth.tones.clone();
    tones.sort_by_key(|t| t.2);
    assert_eq!(
        tones.iter().map(|t| (t.1, t.2)).collect::<Vec<_>>(),
        vec![
            (Waveform::Triangle, -1),
            (Waveform::Sine, 0),
            (Waveform::Square, 1)
        ]
    );
}

#[test]
fn effect_store_caps_while_audio_keeps_firing() {
    let mut studio = Studio::default();
    for layer in 0..LAYER_COUNT {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                studio.toggle_cell(layer, row, col);
            }
        }
    }
    studio.play();
    let mut synth = RecordingSynth::default();
    let triggers = run_ticks(&mut studio, 3, &mut synth);
    assert_eq!(triggers.len(), 3 * LAYER_COUNT * GRID_SIZE);
    assert_eq!(studio.effects().len(), MAX_EFFECTS);
}

#[test]
fn clear_active_layer_leaves_other_layers_untouched() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 1, 1);
    studio.toggle_cell(1, 2, 2);
    studio.toggle_cell(3, 3, 3);
    studio.select_layer(1);
    studio.clear_active_layer();
    assert!(studio.grid(1).unwrap().is_empty());
    assert!(studio.grid(0).unwrap().get(1, 1));
    assert!(studio.grid(3).unwrap().get(3, 3));
}

#[test]
fn volume_and_layer_selection_are_clamped() {
    let mut studio = Studio::default();
    studio.set_volume(0, 5.0);
    assert_eq!(studio.layer(0).unwrap().volume(), 1.0);
    studio.set_volume(0, -5.0);
    assert_eq!(studio.layer(0).unwrap().volume(), 0.0);
    studio.set_volume(9, 0.5);
    studio.select_layer(7);
    assert_eq!(studio.active_layer(), 0);
}

#[test]
fn tempo_changes_restart_a_running_clock() {
    let mut studio = Studio::default();
    assert_eq!(studio.set_tempo(150.0), ClockAction::None);
    studio.play();
    assert_eq!(studio.set_tempo(1000.0), ClockAction::Restart);
    assert_eq!(studio.transport().bpm(), BPM_MAX);
    assert_eq!(studio.apply(Command::TempoUp), ClockAction::None);
    assert_eq!(studio.apply(Command::TempoDown), ClockAction::Restart);
    assert_eq!(studio.transport().bpm(), BPM_MAX - TEMPO_NUDGE_BPM);
}

#[test]
fn commands_drive_play_state_and_layers() {
    let mut studio = Studio::default();
    assert_eq!(studio.apply(Command::TogglePlay), ClockAction::Start);
    assert_eq!(studio.apply(Command::TogglePlay), ClockAction::Stop);
    assert_eq!(studio.pause(), ClockAction::None);

    studio.apply(Command::SelectLayer(3));
    assert_eq!(studio.active_layer(), 3);
    studio.apply(Command::CycleArchetype);
    assert_eq!(studio.layer(3).unwrap().archetype, EffectArchetype::Ripple);

    studio.apply(Command::VolumeDown);
    let v = studio.layer(3).unwrap().volume();
    assert!((v - (LAYER_VOLUME_DEFAULT - LAYER_VOLUME_STEP)).abs() < 1e-6);
    for _ in 0..20 {
        studio.apply(Command::VolumeUp);
    }
    assert_eq!(studio.layer(3).unwrap().volume(), 1.0);

    studio.toggle_cell(3, 0, 0);
    studio.apply(Command::ClearLayer);
    assert!(studio.grid(3).unwrap().is_empty());
    assert_eq!(studio.apply(Command::MasterGainUp), ClockAction::None);
}

#[test]
fn paint_targets_the_displayed_layer() {
    let mut studio = Studio::default();
    studio.select_layer(2);
    studio.paint(PaintAction::Toggle { row: 4, col: 4 });
    studio.paint(PaintAction::Activate { row: 4, col: 5 });
    studio.paint(PaintAction::Activate { row: 4, col: 4 });
    let grid = studio.grid(2).unwrap();
    assert!(grid.get(4, 4) && grid.get(4, 5));
    assert!(studio.grid(0).unwrap().is_empty());
}

#[test]
fn snapshot_mirrors_displayed_layer() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 6, 0);
    studio.toggle_cell(1, 7, 0);
    studio.play();
    let mut triggers = Vec::new();
    studio.tick(0.0, &mut triggers);

    let snap = studio.snapshot(0.0);
    assert_eq!(snap.layer, 0);
    assert_eq!(snap.layer_name, "Lead");
    assert_eq!(snap.step_column, 0);
    assert!(snap.running);
    assert_eq!(snap.live_effects, 2);
    assert!(snap.cells[6][0].active);
    assert!(!snap.cells[7][0].active);
    assert_eq!(snap.cells[6][0].brightness, 1.0);
    assert!(snap
        .cells
        .iter()
        .flatten()
        .all(|c| (0.0..=1.0).contains(&c.brightness)));
}

#[test]
fn effects_drain_after_frames() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 0, 0);
    studio.play();
    let mut triggers = Vec::new();
    studio.tick(0.0, &mut triggers);
    assert!(studio.has_live_effects());
    studio.step_effects(700.0);
    assert!(!studio.has_live_effects());
}

#[test]
fn cell_colours_follow_activity_and_playhead() {
    let mut studio = Studio::default();
    studio.toggle_cell(0, 4, 0);
    let lead = studio.layer(0).unwrap().color_rgb;

    let idle = studio.snapshot(0.0);
    assert_eq!(idle.cell_rgb(4, 0), lead);
    assert_eq!(idle.cell_rgb(4, 1), CELL_IDLE_RGB);
    // Out of range falls back to idle
    assert_eq!(idle.cell_rgb(99, 0), CELL_IDLE_RGB);

    studio.play();
    let mut out = Vec::new();
    studio.tick(0.0, &mut out);
    let playing = studio.snapshot(0.0);
    let lifted = playing.cell_rgb(9, 0);
    for (c, idle) in lifted.iter().zip(CELL_IDLE_RGB) {
        assert!((c - (idle + PLAYHEAD_LIFT)).abs() < 1e-6);
    }
}
