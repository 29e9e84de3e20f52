// Host-side tests for voice planning: pitch table, clamping, envelopes and
// percussion band selection.

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

#[test]
fn pitch_ratio_reads_table_and_falls_back_outside() {
    for row in 0..GRID_SIZE {
        assert_eq!(pitch_ratio(row), PENTATONIC_RATIOS[row]);
    }
    assert_eq!(pitch_ratio(16), 1.0);
    assert_eq!(pitch_ratio(99), 1.0);
    assert_eq!(pitch_ratio(usize::MAX), 1.0);
}

#[test]
fn pitch_table_descends_from_top_row() {
    for row in 1..GRID_SIZE {
        assert!(
            PENTATONIC_RATIOS[row] < PENTATONIC_RATIOS[row - 1],
            "row {row} is not lower than the row above"
        );
    }
    assert_eq!(PENTATONIC_RATIOS[GRID_SIZE - 1], 1.0);
}

#[test]
fn tone_frequency_scales_by_octave() {
    let base = tone_frequency(15, 0, 48_000.0);
    assert!((base - BASE_FREQUENCY_HZ).abs() < 1e-3);
    let up = tone_frequency(15, 1, 48_000.0);
    let down = tone_frequency(15, -1, 48_000.0);
    assert!((up / base - 2.0).abs() < 1e-5);
    assert!((base / down - 2.0).abs() < 1e-5);
}

#[test]
fn tone_frequency_is_capped_at_nyquist() {
    assert_eq!(tone_frequency(0, 10, 8_000.0), 4_000.0);
    assert_eq!(cap_frequency(f32::NAN, 48_000.0), 24_000.0);
    assert_eq!(cap_frequency(f32::INFINITY, 48_000.0), 24_000.0);
    // Invalid sample rates fall back to 44.1 kHz
    assert_eq!(cap_frequency(1.0e9, f32::NAN), FALLBACK_SAMPLE_RATE / 2.0);
    let f = tone_frequency(15, 0, 0.0);
    assert!(f.is_finite() && f > 0.0);
}

#[test]
fn volume_is_clamped_before_gain() {
    assert_eq!(clamp_volume(-5.0), 0.0);
    assert_eq!(clamp_volume(5.0), 1.0);
    assert_eq!(clamp_volume(f32::NAN), 0.0);
    assert_eq!(clamp_volume(0.25), 0.25);

    for waveform in [Waveform::Sine, Waveform::Square, Waveform::Triangle] {
        let full = ToneEnvelope::for_waveform(waveform, 1.0);
        for v in [-5.0, 5.0, f32::NAN, 0.5] {
            let env = ToneEnvelope::for_waveform(waveform, v);
            assert!(env.peak >= 0.0 && env.peak <= full.peak);
            let mut t = 0.0;
            while t < env.stop_after_sec + 0.1 {
                let g = env.gain_at(t);
                assert!(g >= 0.0 && g <= full.peak + 1e-6, "gain {g} out of range");
                t += 0.001;
            }
        }
    }
}

#[test]
fn tone_envelope_starts_silent_and_decays() {
    let env = ToneEnvelope::for_waveform(Waveform::Sine, 1.0);
    assert_eq!(env.gain_at(0.0), 0.0);
    assert_eq!(env.gain_at(-1.0), 0.0);
    assert!((env.gain_at(env.attack_sec) - env.peak).abs() < 1e-6);
    let mid = env.gain_at(env.attack_sec + env.decay_sec * 0.5);
    assert!(mid < env.peak && mid > SILENCE_LEVEL);
    assert_eq!(env.gain_at(env.attack_sec + env.decay_sec + 0.01), 0.0);
    assert!(env.stop_after_sec > env.attack_sec + env.decay_sec);
}

#[test]
fn tone_envelopes_match_waveform_character() {
    let square = ToneEnvelope::for_waveform(Waveform::Square, 1.0);
    let sine = ToneEnvelope::for_waveform(Waveform::Sine, 1.0);
    let triangle = ToneEnvelope::for_waveform(Waveform::Triangle, 1.0);
    assert!(square.decay_sec < sine.decay_sec);
    assert!(sine.decay_sec < triangle.decay_sec);
    for env in [square, sine, triangle] {
        assert!(env.attack_sec >= 0.01 && env.attack_sec <= 0.05);
    }
}

#[test]
fn silent_volume_yields_inaudible_plan() {
    let plan = plan_tone(3, Waveform::Square, 0, 0.0, 48_000.0);
    assert!(!plan.envelope.is_audible());
    assert_eq!(plan.envelope.gain_at(0.1), 0.0);
}

#[test]
fn percussion_bands_follow_row_ranges() {
    for row in 0..8 {
        assert_eq!(PercussionBand::for_row(row), PercussionBand::HiHat);
    }
    for row in 8..12 {
        assert_eq!(PercussionBand::for_row(row), PercussionBand::Snare);
    }
    for row in 12..16 {
        assert_eq!(PercussionBand::for_row(row), PercussionBand::Kick);
    }
}

#[test]
fn percussion_plan_sources_and_gain() {
    let kick = plan_percussion(14, 5.0, 48_000.0);
    assert_eq!(kick.gain, 1.0);
    assert!(matches!(kick.source, PercussionSource::Sweep { .. }));

    let snare = plan_percussion(9, -5.0, 48_000.0);
    assert_eq!(snare.gain, 0.0);
    assert!(!snare.is_audible());
    assert!(matches!(
        snare.source,
        PercussionSource::Noise {
            filter: NoiseFilter::Bandpass,
            ..
        }
    ));

    let hat = plan_percussion(2, 0.5, 48_000.0);
    assert!(matches!(
        hat.source,
        PercussionSource::Noise {
            filter: NoiseFilter::Highpass,
            ..
        }
    ));
    assert!(hat.decay_sec < snare.decay_sec);
    assert!(snare.decay_sec < kick.decay_sec);
}

#[test]
fn kick_sweep_falls_in_pitch() {
    let kick = plan_percussion(15, 1.0, 48_000.0);
    let f0 = kick.source.frequency_at(0.0).unwrap();
    let f_end = kick.source.frequency_at(KICK_SWEEP_SEC).unwrap();
    assert!((f0 - KICK_START_HZ).abs() < 1e-3);
    assert!((f_end - KICK_END_HZ).abs() < 1e-2);
    let mut prev = f0;
    for i in 1..=20 {
        let f = kick.source.frequency_at(i as f32 * 0.01).unwrap();
        assert!(f <= prev);
        prev = f;
    }
    assert!(plan_percussion(3, 1.0, 48_000.0)
        .source
        .frequency_at(0.0)
        .is_none());
}

#[test]
fn percussion_envelope_decays_to_zero() {
    let snare = plan_percussion(10, 1.0, 48_000.0);
    assert_eq!(snare.envelope_at(0.0), 1.0);
    assert!(snare.envelope_at(snare.decay_sec * 0.5) < 1.0);
    assert_eq!(snare.envelope_at(snare.decay_sec), 0.0);
    assert!(snare.stop_after_sec > snare.decay_sec);
}

#[test]
fn noise_filters_are_capped_for_low_sample_rates() {
    let hat = plan_percussion(0, 1.0, 8_000.0);
    match hat.source {
        PercussionSource::Noise { cutoff_hz, .. } => assert_eq!(cutoff_hz, 4_000.0),
        _ => panic!("hi-hat should be noise"),
    }
}

#[test]
fn trigger_fire_dispatches_by_kind() {
    let mut synth = RecordingSynth::default();
    Trigger::Tone {
        layer: 0,
        row: 4,
        waveform: Waveform::Triangle,
        octave_offset: -1,
        volume: 0.5,
    }
    .fire(&mut synth);
    Trigger::Percussion {
        layer: 2,
        row: 13,
        volume: 0.7,
    }
    .fire(&mut synth);
    assert_eq!(synth.tones, vec![(4, Waveform::Triangle, -1, 0.5)]);
    assert_eq!(synth.hits, vec![(13, 0.7)]);
}

#[test]
fn xorshift_noise_stays_in_range() {
    let mut rng = XorShift32::new(0);
    let mut buf = vec![0.0; 4096];
    rng.fill(&mut buf);
    assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
    let first = buf[0];
    assert!(buf.iter().any(|s| (s - first).abs() > 1e-3));
}
