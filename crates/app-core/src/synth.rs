//! Voice planning shared by the WebAudio and cpal backends.
//!
//! A trigger is turned into a small value (`TonePlan` / `PercussionPlan`)
//! holding every number the backend needs: clamped gains, capped
//! frequencies, envelope timings and the stop time. Backends only schedule
//! or render what the plan says, so both produce the same sound and all
//! numeric guards live in one place.

use crate::constants::*;
use crate::layer::Waveform;

/// Receiver of the trigger contract. Implementations must never panic and
/// must treat every call as a no-op while no audio device is available.
pub trait Synth {
    fn trigger_tone(&mut self, row: usize, waveform: Waveform, octave_offset: i32, volume: f32);
    fn trigger_percussion(&mut self, row: usize, volume: f32);
}

/// One sound requested by a sequencer tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    Tone {
        layer: usize,
        row: usize,
        waveform: Waveform,
        octave_offset: i32,
        volume: f32,
    },
    Percussion {
        layer: usize,
        row: usize,
        volume: f32,
    },
}

impl Trigger {
    pub fn layer(&self) -> usize {
        match self {
            Trigger::Tone { layer, .. } | Trigger::Percussion { layer, .. } => *layer,
        }
    }

    pub fn fire<S: Synth + ?Sized>(&self, synth: &mut S) {
        match *self {
            Trigger::Tone {
                row,
                waveform,
                octave_offset,
                volume,
                ..
            } => synth.trigger_tone(row, waveform, octave_offset, volume),
            Trigger::Percussion { row, volume, .. } => synth.trigger_percussion(row, volume),
        }
    }
}

#[inline]
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Pentatonic ratio for a row; rows outside the table play the base pitch.
#[inline]
pub fn pitch_ratio(row: usize) -> f32 {
    PENTATONIC_RATIOS.get(row).copied().unwrap_or(1.0)
}

#[inline]
fn sanitize_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        FALLBACK_SAMPLE_RATE
    }
}

/// Clamp a frequency to (0, nyquist]. NaN and infinities map to nyquist.
#[inline]
pub fn cap_frequency(frequency_hz: f32, sample_rate: f32) -> f32 {
    let nyquist = sanitize_sample_rate(sample_rate) / 2.0;
    if !frequency_hz.is_finite() || frequency_hz > nyquist {
        nyquist
    } else {
        frequency_hz.max(f32::MIN_POSITIVE)
    }
}

pub fn tone_frequency(row: usize, octave_offset: i32, sample_rate: f32) -> f32 {
    let freq = BASE_FREQUENCY_HZ * pitch_ratio(row) * 2.0_f32.powi(octave_offset);
    cap_frequency(freq, sample_rate)
}

/// Linear attack from zero, exponential decay to `SILENCE_LEVEL`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneEnvelope {
    pub attack_sec: f32,
    pub peak: f32,
    pub decay_sec: f32,
    pub stop_after_sec: f32,
}

impl ToneEnvelope {
    pub fn for_waveform(waveform: Waveform, volume: f32) -> Self {
        let (attack_sec, level, decay_sec) = match waveform {
            Waveform::Square => SQUARE_ENVELOPE,
            Waveform::Triangle => TRIANGLE_ENVELOPE,
            Waveform::Sine => SINE_ENVELOPE,
        };
        Self {
            attack_sec,
            peak: level * clamp_volume(volume),
            decay_sec,
            stop_after_sec: attack_sec + decay_sec + VOICE_STOP_MARGIN_SEC,
        }
    }

    /// Envelopes whose peak never rises above the silence floor are skipped.
    pub fn is_audible(&self) -> bool {
        self.peak > SILENCE_LEVEL
    }

    pub fn gain_at(&self, t: f32) -> f32 {
        if !self.is_audible() || t.is_nan() || t < 0.0 {
            return 0.0;
        }
        if t < self.attack_sec {
            return self.peak * t / self.attack_sec;
        }
        let decay_t = t - self.attack_sec;
        if decay_t < self.decay_sec {
            let progress = decay_t / self.decay_sec;
            self.peak * (SILENCE_LEVEL / self.peak).powf(progress)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TonePlan {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub envelope: ToneEnvelope,
}

pub fn plan_tone(
    row: usize,
    waveform: Waveform,
    octave_offset: i32,
    volume: f32,
    sample_rate: f32,
) -> TonePlan {
    TonePlan {
        frequency_hz: tone_frequency(row, octave_offset, sample_rate),
        waveform,
        envelope: ToneEnvelope::for_waveform(waveform, volume),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PercussionBand {
    Kick,
    Snare,
    HiHat,
}

impl PercussionBand {
    pub fn for_row(row: usize) -> Self {
        if row >= KICK_MIN_ROW {
            PercussionBand::Kick
        } else if row >= SNARE_MIN_ROW {
            PercussionBand::Snare
        } else {
            PercussionBand::HiHat
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseFilter {
    Bandpass,
    Highpass,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PercussionSource {
    /// Sine whose pitch falls exponentially from `start_hz` to `end_hz`.
    Sweep {
        start_hz: f32,
        end_hz: f32,
        sweep_sec: f32,
    },
    /// Filtered white noise.
    Noise {
        filter: NoiseFilter,
        cutoff_hz: f32,
        q: f32,
    },
}

impl PercussionSource {
    pub fn frequency_at(&self, t: f32) -> Option<f32> {
        match *self {
            PercussionSource::Sweep {
                start_hz,
                end_hz,
                sweep_sec,
            } => {
                let progress = (t.max(0.0) / sweep_sec).min(1.0);
                Some(start_hz * (end_hz / start_hz).powf(progress))
            }
            PercussionSource::Noise { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PercussionPlan {
    pub band: PercussionBand,
    /// Per-trigger gain, the clamped volume.
    pub gain: f32,
    pub source: PercussionSource,
    pub decay_sec: f32,
    pub stop_after_sec: f32,
}

impl PercussionPlan {
    /// Unit envelope: starts at 1 and falls exponentially to the silence floor.
    pub fn envelope_at(&self, t: f32) -> f32 {
        if t.is_nan() || t < 0.0 || t >= self.decay_sec {
            return 0.0;
        }
        SILENCE_LEVEL.powf(t / self.decay_sec)
    }

    pub fn is_audible(&self) -> bool {
        self.gain > 0.0
    }
}

pub fn plan_percussion(row: usize, volume: f32, sample_rate: f32) -> PercussionPlan {
    let band = PercussionBand::for_row(row);
    let (source, decay_sec) = match band {
        PercussionBand::Kick => (
            PercussionSource::Sweep {
                start_hz: cap_frequency(KICK_START_HZ, sample_rate),
                end_hz: cap_frequency(KICK_END_HZ, sample_rate),
                sweep_sec: KICK_SWEEP_SEC,
            },
            KICK_DECAY_SEC,
        ),
        PercussionBand::Snare => (
            PercussionSource::Noise {
                filter: NoiseFilter::Bandpass,
                cutoff_hz: cap_frequency(SNARE_FILTER_HZ, sample_rate),
                q: SNARE_FILTER_Q,
            },
            SNARE_DECAY_SEC,
        ),
        PercussionBand::HiHat => (
            PercussionSource::Noise {
                filter: NoiseFilter::Highpass,
                cutoff_hz: cap_frequency(HIHAT_FILTER_HZ, sample_rate),
                q: HIHAT_FILTER_Q,
            },
            HIHAT_DECAY_SEC,
        ),
    };
    PercussionPlan {
        band,
        gain: clamp_volume(volume),
        source,
        decay_sec,
        stop_after_sec: decay_sec + VOICE_STOP_MARGIN_SEC,
    }
}

/// xorshift32 white-noise generator in [-1, 1].
#[derive(Clone, Debug)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x1234_ABCD } else { seed },
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    pub fn fill(&mut self, buf: &mut [f32]) {
        for s in buf.iter_mut() {
            *s = self.next_sample();
        }
    }
}
