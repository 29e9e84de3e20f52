//! Sample-level synthesis for the native master bus.
//!
//! Voices are rendered from the plans computed in `app_core::synth`, so the
//! envelopes, pitches and percussion bands match the web backend exactly.

use app_core::{
    NoiseFilter, PercussionPlan, PercussionSource, TonePlan, Waveform, XorShift32,
    COMPRESSOR_ATTACK_SEC, COMPRESSOR_KNEE_DB, COMPRESSOR_RATIO, COMPRESSOR_RELEASE_SEC,
    COMPRESSOR_THRESHOLD_DB, MASTER_GAIN_DEFAULT,
};
use std::f32::consts::TAU;

/// One sample of `waveform` at `phase` in [0, 1).
#[inline]
pub fn waveform_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
    }
}

/// Second-order IIR filter, Direct Form II Transposed, with the RBJ cookbook
/// coefficients WebAudio's `BiquadFilterNode` uses.
#[derive(Clone, Debug)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(filter: NoiseFilter, cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let w0 = TAU * cutoff_hz / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q.max(1e-3));
        let (b0, b1, b2) = match filter {
            NoiseFilter::Bandpass => (alpha, 0.0, -alpha),
            NoiseFilter::Highpass => {
                let b = (1.0 + cos_w0) / 2.0;
                (b, -(1.0 + cos_w0), b)
            }
        };
        let a0 = 1.0 + alpha;
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

/// Feed-forward peak compressor with a soft knee.
#[derive(Clone, Debug)]
pub struct Compressor {
    threshold_db: f32,
    knee_db: f32,
    ratio: f32,
    attack_coef: f32,
    release_coef: f32,
    envelope: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            threshold_db: COMPRESSOR_THRESHOLD_DB,
            knee_db: COMPRESSOR_KNEE_DB,
            ratio: COMPRESSOR_RATIO,
            attack_coef: (-1.0 / (COMPRESSOR_ATTACK_SEC * sample_rate)).exp(),
            release_coef: (-1.0 / (COMPRESSOR_RELEASE_SEC * sample_rate)).exp(),
            envelope: 0.0,
        }
    }

    /// Gain change in dB (zero or negative) for an input level.
    fn gain_db(&self, input_db: f32) -> f32 {
        let slope = 1.0 - 1.0 / self.ratio;
        let half_knee = self.knee_db / 2.0;
        let knee_start = self.threshold_db - half_knee;
        if input_db <= knee_start {
            0.0
        } else if input_db >= self.threshold_db + half_knee {
            (self.threshold_db - input_db) * slope
        } else {
            let x = input_db - knee_start;
            -slope * x * x / (2.0 * self.knee_db)
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coef = if level > self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * level;
        if self.envelope <= f32::MIN_POSITIVE {
            return input;
        }
        let env_db = 20.0 * self.envelope.log10();
        input * 10.0_f32.powf(self.gain_db(env_db) / 20.0)
    }
}

#[derive(Clone, Debug)]
pub struct ToneVoice {
    plan: TonePlan,
    phase: f32,
    sample: u32,
    stop_at: u32,
    sample_rate: f32,
}

impl ToneVoice {
    pub fn new(plan: TonePlan, sample_rate: f32) -> Self {
        Self {
            plan,
            phase: 0.0,
            sample: 0,
            stop_at: (plan.envelope.stop_after_sec * sample_rate).ceil() as u32,
            sample_rate,
        }
    }

    #[inline]
    fn next_sample(&mut self) -> Option<f32> {
        if self.sample >= self.stop_at {
            return None;
        }
        let t = self.sample as f32 / self.sample_rate;
        let out = waveform_sample(self.plan.waveform, self.phase) * self.plan.envelope.gain_at(t);
        self.phase = (self.phase + self.plan.frequency_hz / self.sample_rate).fract();
        self.sample += 1;
        Some(out)
    }
}

#[derive(Clone, Debug)]
pub struct PercussionVoice {
    plan: PercussionPlan,
    phase: f32,
    noise: XorShift32,
    filter: Option<Biquad>,
    sample: u32,
    stop_at: u32,
    sample_rate: f32,
}

impl PercussionVoice {
    pub fn new(plan: PercussionPlan, sample_rate: f32, noise_seed: u32) -> Self {
        let filter = match plan.source {
            PercussionSource::Noise {
                filter,
                cutoff_hz,
                q,
            } => Some(Biquad::new(filter, cutoff_hz, q, sample_rate)),
            PercussionSource::Sweep { .. } => None,
        };
        Self {
            plan,
            phase: 0.0,
            noise: XorShift32::new(noise_seed),
            filter,
            sample: 0,
            stop_at: (plan.stop_after_sec * sample_rate).ceil() as u32,
            sample_rate,
        }
    }

    #[inline]
    fn next_sample(&mut self) -> Option<f32> {
        if self.sample >= self.stop_at {
            return None;
        }
        let t = self.sample as f32 / self.sample_rate;
        let raw = match self.plan.source.frequency_at(t) {
            Some(freq) => {
                let s = (TAU * self.phase).sin();
                self.phase = (self.phase + freq / self.sample_rate).fract();
                s
            }
            None => {
                let n = self.noise.next_sample();
                match self.filter.as_mut() {
                    Some(f) => f.process(n),
                    None => n,
                }
            }
        };
        self.sample += 1;
        Some(raw * self.plan.envelope_at(t) * self.plan.gain)
    }
}

#[derive(Clone, Debug)]
pub enum Voice {
    Tone(ToneVoice),
    Percussion(PercussionVoice),
}

impl Voice {
    /// Next sample, or `None` once the voice has passed its stop time.
    #[inline]
    pub fn next_sample(&mut self) -> Option<f32> {
        match self {
            Voice::Tone(v) => v.next_sample(),
            Voice::Percussion(v) => v.next_sample(),
        }
    }
}

/// Voices summed into the master gain and compressor. Owned by the output
/// stream callback through `audio::VoicePort`.
#[derive(Debug)]
pub struct Mixer {
    sample_rate: f32,
    voices: Vec<Voice>,
    master_gain: f32,
    compressor: Compressor,
    noise_seed: u32,
}

impl Mixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: Vec::with_capacity(64),
            master_gain: MASTER_GAIN_DEFAULT,
            compressor: Compressor::new(sample_rate),
            noise_seed: 0x9E37_79B9,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn set_master_gain(&mut self, level: f32) {
        self.master_gain = app_core::clamp_volume(level);
    }

    pub fn push_tone(&mut self, plan: TonePlan) {
        if !plan.envelope.is_audible() {
            log::debug!("[audio] skipped silent tone at {:.1} Hz", plan.frequency_hz);
            return;
        }
        self.voices
            .push(Voice::Tone(ToneVoice::new(plan, self.sample_rate)));
    }

    pub fn push_percussion(&mut self, plan: PercussionPlan) {
        if !plan.is_audible() {
            log::debug!("[audio] skipped silent {:?}", plan.band);
            return;
        }
        self.noise_seed = self.noise_seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.voices.push(Voice::Percussion(PercussionVoice::new(
            plan,
            self.sample_rate,
            self.noise_seed,
        )));
    }

    /// Render one mono sample. Voices that have finished are dropped in place.
    pub fn next_sample(&mut self) -> f32 {
        let mut sum = 0.0f32;
        let mut i = 0usize;
        while i < self.voices.len() {
            match self.voices[i].next_sample() {
                Some(s) => {
                    sum += s;
                    i += 1;
                }
                None => {
                    self.voices.swap_remove(i);
                }
            }
        }
        let out = self.compressor.process(sum * self.master_gain);
        out.clamp(-1.0, 1.0)
    }
}
