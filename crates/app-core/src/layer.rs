use crate::constants::{DEFAULT_LAYER_COLORS, LAYER_COUNT, LAYER_VOLUME_DEFAULT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

/// How a layer turns an active cell into sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthKind {
    Tone(Waveform),
    Percussion,
}

/// Visual rule applied to effects spawned by a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectArchetype {
    Ripple,
    Gravity,
    Splash,
    Star,
}

impl EffectArchetype {
    pub const ALL: [EffectArchetype; 4] = [
        EffectArchetype::Ripple,
        EffectArchetype::Gravity,
        EffectArchetype::Splash,
        EffectArchetype::Star,
    ];

    pub fn next(self) -> Self {
        match self {
            EffectArchetype::Ripple => EffectArchetype::Gravity,
            EffectArchetype::Gravity => EffectArchetype::Splash,
            EffectArchetype::Splash => EffectArchetype::Star,
            EffectArchetype::Star => EffectArchetype::Ripple,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectArchetype::Ripple => "ripple",
            EffectArchetype::Gravity => "gravity",
            EffectArchetype::Splash => "splash",
            EffectArchetype::Star => "star",
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub index: usize,
    pub name: &'static str,
    pub kind: SynthKind,
    pub octave_offset: i32,
    pub color_rgb: [f32; 3],
    volume: f32,
    pub archetype: EffectArchetype,
}

impl LayerConfig {
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = crate::synth::clamp_volume(volume);
    }
}

/// The four fixed instrument layers.
pub fn default_layers() -> [LayerConfig; LAYER_COUNT] {
    let make = |index: usize,
                name: &'static str,
                kind: SynthKind,
                octave_offset: i32,
                archetype: EffectArchetype| LayerConfig {
        index,
        name,
        kind,
        octave_offset,
        color_rgb: DEFAULT_LAYER_COLORS[index],
        volume: LAYER_VOLUME_DEFAULT,
        archetype,
    };
    [
        make(
            0,
            "Lead",
            SynthKind::Tone(Waveform::Sine),
            0,
            EffectArchetype::Ripple,
        ),
        make(
            1,
            "Bass",
            SynthKind::Tone(Waveform::Triangle),
            -1,
            EffectArchetype::Gravity,
        ),
        make(2, "Drums", SynthKind::Percussion, 0, EffectArchetype::Splash),
        make(
            3,
            "Pluck",
            SynthKind::Tone(Waveform::Square),
            1,
            EffectArchetype::Star,
        ),
    ]
}
