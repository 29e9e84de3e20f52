// Shared grid/audio/effect tuning constants used by both web and native frontends.

// Grid layout
pub const GRID_SIZE: usize = 16; // rows and columns per layer
pub const LAYER_COUNT: usize = 4;

// Transport
pub const BPM_MIN: f32 = 60.0;
pub const BPM_MAX: f32 = 240.0;
pub const BPM_DEFAULT: f32 = 120.0;
pub const STEPS_PER_BEAT: f32 = 4.0; // sixteenth notes
pub const TEMPO_NUDGE_BPM: f32 = 5.0;

// Pitch
pub const BASE_FREQUENCY_HZ: f32 = 130.81; // C3
pub const FALLBACK_SAMPLE_RATE: f32 = 44_100.0;

/// Major pentatonic ratios over three octaves, highest pitch on row 0.
pub const PENTATONIC_RATIOS: [f32; GRID_SIZE] = [
    8.0,
    20.0 / 3.0,
    6.0,
    5.0,
    4.5,
    4.0,
    10.0 / 3.0,
    3.0,
    2.5,
    2.25,
    2.0,
    5.0 / 3.0,
    1.5,
    1.25,
    1.125,
    1.0,
];

// Tone envelopes: (attack seconds, peak level, decay seconds)
pub const SINE_ENVELOPE: (f32, f32, f32) = (0.02, 0.30, 0.5);
pub const SQUARE_ENVELOPE: (f32, f32, f32) = (0.01, 0.12, 0.3);
pub const TRIANGLE_ENVELOPE: (f32, f32, f32) = (0.05, 0.35, 0.8);
pub const SILENCE_LEVEL: f32 = 0.001; // exponential ramps cannot reach 0
pub const VOICE_STOP_MARGIN_SEC: f32 = 0.05;
pub const VOICE_START_DELAY_SEC: f64 = 0.005;

// Percussion bands (rows >= KICK_MIN_ROW kick, >= SNARE_MIN_ROW snare, else hi-hat)
pub const KICK_MIN_ROW: usize = 12;
pub const SNARE_MIN_ROW: usize = 8;
pub const KICK_START_HZ: f32 = 150.0;
pub const KICK_END_HZ: f32 = 40.0;
pub const KICK_SWEEP_SEC: f32 = 0.12;
pub const KICK_DECAY_SEC: f32 = 0.35;
pub const SNARE_FILTER_HZ: f32 = 1800.0;
pub const SNARE_FILTER_Q: f32 = 0.8;
pub const SNARE_DECAY_SEC: f32 = 0.18;
pub const HIHAT_FILTER_HZ: f32 = 7000.0;
pub const HIHAT_FILTER_Q: f32 = 0.7;
pub const HIHAT_DECAY_SEC: f32 = 0.05;
pub const NOISE_BUFFER_SEC: f32 = 0.5;

// Master bus
pub const MASTER_GAIN_DEFAULT: f32 = 0.4;
pub const MASTER_GAIN_STEP: f32 = 0.05;
pub const COMPRESSOR_THRESHOLD_DB: f32 = -24.0;
pub const COMPRESSOR_KNEE_DB: f32 = 30.0;
pub const COMPRESSOR_RATIO: f32 = 12.0;
pub const COMPRESSOR_ATTACK_SEC: f32 = 0.003;
pub const COMPRESSOR_RELEASE_SEC: f32 = 0.25;

// Layers
pub const LAYER_VOLUME_DEFAULT: f32 = 0.8;
pub const LAYER_VOLUME_STEP: f32 = 0.1;
pub const DEFAULT_LAYER_COLORS: [[f32; 3]; LAYER_COUNT] = [
    [0.30, 0.85, 1.00], // cyan
    [0.95, 0.35, 0.75], // magenta
    [1.00, 0.65, 0.20], // amber
    [0.45, 0.95, 0.45], // green
];

// Display
pub const CELL_IDLE_RGB: [f32; 3] = [0.10, 0.10, 0.13];
pub const PLAYHEAD_LIFT: f32 = 0.08; // added to idle cells on the playing column

// Effects
pub const MAX_EFFECTS: usize = 150;

pub const RIPPLE_SPEED_PER_MS: f32 = 0.012;
pub const RIPPLE_WIDTH: f32 = 1.0;
pub const RIPPLE_LIFETIME_MS: f64 = 600.0;

pub const GRAVITY: f32 = 0.025; // grid units per frame^2
pub const GRAVITY_FLOOR_ROW: f32 = 15.5;
pub const GRAVITY_RESTITUTION: f32 = 0.5; // bounce height kept per contact
pub const GRAVITY_REST_VELOCITY: f32 = 0.05;
pub const GRAVITY_REST_DISTANCE: f32 = 0.05;
pub const GRAVITY_TIMEOUT_MS: f64 = 3000.0;

pub const SPLASH_PARTICLES: usize = 12;
pub const SPLASH_SPEED_MIN: f32 = 0.1;
pub const SPLASH_SPEED_MAX: f32 = 0.4;
pub const SPLASH_DRIFT: f32 = 0.005;
pub const SPLASH_LIFE_DECAY: f32 = 0.02;
pub const SPLASH_SCALE_DECAY: f32 = 0.95;

pub const STAR_LIFETIME_MS: f64 = 600.0;
pub const STAR_ARM_LENGTH: i32 = 4;
pub const STAR_DIAGONAL_LENGTH: i32 = 3;
pub const STAR_DIAGONAL_WEIGHT: f32 = 0.7;
