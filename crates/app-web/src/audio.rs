//! WebAudio master bus: master gain into a dynamics compressor into the
//! destination. Every trigger builds short-lived nodes that stop themselves.

use app_core::{
    plan_percussion, plan_tone, AudioError, AudioResult, NoiseFilter, PercussionPlan,
    PercussionSource, Synth, TonePlan, Waveform, XorShift32, COMPRESSOR_ATTACK_SEC,
    COMPRESSOR_KNEE_DB, COMPRESSOR_RATIO, COMPRESSOR_RELEASE_SEC, COMPRESSOR_THRESHOLD_DB,
    MASTER_GAIN_DEFAULT, NOISE_BUFFER_SEC, SILENCE_LEVEL, VOICE_START_DELAY_SEC,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

fn graph_err(node: &'static str) -> impl Fn(JsValue) -> AudioError {
    move |e| AudioError::Graph {
        node,
        reason: format!("{e:?}"),
    }
}

fn create_gain(ctx: &web::AudioContext, value: f32, node: &'static str) -> AudioResult<web::GainNode> {
    let g = web::GainNode::new(ctx).map_err(graph_err(node))?;
    g.gain().set_value(value);
    Ok(g)
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Square => web::OscillatorType::Square,
        Waveform::Triangle => web::OscillatorType::Triangle,
    }
}

struct Graph {
    ctx: web::AudioContext,
    master: web::GainNode,
    noise: web::AudioBuffer,
}

impl Graph {
    fn build(master_gain: f32) -> AudioResult<Self> {
        let ctx = web::AudioContext::new().map_err(graph_err("context"))?;
        match Self::wire(&ctx, master_gain) {
            Ok((master, noise)) => Ok(Self { ctx, master, noise }),
            Err(e) => {
                let _ = ctx.close();
                Err(e)
            }
        }
    }

    fn wire(
        ctx: &web::AudioContext,
        master_gain: f32,
    ) -> AudioResult<(web::GainNode, web::AudioBuffer)> {
        let master = create_gain(ctx, master_gain, "master")?;
        let compressor = web::DynamicsCompressorNode::new(ctx).map_err(graph_err("compressor"))?;
        compressor.threshold().set_value(COMPRESSOR_THRESHOLD_DB);
        compressor.knee().set_value(COMPRESSOR_KNEE_DB);
        compressor.ratio().set_value(COMPRESSOR_RATIO);
        compressor.attack().set_value(COMPRESSOR_ATTACK_SEC);
        compressor.release().set_value(COMPRESSOR_RELEASE_SEC);
        master
            .connect_with_audio_node(&compressor)
            .map_err(graph_err("master"))?;
        compressor
            .connect_with_audio_node(&ctx.destination())
            .map_err(graph_err("compressor"))?;

        // One shared buffer of white noise for snares and hi-hats
        let sr = ctx.sample_rate();
        let len = ((sr * NOISE_BUFFER_SEC) as u32).max(1);
        let noise = ctx
            .create_buffer(1, len, sr)
            .map_err(graph_err("noise buffer"))?;
        let mut samples = vec![0.0f32; len as usize];
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
        XorShift32::new(seed).fill(&mut samples);
        noise
            .copy_to_channel(&mut samples, 0)
            .map_err(graph_err("noise buffer"))?;
        Ok((master, noise))
    }

    fn start_time(&self) -> f64 {
        self.ctx.current_time() + VOICE_START_DELAY_SEC
    }

    fn play_tone(&self, plan: &TonePlan) -> AudioResult<()> {
        let osc = web::OscillatorNode::new(&self.ctx).map_err(graph_err("oscillator"))?;
        osc.set_type(oscillator_type(plan.waveform));
        osc.frequency().set_value(plan.frequency_hz);

        let env = plan.envelope;
        let gain = web::GainNode::new(&self.ctx).map_err(graph_err("envelope"))?;
        let t0 = self.start_time();
        let peak_at = t0 + env.attack_sec as f64;
        let param = gain.gain();
        param
            .set_value_at_time(0.0, t0)
            .and_then(|p| p.linear_ramp_to_value_at_time(env.peak, peak_at))
            .and_then(|p| {
                p.exponential_ramp_to_value_at_time(SILENCE_LEVEL, peak_at + env.decay_sec as f64)
            })
            .map_err(graph_err("envelope"))?;

        osc.connect_with_audio_node(&gain)
            .and_then(|_| gain.connect_with_audio_node(&self.master))
            .map_err(graph_err("tone route"))?;
        osc.start_with_when(t0)
            .and_then(|_| osc.stop_with_when(t0 + env.stop_after_sec as f64))
            .map_err(graph_err("oscillator"))?;
        Ok(())
    }

    fn play_percussion(&self, plan: &PercussionPlan) -> AudioResult<()> {
        let t0 = self.start_time();
        let stop_at = t0 + plan.stop_after_sec as f64;

        let env = web::GainNode::new(&self.ctx).map_err(graph_err("envelope"))?;
        env.gain()
            .set_value_at_time(1.0, t0)
            .and_then(|p| {
                p.exponential_ramp_to_value_at_time(SILENCE_LEVEL, t0 + plan.decay_sec as f64)
            })
            .map_err(graph_err("envelope"))?;
        let level = create_gain(&self.ctx, plan.gain, "percussion level")?;
        env.connect_with_audio_node(&level)
            .and_then(|_| level.connect_with_audio_node(&self.master))
            .map_err(graph_err("percussion route"))?;

        match plan.source {
            PercussionSource::Sweep {
                start_hz,
                end_hz,
                sweep_sec,
            } => {
                let osc = web::OscillatorNode::new(&self.ctx).map_err(graph_err("kick"))?;
                osc.set_type(web::OscillatorType::Sine);
                osc.frequency()
                    .set_value_at_time(start_hz, t0)
                    .and_then(|p| {
                        p.exponential_ramp_to_value_at_time(end_hz, t0 + sweep_sec as f64)
                    })
                    .map_err(graph_err("kick sweep"))?;
                osc.connect_with_audio_node(&env).map_err(graph_err("kick"))?;
                osc.start_with_when(t0)
                    .and_then(|_| osc.stop_with_when(stop_at))
                    .map_err(graph_err("kick"))?;
            }
            PercussionSource::Noise {
                filter,
                cutoff_hz,
                q,
            } => {
                let src = web::AudioBufferSourceNode::new(&self.ctx).map_err(graph_err("noise"))?;
                src.set_buffer(Some(&self.noise));
                let biquad = web::BiquadFilterNode::new(&self.ctx).map_err(graph_err("filter"))?;
                biquad.set_type(match filter {
                    NoiseFilter::Bandpass => web::BiquadFilterType::Bandpass,
                    NoiseFilter::Highpass => web::BiquadFilterType::Highpass,
                });
                biquad.frequency().set_value(cutoff_hz);
                biquad.q().set_value(q);
                src.connect_with_audio_node(&biquad)
                    .and_then(|_| biquad.connect_with_audio_node(&env))
                    .map_err(graph_err("noise route"))?;
                src.start_with_when(t0)
                    .and_then(|_| src.stop_with_when(stop_at))
                    .map_err(graph_err("noise"))?;
            }
        }
        Ok(())
    }
}

/// Audio output for the page. Nothing is built until the first user
/// gesture calls `initialize`; triggers before that are dropped.
pub struct MasterBus {
    graph: Option<Graph>,
    master_gain: f32,
}

impl Default for MasterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterBus {
    pub fn new() -> Self {
        Self {
            graph: None,
            master_gain: MASTER_GAIN_DEFAULT,
        }
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Build the graph on first call; later calls resume a suspended context.
    pub fn initialize(&mut self) {
        if let Some(graph) = &self.graph {
            resume_if_suspended(&graph.ctx);
            return;
        }
        match Graph::build(self.master_gain) {
            Ok(graph) => {
                log::info!(
                    "[audio] context ready at {} Hz",
                    graph.ctx.sample_rate()
                );
                resume_if_suspended(&graph.ctx);
                self.graph = Some(graph);
            }
            Err(e) => log::warn!("[audio] {e}; continuing without sound"),
        }
    }

    /// Set the master level, clamped to [0, 1]. Returns the applied level.
    pub fn set_master_gain(&mut self, level: f32) -> f32 {
        self.master_gain = app_core::clamp_volume(level);
        if let Some(graph) = &self.graph {
            graph.master.gain().set_value(self.master_gain);
        }
        self.master_gain
    }

    /// Close the context. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(graph) = self.graph.take() {
            let _ = graph.master.disconnect();
            if let Err(e) = graph.ctx.close() {
                log::warn!("[audio] close failed: {e:?}");
            }
            log::info!("[audio] context closed");
        }
    }
}

fn resume_if_suspended(ctx: &web::AudioContext) {
    if ctx.state() != web::AudioContextState::Suspended {
        return;
    }
    match ctx.resume() {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("[audio] resume rejected: {e:?}");
            }
        }),
        Err(e) => log::warn!("[audio] resume failed: {e:?}"),
    }
}

impl Synth for MasterBus {
    fn trigger_tone(&mut self, row: usize, waveform: Waveform, octave_offset: i32, volume: f32) {
        let Some(graph) = &self.graph else {
            log::debug!("[audio] tone before init, row {row}");
            return;
        };
        let plan = plan_tone(row, waveform, octave_offset, volume, graph.ctx.sample_rate());
        if !plan.envelope.is_audible() {
            return;
        }
        if let Err(e) = graph.play_tone(&plan) {
            log::warn!("[audio] {e}");
        }
    }

    fn trigger_percussion(&mut self, row: usize, volume: f32) {
        let Some(graph) = &self.graph else {
            log::debug!("[audio] percussion before init, row {row}");
            return;
        };
        let plan = plan_percussion(row, volume, graph.ctx.sample_rate());
        if !plan.is_audible() {
            return;
        }
        if let Err(e) = graph.play_percussion(&plan) {
            log::warn!("[audio] {e}");
        }
    }
}
