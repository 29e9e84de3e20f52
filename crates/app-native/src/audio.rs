//! Native master bus over a cpal output stream.
//!
//! `MasterBus` owns the stream (not `Send`) and lives on the UI thread.
//! `VoicePort` shares the mixer with the stream callback and is handed to
//! the sequencer clock thread as its `Synth`.

use crate::dsp::Mixer;
use app_core::{plan_percussion, plan_tone, AudioError, AudioResult, Synth, Waveform};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

type SharedMixer = Arc<Mutex<Option<Mixer>>>;

fn lock_mixer(shared: &Mutex<Option<Mixer>>) -> MutexGuard<'_, Option<Mixer>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable trigger handle. Triggers before `initialize` or after
/// `dispose` find no mixer and are dropped.
#[derive(Clone, Default)]
pub struct VoicePort {
    shared: SharedMixer,
}

impl VoicePort {
    #[cfg(test)]
    fn with_mixer(mixer: Mixer) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Some(mixer))),
        }
    }

    #[cfg(test)]
    fn voice_count(&self) -> usize {
        lock_mixer(&self.shared)
            .as_ref()
            .map(Mixer::voice_count)
            .unwrap_or(0)
    }
}

impl Synth for VoicePort {
    fn trigger_tone(&mut self, row: usize, waveform: Waveform, octave_offset: i32, volume: f32) {
        let mut guard = lock_mixer(&self.shared);
        let Some(mixer) = guard.as_mut() else {
            log::debug!("[audio] tone before init, row {row}");
            return;
        };
        let plan = plan_tone(row, waveform, octave_offset, volume, mixer.sample_rate());
        mixer.push_tone(plan);
        log::trace!("[audio] {} voice(s) sounding", mixer.voice_count());
    }

    fn trigger_percussion(&mut self, row: usize, volume: f32) {
        let mut guard = lock_mixer(&self.shared);
        let Some(mixer) = guard.as_mut() else {
            log::debug!("[audio] percussion before init, row {row}");
            return;
        };
        let plan = plan_percussion(row, volume, mixer.sample_rate());
        mixer.push_percussion(plan);
        log::trace!("[audio] {} voice(s) sounding", mixer.voice_count());
    }
}

pub struct MasterBus {
    port: VoicePort,
    stream: Option<cpal::Stream>,
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
            port: VoicePort::default(),
            stream: None,
            master_gain: app_core::MASTER_GAIN_DEFAULT,
        }
    }

    pub fn port(&self) -> VoicePort {
        self.port.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Open the default output device. Safe to call repeatedly; a missing
    /// device is logged and leaves the bus silent.
    pub fn initialize(&mut self) {
        if self.stream.is_some() {
            return;
        }
        match self.open() {
            Ok(stream) => {
                self.stream = Some(stream);
                log::info!("[audio] output stream started");
            }
            Err(e) => {
                *lock_mixer(&self.port.shared) = None;
                log::warn!("[audio] {e}; continuing without sound");
            }
        }
    }

    fn open(&mut self) -> AudioResult<cpal::Stream> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Build(e.to_string()))?;
        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let mut mixer = Mixer::new(sample_rate);
        mixer.set_master_gain(self.master_gain);
        log::debug!("[audio] master gain {:.2}", mixer.master_gain());
        *lock_mixer(&self.port.shared) = Some(mixer);

        let shared = Arc::clone(&self.port.shared);
        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, shared),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, shared),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, shared),
            other => Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        }?;
        stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        log::info!("[audio] {sample_rate} Hz, {channels} channel(s), {format:?}");
        Ok(stream)
    }

    /// Set the master level, clamped to [0, 1]. Returns the applied level.
    pub fn set_master_gain(&mut self, level: f32) -> f32 {
        self.master_gain = app_core::clamp_volume(level);
        if let Some(mixer) = lock_mixer(&self.port.shared).as_mut() {
            mixer.set_master_gain(self.master_gain);
        }
        self.master_gain
    }

    /// Stop the stream and drop all voices. Idempotent.
    pub fn dispose(&mut self) {
        if self.stream.take().is_some() {
            log::info!("[audio] output stream closed");
        }
        *lock_mixer(&self.port.shared) = None;
    }
}

impl Drop for MasterBus {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: SharedMixer,
) -> AudioResult<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let err_fn = |err| log::error!("[audio] stream error: {err}");
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _| render_into(&shared, data, channels),
            err_fn,
            None,
        )
        .map_err(|e| AudioError::Build(e.to_string()))
}

/// Fill an interleaved buffer. A contended lock or a missing mixer yields
/// silence rather than blocking the audio thread.
fn render_into<T>(shared: &Mutex<Option<Mixer>>, data: &mut [T], channels: usize)
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let silence = T::from_sample(0.0f32);
    let mut guard = match shared.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(p)) => p.into_inner(),
        Err(TryLockError::WouldBlock) => {
            data.iter_mut().for_each(|s| *s = silence);
            return;
        }
    };
    let Some(mixer) = guard.as_mut() else {
        data.iter_mut().for_each(|s| *s = silence);
        return;
    };
    for frame in data.chunks_mut(channels.max(1)) {
        let value = T::from_sample(mixer.next_sample());
        frame.iter_mut().for_each(|s| *s = value);
    }
}
