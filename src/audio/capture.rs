use crate::config::AudioConfig;
use crate::error::{FilterError, Result};
use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

fn device_label(device: &cpal::Device) -> String {
    match device.description() {
        Ok(desc) => desc.name().trim().to_string(),
        Err(_) => "Unknown".to_string(),
    }
}

/// Names of the input devices on the default host
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| FilterError::AudioDevice(e.to_string()))?;
    Ok(devices.map(|d| device_label(&d)).collect())
}

impl AudioCapture {
    /// Start capturing from the named input device, or the default one
    ///
    /// Each device callback sends one interleaved block over `tx`.
    pub fn new(config: &AudioConfig, tx: Sender<Vec<f32>>, device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| FilterError::AudioDevice(e.to_string()))?
                .find(|d| device_label(d) == name)
                .ok_or_else(|| FilterError::AudioDevice(format!("Input device not found: {}", name)))?,
            None => host
                .default_input_device()
                .ok_or_else(|| FilterError::AudioDevice("No input device found".into()))?,
        };

        log::info!("Input device: {}", device_label(&device));

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size as u32),
        };

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if tx.send(data.to_vec()).is_err() {
                        log::warn!("Audio receiver dropped");
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| FilterError::AudioStream(format!("{}", e)))?;

        // Attempt to promote to real-time priority
        let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
            config.buffer_size as u32,
            config.sample_rate,
        );

        let rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| FilterError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}
