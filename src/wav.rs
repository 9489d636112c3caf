use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{WavSpec, WavWriter};

fn float_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Write interleaved samples to a 32-bit float WAV file in one go
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, float_spec(channels, sample_rate))?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Streaming 32-bit float WAV writer for filtered blocks
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    frames_written: usize,
    channels: usize,
}

impl WavSink {
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32, channels: u16) -> Result<Self, hound::Error> {
        let writer = WavWriter::create(path, float_spec(channels, sample_rate))?;
        Ok(Self {
            writer,
            frames_written: 0,
            channels: channels.max(1) as usize,
        })
    }

    /// Append interleaved samples
    pub fn write(&mut self, samples: &[f32]) -> Result<(), hound::Error> {
        for &sample in samples {
            self.writer.write_sample(sample)?;
        }
        self.frames_written += samples.len() / self.channels;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Flush the header and close the file
    pub fn finalize(self) -> Result<(), hound::Error> {
        self.writer.finalize()
    }
}
