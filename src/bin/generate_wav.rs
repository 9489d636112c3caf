use anyhow::{Context, Result};
use clap::Parser;
use firlowpass::config::CutoffFrequency;
use firlowpass::save_wav;
use firlowpass::signal_gen::{Tone, interleave_mono, log_chirp, tones};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate tone and chirp WAV files for exercising the low-pass filter")]
struct Args {
    /// TOML signal configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, default_value = "test_signal.wav")]
    output: PathBuf,

    /// Tone frequencies, comma-separated (e.g. "440,5k,12khz")
    #[arg(short, long)]
    tones: Option<String>,

    /// Amplitude of each tone
    #[arg(long, default_value_t = 0.25)]
    tone_amplitude: f32,

    /// Add a logarithmic chirp starting at this frequency
    #[arg(long)]
    chirp_from: Option<CutoffFrequency>,

    /// Chirp end frequency
    #[arg(long, default_value = "20k")]
    chirp_to: CutoffFrequency,

    /// Chirp amplitude
    #[arg(long, default_value_t = 0.5)]
    chirp_amplitude: f32,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Number of channels (the signal is copied into each)
    #[arg(long, default_value_t = 2)]
    channels: u16,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    tone: Option<Vec<Tone>>,
    chirp: Option<ChirpSection>,
}

#[derive(Debug, Deserialize)]
struct ChirpSection {
    start_hz: f32,
    end_hz: f32,
    amplitude: f32,
}

fn parse_tones(s: &str, amplitude: f32) -> Result<Vec<Tone>> {
    s.split(',')
        .map(|p| {
            let freq: CutoffFrequency = p
                .trim()
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("Invalid tone frequency '{}'", p))?;
            Ok(Tone {
                frequency_hz: freq.as_hz(),
                amplitude,
            })
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn mix_into(target: &mut [f32], source: &[f32]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t += s;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let tone_list = match args.tones {
        Some(ref list) => parse_tones(list, args.tone_amplitude)?,
        None => toml_config.tone.clone().unwrap_or_default(),
    };

    let chirp = match args.chirp_from {
        Some(from) => Some((from.as_hz(), args.chirp_to.as_hz(), args.chirp_amplitude)),
        None => toml_config
            .chirp
            .as_ref()
            .map(|c| (c.start_hz, c.end_hz, c.amplitude)),
    };

    if tone_list.is_empty() && chirp.is_none() {
        anyhow::bail!("Nothing to generate: pass --tones, --chirp-from or a config file");
    }
    if args.channels == 0 {
        anyhow::bail!("--channels must be at least 1");
    }

    let mut mono = tones(&tone_list, args.duration, args.sample_rate);
    if let Some((start, end, amplitude)) = chirp {
        let sweep = log_chirp(start, end, amplitude, args.duration, args.sample_rate);
        mix_into(&mut mono, &sweep);
    }

    let peak = mono.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 1.0 {
        eprintln!("Warning: peak level {:.2} exceeds full scale", peak);
    }

    let signal = interleave_mono(&mono, args.channels as usize);
    save_wav(&args.output, &signal, args.sample_rate, args.channels)
        .context("Failed to write WAV file")?;

    eprintln!(
        "Wrote {} ({} tones{}, {:.2}s @ {} Hz, {} ch)",
        args.output.display(),
        tone_list.len(),
        if chirp.is_some() { " + chirp" } else { "" },
        args.duration,
        args.sample_rate,
        args.channels
    );
    Ok(())
}
