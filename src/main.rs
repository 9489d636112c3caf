use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use firlowpass::audio::{AudioSource, DeviceSource, WavFileSource, list_input_devices};
use firlowpass::config::{CutoffFrequency, LowpassConfig, WindowType};
use firlowpass::signal_processing::response_curve;
use firlowpass::{CutoffParameter, LowpassProcessor, WavSink};

/// Points in the response curve of a kernel report
const REPORT_RESPONSE_POINTS: usize = 257;

#[derive(Parser, Debug)]
#[command(name = "firlowpass")]
#[command(about = "Filter a WAV file or live input through a windowed-sinc FIR low-pass", long_about = None)]
struct Args {
    /// Input WAV file
    input: Option<PathBuf>,

    /// Write filtered audio to this WAV file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Capture from an input device instead of a file (default device if no name given)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Seconds to capture in device mode
    #[arg(long, default_value_t = 10.0)]
    duration: f32,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Cutoff frequency (e.g. "1000", "1k", "2.5khz")
    #[arg(long)]
    cutoff: Option<CutoffFrequency>,

    /// Sweep the cutoff to this frequency over the run
    #[arg(long)]
    sweep_to: Option<CutoffFrequency>,

    /// Number of kernel taps (odd)
    #[arg(short = 't', long)]
    taps: Option<usize>,

    /// Window applied to the sinc response
    #[arg(short = 'w', long, value_enum)]
    window: Option<WindowType>,

    /// Processing block size in frames
    #[arg(short = 'b', long)]
    block_size: Option<usize>,

    /// Write the designed kernel and its response as JSON
    #[arg(long)]
    dump_kernel: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct KernelReport {
    cutoff_hz: Option<f32>,
    sample_rate_hz: f32,
    num_taps: usize,
    window: String,
    group_delay_samples: usize,
    coefficients: Vec<f64>,
    response_db: Vec<(f64, f64)>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if args.list_devices {
        let devices = list_input_devices()?;
        if devices.is_empty() {
            eprintln!("No input devices found.");
        } else {
            for name in &devices {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let config = build_config(&args)?;
    run(&args, &config)
}

fn build_config(args: &Args) -> anyhow::Result<LowpassConfig> {
    let mut config = match args.config {
        Some(ref path) => LowpassConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LowpassConfig::default(),
    };

    if let Some(cutoff) = args.cutoff {
        config.filter.cutoff_hz = cutoff.as_hz();
    }
    if let Some(taps) = args.taps {
        config.filter.num_taps = taps;
    }
    if let Some(window) = args.window {
        config.filter.window = window;
    }
    if let Some(block_size) = args.block_size {
        config.audio.buffer_size = block_size;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &LowpassConfig) -> anyhow::Result<()> {
    let mut source: Option<Box<dyn AudioSource>> = match (&args.device, &args.input) {
        (Some(_), Some(_)) => anyhow::bail!("Give either an input file or --device, not both"),
        (Some(name), None) => {
            let name = (!name.is_empty()).then_some(name.as_str());
            Some(Box::new(DeviceSource::new(&config.audio, name)?))
        }
        (None, Some(path)) => Some(Box::new(
            WavFileSource::new(path, config.audio.buffer_size)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        (None, None) => None,
    };

    if source.is_none() && args.dump_kernel.is_none() {
        anyhow::bail!("Nothing to do: give an input file, --device or --dump-kernel");
    }

    let (sample_rate, channels) = match source {
        Some(ref s) => (s.sample_rate(), s.channels()),
        None => (config.audio.sample_rate, config.audio.channels as usize),
    };

    let cutoff = CutoffParameter::from_config(&config.filter)?;
    let mut processor = LowpassProcessor::new(&config.filter, cutoff.clone())?;
    processor.prepare(sample_rate as f32, config.audio.buffer_size, channels)?;

    log::info!(
        "Low-pass: {:.1} Hz, {} taps, {} window, {} Hz, {} ch, latency {} samples",
        cutoff.hz(),
        config.filter.num_taps,
        config.filter.window,
        sample_rate,
        channels,
        processor.latency_samples()
    );

    if let Some(ref path) = args.dump_kernel {
        write_kernel_report(path, &processor)?;
    }

    if let Some(ref mut source) = source {
        let mut sink = match args.output {
            Some(ref path) => Some(
                WavSink::create(path, sample_rate, channels as u16)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            ),
            None => None,
        };

        let sweep = args.sweep_to.map(|target| {
            (
                cutoff.normalized(),
                cutoff.hz_to_normalized(target.as_hz()),
            )
        });
        let limit = args.device.is_some().then_some(args.duration);

        let frames = filter_stream(
            &mut **source,
            &mut processor,
            &cutoff,
            sweep,
            limit,
            sink.as_mut(),
        )?;

        if let Some(sink) = sink {
            sink.finalize().context("Failed to finalize output WAV")?;
        }
        eprintln!(
            "Filtered {} frames ({:.2}s), final cutoff {:.1} Hz",
            frames,
            frames as f32 / sample_rate as f32,
            processor.current_cutoff_hz().unwrap_or(cutoff.hz())
        );
    }

    Ok(())
}

/// Pull blocks from `source` through the processor until it runs dry or
/// `limit_secs` elapses. Returns the number of frames processed.
fn filter_stream(
    source: &mut dyn AudioSource,
    processor: &mut LowpassProcessor,
    cutoff: &CutoffParameter,
    sweep: Option<(f32, f32)>,
    limit_secs: Option<f32>,
    mut sink: Option<&mut WavSink>,
) -> anyhow::Result<usize> {
    let started = Instant::now();
    let channels = source.channels();
    let mut frames = 0usize;
    let mut last_report = Instant::now();

    while let Some(mut block) = source.next_buffer()? {
        let elapsed = started.elapsed().as_secs_f32();
        let progress = match limit_secs {
            Some(limit) => (elapsed / limit).min(1.0),
            None => source.progress().unwrap_or(0.0),
        };

        if let Some((from, to)) = sweep {
            cutoff.set_normalized(from + (to - from) * progress);
        }

        processor.process_interleaved(&mut block)?;
        frames += block.len() / channels;

        if let Some(ref mut sink) = sink {
            sink.write(&block).context("Failed to write output WAV")?;
        }

        if last_report.elapsed().as_secs_f32() >= 1.0 {
            log::info!(
                "{:>5.1}% cutoff {:.1} Hz",
                progress * 100.0,
                processor.current_cutoff_hz().unwrap_or(cutoff.hz())
            );
            last_report = Instant::now();
        }

        if limit_secs.is_some_and(|limit| elapsed >= limit) {
            break;
        }
    }

    Ok(frames)
}

fn write_kernel_report(path: &Path, processor: &LowpassProcessor) -> anyhow::Result<()> {
    let kernel = processor.kernel();
    let report = KernelReport {
        cutoff_hz: processor.current_cutoff_hz(),
        sample_rate_hz: processor.sample_rate(),
        num_taps: kernel.num_taps(),
        window: processor.window().to_string(),
        group_delay_samples: kernel.group_delay_samples(),
        coefficients: kernel.taps().to_vec(),
        response_db: response_curve(
            kernel,
            processor.sample_rate() as f64,
            REPORT_RESPONSE_POINTS,
        ),
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize kernel")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Kernel report written to {}", path.display());
    Ok(())
}
