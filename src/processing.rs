use crate::config::{FilterConfig, WindowType};
use crate::error::{FilterError, Result};
use crate::parameter::CutoffParameter;
use crate::signal_processing::{FilterSpec, Kernel, StreamingConvolver};

/// Per-block glue between the cutoff parameter and the convolver
///
/// Each block it reads the latest cutoff, redesigns the kernel if the
/// cutoff moved, installs it and convolves. Redesign writes into a spare
/// kernel that is then swapped with the installed one, so nothing on this
/// path allocates once prepared.
pub struct LowpassProcessor {
    convolver: StreamingConvolver,
    spare: Kernel,
    cutoff: CutoffParameter,
    window: WindowType,
    /// Last parameter value acted on, installed or rejected
    seen_cutoff_hz: Option<f32>,
    installed_cutoff_hz: Option<f32>,
    scratch: Vec<Vec<f32>>,
}

impl LowpassProcessor {
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if `config.num_taps` is even or below 3.
    pub fn new(config: &FilterConfig, cutoff: CutoffParameter) -> Result<Self> {
        Ok(Self {
            convolver: StreamingConvolver::new(config.num_taps)?,
            spare: Kernel::centered_impulse(config.num_taps),
            cutoff,
            window: config.window,
            seen_cutoff_hz: None,
            installed_cutoff_hz: None,
            scratch: Vec::new(),
        })
    }

    /// Prepare for streaming and install the kernel for the current cutoff
    ///
    /// The kernel is designed for the new sample rate before anything else
    /// changes. If that fails the processor is left unprepared, so it cannot
    /// go on filtering with a kernel built for another rate.
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if the current cutoff cannot be
    /// designed at this sample rate (e.g. it is above Nyquist).
    pub fn prepare(
        &mut self,
        sample_rate_hz: f32,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<()> {
        let cutoff_hz = self.cutoff.hz();
        if let Err(e) = self.redesign_spare(cutoff_hz, sample_rate_hz) {
            self.convolver.release();
            self.seen_cutoff_hz = None;
            self.installed_cutoff_hz = None;
            return Err(e);
        }

        self.convolver
            .prepare(sample_rate_hz, max_block_size, num_channels);
        self.scratch = vec![vec![0.0; max_block_size.max(1)]; num_channels];
        self.seen_cutoff_hz = Some(cutoff_hz);
        self.commit_spare(cutoff_hz)
    }

    /// Filter one block in place, one slice per channel
    ///
    /// A cutoff that cannot be designed keeps the previous kernel and the
    /// block is still filtered.
    ///
    /// # Errors
    /// Lifecycle errors from [`StreamingConvolver::process`]; the block is
    /// left untouched.
    pub fn process_block(&mut self, block: &mut [&mut [f32]]) -> Result<()> {
        self.convolver.check_block(block)?;
        self.update_kernel()?;
        self.convolver.process(block)
    }

    /// Filter interleaved samples `[c0, c1, .., c0, c1, ..]` in place
    ///
    /// Frames are handled in chunks of at most the prepared block size, each
    /// chunk being one processing cycle.
    ///
    /// # Errors
    /// `FilterError::InterleavedLength` if the length is not a whole number of
    /// frames, `FilterError::NotPrepared` before [`prepare`](Self::prepare).
    pub fn process_interleaved(&mut self, samples: &mut [f32]) -> Result<()> {
        if !self.convolver.is_prepared() {
            return Err(FilterError::NotPrepared);
        }
        let channels = self.convolver.num_channels();
        if channels == 0 || samples.len() % channels != 0 {
            return Err(FilterError::InterleavedLength {
                len: samples.len(),
                channels,
            });
        }

        let chunk_frames = self.convolver.max_block_size().max(1);
        for chunk in samples.chunks_mut(chunk_frames * channels) {
            let frames = chunk.len() / channels;

            for (ch, buf) in self.scratch.iter_mut().enumerate() {
                for (frame, slot) in buf[..frames].iter_mut().enumerate() {
                    *slot = chunk[frame * channels + ch];
                }
            }

            self.update_kernel()?;
            for (ch, buf) in self.scratch.iter_mut().enumerate() {
                self.convolver.process_channel(ch, &mut buf[..frames])?;
            }

            for (ch, buf) in self.scratch.iter().enumerate() {
                for (frame, &value) in buf[..frames].iter().enumerate() {
                    chunk[frame * channels + ch] = value;
                }
            }
        }
        Ok(())
    }

    /// Zero filter history (transport stop/start), keeping the kernel
    pub fn reset(&mut self) {
        self.convolver.reset();
    }

    /// Cutoff the installed kernel was designed for
    pub fn current_cutoff_hz(&self) -> Option<f32> {
        self.installed_cutoff_hz
    }

    pub fn kernel(&self) -> &Kernel {
        self.convolver.kernel()
    }

    pub fn window(&self) -> WindowType {
        self.window
    }

    pub fn sample_rate(&self) -> f32 {
        self.convolver.sample_rate()
    }

    pub fn num_channels(&self) -> usize {
        self.convolver.num_channels()
    }

    /// Delay introduced by the filter, in samples
    pub fn latency_samples(&self) -> usize {
        self.convolver.kernel().group_delay_samples()
    }

    pub fn cutoff(&self) -> &CutoffParameter {
        &self.cutoff
    }

    /// Redesign and install if the parameter moved since it was last seen
    fn update_kernel(&mut self) -> Result<()> {
        let cutoff_hz = self.cutoff.hz();
        if self.seen_cutoff_hz == Some(cutoff_hz) {
            return Ok(());
        }
        self.seen_cutoff_hz = Some(cutoff_hz);
        match self.install(cutoff_hz) {
            Err(e) if e.is_recoverable() => {
                log::warn!("Keeping previous kernel: {}", e);
                Ok(())
            }
            other => other,
        }
    }

    fn install(&mut self, cutoff_hz: f32) -> Result<()> {
        self.redesign_spare(cutoff_hz, self.convolver.sample_rate())?;
        self.commit_spare(cutoff_hz)
    }

    fn redesign_spare(&mut self, cutoff_hz: f32, sample_rate_hz: f32) -> Result<()> {
        let spec = FilterSpec::new(
            cutoff_hz,
            sample_rate_hz,
            self.convolver.num_taps(),
            self.window,
        );
        self.spare.redesign(&spec)
    }

    fn commit_spare(&mut self, cutoff_hz: f32) -> Result<()> {
        self.convolver.swap_kernel(&mut self.spare)?;
        self.installed_cutoff_hz = Some(cutoff_hz);
        log::debug!("Installed {} kernel for {:.1} Hz", self.window, cutoff_hz);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::design;

    fn processor(cutoff_hz: f32) -> (LowpassProcessor, CutoffParameter) {
        let config = FilterConfig {
            cutoff_hz,
            num_taps: 21,
            ..FilterConfig::default()
        };
        let param = CutoffParameter::from_config(&config).unwrap();
        let lp = LowpassProcessor::new(&config, param.clone()).unwrap();
        (lp, param)
    }

    #[test]
    fn test_new_rejects_even_taps() {
        let config = FilterConfig {
            num_taps: 20,
            ..FilterConfig::default()
        };
        assert!(LowpassProcessor::new(&config, CutoffParameter::default()).is_err());
    }

    #[test]
    fn test_prepare_installs_kernel() {
        let (mut lp, _) = processor(1000.0);
        lp.prepare(44100.0, 64, 2).unwrap();
        let expected = design(&FilterSpec::new(1000.0, 44100.0, 21, WindowType::Hamming)).unwrap();
        assert_eq!(lp.kernel(), &expected);
        assert_eq!(lp.current_cutoff_hz(), Some(1000.0));
        assert_eq!(lp.latency_samples(), 10);
    }

    #[test]
    fn test_prepare_rejects_cutoff_above_nyquist() {
        let (mut lp, _) = processor(12000.0);
        let result = lp.prepare(16000.0, 64, 1);
        assert!(matches!(result, Err(FilterError::InvalidSpec(_))));
    }

    #[test]
    fn test_failed_reprepare_leaves_processor_unprepared() {
        let (mut lp, _) = processor(12000.0);
        lp.prepare(48000.0, 64, 1).unwrap();

        let result = lp.prepare(16000.0, 64, 1);
        assert!(matches!(result, Err(FilterError::InvalidSpec(_))));
        assert_eq!(lp.current_cutoff_hz(), None);

        let mut block = vec![1.0f32; 64];
        assert!(matches!(
            lp.process_block(&mut [&mut block[..]]),
            Err(FilterError::NotPrepared)
        ));
        assert!(block.iter().all(|&s| s == 1.0));

        // A rate the cutoff fits recovers it
        lp.prepare(44100.0, 64, 1).unwrap();
        let expected = design(&FilterSpec::new(12000.0, 44100.0, 21, WindowType::Hamming)).unwrap();
        assert_eq!(lp.kernel(), &expected);
    }

    #[test]
    fn test_rejected_block_does_not_redesign() {
        let (mut lp, param) = processor(1000.0);
        lp.prepare(44100.0, 64, 2).unwrap();
        let before = lp.kernel().clone();

        param.set_hz(5000.0);
        let mut left = vec![0.0f32; 64];
        assert!(matches!(
            lp.process_block(&mut [&mut left[..]]),
            Err(FilterError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(lp.kernel(), &before);
        assert_eq!(lp.current_cutoff_hz(), Some(1000.0));

        // The pending change lands with the next valid block
        let mut right = vec![0.0f32; 64];
        lp.process_block(&mut [&mut left[..], &mut right[..]]).unwrap();
        assert_eq!(lp.current_cutoff_hz(), Some(5000.0));
    }

    #[test]
    fn test_process_before_prepare() {
        let (mut lp, _) = processor(1000.0);
        let mut left = vec![0.0f32; 8];
        assert!(matches!(
            lp.process_block(&mut [&mut left[..]]),
            Err(FilterError::NotPrepared)
        ));
        let mut interleaved = vec![0.0f32; 8];
        assert!(matches!(
            lp.process_interleaved(&mut interleaved),
            Err(FilterError::NotPrepared)
        ));
    }

    #[test]
    fn test_cutoff_change_is_picked_up_next_block() {
        let (mut lp, param) = processor(1000.0);
        lp.prepare(44100.0, 64, 1).unwrap();

        param.set_hz(5000.0);
        let mut block = vec![0.0f32; 64];
        lp.process_block(&mut [&mut block[..]]).unwrap();

        let expected = design(&FilterSpec::new(5000.0, 44100.0, 21, WindowType::Hamming)).unwrap();
        assert_eq!(lp.kernel(), &expected);
        assert_eq!(lp.current_cutoff_hz(), Some(5000.0));
    }

    #[test]
    fn test_invalid_cutoff_keeps_previous_kernel() {
        let (mut lp, param) = processor(1000.0);
        lp.prepare(16000.0, 64, 1).unwrap();
        let before = lp.kernel().clone();

        // In range for the parameter but above Nyquist at 16 kHz
        param.set_hz(9000.0);
        let mut block = vec![1.0f32; 64];
        lp.process_block(&mut [&mut block[..]]).unwrap();

        assert_eq!(lp.kernel(), &before);
        assert_eq!(lp.current_cutoff_hz(), Some(1000.0));
        // The block was still filtered
        assert!(block[0] < 1.0);
    }

    #[test]
    fn test_interleaved_matches_per_channel() {
        let input: Vec<f32> = (0..300).map(|i| ((i * 37) % 101) as f32 / 50.0 - 1.0).collect();

        let (mut interleaved_proc, _) = processor(3000.0);
        interleaved_proc.prepare(44100.0, 32, 2).unwrap();
        let mut interleaved = input.clone();
        interleaved_proc.process_interleaved(&mut interleaved).unwrap();

        let (mut block_proc, _) = processor(3000.0);
        block_proc.prepare(44100.0, 32, 2).unwrap();
        let mut left: Vec<f32> = input.iter().step_by(2).copied().collect();
        let mut right: Vec<f32> = input.iter().skip(1).step_by(2).copied().collect();
        block_proc
            .process_block(&mut [&mut left[..], &mut right[..]])
            .unwrap();

        for frame in 0..150 {
            assert_eq!(interleaved[frame * 2], left[frame]);
            assert_eq!(interleaved[frame * 2 + 1], right[frame]);
        }
    }

    #[test]
    fn test_interleaved_rejects_partial_frame() {
        let (mut lp, _) = processor(1000.0);
        lp.prepare(44100.0, 32, 2).unwrap();
        let mut samples = vec![0.0f32; 7];
        assert!(matches!(
            lp.process_interleaved(&mut samples),
            Err(FilterError::InterleavedLength {
                len: 7,
                channels: 2
            })
        ));
    }

    #[test]
    fn test_reset_keeps_kernel() {
        let (mut lp, _) = processor(1000.0);
        lp.prepare(44100.0, 64, 1).unwrap();
        let kernel = lp.kernel().clone();
        let mut block = vec![1.0f32; 64];
        lp.process_block(&mut [&mut block[..]]).unwrap();
        lp.reset();
        assert_eq!(lp.kernel(), &kernel);

        let mut silence = vec![0.0f32; 64];
        lp.process_block(&mut [&mut silence[..]]).unwrap();
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
