use crate::error::{FilterError, Result};
use crate::signal_processing::{Kernel, validate_num_taps};

/// Per-channel convolution history
///
/// A ring buffer holding the current sample plus the previous
/// `num_taps - 1` inputs, so convolution continues seamlessly across block
/// boundaries.
struct ChannelState {
    delay_line: Vec<f64>,
    pos: usize,
}

impl ChannelState {
    fn new(num_taps: usize) -> Self {
        Self {
            delay_line: vec![0.0; num_taps],
            pos: 0,
        }
    }

    fn clear(&mut self) {
        self.delay_line.fill(0.0);
        self.pos = 0;
    }

    /// Push one input sample and return the filtered output
    #[inline]
    fn process(&mut self, taps: &[f64], sample: f32) -> f32 {
        self.delay_line[self.pos] = sample as f64;

        let mut output = 0.0f64;
        let n = taps.len();

        // Iterate the ring buffer in two contiguous reverse ranges to avoid
        // modulo arithmetic in the inner convolution loop.
        let mut tap_i = 0usize;
        for delay_idx in (0..=self.pos).rev() {
            output += taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        for delay_idx in ((self.pos + 1)..n).rev() {
            output += taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, n);

        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }
        output as f32
    }
}

/// Multi-channel streaming FIR convolver
///
/// Holds one kernel shared by every channel and a history buffer per
/// channel. Must be prepared before processing; `process` never allocates,
/// locks or blocks, so it is safe to call from an audio callback.
///
/// Until the first [`set_kernel`](Self::set_kernel) the kernel is a centred
/// unit impulse, which delays audio by the group delay without filtering it.
pub struct StreamingConvolver {
    kernel: Kernel,
    channels: Vec<ChannelState>,
    sample_rate_hz: f32,
    max_block_size: usize,
    prepared: bool,
}

impl StreamingConvolver {
    /// Create an unprepared convolver for kernels of `num_taps` coefficients
    ///
    /// # Errors
    /// Returns `FilterError::InvalidSpec` if `num_taps` is even or below 3.
    pub fn new(num_taps: usize) -> Result<Self> {
        validate_num_taps(num_taps)?;
        Ok(Self {
            kernel: Kernel::centered_impulse(num_taps),
            channels: Vec::new(),
            sample_rate_hz: 0.0,
            max_block_size: 0,
            prepared: false,
        })
    }

    /// Allocate and zero per-channel history
    ///
    /// Calling this again fully re-initializes the convolver and discards any
    /// carried history. The installed kernel is kept.
    pub fn prepare(&mut self, sample_rate_hz: f32, max_block_size: usize, num_channels: usize) {
        let num_taps = self.kernel.num_taps();
        self.channels = (0..num_channels)
            .map(|_| ChannelState::new(num_taps))
            .collect();
        self.sample_rate_hz = sample_rate_hz;
        self.max_block_size = max_block_size;
        self.prepared = true;
        log::debug!(
            "Convolver prepared: {} channels, {} taps, {} Hz, max block {}",
            num_channels,
            num_taps,
            sample_rate_hz,
            max_block_size
        );
    }

    /// Install a new kernel, effective from the next processed sample
    ///
    /// Returns the kernel that was installed before, so the caller decides
    /// where it gets dropped.
    ///
    /// # Errors
    /// Returns `FilterError::KernelLengthMismatch` if the kernel length differs
    /// from the length this convolver was built for.
    pub fn set_kernel(&mut self, mut kernel: Kernel) -> Result<Kernel> {
        self.swap_kernel(&mut kernel)?;
        Ok(kernel)
    }

    /// Exchange the installed kernel with `kernel`
    ///
    /// On success `kernel` holds the previously installed coefficients. On
    /// error neither side changes.
    pub fn swap_kernel(&mut self, kernel: &mut Kernel) -> Result<()> {
        if kernel.num_taps() != self.kernel.num_taps() {
            return Err(FilterError::KernelLengthMismatch {
                expected: self.kernel.num_taps(),
                actual: kernel.num_taps(),
            });
        }
        std::mem::swap(&mut self.kernel, kernel);
        Ok(())
    }

    /// Filter one block in place, one slice per channel
    ///
    /// The block is validated before any sample is modified, so an error
    /// leaves both the block and the carried history untouched.
    ///
    /// # Errors
    /// - `FilterError::NotPrepared` if called before [`prepare`](Self::prepare)
    /// - `FilterError::ChannelCountMismatch` if the block has a different
    ///   channel count than prepared
    /// - `FilterError::BlockLengthMismatch` if channels differ in length
    pub fn process(&mut self, block: &mut [&mut [f32]]) -> Result<()> {
        self.check_block(block)?;

        let taps = self.kernel.taps();
        for (state, samples) in self.channels.iter_mut().zip(block.iter_mut()) {
            for sample in samples.iter_mut() {
                *sample = state.process(taps, *sample);
            }
        }
        Ok(())
    }

    /// Check that `block` can be processed, without touching anything
    ///
    /// # Errors
    /// The same lifecycle errors as [`process`](Self::process).
    pub fn check_block(&self, block: &[&mut [f32]]) -> Result<()> {
        if !self.prepared {
            return Err(FilterError::NotPrepared);
        }
        if block.len() != self.channels.len() {
            return Err(FilterError::ChannelCountMismatch {
                expected: self.channels.len(),
                actual: block.len(),
            });
        }
        if let Some(first) = block.first() {
            let expected = first.len();
            if let Some(bad) = block.iter().find(|ch| ch.len() != expected) {
                return Err(FilterError::BlockLengthMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(())
    }

    /// Filter one channel of a block in place
    ///
    /// For hosts whose channel buffers are not available together. Callers
    /// must feed every channel the same number of samples per block and must
    /// not change the kernel between channels of one block.
    ///
    /// # Errors
    /// - `FilterError::NotPrepared` if called before [`prepare`](Self::prepare)
    /// - `FilterError::ChannelCountMismatch` if `channel` is not a prepared channel
    pub fn process_channel(&mut self, channel: usize, samples: &mut [f32]) -> Result<()> {
        if !self.prepared {
            return Err(FilterError::NotPrepared);
        }
        let num_channels = self.channels.len();
        let state = self
            .channels
            .get_mut(channel)
            .ok_or(FilterError::ChannelCountMismatch {
                expected: num_channels,
                actual: channel + 1,
            })?;
        let taps = self.kernel.taps();
        for sample in samples.iter_mut() {
            *sample = state.process(taps, *sample);
        }
        Ok(())
    }

    /// Drop channel history and return to the unprepared state
    ///
    /// The kernel is kept; [`prepare`](Self::prepare) must be called again
    /// before processing.
    pub fn release(&mut self) {
        self.channels = Vec::new();
        self.prepared = false;
    }

    /// Zero all channel history without touching the kernel
    pub fn reset(&mut self) {
        for state in self.channels.iter_mut() {
            state.clear();
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate_hz
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.kernel.num_taps()
    }

    /// Currently installed kernel
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}
