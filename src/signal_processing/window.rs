use crate::config::WindowType;
use std::f64::consts::PI;

impl WindowType {
    /// Window weight for sample `n` of a window `len` samples long.
    ///
    /// The generalized-cosine windows reach their minimum at both ends and
    /// peak at the centre. `len` must be at least 2.
    pub fn value(self, n: usize, len: usize) -> f64 {
        debug_assert!(len >= 2 && n < len);
        let phase = 2.0 * PI * n as f64 / (len - 1) as f64;
        match self {
            WindowType::Hamming => 0.54 - 0.46 * phase.cos(),
            WindowType::Hann => 0.5 - 0.5 * phase.cos(),
            WindowType::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
            WindowType::Rectangular => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALL: [WindowType; 4] = [
        WindowType::Hamming,
        WindowType::Hann,
        WindowType::Blackman,
        WindowType::Rectangular,
    ];

    #[test]
    fn test_window_peaks_at_centre() {
        for window in ALL {
            assert_abs_diff_eq!(window.value(10, 21), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_window_edges() {
        assert_abs_diff_eq!(WindowType::Hamming.value(0, 21), 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Hann.value(0, 21), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Blackman.value(20, 21), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Rectangular.value(20, 21), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_is_symmetric() {
        for window in ALL {
            for n in 0..31 {
                assert_abs_diff_eq!(
                    window.value(n, 31),
                    window.value(30 - n, 31),
                    epsilon = 1e-12
                );
            }
        }
    }
}
