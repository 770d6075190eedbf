//! CPU feature detection for picking the row kernel at runtime.

/// Available SIMD instruction sets, ordered by width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    /// No SIMD, use scalar code.
    Scalar,
    /// SSE2 (128-bit, available on all x86-64).
    Sse2,
    /// ARM NEON (128-bit).
    Neon,
    /// AVX2 with FMA (256-bit).
    Avx2,
    /// AVX-512 (512-bit).
    Avx512,
}

impl SimdLevel {
    /// Detect the best available SIMD level at runtime.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx512f") {
                return SimdLevel::Avx512;
            }
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return SimdLevel::Avx2;
            }
            SimdLevel::Sse2
        }

        #[cfg(target_arch = "aarch64")]
        {
            SimdLevel::Neon
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            SimdLevel::Scalar
        }
    }
}

static SIMD_LEVEL: std::sync::OnceLock<SimdLevel> = std::sync::OnceLock::new();

/// Get the detected SIMD level (cached).
pub fn simd_level() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(|| {
        let level = SimdLevel::detect();
        tracing::debug!(?level, "detected SIMD level");
        level
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let level = SimdLevel::detect();

        #[cfg(target_arch = "x86_64")]
        assert!(level >= SimdLevel::Sse2);

        #[cfg(target_arch = "aarch64")]
        assert_eq!(level, SimdLevel::Neon);

        assert!(level >= SimdLevel::Scalar);
    }

    #[test]
    fn test_simd_level_cached() {
        assert_eq!(simd_level(), simd_level());
    }
}
