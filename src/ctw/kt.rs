//! The Krichevsky–Trofimov estimator for a binary source.
//!
//! kt(m, n) is the probability that a memoryless source with an unknown bias
//! (under the Jeffreys (1/2, 1/2) prior) emits a particular sequence with 'm'
//! zeros and 'n' ones. It satisfies:
//!
//! ```text
//! kt(0, 0) = 1
//! kt(0, n) = kt(0, n - 1) * (n - 1/2) / n
//! kt(m, n) = kt(m - 1, n) * (m - 1/2) / (m + n)
//! ```

use statrs::function::gamma::ln_gamma;

use crate::error::{CtwError, Result};
use crate::utils::check_symbol;

/// Counts up to this total are evaluated by replaying the recurrences.
/// Larger counts use the closed form.
pub const EXACT_LIMIT: u64 = 256;

/// Computes the Krichevsky–Trofimov estimate for 'zeros' zeros and 'ones'
/// ones. For small counts the recurrences are unrolled into two loops that
/// perform the same multiplications, in the same order, as the recursive
/// definition, so the results are bit-identical to it. Above EXACT_LIMIT the
/// estimate comes from the closed form, in constant time.
pub fn kt(zeros: u64, ones: u64) -> f64 {
    if zeros.saturating_add(ones) > EXACT_LIMIT {
        return kt_log2(zeros, ones).exp2();
    }
    let mut p = 1.0;
    // Climb kt(0, 0) -> kt(0, ones).
    for n in 1..=ones {
        let n = n as f64;
        p = p * (n - 0.5) / n;
    }
    // Climb kt(0, ones) -> kt(zeros, ones).
    let b = ones as f64;
    for m in 1..=zeros {
        let m = m as f64;
        p = p * (m - 0.5) / (m + b);
    }
    p
}

/// Returns log2 of the KT estimate, from the closed form
///
/// ```text
/// kt(m, n) = G(m + 1/2) * G(n + 1/2) / (G(1/2)^2 * G(m + n + 1))
/// ```
///
/// where G is the gamma function. This does not underflow for large counts.
pub fn kt_log2(zeros: u64, ones: u64) -> f64 {
    if zeros == 0 && ones == 0 {
        return 0.0;
    }
    let (m, n) = (zeros as f64, ones as f64);
    let ln = ln_gamma(m + 0.5) + ln_gamma(n + 0.5)
        - 2.0 * ln_gamma(0.5)
        - ln_gamma(m + n + 1.0);
    ln / std::f64::consts::LN_2
}

/// A checked entry point for counts that arrive as signed integers (from the
/// command line, for example). Negative counts are rejected before any work
/// is done.
pub fn kt_signed(zeros: i64, ones: i64) -> Result<f64> {
    let check =
        |n: i64| u64::try_from(n).map_err(|_| CtwError::NegativeCount(n));
    Ok(kt(check(zeros)?, check(ones)?))
}

/// The sequential KT rule: the probability that the next symbol is 'symbol'
/// after observing 'zeros' zeros and 'ones' ones. This equals
/// kt(after) / kt(before).
pub fn kt_predict(zeros: u64, ones: u64, symbol: u8) -> Result<f64> {
    let seen = match check_symbol(symbol)? {
        0 => zeros,
        _ => ones,
    };
    Ok((seen as f64 + 0.5) / ((zeros + ones) as f64 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The recursive definition, used as a reference.
    fn kt_recursive(zeros: u64, ones: u64) -> f64 {
        if zeros == 0 && ones == 0 {
            return 1.0;
        }
        if zeros == 0 {
            let b = ones as f64;
            return kt_recursive(0, ones - 1) * (b - 0.5) / b;
        }
        let a = zeros as f64;
        let b = ones as f64;
        kt_recursive(zeros - 1, ones) * (a - 0.5) / (a + b)
    }

    #[test]
    fn test_matches_recursion() {
        for zeros in 0..30 {
            for ones in 0..30 {
                assert_eq!(kt(zeros, ones), kt_recursive(zeros, ones));
            }
        }
    }

    #[test]
    fn test_log2() {
        for (zeros, ones) in [(0, 0), (1, 0), (4, 2), (17, 3), (50, 50)] {
            let expected = kt_recursive(zeros, ones).log2();
            assert!((kt_log2(zeros, ones) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_closed_form_above_limit() {
        // Both sides of the switch agree with the recursion.
        for (zeros, ones) in [(200, 56), (200, 57), (100, 300), (0, 400)] {
            let expected = kt_recursive(zeros, ones);
            let p = kt(zeros, ones);
            assert!((p - expected).abs() <= expected * 1e-9);
        }
    }

    #[test]
    fn test_large_counts_are_constant_time() {
        let lp = kt_log2(10_000_000_000, 5_000_000_000);
        assert!(lp.is_finite() && lp < -1e10);
        assert_eq!(kt(10_000_000_000, 5_000_000_000), 0.0);
    }

    #[test]
    fn test_predict_is_ratio() {
        let ratio = kt(3, 2) / kt(2, 2);
        assert!((kt_predict(2, 2, 0).unwrap() - ratio).abs() < 1e-15);
        assert_eq!(kt_predict(0, 0, 1).unwrap(), 0.5);
        assert_eq!(kt_predict(0, 0, 2), Err(CtwError::InvalidSymbol(2)));
    }
}
