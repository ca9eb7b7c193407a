//! Exact binomial coefficients.

/// Binomial coefficient C(n, k), or `None` when it does not fit in 128 bits.
///
/// Out-of-range selections (k > n) are zero rather than an error.
pub fn binomial(n: u32, k: u32) -> Option<u128> {
    if k > n {
        return Some(0);
    }

    // C(n, i) * (n - i) is always divisible by (i + 1), so every step stays exact.
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result.checked_mul(u128::from(n - i))? / u128::from(i + 1);
    }
    Some(result)
}
