/// Fraction of positive labels, zero when there are no samples.
#[inline]
pub fn positive_rate(n_positive: usize, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        n_positive as f64 / n as f64
    }
}

/// Shannon entropy (base 2) of a binary label distribution.
///
/// Classes with a zero count contribute nothing, so pure and empty
/// sets both have an entropy of 0.
pub fn entropy(n_positive: usize, n: usize) -> f64 {
    let mut h = 0.0;
    if n == 0 {
        return h;
    }
    if n_positive > 0 {
        let p = n_positive as f64 / n as f64;
        h -= p * p.log2();
    }
    let n_negative = n - n_positive;
    if n_negative > 0 {
        let q = n_negative as f64 / n as f64;
        h -= q * q.log2();
    }
    h
}

/// Size-weighted average entropy over groups of `(n_positive, n)`.
/// Returns 0 if the groups hold no samples at all.
pub fn weighted_entropy<I>(groups: I) -> f64
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut total = 0;
    let mut h = 0.0;
    for (n_positive, n) in groups {
        total += n;
        h += n as f64 * entropy(n_positive, n);
    }
    if total == 0 {
        0.0
    } else {
        h / total as f64
    }
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
