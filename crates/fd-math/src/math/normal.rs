//! Inverse cumulative distribution function of the Normal distribution.
//!
//! Implements Wichura's algorithm AS 241 (PPND16), accurate to full double
//! precision. Kept inline with no external dependency; the quantile is the
//! only piece of distribution theory the estimators need.

#![allow(clippy::excessive_precision)]

// AS 241 PPND16 coefficients, central region |p − 0.5| ≤ 0.425.
const A: [f64; 8] = [
    3.3871328727963666080,
    1.3314166789178437745e+2,
    1.9715909503065514427e+3,
    1.3731693765509461125e+4,
    4.5921953931549871457e+4,
    6.7265770927008700853e+4,
    3.3430575583588128105e+4,
    2.5090809287301226727e+3,
];
const B: [f64; 7] = [
    4.2313330701600911252e+1,
    6.8718700749205790830e+2,
    5.3941960214247511077e+3,
    2.1213794301586595867e+4,
    3.9307895800092710610e+4,
    2.8729085735721942674e+4,
    5.2264952788528545610e+3,
];

// Near tail, r = sqrt(−ln(min(p, 1−p))) ≤ 5.
const C: [f64; 8] = [
    1.42343711074968357734,
    4.63033784615654529590,
    5.76949722146069140550,
    3.64784832476320460504,
    1.27045825245236838258,
    2.41780725177450611770e-1,
    2.27238449892691845833e-2,
    7.74545014278341407640e-4,
];
const D: [f64; 7] = [
    2.05319162663775882187,
    1.67638483018380384940,
    6.89767334985100004550e-1,
    1.48103976427480074590e-1,
    1.51986665636164571966e-2,
    5.47593808499534494600e-4,
    1.05075007164441684324e-9,
];

// Far tail, r > 5.
const E: [f64; 8] = [
    6.65790464350110377720,
    5.46378491116411436990,
    1.78482653991729133580,
    2.96560571828504891230e-1,
    2.65321895265761230930e-2,
    1.24266094738807843860e-3,
    2.71155556874348757815e-5,
    2.01033439929228813265e-7,
];
const F: [f64; 7] = [
    5.99832206555887937690e-1,
    1.36929880922735805310e-1,
    1.48753612908506148525e-2,
    7.86869131145613259100e-4,
    1.84631831751005468180e-5,
    1.42151175831644588870e-7,
    2.04426310338993978564e-15,
];

/// Rational polynomial num/den evaluated by Horner's rule, with the leading
/// denominator coefficient fixed at 1.
fn rational(num: &[f64; 8], den: &[f64; 7], r: f64) -> f64 {
    let mut n = num[7];
    for coeff in num[..7].iter().rev() {
        n = n * r + coeff;
    }
    let mut d = den[6];
    for coeff in den[..6].iter().rev() {
        d = d * r + coeff;
    }
    n / (d * r + 1.0)
}

/// Quantile of the standard Normal distribution at probability `p`.
///
/// Returns `None` unless `0 < p < 1`.
pub fn standard_quantile(p: f64) -> Option<f64> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return None;
    }

    let q = p - 0.5;
    if q.abs() <= 0.425 {
        let r = 0.180625 - q * q;
        return Some(q * rational(&A, &B, r));
    }

    let tail_p = if q < 0.0 { p } else { 1.0 - p };
    let r = (-tail_p.ln()).sqrt();
    let value = if r <= 5.0 {
        rational(&C, &D, r - 1.6)
    } else {
        rational(&E, &F, r - 5.0)
    };
    Some(if q < 0.0 { -value } else { value })
}

/// Quantile of a Normal distribution with the given mean and standard
/// deviation.
///
/// Returns `None` when `p` is outside `(0, 1)` or the standard deviation is
/// not strictly positive, the degenerate-fit case the caller must diagnose.
pub fn normal_quantile(p: f64, mean: f64, std_dev: f64) -> Option<f64> {
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return None;
    }
    Some(mean + std_dev * standard_quantile(p)?)
}
