/// Welch two-sample t-test of tidal-method vs slug-test conductivity.
///
/// Unpaired, unequal variances, two-sided. The result is reported and
/// nothing downstream branches on it.

use crate::model::{AnalysisError, TTestResult};

fn mean_and_variance(sample: &[f64]) -> (f64, f64) {
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let var = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

/// Welch's t-test with Welch–Satterthwaite degrees of freedom.
pub fn welch_t_test(computed: &[f64], field: &[f64]) -> Result<TTestResult, AnalysisError> {
    if computed.len() < 2 || field.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "t-test needs two values per sample, got {} and {}",
            computed.len(),
            field.len()
        )));
    }

    let (n1, n2) = (computed.len() as f64, field.len() as f64);
    let (mean1, var1) = mean_and_variance(computed);
    let (mean2, var2) = mean_and_variance(field);

    let se1 = var1 / n1;
    let se2 = var2 / n2;
    if se1 + se2 == 0.0 {
        return Err(AnalysisError::InsufficientData(
            "both samples have zero variance".to_string(),
        ));
    }

    let statistic = (mean1 - mean2) / (se1 + se2).sqrt();
    let df = (se1 + se2).powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    let p_value = two_sided_p(statistic, df);

    Ok(TTestResult {
        statistic,
        degrees_of_freedom: df,
        p_value,
        mean_computed: mean1,
        mean_field: mean2,
    })
}

/// P(|T| ≥ |t|) for Student's t with `df` degrees of freedom.
pub fn two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    regularized_incomplete_beta(df / (df + t * t), df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Natural log of the gamma function (Lanczos, g = 7, n = 9).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula
        return (std::f64::consts::PI / (std::f64::consts::PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut a = COEFFS[0];
    let t = x + 7.5;
    for (i, &c) in COEFFS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// I_x(a, b), via the continued fraction evaluated with Lentz's method.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();

    // The continued fraction converges fastest below the mean.
    if x < (a + 1.0) / (a + b + 2.0) {
        ln_front.exp() * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - ln_front.exp() * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(ln_gamma(1.0).abs() < 1e-12);
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-12);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_beta_symmetry() {
        let x = 0.3;
        let lhs = regularized_incomplete_beta(x, 2.5, 4.0);
        let rhs = 1.0 - regularized_incomplete_beta(1.0 - x, 4.0, 2.5);
        assert!((lhs - rhs).abs() < 1e-12);
        // I_x(1, 1) is the uniform CDF.
        assert!((regularized_incomplete_beta(0.37, 1.0, 1.0) - 0.37).abs() < 1e-12);
    }

    #[test]
    fn test_t_distribution_critical_values() {
        // Two-sided 5% critical values from standard tables.
        assert!((two_sided_p(2.228_138_85, 10.0) - 0.05).abs() < 1e-6);
        assert!((two_sided_p(12.706_204_7, 1.0) - 0.05).abs() < 1e-6);
        assert!((two_sided_p(0.0, 7.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_welch_matches_reference_computation() {
        // Reference: t = -3.5778, df = 7.4060, p = 0.00819
        let computed = [19.1, 21.4, 18.2, 20.5, 22.0];
        let field = [23.4, 25.9, 21.7, 27.1, 24.2];
        let result = welch_t_test(&computed, &field).unwrap();

        assert!((result.mean_computed - 20.24).abs() < 1e-9);
        assert!((result.mean_field - 24.46).abs() < 1e-9);
        assert!((result.statistic + 3.5778).abs() < 1e-4);
        assert!((result.degrees_of_freedom - 7.4060).abs() < 1e-4);
        assert!((result.p_value - 0.00819).abs() < 1e-4);
    }

    #[test]
    fn test_identical_samples_give_p_one() {
        let a = [1.0, 2.0, 3.0];
        let result = welch_t_test(&a, &a).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert!((result.degrees_of_freedom - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_sample_is_rejected() {
        let err = welch_t_test(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
