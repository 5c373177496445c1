//! Numeric helpers shared by the policy tree and the self-play driver.

/// Exponent applied per round when sharpening.
const SHARPEN_STEP: f64 = 10.0;

/// Numerically stable softmax. Returns `None` for empty input.
pub fn softmax(logits: &[f32]) -> Option<Vec<f32>> {
    let max = logits.iter().copied().reduce(f32::max)?;
    let exp: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    Some(exp.into_iter().map(|x| x / sum).collect())
}

fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    values.iter_mut().for_each(|v| *v /= sum);
}

/// Probabilities proportional to `counts ^ (1 / temperature)`.
///
/// Large exponents are applied as repeated tenth powers with a
/// renormalisation in between, so small temperatures do not underflow.
/// At least one count must be positive.
pub fn sharpen(counts: &[f64], temperature: f64) -> Vec<f64> {
    let mut pi = counts.to_vec();
    normalize(&mut pi);
    let mut exponent = temperature.recip();
    while exponent >= SHARPEN_STEP {
        pi.iter_mut().for_each(|p| *p = p.powi(SHARPEN_STEP as i32));
        normalize(&mut pi);
        exponent /= SHARPEN_STEP;
    }
    pi.iter_mut().for_each(|p| *p = p.powf(exponent));
    normalize(&mut pi);
    pi
}

/// Histogram of sampled action indices over `actions` slots.
pub fn repeat_counts(samples: &[usize], actions: usize) -> Vec<u32> {
    let mut counts = vec![0; actions];
    for &action in samples {
        counts[action] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, prelude::*};

    use super::*;

    fn assert_close(a: &[f64], b: &[f64], tolerance: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tolerance, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0, 3.0]).unwrap();
        let b = softmax(&[1001.0, 1002.0, 1003.0]).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
        assert!((a.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(a[2] > a[1] && a[1] > a[0]);
    }

    #[test]
    fn softmax_of_nothing() {
        assert_eq!(softmax(&[]), None);
    }

    /// Visit counts with at least one positive entry. Roughly a third are zero.
    fn arb_counts() -> impl Strategy<Value = Vec<f64>> {
        vec(prop_oneof![Just(0.0), 1e-3..1e4f64, (1u32..1000).prop_map(f64::from)], 1..40)
            .prop_filter("needs a positive count", |counts| counts.iter().any(|&c| c > 0.0))
    }

    /// Temperatures spread log-uniformly over 1e-3..1e3.
    fn arb_temperature() -> impl Strategy<Value = f64> {
        (-3.0..3.0f64).prop_map(|e| 10f64.powf(e))
    }

    proptest! {
        #[test]
        fn sharpen_sums_to_one(counts in arb_counts(), temperature in arb_temperature()) {
            let pi = sharpen(&counts, temperature);
            prop_assert_eq!(pi.len(), counts.len());
            let sum: f64 = pi.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum {} at {}: {:?}", sum, temperature, pi);
            for (p, &c) in pi.iter().zip(&counts) {
                prop_assert!(*p >= 0.0);
                if c == 0.0 {
                    prop_assert_eq!(*p, 0.0);
                }
            }
        }

        #[test]
        fn histogram_counts_every_sample(
            (actions, samples) in (1usize..50).prop_flat_map(|n| (Just(n), vec(0..n, 0..300)))
        ) {
            let counts = repeat_counts(&samples, actions);
            prop_assert_eq!(counts.len(), actions);
            prop_assert_eq!(counts.iter().sum::<u32>() as usize, samples.len());
            for (action, &count) in counts.iter().enumerate() {
                prop_assert_eq!(count as usize, samples.iter().filter(|&&s| s == action).count());
            }
        }
    }

    #[test]
    fn unit_temperature_normalises_counts() {
        assert_close(&sharpen(&[3.0, 1.0], 1.0), &[0.75, 0.25], 1e-12);
    }

    #[test]
    fn low_temperature_approaches_argmax() {
        let pi = sharpen(&[40.0, 50.0, 10.0], 0.001);
        assert_close(&pi, &[0.0, 1.0, 0.0], 1e-9);
    }

    #[test]
    fn high_temperature_flattens_support() {
        let pi = sharpen(&[1.0, 0.0, 99.0], 1e6);
        assert_close(&pi, &[0.5, 0.0, 0.5], 1e-4);
    }

    #[test]
    fn histogram_of_unsorted_samples() {
        let samples = [4, 0, 4, 2, 4, 0];
        let counts = repeat_counts(&samples, 6);
        assert_eq!(counts, vec![2, 0, 1, 0, 3, 0]);
        assert_eq!(counts.iter().sum::<u32>() as usize, samples.len());
    }

    #[test]
    fn histogram_of_nothing() {
        assert_eq!(repeat_counts(&[], 3), vec![0, 0, 0]);
    }
}
