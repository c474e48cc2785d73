//! Capital allocation across several paths.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::domain::id::PathKey;

/// Per-path bounds on an allocation, base-token UI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationBounds {
    /// Allocations below this are dropped to zero.
    pub min: Decimal,
    /// No path receives more than this.
    pub max: Decimal,
}

/// Split `total_capital` across paths in proportion to their scores.
///
/// Paths whose proportional share exceeds `bounds.max` are capped and the
/// excess is redistributed among the rest. Shares that end below
/// `bounds.min` are zeroed and not redistributed. Non-finite or negative
/// scores count as zero. Results are never negative and sum to at most
/// `total_capital`.
#[must_use]
pub fn allocate_across_paths(
    scored: &[(PathKey, f64)],
    total_capital: Decimal,
    bounds: AllocationBounds,
) -> Vec<(PathKey, Decimal)> {
    let mut out: Vec<(PathKey, Decimal)> =
        scored.iter().map(|(k, _)| (k.clone(), Decimal::ZERO)).collect();
    let max = bounds.max.max(Decimal::ZERO);
    if total_capital <= Decimal::ZERO || max.is_zero() {
        return out;
    }

    let scores: Vec<f64> = scored
        .iter()
        .map(|(_, s)| if s.is_finite() && *s > 0.0 { *s } else { 0.0 })
        .collect();
    let mut active: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] > 0.0).collect();
    let mut remaining = total_capital;

    while !active.is_empty() && remaining > Decimal::ZERO {
        let sum: f64 = active.iter().map(|&i| scores[i]).sum();
        let shares: Vec<(usize, Decimal)> = active
            .iter()
            .map(|&i| (i, remaining * weight(scores[i], sum)))
            .collect();
        let capped: Vec<usize> = shares
            .iter()
            .filter(|(_, share)| *share > max)
            .map(|(i, _)| *i)
            .collect();

        if capped.is_empty() {
            // The last share takes the remainder so rounding never overspends.
            let mut left = remaining;
            for (n, (i, share)) in shares.iter().enumerate() {
                let amount = if n + 1 == shares.len() {
                    left
                } else {
                    (*share).min(left)
                };
                out[*i].1 = amount;
                left -= amount;
            }
            break;
        }
        for &i in &capped {
            out[i].1 = max;
            remaining -= max;
        }
        active.retain(|i| !capped.contains(i));
    }

    for (_, amount) in &mut out {
        if *amount < bounds.min || amount.is_sign_negative() {
            *amount = Decimal::ZERO;
        }
    }
    out
}

fn weight(score: f64, sum: f64) -> Decimal {
    if sum <= 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(score / sum).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn keys(scores: &[f64]) -> Vec<(PathKey, f64)> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| (PathKey::from(format!("p{i}").as_str()), *s))
            .collect()
    }

    fn amounts(out: &[(PathKey, Decimal)]) -> Vec<Decimal> {
        out.iter().map(|(_, a)| *a).collect()
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    const WIDE: AllocationBounds = AllocationBounds {
        min: Decimal::ZERO,
        max: Decimal::MAX,
    };

    #[test]
    fn test_proportional_split() {
        let out = allocate_across_paths(&keys(&[1.0, 3.0]), dec!(100), WIDE);
        let a = amounts(&out);
        assert!(close(a[0], dec!(25)));
        assert!(close(a[1], dec!(75)));
    }

    #[test]
    fn test_cap_redistributes_excess() {
        let bounds = AllocationBounds {
            min: Decimal::ZERO,
            max: dec!(50),
        };
        let out = allocate_across_paths(&keys(&[8.0, 1.0, 1.0]), dec!(100), bounds);
        let a = amounts(&out);
        assert_eq!(a[0], dec!(50));
        assert!(close(a[1], dec!(25)));
        assert!(close(a[2], dec!(25)));
    }

    #[test]
    fn test_all_capped_leaves_capital_unspent() {
        let bounds = AllocationBounds {
            min: Decimal::ZERO,
            max: dec!(10),
        };
        let out = allocate_across_paths(&keys(&[1.0, 1.0]), dec!(100), bounds);
        assert_eq!(amounts(&out), vec![dec!(10), dec!(10)]);
    }

    #[test]
    fn test_below_min_is_zeroed() {
        let bounds = AllocationBounds {
            min: dec!(20),
            max: Decimal::MAX,
        };
        let out = allocate_across_paths(&keys(&[9.0, 1.0]), dec!(100), bounds);
        let a = amounts(&out);
        assert!(close(a[0], dec!(90)));
        assert_eq!(a[1], Decimal::ZERO);
    }

    #[test]
    fn test_bad_inputs_never_go_negative() {
        let out = allocate_across_paths(
            &keys(&[f64::NAN, -4.0, f64::INFINITY, 2.0]),
            dec!(50),
            WIDE,
        );
        let a = amounts(&out);
        assert!(a.iter().all(|x| !x.is_sign_negative()));
        assert_eq!(a.iter().sum::<Decimal>(), dec!(50));

        let negative = allocate_across_paths(&keys(&[1.0]), dec!(-10), WIDE);
        assert_eq!(amounts(&negative), vec![Decimal::ZERO]);
    }

    #[test]
    fn test_sum_never_exceeds_total() {
        let bounds = AllocationBounds {
            min: dec!(1),
            max: dec!(30),
        };
        for n in 1..12u32 {
            let scores: Vec<f64> = (0..n).map(|i| f64::from(i * i + 1)).collect();
            let out = allocate_across_paths(&keys(&scores), dec!(100), bounds);
            assert!(amounts(&out).iter().sum::<Decimal>() <= dec!(100));
            assert!(amounts(&out).iter().all(|a| *a <= dec!(30)));
        }
    }

    #[test]
    fn test_thirds_spend_exactly_the_total() {
        let out = allocate_across_paths(&keys(&[1.0, 1.0, 1.0]), dec!(100), WIDE);
        assert_eq!(amounts(&out).iter().sum::<Decimal>(), dec!(100));
    }
}
