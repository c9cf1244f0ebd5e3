//! Weighted random selection of daily prompts.
//!
//! An item's chance is its weight over the total weight of the pool. Multi
//! selection draws without replacement, so weights renormalise over what is
//! left after each pick.

use log::debug;
use rand::Rng;

/// A candidate with an optional relative weight. Absent means 1. Negative
/// weights are rejected where prompts are stored; the draw assumes none.
pub trait Weighted {
    fn weight(&self) -> Option<f64>;

    fn effective_weight(&self) -> f64 {
        self.weight().unwrap_or(1.0)
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> Option<f64> {
        (**self).weight()
    }
}

/// Index of one weighted pick, `None` only for an empty pool.
///
/// Walks the pool subtracting weights from `r ∈ [0, total)` and stops at the
/// first item that takes `r` to zero or below. If nothing does (all weights
/// zero, or rounding), the first item wins. A draw of exactly `r == 0.0`
/// lands on the first item even when its weight is zero.
fn pick_index<T: Weighted, R: Rng + ?Sized>(pool: &[T], rng: &mut R) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let total: f64 = pool.iter().map(Weighted::effective_weight).sum();
    let mut remaining = rng.r#gen::<f64>() * total;
    for (idx, item) in pool.iter().enumerate() {
        remaining -= item.effective_weight();
        if remaining <= 0.0 {
            return Some(idx);
        }
    }
    debug!(
        "Weighted pick fell through (total weight {}), using first candidate",
        total
    );
    Some(0)
}

pub fn select_weighted<'a, T, R>(candidates: &'a [T], rng: &mut R) -> Option<&'a T>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    pick_index(candidates, rng).map(|idx| &candidates[idx])
}

/// Up to `count` distinct candidates in the order they were drawn. Asking for
/// at least as many as there are gives a weighted shuffle of the whole pool.
pub fn select_weighted_multiple<'a, T, R>(candidates: &'a [T], count: usize, rng: &mut R) -> Vec<&'a T>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let mut pool: Vec<&T> = candidates.iter().collect();
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count {
        let Some(idx) = pick_index(&pool, rng) else {
            break;
        };
        picked.push(pool.remove(idx));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[derive(Debug, PartialEq)]
    struct Candidate {
        id: &'static str,
        weight: Option<f64>,
    }

    impl Weighted for Candidate {
        fn weight(&self) -> Option<f64> {
            self.weight
        }
    }

    fn c(id: &'static str, weight: Option<f64>) -> Candidate {
        Candidate { id, weight }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let pool: Vec<Candidate> = Vec::new();
        assert!(select_weighted(&pool, &mut rng()).is_none());
        assert!(select_weighted_multiple(&pool, 3, &mut rng()).is_empty());
    }

    #[test]
    fn weights_pass_through_unchanged() {
        assert_eq!(c("neg", Some(-5.0)).effective_weight(), -5.0);
        assert_eq!(c("half", Some(0.5)).effective_weight(), 0.5);
        assert_eq!(c("unset", None).effective_weight(), 1.0);
    }

    #[test]
    fn all_zero_weights_fall_back_to_first() {
        let pool = [c("a", Some(0.0)), c("b", Some(0.0))];
        let mut rng = rng();
        for _ in 0..100 {
            assert_eq!(select_weighted(&pool, &mut rng).unwrap().id, "a");
        }
    }

    #[test]
    fn zero_weight_item_is_never_drawn_when_others_have_weight() {
        let pool = [c("zero", Some(0.0)), c("one", None)];
        let mut rng = rng();
        for _ in 0..1_000 {
            assert_eq!(select_weighted(&pool, &mut rng).unwrap().id, "one");
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let pool = [c("a", Some(1.0)), c("b", Some(3.0))];
        let mut rng = rng();
        let trials = 10_000;
        let b_hits = (0..trials)
            .filter(|_| select_weighted(&pool, &mut rng).unwrap().id == "b")
            .count();

        let expected = trials as f64 * 0.75;
        let tolerance = expected * 0.05;
        assert!(
            (b_hits as f64 - expected).abs() <= tolerance,
            "b drawn {} times, expected about {}",
            b_hits,
            expected
        );
    }

    #[test]
    fn missing_weight_counts_as_one() {
        let pool = [c("a", None), c("b", Some(1.0))];
        let mut rng = rng();
        let a_hits = (0..10_000)
            .filter(|_| select_weighted(&pool, &mut rng).unwrap().id == "a")
            .count();
        assert!((4_500..=5_500).contains(&a_hits), "a drawn {} times", a_hits);
    }

    #[test]
    fn multiple_returns_distinct_items() {
        let pool = [
            c("a", Some(5.0)),
            c("b", Some(1.0)),
            c("c", None),
            c("d", Some(0.5)),
            c("e", Some(2.0)),
        ];
        let mut rng = rng();
        for count in 0..8 {
            let picked = select_weighted_multiple(&pool, count, &mut rng);
            assert_eq!(picked.len(), count.min(pool.len()));
            let ids: HashSet<_> = picked.iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), picked.len());
        }
    }

    #[test]
    fn multiple_exhausts_zero_weight_pool_without_repeats() {
        let pool = [c("a", Some(0.0)), c("b", Some(0.0)), c("c", Some(0.0))];
        let picked = select_weighted_multiple(&pool, 10, &mut rng());
        let ids: Vec<_> = picked.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn heavy_item_usually_leads_the_shuffle() {
        let pool = [c("light", Some(1.0)), c("heavy", Some(99.0))];
        let mut rng = rng();
        let heavy_first = (0..1_000)
            .filter(|_| select_weighted_multiple(&pool, 2, &mut rng)[0].id == "heavy")
            .count();
        assert!(heavy_first > 950, "heavy first {} times", heavy_first);
    }
}
