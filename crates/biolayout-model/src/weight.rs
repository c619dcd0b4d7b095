use crate::score::Evalue;

/// Baseline target distance for the weakest similarity. A stronger hit
/// (more negative log10 e-value) pulls the pair proportionally closer.
pub const DEFAULT_BASE_WEIGHT: f64 = 50.0;

/// Floor keeping derived weights strictly positive, which the layout engine
/// requires. Exact-zero e-values (below BLAST's reporting range) land here.
pub const MIN_WEIGHT: f64 = 0.1;

/// Folds BLAST e-values into layout target distances:
/// `base + log10(mantissa) + exponent`, so e-value 1E0 maps to `base` and
/// every order of magnitude of significance subtracts one unit of distance.
/// Reciprocal hits are averaged in log space.
#[derive(Debug, Clone)]
pub struct WeightDeriver {
    base: f64,
}

impl Default for WeightDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_WEIGHT)
    }
}

impl WeightDeriver {
    pub fn new(base: f64) -> Self {
        Self { base }
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Weight for a pair reported in one direction only.
    pub fn single(&self, evalue: Evalue) -> f64 {
        Self::clamp(self.base + evalue.log10())
    }

    /// Weight for a pair with both directions reported.
    pub fn paired(&self, forward: Evalue, reverse: Evalue) -> f64 {
        Self::clamp(self.base + (forward.log10() + reverse.log10()) / 2.0)
    }

    fn clamp(weight: f64) -> f64 {
        weight.max(MIN_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::{MIN_WEIGHT, WeightDeriver};
    use crate::score::Evalue;

    #[test]
    fn stronger_similarity_means_smaller_weight() {
        let deriver = WeightDeriver::new(50.0);
        let weak = deriver.single(Evalue::new(1.0, -5));
        let strong = deriver.single(Evalue::new(1.0, -40));
        assert_eq!(weak, 45.0);
        assert_eq!(strong, 10.0);
        assert!(strong < weak);
    }

    #[test]
    fn reciprocal_hits_average_in_log_space() {
        let deriver = WeightDeriver::new(50.0);
        let weight = deriver.paired(Evalue::new(1.0, -10), Evalue::new(1.0, -30));
        assert_eq!(weight, 30.0);
    }

    #[test]
    fn zero_evalue_clamps_to_the_floor() {
        let deriver = WeightDeriver::default();
        let weight = deriver.single(Evalue::new(0.0, 0));
        assert_eq!(weight, MIN_WEIGHT);
    }

    #[test]
    fn overly_strong_hits_never_go_non_positive() {
        let deriver = WeightDeriver::new(50.0);
        let weight = deriver.single(Evalue::new(1.0, -200));
        assert_eq!(weight, MIN_WEIGHT);
        assert!(weight > 0.0);
    }
}
