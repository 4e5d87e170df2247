use crate::error::{GeneratorError, Result};
use rand::Rng;

/// Weighted random choice over a fixed, ordered set of items
///
/// Each item is selected with probability proportional to its weight.
/// Cumulative weights are computed once at construction so a draw is a
/// single uniform sample plus a binary search.
///
/// # Example
///
/// ```
/// use dicomgen_core::WeightedSampler;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let sampler = WeightedSampler::new(vec![("CT", 3), ("MR", 1)]).unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let picked = sampler.pick(&mut rng).unwrap();
/// assert!(*picked == "CT" || *picked == "MR");
/// ```
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    items: Vec<T>,
    weights: Vec<u64>,
    cumulative: Vec<u64>,
}

impl<T> WeightedSampler<T> {
    /// Builds a sampler from `(item, weight)` pairs
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the total weight overflows.
    pub fn new(entries: impl IntoIterator<Item = (T, u64)>) -> Result<Self> {
        let mut items = Vec::new();
        let mut weights = Vec::new();
        let mut cumulative = Vec::new();
        let mut running: u64 = 0;

        for (item, weight) in entries {
            running = running
                .checked_add(weight)
                .ok_or_else(|| GeneratorError::config("total sampler weight overflows u64"))?;
            items.push(item);
            weights.push(weight);
            cumulative.push(running);
        }

        Ok(Self {
            items,
            weights,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn weight(&self, index: usize) -> Option<u64> {
        self.weights.get(index).copied()
    }

    /// Picks an item over the full set
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the total weight is zero.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&T> {
        self.pick_index(rng).map(|i| &self.items[i])
    }

    /// Picks the index of an item over the full set
    pub fn pick_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let total = self.total_weight();
        if total == 0 {
            return Err(GeneratorError::config(
                "cannot pick from a sampler whose total weight is zero",
            ));
        }

        let draw = rng.gen_range(0..total);
        // first cumulative bound strictly greater than the draw
        Ok(self.cumulative.partition_point(|&bound| bound <= draw))
    }

    /// Picks an item restricted to `subset` (indices into the item list)
    ///
    /// Relative weights among the subset are preserved; items outside it
    /// are never returned.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an index is out of range or the
    /// subset's total weight is zero.
    pub fn pick_from<R: Rng + ?Sized>(&self, rng: &mut R, subset: &[usize]) -> Result<&T> {
        self.pick_index_from(rng, subset).map(|i| &self.items[i])
    }

    /// Picks an index restricted to `subset`
    pub fn pick_index_from<R: Rng + ?Sized>(&self, rng: &mut R, subset: &[usize]) -> Result<usize> {
        let mut total: u64 = 0;
        for &index in subset {
            let weight = self.weight(index).ok_or_else(|| {
                GeneratorError::config(format!(
                    "sampler index {} out of range (size {})",
                    index,
                    self.len()
                ))
            })?;
            total = total.checked_add(weight).ok_or_else(|| {
                GeneratorError::config(format!(
                    "total weight of subset {:?} overflows u64",
                    subset
                ))
            })?;
        }

        if total == 0 {
            return Err(GeneratorError::config(format!(
                "cannot pick from subset {:?}: total weight is zero",
                subset
            )));
        }

        let mut draw = rng.gen_range(0..total);
        for &index in subset {
            let weight = self.weights[index];
            if draw < weight {
                return Ok(index);
            }
            draw -= weight;
        }

        Err(GeneratorError::config("weighted draw fell outside the subset"))
    }
}
