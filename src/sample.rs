//! Uniform reservoir sampling.

use rand::Rng;

/// Keeps a uniform random sample of at most `capacity` items from a stream
/// of unknown length (Algorithm R).
#[derive(Debug, Clone)]
pub struct ReservoirSampler<T, R> {
    capacity: usize,
    seen: usize,
    reservoir: Vec<T>,
    rng: R,
}

impl<T> ReservoirSampler<T, rand::rngs::ThreadRng> {
    /// Sample `capacity` items from `items` using the thread-local RNG
    pub fn sample<I: IntoIterator<Item = T>>(capacity: usize, items: I) -> Vec<T> {
        let mut sampler = Self::new(capacity, rand::thread_rng());
        sampler.extend(items);
        sampler.into_sample()
    }
}

impl<T, R: Rng> ReservoirSampler<T, R> {
    pub fn new(capacity: usize, rng: R) -> Self {
        Self {
            capacity,
            seen: 0,
            reservoir: Vec::with_capacity(capacity),
            rng,
        }
    }

    /// Offer one item to the sample
    pub fn add(&mut self, item: T) {
        self.seen += 1;
        if self.reservoir.len() < self.capacity {
            self.reservoir.push(item);
            return;
        }
        let slot = self.rng.gen_range(0..self.seen);
        if slot < self.capacity {
            self.reservoir[slot] = item;
        }
    }

    /// Number of items offered so far
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn sample_so_far(&self) -> &[T] {
        &self.reservoir
    }

    pub fn into_sample(self) -> Vec<T> {
        self.reservoir
    }
}

impl<T, R: Rng> Extend<T> for ReservoirSampler<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_short_stream_is_kept_whole() {
        let sample = ReservoirSampler::sample(7, 0..5);
        assert_eq!(sample, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sample_has_capacity_distinct_items() {
        let mut sampler = ReservoirSampler::new(7, ChaCha8Rng::seed_from_u64(7));
        sampler.extend(0..100);
        assert_eq!(sampler.seen(), 100);

        let mut sample = sampler.into_sample();
        assert_eq!(sample.len(), 7);
        sample.sort_unstable();
        sample.dedup();
        assert_eq!(sample.len(), 7);
        assert!(sample.iter().all(|x| (0..100).contains(x)));
    }

    #[test]
    fn test_zero_capacity() {
        let mut sampler = ReservoirSampler::new(0, ChaCha8Rng::seed_from_u64(1));
        sampler.extend(0..10);
        assert!(sampler.sample_so_far().is_empty());
    }

    #[test]
    fn test_selection_is_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(2017);
        let mut counts = [0usize; 100];
        let rounds = 2000;
        for _ in 0..rounds {
            let mut sampler = ReservoirSampler::new(7, &mut rng);
            sampler.extend(0..100);
            for item in sampler.into_sample() {
                counts[item] += 1;
            }
        }

        // expected 140 hits per item; chi-square with 99 degrees of freedom
        let expected = (rounds * 7) as f64 / 100.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum();
        assert!(chi_square < 150.0, "chi-square {} too large", chi_square);
    }
}
