//! Synthetic training data.
//!
//! Every feature is drawn independently from a fixed uniform range and the
//! row is labeled with [`Sample::label`].

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dataset;
use crate::sample::{Sample, FEATURES_LEN};

/// Half-open `[low, high)` sampling ranges, in feature order.
pub const RANGES: [(f64, f64); FEATURES_LEN] = [
	(3.0, 5.5),
	(8.0, 9.5),
	(1000.0, 500000.0),
	(70.0, 95.0),
	(6.5, 6.9),
];

/// Draw `n_samples` rows. Columns are filled one feature at a time, so the
/// same seed always yields the same table.
pub fn synthesize(seed: u64, n_samples: usize) -> Vec<Sample> {
	let mut rng = StdRng::seed_from_u64(seed);

	let columns = RANGES
		.iter()
		.map(|&(low, high)| {
			Uniform::new(low, high)
				.sample_iter(&mut rng)
				.take(n_samples)
				.collect::<Vec<f64>>()
		})
		.collect::<Vec<_>>();

	(0..n_samples)
		.map(|i| Sample::new(columns[0][i], columns[1][i], columns[2][i], columns[3][i], columns[4][i]))
		.collect()
}

pub fn to_dataset(samples: &[Sample]) -> dataset::Builder {
	let mut builder = dataset::Builder::new();

	for sample in samples {
		builder.add(&sample.to_row(), sample.label().class());
	}

	builder
}

pub fn training_set(seed: u64, n_samples: usize) -> dataset::Builder {
	to_dataset(&synthesize(seed, n_samples))
}
