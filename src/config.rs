use crate::random_forest::RandomForestBuilder;

pub const DEFAULT_MODEL_FILE: &str = "random_forest_model.bin";

/// Parameters for synthesizing the training set and fitting the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
	pub seed: u64,
	pub n_samples: usize,
	pub n_trees: usize,
	pub max_depth: Option<usize>,
	pub bag_amount: f64,
}

impl Default for TrainConfig {
	fn default() -> Self {
		Self {
			seed: 42,
			n_samples: 1000,
			n_trees: 100,
			max_depth: None,
			bag_amount: 1.0,
		}
	}
}

impl TrainConfig {
	pub fn forest(&self) -> RandomForestBuilder {
		RandomForestBuilder {
			n_trees: self.n_trees,
			max_depth: self.max_depth,
			bag_amount: self.bag_amount,
			seed: self.seed,
		}
	}
}
