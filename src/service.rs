//! The adulteration classifier: train on synthetic data, persist, predict.
//!
//! A store is either empty ([`Lifecycle::Untrained`]) or holds an artifact
//! ([`Lifecycle::TrainedAndPersisted`]). [`Service::ensure_trained`] is the
//! only transition. Two callers racing on an empty store both train and both
//! write; the last write wins and both fits are identical for a given config.

use std::time::Instant;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::config::TrainConfig;
use crate::error::Result;
use crate::random_forest::RandomForestClassifier;
use crate::sample::{Label, Sample};
use crate::store::{FsModelStore, ModelStore};
use crate::synth;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifecycle {
	Untrained,
	TrainedAndPersisted,
}

/// Where the model returned by [`Service::ensure_trained`] came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Provenance {
	Loaded,
	Trained,
}

/// Synthesize the training set and fit a forest. Nothing is persisted.
pub fn fit(config: &TrainConfig) -> RandomForestClassifier {
	let start = Instant::now();
	let data = synth::training_set(config.seed, config.n_samples);
	let dataset = data.build();

	info!(
		samples = dataset.rows_len(),
		trees = config.n_trees,
		seed = config.seed,
		"fitting random forest classifier"
	);
	let model = config.forest().fit(dataset.clone());

	debug!(
		in_sample_rate = dataset.evaluate(&model),
		elapsed_ms = start.elapsed().as_millis() as u64,
		"fitted"
	);

	model
}

pub struct Service<S> {
	store: S,
	config: TrainConfig,
}

impl<S: ModelStore> Service<S> {
	pub fn new(store: S, config: TrainConfig) -> Self {
		Self { store, config }
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	pub fn status(&self) -> Lifecycle {
		if self.store.exists() {
			Lifecycle::TrainedAndPersisted
		} else {
			Lifecycle::Untrained
		}
	}

	/// Fit a new model and persist it, overwriting any stored artifact.
	pub fn train(&self) -> Result<RandomForestClassifier> {
		let model = fit(&self.config);
		self.store.save(&model)?;

		Ok(model)
	}

	/// Load the stored model, training and persisting one first if the store
	/// is empty. A stored artifact that fails to decode is an error; it is
	/// never replaced.
	pub fn ensure_trained(&self) -> Result<(RandomForestClassifier, Provenance)> {
		match self.status() {
			Lifecycle::TrainedAndPersisted => {
				let model = self.store.load::<RandomForestClassifier>()?;
				Ok((model, Provenance::Loaded))
			},
			Lifecycle::Untrained => {
				info!(location = %self.store.location(), "no stored model, training");
				let model = self.train()?;
				Ok((model, Provenance::Trained))
			},
		}
	}

	/// No range checks: out-of-distribution values go straight to the forest.
	pub fn predict(&self, sample: &Sample) -> Result<Label> {
		let (model, _) = self.ensure_trained()?;
		let label = model.predict_sample(sample)?;

		debug!(%sample, %label, "prediction");
		Ok(label)
	}
}

impl Default for Service<FsModelStore> {
	fn default() -> Self {
		Self::new(FsModelStore::default(), TrainConfig::default())
	}
}

/// Classify one sample with the model stored in the working directory.
/// Returns 1 when adulterants are detected and 0 otherwise.
pub fn predict_adulteration(fat: f64, snf: f64, microbial_load: f64, temp: f64, ph: f64) -> Result<u8> {
	let sample = Sample::new(fat, snf, microbial_load, temp, ph);
	Service::default()
		.predict(&sample)
		.map(Label::as_u8)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::store::memory::MemoryModelStore;

	fn quick() -> TrainConfig {
		TrainConfig {
			n_samples: 400,
			n_trees: 15,
			..TrainConfig::default()
		}
	}

	#[test]
	fn first_call_trains_then_loads() -> Result<()> {
		let service = Service::new(MemoryModelStore::new(), quick());
		assert_eq!(service.status(), Lifecycle::Untrained);

		let (trained, provenance) = service.ensure_trained()?;
		assert_eq!(provenance, Provenance::Trained);
		assert_eq!(service.status(), Lifecycle::TrainedAndPersisted);
		assert_eq!(service.store().saves(), 1);

		let (loaded, provenance) = service.ensure_trained()?;
		assert_eq!(provenance, Provenance::Loaded);
		assert_eq!(loaded, trained);
		assert_eq!(service.store().saves(), 1);

		Ok(())
	}

	#[test]
	fn train_overwrites() -> Result<()> {
		let service = Service::new(MemoryModelStore::new(), quick());
		service.train()?;
		let first = service.store().bytes();
		service.train()?;

		assert_eq!(service.store().saves(), 2);
		assert_eq!(service.store().bytes(), first);

		Ok(())
	}

	#[test]
	fn same_config_same_predictions() {
		let a = fit(&quick());
		let b = fit(&quick());

		for sample in synth::synthesize(1234, 200) {
			assert_eq!(a.predict(&sample.to_row()), b.predict(&sample.to_row()));
		}
	}

	#[test]
	fn clear_cases() -> Result<()> {
		let service = Service::new(MemoryModelStore::new(), quick());

		let clean = Sample::new(4.2, 8.8, 15000.0, 78.5, 6.7);
		assert_eq!(service.predict(&clean)?, Label::NotDetected);
		assert_eq!(service.predict(&clean)?, Label::NotDetected);

		let contaminated = Sample::new(4.2, 8.8, 450000.0, 78.5, 6.7);
		assert_eq!(service.predict(&contaminated)?, Label::Detected);

		let acidic = Sample::new(4.5, 9.0, 20000.0, 80.0, 6.52);
		assert_eq!(service.predict(&acidic)?, Label::Detected);

		assert_eq!(service.store().saves(), 1);

		Ok(())
	}

	#[test]
	fn out_of_range_inputs_are_not_rejected() -> Result<()> {
		let service = Service::new(MemoryModelStore::new(), quick());
		service.predict(&Sample::new(-1.0, 100.0, 1e9, -40.0, 14.0))?;

		Ok(())
	}

	#[test]
	fn corrupt_artifact_is_an_error() {
		let service = Service::new(MemoryModelStore::with_bytes(vec![0, 1, 0]), quick());
		assert_eq!(service.status(), Lifecycle::TrainedAndPersisted);

		assert!(matches!(service.ensure_trained(), Err(Error::Load { .. })));
		assert!(matches!(service.predict(&Sample::new(4.2, 8.8, 15000.0, 78.5, 6.7)), Err(Error::Load { .. })));
		assert_eq!(service.store().saves(), 0);
	}
}
