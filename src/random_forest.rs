use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, trace};

use crate::dataset::Dataset;
use crate::classifier::Classifier;
use crate::decision_tree::{DecisionTreeBuilder, DecisionTree};
use crate::functions::most_frequent;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestBuilder {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub bag_amount: f64,
    pub seed: u64,
}

impl Default for RandomForestBuilder {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            bag_amount: 1.0,
            seed: 42,
        }
    }
}

impl RandomForestBuilder {
    pub fn fit(&self, dataset: Dataset) -> RandomForestClassifier {
        let feature_len = (dataset.features_len() as f64).sqrt().ceil() as usize;
        let done = AtomicUsize::new(0);
        let whole = Instant::now();

        // Rngs are drawn up front so the forest does not depend on rayon's scheduling.
        let forest = self.get_rngs()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|mut rng| {
                let now = Instant::now();
                let tree = self.fit_tree(&mut rng, &dataset, feature_len);
                let i = done.fetch_add(1, Ordering::Relaxed) + 1;

                trace!(
                    tree = i,
                    trees = self.n_trees,
                    depth = tree.depth(),
                    elapsed_ms = now.elapsed().as_millis() as u64,
                    "fitted tree"
                );

                tree
            })
            .collect::<Vec<_>>();

        debug!(
            trees = forest.len(),
            rows = dataset.rows_len(),
            max_features = feature_len,
            elapsed_ms = whole.elapsed().as_millis() as u64,
            "fitted random forest"
        );

        RandomForestClassifier {
            forest
        }
    }

    fn fit_tree<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset, feature_len: usize) -> DecisionTree {
        let builder = DecisionTreeBuilder {
            max_features: Some(feature_len),
            max_depth: self.max_depth,
        };

        let max_samples = (dataset.rows_len() as f64 * self.bag_amount) as usize;
        let bootstrapped = dataset.bootstrap(rng, max_samples);

        builder.fit(rng, bootstrapped)
    }

    fn get_rngs(&self) -> impl Iterator<Item = StdRng> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.n_trees).map(move |_| {
            let mut seed = [0u8; 32];
            rng.fill(&mut seed);
            StdRng::from_seed(seed)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestClassifier {
    forest: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.forest
    }
}

impl Classifier for RandomForestClassifier {
    fn predict(&self, x: &[f64]) -> f64 {
        most_frequent(self.forest.iter().map(|v| v.predict(x))).unwrap_or_default()
    }

    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        if self.forest.len() > u16::MAX as usize {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("forest of {} trees does not fit the u16 tree count", self.forest.len()),
            ));
        }

        writer.write_u16::<BigEndian>(self.forest.len() as u16)?;

        for tree in &self.forest {
            tree.serialize(writer)?;
        }

        Ok(())
    }

    fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let len = reader.read_u16::<BigEndian>()?;

        let forest = (0..len)
            .map(|_| DecisionTree::deserialize(reader))
            .collect::<std::io::Result<Vec<DecisionTree>>>()?;

        Ok(Self {
            forest
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth;

    fn builder(n_trees: usize, seed: u64) -> RandomForestBuilder {
        RandomForestBuilder {
            n_trees,
            seed,
            ..RandomForestBuilder::default()
        }
    }

    #[test]
    fn same_seed_same_forest() {
        let data = synth::training_set(11, 300);

        let a = builder(15, 11).fit(data.build());
        let b = builder(15, 11).fit(data.build());

        assert_eq!(a.trees().len(), 15);
        assert_eq!(a, b);
    }

    #[test]
    fn generalizes_to_held_out_samples() {
        let train = synth::training_set(42, 1000);
        let test = synth::training_set(7, 500);

        let forest = builder(30, 42).fit(train.build());

        assert!(test.build().evaluate(&forest) > 0.9);
    }

    #[test]
    fn serialization_works() -> std::io::Result<()> {
        let train = synth::training_set(3, 300);
        let forest = builder(10, 3).fit(train.build());

        let mut bytes = Vec::new();
        forest.serialize(&mut bytes)?;
        assert_eq!(&bytes[0..2], &10u16.to_be_bytes());

        let restored = RandomForestClassifier::deserialize(&mut bytes.as_slice())?;
        assert_eq!(restored, forest);

        for sample in synth::synthesize(4, 100) {
            let row = sample.to_row();
            assert_eq!(restored.predict(&row), forest.predict(&row));
        }

        Ok(())
    }

    #[test]
    fn truncated_forest_is_rejected() {
        let train = synth::training_set(5, 100);
        let forest = builder(3, 5).fit(train.build());

        let mut bytes = Vec::new();
        forest.serialize(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);

        assert!(RandomForestClassifier::deserialize(&mut bytes.as_slice()).is_err());
    }
}
