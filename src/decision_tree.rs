use std::io::{Read, Write};
use rand::Rng;
use rand::seq::SliceRandom as _;
use ordered_float::OrderedFloat;

use crate::dataset::Dataset;
use crate::node::{Node, Split, MAX_DEPTH};
use crate::classifier::Classifier;
use crate::functions::{self, gini, most_frequent, gini_val, Histogram};

// Sliding window of gini
// https://arxiv.org/pdf/1403.6348.pdf
struct SlidingGini {
	n: usize,
	ni: Histogram,
	g: f64,
}

impl SlidingGini {
	fn empty() -> Self {
		Self {
			n: 0,
			ni: Histogram::new(),
			g: 0.0,
		}
	}

	fn new(targets: impl Iterator<Item = f64>) -> Self {
		let (histogram, len) = functions::histogram(targets);

		Self {
			n: len,
			g: gini_val(&histogram, len),
			ni: histogram,
		}
	}

	fn inc(&mut self, typ: OrderedFloat<f64>) {
		let entry = self.ni.entry(typ).or_insert(0);
		*entry += 1;
		self.n += 1;
		self.g = 1.0 - 1.0 / (self.n as f64).powi(2) * (((self.n - 1) as f64).powi(2) * (1.0 - self.g) + 2.0 * *entry as f64 - 1.0);
	}

	// Must not drain the window: callers keep at least one row on each side.
	fn dec(&mut self, typ: OrderedFloat<f64>) {
		let entry = self.ni.entry(typ).or_insert(0);
		*entry -= 1;
		self.n -= 1;
		self.g = 1.0 - 1.0 / (self.n as f64).powi(2) * (((self.n + 1) as f64).powi(2) * (1.0 - self.g) - 2.0 * *entry as f64 - 1.0);
	}

	fn gini(&self) -> f64 {
		self.g
	}
}

struct NodeBuilder<R> {
	max_features: usize,
	max_depth: Option<usize>,
	rng: R,
}

impl<R: Rng> NodeBuilder<R> {
	fn leaf(dataset: &Dataset) -> Node {
		// Datasets reaching here always hold at least one row.
		Node::Leaf(most_frequent(dataset.targets()).unwrap_or_default())
	}

	fn build(&mut self, dataset: &mut Dataset, depth: usize) -> Node {
		if self.max_depth.map_or(false, |max| depth >= max) {
			return Self::leaf(dataset);
		}

		let impurity = gini(dataset.targets());
		if impurity <= 0.0 {
			return Self::leaf(dataset);
		}

		let mut best_split: Option<Split> = None;
		let mut best_gain = std::f64::MIN;
		let columns = (0..dataset.features_len()).collect::<Vec<usize>>();
		let max_features = std::cmp::min(columns.len(), self.max_features);
		let rows = dataset.rows_len() as f64;

		for &column in columns.choose_multiple(&mut self.rng, max_features) {
			dataset.sort(column);

			let targets = dataset.targets().collect::<Vec<_>>();
			let mut left_window = SlidingGini::empty();
			let mut right_window = SlidingGini::new(targets.iter().copied());
			let mut moved = 0;

			for (left_len, value) in dataset.get_splits(column) {
				for &cls in &targets[moved..left_len] {
					left_window.inc(OrderedFloat(cls));
					right_window.dec(OrderedFloat(cls));
				}
				moved = left_len;

				let ratio_l = left_len as f64 / rows;
				let ratio_r = 1.0 - ratio_l;

				let gain = impurity - (ratio_l * left_window.gini() + ratio_r * right_window.gini());

				if best_gain < gain {
					best_split = Some(Split { column, value });
					best_gain = gain;
				}
			}
		}

		if let Some(split) = best_split {
			self.build_children(dataset, split, depth)
		} else {
			Self::leaf(dataset)
		}
	}

	fn build_children(&mut self, dataset: &mut Dataset, split: Split, depth: usize) -> Node {
		dataset.sort(split.column);

		let split_row = dataset
			.column(split.column)
			.take_while(|&f| f <= split.value)
			.count();

		// A midpoint can round onto a neighbour; never produce an empty side.
		if split_row == 0 || split_row == dataset.rows_len() {
			return Self::leaf(dataset);
		}

		let (left, right) = dataset.split(split_row, |x| Box::new(self.build(x, depth + 1)));

		Node::Children {
			left, right, split
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
	root: Node,
}

impl DecisionTree {
	pub fn depth(&self) -> usize {
		self.root.depth()
	}
}

impl Classifier for DecisionTree {
	fn predict(&self, x: &[f64]) -> f64 {
		self.root.predict(x)
	}

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		self.root.serialize(writer)
	}

	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self> {
		let root = Node::deserialize(reader)?;

		Ok(Self {
			root
		})
	}
}

pub struct DecisionTreeBuilder {
	pub max_features: Option<usize>,
	pub max_depth: Option<usize>,
}

impl Default for DecisionTreeBuilder {
	fn default() -> Self {
		Self {
			max_features: None,
			max_depth: None,
		}
	}
}

impl DecisionTreeBuilder {
	pub fn fit<R: Rng + ?Sized>(&self, rng: &mut R, mut dataset: Dataset) -> DecisionTree {
		if dataset.rows_len() == 0 {
			return DecisionTree { root: Node::Leaf(0.0) };
		}

		let max_features = self.max_features.unwrap_or(dataset.features_len());
		let max_depth = self.max_depth.map_or(MAX_DEPTH, |d| d.min(MAX_DEPTH));
		let root = (NodeBuilder {
			max_features,
			max_depth: Some(max_depth),
			rng
		}).build(&mut dataset, 1);

		DecisionTree { root }
	}
}
