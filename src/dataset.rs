use crate::classifier::Classifier;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::ops::Range;
use rand::Rng;
use ordered_float::OrderedFloat;

/// A view over a `Builder`'s columns. Sorting and splitting only touch the
/// index, so views are cheap to create for every tree node.
#[derive(Clone, Debug)]
pub struct Dataset<'a> {
	columns: &'a [Vec<f64>],
	targets: &'a [f64],

	index: Vec<usize>,
	range: Range<usize>,
}

impl<'a, 'b> Dataset<'a> {
	/// Fraction of rows the classifier gets right.
	pub fn evaluate<C: Classifier + Sync>(&self, classifier: &C) -> f64 {
		if self.rows_len() == 0 {
			return 0.0;
		}

		self.rows()
			.zip(self.targets())
			.collect::<Vec<_>>()
			.into_par_iter()
			.filter(|(x, y)| classifier.predict(x) == *y)
			.count() as f64 / self.rows_len() as f64
	}

	pub fn sort(&mut self, column: usize) {
		let values = &self.columns[column];
		self.index[self.range.start..self.range.end]
			.sort_by_key(|&x| OrderedFloat(values[x]));
	}

	/// Candidate splits of a sorted column: the number of rows on the left
	/// and the threshold halfway between the neighbouring distinct values.
	pub fn get_splits(&'b self, column: usize) -> impl 'b + Iterator<Item = (usize, f64)> {
		let column = &self.columns[column];
		let values = self.indices().map(move |i| column[i]);

		values.clone()
			.zip(values.skip(1))
			.enumerate()
			.filter(|(_, (prev, next))| (next - prev).abs() > std::f64::EPSILON)
			.map(|(i, (prev, next))| (i + 1, (prev + next) / 2.0))
	}

	pub fn split<F, T>(&mut self, row: usize, mut f: F) -> (T, T)
	where
		F: FnMut(&mut Self) -> T,
	{
		let row = row + self.range.start;
		let original = self.range.clone();

		self.range.end = row;
		let left = f(self);
		self.range.end = original.end;

		self.range.start = row;
		let right = f(self);
		self.range.start = original.start;

		(left, right)
	}

	/// Draw `max_samples` rows with replacement.
	pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R, max_samples: usize) -> Self {
		let range = if self.rows_len() == 0 { 0..0 } else { 0..max_samples };

		let index = range
			.clone()
			.map(|_| self.index[rng.gen_range(self.range.start, self.range.end)])
			.collect::<Vec<_>>();

		Self {
			index,
			range,
			columns: self.columns,
			targets: self.targets,
		}
	}

	fn indices(&'b self) -> impl 'b + Iterator<Item = usize> + Clone {
		self.index[self.range.start..self.range.end]
			.iter()
			.copied()
	}

	pub fn targets(&'b self) -> impl 'b + Iterator<Item = f64> + Clone {
		self.indices()
			.map(move |i| self.targets[i])
	}

	pub fn column(&'b self, column: usize) -> impl 'b + Iterator<Item = f64> {
		let column = &self.columns[column];

		self.indices()
			.map(move |i| column[i])
	}

	pub fn features_len(&self) -> usize {
		self.columns.len()
	}

	pub fn rows_len(&self) -> usize {
		self.range.end - self.range.start
	}

	pub fn rows(&'b self) -> impl 'b + Iterator<Item = Vec<f64>> {
		self.indices().map(move |i| {
			self.columns
				.iter()
				.map(|column| column[i])
				.collect()
		})
	}
}

/// Owns the column-major data that `Dataset` views borrow.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Builder {
	columns: Vec<Vec<f64>>,
	targets: Vec<f64>,
}

impl Builder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn build(&self) -> Dataset<'_> {
		let range = 0..self.targets.len();

		Dataset {
			columns: &self.columns,
			targets: &self.targets,

			range: range.clone(),
			index: range.collect(),
		}
	}

	pub fn add(&mut self, x: &[f64], y: f64) {
		if self.columns.is_empty() {
			self.columns = vec![Vec::new(); x.len()];
		}

		for (column, value) in self.columns.iter_mut().zip(x) {
			column.push(*value);
		}

		self.targets.push(y);
	}
}
