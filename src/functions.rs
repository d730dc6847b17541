use std::collections::BTreeMap;
use ordered_float::OrderedFloat;

// Ordered so that sums and ties come out the same on every run.
pub type Histogram = BTreeMap<OrderedFloat<f64>, usize>;

pub fn histogram(values: impl Iterator<Item = f64>) -> (Histogram, usize) {
	let mut histogram = Histogram::new();
	let mut len = 0;

	for value in values {
		*histogram.entry(OrderedFloat(value)).or_default() += 1;
		len += 1;
	}

	(histogram, len)
}

pub fn gini_val(histogram: &Histogram, len: usize) -> f64 {
	if len == 0 {
		return 0.0;
	}

	1.0 - histogram
		.values()
		.map(|&n| (n as f64 / len as f64).powi(2))
		.sum::<f64>()
}

pub fn gini(values: impl Iterator<Item = f64>) -> f64 {
	let (histogram, len) = histogram(values);
	gini_val(&histogram, len)
}

/// Majority value; ties go to the largest value. `None` when empty.
pub fn most_frequent(values: impl Iterator<Item = f64>) -> Option<f64> {
	let (histogram, _) = histogram(values);

	histogram
		.into_iter()
		.max_by_key(|&(_, n)| n)
		.map(|(k, _)| k.into_inner())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gini_of_pure_and_mixed() {
		assert_eq!(gini([1.0, 1.0, 1.0].iter().copied()), 0.0);
		assert!((gini([0.0, 1.0].iter().copied()) - 0.5).abs() < 1e-12);
		assert!((gini([0.0, 0.0, 0.0, 1.0].iter().copied()) - 0.375).abs() < 1e-12);
		assert_eq!(gini(std::iter::empty()), 0.0);
	}

	#[test]
	fn majority_vote() {
		assert_eq!(most_frequent([0.0, 1.0, 1.0].iter().copied()), Some(1.0));
		assert_eq!(most_frequent([0.0, 0.0, 1.0].iter().copied()), Some(0.0));
		assert_eq!(most_frequent([0.0, 1.0].iter().copied()), Some(1.0));
		assert_eq!(most_frequent(std::iter::empty()), None);
	}
}
