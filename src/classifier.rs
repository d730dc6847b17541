use std::io::{Read, Write};

use crate::error::Result;
use crate::sample::{Label, Sample};

pub trait Classifier: Sized {
	fn predict(&self, x: &[f64]) -> f64;

	fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
	fn deserialize<R: Read>(reader: &mut R) -> std::io::Result<Self>;

	fn predict_sample(&self, sample: &Sample) -> Result<Label> {
		Label::from_class(self.predict(&sample.to_row()))
	}
}
