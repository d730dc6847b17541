use std::fmt;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive as _, ToPrimitive as _};

use crate::error::{Error, Result};

pub const FEATURES_LEN: usize = 5;

/// Column names, in the order every feature row is laid out.
pub const FEATURE_NAMES: [&str; FEATURES_LEN] = [
	"Fat_Content",
	"SNF",
	"Microbial_Load",
	"Processing_Temperature",
	"pH_Level",
];

/// One milk measurement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
	pub fat_content: f64,
	pub snf: f64,
	pub microbial_load: f64,
	pub processing_temperature: f64,
	pub ph_level: f64,
}

impl Sample {
	pub fn new(fat_content: f64, snf: f64, microbial_load: f64, processing_temperature: f64, ph_level: f64) -> Self {
		Self {
			fat_content,
			snf,
			microbial_load,
			processing_temperature,
			ph_level,
		}
	}

	pub fn to_row(&self) -> [f64; FEATURES_LEN] {
		[
			self.fat_content,
			self.snf,
			self.microbial_load,
			self.processing_temperature,
			self.ph_level,
		]
	}

	/// Ground truth used to label synthetic data.
	pub fn label(&self) -> Label {
		if self.microbial_load > 300000.0 || self.ph_level < 6.6 || self.fat_content < 3.5 {
			Label::Detected
		} else {
			Label::NotDetected
		}
	}
}

impl fmt::Display for Sample {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, (name, value)) in FEATURE_NAMES.iter().zip(self.to_row().iter()).enumerate() {
			if i > 0 {
				write!(f, " ")?;
			}
			write!(f, "{}={}", name, value)?;
		}

		Ok(())
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Label {
	NotDetected = 0,
	Detected = 1,
}

impl Label {
	/// Map a class value produced by a classifier back to a label.
	pub fn from_class(value: f64) -> Result<Self> {
		if value.fract() != 0.0 {
			return Err(Error::UnknownClass { value });
		}

		Label::from_f64(value).ok_or(Error::UnknownClass { value })
	}

	pub fn class(self) -> f64 {
		self.to_f64().unwrap_or_default()
	}

	pub fn as_u8(self) -> u8 {
		self as u8
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Label::Detected => write!(f, "Adulterants Detected"),
			Label::NotDetected => write!(f, "No Adulterants Detected"),
		}
	}
}
