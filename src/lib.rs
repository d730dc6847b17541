extern crate num_derive;

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod decision_tree;
pub mod error;
pub mod functions;
pub mod logging;
pub mod node;
pub mod random_forest;
pub mod sample;
pub mod service;
pub mod store;
pub mod synth;

pub use config::TrainConfig;
pub use error::{Error, Result};
pub use sample::{Label, Sample};
pub use service::{predict_adulteration, Lifecycle, Provenance, Service};
pub use store::{FsModelStore, ModelStore};
