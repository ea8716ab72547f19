//! Feature provider and dataset assembler.
//!
//! Raw index histories are merged into a [`MasterTable`], derived columns are
//! added per index, and [`assemble`] turns the table into a labelled
//! [`FeatureMatrix`] ready for [`train_test_split`].

mod assemble;
mod config;
mod features;
mod matrix;
mod split;
mod table;

use std::path::Path;

pub use assemble::*;
pub use config::*;
pub use features::*;
pub use matrix::*;
pub use split::*;
pub use table::*;

use crate::core::io::read_master_file;
use crate::error::Result;

/// Read the master file, derive features for `indices` and assemble the
/// labelled dataset described by `spec`.
pub fn load_dataset<P: AsRef<Path>>(
    master_file: P,
    indices: &[String],
    features: &FeatureConfig,
    spec: &DatasetSpec,
) -> Result<Dataset> {
    let mut table = read_master_file(master_file)?;
    derive_features(&mut table, indices, features)?;
    assemble(&table, spec)
}
