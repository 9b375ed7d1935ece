//! # vole-data
//!
//! Data pipeline for the Vole workspace:
//! - [`Dataset`] — indexed access to labeled samples
//! - [`ImageFolderDataset`] — one subdirectory per class
//! - [`CsvImageDataset`] — labels from a CSV manifest
//! - [`Transform`] / [`Normalize`] / [`Compose`] — per-sample preprocessing
//! - [`DataLoader`] — shuffled, batched, optionally parallel iteration
//! - [`extract_zip`] — unpacking dataset archives

pub mod archive;
pub mod csv_dataset;
mod decode;
pub mod dataset;
pub mod image_folder;
pub mod loader;
pub mod transform;

pub use archive::extract_zip;
pub use csv_dataset::CsvImageDataset;
pub use dataset::{Dataset, MemoryDataset, Sample};
pub use image_folder::ImageFolderDataset;
pub use loader::{Batch, DataLoader, DataLoaderConfig, EpochIter};
pub use transform::{Compose, Normalize, Transform};
