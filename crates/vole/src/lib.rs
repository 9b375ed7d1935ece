//! # vole
//!
//! Facade over the Vole workspace: datasets and loaders from `vole-data`,
//! network math from `vole-nn`, plus the training loop, evaluation, and
//! checkpointing that tie them together.
//!
//! ```no_run
//! use vole::prelude::*;
//!
//! fn main() -> vole::Result<()> {
//!     let train = ImageFolderDataset::builder("data/train")
//!         .transform(Normalize::new(0.0, 0.5))
//!         .build()?;
//!     let mut loader = DataLoader::new(&train, DataLoaderConfig::new().batch_size(4))?;
//!
//!     let model = Mlp::new(&[784, 400, 120, 84, 10])?;
//!     let mut learner = Classifier::new(model, Sgd::new(0.01));
//!     let report = Trainer::new(TrainerConfig::new().epochs(4)).fit(&mut learner, &mut loader)?;
//!     println!("{report}");
//!
//!     checkpoint::save_state("model.vole", &learner.model().state_dict())?;
//!     Ok(())
//! }
//! ```

pub mod checkpoint;
pub mod eval;
pub mod learner;
pub mod trainer;

pub use vole_core::{Error, Param, Result, StateDict};
pub use vole_data::{
    extract_zip, Batch, Compose, CsvImageDataset, DataLoader, DataLoaderConfig, Dataset,
    ImageFolderDataset, MemoryDataset, Normalize, Sample, Transform,
};
pub use vole_nn::{accuracy, argmax_classes, softmax_cross_entropy, Mlp, Optimizer, Sgd};

pub use eval::{evaluate, predict, Evaluation};
pub use learner::{batch_matrix, Classifier, Learner};
pub use trainer::{EpochLog, TrainReport, Trainer, TrainerConfig};

/// Single-import convenience for the common path.
pub mod prelude {
    pub use crate::checkpoint;
    pub use crate::eval::{evaluate, predict, Evaluation};
    pub use crate::learner::{Classifier, Learner};
    pub use crate::trainer::{TrainReport, Trainer, TrainerConfig};
    pub use vole_core::{Error, Result};
    pub use vole_data::{
        Batch, Compose, CsvImageDataset, DataLoader, DataLoaderConfig, Dataset,
        ImageFolderDataset, MemoryDataset, Normalize, Sample, Transform,
    };
    pub use vole_nn::{Mlp, Optimizer, Sgd};
}
