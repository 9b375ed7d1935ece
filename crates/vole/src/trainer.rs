// Trainer — epoch orchestration over a Learner and a DataLoader

use std::fmt;

use vole_core::Result;
use vole_data::DataLoader;

use crate::learner::Learner;

/// Training-run configuration with builder-style setters.
#[derive(Debug, Clone, Copy)]
pub struct TrainerConfig {
    /// Full passes over the training data.
    pub epochs: usize,
    /// Emit a progress log line every this many steps.
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 4,
            log_every: 500,
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epochs(mut self, n: usize) -> Self {
        self.epochs = n;
        self
    }

    pub fn log_every(mut self, n: usize) -> Self {
        self.log_every = n;
        self
    }
}

/// Summary of one epoch.
#[derive(Debug, Clone)]
pub struct EpochLog {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Batches consumed.
    pub batches: usize,
    /// Sum of per-step losses over the epoch.
    pub loss: f64,
}

/// Summary of a whole training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub epochs: Vec<EpochLog>,
    /// Loss sum of the last epoch.
    pub final_loss: f64,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.epochs {
            writeln!(
                f,
                "epoch {:>3}: loss {:.4} over {} batches",
                e.epoch, e.loss, e.batches
            )?;
        }
        write!(f, "final loss {:.4}", self.final_loss)
    }
}

/// Runs the epoch loop: for each epoch, draws a fresh pass from the
/// loader and feeds every batch to the learner.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Train for the configured number of epochs.
    ///
    /// Epoch loss is the sum of the per-step losses, so it reflects both
    /// the per-batch loss level and how many batches the epoch saw. The
    /// first failing step aborts the run with its error.
    pub fn fit<L: Learner>(
        &self,
        learner: &mut L,
        loader: &mut DataLoader,
    ) -> Result<TrainReport> {
        let total_batches = loader.num_batches();
        let mut epochs = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            let mut loss_sum = 0.0f64;
            let mut batches = 0usize;
            for batch in loader.epoch() {
                let batch = batch?;
                let loss = learner.train_step(&batch)?;
                loss_sum += loss;
                batches += 1;
                if self.config.log_every > 0 && batches % self.config.log_every == 0 {
                    log::info!(
                        "epoch {}/{} step {}/{} loss {:.4}",
                        epoch,
                        self.config.epochs,
                        batches,
                        total_batches,
                        loss
                    );
                }
            }
            log::info!(
                "epoch {}/{} done: loss {:.4} over {} batches",
                epoch,
                self.config.epochs,
                loss_sum,
                batches
            );
            epochs.push(EpochLog {
                epoch,
                batches,
                loss: loss_sum,
            });
        }

        let final_loss = epochs.last().map(|e| e.loss).unwrap_or(0.0);
        Ok(TrainReport {
            epochs,
            final_loss,
        })
    }
}
