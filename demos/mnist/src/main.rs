// MNIST-style training demo.
//
// Expects the data directory to contain `train/` and `test/` image
// folders, one subdirectory per digit class. Pass `--archive` to unpack
// a zip into the data directory first. Optionally runs a second pass
// over a CSV-manifest dataset with `--labels-csv`/`--img-dir`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use vole::checkpoint;
use vole::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "mnist-demo", about = "Train an MLP digit classifier")]
struct Args {
    /// Zip archive to unpack into the data directory before training
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Directory containing train/ and test/ image folders
    #[arg(long, default_value = "data/MNIST_Data")]
    data_dir: PathBuf,

    /// Training epochs
    #[arg(long, default_value_t = 4)]
    epochs: usize,

    /// Samples per batch
    #[arg(long, default_value_t = 4)]
    batch_size: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 0.01)]
    lr: f32,

    /// Seed for shuffling and weight initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Write the trained weights here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load weights instead of training from scratch
    #[arg(long)]
    load: Option<PathBuf>,

    /// Progress log interval in steps
    #[arg(long, default_value_t = 500)]
    log_every: usize,

    /// CSV manifest for an extra labeled pass after evaluation
    #[arg(long)]
    labels_csv: Option<PathBuf>,

    /// Image directory the CSV filenames are relative to
    #[arg(long)]
    img_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(archive) = &args.archive {
        let n = vole::extract_zip(archive, &args.data_dir)?;
        log::info!("unpacked {} files from {:?}", n, archive);
    }

    let train = ImageFolderDataset::builder(args.data_dir.join("train"))
        .image_size(28, 28)
        .transform(Normalize::new(0.0, 0.5))
        .build()?;
    let test = ImageFolderDataset::builder(args.data_dir.join("test"))
        .image_size(28, 28)
        .transform(Normalize::new(0.0, 0.5))
        .build()?;
    log::info!(
        "train: {} samples, test: {} samples, {} classes",
        train.len(),
        test.len(),
        train.num_classes()
    );

    let sizes = [784, 400, 120, 84, train.num_classes()];
    let mut model = match args.seed {
        Some(seed) => Mlp::seeded(&sizes, seed)?,
        None => Mlp::new(&sizes)?,
    };
    log::info!("model: {:?}, {} parameters", sizes, model.num_parameters());

    if let Some(path) = &args.load {
        model.load_state_dict(&checkpoint::load_state(path)?)?;
        log::info!("loaded weights from {:?}", path);
    } else {
        let mut loader_cfg = DataLoaderConfig::new().batch_size(args.batch_size);
        if let Some(seed) = args.seed {
            loader_cfg = loader_cfg.seed(seed);
        }
        let mut loader = DataLoader::new(&train, loader_cfg)?;

        let mut learner = Classifier::new(model, Sgd::new(args.lr));
        let report = Trainer::new(
            TrainerConfig::new()
                .epochs(args.epochs)
                .log_every(args.log_every),
        )
        .fit(&mut learner, &mut loader)?;

        print_loss_chart(&report);
        model = learner.into_model();
    }

    if let Some(path) = &args.save {
        checkpoint::save_state(path, &model.state_dict())?;
        let mut reloaded = Mlp::seeded(&sizes, 0)?;
        reloaded.load_state_dict(&checkpoint::load_state(path)?)?;
        if reloaded.state_dict() != model.state_dict() {
            return Err(Error::msg("checkpoint verification failed"));
        }
        log::info!("saved weights to {:?}", path);
    }

    let mut test_loader = DataLoader::new(
        &test,
        DataLoaderConfig::new()
            .batch_size(args.batch_size)
            .shuffle(false),
    )?;
    let eval = evaluate(&model, &mut test_loader)?;
    println!(
        "test accuracy {:.2}% ({}/{}), avg loss {:.4}",
        eval.accuracy() * 100.0,
        eval.correct,
        eval.total,
        eval.avg_loss()
    );

    show_sample_predictions(&model, &test)?;

    if let (Some(csv), Some(dir)) = (&args.labels_csv, &args.img_dir) {
        csv_pass(&model, csv, dir)?;
    }

    Ok(())
}

/// One row per epoch, bar length proportional to the epoch's loss sum.
fn print_loss_chart(report: &TrainReport) {
    let max = report
        .epochs
        .iter()
        .map(|e| e.loss)
        .fold(f64::MIN, f64::max);
    if max <= 0.0 {
        return;
    }
    println!("loss per epoch:");
    for e in &report.epochs {
        let width = ((e.loss / max) * 50.0).round() as usize;
        println!("  {:>3} {:10.4} {}", e.epoch, e.loss, "#".repeat(width));
    }
}

fn show_sample_predictions(model: &Mlp, test: &ImageFolderDataset) -> Result<()> {
    let mut loader = DataLoader::new(
        test,
        DataLoaderConfig::new().batch_size(8).shuffle(false),
    )?;
    if let Some(batch) = loader.epoch().next() {
        let batch = batch?;
        let preds = predict(model, &batch)?;
        for (i, (pred, label)) in preds.iter().zip(&batch.labels).enumerate() {
            let mark = if pred == label { "ok" } else { "MISS" };
            println!(
                "  sample {}: predicted {} actual {} [{}]",
                i,
                test.classes()[*pred],
                test.classes()[*label],
                mark
            );
        }
    }
    Ok(())
}

/// Extra pass over a CSV-manifest dataset, printing per-file predictions.
fn csv_pass(model: &Mlp, csv: &PathBuf, img_dir: &PathBuf) -> Result<()> {
    let ds = CsvImageDataset::builder(csv, img_dir)
        .image_size(28, 28)
        .transform(Normalize::new(0.0, 0.5))
        .build()?;
    log::info!("csv pass: {} rows from {:?}", ds.len(), csv);

    let mut loader = DataLoader::new(
        &ds,
        DataLoaderConfig::new().batch_size(16).shuffle(false),
    )?;
    let mut index = 0usize;
    let mut correct = 0usize;
    for batch in loader.epoch() {
        let batch = batch?;
        let preds = predict(model, &batch)?;
        for (pred, label) in preds.iter().zip(&batch.labels) {
            let file = ds
                .path(index)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  {}: predicted {} actual {}", file, pred, label);
            if pred == label {
                correct += 1;
            }
            index += 1;
        }
    }
    println!("csv pass accuracy: {}/{}", correct, index);
    Ok(())
}
