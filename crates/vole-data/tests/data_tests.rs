// Integration tests for datasets, transforms, and the loader.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use vole_core::Error;
use vole_data::{
    extract_zip, CsvImageDataset, DataLoader, DataLoaderConfig, Dataset, ImageFolderDataset,
    MemoryDataset, Normalize, Sample, Transform,
};

fn toy_dataset(n: usize) -> MemoryDataset {
    let samples = (0..n)
        .map(|i| Sample {
            pixels: vec![i as f32, -(i as f32)],
            shape: vec![2],
            label: i % 2,
        })
        .collect();
    MemoryDataset::new(samples, 2).unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vole-data-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &PathBuf, w: u32, h: u32, value: u8) {
    let img = image::GrayImage::from_pixel(w, h, image::Luma([value]));
    img.save(path).unwrap();
}

#[test]
fn num_batches_with_and_without_drop_last() {
    let ds = toy_dataset(10);
    let keep = DataLoader::new(&ds, DataLoaderConfig::new().batch_size(4)).unwrap();
    assert_eq!(keep.num_batches(), 3);
    assert_eq!(keep.num_samples(), 10);

    let drop = DataLoader::new(&ds, DataLoaderConfig::new().batch_size(4).drop_last(true)).unwrap();
    assert_eq!(drop.num_batches(), 2);
    assert_eq!(drop.num_samples(), 8);
}

#[test]
fn zero_batch_size_rejected() {
    let ds = toy_dataset(4);
    assert!(DataLoader::new(&ds, DataLoaderConfig::new().batch_size(0)).is_err());
}

#[test]
fn unshuffled_pass_visits_index_order() {
    let ds = toy_dataset(10);
    let mut loader =
        DataLoader::new(&ds, DataLoaderConfig::new().batch_size(4).shuffle(false)).unwrap();

    let batches: Vec<_> = loader.epoch().map(|b| b.unwrap()).collect();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].len(), 4);
    assert_eq!(batches[1].len(), 4);
    assert_eq!(batches[2].len(), 2);

    // First pixel of each sample encodes its index.
    let visited: Vec<usize> = batches
        .iter()
        .flat_map(|b| {
            let per = b.sample_len();
            (0..b.len()).map(move |r| b.pixels[r * per] as usize)
        })
        .collect();
    assert_eq!(visited, (0..10).collect::<Vec<_>>());
}

#[test]
fn unshuffled_passes_are_identical() {
    let ds = toy_dataset(10);
    let mut loader =
        DataLoader::new(&ds, DataLoaderConfig::new().batch_size(4).shuffle(false)).unwrap();
    let first: Vec<_> = loader.epoch().map(|b| b.unwrap()).collect();
    let second: Vec<_> = loader.epoch().map(|b| b.unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn batch_shape_prefixes_sample_shape() {
    let ds = toy_dataset(10);
    let mut loader =
        DataLoader::new(&ds, DataLoaderConfig::new().batch_size(4).shuffle(false)).unwrap();
    let batch = loader.epoch().next().unwrap().unwrap();
    assert_eq!(batch.shape, vec![4, 2]);
    assert_eq!(batch.pixels.len(), 8);
    assert_eq!(batch.labels, vec![0, 1, 0, 1]);
}

#[test]
fn drop_last_skips_short_batch() {
    let ds = toy_dataset(10);
    let mut loader = DataLoader::new(
        &ds,
        DataLoaderConfig::new().batch_size(4).shuffle(false).drop_last(true),
    )
    .unwrap();
    let lens: Vec<usize> = loader.epoch().map(|b| b.unwrap().len()).collect();
    assert_eq!(lens, vec![4, 4]);
}

fn visited_order(loader: &mut DataLoader) -> Vec<usize> {
    loader
        .epoch()
        .map(|b| b.unwrap())
        .flat_map(|b| {
            let per = b.sample_len();
            (0..b.len())
                .map(|r| b.pixels[r * per] as usize)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn seeded_shuffle_is_reproducible_and_covers_all() {
    let ds = toy_dataset(64);
    let config = DataLoaderConfig::new().batch_size(8).seed(42);

    let mut a = DataLoader::new(&ds, config).unwrap();
    let mut b = DataLoader::new(&ds, config).unwrap();
    let order_a = visited_order(&mut a);
    let order_b = visited_order(&mut b);
    assert_eq!(order_a, order_b);

    // Permutation, not repetition: every index exactly once.
    let mut sorted = order_a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..64).collect::<Vec<_>>());

    // And not the identity order.
    assert_ne!(order_a, (0..64).collect::<Vec<_>>());
}

#[test]
fn consecutive_epochs_reshuffle() {
    let ds = toy_dataset(64);
    let mut loader =
        DataLoader::new(&ds, DataLoaderConfig::new().batch_size(8).seed(7)).unwrap();
    let first = visited_order(&mut loader);
    let second = visited_order(&mut loader);
    assert_ne!(first, second);

    // Restarting the loader replays the same pass sequence.
    let mut replay =
        DataLoader::new(&ds, DataLoaderConfig::new().batch_size(8).seed(7)).unwrap();
    assert_eq!(visited_order(&mut replay), first);
    assert_eq!(visited_order(&mut replay), second);
}

#[test]
fn parallel_fetch_matches_sequential() {
    let ds = toy_dataset(32);
    let seq_cfg = DataLoaderConfig::new().batch_size(8).shuffle(false);
    let par_cfg = seq_cfg.num_workers(4);

    let mut seq = DataLoader::new(&ds, seq_cfg).unwrap();
    let mut par = DataLoader::new(&ds, par_cfg).unwrap();
    let a: Vec<_> = seq.epoch().map(|b| b.unwrap()).collect();
    let b: Vec<_> = par.epoch().map(|b| b.unwrap()).collect();
    assert_eq!(a, b);
}

#[test]
fn image_folder_scans_sorted_classes() {
    let root = scratch_dir("folder");
    for (class, value) in [("ant", 10u8), ("bee", 200u8)] {
        let dir = root.join(class);
        fs::create_dir_all(&dir).unwrap();
        write_png(&dir.join("a.png"), 28, 28, value);
        write_png(&dir.join("b.png"), 28, 28, value);
    }

    let ds = ImageFolderDataset::builder(&root).build().unwrap();
    assert_eq!(ds.len(), 4);
    assert_eq!(ds.num_classes(), 2);
    assert_eq!(ds.classes(), &["ant".to_string(), "bee".to_string()]);
    assert_eq!(ds.sample_shape(), &[1, 28, 28]);

    // "ant" sorts before "bee", so indices 0..2 are class 0.
    let s0 = ds.get(0).unwrap();
    assert_eq!(s0.label, 0);
    assert!((s0.pixels[0] - 10.0 / 255.0).abs() < 1e-6);
    let s3 = ds.get(3).unwrap();
    assert_eq!(s3.label, 1);
    assert!((s3.pixels[0] - 200.0 / 255.0).abs() < 1e-6);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn image_folder_resizes_and_applies_transforms() {
    let root = scratch_dir("folder-resize");
    let dir = root.join("only");
    fs::create_dir_all(&dir).unwrap();
    write_png(&dir.join("big.png"), 64, 64, 255);

    let ds = ImageFolderDataset::builder(&root)
        .image_size(28, 28)
        .transform(Normalize::new(0.0, 0.5))
        .build()
        .unwrap();
    let s = ds.get(0).unwrap();
    assert_eq!(s.shape, vec![1, 28, 28]);
    assert_eq!(s.pixels.len(), 28 * 28);
    // 255 decodes to 1.0, then (1.0 - 0.0) / 0.5 = 2.0.
    assert!((s.pixels[0] - 2.0).abs() < 1e-5);

    fs::remove_dir_all(&root).unwrap();
}

/// Collapses `[C, H, W]` into a single flat dimension.
struct Flatten;

impl Transform for Flatten {
    fn apply(&self, mut sample: Sample) -> Sample {
        sample.shape = vec![sample.pixels.len()];
        sample
    }
}

#[test]
fn image_folder_rejects_shape_changing_transform() {
    let root = scratch_dir("folder-flatten");
    let dir = root.join("c");
    fs::create_dir_all(&dir).unwrap();
    write_png(&dir.join("a.png"), 28, 28, 7);

    let ds = ImageFolderDataset::builder(&root)
        .transform(Flatten)
        .build()
        .unwrap();
    assert_eq!(ds.sample_shape(), &[1, 28, 28]);
    match ds.get(0) {
        Err(Error::ShapeMismatch { expected, got }) => {
            assert_eq!(expected, vec![1, 28, 28]);
            assert_eq!(got, vec![784]);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn csv_dataset_rejects_shape_changing_transform() {
    let root = scratch_dir("csv-flatten");
    write_png(&root.join("a.png"), 28, 28, 7);
    let manifest = root.join("labels.csv");
    fs::write(&manifest, "filename,label\na.png,0\n").unwrap();

    let ds = CsvImageDataset::builder(&manifest, &root)
        .transform(Flatten)
        .build()
        .unwrap();
    match ds.get(0) {
        Err(Error::ShapeMismatch { got, .. }) => assert_eq!(got, vec![784]),
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn image_folder_rejects_bad_roots() {
    let root = scratch_dir("folder-empty");
    assert!(ImageFolderDataset::builder(root.join("missing")).build().is_err());
    assert!(ImageFolderDataset::builder(&root).build().is_err());
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn image_folder_out_of_range_and_decode_errors() {
    let root = scratch_dir("folder-errors");
    let dir = root.join("c");
    fs::create_dir_all(&dir).unwrap();
    write_png(&dir.join("ok.png"), 28, 28, 1);
    // Not a real image.
    fs::write(dir.join("zz-bad.png"), b"not an image").unwrap();

    let ds = ImageFolderDataset::builder(&root).build().unwrap();
    assert_eq!(ds.len(), 2);

    match ds.get(9) {
        Err(Error::OutOfRange { index: 9, len: 2 }) => {}
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    match ds.get(1) {
        Err(Error::Decode { path, .. }) => assert!(path.contains("zz-bad.png")),
        other => panic!("expected Decode, got {other:?}"),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn csv_dataset_follows_row_order() {
    let root = scratch_dir("csv");
    write_png(&root.join("x.png"), 28, 28, 40);
    write_png(&root.join("y.png"), 28, 28, 80);

    let manifest = root.join("labels.csv");
    fs::write(&manifest, "filename,label\ny.png,3\nx.png,1\n").unwrap();

    let ds = CsvImageDataset::builder(&manifest, &root).build().unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.num_classes(), 4); // max label 3, plus one
    assert_eq!(ds.label(0), Some(3));
    assert_eq!(ds.label(1), Some(1));

    let s = ds.get(0).unwrap();
    assert_eq!(s.label, 3);
    assert!((s.pixels[0] - 80.0 / 255.0).abs() < 1e-6);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn csv_dataset_reports_malformed_rows_by_line() {
    let root = scratch_dir("csv-bad");
    let manifest = root.join("labels.csv");

    fs::write(&manifest, "filename,label\na.png\n").unwrap();
    let err = CsvImageDataset::builder(&manifest, &root).build().unwrap_err();
    assert!(err.to_string().contains("line 2"));

    fs::write(&manifest, "filename,label\na.png,cat\n").unwrap();
    let err = CsvImageDataset::builder(&manifest, &root).build().unwrap_err();
    assert!(err.to_string().contains("line 2"));

    fs::write(&manifest, "filename,label\n").unwrap();
    assert!(CsvImageDataset::builder(&manifest, &root).build().is_err());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn csv_dataset_missing_image_is_decode_error() {
    let root = scratch_dir("csv-missing");
    let manifest = root.join("labels.csv");
    fs::write(&manifest, "filename,label\nnope.png,0\n").unwrap();

    let ds = CsvImageDataset::builder(&manifest, &root).build().unwrap();
    match ds.get(0) {
        Err(Error::Decode { path, .. }) => assert!(path.contains("nope.png")),
        other => panic!("expected Decode, got {other:?}"),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn extract_zip_unpacks_files() {
    let root = scratch_dir("zip");
    let archive_path = root.join("data.zip");

    {
        let file = fs::File::create(&archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let opts = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.add_directory("inner", opts).unwrap();
        zip.start_file("inner/hello.txt", opts).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.start_file("top.txt", opts).unwrap();
        zip.write_all(b"top").unwrap();
        zip.finish().unwrap();
    }

    let dest = root.join("out");
    let written = extract_zip(&archive_path, &dest).unwrap();
    assert_eq!(written, 2);
    assert_eq!(fs::read_to_string(dest.join("inner/hello.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "top");

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn extract_zip_rejects_missing_archive() {
    let root = scratch_dir("zip-missing");
    assert!(extract_zip(root.join("nope.zip"), root.join("out")).is_err());
    fs::remove_dir_all(&root).unwrap();
}
