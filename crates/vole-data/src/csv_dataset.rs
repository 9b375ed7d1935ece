// CsvImageDataset — labels from a CSV manifest, pixels from an image dir
//
// Expected CSV layout, one row per image:
//   filename,label
//   img_00001.png,7
//
// The parser is deliberately small: split on commas, trim whitespace. No
// quoting or escaping, which label manifests never need.

use std::fs;
use std::path::{Path, PathBuf};

use vole_core::{Error, Result};

use crate::dataset::{Dataset, Sample};
use crate::decode::{load_pixels, DecodeOptions};
use crate::transform::Transform;

/// A dataset whose index order is the row order of a CSV manifest.
pub struct CsvImageDataset {
    name: String,
    // (path, label) per CSV row
    entries: Vec<(PathBuf, usize)>,
    num_classes: usize,
    decode: DecodeOptions,
    transforms: Vec<Box<dyn Transform>>,
    shape: Vec<usize>,
}

impl std::fmt::Debug for CsvImageDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvImageDataset")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("num_classes", &self.num_classes)
            .field("decode", &self.decode)
            .field("transforms", &self.transforms.len())
            .field("shape", &self.shape)
            .finish()
    }
}

/// Builder for [`CsvImageDataset`].
pub struct CsvImageBuilder {
    csv_path: PathBuf,
    img_dir: PathBuf,
    has_header: bool,
    image_size: (u32, u32),
    grayscale: bool,
    transforms: Vec<Box<dyn Transform>>,
}

impl CsvImageDataset {
    /// Start building from a manifest at `csv_path` whose filenames are
    /// relative to `img_dir`.
    ///
    /// Defaults: first row treated as a header, images resized to 28x28
    /// and converted to grayscale.
    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(csv_path: P, img_dir: Q) -> CsvImageBuilder {
        CsvImageBuilder {
            csv_path: csv_path.as_ref().to_path_buf(),
            img_dir: img_dir.as_ref().to_path_buf(),
            has_header: true,
            image_size: (28, 28),
            grayscale: true,
            transforms: Vec::new(),
        }
    }

    /// The file path backing sample `index`, if in range.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|(p, _)| p.as_path())
    }

    /// The label of sample `index` without decoding pixels.
    pub fn label(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|(_, l)| *l)
    }
}

impl CsvImageBuilder {
    /// Treat the first row as data rather than a header.
    pub fn no_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Resize every image to `(width, height)` while decoding.
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = (width, height);
        self
    }

    /// Keep three RGB channels instead of collapsing to grayscale.
    pub fn rgb(mut self) -> Self {
        self.grayscale = false;
        self
    }

    /// Append a transform to the per-sample pipeline.
    pub fn transform<T: Transform + 'static>(mut self, t: T) -> Self {
        self.transforms.push(Box::new(t));
        self
    }

    /// Parse the manifest and finish construction.
    ///
    /// Fails with a configuration error on malformed rows (missing column,
    /// non-integer label) with the 1-based line number in the message, and
    /// when the manifest yields no rows. `num_classes` becomes the largest
    /// label seen plus one.
    pub fn build(self) -> Result<CsvImageDataset> {
        let text = fs::read_to_string(&self.csv_path).map_err(|e| {
            Error::config(format!("cannot read manifest {:?}: {}", self.csv_path, e))
        })?;

        let mut entries = Vec::new();
        let mut max_label = 0usize;
        for (lineno, line) in text.lines().enumerate() {
            if lineno == 0 && self.has_header {
                continue;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut cols = line.split(',');
            let file = cols.next().map(str::trim).unwrap_or("");
            let label_str = match cols.next().map(str::trim) {
                Some(s) if !file.is_empty() => s,
                _ => {
                    return Err(Error::config(format!(
                        "{:?} line {}: expected \"filename,label\", got {:?}",
                        self.csv_path,
                        lineno + 1,
                        line
                    )))
                }
            };
            let label: usize = label_str.parse().map_err(|_| {
                Error::config(format!(
                    "{:?} line {}: label {:?} is not a non-negative integer",
                    self.csv_path,
                    lineno + 1,
                    label_str
                ))
            })?;
            max_label = max_label.max(label);
            entries.push((self.img_dir.join(file), label));
        }
        if entries.is_empty() {
            return Err(Error::config(format!(
                "manifest {:?} contains no rows",
                self.csv_path
            )));
        }

        let (w, h) = self.image_size;
        let channels = if self.grayscale { 1 } else { 3 };
        let shape = vec![channels, h as usize, w as usize];

        let name = self
            .csv_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "csv".to_string());

        Ok(CsvImageDataset {
            name,
            entries,
            num_classes: max_label + 1,
            decode: DecodeOptions {
                resize: Some(self.image_size),
                grayscale: self.grayscale,
            },
            transforms: self.transforms,
            shape,
        })
    }
}

impl Dataset for CsvImageDataset {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let (path, label) = self.entries.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.entries.len(),
        })?;
        let (pixels, shape) = load_pixels(path, self.decode)?;
        let mut sample = Sample {
            pixels,
            shape,
            label: *label,
        };
        for t in &self.transforms {
            sample = t.apply(sample);
        }
        // Checked after the transforms so a shape-changing transform
        // cannot contradict sample_shape().
        if sample.shape != self.shape {
            return Err(Error::ShapeMismatch {
                expected: self.shape.clone(),
                got: sample.shape,
            });
        }
        Ok(sample)
    }

    fn sample_shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn name(&self) -> &str {
        &self.name
    }
}
