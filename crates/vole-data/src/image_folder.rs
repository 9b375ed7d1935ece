// ImageFolderDataset — one subdirectory per class, lazily decoded
//
// Layout:
//   root/
//     cat/   img0.png img1.png ...
//     dog/   img0.png ...
//
// Class indices follow the lexicographic order of the subdirectory names,
// and files within a class are sorted, so the index -> sample mapping is
// identical on every machine.

use std::fs;
use std::path::{Path, PathBuf};

use vole_core::{Error, Result};

use crate::dataset::{Dataset, Sample};
use crate::decode::{is_image_path, load_pixels, DecodeOptions};
use crate::transform::Transform;

/// A dataset that scans a directory tree of `class_name/image` files at
/// construction and decodes images on demand in [`Dataset::get`].
pub struct ImageFolderDataset {
    name: String,
    // (path, class index), sorted by class then filename
    entries: Vec<(PathBuf, usize)>,
    classes: Vec<String>,
    decode: DecodeOptions,
    transforms: Vec<Box<dyn Transform>>,
    shape: Vec<usize>,
}

/// Builder for [`ImageFolderDataset`].
pub struct ImageFolderBuilder {
    root: PathBuf,
    image_size: (u32, u32),
    grayscale: bool,
    transforms: Vec<Box<dyn Transform>>,
}

impl ImageFolderDataset {
    /// Start building a dataset rooted at `root`.
    ///
    /// Defaults: images resized to 28x28 and converted to grayscale, no
    /// transforms.
    pub fn builder<P: AsRef<Path>>(root: P) -> ImageFolderBuilder {
        ImageFolderBuilder {
            root: root.as_ref().to_path_buf(),
            image_size: (28, 28),
            grayscale: true,
            transforms: Vec::new(),
        }
    }

    /// Class names in index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The file path backing sample `index`, if in range.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|(p, _)| p.as_path())
    }
}

impl ImageFolderBuilder {
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

    /// Scan the directory tree and finish construction.
    ///
    /// Fails with a configuration error when the root is not a directory,
    /// contains no class subdirectories, or contains no image files at all.
    pub fn build(self) -> Result<ImageFolderDataset> {
        if !self.root.is_dir() {
            return Err(Error::config(format!(
                "image folder root {:?} is not a directory",
                self.root
            )));
        }

        let mut class_dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                class_dirs.push((name, path));
            }
        }
        if class_dirs.is_empty() {
            return Err(Error::config(format!(
                "image folder root {:?} has no class subdirectories",
                self.root
            )));
        }
        class_dirs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries = Vec::new();
        let mut classes = Vec::with_capacity(class_dirs.len());
        for (class_idx, (name, dir)) in class_dirs.into_iter().enumerate() {
            let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image_path(p))
                .collect();
            files.sort();
            for f in files {
                entries.push((f, class_idx));
            }
            classes.push(name);
        }
        if entries.is_empty() {
            return Err(Error::config(format!(
                "image folder root {:?} contains no image files",
                self.root
            )));
        }

        let (w, h) = self.image_size;
        let channels = if self.grayscale { 1 } else { 3 };
        let shape = vec![channels, h as usize, w as usize];

        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image_folder".to_string());

        Ok(ImageFolderDataset {
            name,
            entries,
            classes,
            decode: DecodeOptions {
                resize: Some(self.image_size),
                grayscale: self.grayscale,
            },
            transforms: self.transforms,
            shape,
        })
    }
}

impl Dataset for ImageFolderDataset {
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
        self.classes.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
