//! File transport driving block enumeration against checkpoint files
//!
//! The serializer is the only component that touches persistent storage.
//! It polls [`Serializable::block`] with increasing indices and copies each
//! returned view to or from the file, stopping at the first `None`. The
//! on-disk format is the flat concatenation of blocks in index order:
//! native byte order, no headers, no delimiters. Both sides of a round
//! trip must therefore walk the identical registration schema.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SerializerConfig;
use crate::error::{CheckpointError, Result};
use crate::paths::posix_path;
use crate::serializable::{Mode, Serializable};

/// Drives save and load of serializable roots against checkpoint files.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    config: SerializerConfig,
}

impl Serializer {
    /// Serializer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer with an explicit configuration.
    pub fn with_config(config: SerializerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Save one root to `directory/filename`, creating (and, per the
    /// configuration, first clearing) the directory. Returns the bytes
    /// written, which equal `target.serializable_size()` for fixed-size
    /// roots.
    pub fn save<S: Serializable>(
        &self,
        target: &mut S,
        directory: impl AsRef<Path>,
        filename: &str,
    ) -> Result<u64> {
        let directory = directory.as_ref();
        self.prepare_directory(directory)?;
        self.save_into(target, &directory.join(filename))
    }

    /// Load one root from `directory/filename`. Returns the bytes read.
    ///
    /// A missing file surfaces as an I/O error, a file shorter than the
    /// block sequence implies as [`CheckpointError::TruncatedFile`]. No
    /// partial-state recovery is attempted; after a failed load the target
    /// must be treated as reinitialized.
    pub fn load<S: Serializable>(
        &self,
        target: &mut S,
        directory: impl AsRef<Path>,
        filename: &str,
    ) -> Result<u64> {
        self.load_from(target, &directory.as_ref().join(filename))
    }

    /// Save one file per decomposed root, named `{basename}.rank{i}`. The
    /// directory is prepared once, then every root is written on its own
    /// file handle (on the rayon pool with the `parallel` feature).
    pub fn save_all<S: Serializable + Send>(
        &self,
        roots: &mut [S],
        directory: impl AsRef<Path>,
        basename: &str,
    ) -> Result<u64> {
        let directory = directory.as_ref();
        self.prepare_directory(directory)?;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            roots
                .par_iter_mut()
                .enumerate()
                .map(|(rank, root)| self.save_into(root, &rank_path(directory, basename, rank)))
                .try_reduce(|| 0, |a, b| Ok(a + b))
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut written = 0;
            for (rank, root) in roots.iter_mut().enumerate() {
                written += self.save_into(root, &rank_path(directory, basename, rank))?;
            }
            Ok(written)
        }
    }

    /// Load one file per decomposed root, named `{basename}.rank{i}`.
    pub fn load_all<S: Serializable + Send>(
        &self,
        roots: &mut [S],
        directory: impl AsRef<Path>,
        basename: &str,
    ) -> Result<u64> {
        let directory = directory.as_ref();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            roots
                .par_iter_mut()
                .enumerate()
                .map(|(rank, root)| self.load_from(root, &rank_path(directory, basename, rank)))
                .try_reduce(|| 0, |a, b| Ok(a + b))
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut read = 0;
            for (rank, root) in roots.iter_mut().enumerate() {
                read += self.load_from(root, &rank_path(directory, basename, rank))?;
            }
            Ok(read)
        }
    }

    fn prepare_directory(&self, directory: &Path) -> Result<()> {
        if self.config.clean_output_dir && directory.exists() {
            fs::remove_dir_all(directory).map_err(|source| CheckpointError::io(directory, source))?;
        }
        fs::create_dir_all(directory).map_err(|source| CheckpointError::io(directory, source))
    }

    fn save_into<S: Serializable>(&self, target: &mut S, path: &Path) -> Result<u64> {
        let file = File::create(path).map_err(|source| CheckpointError::io(path, source))?;
        let mut writer = BufWriter::with_capacity(self.config.io_chunk_len, file);

        let mut written = 0u64;
        let mut index = 0;
        while let Some(view) = target.block(index, Mode::Save) {
            // The view aliases memory owned by `target`, live for the
            // duration of this write.
            let bytes = unsafe { view.bytes() };
            writer
                .write_all(bytes)
                .map_err(|source| CheckpointError::io(path, source))?;
            written += bytes.len() as u64;
            index += 1;
        }
        writer
            .flush()
            .map_err(|source| CheckpointError::io(path, source))?;
        if self.config.fsync {
            writer
                .get_ref()
                .sync_all()
                .map_err(|source| CheckpointError::io(path, source))?;
        }

        debug!(path = %posix_path(path), blocks = index, bytes = written, "checkpoint saved");
        Ok(written)
    }

    fn load_from<S: Serializable>(&self, target: &mut S, path: &Path) -> Result<u64> {
        let file = File::open(path).map_err(|source| CheckpointError::io(path, source))?;
        let mut reader = BufReader::with_capacity(self.config.io_chunk_len, file);

        let mut read = 0u64;
        let mut index = 0;
        while let Some(view) = target.block(index, Mode::Load) {
            // Exclusive access to the viewed memory for this one read.
            let bytes = unsafe { view.bytes_mut() };
            reader.read_exact(bytes).map_err(|source| {
                if source.kind() == io::ErrorKind::UnexpectedEof {
                    CheckpointError::TruncatedFile {
                        path: posix_path(path),
                        block_index: index,
                        expected: bytes.len(),
                    }
                } else {
                    CheckpointError::io(path, source)
                }
            })?;
            read += bytes.len() as u64;
            index += 1;
        }

        debug!(path = %posix_path(path), blocks = index, bytes = read, "checkpoint loaded");
        Ok(read)
    }
}

fn rank_path(directory: &Path, basename: &str, rank: usize) -> PathBuf {
    directory.join(format!("{basename}.rank{rank}"))
}

/// Save `target` as one checkpoint file, clearing the output directory
/// first when `clean_output_dir` is set.
pub fn save<S: Serializable>(
    target: &mut S,
    directory: impl AsRef<Path>,
    filename: &str,
    clean_output_dir: bool,
) -> Result<u64> {
    let serializer = Serializer::with_config(SerializerConfig {
        clean_output_dir,
        ..SerializerConfig::default()
    })?;
    serializer.save(target, directory, filename)
}

/// Load `target` from one checkpoint file.
pub fn load<S: Serializable>(
    target: &mut S,
    directory: impl AsRef<Path>,
    filename: &str,
) -> Result<u64> {
    Serializer::new().load(target, directory, filename)
}
