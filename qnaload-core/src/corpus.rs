//! Question corpus loading and sampling

use crate::error::CorpusError;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable, shared, ordered list of questions.
///
/// Cloning is cheap: every clone points at the same backing slice, so a
/// corpus can be handed to each worker without copying the questions.
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Arc<[String]>,
}

impl Corpus {
    /// Load a newline-delimited corpus from disk.
    ///
    /// Lines that are blank after trimming are dropped; every other line is
    /// kept exactly as written (minus its line terminator). Duplicates are
    /// kept.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        debug!("Loading question corpus from {:?}", path);

        let content =
            std::fs::read_to_string(path).map_err(|source| CorpusError::ResourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let corpus = Self::parse(&content, path.to_path_buf())?;
        info!("Loaded {} questions from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    /// Build a corpus from in-memory lines with the same filtering as [`Corpus::load`]
    pub fn from_lines<I, S>(lines: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = lines
            .into_iter()
            .map(Into::into)
            .filter(|line| !line.trim().is_empty())
            .collect();

        if entries.is_empty() {
            return Err(CorpusError::EmptyCorpus {
                path: PathBuf::from("<memory>"),
            });
        }

        Ok(Self {
            entries: entries.into(),
        })
    }

    fn parse(content: &str, origin: PathBuf) -> Result<Self, CorpusError> {
        let entries: Vec<String> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        if entries.is_empty() {
            return Err(CorpusError::EmptyCorpus { path: origin });
        }

        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Pick one question uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // A corpus is never empty once constructed
        let index = rng.random_range(0..self.entries.len());
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
