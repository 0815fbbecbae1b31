//! Worker entries.
//!
//! An entry maps one worker source file to one output destination. Entries
//! are validated once, before any build work, and are read-only afterwards.

use crate::error::{Error, Result};
use crate::reveal::normalize;
use crate::versions::VersionGenerator;
use rustc_hash::FxHashSet as HashSet;
use std::path::{Path, PathBuf};

/// User-facing description of one worker entry.
#[derive(Debug, Clone)]
pub struct EntryOptions {
    /// Entry source file, relative to the project root or absolute.
    pub source: PathBuf,
    /// Output file name; leading separators are stripped.
    pub destination: String,
    /// Explicit entry index; defaults to declaration order.
    pub index: Option<usize>,
    /// Version generator; a random token is used when absent.
    pub version: Option<VersionGenerator>,
}

impl EntryOptions {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            index: None,
            version: None,
        }
    }

    /// Set an explicit entry index.
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the version generator.
    pub fn version(mut self, generator: VersionGenerator) -> Self {
        self.version = Some(generator);
        self
    }
}

/// A normalized worker entry.
#[derive(Debug, Clone)]
pub struct Entry {
    source: PathBuf,
    destination: String,
    index: usize,
    version: Option<VersionGenerator>,
}

impl Entry {
    /// Absolute path of the entry source.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Output file name, without leading separators.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn version_generator(&self) -> Option<&VersionGenerator> {
        self.version.as_ref()
    }

    /// The dev-server URL path this entry is served under.
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/{}", self.destination)
    }
}

/// Strip leading path separators from a destination.
#[must_use]
pub fn normalize_destination(destination: &str) -> &str {
    destination.trim_start_matches(['/', '\\'])
}

/// The validated set of worker entries of one build.
#[derive(Debug, Clone)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    /// Validate and normalize entries. Performs no file I/O.
    ///
    /// Relative sources are anchored at `root`; a relative `root` is taken
    /// against the current directory, so entry sources are always absolute.
    pub fn new(root: &Path, options: Vec<EntryOptions>) -> Result<Self> {
        if options.is_empty() {
            return Err(Error::NoEntries);
        }
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };

        let mut destinations = HashSet::default();
        let mut indexes = HashSet::default();
        let mut entries = Vec::with_capacity(options.len());

        for (position, opts) in options.into_iter().enumerate() {
            if opts.source.as_os_str().is_empty() {
                return Err(Error::InvalidEntry {
                    position,
                    reason: "source is empty".to_string(),
                });
            }

            let destination = normalize_destination(&opts.destination);
            if destination.is_empty() {
                return Err(Error::InvalidEntry {
                    position,
                    reason: format!("destination `{}` is empty", opts.destination),
                });
            }
            if !destinations.insert(destination.to_string()) {
                return Err(Error::DuplicateDestination {
                    destination: destination.to_string(),
                });
            }

            let index = opts.index.unwrap_or(position);
            if !indexes.insert(index) {
                return Err(Error::DuplicateIndex { index });
            }

            let source = if opts.source.is_absolute() {
                normalize(&opts.source)
            } else {
                normalize(&root.join(&opts.source))
            };

            entries.push(Entry {
                source,
                destination: destination.to_string(),
                index,
                version: opts.version,
            });
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its index.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&Entry> {
        self.entries.iter().find(|e| e.index == index)
    }

    /// Look up an entry by destination; leading separators are ignored.
    #[must_use]
    pub fn by_destination(&self, destination: &str) -> Option<&Entry> {
        let destination = normalize_destination(destination);
        self.entries.iter().find(|e| e.destination == destination)
    }

    /// Look up an entry by its source file id as the host reports it.
    #[must_use]
    pub fn by_source(&self, id: &str) -> Option<&Entry> {
        let path = normalize(Path::new(id));
        self.entries.iter().find(|e| e.source == path)
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
