//! Per-entry version tokens.
//!
//! Every destination gets one token per build, computed concurrently before
//! any module is loaded or transformed. After bundling, the placeholder
//! `%SW_VERSION%` in each destination's output is replaced with its token.
//! Development serving always uses the literal `dev`.

use crate::entry::{Entry, EntrySet};
use crate::error::{BoxError, Error, Result};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use rand::rngs::OsRng;
use rand::RngCore;
use rustc_hash::FxHashMap as HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use swpack_util::hash::{blake3_concat, short_hex};

/// Placeholder replaced with the version token.
pub const PLACEHOLDER: &str = "%SW_VERSION%";

/// Version used in development.
pub const DEV_VERSION: &str = "dev";

/// Length of generated tokens, in hex characters.
pub const TOKEN_LEN: usize = 8;

/// Number of random bytes drawn for a random token.
const RANDOM_BYTES: usize = 20;

type GenerateFn = dyn Fn() -> BoxFuture<'static, Result<String, BoxError>> + Send + Sync;

/// Asynchronous producer of a version string.
#[derive(Clone)]
pub struct VersionGenerator(Arc<GenerateFn>);

impl VersionGenerator {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
    {
        Self(Arc::new(move || f().boxed()))
    }

    /// Always yield `version`.
    pub fn fixed(version: impl Into<String>) -> Self {
        let version: String = version.into();
        Self::new(move || futures::future::ready(Ok(version.clone())))
    }

    /// Read the version from an environment variable at build time.
    pub fn env(var: impl Into<String>) -> Self {
        let var: String = var.into();
        Self::new(move || {
            let var = var.clone();
            async move {
                std::env::var(&var)
                    .map_err(|e| BoxError::from(format!("environment variable `{var}`: {e}")))
            }
        })
    }

    /// Derive the version from the contents of `files`.
    ///
    /// The token changes exactly when any of the files changes.
    pub fn hash_files(files: Vec<PathBuf>) -> Self {
        let files = Arc::new(files);
        Self::new(move || {
            let files = Arc::clone(&files);
            async move { hash_files(&files).await.map_err(BoxError::from) }
        })
    }

    /// Run the generator.
    pub async fn generate(&self) -> Result<String, BoxError> {
        (self.0)().await
    }
}

impl fmt::Debug for VersionGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VersionGenerator(..)")
    }
}

/// Random token: 20 bytes from the OS generator, hex-encoded, first 8 chars.
#[must_use]
pub fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let mut token = hex::encode(bytes);
    token.truncate(TOKEN_LEN);
    token
}

/// Content token of the concatenated `files`.
pub async fn hash_files(files: &[PathBuf]) -> Result<String> {
    let reads = files.iter().map(|path| async move {
        tokio::fs::read(path)
            .await
            .map_err(|e| crate::error::read_error(path, e))
    });
    let contents = try_join_all(reads).await?;
    let digest = blake3_concat(&contents);
    Ok(short_hex(&digest, TOKEN_LEN).to_string())
}

/// Version tokens keyed by destination. Write-once: built by
/// [`compute_versions`] and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    tokens: HashMap<String, String>,
}

impl VersionMap {
    /// Token for `destination`.
    #[must_use]
    pub fn get(&self, destination: &str) -> Option<&str> {
        self.tokens.get(destination).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in entry declaration order.
    pub fn ordered<'a>(&'a self, entries: &'a EntrySet) -> impl Iterator<Item = (&'a str, &'a str)> {
        entries
            .iter()
            .filter_map(move |e| Some((e.destination(), self.get(e.destination())?)))
    }
}

impl FromIterator<(String, String)> for VersionMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

/// Compute one token per entry, all generators running concurrently.
pub async fn compute_versions(entries: &EntrySet) -> Result<VersionMap> {
    let tokens = try_join_all(entries.iter().map(entry_version)).await?;
    Ok(tokens.into_iter().collect())
}

async fn entry_version(entry: &Entry) -> Result<(String, String)> {
    let destination = entry.destination().to_string();
    let token = match entry.version_generator() {
        Some(generator) => generator
            .generate()
            .await
            .map_err(|source| Error::VersionGenerator {
                destination: destination.clone(),
                source,
            })?,
        None => random_token(),
    };
    Ok((destination, token))
}

/// Replace every occurrence of the placeholder with `token`.
#[must_use]
pub fn stamp_placeholder(text: &str, token: &str) -> String {
    text.replace(PLACEHOLDER, token)
}
