//! Where environment lookups go.
//!
//! A [`FlagSet`](crate::FlagSet) reads the real process environment by
//! default. Tests swap in a [`MapEnv`], and programs that keep settings in a
//! `.env` file can use [`DotenvEnv`].

use std::collections::HashMap;
use std::path::Path;

/// A source of environment variables
pub trait EnvSource {
    /// Value of the variable, or `None` if it is not set.
    ///
    /// A variable set to the empty string must return `Some("")`.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        // Non-unicode values still count as set.
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

/// Environment backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Process environment layered over the contents of a dotenv file.
///
/// Variables already present in the process environment win, the same rule
/// `dotenvy::from_path` applies; the process environment itself is never modified.
#[derive(Debug, Clone, Default)]
pub struct DotenvEnv {
    file: MapEnv,
}

impl DotenvEnv {
    /// Read `path` as a dotenv file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, dotenvy::Error> {
        let mut file = MapEnv::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            file.set(key, value);
        }
        tracing::debug!(
            path = %path.as_ref().display(),
            count = file.vars.len(),
            "loaded dotenv file"
        );
        Ok(Self { file })
    }
}

impl EnvSource for DotenvEnv {
    fn get(&self, name: &str) -> Option<String> {
        ProcessEnv.get(name).or_else(|| self.file.get(name))
    }
}

impl<S: EnvSource + ?Sized> EnvSource for Box<S> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}
