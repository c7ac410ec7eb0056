use crate::value::ParamValue;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Where the current value of a parameter came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Source {
    /// The hardcoded default
    Default,
    /// The environment variable
    Environment,
    /// The command line, or an explicit [`FlagSet::set`](crate::FlagSet::set)
    Flag,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::Environment => write!(f, "environment"),
            Source::Flag => write!(f, "flag"),
        }
    }
}

#[derive(Debug)]
struct Inner<T> {
    name: String,
    env_name: String,
    description: String,
    default: T,
    registered: T,
    current: RwLock<(T, Source)>,
}

/// Handle to a registered parameter.
///
/// Clones share the same cell as the [`FlagSet`](crate::FlagSet) it was defined
/// in, so values applied by [`FlagSet::parse`](crate::FlagSet::parse) are visible
/// through every handle.
#[derive(Debug)]
pub struct Param<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Param<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ParamValue> Param<T> {
    pub(crate) fn new(
        name: &str,
        env_name: &str,
        description: &str,
        default: T,
        resolved: T,
        source: Source,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                env_name: env_name.to_string(),
                description: description.to_string(),
                default,
                registered: resolved.clone(),
                current: RwLock::new((resolved, source)),
            }),
        }
    }

    /// Command-line flag name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Environment variable name
    pub fn env_name(&self) -> &str {
        &self.inner.env_name
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    /// The hardcoded default, before any environment override
    pub fn default(&self) -> &T {
        &self.inner.default
    }

    /// The value the flag was registered with: the environment value if one was set,
    /// otherwise the hardcoded default
    pub fn registered_default(&self) -> &T {
        &self.inner.registered
    }

    /// Current value
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard.0)
    }

    pub fn source(&self) -> Source {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .1
    }

    pub(crate) fn store(&self, value: T, source: Source) {
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = (value, source);
    }
}

impl<T: ParamValue + PartialEq> PartialEq<T> for Param<T> {
    fn eq(&self, other: &T) -> bool {
        self.with(|value| value == other)
    }
}

impl PartialEq<&str> for Param<String> {
    fn eq(&self, other: &&str) -> bool {
        self.with(|value| value == other)
    }
}

impl<T: ParamValue> fmt::Display for Param<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| f.write_str(&value.to_text()))
    }
}

/// Snapshot of a registered parameter, as listed by [`FlagSet::describe`](crate::FlagSet::describe)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamInfo {
    /// Command-line flag name
    pub name: String,
    /// Environment variable name
    pub env_name: String,
    /// Type name, e.g. `int64`
    pub type_name: String,
    /// Registered default as text
    pub default: String,
    /// Current value as text
    pub value: String,
    pub description: String,
    pub source: Source,
}

/// Type-erased view of a [`Param`] kept by the flag registry
pub(crate) trait FlagCell {
    fn name(&self) -> &str;
    fn env_name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage_label(&self) -> &'static str;
    fn is_bool_flag(&self) -> bool;
    fn set_from_flag(&self, text: &str) -> Result<(), String>;
    /// `None` when the registered default is the type's zero value
    fn usage_default(&self) -> Option<String>;
    fn info(&self) -> ParamInfo;
}

impl<T: ParamValue> FlagCell for Param<T> {
    fn name(&self) -> &str {
        Param::name(self)
    }

    fn env_name(&self) -> &str {
        Param::env_name(self)
    }

    fn description(&self) -> &str {
        Param::description(self)
    }

    fn usage_label(&self) -> &'static str {
        T::USAGE_LABEL
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL_FLAG
    }

    fn set_from_flag(&self, text: &str) -> Result<(), String> {
        let value = T::from_flag(text)?;
        self.store(value, Source::Flag);
        Ok(())
    }

    fn usage_default(&self) -> Option<String> {
        let registered = self.registered_default();
        if registered.is_zero() {
            None
        } else {
            Some(registered.usage_default())
        }
    }

    fn info(&self) -> ParamInfo {
        ParamInfo {
            name: self.name().to_string(),
            env_name: self.env_name().to_string(),
            type_name: T::TYPE_NAME.to_string(),
            default: self.registered_default().to_text(),
            value: self.with(T::to_text),
            description: self.description().to_string(),
            source: self.source(),
        }
    }
}
