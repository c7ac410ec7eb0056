use crate::error::{FlagError, ParamError};
use crate::param::{FlagCell, Param, ParamInfo, Source};
use crate::source::{EnvSource, ProcessEnv};
use crate::value::ParamValue;
use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::{fs, path::Path, time::Duration};

/// What [`FlagSet::parse`] does after reporting a command-line error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Return the error to the caller
    #[default]
    ContinueOnError,
    /// Exit the process: status 0 for a help request, 2 for anything else
    ExitOnError,
}

/// Resolve the starting value of a parameter: the environment variable if it is
/// set, the default otherwise.
///
/// A set variable whose text does not decode as `T` is an error, never a fallback.
pub fn resolve<T: ParamValue>(
    env: &dyn EnvSource,
    env_name: &str,
    default: T,
) -> Result<(T, Source), ParamError> {
    match env.get(env_name) {
        Some(text) => match T::from_env(&text) {
            Ok(value) => Ok((value, Source::Environment)),
            Err(message) => Err(ParamError::EnvTypeMismatch {
                env_name: env_name.to_string(),
                type_name: T::TYPE_NAME,
                message,
            }),
        },
        None => Ok((default, Source::Default)),
    }
}

/// Registry of parameters and the command-line parser that fills them.
///
/// # Example
/// ```rust
/// use param_flags::{FlagSet, MapEnv};
///
/// let mut flags = FlagSet::default().with_env(MapEnv::from_pairs([("PORT", "9090")]));
/// let port = flags.int("PORT", "port", 8080, "listen port").unwrap();
/// assert_eq!(port.get(), 9090);
///
/// flags.parse(["-port=7070"]).unwrap();
/// assert_eq!(port.get(), 7070);
/// ```
pub struct FlagSet {
    name: String,
    error_handling: ErrorHandling,
    env: Box<dyn EnvSource>,
    output: Option<Box<dyn Write>>,
    flags: BTreeMap<String, Box<dyn FlagCell>>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl FlagSet {
    /// Create an empty set reading the process environment
    pub fn new(name: impl Into<String>, error_handling: ErrorHandling) -> Self {
        Self {
            name: name.into(),
            error_handling,
            env: Box::new(ProcessEnv),
            output: None,
            flags: BTreeMap::new(),
            actual: BTreeSet::new(),
            args: Vec::new(),
            parsed: false,
        }
    }

    /// Set for the running program: named after `argv[0]`, exits on command-line errors
    pub fn for_process() -> Self {
        let name = std::env::args_os()
            .next()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| "program".to_string());
        Self::new(name, ErrorHandling::ExitOnError)
    }

    /// Read environment variables from `env` instead of the process environment
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Write usage and error messages to `output` instead of standard error
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    /// Define a parameter of any supported type.
    ///
    /// The starting value comes from `env_name` if that variable is set and from
    /// `default` otherwise; a later [`parse`](Self::parse) overrides it when the
    /// `-name` flag is given. Nothing is registered if the variable fails to decode.
    pub fn define<T: ParamValue>(
        &mut self,
        env_name: &str,
        name: &str,
        default: T,
        description: &str,
    ) -> Result<Param<T>, ParamError> {
        let (resolved, source) = resolve(self.env.as_ref(), env_name, default.clone())?;

        if self.flags.contains_key(name) {
            return Err(ParamError::Redefined {
                name: name.to_string(),
            });
        }

        let param = Param::new(name, env_name, description, default, resolved, source);
        self.flags.insert(name.to_string(), Box::new(param.clone()));

        tracing::debug!(
            flag = name,
            env = env_name,
            type_name = T::TYPE_NAME,
            source = %source,
            "parameter registered"
        );

        Ok(param)
    }

    pub fn bool(
        &mut self,
        env_name: &str,
        name: &str,
        default: bool,
        description: &str,
    ) -> Result<Param<bool>, ParamError> {
        self.define(env_name, name, default, description)
    }

    /// The environment value is an integer count of nanoseconds; the flag takes
    /// human-readable text such as `5s`.
    pub fn duration(
        &mut self,
        env_name: &str,
        name: &str,
        default: Duration,
        description: &str,
    ) -> Result<Param<Duration>, ParamError> {
        self.define(env_name, name, default, description)
    }

    pub fn int(
        &mut self,
        env_name: &str,
        name: &str,
        default: isize,
        description: &str,
    ) -> Result<Param<isize>, ParamError> {
        self.define(env_name, name, default, description)
    }

    pub fn int64(
        &mut self,
        env_name: &str,
        name: &str,
        default: i64,
        description: &str,
    ) -> Result<Param<i64>, ParamError> {
        self.define(env_name, name, default, description)
    }

    pub fn uint(
        &mut self,
        env_name: &str,
        name: &str,
        default: usize,
        description: &str,
    ) -> Result<Param<usize>, ParamError> {
        self.define(env_name, name, default, description)
    }

    pub fn uint64(
        &mut self,
        env_name: &str,
        name: &str,
        default: u64,
        description: &str,
    ) -> Result<Param<u64>, ParamError> {
        self.define(env_name, name, default, description)
    }

    pub fn float64(
        &mut self,
        env_name: &str,
        name: &str,
        default: f64,
        description: &str,
    ) -> Result<Param<f64>, ParamError> {
        self.define(env_name, name, default, description)
    }

    /// An empty but set environment variable yields `""`, not the default.
    pub fn string(
        &mut self,
        env_name: &str,
        name: &str,
        default: impl Into<String>,
        description: &str,
    ) -> Result<Param<String>, ParamError> {
        self.define(env_name, name, default.into(), description)
    }

    /// Parse command-line arguments, not including the program name.
    ///
    /// Stops at the first non-flag argument or after `--`; whatever is left is
    /// available from [`args`](Self::args).
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parsed = true;
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let mut index = 0;
        let result = loop {
            match self.parse_one(&args, &mut index) {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.args = args[index..].to_vec();

        match result {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e),
        }
    }

    /// Parse the arguments the process was started with
    pub fn parse_args(&mut self) -> Result<(), FlagError> {
        self.parse(
            std::env::args_os()
                .skip(1)
                .map(|a| a.to_string_lossy().into_owned()),
        )
    }

    /// Handle one flag at `args[*index]`; `Ok(false)` means flag parsing is done
    fn parse_one(&mut self, args: &[String], index: &mut usize) -> Result<bool, FlagError> {
        let Some(arg) = args.get(*index) else {
            return Ok(false);
        };
        if arg.len() < 2 || !arg.starts_with('-') {
            return Ok(false);
        }

        let mut name = &arg[1..];
        if let Some(rest) = name.strip_prefix('-') {
            if rest.is_empty() {
                // "--" terminates the flags and is consumed
                *index += 1;
                return Ok(false);
            }
            name = rest;
        }
        if name.is_empty() || name.starts_with('-') || name.starts_with('=') {
            return Err(FlagError::BadSyntax { arg: arg.clone() });
        }
        *index += 1;

        let (name, inline_value) = match name.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (name, None),
        };

        let Some(flag) = self.flags.get(name) else {
            if name == "help" || name == "h" {
                return Err(FlagError::Help);
            }
            return Err(FlagError::Undefined {
                name: name.to_string(),
            });
        };

        let value = if flag.is_bool_flag() {
            inline_value.unwrap_or("true")
        } else if let Some(value) = inline_value {
            value
        } else if let Some(next) = args.get(*index) {
            *index += 1;
            next.as_str()
        } else {
            return Err(FlagError::MissingValue {
                name: name.to_string(),
            });
        };

        flag.set_from_flag(value)
            .map_err(|message| FlagError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                message,
                is_bool: flag.is_bool_flag(),
            })?;

        tracing::debug!(flag = name, value, "flag applied from command line");
        self.actual.insert(name.to_string());
        Ok(true)
    }

    fn fail(&mut self, error: FlagError) -> Result<(), FlagError> {
        tracing::debug!(error = %error, "command-line parsing failed");

        let mut report = String::new();
        if error != FlagError::Help {
            report.push_str(&format!("{}\n", error));
        }
        report.push_str(&self.usage());
        // Usage output is best effort; the parse error is what the caller needs.
        let _ = self.output().write_all(report.as_bytes());

        match self.error_handling {
            ErrorHandling::ContinueOnError => Err(error),
            ErrorHandling::ExitOnError if error == FlagError::Help => std::process::exit(0),
            ErrorHandling::ExitOnError => std::process::exit(2),
        }
    }

    fn output(&mut self) -> Box<dyn Write + '_> {
        match self.output.as_mut() {
            Some(output) => Box::new(output),
            None => Box::new(io::stderr()),
        }
    }

    /// Whether [`parse`](Self::parse) has been called
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Arguments left over after the flags
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether the flag was given on the command line or through [`set`](Self::set)
    pub fn is_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    /// Set a flag's value as if it had been given on the command line
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        let flag = self.flags.get(name).ok_or_else(|| FlagError::Undefined {
            name: name.to_string(),
        })?;
        flag.set_from_flag(value)
            .map_err(|message| FlagError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                message,
                is_bool: flag.is_bool_flag(),
            })?;
        self.actual.insert(name.to_string());
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<ParamInfo> {
        self.flags.get(name).map(|flag| flag.info())
    }

    /// Every registered parameter, sorted by flag name
    pub fn describe(&self) -> Vec<ParamInfo> {
        self.flags.values().map(|flag| flag.info()).collect()
    }

    /// Write the listing of every registered parameter to `out`
    pub fn write_defaults(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(self.defaults().as_bytes())
    }

    /// Print the listing of every registered parameter to the set's output
    pub fn print_defaults(&mut self) {
        let text = self.defaults();
        let _ = self.output().write_all(text.as_bytes());
    }

    /// Print the usage header and the parameter listing to the set's output
    pub fn print_usage(&mut self) {
        let text = self.usage();
        let _ = self.output().write_all(text.as_bytes());
    }

    fn usage(&self) -> String {
        let header = if self.name.is_empty() {
            "Usage:\n".to_string()
        } else {
            format!("Usage of {}:\n", self.name)
        };
        header + &self.defaults()
    }

    /// The parameter listing, one entry per flag:
    ///
    /// ```text
    ///   -port int
    ///     	listen port (default 8080, env PORT)
    /// ```
    pub fn defaults(&self) -> String {
        let mut text = String::new();

        for flag in self.flags.values() {
            let mut line = format!("  {}", format!("-{}", flag.name()).bold());
            let label = flag.usage_label();
            if !label.is_empty() {
                line.push(' ');
                line.push_str(label);
            }

            // Single-character flags without a type label fit on one line.
            if flag.name().len() == 1 && label.is_empty() {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push_str(&flag.description().replace('\n', "\n    \t"));

            let mut notes = Vec::new();
            if let Some(default) = flag.usage_default() {
                notes.push(format!("default {}", default));
            }
            if !flag.env_name().is_empty() {
                notes.push(format!("env {}", flag.env_name().magenta()));
            }
            if !notes.is_empty() {
                line.push_str(&format!(" ({})", notes.join(", ")));
            }

            text.push_str(&line);
            text.push('\n');
        }

        text
    }

    /// Write parameter documentation to a markdown file
    ///
    /// # Example
    /// ```no_run
    /// use param_flags::FlagSet;
    ///
    /// let mut flags = FlagSet::default();
    /// let _port = flags.int("PORT", "port", 8080, "Server port").unwrap();
    /// flags.write_docs("PARAMS.md").unwrap();
    /// ```
    pub fn write_docs(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.docs_markdown())
    }

    /// Markdown table documenting every registered parameter
    pub fn docs_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("## Parameters\n\n");
        md.push_str("| Flag | Environment | Type | Default | Description |\n");
        md.push_str("|------|-------------|------|---------|-------------|\n");
        for info in self.describe() {
            let env_display = if info.env_name.is_empty() {
                "-".to_string()
            } else {
                format!("`{}`", info.env_name)
            };
            let default_display = if info.default.is_empty() {
                "-".to_string()
            } else {
                format!("`{}`", info.default)
            };
            md.push_str(&format!(
                "| `-{}` | {} | {} | {} | {} |\n",
                info.name,
                env_display,
                info.type_name,
                default_display,
                info.description.replace('|', "\\|")
            ));
        }

        md
    }
}

impl Default for FlagSet {
    fn default() -> Self {
        Self::new("", ErrorHandling::ContinueOnError)
    }
}

impl std::fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.name)
            .field("error_handling", &self.error_handling)
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .field("actual", &self.actual)
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .finish()
    }
}
