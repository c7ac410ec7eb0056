pub mod error;
pub mod param;
pub mod registry;
pub mod source;
pub mod value;

// Re-export main types
pub use error::{Error, FlagError, ParamError};
pub use param::{Param, ParamInfo, Source};
pub use registry::{resolve, ErrorHandling, FlagSet};
pub use source::{DotenvEnv, EnvSource, MapEnv, ProcessEnv};
pub use value::ParamValue;

// Re-export macro
pub use param_flags_macros::define_params;

/// A group of parameters defined together, usually generated by [`define_params!`]
pub trait Params: Sized {
    /// Define every parameter of the group in `flags`
    fn define(flags: &mut FlagSet) -> Result<Self, ParamError>;

    /// Define the group from the process environment and parse the process arguments.
    ///
    /// An environment variable that fails to decode prints the fatal diagnostic and
    /// exits with status 2; command-line errors print usage and exit the same way.
    fn load() -> Self {
        let mut flags = FlagSet::for_process();
        let params = Self::define(&mut flags).unwrap_or_else(|e| e.exit());
        // ExitOnError: failures never come back from parse
        let _ = flags.parse_args();
        params
    }

    /// Define the group in `flags` and parse `args`, returning errors instead of exiting
    fn load_from<I, S>(flags: &mut FlagSet, args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = Self::define(flags)?;
        flags.parse(args)?;
        Ok(params)
    }

    /// A set holding the group with hardcoded defaults only, for documentation generation
    fn docs_flags() -> Result<FlagSet, ParamError> {
        let mut flags = FlagSet::default().with_env(MapEnv::new());
        Self::define(&mut flags)?;
        Ok(flags)
    }
}
