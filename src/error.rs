use std::fmt;

/// Errors that can occur while defining a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The environment variable is set but its text does not decode as the parameter type
    EnvTypeMismatch {
        env_name: String,
        type_name: &'static str,
        message: String,
    },
    /// A flag with this name is already registered in the set
    Redefined { name: String },
}

impl ParamError {
    /// Print this error to standard error and terminate the process with status 2
    pub fn exit(&self) -> ! {
        eprintln!("{}", self);
        std::process::exit(2)
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::EnvTypeMismatch {
                env_name,
                type_name,
                message,
            } => write!(
                f,
                "fatal=\"'{}' environment variable should be '{}'\", error=\"{}\"",
                env_name, type_name, message
            ),
            ParamError::Redefined { name } => write!(f, "flag redefined: {}", name),
        }
    }
}

impl std::error::Error for ParamError {}

/// Errors produced while parsing command-line arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// `-h` or `-help` was given and no flag with that name is defined
    Help,
    /// The argument names a flag that was never defined
    Undefined { name: String },
    /// The argument starts with `-` but is not a well-formed flag
    BadSyntax { arg: String },
    /// A non-bool flag was the last argument and had no value
    MissingValue { name: String },
    /// The flag value does not decode as the flag's type
    InvalidValue {
        name: String,
        value: String,
        message: String,
        is_bool: bool,
    },
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagError::Help => write!(f, "flag: help requested"),
            FlagError::Undefined { name } => {
                write!(f, "flag provided but not defined: -{}", name)
            }
            FlagError::BadSyntax { arg } => write!(f, "bad flag syntax: {}", arg),
            FlagError::MissingValue { name } => write!(f, "flag needs an argument: -{}", name),
            FlagError::InvalidValue {
                name,
                value,
                message,
                is_bool: true,
            } => write!(
                f,
                "invalid boolean value {:?} for -{}: {}",
                value, name, message
            ),
            FlagError::InvalidValue {
                name,
                value,
                message,
                is_bool: false,
            } => write!(f, "invalid value {:?} for flag -{}: {}", value, name, message),
        }
    }
}

impl std::error::Error for FlagError {}

/// Either half of loading a parameter set: defining it or parsing the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Param(ParamError),
    Flag(FlagError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Param(e) => e.fmt(f),
            Error::Flag(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Param(e) => Some(e),
            Error::Flag(e) => Some(e),
        }
    }
}

impl From<ParamError> for Error {
    fn from(e: ParamError) -> Self {
        Error::Param(e)
    }
}

impl From<FlagError> for Error {
    fn from(e: FlagError) -> Self {
        Error::Flag(e)
    }
}
