use param_flags::{define_params, Error, FlagSet, MapEnv, ParamError, Params, Source};
use std::time::Duration;

define_params! {
    pub struct DefaultParams {
        #[param(env = "TEST_DEFAULT_PORT", flag = "port", doc = "Server port", default = 8080)]
        pub port: i64,

        #[param(env = "TEST_DEFAULT_HOST", flag = "host", doc = "Server host", default = "localhost")]
        pub host: String,

        #[param(env = "TEST_DEFAULT_DEBUG", flag = "debug", doc = "Enable debug mode", default = false)]
        pub debug: bool,

        #[param(env = "TEST_DEFAULT_TIMEOUT", flag = "timeout", doc = "Request timeout", default = Duration::from_secs(5))]
        pub timeout: Duration,

        #[param(env = "TEST_DEFAULT_RATIO", flag = "ratio", doc = "Sampling ratio", default = 0.5)]
        pub ratio: f64,

        #[param(env = "TEST_DEFAULT_WORKERS", flag = "workers", doc = "Worker count", default = 4)]
        pub workers: usize,
    }
}

define_params! {
    #[derive(Debug)]
    pub struct InferredParams {
        /// Maximum number of retries
        pub max_retries: u64,

        /// Offset applied to every reading,
        /// in raw units
        #[param(default = -3)]
        pub offset: isize,
    }
}

define_params! {
    #[allow(missing_docs)]
    pub struct ParamsWithoutDocs {
        #[param(env = "TEST_NO_DOCS_PORT", default = 8080)]
        pub port: u64,

        #[param(env = "TEST_NO_DOCS_HOST", doc = "Host can still have docs", default = String::from("localhost"))]
        pub host: String,
    }
}

fn empty_set() -> FlagSet {
    FlagSet::default()
        .with_env(MapEnv::new())
        .with_output(std::io::sink())
}

#[test]
fn test_macro_default_values() {
    let mut flags = empty_set();
    let params = DefaultParams::define(&mut flags).unwrap();

    assert_eq!(params.port, 8080);
    assert_eq!(params.host, "localhost");
    assert_eq!(params.debug, false);
    assert_eq!(params.timeout, Duration::from_secs(5));
    assert_eq!(params.ratio, 0.5);
    assert_eq!(params.workers, 4);
    assert_eq!(params.port.source(), Source::Default);
}

#[test]
fn test_macro_environment_overrides_defaults() {
    let env = MapEnv::from_pairs([
        ("TEST_DEFAULT_PORT", "9090"),
        ("TEST_DEFAULT_HOST", ""),
        ("TEST_DEFAULT_DEBUG", "1"),
        ("TEST_DEFAULT_TIMEOUT", "1500000000"),
        ("TEST_DEFAULT_RATIO", "1e-2"),
        ("TEST_DEFAULT_WORKERS", "16"),
    ]);
    let mut flags = FlagSet::default().with_env(env);
    let params = DefaultParams::define(&mut flags).unwrap();

    assert_eq!(params.port, 9090);
    assert_eq!(params.host, "");
    assert_eq!(params.debug, true);
    assert_eq!(params.timeout, Duration::from_millis(1500));
    assert_eq!(params.ratio, 0.01);
    assert_eq!(params.workers, 16);
    assert_eq!(params.host.source(), Source::Environment);
}

#[test]
fn test_macro_command_line_overrides_environment() {
    let mut flags = FlagSet::default()
        .with_env(MapEnv::from_pairs([("TEST_DEFAULT_PORT", "9090")]))
        .with_output(std::io::sink());
    let params = DefaultParams::load_from(
        &mut flags,
        ["-port=7070", "-debug", "--timeout", "2m", "serve"],
    )
    .unwrap();

    assert_eq!(params.port, 7070);
    assert_eq!(params.debug, true);
    assert_eq!(params.timeout, Duration::from_secs(120));
    assert_eq!(params.host, "localhost");
    assert_eq!(flags.args(), ["serve"]);
}

#[test]
fn test_macro_load_from_reports_env_errors() {
    let mut flags = FlagSet::default()
        .with_env(MapEnv::from_pairs([("TEST_DEFAULT_WORKERS", "-4")]))
        .with_output(std::io::sink());
    let result = DefaultParams::load_from(&mut flags, Vec::<String>::new());

    match result {
        Err(Error::Param(ParamError::EnvTypeMismatch {
            env_name,
            type_name,
            ..
        })) => {
            assert_eq!(env_name, "TEST_DEFAULT_WORKERS");
            assert_eq!(type_name, "uint");
        }
        _ => panic!("expected an environment type mismatch"),
    }
}

#[test]
fn test_macro_load_from_reports_flag_errors() {
    let mut flags = empty_set();
    let result = DefaultParams::load_from(&mut flags, ["-workers=many"]);

    assert!(matches!(result, Err(Error::Flag(_))));
}

#[test]
fn test_macro_inferred_names_and_docs() {
    let mut flags = empty_set();
    let params = InferredParams::define(&mut flags).unwrap();

    assert_eq!(params.max_retries.name(), "max-retries");
    assert_eq!(params.max_retries.env_name(), "MAX_RETRIES");
    assert_eq!(params.max_retries.description(), "Maximum number of retries");
    assert_eq!(params.max_retries, 0);

    assert_eq!(params.offset.name(), "offset");
    assert_eq!(params.offset.env_name(), "OFFSET");
    assert_eq!(
        params.offset.description(),
        "Offset applied to every reading, in raw units"
    );
    assert_eq!(params.offset, -3);
}

#[test]
fn test_macro_allow_missing_docs() {
    let mut flags = empty_set();
    let params = ParamsWithoutDocs::define(&mut flags).unwrap();

    assert_eq!(params.port, 8080);
    assert_eq!(params.port.description(), "");
    assert_eq!(params.host, "localhost");
    assert_eq!(params.host.description(), "Host can still have docs");
}

#[test]
fn test_macro_defining_twice_in_one_set_fails() {
    let mut flags = empty_set();
    DefaultParams::define(&mut flags).unwrap();

    assert!(matches!(
        DefaultParams::define(&mut flags),
        Err(ParamError::Redefined { .. })
    ));
}

#[test]
fn test_macro_docs_flags_use_hardcoded_defaults() {
    let flags = DefaultParams::docs_flags().unwrap();
    let md = flags.docs_markdown();

    assert!(md.contains("| `-port` | `TEST_DEFAULT_PORT` | int64 | `8080` | Server port |"));
    assert!(md.contains("| `-timeout` | `TEST_DEFAULT_TIMEOUT` | duration | `5s` | Request timeout |"));
    assert!(md.contains("| `-debug` | `TEST_DEFAULT_DEBUG` | bool | `false` | Enable debug mode |"));
    assert_eq!(flags.describe().len(), 6);
}
