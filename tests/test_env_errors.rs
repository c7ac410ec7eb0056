use param_flags::{FlagSet, MapEnv, ParamError};
use std::time::Duration;

fn set_with(name: &str, value: &str) -> FlagSet {
    FlagSet::default()
        .with_env(MapEnv::from_pairs([(name, value)]))
        .with_output(std::io::sink())
}

fn assert_mismatch(result: Result<impl Sized, ParamError>, env_name: &str, type_name: &str) {
    match result {
        Err(ParamError::EnvTypeMismatch {
            env_name: got_env,
            type_name: got_type,
            message,
        }) => {
            assert_eq!(got_env, env_name);
            assert_eq!(got_type, type_name);
            assert!(!message.is_empty());
        }
        Err(other) => panic!("expected EnvTypeMismatch, got {}", other),
        Ok(_) => panic!("expected EnvTypeMismatch for {}", env_name),
    }
}

#[test]
fn test_invalid_text_for_every_type() {
    assert_mismatch(set_with("V", "yes").bool("V", "v", false, ""), "V", "bool");
    assert_mismatch(
        set_with("V", "5s").duration("V", "v", Duration::ZERO, ""),
        "V",
        "duration",
    );
    assert_mismatch(set_with("V", "1.5").int("V", "v", 0, ""), "V", "int");
    assert_mismatch(set_with("V", "0x10").int64("V", "v", 0, ""), "V", "int64");
    assert_mismatch(set_with("V", "-1").uint("V", "v", 0, ""), "V", "uint");
    assert_mismatch(
        set_with("V", "18446744073709551616").uint64("V", "v", 0, ""),
        "V",
        "uint64",
    );
    assert_mismatch(set_with("V", "one").float64("V", "v", 0.0, ""), "V", "float64");
}

#[test]
fn test_string_never_mismatches() {
    let mut flags = set_with("V", "\u{1F980} anything at all");
    let value = flags.string("V", "v", "default", "").unwrap();
    assert_eq!(value, "\u{1F980} anything at all");
}

#[test]
fn test_fatal_line_format() {
    let error = set_with("PORT", "http").int("PORT", "port", 8080, "").unwrap_err();

    assert_eq!(
        error.to_string(),
        "fatal=\"'PORT' environment variable should be 'int'\", error=\"invalid digit found in string\""
    );
}

#[test]
fn test_mismatch_leaves_set_usable() {
    let mut flags = set_with("RETRIES", "many");

    assert!(flags.uint64("RETRIES", "retries", 3, "").is_err());

    // The failed name was never registered, so it can still be defined elsewhere
    let retries = flags.uint64("OTHER_RETRIES", "retries", 3, "").unwrap();
    assert_eq!(retries, 3);
}

#[test]
fn test_process_environment_is_read() {
    std::env::set_var("PARAM_FLAGS_IT_PROCESS_PORT", "9191");
    std::env::set_var("PARAM_FLAGS_IT_PROCESS_BAD", "nope");

    let mut flags = FlagSet::default().with_output(std::io::sink());
    let port = flags
        .int("PARAM_FLAGS_IT_PROCESS_PORT", "port", 8080, "")
        .unwrap();
    let bad = flags.bool("PARAM_FLAGS_IT_PROCESS_BAD", "bad", false, "");
    let unset = flags
        .int("PARAM_FLAGS_IT_PROCESS_UNSET", "unset", 8080, "")
        .unwrap();

    assert_eq!(port, 9191);
    assert_mismatch(bad, "PARAM_FLAGS_IT_PROCESS_BAD", "bool");
    assert_eq!(unset, 8080);

    std::env::remove_var("PARAM_FLAGS_IT_PROCESS_PORT");
    std::env::remove_var("PARAM_FLAGS_IT_PROCESS_BAD");
}
