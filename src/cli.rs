use param_flags::{define_params, FlagSet, Params};
use std::time::Duration;

define_params!(
    #[derive(Debug)]
    pub struct DemoParams {
        /// Listen port
        #[param(env = "PORT", flag = "port", default = 8080)]
        pub port: isize,

        #[param(env = "HOST", doc = "Bind address", default = "127.0.0.1")]
        pub host: String,

        #[param(env = "VERBOSE", flag = "v", doc = "Verbose output")]
        pub verbose: bool,

        /// Request timeout; the environment value is in nanoseconds
        #[param(env = "TIMEOUT_NS", flag = "timeout", default = Duration::from_secs(30))]
        pub timeout: Duration,

        #[param(env = "RATIO", doc = "Sampling ratio", default = 1.0)]
        pub ratio: f64,

        #[param(env = "MAX_CONNS", doc = "Connection limit", default = 64)]
        pub max_conns: u64,
    }
);

fn main() {
    let mut flags = FlagSet::for_process();
    let params = DemoParams::define(&mut flags).unwrap_or_else(|e| e.exit());
    let _ = flags.parse_args();

    match flags.args().first().map(String::as_str) {
        None => show_params(&params),
        Some("docs") => print!("{}", flags.docs_markdown()),
        Some("defaults") => flags.print_defaults(),
        Some(other) => {
            eprintln!("unknown command: {}. Available: docs, defaults", other);
            flags.print_usage();
            std::process::exit(2);
        }
    }
}

fn show_params(params: &DemoParams) {
    println!("port={} ({})", params.port, params.port.source());
    println!("host={} ({})", params.host, params.host.source());
    println!("verbose={} ({})", params.verbose, params.verbose.source());
    println!("timeout={} ({})", params.timeout, params.timeout.source());
    println!("ratio={} ({})", params.ratio, params.ratio.source());
    println!("max-conns={} ({})", params.max_conns, params.max_conns.source());
}
