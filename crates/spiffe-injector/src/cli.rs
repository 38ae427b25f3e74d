use clap::builder::PossibleValue;
use clap::{Arg, ArgAction, Command, crate_authors, crate_description, crate_name, crate_version};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("SPIFFE_INJECTOR_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("SPIFFE_INJECTOR_LOG_FMT")
            .default_value("text")
            .value_parser([
                PossibleValue::new("text"),
                PossibleValue::new("json"),
                PossibleValue::new("otlp"),
            ])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("SPIFFE_INJECTOR_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("8443")
            .env("SPIFFE_INJECTOR_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("/etc/webhook/certs/svid.pem")
            .env("SPIFFE_INJECTOR_CERT_FILE")
            .help("Path to the X.509 certificate file for HTTPS"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("/etc/webhook/certs/svid_key.pem")
            .env("SPIFFE_INJECTOR_KEY_FILE")
            .help("Path to the private key file of the HTTPS certificate"),
        Arg::new("kube-api-timeout")
            .long("kube-api-timeout")
            .value_name("SECONDS")
            .default_value("10")
            .env("SPIFFE_INJECTOR_KUBE_API_TIMEOUT")
            .value_parser(clap::value_parser!(u64))
            .help("Interrupt calls to the Kubernetes API server after the given number of seconds"),
        Arg::new("shutdown-grace-period")
            .long("shutdown-grace-period")
            .value_name("SECONDS")
            .default_value("5")
            .env("SPIFFE_INJECTOR_SHUTDOWN_GRACE_PERIOD")
            .value_parser(clap::value_parser!(u64))
            .help("Time given to in-flight requests to complete once a shutdown signal is received"),
        Arg::new("enable-metrics")
            .long("enable-metrics")
            .action(ArgAction::SetTrue)
            .env("SPIFFE_INJECTOR_ENABLE_METRICS")
            .help("Enable metrics"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
