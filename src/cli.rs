use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use github_rate_pubsub::config::CliOptions;

pub fn build_cli() -> Command {
    Command::new("github-rate-pubsub")
        .about("Publish GitHub API rate-limit status to Google Cloud Pub/Sub")
        .disable_version_flag(true)
        .arg(
            Arg::new("secret")
                .long("secret")
                .num_args(1)
                .help("Secret Manager resource holding the GitHub token (env: GITHUB_TOKEN_SECRET)"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .num_args(1)
                .help("Pub/Sub project id (env: PUBSUB_PROJECT)"),
        )
        .arg(
            Arg::new("topic")
                .long("topic")
                .num_args(1)
                .help("Pub/Sub topic id (env: PUBSUB_TOPIC)"),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Deadline for the whole run (env: RUN_TIMEOUT_SECS)"),
        )
        .arg(
            Arg::new("http-timeout-secs")
                .long("http-timeout-secs")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Timeout for each HTTP request (env: GITHUB_HTTP_TIMEOUT_SECS)"),
        )
        .arg(
            Arg::new("decode-non-success")
                .long("decode-non-success")
                .help("Decode the rate limit body even when GitHub returns a non-2xx status")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
}

pub fn cli_options(matches: &ArgMatches) -> CliOptions {
    CliOptions {
        secret: matches.get_one::<String>("secret").cloned(),
        project: matches.get_one::<String>("project").cloned(),
        topic: matches.get_one::<String>("topic").cloned(),
        timeout_secs: matches.get_one::<u64>("timeout-secs").copied(),
        http_timeout_secs: matches.get_one::<u64>("http-timeout-secs").copied(),
        decode_non_success: matches.get_flag("decode-non-success"),
    }
}

pub fn init_logging(level: Option<&str>) {
    // Explicit level wins, else RUST_LOG, else info.
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.init();
}
