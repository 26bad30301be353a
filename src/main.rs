mod cli;

use github_rate_pubsub::config::Config;
use github_rate_pubsub::pipeline;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")] // steps run strictly one after another
async fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("github-rate-pubsub {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let result = match Config::from_env(&cli::cli_options(&matches)) {
        Ok(cfg) => pipeline::run_with_deadline(&cfg).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => {
            println!("Message ID: {}", outcome.message_id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
