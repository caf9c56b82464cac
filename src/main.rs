use std::process::ExitCode;

use clap::Parser;
use sdgen::ImageRequester;
use sdgen::cli::CliOptions;
use sdgen::config::setup_logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match cli.requester_config() {
        Ok(config) => config,
        Err(err) => {
            error!("Configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let requester = match ImageRequester::new(config) {
        Ok(requester) => requester,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match requester.generate_and_save(&cli.prompt, &cli.output).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
