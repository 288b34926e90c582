use clap::Parser;
use log::{error, info, warn};
use redmedia::cli::Cli;
use redmedia::operations::submit::handle_submit_command;
use redmedia::context::deadline_after;
use redmedia::{AppConfig, Context, RedditMediaClient};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load();

    let client = match RedditMediaClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let timeout = cli
        .timeout_secs
        .map(Duration::from_secs)
        .or(config.timeout);
    let token = CancellationToken::new();
    let ctx = Context::with_token(token.clone(), timeout.and_then(deadline_after));

    // Ctrl-C cancels the running submission
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });

    match handle_submit_command(cli.command.into_request(), client, &ctx).await {
        Ok(fullname) => {
            info!("Done");
            println!("{}", fullname);
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
