//! docstore-sessions binary entry point.

use std::process::ExitCode;

use docstore_sessions::cli::{self, Args};
use docstore_sessions::config::Config;
use docstore_sessions::{logging, FileRepository, SessionStore};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The subscriber may not exist yet when config loading fails
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args)?;
    logging::try_init_with_filter(config.log_filter()).ok();

    let Some(command) = args.command else {
        cli::print_help();
        return Ok(());
    };

    debug!(dir = %config.storage.dir.display(), "opening session repository");
    let repo = FileRepository::open(&config.storage.dir).await?;
    let store = SessionStore::new(repo);

    let output = cli::run(&command, &store).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
