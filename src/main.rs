use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

mod cli;
mod config;
mod error;
mod executor;
mod gate;
mod llm;
mod parser;
mod prompts;
mod safety;
mod thinking;

use config::Config;
use error::NlshError;
use gate::RunMode;

#[derive(Debug, Parser)]
#[command(
    name = "nlsh",
    about = "Turns a natural-language request into a shell command, classifies its safety, and runs it after confirmation"
)]
struct Args {
    /// Natural-language request; omit it to start an interactive session
    request: Vec<String>,

    /// Execute SAFE commands without asking for confirmation
    #[arg(long)]
    auto: bool,

    /// Alternate config file path (default: ~/.nlsh/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    std::process::exit(run(args).await);
}

async fn run(args: Args) -> i32 {
    if args.auto && args.request.is_empty() {
        eprintln!(
            "{} --auto requires a request argument",
            "Error:".red().bold()
        );
        return 2;
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return e.exit_code();
        }
    };

    let outcome = if args.request.is_empty() {
        cli::run_interactive(&config).await.map(|_| 0)
    } else {
        let input = args.request.join(" ");
        let mode = if args.auto {
            RunMode::AutoExecute
        } else {
            RunMode::Direct
        };
        cli::run_request(&config, &input, mode).await
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            e.downcast_ref::<NlshError>()
                .map(|n| n.exit_code())
                .unwrap_or(1)
        }
    }
}
