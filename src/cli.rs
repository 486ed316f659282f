// User-facing flow: banner, request loop, suggestion display, execution

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::error::NlshError;
use crate::executor::{self, ExecutionResult};
use crate::gate::{self, GateOutcome, RunMode};
use crate::parser::{self, CommandSuggestion};
use crate::safety::Classifier;
use crate::{llm, thinking};

const HEADER_WIDTH: usize = 60;

fn print_banner() {
    println!("{}", "═".repeat(HEADER_WIDTH).bright_blue());
    println!("{}", "nlsh - Natural Language to Shell Commands".bright_white().bold());
    println!("{}", "═".repeat(HEADER_WIDTH).bright_blue());
}

/// Interactive session: read requests from stdin until quit or EOF.
/// Provider and parse failures end the current request, not the session.
pub async fn run_interactive(config: &Config) -> Result<()> {
    print_banner();
    println!(
        "{}",
        "Type your request in plain English. 'quit' or Ctrl-D to exit.".dimmed()
    );

    let classifier = Classifier::new();

    loop {
        println!("{}", "─".repeat(HEADER_WIDTH).bright_green());
        print!("{} ", "What would you like to do?".bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        if let Err(e) = process_request(config, &classifier, input, RunMode::Interactive).await {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        println!();
    }

    println!("\n{}", "Session ended".bright_blue());
    Ok(())
}

/// Single round trip for DIRECT and AUTO_EXECUTE invocations. Returns
/// the process exit code.
pub async fn run_request(config: &Config, input: &str, mode: RunMode) -> Result<i32> {
    let classifier = Classifier::new();
    process_request(config, &classifier, input, mode).await
}

async fn process_request(
    config: &Config,
    classifier: &Classifier,
    input: &str,
    mode: RunMode,
) -> Result<i32> {
    let spinner = thinking::show_generating();
    let raw = llm::request_command(config, input).await;
    spinner.finish();
    let raw = raw?;

    let parsed = match parser::parse(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", "Raw response:".dimmed());
            eprintln!("{}", raw.dimmed());
            return Err(NlshError::from(e).into());
        }
    };

    let suggestion = parsed.into_suggestion(input, classifier);
    display_suggestion(&suggestion);

    match gate::resolve(suggestion, mode, classifier)? {
        GateOutcome::Run(confirmed) => {
            println!("\n{}", "Executing command...".green());
            let result = executor::run(&confirmed.command, config.exec_timeout()).await?;
            display_result(&result);
            Ok(if result.success() { 0 } else { result.exit_code })
        }
        GateOutcome::Abort | GateOutcome::Copied => Ok(0),
    }
}

fn display_suggestion(suggestion: &CommandSuggestion) {
    println!("\n{}", "Generated Command:".bold());
    println!("  {}", suggestion.command.bright_cyan());
    println!("\n{}", "Explanation:".bold());
    println!("  {}", suggestion.explanation);
    println!(
        "\n{} {}",
        "Safety:".bold(),
        suggestion.safety_level.badge()
    );
    if let Some(warning) = &suggestion.warning {
        println!("{} {}", "⚠".red(), warning.yellow());
    }
    println!();
}

fn display_result(result: &ExecutionResult) {
    if !result.stdout.is_empty() {
        println!("\n{}", "[OUTPUT]".green());
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        println!("\n{}", "[STDERR]".yellow());
        eprint!("{}", result.stderr);
    }

    if result.timed_out {
        println!(
            "{}",
            "Command timed out and was terminated".red().bold()
        );
    } else if result.success() {
        println!("{}", "✓ Command completed".green());
    } else {
        println!(
            "{}",
            format!("✗ Command failed (exit code {})", result.exit_code).red()
        );
    }
}
