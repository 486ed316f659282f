// Confirmation gate between a classified suggestion and the shell

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::parser::CommandSuggestion;
use crate::safety::{Classifier, SafetyLevel};

/// How the process was invoked. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// No positional argument: read requests from stdin in a loop.
    Interactive,
    /// One request from the command line, confirmation still required.
    Direct,
    /// `--auto`: SAFE commands run without a prompt, everything else
    /// falls back to the confirmation flow.
    AutoExecute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Execute,
    Abort,
    Edit,
    Copy,
}

/// What the confirmation flow settled on.
#[derive(Debug)]
pub enum GateOutcome {
    /// Execute this (possibly edited) suggestion.
    Run(CommandSuggestion),
    Abort,
    /// The user asked for the command text instead of running it.
    Copied,
}

/// Pure decision function. `None` means no decision can be made without
/// asking the user: the caller must prompt and come back with a choice.
///
/// Only SAFE commands ever bypass confirmation, and only in auto mode.
pub fn decide(
    level: SafetyLevel,
    mode: RunMode,
    choice: Option<char>,
) -> Option<GateDecision> {
    if mode == RunMode::AutoExecute && level == SafetyLevel::Safe && choice.is_none() {
        return Some(GateDecision::Execute);
    }

    match choice {
        Some('y') => Some(GateDecision::Execute),
        Some('n') => Some(GateDecision::Abort),
        Some('c') => Some(GateDecision::Copy),
        Some('e') => Some(GateDecision::Edit),
        _ => None,
    }
}

/// Drive the confirmation flow to a final outcome, prompting on stdin as
/// needed. Edits replace the command and re-classify it before the loop
/// continues, so an edit can never smuggle a dangerous pattern past the
/// gate.
pub fn resolve(
    suggestion: CommandSuggestion,
    mode: RunMode,
    classifier: &Classifier,
) -> Result<GateOutcome> {
    let mut current = suggestion;
    let mut choice: Option<char> = None;

    loop {
        match decide(current.safety_level, mode, choice) {
            Some(GateDecision::Execute) => {
                if choice.is_none() {
                    println!(
                        "{} auto-executing {} command",
                        "→".green(),
                        current.safety_level.to_string().green()
                    );
                }
                return Ok(GateOutcome::Run(current));
            }
            Some(GateDecision::Abort) => {
                println!("{}", "Execution cancelled".yellow());
                return Ok(GateOutcome::Abort);
            }
            Some(GateDecision::Copy) => {
                println!("\n{}", "Command to copy:".green());
                println!("{}", current.command);
                return Ok(GateOutcome::Copied);
            }
            Some(GateDecision::Edit) => {
                let edited = prompt_line("Enter modified command: ")?;
                if edited.is_empty() {
                    println!("{}", "No change made".dimmed());
                } else {
                    current = current.with_command(edited, classifier);
                    display_reclassification(&current);
                }
                choice = None;
            }
            None => {
                if choice.is_some() {
                    println!(
                        "{} {}",
                        "Invalid input. Please enter".red(),
                        "[y/n/c/e]".dimmed()
                    );
                }
                choice = Some(prompt_choice()?);
            }
        }
    }
}

fn prompt_choice() -> Result<char> {
    print!(
        "{} {} ",
        "Execute command?".bright_yellow().bold(),
        "[y(es)/n(o)/c(opy)/e(dit)]".dimmed()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase().chars().next().unwrap_or('\0'))
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt.bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn display_reclassification(suggestion: &CommandSuggestion) {
    println!(
        "  {} {}",
        suggestion.command.bright_cyan(),
        format!("[{}]", suggestion.safety_level)
            .color(suggestion.safety_level.color())
    );
    if let Some(warning) = &suggestion.warning {
        println!("  {} {}", "⚠".red(), warning.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_execute_safe_runs_without_prompt() {
        assert_eq!(
            decide(SafetyLevel::Safe, RunMode::AutoExecute, None),
            Some(GateDecision::Execute)
        );
    }

    #[test]
    fn test_auto_execute_never_silently_runs_non_safe() {
        assert_eq!(decide(SafetyLevel::Caution, RunMode::AutoExecute, None), None);
        assert_eq!(
            decide(SafetyLevel::Dangerous, RunMode::AutoExecute, None),
            None
        );
    }

    #[test]
    fn test_interactive_has_no_default_action() {
        for level in [
            SafetyLevel::Safe,
            SafetyLevel::Caution,
            SafetyLevel::Dangerous,
        ] {
            assert_eq!(decide(level, RunMode::Interactive, None), None);
            assert_eq!(decide(level, RunMode::Direct, None), None);
        }
    }

    #[test]
    fn test_explicit_choices() {
        let level = SafetyLevel::Caution;
        assert_eq!(
            decide(level, RunMode::Interactive, Some('y')),
            Some(GateDecision::Execute)
        );
        assert_eq!(
            decide(level, RunMode::Interactive, Some('n')),
            Some(GateDecision::Abort)
        );
        assert_eq!(
            decide(level, RunMode::Interactive, Some('c')),
            Some(GateDecision::Copy)
        );
        assert_eq!(
            decide(level, RunMode::Interactive, Some('e')),
            Some(GateDecision::Edit)
        );
    }

    #[test]
    fn test_invalid_choice_forces_reprompt() {
        assert_eq!(decide(SafetyLevel::Safe, RunMode::Interactive, Some('x')), None);
        assert_eq!(decide(SafetyLevel::Safe, RunMode::Interactive, Some('\0')), None);
    }

    #[test]
    fn test_dangerous_executes_only_on_explicit_yes() {
        for choice in ['n', 'c', 'e', 'q', ' ', '\0'] {
            assert_ne!(
                decide(SafetyLevel::Dangerous, RunMode::AutoExecute, Some(choice)),
                Some(GateDecision::Execute),
                "choice {:?} must not execute a dangerous command",
                choice
            );
        }
        assert_eq!(
            decide(SafetyLevel::Dangerous, RunMode::AutoExecute, Some('y')),
            Some(GateDecision::Execute)
        );
    }
}
