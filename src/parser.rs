// Parses the model's reply into a validated command suggestion

use serde_json::Value;
use thiserror::Error;

use crate::safety::{Classifier, SafetyLevel};

/// Why a model response could not be turned into a suggestion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in the model response")]
    MissingJson,

    #[error("missing or invalid `{0}` field in the model response")]
    InvalidField(&'static str),

    #[error("the model returned an empty command")]
    EmptyCommand,
}

/// Validated fields pulled out of the model's JSON reply. The safety
/// hint is what the model claimed; the final level comes from the
/// classifier.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub command: String,
    pub explanation: String,
    pub safety_hint: Option<SafetyLevel>,
    pub warning: Option<String>,
}

/// A fully classified suggestion, immutable once built. Editing the
/// command goes through [`CommandSuggestion::with_command`], which
/// re-runs classification.
#[derive(Debug, Clone)]
pub struct CommandSuggestion {
    pub natural_language_input: String,
    pub command: String,
    pub explanation: String,
    pub safety_level: SafetyLevel,
    pub warning: Option<String>,
}

impl ParsedResponse {
    pub fn into_suggestion(self, input: &str, classifier: &Classifier) -> CommandSuggestion {
        let safety_level = classifier.classify(&self.command, self.safety_hint);
        // Surface the matched rule when the scan escalated and the model
        // offered no warning of its own.
        let warning = self
            .warning
            .or_else(|| classifier.scan(&self.command).map(|what| what.to_string()));

        CommandSuggestion {
            natural_language_input: input.to_string(),
            command: self.command,
            explanation: self.explanation,
            safety_level,
            warning,
        }
    }
}

impl CommandSuggestion {
    /// Replace the command with user-edited text. The edit may introduce
    /// a dangerous pattern, so the new text is always re-classified; the
    /// original model hint no longer applies.
    pub fn with_command(&self, edited: String, classifier: &Classifier) -> CommandSuggestion {
        let safety_level = classifier.classify(&edited, None);
        let warning = classifier.scan(&edited).map(|what| what.to_string());

        CommandSuggestion {
            natural_language_input: self.natural_language_input.clone(),
            command: edited,
            explanation: self.explanation.clone(),
            safety_level,
            warning,
        }
    }
}

/// Extract and validate the first JSON object in `raw`, tolerating the
/// prose and markdown fences models wrap around it.
pub fn parse(raw: &str) -> Result<ParsedResponse, ParseError> {
    let cleaned = strip_code_fences(raw);
    let value = extract_json_object(&cleaned).ok_or(ParseError::MissingJson)?;
    let obj = value.as_object().ok_or(ParseError::MissingJson)?;

    let command = match obj.get("command") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Err(ParseError::InvalidField("command")),
    };
    if command.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let explanation = match obj.get("explanation") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Err(ParseError::InvalidField("explanation")),
    };

    // A missing or unrecognized safety name is not fatal: the classifier
    // fails closed to CAUTION when no hint survives. A non-string value
    // is still a malformed response.
    let safety_hint = match obj.get("safety") {
        Some(Value::String(s)) => s.parse::<SafetyLevel>().ok(),
        Some(_) => return Err(ParseError::InvalidField("safety")),
        None => None,
    };

    let warning = match obj.get("warning") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };

    Ok(ParsedResponse {
        command,
        explanation,
        safety_hint,
        warning,
    })
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// Scan for the first balanced `{ ... }` region that parses as a JSON
/// object. Brace tracking is string-aware so prose braces or braces
/// inside JSON strings do not throw off the balance.
fn extract_json_object(raw: &str) -> Option<Value> {
    let bytes = raw.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = raw[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = find_balanced_end(bytes, start) {
            let candidate = &raw[start..=end];
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
        search_from = start + 1;
    }

    None
}

fn find_balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
