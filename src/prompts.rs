// Prompt text sent to the completion provider

pub const SYSTEM_INSTRUCTIONS: &str =
    "You are a Linux expert. Always return valid JSON only, never markdown.";

const REQUEST_TEMPLATE: &str = r#"Convert this request into a Linux command. Respond ONLY with valid JSON, no markdown:

Request: "{request}"

{
  "command": "the shell command",
  "explanation": "what it does (1 sentence)",
  "safety": "safe|caution|dangerous",
  "warning": "optional note about side effects, omit if none"
}

Rules: Use common Linux tools. Prefer the safest variant. One line command."#;

pub fn build_request_prompt(natural_language: &str) -> String {
    REQUEST_TEMPLATE.replace("{request}", natural_language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_substituted() {
        let prompt = build_request_prompt("show disk usage");
        assert!(prompt.contains("Request: \"show disk usage\""));
        assert!(!prompt.contains("{request}"));
    }
}
