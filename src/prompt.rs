//! Brace-delimited prompt templates.
//!
//! Prompts handed to a [`crate::CompletionProvider`] are templates: `{name}`
//! is a placeholder, `{{` and `}}` stand for literal braces. Any text produced
//! by a model (or typed by a user) must go through [`escape_braces`] before it
//! becomes part of a template, otherwise its braces are read as placeholders.
//!
//! ```
//! use llm_compare::prompt::{PromptTemplate, escape_braces};
//!
//! let answer = "fn main() {}";
//! let template = PromptTemplate::new(format!("Review this: {}", escape_braces(answer)));
//! assert_eq!(template.render(&[]).unwrap(), "Review this: fn main() {}");
//! ```

use serde_json::Value;

use crate::core::{CompletionResult, LlmError};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant";

pub const DEFAULT_USER_PROMPT: &str =
    "What is AI and how can AI be used to improve the world? Limit your response to 250 words.";

/// System prompt for the judging model. `{user_prompt}` receives the prompt both models answered.
pub const COMPARATOR_SYSTEM_TEMPLATE: &str = "You are an expert in large language models. \
Please compare the performance of the two models step by step and qualitatively based on the \
prompt, response generated and response metadata that includes token utilisation and speed. \
Then provide a detailed analysis of the performance of each model based on relevance, adherence \
to the prompt, token performance. Limit your responses to 250 words. \n\n\
Prompt for response generation from LLMs: \n{user_prompt}.\n\n";

const COMPARISON_LEAD_IN: &str = "Following are the responses from the two models. \n";

/// Double every brace so the text renders back to itself.
pub fn escape_braces(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => escaped.push_str("{{"),
            '}' => escaped.push_str("}}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

enum Segment<'a> {
    Text(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Template that renders to `text` exactly.
    pub fn literal(text: &str) -> Self {
        Self::new(escape_braces(text))
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> Result<Vec<String>, LlmError> {
        Ok(self
            .segments()?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.to_string()),
                _ => None,
            })
            .collect())
    }

    /// Substitute `vars` into the template.
    ///
    /// Values are inserted verbatim; braces inside them are not interpreted.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, LlmError> {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in self.segments()? {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Brace(c) => rendered.push(c),
                Segment::Placeholder(name) => {
                    let value = vars
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            LlmError::Templating(format!(
                                "No value for placeholder `{{{name}}}`; escape literal braces as `{{{{` and `}}}}`"
                            ))
                        })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }

    fn segments(&self) -> Result<Vec<Segment<'_>>, LlmError> {
        let source = self.source.as_str();
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                    segments.push(Segment::Text(&source[text_start..i]));
                    segments.push(Segment::Brace(bytes[i] as char));
                    i += 2;
                    text_start = i;
                }
                b'{' => {
                    let close = source[i + 1..].find(['{', '}']).map(|offset| i + 1 + offset);
                    let end = match close {
                        Some(end) if bytes[end] == b'}' => end,
                        _ => {
                            return Err(LlmError::Templating(format!(
                                "Unterminated `{{` at byte {i}"
                            )));
                        }
                    };
                    let name = source[i + 1..end].trim();
                    if name.is_empty() {
                        return Err(LlmError::Templating(format!(
                            "Empty placeholder at byte {i}"
                        )));
                    }
                    segments.push(Segment::Text(&source[text_start..i]));
                    segments.push(Segment::Placeholder(name));
                    i = end + 1;
                    text_start = i;
                }
                b'}' => {
                    return Err(LlmError::Templating(format!(
                        "Single `}}` at byte {i}; literal braces must be doubled"
                    )));
                }
                _ => i += 1,
            }
        }
        segments.push(Segment::Text(&source[text_start..]));

        Ok(segments)
    }
}

/// A completion tagged with the display name of the model that produced it.
#[derive(Debug, Clone, Copy)]
pub struct LabeledResponse<'a> {
    pub position: usize,
    pub label: &'a str,
    pub result: &'a CompletionResult,
}

impl LabeledResponse<'_> {
    fn section(&self) -> String {
        let metadata = Value::Object(self.result.response_metadata.clone());
        format!(
            "## Response from Model {n} [{label}]:\n {content}\n\
             ## Metadata from Model {n} [{label}]:\n {metadata} \n",
            n = self.position,
            label = self.label,
            content = self.result.content,
        )
    }
}

/// User prompt for the comparator call.
///
/// Returns a template: both responses and their metadata are escaped after
/// concatenation, so rendering it with no variables yields the raw text.
pub fn build_comparison_prompt(first: &LabeledResponse<'_>, second: &LabeledResponse<'_>) -> String {
    let combined = format!("{}{}", first.section(), second.section());
    format!("{COMPARISON_LEAD_IN}{}", escape_braces(&combined))
}

/// System prompt for the comparator call, still in template form.
///
/// `template` follows the usual rules (literal braces doubled); the filled-in
/// result is escaped as a whole so it renders back to the exact text.
pub fn comparator_system_prompt(template: &str, user_prompt: &str) -> Result<String, LlmError> {
    let filled = PromptTemplate::new(template).render(&[("user_prompt", user_prompt)])?;
    Ok(escape_braces(&filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(content: &str, metadata: Value) -> CompletionResult {
        CompletionResult {
            content: content.to_string(),
            response_metadata: metadata.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn escape_doubles_both_braces() {
        assert_eq!(escape_braces("{weird}"), "{{weird}}");
        assert_eq!(escape_braces("a}{b"), "a}}{{b");
        assert_eq!(escape_braces("no braces"), "no braces");
    }

    #[test]
    fn escaped_text_survives_substitution_next_to_placeholders() {
        let samples = ["{weird}", "}{", "{{already doubled}}", "fn f() { x }", "{", "}"];

        for sample in samples {
            let template = PromptTemplate::new(format!(
                "Q: {{question}}\nA: {}",
                escape_braces(sample)
            ));
            let rendered = template.render(&[("question", "why?")]).unwrap();
            assert_eq!(rendered, format!("Q: why?\nA: {sample}"));
        }
    }

    #[test]
    fn values_are_not_reinterpreted() {
        let template = PromptTemplate::new("say {x}");
        assert_eq!(template.render(&[("x", "{y}")]).unwrap(), "say {y}");
    }

    #[test]
    fn unescaped_model_output_is_a_templating_error() {
        let template = PromptTemplate::new("Response: {weird}");
        match template.render(&[]) {
            Err(LlmError::Templating(message)) => assert!(message.contains("weird")),
            other => panic!("Expected Templating error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for source in ["open { only", "close } only", "empty {} slot", "nested {a{b}}"] {
            match PromptTemplate::new(source).render(&[("a", "1"), ("b", "2")]) {
                Err(LlmError::Templating(_)) => (),
                other => panic!("Expected Templating error for {source:?}, got {:?}", other),
            }
        }
    }

    #[test]
    fn placeholders_are_listed_in_order() {
        let template = PromptTemplate::new("{a} {{not}} { b }");
        assert_eq!(template.placeholders().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn literal_renders_to_itself() {
        let text = "json: {\"k\": [1, 2]}";
        assert_eq!(PromptTemplate::literal(text).render(&[]).unwrap(), text);
    }

    #[test]
    fn comparison_prompt_is_escaped_and_labeled() {
        let first = result("{weird}", json!({ "tokens": 2 }));
        let second = result("plain", json!({}));

        let prompt = build_comparison_prompt(
            &LabeledResponse {
                position: 1,
                label: "LLaMA 8B",
                result: &first,
            },
            &LabeledResponse {
                position: 2,
                label: "Gemma 7B IT",
                result: &second,
            },
        );

        assert!(prompt.starts_with("Following are the responses from the two models."));
        assert!(prompt.contains("## Response from Model 1 [LLaMA 8B]:\n {{weird}}\n"));
        assert!(prompt.contains("## Metadata from Model 1 [LLaMA 8B]:\n {{\"tokens\":2}}"));
        assert!(prompt.contains("## Response from Model 2 [Gemma 7B IT]:\n plain\n"));

        let rendered = PromptTemplate::new(prompt).render(&[]).unwrap();
        assert!(rendered.contains(" {weird}\n"));
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("{\"tokens\":2}"));
    }

    #[test]
    fn comparator_system_prompt_keeps_user_braces_literal() {
        let system = comparator_system_prompt(COMPARATOR_SYSTEM_TEMPLATE, "Explain {x}").unwrap();
        assert!(system.contains("Explain {{x}}."));

        let rendered = PromptTemplate::new(system).render(&[]).unwrap();
        assert!(rendered.contains("Prompt for response generation from LLMs: \nExplain {x}.\n\n"));
    }

    #[test]
    fn comparator_template_with_literal_braces_renders_once_more() {
        let template = "Answer as JSON like {{\"winner\": 1}}. Prompt: {user_prompt}";

        let system = comparator_system_prompt(template, "Say {hi}").unwrap();
        let rendered = PromptTemplate::new(system).render(&[]).unwrap();

        assert_eq!(rendered, "Answer as JSON like {\"winner\": 1}. Prompt: Say {hi}");
    }

    #[test]
    fn comparator_template_without_slot_value_is_rejected() {
        match comparator_system_prompt("Judge {missing}", "Say hi") {
            Err(LlmError::Templating(_)) => (),
            other => panic!("Expected Templating error, got {:?}", other),
        }
    }
}
