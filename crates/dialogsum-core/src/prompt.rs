//! Prompt rendering.
//!
//! Turns a dialog plus a [`PromptConfig`] into the single prompt string sent
//! to the provider. Deterministic and total: there is no failure path.

use crate::types::{Dialog, PromptConfig};

/// Speaker label used when a message has no sender.
const UNKNOWN_SPEAKER: &str = "UNK";

/// Build the full prompt for one dialog.
///
/// Layout: system instruction, a `Rules:` section with one `- ` bullet per
/// rule, a `Dialog:` section with one line per non-empty message, and the
/// output instruction. The whole result is trimmed.
pub fn build_prompt(dialog: &Dialog, prompt: &PromptConfig) -> String {
    let rules_text = prompt
        .rules
        .iter()
        .map(|rule| format!("- {rule}"))
        .collect::<Vec<_>>()
        .join("\n");

    let dialog_text = dialog
        .messages
        .iter()
        .filter(|msg| !msg.text.is_empty())
        .map(|msg| format_message(msg.sender.as_deref(), &msg.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nRules:\n{}\n\nDialog:\n{}\n\n{}",
        prompt.system_instruction, rules_text, dialog_text, prompt.output_instruction
    )
    .trim()
    .to_owned()
}

/// Format one dialog line as `[<speaker>] <text>` with line endings
/// normalized to `\n` and surrounding whitespace stripped.
fn format_message(sender: Option<&str>, text: &str) -> String {
    let speaker = match sender {
        Some(s) if !s.is_empty() => s,
        _ => UNKNOWN_SPEAKER,
    };
    let cleaned = text.replace("\r\n", "\n").replace('\r', "\n");
    format!("[{speaker}] {}", cleaned.trim())
}
