//! The fixed instruction blocks of the two-round conversation.
//!
//! The workflow is hardcoded to exactly this prompt pair: one block
//! establishing the memory-estimation persona, one demanding the file
//! enumeration, and one demanding the final estimate. Tool results are
//! substituted into the blocks before they are appended to the
//! conversation.

const PERSONA: &str = include_str!("prompts/persona.md");
const DISCOVERY: &str = include_str!("prompts/discovery.md");
const ESTIMATE: &str = include_str!("prompts/estimate.md");

/// Builds the opening user message: the raw query followed by the
/// persona and available-tools description.
pub(crate) fn initial_message(query: &str) -> String {
    format!("{query}\n{PERSONA}")
}

/// Builds the assistant message that carries the rendered script and
/// asks for the list of referenced files.
pub(crate) fn discovery_message(script_contents: &str) -> String {
    DISCOVERY.replace("{{SCRIPT_CONTENTS}}", script_contents)
}

/// Builds the assistant message that carries the collected size map and
/// asks for the final estimate.
pub(crate) fn estimate_message(file_sizes: &str) -> String {
    ESTIMATE.replace("{{FILE_SIZES}}", file_sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let message = discovery_message("<pre>code</pre>");
        assert!(message.contains("<pre>code</pre>"));
        assert!(!message.contains("{{SCRIPT_CONTENTS}}"));

        let message = estimate_message("{\"a.py\": \"File size: 1 MB\"}");
        assert!(message.contains("File size: 1 MB"));
        assert!(!message.contains("{{FILE_SIZES}}"));
    }

    #[test]
    fn test_initial_message_keeps_query_first() {
        let message = initial_message("how much memory does train.py need?");
        assert!(
            message.starts_with("how much memory does train.py need?\n")
        );
        assert!(message.contains("get_file_size"));
    }
}
