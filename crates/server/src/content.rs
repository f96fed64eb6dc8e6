//! Script loading, language detection, and markdown rendering.

use std::fs;
use std::io;
use std::path::Path;

use pulldown_cmark::{Parser, html};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Reads a script and returns it rendered as an HTML document holding a
/// fenced code block tagged with the detected language.
pub(crate) fn render_script(
    syntaxes: &SyntaxSet,
    path: &Path,
) -> io::Result<String> {
    let (language, code) = load_script(syntaxes, path)?;
    Ok(render_markdown(&wrap_content(&code, &language)))
}

/// Reads the file and detects its language tag.
///
/// Filename-based lookup runs first. When it yields nothing, the
/// content itself is the only remaining signal, so the fallback branch
/// must read the file before guessing from its first line.
fn load_script(
    syntaxes: &SyntaxSet,
    path: &Path,
) -> io::Result<(String, String)> {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| syntaxes.find_syntax_by_extension(ext));
    match by_extension {
        Some(syntax) => {
            let code = fs::read_to_string(path)?;
            Ok((language_tag(syntax), code))
        }
        None => {
            warn!(path = %path.display(), "no syntax for file name, guessing from content");
            let code = fs::read_to_string(path)?;
            let language = syntaxes
                .find_syntax_by_first_line(&code)
                .map(language_tag)
                .unwrap_or_else(|| "text".to_owned());
            Ok((language, code))
        }
    }
}

fn language_tag(syntax: &SyntaxReference) -> String {
    if syntax.name == "Plain Text" {
        "text".to_owned()
    } else {
        syntax.name.to_ascii_lowercase()
    }
}

/// Wraps raw code in a fenced block whose info string carries the
/// language tag in curly braces, the wire format the client's prompts
/// were written against.
fn wrap_content(content: &str, language: &str) -> String {
    format!("```{{{language}}}\n{content}\n```")
}

fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);
    rendered
}

/// Formats a byte count as the size-report string. The division is
/// exact; no rounding is applied beyond f64 representation.
pub(crate) fn format_file_size(len: u64) -> String {
    format!("File size: {} MB", len as f64 / 1_048_576.0)
}
