//! Candidate document extraction from raw model responses
//!
//! Models wrap the document in prose, markdown fences, or both. Extraction is
//! deliberately shallow: find the document-shaped text and hand it to the
//! validator untouched. Parsing belongs to the validator.
//!
//! Search order:
//! 1. a fenced block tagged `yaml` or `yml`
//! 2. any other fenced block whose body starts a top-level `spec:`/`project:` key
//! 3. the raw response from its first top-level `spec:`/`project:` line onward

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*([A-Za-z0-9_+-]*)[^\n]*\n(.*?)^[ \t]*```")
        .expect("static regex")
});

static DOCUMENT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:spec|project)[ \t]*:").expect("static regex"));

/// Why no candidate could be pulled out of a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Model returned an empty response")]
    Empty,

    #[error(
        "No document found in model response: expected a fenced yaml block or a top-level 'spec:' key"
    )]
    NoDocument,
}

/// Pull the candidate document out of a model response.
///
/// # Errors
///
/// - `ExtractionError::Empty` if the response is blank
/// - `ExtractionError::NoDocument` if nothing document-shaped was found
///
/// ```rust
/// use evospec_extraction::extract_document;
///
/// let response = "Here you go:\n```yaml\nspec: evospec/v1\n```\nEnjoy.";
/// assert_eq!(extract_document(response).unwrap(), "spec: evospec/v1");
/// ```
pub fn extract_document(response: &str) -> Result<String, ExtractionError> {
    if response.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    let blocks: Vec<(&str, &str)> = FENCED_BLOCK
        .captures_iter(response)
        .filter_map(|caps| {
            let lang = caps.get(1).map_or("", |m| m.as_str());
            let body = clean(caps.get(2)?.as_str());
            (!body.is_empty()).then_some((lang, body))
        })
        .collect();

    if let Some((_, body)) = blocks
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case("yaml") || lang.eq_ignore_ascii_case("yml"))
    {
        return Ok((*body).to_string());
    }

    if let Some((_, body)) = blocks.iter().find(|(_, body)| looks_like_document(body)) {
        return Ok((*body).to_string());
    }

    DOCUMENT_KEY
        .find(response)
        .map(|m| clean(strip_trailing_fence(&response[m.start()..])).to_string())
        .filter(|doc| !doc.is_empty())
        .ok_or(ExtractionError::NoDocument)
}

/// True when `text` contains a top-level `spec:` or `project:` key
#[must_use]
pub fn looks_like_document(text: &str) -> bool {
    DOCUMENT_KEY.is_match(text)
}

fn clean(body: &str) -> &str {
    body.trim_start_matches(['\n', '\r']).trim_end()
}

// An unterminated response can still end in a closing fence with no opener.
fn strip_trailing_fence(text: &str) -> &str {
    let trimmed = text.trim_end();
    trimmed.strip_suffix("```").unwrap_or(trimmed)
}
