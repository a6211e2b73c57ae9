//! Text normalisation applied to email bodies before tokenisation.
//!
//! The rules must match the ones used when the vocabulary was built: a
//! mismatch does not fail, it silently maps more words to the unknown token.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "constant pattern cannot fail")]
    Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex")
});

/// Elements whose text never reaches the reader.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract the readable text of an HTML email body.
///
/// Text nodes under `<body>` are joined with single spaces so adjacent cells
/// or paragraphs do not fuse into one word. Markup, attribute values such as
/// link targets, and the contents of scripts and stylesheets are dropped.
///
/// # Examples
///
/// ```
/// use phish_nano::text::html_to_text;
///
/// let html = r#"<p>Verify your <a href="https://evil.example">account</a></p>"#;
/// assert_eq!(html_to_text(html), "Verify your account");
/// ```
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body) = document.tree.root().descendants().find(|node| {
        node.value()
            .as_element()
            .is_some_and(|element| element.name() == "body")
    }) else {
        return String::new();
    };
    body.descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| HIDDEN_TAGS.contains(&element.name()))
            })
        })
        .flat_map(|(_, text)| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase an email body, replace punctuation and symbols with spaces, and
/// collapse whitespace runs into single spaces.
///
/// # Examples
///
/// ```
/// use phish_nano::text::normalize_email;
///
/// assert_eq!(
///     normalize_email("URGENT: Verify your   account!!"),
///     "urgent verify your account"
/// );
/// ```
#[must_use]
pub fn normalize_email(input: &str) -> String {
    let lowered = input.to_lowercase();
    let spaced = NON_WORD.replace_all(&lowered, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
