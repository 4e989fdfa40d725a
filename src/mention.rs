use std::sync::OnceLock;

use regex::Regex;

/// Link label used when a mention carries no trailing comment.
pub const EMPTY_COMMENT_LABEL: &str = "LINK";

/// A parsed peer-recognition mention: who got the like, and what was said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub recipient: String,
    pub comment: String,
}

/// The micro-syntax: the literal token `like`, whitespace, a `<@U...>` user
/// reference, whitespace, then the comment to the end of the line. First
/// match wins; a message carries at most one mention no matter how many
/// `like` tokens it contains.
fn like_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"like\s+<@(U\w+?)>\s+(.*)").unwrap())
}

/// Cheap pre-check used by the message filter.
pub fn matches(text: &str) -> bool {
    like_pattern().is_match(text)
}

/// Extract the mention, if the text carries one.
///
/// The recipient is the bare user id with the `<@...>` decoration stripped.
/// The comment is the trailing capture verbatim, or [`EMPTY_COMMENT_LABEL`]
/// when nothing follows the reference.
pub fn parse(text: &str) -> Option<Mention> {
    let caps = like_pattern().captures(text)?;
    let recipient = caps.get(1)?.as_str().to_string();
    let trailing = caps.get(2).map_or("", |m| m.as_str());
    let comment = if trailing.is_empty() {
        EMPTY_COMMENT_LABEL.to_string()
    } else {
        trailing.to_string()
    };
    Some(Mention { recipient, comment })
}

/// Archive permalink in Slack mrkdwn form:
/// `<{base}/{channel}/p{ts}|{label}>`, with the decimal point stripped from
/// the timestamp.
pub fn archive_link(archive_url: &str, channel_name: &str, ts: &str, label: &str) -> String {
    format!(
        "<{}/{}/p{}|{}>",
        archive_url.trim_end_matches('/'),
        channel_name,
        ts.replace('.', ""),
        label
    )
}
