//! Outbound message formatting

use crate::filter::Candidate;

/// Marker placed before the title
pub const TITLE_MARKER: &str = "📰";

/// Marker placed before the link
pub const LINK_MARKER: &str = "🔗";

/// Render a candidate as the plain-text chat message
///
/// ```
/// use newsrelay_core::Candidate;
/// use newsrelay_core::message::format_message;
///
/// let msg = format_message(&Candidate::new("NASA update", "https://a/3"));
/// assert_eq!(msg, "📰 NASA update\n\n🔗 https://a/3");
/// ```
pub fn format_message(candidate: &Candidate) -> String {
    format!(
        "{} {}\n\n{} {}",
        TITLE_MARKER, candidate.title, LINK_MARKER, candidate.link
    )
}
