//! The only module that knows the listing markup. Everything else handles
//! opaque HTML strings and `Comment` values.

use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::{Error, Result};

/// Sentinel written when a comment carries no star rating.
pub const NO_RATING: &str = "no rating";
/// Sentinel written when the comment time cannot be located.
pub const UNKNOWN_TIME: &str = "unknown";

/// One extracted comment row, tagged with the label of the mode that found
/// it. Immutable once produced; ownership moves to the sink on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub mode: String,
    pub author: String,
    pub rating: Option<String>,
    pub posted_at: Option<String>,
    pub votes: u32,
    pub body: String,
}

impl Comment {
    /// The CSV rendering; `None` fields degrade to their sentinels here.
    pub(crate) fn as_row(&self) -> [String; 6] {
        [
            self.mode.clone(),
            self.author.clone(),
            self.rating.clone().unwrap_or_else(|| NO_RATING.into()),
            self.posted_at.clone().unwrap_or_else(|| UNKNOWN_TIME.into()),
            self.votes.to_string(),
            self.body.clone(),
        ]
    }
}

/// Parses one listing page off the async runtime and returns its comments.
/// The only error here is a selector that fails to compile; a page that
/// matches nothing is an empty `Vec`, not a failure.
pub(crate) async fn parse_page(html: String, mode_label: &str) -> Result<Vec<Comment>> {
    let mode_label = mode_label.to_owned();
    spawn_blocking(move || extract_comments(&html, &mode_label)).await?
}

/// Walks every comment block on the page. A block missing its author or body
/// is structurally not a comment and is skipped; a missing rating or time
/// degrades to `None`, a missing or garbled vote count to 0. One bad block
/// never discards the rest of the page.
pub(crate) fn extract_comments(html: &str, mode_label: &str) -> Result<Vec<Comment>> {
    let doc = Html::parse_document(html);

    let comment_selector = create_selector("div.comment")?;
    let author_selector = create_selector("span.comment-info a")?;
    let rating_selector = create_selector("span.rating")?;
    let time_selector = create_selector("span.comment-time")?;
    let votes_selector = create_selector("span.votes")?;
    let body_selector = create_selector("span.short")?;

    // A full page holds 20 comments.
    let mut comments = Vec::with_capacity(20);
    for block in doc.select(&comment_selector) {
        let Some(author) = select_text(block, &author_selector) else {
            continue;
        };
        let Some(body) = select_text(block, &body_selector) else {
            continue;
        };

        let rating = block
            .select(&rating_selector)
            .next()
            .and_then(|el| el.value().attr("title"))
            .map(|title| title.trim().to_owned());
        let posted_at = block
            .select(&time_selector)
            .next()
            .and_then(|el| el.value().attr("title"))
            .map(|title| title.trim().to_owned());
        let votes = select_text(block, &votes_selector)
            .and_then(|text| text.parse().ok())
            .unwrap_or(0);

        comments.push(Comment {
            mode: mode_label.to_owned(),
            author,
            rating,
            posted_at,
            votes,
            body,
        });
    }
    Ok(comments)
}

/// Reads the comment-count indicator off a listing head, e.g. `看过(137163)`
/// inside the active tab. An absent indicator or one without digits is
/// malformed.
pub(crate) fn extract_total(html: &str) -> Result<u64> {
    let doc = Html::parse_document(html);
    let indicator_selector = create_selector("li.is-active span")?;

    let text = doc
        .select(&indicator_selector)
        .next()
        .map(collect_text)
        .ok_or_else(|| Error::MalformedSummary(String::new()))?;

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|_| Error::MalformedSummary(text.clone()))
}

/// First match's trimmed text, `None` when the selector matches nothing or
/// only whitespace.
fn select_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = block.select(selector).next()?;
    let text = collect_text(el);
    (!text.is_empty()).then_some(text)
}

fn collect_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
