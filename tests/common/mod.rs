//! HTML fixtures shaped like the live listing markup.

#![allow(dead_code)]

/// A listing head whose active tab reports `count` inside its indicator.
/// `count` is raw text, so malformed indicators can be staged too.
pub fn listing_head(count: &str) -> String {
    format!(
        r#"<html><body>
        <ul class="fleft CommentTabs">
            <li class="is-active"><span>看过({count})</span></li>
            <li><span>想看(99)</span></li>
        </ul>
        </body></html>"#
    )
}

/// One page of `n` comment blocks, authors and bodies tagged so rows can be
/// traced back to the page that produced them.
pub fn comments_page(n: usize, tag: &str) -> String {
    let mut blocks = String::new();
    for i in 0..n {
        let extras = if i % 2 == 0 {
            format!(
                r#"<span class="rating" title="推荐"></span>
                <span class="comment-time" title="2024-05-0{} 12:00:00">t</span>"#,
                i % 9 + 1
            )
        } else {
            String::new()
        };
        blocks.push_str(&format!(
            r#"<div class="comment-item"><div class="comment">
                <h3><span class="comment-vote"><span class="votes">{i}</span></span>
                <span class="comment-info"><a href="/people/{tag}-{i}/">{tag}-{i}</a>{extras}</span></h3>
                <p><span class="short">comment {tag} {i}</span></p>
            </div></div>"#
        ));
    }
    format!(r#"<html><body><div id="comments">{blocks}</div></body></html>"#)
}
