//! Plain-text rendering of an open thread.

use std::fmt::Write;

use ag_client::InteractionController;
use ag_core::Comment;
use chrono::{DateTime, Utc};

/// "just now", "5m ago", "3h ago", "2d ago", then a calendar date.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => then.format("%b %-d, %Y").to_string(),
    }
}

fn author(name: Option<&str>) -> &str {
    name.filter(|n| !n.is_empty()).unwrap_or("anonymous")
}

fn comment_line(out: &mut String, indent: &str, comment: &Comment, now: DateTime<Utc>) {
    let _ = writeln!(
        out,
        "{indent}[{}] {} · {} · ▲ {}",
        comment.id,
        author(comment.author_username.as_deref()),
        time_ago(comment.created_at, now),
        comment.upvotes
    );
    for line in comment.content.lines() {
        let _ = writeln!(out, "{indent}  {line}");
    }
}

pub fn render_thread(ctl: &InteractionController, now: DateTime<Utc>) -> String {
    let thread = ctl.thread();
    let post = ctl.post();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} › {}",
        thread.category_name.as_deref().unwrap_or("General"),
        thread.title
    );
    let _ = writeln!(
        out,
        "by {} · {} · {} views · {} replies\n",
        author(thread.author_username.as_deref()),
        time_ago(thread.created_at, now),
        thread.view_count,
        thread.reply_count
    );
    let _ = writeln!(out, "{}\n", post.content);
    let _ = writeln!(out, "▲ {} upvotes\n", post.upvotes);

    let count = ctl.comment_count();
    let _ = writeln!(out, "{count} {}", if count == 1 { "Reply" } else { "Replies" });

    let tree = ctl.tree();
    if tree.is_empty() {
        let _ = writeln!(out, "No replies yet. Be the first to respond.");
        return out;
    }
    for entry in tree.rendered() {
        comment_line(&mut out, "", entry.comment, now);
        for reply in entry.replies {
            comment_line(&mut out, "    ↳ ", reply, now);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
        assert_eq!(time_ago(now - Duration::days(30), now), "Sep 19, 2026");
        assert_eq!(time_ago(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn missing_author_is_anonymous() {
        assert_eq!(author(None), "anonymous");
        assert_eq!(author(Some("")), "anonymous");
        assert_eq!(author(Some("ana")), "ana");
    }
}
