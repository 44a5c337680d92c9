//! Reply formatting helpers.
//!
//! The completion model tends to emit `* item` bullet lines. The chat
//! client renders HTML fragments, so consecutive bullet lines are
//! rewritten into one `<ul>` block. This is line-oriented on purpose:
//! nested lists, numbered lists, and inline emphasis pass through
//! untouched.

/// Rewrite asterisk bullet runs into list markup.
///
/// A run opens at the first `* ` line and closes at the first
/// non-bullet line or at end of input. Text without bullet lines is
/// returned unchanged.
pub fn format_bullets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_list = false;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if let Some(item) = trimmed.strip_prefix("* ") {
            if !in_list {
                out.push_str("<ul>\n");
                in_list = true;
            }
            out.push_str("<li>");
            out.push_str(item.trim_end());
            out.push_str("</li>\n");
        } else {
            if in_list {
                out.push_str("</ul>\n");
                in_list = false;
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    if in_list {
        out.push_str("</ul>\n");
    }

    // lines() drops the final newline; only keep ours when the input had one.
    if !text.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }

    out
}

/// Wrap reply text in the fragment shell the chat client expects.
pub fn wrap_ai_response(text: &str) -> String {
    format!(
        "<div class=\"ai-response\" style=\"text-align: justify; line-height: 1.6;\"><p>{}</p></div>",
        text
    )
}

/// Render curated knowledge sections, each under its own heading.
pub fn knowledge_reply(sections: &[crate::knowledge::Section]) -> String {
    let mut body = String::new();
    for section in sections {
        body.push_str(&format!(
            "<h4>{}</h4><pre class=\"info-block\">{}</pre>",
            section.title, section.body
        ));
    }
    format!("<div class=\"ai-response\">{}</div>", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bullets_unchanged() {
        let text = "Just a plain answer.\nWith two lines.";
        assert_eq!(format_bullets(text), text);
    }

    #[test]
    fn test_single_run() {
        let text = "Requirements:\n* valid ID\n* proof of residency\nBring both.";
        let formatted = format_bullets(text);
        assert_eq!(
            formatted,
            "Requirements:\n<ul>\n<li>valid ID</li>\n<li>proof of residency</li>\n</ul>\nBring both."
        );
    }

    #[test]
    fn test_run_at_end_is_closed() {
        let text = "You will need:\n* valid ID\n* barangay stub";
        let formatted = format_bullets(text);
        assert!(formatted.ends_with("</ul>"));
        assert_eq!(formatted.matches("<li>").count(), 2);
    }

    #[test]
    fn test_two_separate_runs() {
        let text = "* a\nmiddle\n* b\n* c\n";
        let formatted = format_bullets(text);
        assert_eq!(formatted.matches("<ul>").count(), 2);
        assert_eq!(formatted.matches("</ul>").count(), 2);
    }

    #[test]
    fn test_indented_bullets_join_run() {
        let text = "  * one\n  * two";
        let formatted = format_bullets(text);
        assert_eq!(formatted.matches("<ul>").count(), 1);
        assert!(formatted.contains("<li>one</li>"));
    }

    #[test]
    fn test_wrap_fragment() {
        let wrapped = wrap_ai_response("hello");
        assert!(wrapped.starts_with("<div class=\"ai-response\""));
        assert!(wrapped.contains("<p>hello</p>"));
    }

    #[test]
    fn test_knowledge_reply_has_one_heading_per_section() {
        let sections = crate::knowledge::relevant_sections("the Kagawad and the population");
        let reply = knowledge_reply(&sections);
        assert!(reply.contains("<h4>Officials</h4>"));
        assert!(reply.contains("<h4>Population</h4>"));
        assert_eq!(reply.matches("<h4>").count(), sections.len());
    }
}
