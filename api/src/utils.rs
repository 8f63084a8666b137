// replace placeholder in template with data
pub fn render_template(template: &str, data: &[(&str, &str)]) -> String {
    let mut result = String::from(template);

    for (placeholder, value) in data {
        result = result.replace(placeholder, value);
    }

    result
}

// escape text before it is put into html. Braces are escaped too so that the
// text can never form a template placeholder.
pub fn escape_html(text: &str) -> String {
    let mut s = String::with_capacity(text.len());
    for char in text.chars() {
        match char {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&#39;"),
            '{' => s.push_str("&#123;"),
            '}' => s.push_str("&#125;"),
            _ => s.push(char),
        }
    }
    s
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when
/// something was cut. Never splits a multi-byte character.
pub fn shorten_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", text[..byte_idx].trim_end()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_placeholders_are_replaced() {
        let res = render_template("<h1>{{title}}</h1>{{title}}", &[("{{title}}", "Bank")]);
        assert_eq!(res, "<h1>Bank</h1>Bank");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn escaped_text_cannot_form_placeholders() {
        let search = escape_html("{{rows}}");
        let res = render_template(
            "{{search}}|{{rows}}",
            &[("{{search}}", search.as_str()), ("{{rows}}", "ROWS")],
        );
        assert_eq!(res, "&#123;&#123;rows&#125;&#125;|ROWS");
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(shorten_text("  short  ", 75), "short");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "é".repeat(80);
        let short = shorten_text(&text, 75);
        assert_eq!(short, format!("{}...", "é".repeat(75)));
    }
}
