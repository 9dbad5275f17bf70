use std::sync::OnceLock;

use regex::Regex;

/// Name of the cookie Django uses for the CSRF secret.
pub const CSRF_COOKIE: &str = "csrftoken";

fn hidden_input_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<input\b[^>]*\bname\s*=\s*["']csrfmiddlewaretoken["'][^>]*>"#)
            .expect("hidden input pattern is valid")
    })
}

fn meta_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<meta\b[^>]*\bname\s*=\s*["']csrf-token["'][^>]*>"#)
            .expect("meta pattern is valid")
    })
}

fn value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bvalue\s*=\s*["']([^"']*)["']"#).expect("value pattern is valid")
    })
}

fn content_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("content pattern is valid")
    })
}

/// First non-empty capture of `attribute` (one of the patterns above) inside `tag`.
fn attribute_value<'a>(tag: &'a str, attribute: &Regex) -> Option<&'a str> {
    attribute
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|value| !value.is_empty())
}

/// Find the CSRF token in a rendered page: the hidden form field first, then the meta tag.
pub fn extract_from_html(html: &str) -> Option<String> {
    if let Some(tag) = hidden_input_regex().find(html) {
        if let Some(value) = attribute_value(tag.as_str(), value_regex()) {
            return Some(value.to_string());
        }
    }

    meta_regex()
        .find(html)
        .and_then(|tag| attribute_value(tag.as_str(), content_regex()))
        .map(str::to_string)
}

/// Pull the `csrftoken` value out of a `Cookie` header string (`a=1; b=2`).
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_hidden_form_field_regardless_of_attribute_order() {
        let html = r#"<form><input value="tok-1" type="hidden" name="csrfmiddlewaretoken"></form>"#;
        assert_eq!(extract_from_html(html).as_deref(), Some("tok-1"));
    }

    #[test]
    fn falls_back_to_meta_tag() {
        let html = r#"<head><meta name="csrf-token" content="tok-2"></head><body></body>"#;
        assert_eq!(extract_from_html(html).as_deref(), Some("tok-2"));
    }

    #[test]
    fn hidden_field_wins_over_meta() {
        let html = r#"<meta name='csrf-token' content='meta'>
            <input type='hidden' name='csrfmiddlewaretoken' value='field'>"#;
        assert_eq!(extract_from_html(html).as_deref(), Some("field"));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(extract_from_html("<html><body>login</body></html>"), None);
        assert_eq!(
            extract_from_html(r#"<input name="csrfmiddlewaretoken" value="">"#),
            None
        );
    }

    #[test]
    fn attribute_patterns_are_compiled_once() {
        assert!(std::ptr::eq(value_regex(), value_regex()));
        assert!(std::ptr::eq(content_regex(), content_regex()));

        let first = extract_from_html(r#"<input name="csrfmiddlewaretoken" value="a">"#);
        let second = extract_from_html(r#"<input name="csrfmiddlewaretoken" value="b">"#);
        assert_eq!((first.as_deref(), second.as_deref()), (Some("a"), Some("b")));
    }

    #[test]
    fn reads_cookie_header() {
        assert_eq!(
            token_from_cookie_header("sessionid=s; csrftoken=abc; theme=dark").as_deref(),
            Some("abc")
        );
        assert_eq!(token_from_cookie_header("sessionid=s"), None);
    }
}
