//! Minimal filename template renderer.
//!
//! Tokens are written `{Name}` or `{Name:width}` (zero padded). A `[...]`
//! section is only rendered for multi-episode units. Unknown tokens are kept
//! verbatim.

/// Values available to a template.
pub trait TokenSource {
    /// Text for `token`, or `None` when the token is unknown.
    fn token(&self, token: &str, width: Option<usize>) -> Option<String>;

    /// Whether `[...]` sections are rendered.
    fn is_multi(&self) -> bool;
}

/// Renders `template` against `source`.
pub fn render(template: &str, source: &dyn TokenSource) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' => {
                let Some(end) = template[start..].find('}').map(|e| start + e) else {
                    out.push_str(&template[start..]);
                    break;
                };
                out.push_str(&expand(&template[start + 1..end], source));
                while chars.peek().is_some_and(|(i, _)| *i <= end) {
                    chars.next();
                }
            }
            '[' => {
                let Some(end) = template[start..].find(']').map(|e| start + e) else {
                    out.push_str(&template[start..]);
                    break;
                };
                if source.is_multi() {
                    out.push_str(&render(&template[start + 1..end], source));
                }
                while chars.peek().is_some_and(|(i, _)| *i <= end) {
                    chars.next();
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn expand(body: &str, source: &dyn TokenSource) -> String {
    let (name, width) = match body.split_once(':') {
        Some((name, width)) => (name, width.parse::<usize>().ok()),
        None => (body, None),
    };
    source
        .token(name, width)
        .unwrap_or_else(|| format!("{{{}}}", body))
}

/// Zero-pads `value` to `width` digits.
pub fn pad(value: u32, width: Option<usize>) -> String {
    format!("{:0width$}", value, width = width.unwrap_or(1))
}

/// Removes characters that are invalid in file names and tidies whitespace.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        multi: bool,
    }

    impl TokenSource for Fixed {
        fn token(&self, token: &str, width: Option<usize>) -> Option<String> {
            match token {
                "Show" => Some("Foo".to_string()),
                "N" => Some(pad(5, width)),
                "M" => Some(pad(6, width)),
                _ => None,
            }
        }

        fn is_multi(&self) -> bool {
            self.multi
        }
    }

    #[test]
    fn test_render_tokens_and_padding() {
        let single = Fixed { multi: false };
        assert_eq!(render("{Show} - E{N:2}", &single), "Foo - E05");
        assert_eq!(render("{Show} {N}", &single), "Foo 5");
    }

    #[test]
    fn test_render_optional_section() {
        let template = "{Show} E{N:2}[-E{M:2}]";
        assert_eq!(render(template, &Fixed { multi: false }), "Foo E05");
        assert_eq!(render(template, &Fixed { multi: true }), "Foo E05-E06");
    }

    #[test]
    fn test_render_unknown_and_unclosed() {
        let single = Fixed { multi: false };
        assert_eq!(render("{Nope} x", &single), "{Nope} x");
        assert_eq!(render("x {Show", &single), "x {Show");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("What? Now: \"Yes\"/No*"), "What Now YesNo");
        assert_eq!(sanitize("Trailing dots..."), "Trailing dots");
        assert_eq!(sanitize("a  <b>  c"), "a b c");
    }
}
