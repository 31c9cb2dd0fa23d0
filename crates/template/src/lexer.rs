//! Tokenizer: splits template source into literal text and `{{ ... }}` tags.

/// A lexical token. Offsets are byte positions into the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Literal text between tags.
    Text(&'a str),
    /// A `{{ ... }}` tag. `raw` includes the braces, `inner` is trimmed.
    Tag {
        raw: &'a str,
        inner: &'a str,
        offset: usize,
    },
    /// A `{{` with no closing `}}`; everything from it to the end.
    Unterminated { raw: &'a str, offset: usize },
}

pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while !rest.is_empty() {
        let Some(open) = rest.find("{{") else {
            tokens.push(Token::Text(rest));
            break;
        };
        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }

        let tag_start = offset + open;
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let len = 2 + close + 2;
                tokens.push(Token::Tag {
                    raw: &rest[open..open + len],
                    inner: after_open[..close].trim(),
                    offset: tag_start,
                });
                rest = &rest[open + len..];
                offset = tag_start + len;
            }
            None => {
                tokens.push(Token::Unterminated {
                    raw: &rest[open..],
                    offset: tag_start,
                });
                break;
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_text_and_tags() {
        let tokens = tokenize("Hello {{ name }}!");
        assert_eq!(
            tokens,
            vec![
                Token::Text("Hello "),
                Token::Tag { raw: "{{ name }}", inner: "name", offset: 6 },
                Token::Text("!"),
            ]
        );
    }

    #[test]
    fn adjacent_tags_have_no_empty_text() {
        let tokens = tokenize("{{#each xs}}{{this}}{{/each}}");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Tag { inner: "this", offset: 12, .. }));
    }

    #[test]
    fn unterminated_tag_is_reported() {
        let tokens = tokenize("a {{b");
        assert_eq!(
            tokens,
            vec![Token::Text("a "), Token::Unterminated { raw: "{{b", offset: 2 }]
        );
    }

    #[test]
    fn condition_with_quotes_stays_in_one_tag() {
        let tokens = tokenize(r#"{{#if (eq status "done")}}"#);
        assert!(matches!(tokens[0], Token::Tag { inner: r#"#if (eq status "done")"#, .. }));
    }
}
