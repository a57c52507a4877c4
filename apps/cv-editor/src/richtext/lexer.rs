//! Tokenizer for the HTML subset accepted by the rich-text converter.
//!
//! Logos builds the DFA at compile time. The token set covers every input
//! byte sequence: anything that is not markup is text, and a stray `<` is
//! emitted on its own so the parser can keep it as literal text.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// Comments, doctypes and CDATA-like declarations.
    #[regex(r"<![^>]*>")]
    Declaration,

    #[regex(r"<\?[^>]*>")]
    ProcessingInstruction,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[^>]*>", |lex| end_tag_name(lex.slice()))]
    EndTag(&'src str),

    /// Raw start tag including attributes, e.g. `<a href="x">`.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*[^>]*>", |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    #[token("<")]
    Lt,
}

fn end_tag_name(slice: &str) -> &str {
    let inner = slice.trim_start_matches("</");
    let end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(inner.len());
    &inner[..end]
}

/// A start tag broken into its name, attributes and self-closing flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

impl StartTag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Splits a raw start tag slice (`<name attr="v" ...>`) into its parts.
/// Tag and attribute names are lowercased; attribute values are entity-decoded.
pub fn parse_start_tag(raw: &str) -> StartTag {
    let inner = raw.strip_prefix('<').unwrap_or(raw);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let self_closing = inner.trim_end().ends_with('/');
    let inner = inner.trim_end().trim_end_matches('/');

    let name_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut rest = inner[name_end..].trim_start();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remainder) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    match body.find(quote) {
                        Some(close) => (&body[..close], &body[close + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rest = remainder.trim_start();
            decode_entities(value)
        } else {
            String::new()
        };

        // A lone `=` has no key; its value was consumed above.
        if !key.is_empty() {
            attributes.push((key, value));
        }
    }

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

/// Decodes the character references the serializer emits plus the common
/// named and numeric forms. Unknown references are kept verbatim.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(reference: &str) -> Option<char> {
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = reference.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
