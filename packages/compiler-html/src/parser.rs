//! Lenient HTML fragment parser
//!
//! Reads exported notes HTML (and reasonably well-formed legacy markup) back
//! into an [`HtmlNode`] tree. It never fails: stray `<` characters become
//! text, unmatched closing tags are ignored and unclosed elements are closed
//! at the end of input. Comments and doctype declarations are dropped.

use crate::dom::{HtmlElement, HtmlNode};
use crate::printer::is_self_closing;
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
enum Token<'src> {
    #[regex(r"<![^>]*>")]
    Declaration,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\n\r]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r#"<[a-zA-Z][a-zA-Z0-9-]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Parse an HTML fragment into nodes
pub fn parse_fragment(source: &str) -> Vec<HtmlNode> {
    let mut builder = TreeBuilder::default();
    let mut lex = Token::lexer(source);

    while let Some(token) = lex.next() {
        match token {
            Ok(Token::Declaration) => {}
            Ok(Token::Text(text)) => builder.text(decode_entities(text)),
            Ok(Token::CloseTag(slice)) => builder.close(&tag_name(&slice[2..])),
            Ok(Token::OpenTag(slice)) => {
                let (element, self_closing) = parse_open_tag(slice);
                if is_raw_text(&element.tag) {
                    let content = take_raw_text(lex.remainder(), &element.tag);
                    lex.bump(content.len());
                    let mut element = element;
                    if !content.is_empty() {
                        element.children.push(HtmlNode::Raw(content.to_string()));
                    }
                    builder.open(element);
                } else if self_closing || is_self_closing(&element.tag) {
                    builder.leaf(element);
                } else {
                    builder.open(element);
                }
            }
            Err(()) => builder.text(lex.slice().to_string()),
        }
    }

    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<HtmlNode>,
    stack: Vec<HtmlElement>,
}

impl TreeBuilder {
    fn siblings(&mut self) -> &mut Vec<HtmlNode> {
        match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let siblings = self.siblings();
        if let Some(HtmlNode::Text(previous)) = siblings.last_mut() {
            previous.push_str(&text);
        } else {
            siblings.push(HtmlNode::Text(text));
        }
    }

    fn leaf(&mut self, element: HtmlElement) {
        self.siblings().push(HtmlNode::Element(element));
    }

    fn open(&mut self, element: HtmlElement) {
        // A new <li> or <p> implicitly closes an open one
        if element.is("li") || element.is("p") {
            if let Some(current) = self.stack.last() {
                if current.is(&element.tag) {
                    self.pop();
                }
            }
        }
        self.stack.push(element);
    }

    fn close(&mut self, tag: &str) {
        if !self.stack.iter().any(|open| open.is(tag)) {
            return;
        }
        while let Some(open) = self.stack.last() {
            let done = open.is(tag);
            self.pop();
            if done {
                break;
            }
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.siblings().push(HtmlNode::Element(element));
        }
    }

    fn finish(mut self) -> Vec<HtmlNode> {
        while !self.stack.is_empty() {
            self.pop();
        }
        self.roots
    }
}

fn is_raw_text(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

/// Everything up to (not including) the matching `</tag`
fn take_raw_text<'a>(rest: &'a str, tag: &str) -> &'a str {
    let needle = format!("</{}", tag.to_ascii_lowercase());
    let lower = rest.to_ascii_lowercase();
    match lower.find(&needle) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

fn tag_name(raw: &str) -> String {
    raw.trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

/// Split `<tag a="1" b c='2'>` into an element; reports a trailing `/>`
fn parse_open_tag(slice: &str) -> (HtmlElement, bool) {
    let inner = &slice[1..slice.len() - 1];
    let self_closing = inner.trim_end().ends_with('/');
    let inner = inner.trim_end().trim_end_matches('/');

    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let mut element = HtmlElement::new(inner[..name_end].to_ascii_lowercase());

    let mut rest = &inner[name_end..];
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    match body.find(quote) {
                        Some(end) => (&body[..end], &body[end + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after_eq
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rest = remaining;
            decode_entities(value)
        } else {
            String::new()
        };

        if !name.is_empty() {
            element.set_attr(name, value);
        }
    }

    (element, self_closing)
}

/// Decode the character references the printer emits, plus numeric ones
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{print_html, PrintOptions};

    #[test]
    fn test_parses_nested_elements_and_attributes() {
        let nodes = parse_fragment(r#"<ul class="list"><li data-x='1' hidden>One <b>two</b></li></ul>"#);

        assert_eq!(nodes.len(), 1);
        let ul = nodes[0].as_element().unwrap();
        assert_eq!(ul.attr("class"), Some("list"));
        let li = ul.child_elements().next().unwrap();
        assert_eq!(li.attr("data-x"), Some("1"));
        assert_eq!(li.attr("hidden"), Some(""));
        assert_eq!(li.text_content(), "One two");
    }

    #[test]
    fn test_script_content_is_raw() {
        let nodes = parse_fragment(
            r#"<p>a</p><script type="application/lexical+json">{"t":"1 < 2 <b>"}</script>"#,
        );

        let script = nodes[1].as_element().unwrap();
        assert_eq!(script.children, vec![HtmlNode::Raw(r#"{"t":"1 < 2 <b>"}"#.to_string())]);
    }

    #[test]
    fn test_lenient_recovery() {
        let nodes = parse_fragment("<!DOCTYPE html><p>1 < 2</span><p>next");

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "1 < 2");
        assert_eq!(nodes[1].text_content(), "next");
    }

    #[test]
    fn test_entities_round_trip_through_printer() {
        let source = r#"<p title="&quot;x&quot; &amp; y">a &lt;b&gt; &#169; &#x263A;</p>"#;
        let nodes = parse_fragment(source);
        let p = nodes[0].as_element().unwrap();

        assert_eq!(p.attr("title"), Some("\"x\" & y"));
        assert_eq!(p.text_content(), "a <b> \u{a9} \u{263a}");

        let printed = print_html(&nodes, &PrintOptions::default());
        assert_eq!(parse_fragment(&printed), nodes);
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_fragment(r#"<p>a<br>b<input type="checkbox" disabled />c</p>"#);
        let p = nodes[0].as_element().unwrap();

        assert_eq!(p.children.len(), 5);
        assert_eq!(p.child_elements().count(), 2);
    }
}
