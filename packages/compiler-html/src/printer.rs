use crate::dom::{HtmlElement, HtmlNode};

/// Options for printing an HTML tree
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Put block elements on their own lines
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a PrintOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a PrintOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Print nodes to an HTML string
pub fn print_html(nodes: &[HtmlNode], options: &PrintOptions) -> String {
    let mut ctx = Context::new(options);
    let block_layout = options.pretty && nodes.iter().all(is_block_node);

    for node in nodes {
        if block_layout {
            ctx.add_indent();
        }
        print_node(node, &mut ctx);
        if block_layout {
            ctx.newline();
        }
    }

    ctx.get_output()
}

fn print_node(node: &HtmlNode, ctx: &mut Context) {
    match node {
        HtmlNode::Element(element) => print_element(element, ctx),
        HtmlNode::Text(text) => ctx.add(&escape_text(text)),
        HtmlNode::Raw(raw) => ctx.add(raw),
    }
}

fn print_element(element: &HtmlElement, ctx: &mut Context) {
    ctx.add("<");
    ctx.add(&element.tag);
    for (name, value) in &element.attributes {
        ctx.add(" ");
        ctx.add(name);
        ctx.add("=\"");
        ctx.add(&escape_attribute(value));
        ctx.add("\"");
    }

    if element.children.is_empty() && is_self_closing(&element.tag) {
        ctx.add(" />");
        return;
    }

    ctx.add(">");

    // Only containers of block children get line breaks; inline content is
    // whitespace-sensitive.
    let block_layout = ctx.options.pretty
        && !element.children.is_empty()
        && element.children.iter().all(is_block_node);

    if block_layout {
        ctx.newline();
        ctx.indent();
        for child in &element.children {
            ctx.add_indent();
            print_node(child, ctx);
            ctx.newline();
        }
        ctx.dedent();
        ctx.add_indent();
    } else {
        for child in &element.children {
            print_node(child, ctx);
        }
    }

    ctx.add("</");
    ctx.add(&element.tag);
    ctx.add(">");
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_block_node(node: &HtmlNode) -> bool {
    match node {
        HtmlNode::Element(element) => is_block_tag(&element.tag),
        _ => false,
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "p" | "div"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "iframe"
            | "script"
            | "link"
            | "section"
    )
}
