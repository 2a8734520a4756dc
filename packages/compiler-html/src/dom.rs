//! Abstract HTML tree
//!
//! The export pipeline and the hydration mounter work on this tree instead
//! of a live DOM; only the printer turns it into markup.

/// HTML node
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element(HtmlElement),
    /// Text content (escaped when printed)
    Text(String),
    /// Pre-escaped markup or raw-text element content (`<script>`, `<style>`)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag: String,
    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_child(mut self, child: impl Into<HtmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = HtmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(HtmlNode::Text(text.into()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Attribute equals `value` (ASCII case-insensitive)
    pub fn attr_is(&self, name: &str, value: &str) -> bool {
        self.attr(name)
            .map(|actual| actual.trim().eq_ignore_ascii_case(value))
            .unwrap_or(false)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(pos).1)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &HtmlElement> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    pub fn has_element_children(&self) -> bool {
        self.child_elements().next().is_some()
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(HtmlNode::text_content).collect()
    }
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        HtmlNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&HtmlElement> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut HtmlElement> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            HtmlNode::Element(element) => element.text_content(),
            HtmlNode::Text(text) => text.clone(),
            HtmlNode::Raw(_) => String::new(),
        }
    }
}

impl From<HtmlElement> for HtmlNode {
    fn from(element: HtmlElement) -> Self {
        HtmlNode::Element(element)
    }
}

/// Collect every element matching `predicate`, depth-first
pub fn find_all<'a>(
    nodes: &'a [HtmlNode],
    predicate: &impl Fn(&HtmlElement) -> bool,
) -> Vec<&'a HtmlElement> {
    let mut found = Vec::new();
    for node in nodes {
        if let HtmlNode::Element(element) = node {
            if predicate(element) {
                found.push(element);
            }
            found.extend(find_all(&element.children, predicate));
        }
    }
    found
}
