//! Lossless wikitext parser.
//!
//! Only the constructs that decide where template boundaries fall are
//! modelled: templates, triple-brace arguments, links, comments and nowiki
//! spans. Everything else stays plain text, and `Document::parse(s).to_string()`
//! always reproduces `s` byte for byte.

use std::collections::HashSet;
use std::fmt;

use crate::markup::{Markup, ParamNode, TemplateNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    /// `<!-- ... -->`, delimiters included
    Comment(String),
    /// `<nowiki>...</nowiki>`, tags included
    Nowiki(String),
    /// Body of `[[...]]`
    Link(Vec<Node>),
    /// Body of `{{{...}}}`
    Argument(Vec<Node>),
    Template(Template),
}

/// Parsed template: {{name|param1|key=value|...}}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    params: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: Vec<Node>,
    showkey: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut parser = WikitextParser::new(text);
        let nodes = parser.parse_nodes(Stop::Eof).unwrap_or_default();
        Document { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every template, nested ones included, in document order.
    pub fn templates(&self) -> Vec<&Template> {
        let mut found = Vec::new();
        walk(&self.nodes, &mut |template| found.push(template));
        found
    }
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Name compared the way templates are looked up: trimmed, first letter
    /// case-insensitive.
    pub fn is_named(&self, name: &str) -> bool {
        crate::text::ucfirst(self.name.trim()) == name
    }

    pub fn has(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name.trim() == name)
    }

    /// Last parameter called `name`; MediaWiki lets later duplicates win.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().rev().find(|param| param.name.trim() == name)
    }
}

impl Parameter {
    fn from_nodes(mut nodes: Vec<Node>, position: &mut usize) -> Self {
        let split = nodes.iter().enumerate().find_map(|(index, node)| match node {
            Node::Text(text) => text.find('=').map(|at| (index, at)),
            _ => None,
        });

        match split {
            Some((index, at)) => {
                let mut rest = nodes.split_off(index).into_iter();
                let mut name = render(&nodes);
                let mut value = Vec::new();
                if let Some(Node::Text(text)) = rest.next() {
                    name.push_str(&text[..at]);
                    if at + 1 < text.len() {
                        value.push(Node::Text(text[at + 1..].to_string()));
                    }
                }
                value.extend(rest);
                Parameter { name, value, showkey: true }
            }
            None => {
                *position += 1;
                Parameter {
                    name: position.to_string(),
                    value: nodes,
                    showkey: false,
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &[Node] {
        &self.value
    }

    /// Value serialized back to wikitext.
    pub fn value_text(&self) -> String {
        render(&self.value)
    }

    pub fn is_positional(&self) -> bool {
        !self.showkey
    }

    /// Templates inside the value, nested ones included.
    pub fn templates(&self) -> Vec<&Template> {
        let mut found = Vec::new();
        walk(&self.value, &mut |template| found.push(template));
        found
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Markup interface
// ─────────────────────────────────────────────────────────────────────────────

impl Markup for Document {
    type Template = Template;

    fn visit_templates(&self, visit: &mut dyn FnMut(&Template)) {
        walk(&self.nodes, visit);
    }

    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut Template)) {
        walk_mut(&mut self.nodes, visit);
    }
}

impl TemplateNode for Template {
    type Param = Parameter;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn params_mut(&mut self) -> &mut [Parameter] {
        &mut self.params
    }
}

impl ParamNode for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn show_key(&mut self) {
        self.showkey = true;
    }

    fn is_positional(&self) -> bool {
        !self.showkey
    }
}

fn walk<'n, F>(nodes: &'n [Node], visit: &mut F)
where
    F: FnMut(&'n Template) + ?Sized,
{
    for node in nodes {
        match node {
            Node::Template(template) => {
                visit(template);
                for param in &template.params {
                    walk(&param.value, visit);
                }
            }
            Node::Link(body) | Node::Argument(body) => walk(body, visit),
            Node::Text(_) | Node::Comment(_) | Node::Nowiki(_) => {}
        }
    }
}

fn walk_mut<F>(nodes: &mut [Node], visit: &mut F)
where
    F: FnMut(&mut Template) + ?Sized,
{
    for node in nodes.iter_mut() {
        match node {
            Node::Template(template) => {
                visit(&mut *template);
                for param in template.params.iter_mut() {
                    walk_mut(&mut param.value, visit);
                }
            }
            Node::Link(body) | Node::Argument(body) => walk_mut(body, visit),
            Node::Text(_) | Node::Comment(_) | Node::Nowiki(_) => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialization
// ─────────────────────────────────────────────────────────────────────────────

fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node.to_string());
    }
    out
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    nodes.iter().try_for_each(|node| write!(f, "{node}"))
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) | Node::Comment(text) | Node::Nowiki(text) => f.write_str(text),
            Node::Link(body) => {
                f.write_str("[[")?;
                write_nodes(f, body)?;
                f.write_str("]]")
            }
            Node::Argument(body) => {
                f.write_str("{{{")?;
                write_nodes(f, body)?;
                f.write_str("}}}")
            }
            Node::Template(template) => write!(f, "{template}"),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}", self.name)?;
        for param in &self.params {
            write!(f, "|{param}")?;
        }
        f.write_str("}}")
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.showkey {
            write!(f, "{}=", self.name)?;
        }
        write_nodes(f, &self.value)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.nodes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recursive Descent Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Where a node sequence ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    /// `|` or `}}` inside a template
    Param,
    /// `]]`
    Link,
    /// `}}}`
    Argument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Construct {
    Template,
    Argument,
    Link,
}

/// Constructs nested deeper than this are read as plain text.
const MAX_DEPTH: usize = 40;

/// Uses the call stack for nesting, bounded by [`MAX_DEPTH`]. An opener that
/// never finds its closer is re-read as plain text; failed openers are
/// remembered by position so unbalanced input does not trigger repeated
/// rescans.
struct WikitextParser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    unclosed: HashSet<(Construct, usize)>,
    /// No `</nowiki>` exists at or after this offset.
    nowiki_unclosed_from: usize,
}

impl<'a> WikitextParser<'a> {
    fn new(text: &'a str) -> Self {
        WikitextParser {
            text,
            pos: 0,
            depth: 0,
            unclosed: HashSet::new(),
            nowiki_unclosed_from: usize::MAX,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self, n: usize) -> &'a str {
        // n is character count, not byte count
        let remaining = self.rest();
        let end_offset: usize = remaining.chars().take(n).map(|c| c.len_utf8()).sum();
        &remaining[..end_offset]
    }

    fn consume(&mut self, n: usize) -> &'a str {
        let result = self.peek(n);
        self.pos += result.len();
        result
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn at_stop(&self, stop: Stop) -> bool {
        let rest = self.rest();
        match stop {
            Stop::Eof => false,
            Stop::Param => rest.starts_with('|') || rest.starts_with("}}"),
            Stop::Link => rest.starts_with("]]"),
            Stop::Argument => rest.starts_with("}}}"),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // nodes ::= (comment | nowiki | argument | template | link | char)*
    // Returns None when a closing stop was required but EOF came first.
    // ─────────────────────────────────────────────────────────────
    fn parse_nodes(&mut self, stop: Stop) -> Option<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        loop {
            if self.at_end() {
                if stop != Stop::Eof {
                    return None;
                }
                break;
            }
            if self.at_stop(stop) {
                break;
            }
            if let Some(node) = self.parse_construct() {
                if !text.is_empty() {
                    nodes.push(Node::Text(std::mem::take(&mut text)));
                }
                nodes.push(node);
            } else if let Some(c) = self.consume_char() {
                text.push(c);
            }
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }
        Some(nodes)
    }

    fn parse_construct(&mut self) -> Option<Node> {
        let rest = self.rest();
        if rest.starts_with("<!--") {
            return Some(self.parse_comment());
        }
        if starts_with_ignore_case(rest, "<nowiki>") {
            if let Some(node) = self.parse_nowiki() {
                return Some(node);
            }
        }
        if rest.starts_with("{{{") {
            if let Some(body) = self.attempt(Construct::Argument, Self::parse_argument) {
                return Some(Node::Argument(body));
            }
        }
        if rest.starts_with("{{") {
            if let Some(template) = self.attempt(Construct::Template, Self::parse_template) {
                return Some(Node::Template(template));
            }
        }
        if rest.starts_with("[[") {
            if let Some(body) = self.attempt(Construct::Link, Self::parse_link) {
                return Some(Node::Link(body));
            }
        }
        None
    }

    fn attempt<T, F>(&mut self, construct: Construct, parse: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> Option<T>,
    {
        let start = self.pos;
        if self.unclosed.contains(&(construct, start)) {
            return None;
        }
        if self.depth >= MAX_DEPTH {
            self.unclosed.insert((construct, start));
            return None;
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        if parsed.is_none() {
            self.pos = start;
            self.unclosed.insert((construct, start));
        }
        parsed
    }

    // An unterminated comment runs to the end of the text.
    fn parse_comment(&mut self) -> Node {
        let rest = self.rest();
        let len = rest[4..].find("-->").map_or(rest.len(), |at| 4 + at + 3);
        self.pos += len;
        Node::Comment(rest[..len].to_string())
    }

    fn parse_nowiki(&mut self) -> Option<Node> {
        const CLOSE: &str = "</nowiki>";
        if self.pos >= self.nowiki_unclosed_from {
            return None;
        }
        let rest = self.rest();
        let Some(at) = find_ignore_case(rest, CLOSE) else {
            self.nowiki_unclosed_from = self.pos;
            return None;
        };
        let end = at + CLOSE.len();
        self.pos += end;
        Some(Node::Nowiki(rest[..end].to_string()))
    }

    // ─────────────────────────────────────────────────────────────
    // argument ::= "{{{" nodes "}}}"
    // ─────────────────────────────────────────────────────────────
    fn parse_argument(&mut self) -> Option<Vec<Node>> {
        self.consume(3);
        let body = self.parse_nodes(Stop::Argument)?;
        self.consume(3);
        Some(body)
    }

    // ─────────────────────────────────────────────────────────────
    // template ::= "{{" name ("|" param)* "}}"
    // ─────────────────────────────────────────────────────────────
    fn parse_template(&mut self) -> Option<Template> {
        self.consume(2);
        let name = self.parse_nodes(Stop::Param)?;
        let mut params = Vec::new();
        let mut position = 0;
        while self.peek(1) == "|" {
            self.consume(1);
            let nodes = self.parse_nodes(Stop::Param)?;
            params.push(Parameter::from_nodes(nodes, &mut position));
        }
        self.consume(2); // "}}"
        Some(Template {
            name: render(&name),
            params,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // link ::= "[[" nodes "]]"
    // ─────────────────────────────────────────────────────────────
    fn parse_link(&mut self) -> Option<Vec<Node>> {
        self.consume(2);
        let body = self.parse_nodes(Stop::Link)?;
        self.consume(2);
        Some(body)
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

/// Byte offset of the first ASCII case-insensitive match of `needle`.
fn find_ignore_case(text: &str, needle: &str) -> Option<usize> {
    text.as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests for WikitextParser
// ─────────────────────────────────────────────────────────────────────────────
