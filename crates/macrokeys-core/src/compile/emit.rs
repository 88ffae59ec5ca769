// Macrokeys Emit Tree
// Intermediate representation for AutoHotkey v2 literal expressions

use std::fmt::Write;

/// One node of an emitted AHK v2 expression.
///
/// The serialized model is built as a tree of these nodes and printed
/// by a single recursive renderer, so string escaping happens in
/// exactly one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw expression text, emitted verbatim (numbers, identifiers,
    /// function references)
    Lit(String),
    /// A string literal, quoted and escaped on render
    Str(String),
    /// A `Map(k1, v1, k2, v2, ...)` literal
    Map(Vec<(Node, Node)>),
    /// An `[a, b, ...]` array literal
    List(Vec<Node>),
}

impl Node {
    pub fn lit(text: impl Into<String>) -> Self {
        Node::Lit(text.into())
    }

    pub fn str(text: impl Into<String>) -> Self {
        Node::Str(text.into())
    }

    pub fn int(value: impl Into<i64>) -> Self {
        Node::Lit(value.into().to_string())
    }

    /// Render this node as AHK v2 source.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        match self {
            Node::Lit(text) => out.push_str(text),
            Node::Str(text) => {
                let _ = write!(out, "\"{}\"", escape_str(text));
            }
            Node::Map(entries) => {
                if entries.is_empty() {
                    out.push_str("Map()");
                    return;
                }
                out.push_str("Map(");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    out.push_str(&indent(depth + 1));
                    key.render_into(out, depth + 1);
                    out.push_str(", ");
                    value.render_into(out, depth + 1);
                }
                out.push('\n');
                out.push_str(&indent(depth));
                out.push(')');
            }
            Node::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render_into(out, depth);
                }
                out.push(']');
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Escape string contents for an AHK v2 double-quoted literal.
///
/// Every string the compiler emits (paths, titles, profile names,
/// payload fields) goes through this function and nowhere else.
pub fn escape_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '`' => out.push_str("``"),
            '"' => out.push_str("`\""),
            '\n' => out.push_str("`n"),
            '\r' => out.push_str("`r"),
            '\t' => out.push_str("`t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_backtick_first() {
        // A backtick in the input must not re-escape the marks it
        // produces for other characters.
        assert_eq!(escape_str("`\""), "```\"");
        assert_eq!(escape_str("a`b"), "a``b");
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_str("line1\nline2\tend\r"), "line1`nline2`tend`r");
    }

    #[test]
    fn test_str_node_quotes_and_escapes() {
        assert_eq!(Node::str("say \"hi\"").render(), "\"say `\"hi`\"\"");
        assert_eq!(
            Node::str("C:\\Program Files\\app.exe").render(),
            "\"C:\\Program Files\\app.exe\""
        );
    }

    #[test]
    fn test_empty_map_and_list() {
        assert_eq!(Node::Map(vec![]).render(), "Map()");
        assert_eq!(Node::List(vec![]).render(), "[]");
    }

    #[test]
    fn test_nested_map_rendering() {
        let node = Node::Map(vec![(
            Node::str("Global"),
            Node::Map(vec![
                (Node::str("active"), Node::str("Default")),
                (Node::str("vk"), Node::int(65)),
            ]),
        )]);
        let rendered = node.render();
        assert_eq!(
            rendered,
            "Map(\n    \"Global\", Map(\n        \"active\", \"Default\",\n        \"vk\", 65\n    )\n)"
        );
    }

    #[test]
    fn test_list_of_strings() {
        let node = Node::List(vec![Node::str("Default"), Node::str("Work")]);
        assert_eq!(node.render(), "[\"Default\", \"Work\"]");
    }

    #[test]
    fn test_lit_is_verbatim() {
        assert_eq!(Node::lit("Macro_A_Down").render(), "Macro_A_Down");
    }
}
