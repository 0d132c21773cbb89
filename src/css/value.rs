//! Value expression trees.
//!
//! Parses a single declaration value into a flat list of [`ValueNode`]s using
//! cssparser's tokenizer. Function arguments nest; `var()` arguments follow
//! the custom-property grammar, where everything after the first comma is
//! kept verbatim as a [`ValueNode::Raw`] span.

use cssparser::{ParseError, Parser, ParserInput, Token};
use thiserror::Error;

type NodeResult<'i, T> = Result<T, ParseError<'i, ()>>;

/// A node of a parsed value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueNode {
    /// A call-like construct such as `var(...)` or `calc(...)`.
    Function {
        name: String,
        arguments: Vec<ValueNode>,
    },
    /// A bare name token, including custom property names (`--gap`).
    Identifier(String),
    /// Unparsed source text, used for `var()` fallbacks.
    Raw(String),
    /// Separator such as `,` or `/`.
    Operator(char),
    /// Any other token or block, kept as its source text.
    Other(String),
}

impl ValueNode {
    pub fn is_function(&self) -> bool {
        matches!(self, ValueNode::Function { .. })
    }

    /// Arguments of a function node; empty for every other kind.
    pub fn arguments(&self) -> &[ValueNode] {
        match self {
            ValueNode::Function { arguments, .. } => arguments,
            _ => &[],
        }
    }
}

/// A value that could not be tokenized into a well-formed expression.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid value at line {line}, column {column}")]
pub struct ValueParseError {
    /// 1-based line within the value text.
    pub line: u32,
    /// 1-based column within the value text.
    pub column: u32,
}

/// Parse a declaration value into its top-level nodes.
///
/// Whitespace and comments between nodes are dropped. Bad strings, bad
/// URLs and unbalanced closing brackets are rejected.
pub fn parse_value(text: &str) -> Result<Vec<ValueNode>, ValueParseError> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    parse_nodes(&mut parser).map_err(|err| ValueParseError {
        line: err.location.line + 1,
        column: err.location.column,
    })
}

fn parse_nodes<'i>(parser: &mut Parser<'i, '_>) -> NodeResult<'i, Vec<ValueNode>> {
    let mut nodes = Vec::new();

    loop {
        let location = parser.current_source_location();
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) | Token::Comment(_) => {}
            Token::Ident(name) => nodes.push(ValueNode::Identifier(name.to_string())),
            Token::Function(name) => {
                let arguments = if name.eq_ignore_ascii_case("var") {
                    parser.parse_nested_block(|p| parse_var_arguments(p))?
                } else {
                    parser.parse_nested_block(|p| parse_nodes(p))?
                };
                nodes.push(ValueNode::Function {
                    name: name.to_string(),
                    arguments,
                });
            }
            Token::Comma => nodes.push(ValueNode::Operator(',')),
            Token::Delim(c) => nodes.push(ValueNode::Operator(c)),
            Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock => {
                parser.parse_nested_block(|p| {
                    while p.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<_, ParseError<'i, ()>>(())
                })?;
                nodes.push(ValueNode::Other(parser.slice_from(start).to_string()));
            }
            Token::BadString(_)
            | Token::BadUrl(_)
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::CloseCurlyBracket => return Err(location.new_custom_error(())),
            _ => nodes.push(ValueNode::Other(parser.slice_from(start).to_string())),
        }
    }

    Ok(nodes)
}

/// Arguments of `var()`: the property name, then the fallback as raw text.
fn parse_var_arguments<'i>(parser: &mut Parser<'i, '_>) -> NodeResult<'i, Vec<ValueNode>> {
    parser.skip_whitespace();

    let name = match parser.try_parse(|p| p.expect_ident_cloned()) {
        Ok(name) => name,
        // Not a custom property reference; keep whatever is there.
        Err(_) => return parse_nodes(parser),
    };
    let mut arguments = vec![ValueNode::Identifier(name.to_string())];

    parser.skip_whitespace();
    if parser.is_exhausted() {
        return Ok(arguments);
    }

    let location = parser.current_source_location();
    match parser.next()? {
        Token::Comma => {}
        _ => return Err(location.new_custom_error(())),
    }
    arguments.push(ValueNode::Operator(','));

    let start = parser.position();
    while parser.next_including_whitespace_and_comments().is_ok() {}
    arguments.push(ValueNode::Raw(parser.slice_from(start).to_string()));

    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> ValueNode {
        ValueNode::Identifier(name.to_string())
    }

    #[test]
    fn test_var_with_fallback() {
        let nodes = parse_value("var(--border-radius, 5px)").unwrap();
        assert_eq!(
            nodes,
            vec![ValueNode::Function {
                name: "var".to_string(),
                arguments: vec![
                    ident("--border-radius"),
                    ValueNode::Operator(','),
                    ValueNode::Raw(" 5px".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn test_var_without_fallback() {
        let nodes = parse_value("var( --gap )").unwrap();
        assert_eq!(nodes[0].arguments(), &[ident("--gap")]);
    }

    #[test]
    fn test_var_fallback_keeps_nested_references_verbatim() {
        let nodes =
            parse_value("var(--custom-border, var(--border-radius, 5px) solid var(--color-red, #FA0000))")
                .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0].arguments()[2],
            ValueNode::Raw(" var(--border-radius, 5px) solid var(--color-red, #FA0000)".to_string())
        );
    }

    #[test]
    fn test_var_empty_fallback_is_empty_raw() {
        let nodes = parse_value("var(--x,)").unwrap();
        assert_eq!(nodes[0].arguments()[2], ValueNode::Raw(String::new()));
    }

    #[test]
    fn test_var_name_is_case_insensitive() {
        let nodes = parse_value("VAR(--x, 1px)").unwrap();
        assert_eq!(nodes[0].arguments().len(), 3);
    }

    #[test]
    fn test_other_functions_parse_arguments() {
        let nodes = parse_value("hsla(292, 56%, 33%, 1)").unwrap();
        let arguments = nodes[0].arguments();
        assert!(arguments.iter().all(|n| !matches!(n, ValueNode::Identifier(_))));
        assert_eq!(arguments[0], ValueNode::Other("292".to_string()));
        assert_eq!(arguments[1], ValueNode::Operator(','));
    }

    #[test]
    fn test_top_level_sequence() {
        let nodes = parse_value("1px solid var(--c, red)").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], ValueNode::Other("1px".to_string()));
        assert_eq!(nodes[1], ident("solid"));
        assert!(nodes[2].is_function());
        assert!(!nodes[0].is_function());
        assert!(nodes[1].arguments().is_empty());
    }

    #[test]
    fn test_blocks_are_kept_as_text() {
        let nodes = parse_value("[full-start] minmax(1em, 1fr)").unwrap();
        assert_eq!(nodes[0], ValueNode::Other("[full-start]".to_string()));
    }

    #[test]
    fn test_unbalanced_bracket_is_an_error() {
        let err = parse_value("4px)").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_var_with_junk_after_name_is_an_error() {
        assert!(parse_value("var(--x 4px)").is_err());
    }

    #[test]
    fn test_empty_value() {
        assert!(parse_value("   ").unwrap().is_empty());
    }
}
