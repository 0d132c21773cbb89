//! Stylesheet documents and declaration traversal.
//!
//! A [`Stylesheet`] keeps the original source text next to the
//! declarations found in it. Replacing a declaration's value only records
//! the new text; [`Stylesheet::to_css`] splices replacements back into the
//! source so everything else stays byte-identical.

use std::ops::Range;
use std::path::{Path, PathBuf};

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};

/// A single `property: value` pair.
#[derive(Debug, Clone)]
pub struct Declaration {
    property: String,
    value: String,
    line: u32,
    important: bool,
    value_range: Range<usize>,
    replaced: bool,
}

impl Declaration {
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Current value text, without surrounding whitespace or `!important`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 1-based line where the declaration starts.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    pub fn is_replaced(&self) -> bool {
        self.replaced
    }
}

/// Visitor invoked by [`Stylesheet::walk`].
pub trait StyleVisitor {
    /// Called once per declaration, in source order.
    fn visit_declaration(&mut self, declaration: &mut DeclarationMut<'_>);

    /// Called once after the last declaration.
    fn visit_end(&mut self, _sheet: &Stylesheet) {}
}

/// Mutable view of a declaration handed to a [`StyleVisitor`].
pub struct DeclarationMut<'a> {
    declaration: &'a mut Declaration,
    path: Option<&'a Path>,
}

impl DeclarationMut<'_> {
    pub fn property(&self) -> &str {
        self.declaration.property()
    }

    pub fn value(&self) -> &str {
        self.declaration.value()
    }

    pub fn line(&self) -> u32 {
        self.declaration.line()
    }

    /// Source file of the stylesheet, if it came from one.
    pub fn path(&self) -> Option<&Path> {
        self.path
    }

    pub fn is_important(&self) -> bool {
        self.declaration.is_important()
    }

    /// Replace the value. Property name, separators, indentation and any
    /// `!important` flag are left as they were in the source.
    pub fn replace_value(&mut self, value: impl Into<String>) {
        self.declaration.value = value.into();
        self.declaration.replaced = true;
    }
}

/// A parsed stylesheet that can be walked, edited and serialized back.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    source: String,
    path: Option<PathBuf>,
    declarations: Vec<Declaration>,
}

impl Stylesheet {
    /// Parse a stylesheet. Malformed rules and declarations are skipped.
    pub fn parse(css: impl Into<String>, path: Option<PathBuf>) -> Self {
        let source = css.into();
        let mut declarations = Vec::new();

        {
            let mut input = ParserInput::new(&source);
            let mut parser = Parser::new(&mut input);
            let mut rule_parser = DeclarationCollector {
                declarations: &mut declarations,
                body: BodyKind::Rules,
            };

            for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
                // Ignore errors - lenient parsing
                let _ = result;
            }
        }

        Self {
            source,
            path,
            declarations,
        }
    }

    /// Source text as it was parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Visit every declaration in source order, then signal the end.
    pub fn walk<V: StyleVisitor + ?Sized>(&mut self, visitor: &mut V) {
        let path = self.path.as_deref();
        for declaration in &mut self.declarations {
            visitor.visit_declaration(&mut DeclarationMut { declaration, path });
        }
        visitor.visit_end(self);
    }

    /// Serialize the stylesheet with all replaced values applied.
    pub fn to_css(&self) -> String {
        let mut css = self.source.clone();

        // Ranges are in ascending order; apply replacements in reverse
        for declaration in self.declarations.iter().rev().filter(|d| d.replaced) {
            css.replace_range(declaration.value_range.clone(), &declaration.value);
        }

        css
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    /// Rules only: the stylesheet itself and top-level `@media`, `@supports`...
    Rules,
    /// Declarations only: `@font-face`, `@property`...
    Declarations,
    /// Declarations and nested rules: style rules, `@keyframes`, and group
    /// rules nested inside a style rule.
    Mixed,
}

impl BodyKind {
    /// Body of an at-rule opened inside a body of kind `self`, or `None`
    /// for statement at-rules that never carry a block.
    fn for_at_rule(self, name: &str) -> Option<Self> {
        const STATEMENTS: &[&str] = &["import", "charset", "namespace"];
        const RULE_LISTS: &[&str] = &[
            "media",
            "supports",
            "layer",
            "container",
            "document",
            "scope",
            "starting-style",
        ];
        const DECLARATION_LISTS: &[&str] = &[
            "font-face",
            "property",
            "counter-style",
            "viewport",
        ];

        let is = |names: &[&str]| names.iter().any(|n| name.eq_ignore_ascii_case(n));
        if is(STATEMENTS) {
            None
        } else if is(RULE_LISTS) && self == BodyKind::Rules {
            Some(BodyKind::Rules)
        } else if is(DECLARATION_LISTS) {
            Some(BodyKind::Declarations)
        } else {
            Some(BodyKind::Mixed)
        }
    }
}

/// Collects declarations from every block it is handed.
struct DeclarationCollector<'a> {
    declarations: &'a mut Vec<Declaration>,
    body: BodyKind,
}

impl DeclarationCollector<'_> {
    fn parse_body<'i>(&mut self, body: BodyKind, input: &mut Parser<'i, '_>) {
        let mut nested = DeclarationCollector {
            declarations: &mut *self.declarations,
            body,
        };

        for result in RuleBodyParser::new(input, &mut nested) {
            // Ignore errors - lenient parsing
            let _ = result;
        }
    }
}

fn consume_all(input: &mut Parser<'_, '_>) {
    while input.next().is_ok() {}
}

impl<'i> AtRuleParser<'i> for DeclarationCollector<'_> {
    type Prelude = BodyKind;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        match self.body.for_at_rule(&name) {
            Some(body) => {
                consume_all(input);
                Ok(body)
            }
            // Skip statement at-rules
            None => Err(input.new_custom_error(())),
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        self.parse_body(prelude, input);
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        consume_all(input);
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        self.parse_body(BodyKind::Mixed, input);
        Ok(())
    }
}

impl<'i> DeclarationParser<'i> for DeclarationCollector<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        input.skip_whitespace();
        let value_start = input.position();
        let mut value_end = value_start;
        let mut important = false;
        let mut has_block = false;

        loop {
            if input.try_parse(cssparser::parse_important).is_ok() {
                if input.is_exhausted() {
                    important = true;
                    break;
                }
                // `!important` in the middle is just part of the value
                value_end = input.position();
                continue;
            }

            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::WhiteSpace(_) | Token::Comment(_) => {}
                Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock => {
                    has_block |= matches!(token, Token::CurlyBracketBlock);
                    input.parse_nested_block(|p| {
                        consume_all(p);
                        Ok::<_, ParseError<'i, ()>>(())
                    })?;
                    value_end = input.position();
                }
                _ => value_end = input.position(),
            }
        }

        // `a:hover { ... }` reads as a declaration first; only custom
        // properties may hold a `{}` block, so hand it back as a nested rule
        if has_block && !name.starts_with("--") && self.parse_qualified() {
            return Err(input.new_custom_error(()));
        }

        self.declarations.push(Declaration {
            property: name.to_string(),
            value: input.slice(value_start..value_end).to_string(),
            line: start.source_location().line + 1,
            important,
            value_range: value_start.byte_index()..value_end.byte_index(),
            replaced: false,
        });

        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationCollector<'_> {
    fn parse_declarations(&self) -> bool {
        self.body != BodyKind::Rules
    }
    fn parse_qualified(&self) -> bool {
        self.body != BodyKind::Declarations
    }
}
