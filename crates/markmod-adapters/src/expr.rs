//! Free identifier analysis for template expressions.
//!
//! Expressions are parsed with oxc and walked with a scope stack, so
//! function parameters, destructured bindings and body declarations only
//! shadow outer names where JavaScript scoping says they do.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AssignmentTargetPropertyIdentifier, BindingIdentifier, FormalParameters, FunctionBody,
    IdentifierReference, ObjectProperty,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Names that always resolve without a scope lookup.
const GLOBALS: &[&str] = &[
    "Infinity",
    "undefined",
    "NaN",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "Math",
    "Number",
    "Date",
    "Array",
    "Object",
    "Boolean",
    "String",
    "RegExp",
    "Map",
    "Set",
    "JSON",
    "Intl",
    "BigInt",
    "console",
    "Error",
    "Symbol",
];

/// An identifier read from the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeIdent {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset past the last character
    pub end: usize,
    /// Written as an object literal shorthand property (`{ name }`)
    pub shorthand: bool,
}

/// Errors found while analysing an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("Invalid expression `{expr}`: {message}")]
    Invalid { expr: String, message: String },

    #[error("Unterminated string literal in `{0}`")]
    UnterminatedString(String),

    #[error("Unexpected `{found}` in `{expr}`")]
    Unbalanced { found: char, expr: String },

    #[error("Unclosed `{open}` in `{expr}`")]
    Unclosed { open: char, expr: String },
}

/// Find the free identifiers of `expr`, skipping `locals`.
pub fn scan(expr: &str, locals: &[&str]) -> Result<Vec<FreeIdent>, ExprError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, expr, SourceType::mjs())
        .parse_expression()
        .map_err(|errors| ExprError::Invalid {
            expr: expr.to_string(),
            message: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    let mut finder = FreeFinder {
        locals,
        scopes: Vec::new(),
        shorthand: false,
        found: Vec::new(),
    };
    finder.visit_expression(&parsed);

    let mut found = finder.found;
    found.sort_by_key(|ident| ident.start);
    found.dedup_by_key(|ident| ident.start);
    Ok(found)
}

/// Unique free identifier names of `expr`, in order of first use.
pub fn free_identifiers(expr: &str, locals: &[&str]) -> Result<Vec<String>, ExprError> {
    let mut names: Vec<String> = Vec::new();
    for ident in scan(expr, locals)? {
        let name = &expr[ident.start..ident.end];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Rewrite every free identifier of `expr` as a property of `prefix`.
///
/// `prefix_identifiers("a + b.c", "_ctx.", &[])` gives `_ctx.a + _ctx.b.c`.
/// Shorthand object properties are expanded so the key is kept.
pub fn prefix_identifiers(expr: &str, prefix: &str, locals: &[&str]) -> Result<String, ExprError> {
    let idents = scan(expr, locals)?;
    let mut out = String::with_capacity(expr.len() + idents.len() * prefix.len());
    let mut last = 0;

    for ident in idents {
        let name = &expr[ident.start..ident.end];
        out.push_str(&expr[last..ident.start]);
        if ident.shorthand {
            out.push_str(name);
            out.push_str(": ");
        }
        out.push_str(prefix);
        out.push_str(name);
        last = ident.end;
    }
    out.push_str(&expr[last..]);

    Ok(out)
}

/// Collects identifier references that no enclosing scope binds.
struct FreeFinder<'s> {
    locals: &'s [&'s str],
    /// Names bound by each enclosing function, innermost last
    scopes: Vec<Vec<String>>,
    /// Set while visiting the value of a shorthand property
    shorthand: bool,
    found: Vec<FreeIdent>,
}

impl FreeFinder<'_> {
    fn is_bound(&self, name: &str) -> bool {
        GLOBALS.contains(&name)
            || self.locals.contains(&name)
            || self.scopes.iter().any(|scope| scope.iter().any(|n| n == name))
    }
}

impl<'a> Visit<'a> for FreeFinder<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if !self.is_bound(it.name.as_str()) {
            self.found.push(FreeIdent {
                start: it.span.start as usize,
                end: it.span.end as usize,
                shorthand: self.shorthand,
            });
        }
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        let outer = std::mem::replace(&mut self.shorthand, it.shorthand);
        walk::walk_object_property(self, it);
        self.shorthand = outer;
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        let outer = std::mem::replace(&mut self.shorthand, true);
        self.visit_identifier_reference(&it.binding);
        self.shorthand = false;
        if let Some(init) = &it.init {
            self.visit_expression(init);
        }
        self.shorthand = outer;
    }

    // Parameters open a function scope; the body that follows closes it.
    fn visit_formal_parameters(&mut self, it: &FormalParameters<'a>) {
        let mut bindings = Bindings::default();
        walk::walk_formal_parameters(&mut bindings, it);
        self.scopes.push(bindings.names);
        walk::walk_formal_parameters(self, it);
    }

    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        let mut bindings = Bindings::default();
        walk::walk_function_body(&mut bindings, it);
        match self.scopes.last_mut() {
            Some(scope) => scope.extend(bindings.names),
            None => self.scopes.push(bindings.names),
        }
        walk::walk_function_body(self, it);
        self.scopes.pop();
    }
}

/// Names declared at one function level, nested functions excluded.
#[derive(Default)]
struct Bindings {
    names: Vec<String>,
}

impl<'a> Visit<'a> for Bindings {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.push(it.name.to_string());
    }

    fn visit_formal_parameters(&mut self, _it: &FormalParameters<'a>) {}

    fn visit_function_body(&mut self, _it: &FunctionBody<'a>) {}
}

/// Find the `}` closing an expression that starts right after a `{`.
///
/// Returns the byte offset of that brace within `src`. Braces inside
/// strings, template literals, comments and nested objects are skipped.
pub fn find_closing_brace(src: &str) -> Result<usize, ExprError> {
    BraceFinder {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        frames: Vec::new(),
    }
    .run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Paren,
    Bracket,
    Brace,
    Template,
}

impl Frame {
    fn open(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
            Self::Brace => '{',
            Self::Template => '$',
        }
    }

    fn close(self) -> u8 {
        match self {
            Self::Paren => b')',
            Self::Bracket => b']',
            Self::Brace | Self::Template => b'}',
        }
    }
}

struct BraceFinder<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    frames: Vec<Frame>,
}

impl BraceFinder<'_> {
    fn at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn run(&mut self) -> Result<usize, ExprError> {
        while let Some(b) = self.at(self.pos) {
            match b {
                b'\'' | b'"' => self.skip_string(b)?,
                b'`' => {
                    self.pos += 1;
                    self.scan_template()?;
                }
                b'/' if self.at(self.pos + 1) == Some(b'/') => {
                    while self.at(self.pos).is_some_and(|c| c != b'\n') {
                        self.pos += 1;
                    }
                }
                b'/' if self.at(self.pos + 1) == Some(b'*') => {
                    self.pos = match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos + 2 + end + 2,
                        None => self.bytes.len(),
                    };
                }
                b'(' | b'[' | b'{' => {
                    self.frames.push(match b {
                        b'(' => Frame::Paren,
                        b'[' => Frame::Bracket,
                        _ => Frame::Brace,
                    });
                    self.pos += 1;
                }
                b')' | b']' | b'}' => match self.frames.pop() {
                    None if b == b'}' => return Ok(self.pos),
                    Some(frame) if frame.close() == b => {
                        self.pos += 1;
                        if frame == Frame::Template {
                            self.scan_template()?;
                        }
                    }
                    _ => {
                        return Err(ExprError::Unbalanced {
                            found: b as char,
                            expr: self.src.to_string(),
                        })
                    }
                },
                _ => self.pos += 1,
            }
        }

        Err(ExprError::Unclosed {
            open: self.frames.last().map_or('{', |frame| frame.open()),
            expr: self.src.to_string(),
        })
    }

    fn skip_string(&mut self, quote: u8) -> Result<(), ExprError> {
        self.pos += 1;
        loop {
            match self.at(self.pos) {
                None => return Err(ExprError::UnterminatedString(self.src.to_string())),
                Some(b'\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Skip template literal text up to its end or the next `${`.
    fn scan_template(&mut self) -> Result<(), ExprError> {
        loop {
            match self.at(self.pos) {
                None => return Err(ExprError::UnterminatedString(self.src.to_string())),
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'$') if self.at(self.pos + 1) == Some(b'{') => {
                    self.pos += 2;
                    self.frames.push(Frame::Template);
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}
