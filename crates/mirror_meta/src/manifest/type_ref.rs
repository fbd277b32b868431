//! C#-style type references in manifests.
//!
//! ```text
//! type   := ("ref" "readonly"?)? core suffix*
//! core   := "(" element ("," element)+ ")" | path ("<" type ("," type)* ">")?
//! element:= type ident?
//! path   := ident ("." ident)*
//! suffix := "[" ","* "]" | "*" | "?"
//! ```
//!
//! Parsing is purely syntactic; resolution against a universe happens in
//! lowering.

use std::fmt;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Token {
    #[token("ref")]
    Ref,
    #[token("readonly")]
    Readonly,
    #[regex(r"@?[A-Za-z_][A-Za-z0-9_`]*")]
    Ident,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("*")]
    Star,
    #[token("?")]
    Question,
}

/// A parsed type reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    /// `Name`, `Ns.Name`, `Outer.Inner`, optionally with type arguments.
    Named { path: Vec<String>, args: Vec<TypeRef> },
    /// `(A, B)`, lowered to `System.ValueTuple`.
    Tuple(Vec<TypeRef>),
    Array { element: Box<TypeRef>, rank: u8 },
    Pointer(Box<TypeRef>),
    /// `T?`, lowered to `System.Nullable<T>` for value types and ignored
    /// for reference types.
    Nullable(Box<TypeRef>),
    /// `ref T` or `ref readonly T`; only valid at the outermost level.
    ByRef { inner: Box<TypeRef>, readonly: bool },
}

/// Malformed type reference text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSyntaxError {
    pub offset: usize,
    pub message: &'static str,
}

impl fmt::Display for TypeSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for TypeSyntaxError {}

/// Parse a type reference.
pub fn parse(text: &str) -> Result<TypeRef, TypeSyntaxError> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(text).spanned() {
        let token = token.map_err(|()| TypeSyntaxError {
            offset: span.start,
            message: "unexpected character",
        })?;
        tokens.push((token, span.start, &text[span]));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
    };
    let ty = parser.parse_outer()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("trailing input"));
    }
    Ok(ty)
}

struct Parser<'a> {
    tokens: Vec<(Token, usize, &'a str)>,
    pos: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(token, _, _)| token)
    }

    fn bump(&mut self) -> Option<(Token, &'a str)> {
        let &(token, _, slice) = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some((token, slice))
    }

    fn eat(&mut self, expected: Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, message: &'static str) -> Result<(), TypeSyntaxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &'static str) -> TypeSyntaxError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.end, |&(_, offset, _)| offset);
        TypeSyntaxError { offset, message }
    }

    fn parse_outer(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        if self.eat(Token::Ref) {
            let readonly = self.eat(Token::Readonly);
            let inner = self.parse_type()?;
            return Ok(TypeRef::ByRef {
                inner: Box::new(inner),
                readonly,
            });
        }
        self.parse_type()
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        let mut ty = match self.peek() {
            Some(Token::LParen) => self.parse_tuple()?,
            Some(Token::Ident) => self.parse_named()?,
            Some(Token::Ref) => {
                return Err(self.error("`ref` is only allowed at the outermost level"))
            }
            _ => return Err(self.error("expected a type")),
        };
        loop {
            match self.peek() {
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let mut rank: u8 = 1;
                    while self.eat(Token::Comma) {
                        rank = rank
                            .checked_add(1)
                            .ok_or_else(|| self.error("array rank too large"))?;
                    }
                    self.expect(Token::RBracket, "expected `]`")?;
                    ty = TypeRef::Array {
                        element: Box::new(ty),
                        rank,
                    };
                }
                Some(Token::Star) => {
                    self.pos += 1;
                    ty = TypeRef::Pointer(Box::new(ty));
                }
                Some(Token::Question) => {
                    self.pos += 1;
                    ty = TypeRef::Nullable(Box::new(ty));
                }
                _ => return Ok(ty),
            }
        }
    }

    fn parse_named(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        let mut path = Vec::new();
        loop {
            if self.peek() != Some(Token::Ident) {
                return Err(self.error("expected an identifier"));
            }
            if let Some((_, slice)) = self.bump() {
                path.push(slice.trim_start_matches('@').to_owned());
            }
            if !self.eat(Token::Dot) {
                break;
            }
        }
        let mut args = Vec::new();
        if self.eat(Token::Lt) {
            loop {
                args.push(self.parse_type()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Gt, "expected `>`")?;
        }
        Ok(TypeRef::Named { path, args })
    }

    fn parse_tuple(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        self.expect(Token::LParen, "expected `(`")?;
        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_type()?);
            // Element names carry no metadata.
            self.eat(Token::Ident);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "expected `)`")?;
        if elements.len() < 2 {
            return Err(self.error("a tuple needs at least two elements"));
        }
        Ok(TypeRef::Tuple(elements))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
