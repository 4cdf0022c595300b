//! Type references as written in declaration files.
//!
//! Grammar (whitespace allowed between tokens):
//!
//! ```text
//! type  := path ( '<' type ( ',' type )* '>' )? '?'?
//! path  := ident ( '.' ident )*
//! ident := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! References are unresolved here; `xom_sema` binds them to declarations.

use std::fmt;

use crate::{Name, StringInterner};

/// An unresolved type reference.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    /// `Name`, `Dotted.Name`, or a generic instantiation `Name<A, B>`.
    Path { path: Name, args: Vec<TypeRef> },
    /// `T?`
    Nullable(Box<TypeRef>),
}

/// Error produced by [`TypeRef::parse`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeRefError {
    /// The full type expression.
    pub text: String,
    /// Byte offset of the failure.
    pub offset: usize,
    pub message: &'static str,
}

impl fmt::Display for TypeRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed type `{}` at offset {}: {}",
            self.text, self.offset, self.message
        )
    }
}

impl std::error::Error for TypeRefError {}

impl TypeRef {
    /// A non-generic reference.
    pub fn path(path: Name) -> Self {
        TypeRef::Path {
            path,
            args: Vec::new(),
        }
    }

    /// Parse a type expression, interning every path segment group.
    pub fn parse(text: &str, interner: &mut StringInterner) -> Result<TypeRef, TypeRefError> {
        let mut parser = TypeRefParser {
            text,
            pos: 0,
            interner,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    /// The path of the referenced type, looking through nullability.
    pub fn head(&self) -> Name {
        match self {
            TypeRef::Path { path, .. } => *path,
            TypeRef::Nullable(inner) => inner.head(),
        }
    }

    /// Generic arguments of the referenced type, looking through nullability.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Path { args, .. } => args,
            TypeRef::Nullable(inner) => inner.args(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// Render the reference back to its textual form.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeRefDisplay<'a> {
        TypeRefDisplay { ty: self, interner }
    }
}

/// Display adapter returned by [`TypeRef::display`].
pub struct TypeRefDisplay<'a> {
    ty: &'a TypeRef,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            TypeRef::Path { path, args } => {
                f.write_str(self.interner.lookup(*path))?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg.display(self.interner))?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Nullable(inner) => write!(f, "{}?", inner.display(self.interner)),
        }
    }
}

struct TypeRefParser<'a> {
    text: &'a str,
    pos: usize,
    interner: &'a mut StringInterner,
}

impl TypeRefParser<'_> {
    fn error(&self, message: &'static str) -> TypeRefError {
        TypeRefError {
            text: self.text.to_owned(),
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefError> {
        self.skip_ws();
        let path = self.parse_path()?;
        let mut args = Vec::new();
        if self.eat(b'<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(b',') {
                    continue;
                }
                if self.eat(b'>') {
                    break;
                }
                return Err(self.error("expected `,` or `>`"));
            }
        }
        let mut ty = TypeRef::Path { path, args };
        if self.eat(b'?') {
            ty = TypeRef::Nullable(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_path(&mut self) -> Result<Name, TypeRefError> {
        let start = self.pos;
        self.parse_ident()?;
        while self.peek() == Some(b'.') {
            self.pos += 1;
            self.parse_ident()?;
        }
        let path = &self.text[start..self.pos];
        Ok(self.interner.intern(path))
    }

    fn parse_ident(&mut self) -> Result<(), TypeRefError> {
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(self.error("expected identifier")),
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        Ok(())
    }
}
