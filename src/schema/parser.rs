//! # Schema Parser
//!
//! Recursive descent over the buffered token stream, producing a
//! [`Package`] AST. The grammar:
//!
//! ```text
//! package   := 'package' package_name import* type*
//! import    := 'from' package_name 'import' ( '*' | name (',' name)* )
//! type      := 'type' name '{' version* '}'
//! version   := 'version' number '{' field* '}'
//! field     := ('required' | 'optional') '[]'? value_type name
//! ```
//!
//! A field's type must be a built-in or a name previously imported;
//! anything else is reported as `unknown type '<name>'`. All failures are
//! [`SyntaxError`] values with a human message; comments are skipped
//! wherever they appear.

use std::fmt;

use eyre::{bail, Result};
use smallvec::SmallVec;

use crate::schema::ast::{FieldDecl, Import, Package, TypeDecl, VersionDecl};
use crate::schema::lexer::{Lexer, BUILTIN_TYPES};
use crate::schema::token::Token;


/// A schema parse failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Recursive-descent parser over a buffered token list.
pub struct Parser<'a> {
    tokens: SmallVec<[Token<'a>; 32]>,
    pos: usize,
    eof: Token<'a>,
}

impl<'a> Parser<'a> {
    /// Lexes `input` up front; `name` labels the source in lexer errors.
    pub fn new(name: &str, input: &'a str) -> Self {
        let mut tokens = SmallVec::new();
        Lexer::new(name, input).run(|token| tokens.push(token));
        Self {
            tokens,
            pos: 0,
            eof: Token::Eof,
        }
    }

    /// Parses the whole document into a [`Package`].
    pub fn parse(&mut self) -> Result<Package<'a>> {
        let meaningful = self
            .tokens
            .iter()
            .any(|token| !matches!(token, Token::Comment(_) | Token::Eof));
        if !meaningful {
            bail!(SyntaxError::new("empty input string"));
        }

        self.expect(Token::Package, "expected package declaration")?;
        let name = self.take_package_name("expected package name")?;
        let imports = self.parse_imports()?;
        let types = self.parse_types(&imports)?;

        Ok(Package {
            name,
            imports,
            types,
        })
    }

    fn parse_imports(&mut self) -> Result<Vec<Import<'a>>> {
        let mut imports = Vec::new();
        while matches!(self.current(), Token::From) {
            self.advance();
            let package = self.take_package_name("expected package name")?;
            self.expect(Token::Import, "expected 'import' keyword")?;

            let mut import = Import {
                package,
                type_names: Vec::new(),
                wildcard: false,
            };
            if matches!(self.current(), Token::Asterisk) {
                self.advance();
                import.wildcard = true;
            } else {
                import
                    .type_names
                    .push(self.take_identifier("expected type name")?);
                while matches!(self.current(), Token::Comma) {
                    self.advance();
                    import
                        .type_names
                        .push(self.take_identifier("expected type name")?);
                }
            }
            imports.push(import);
        }
        Ok(imports)
    }

    fn parse_types(&mut self, imports: &[Import<'a>]) -> Result<Vec<TypeDecl<'a>>> {
        let mut types = Vec::new();
        while matches!(self.current(), Token::TypeDef) {
            self.advance();
            let name = self.take_identifier("expected type name")?;
            self.expect(Token::OpenBrace, "expected open bracket")?;

            let mut decl = TypeDecl {
                name,
                versions: Vec::new(),
            };
            while matches!(self.current(), Token::Version) {
                self.advance();
                let number = self.take_version_number()?;
                self.expect(Token::OpenBrace, "expected open bracket")?;

                let mut version = VersionDecl {
                    number,
                    fields: Vec::new(),
                };
                while matches!(self.current(), Token::Required | Token::Optional) {
                    version.fields.push(self.parse_field(imports)?);
                }
                self.expect(Token::CloseBrace, "expected close bracket")?;
                decl.versions.push(version);
            }
            self.expect(Token::CloseBrace, "expected close bracket")?;
            types.push(decl);
        }
        Ok(types)
    }

    fn parse_field(&mut self, imports: &[Import<'a>]) -> Result<FieldDecl<'a>> {
        let required = match self.next() {
            Token::Required => true,
            Token::Optional => false,
            Token::Error(message) => bail!(SyntaxError::new(message)),
            _ => bail!(SyntaxError::new(
                "expected 'required' or 'optional' keyword"
            )),
        };

        let mut array = false;
        if matches!(self.current(), Token::OpenBracket) {
            self.advance();
            self.expect(Token::CloseBracket, "expected array close bracket")?;
            array = true;
        }

        let type_name = match self.next() {
            Token::ValueType(name) => name,
            Token::Error(message) => bail!(SyntaxError::new(message)),
            other => bail!(SyntaxError::new(format!(
                "expected field type, not '{}'",
                other.describe()
            ))),
        };

        let imported = imports.iter().any(|import| {
            import.wildcard || import.type_names.iter().any(|name| *name == type_name)
        });
        if !BUILTIN_TYPES.contains(type_name) && !imported {
            bail!(SyntaxError::new(format!("unknown type '{type_name}'")));
        }

        let name = self.take_identifier("expected field name")?;
        Ok(FieldDecl {
            required,
            array,
            type_name,
            name,
        })
    }

    /// Current token with comments skipped; `Eof` once exhausted.
    fn current(&mut self) -> &Token<'a> {
        while matches!(self.tokens.get(self.pos), Some(Token::Comment(_))) {
            self.pos += 1;
        }
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Token<'a> {
        let token = self.current().clone();
        self.advance();
        token
    }

    fn expect(&mut self, expected: Token<'static>, message: &str) -> Result<()> {
        match self.next() {
            Token::Error(lex_message) => bail!(SyntaxError::new(lex_message)),
            token if token == expected => Ok(()),
            _ => bail!(SyntaxError::new(message)),
        }
    }

    fn take_identifier(&mut self, message: &str) -> Result<&'a str> {
        match self.next() {
            Token::Identifier(name) => Ok(name),
            Token::Error(lex_message) => bail!(SyntaxError::new(lex_message)),
            _ => bail!(SyntaxError::new(message)),
        }
    }

    fn take_package_name(&mut self, message: &str) -> Result<&'a str> {
        match self.next() {
            Token::PackageName(name) => Ok(name),
            Token::Error(lex_message) => bail!(SyntaxError::new(lex_message)),
            _ => bail!(SyntaxError::new(message)),
        }
    }

    fn take_version_number(&mut self) -> Result<u8> {
        match self.next() {
            Token::VersionNumber(digits) => digits
                .parse::<u8>()
                .map_err(|_| SyntaxError::new(format!("invalid version number '{digits}'")).into()),
            Token::Error(lex_message) => bail!(SyntaxError::new(lex_message)),
            _ => bail!(SyntaxError::new("expected version number")),
        }
    }
}
