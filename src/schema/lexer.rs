//! # Schema Lexer
//!
//! Tokenizes `.ent` schema source. The lexer is a byte-scanning state
//! machine: the text state dispatches on keywords and punctuation, and
//! each construct state (package name, import list, field type, field
//! name) consumes its own grammar before handing control back. This is
//! the explicit-state rendering of a state-function lexer; the token
//! contract is unchanged either way:
//!
//! - tokens are delivered in source order
//! - whitespace is never emitted
//! - errors are tokens (carrying the lexer's label), never panics
//! - `Eof` terminates the stream, as does an error
//!
//! Keywords are matched with a compile-time perfect hash map, and the
//! built-in type names live in a perfect hash set shared with the parser.
//!
//! ## Grammar notes
//!
//! Identifiers are runs of ASCII letters. Package names are letters plus
//! `.` and `_`, neither trailing. Comments run from `//` to end of line.
//! Fields are `required|optional [ [] ] <type> <name>`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut lexer = Lexer::new("user.ent", source);
//! loop {
//!     match lexer.next_token() {
//!         Token::Eof => break,
//!         token => println!("{token:?}"),
//!     }
//! }
//! ```

use phf::{phf_map, phf_set};

use crate::schema::token::Token;

/// Built-in value type names accepted in field position.
pub(crate) static BUILTIN_TYPES: phf::Set<&'static str> = phf_set! {
    "bool",
    "byte",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "float32",
    "float64",
    "string",
    "timestamp",
    "tuple",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Package,
    From,
    TypeDef,
    Version,
    Required,
    Optional,
    Namespace,
    Import,
    As,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "package" => Keyword::Package,
    "from" => Keyword::From,
    "type" => Keyword::TypeDef,
    "version" => Keyword::Version,
    "required" => Keyword::Required,
    "optional" => Keyword::Optional,
    "namespace" => Keyword::Namespace,
    "import" => Keyword::Import,
    "as" => Keyword::As,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TypeName,
    VersionNumber,
    FieldType,
    FieldBracket,
    FieldTypeName,
    FieldName,
    FieldComma,
    PackageName,
    ImportPackage,
    ImportKeyword,
    ImportList,
}

/// Pull-based tokenizer over one schema source.
pub struct Lexer<'a> {
    name: String,
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: State,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// `name` labels the source (conventionally the file name) and is
    /// prefixed to every error token.
    pub fn new(name: impl Into<String>, input: &'a str) -> Self {
        Self {
            name: name.into(),
            input,
            bytes: input.as_bytes(),
            pos: 0,
            state: State::Text,
            done: false,
        }
    }

    /// Returns the next token. After `Eof` or an error, every further
    /// call returns `Eof`.
    pub fn next_token(&mut self) -> Token<'a> {
        if self.done {
            return Token::Eof;
        }
        match self.state {
            State::Text => self.lex_text(),
            State::TypeName => self.lex_type_name(),
            State::VersionNumber => self.lex_version_number(),
            State::FieldType => self.lex_field_type(),
            State::FieldBracket => self.lex_field_bracket(),
            State::FieldTypeName => self.lex_field_type_name(),
            State::FieldName => self.lex_field_name(),
            State::FieldComma => self.lex_field_comma(),
            State::PackageName => self.lex_package_name(State::Text),
            State::ImportPackage => self.lex_package_name(State::ImportKeyword),
            State::ImportKeyword => self.lex_import_keyword(),
            State::ImportList => self.lex_import_list(),
        }
    }

    /// Drives the lexer to completion, handing each token to `handler` in
    /// source order. Stops after `Eof` or the first error token.
    pub fn run(mut self, mut handler: impl FnMut(Token<'a>)) {
        loop {
            let token = self.next_token();
            let stop = matches!(token, Token::Eof | Token::Error(_));
            handler(token);
            if stop {
                break;
            }
        }
    }

    fn lex_text(&mut self) -> Token<'a> {
        self.skip_whitespace();
        if self.is_eof() {
            self.done = true;
            return Token::Eof;
        }
        if self.starts_with(b"//") {
            return self.scan_comment();
        }

        let ch = self.bytes[self.pos];
        if ch.is_ascii_alphabetic() {
            let word = self.scan_letters();
            return match KEYWORDS.get(word) {
                Some(Keyword::Package) => {
                    self.state = State::PackageName;
                    Token::Package
                }
                Some(Keyword::From) => {
                    self.state = State::ImportPackage;
                    Token::From
                }
                Some(Keyword::TypeDef) => {
                    self.state = State::TypeName;
                    Token::TypeDef
                }
                Some(Keyword::Version) => {
                    self.state = State::VersionNumber;
                    Token::Version
                }
                Some(Keyword::Required) => {
                    self.state = State::FieldType;
                    Token::Required
                }
                Some(Keyword::Optional) => {
                    self.state = State::FieldType;
                    Token::Optional
                }
                Some(Keyword::Namespace) => Token::Namespace,
                Some(Keyword::Import) => Token::Import,
                Some(Keyword::As) => Token::As,
                None => self.error(format!("unknown token: {word:?}")),
            };
        }

        self.pos += 1;
        match ch {
            b'{' => Token::OpenBrace,
            b'}' => Token::CloseBrace,
            b'[' => Token::OpenBracket,
            b']' => Token::CloseBracket,
            b'=' => Token::Equals,
            b'*' => Token::Asterisk,
            b',' => Token::Comma,
            b'.' => Token::Period,
            b'$' => {
                let word = self.scan_letters();
                if word.is_empty() {
                    self.error("expected identifier after '$'".to_string())
                } else {
                    Token::Reference(word)
                }
            }
            other => self.error(format!("unknown token: {:?}", other as char)),
        }
    }

    fn scan_comment(&mut self) -> Token<'a> {
        let start = self.pos;
        while !self.is_eof() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        Token::Comment(&self.input[start..self.pos])
    }

    fn lex_type_name(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let word = self.scan_letters();
        if word.is_empty() {
            return self.error("expected identifier".to_string());
        }
        self.state = State::Text;
        Token::Identifier(word)
    }

    fn lex_version_number(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let start = self.pos;
        while !self.is_eof() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        self.state = State::Text;
        if start == self.pos {
            // No digits: hand back to the text state, the parser reports it.
            return self.next_token();
        }
        Token::VersionNumber(&self.input[start..self.pos])
    }

    fn lex_field_type(&mut self) -> Token<'a> {
        self.skip_whitespace();
        if self.starts_with(b"[") {
            self.pos += 1;
            self.state = State::FieldBracket;
            return Token::OpenBracket;
        }
        self.lex_field_type_name()
    }

    fn lex_field_bracket(&mut self) -> Token<'a> {
        if self.starts_with(b"]") {
            self.pos += 1;
            self.state = State::FieldTypeName;
            return Token::CloseBracket;
        }
        self.error("expected ]".to_string())
    }

    fn lex_field_type_name(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let word = self.scan_letters();
        if word.is_empty() {
            return self.error("expected identifier".to_string());
        }
        self.state = State::FieldName;
        Token::ValueType(word)
    }

    fn lex_field_name(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let word = self.scan_letters();
        if word.is_empty() {
            return self.error("expected identifier".to_string());
        }
        // A comma directly after the name declares another field of the
        // same type.
        self.state = if self.starts_with(b",") {
            State::FieldComma
        } else {
            State::Text
        };
        Token::Identifier(word)
    }

    fn lex_field_comma(&mut self) -> Token<'a> {
        self.pos += 1;
        self.state = State::FieldName;
        Token::Comma
    }

    fn lex_package_name(&mut self, next: State) -> Token<'a> {
        self.skip_whitespace();
        let start = self.pos;
        let mut last_separator = false;
        while !self.is_eof() {
            let ch = self.bytes[self.pos];
            if ch.is_ascii_alphabetic() {
                last_separator = false;
            } else if ch == b'.' || ch == b'_' {
                last_separator = true;
            } else if ch.is_ascii_whitespace() {
                break;
            } else {
                return self.error("expected newline after package name".to_string());
            }
            self.pos += 1;
        }
        if start == self.pos {
            return self.error("expected package name".to_string());
        }
        if last_separator {
            return self.error("package names cannot end with a period or underscore".to_string());
        }
        self.state = next;
        Token::PackageName(&self.input[start..self.pos])
    }

    fn lex_import_keyword(&mut self) -> Token<'a> {
        self.skip_whitespace();
        let word = self.scan_letters();
        if word != "import" {
            return self.error("expected 'import' keyword".to_string());
        }
        self.state = State::ImportList;
        Token::Import
    }

    fn lex_import_list(&mut self) -> Token<'a> {
        // The import list ends at the line break, so only spaces and tabs
        // are skipped here.
        while !self.is_eof() && matches!(self.bytes[self.pos], b' ' | b'\t' | b'\r') {
            self.pos += 1;
        }
        if self.is_eof() || self.bytes[self.pos] == b'\n' {
            self.state = State::Text;
            return self.next_token();
        }
        let ch = self.bytes[self.pos];
        if ch == b'*' {
            self.pos += 1;
            self.state = State::Text;
            return Token::Asterisk;
        }
        if ch == b',' {
            self.pos += 1;
            return Token::Comma;
        }
        if ch.is_ascii_alphabetic() {
            let word = self.scan_letters();
            return Token::Identifier(word);
        }
        self.error(format!("unexpected character in import list: {:?}", ch as char))
    }

    fn error(&mut self, message: String) -> Token<'a> {
        self.done = true;
        Token::Error(format!("{}: {}", self.name, message))
    }

    fn scan_letters(&mut self) -> &'a str {
        let start = self.pos;
        while !self.is_eof() && self.bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(prefix)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}
