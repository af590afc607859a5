//! # Schema Tokens
//!
//! Token definitions for the `.ent` schema language. String-carrying
//! tokens borrow directly from the input, so tokenizing allocates only
//! for error messages.

/// A lexed token. Errors are tokens, not panics: the lexer reports a
/// failure by emitting `Error` with a message that names its label, then
/// terminates the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Error(String),
    Eof,
    /// A `//` comment, slashes included, without the trailing newline.
    Comment(&'a str),
    /// The `type` keyword.
    TypeDef,
    /// The `version` keyword.
    Version,
    /// A built-in or user-defined type name in field position.
    ValueType(&'a str),
    Required,
    Optional,
    /// The digits following `version`.
    VersionNumber(&'a str),
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Equals,
    /// A type or field name.
    Identifier(&'a str),
    /// A `$name` type reference.
    Reference(&'a str),
    Comma,
    Period,
    Namespace,
    Import,
    From,
    As,
    Package,
    /// The dotted name following `package` or `from`.
    PackageName(&'a str),
    Asterisk,
}

impl Token<'_> {
    /// The literal-ish rendering used in parser error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Error(message) => message.clone(),
            Token::Eof => "end of input".to_string(),
            Token::Comment(text) => (*text).to_string(),
            Token::TypeDef => "type".to_string(),
            Token::Version => "version".to_string(),
            Token::ValueType(name) => (*name).to_string(),
            Token::Required => "required".to_string(),
            Token::Optional => "optional".to_string(),
            Token::VersionNumber(digits) => (*digits).to_string(),
            Token::OpenBrace => "{".to_string(),
            Token::CloseBrace => "}".to_string(),
            Token::OpenBracket => "[".to_string(),
            Token::CloseBracket => "]".to_string(),
            Token::Equals => "=".to_string(),
            Token::Identifier(name) => (*name).to_string(),
            Token::Reference(name) => format!("${name}"),
            Token::Comma => ",".to_string(),
            Token::Period => ".".to_string(),
            Token::Namespace => "namespace".to_string(),
            Token::Import => "import".to_string(),
            Token::From => "from".to_string(),
            Token::As => "as".to_string(),
            Token::Package => "package".to_string(),
            Token::PackageName(name) => (*name).to_string(),
            Token::Asterisk => "*".to_string(),
        }
    }
}
