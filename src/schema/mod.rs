//! # Schema Language
//!
//! The `.ent` schema language declares packages, imports, types, versions
//! and fields:
//!
//! ```text
//! // user schema
//! package com.example
//! from common import Location
//!
//! type User {
//!     version 1 {
//!         required string uuid
//!         required string username
//!         optional uint8 age
//!     }
//!     version 2 {
//!         optional Location location
//!     }
//! }
//! ```
//!
//! The subsystem is independent of the wire format: it consumes UTF-8
//! source text and produces a [`Package`] AST; [`compile`] then turns the
//! AST into [`TupleType`](crate::TupleType) values for the registry and
//! builder.
//!
//! ## Module Structure
//!
//! - `token`: the token kinds
//! - `lexer`: byte-scanning state-machine tokenizer
//! - `parser`: recursive descent into the AST
//! - `ast`: Package, Import, TypeDecl, VersionDecl, FieldDecl
//! - `compile`: AST to TupleType

pub mod ast;
pub mod compile;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{FieldDecl, Import, Package, TypeDecl, VersionDecl};
pub use compile::compile;
pub use lexer::Lexer;
pub use parser::{Parser, SyntaxError};
pub use token::Token;
