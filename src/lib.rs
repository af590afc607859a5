//! # entuple - Self-Describing Binary Tuple Serialization
//!
//! entuple is a compact binary serialization format for schema-defined
//! record types ("tuples"), together with the engine that encodes and
//! decodes them and the declarative language that describes them. Every
//! field carries a tag byte and a width-adaptive length, and every tuple
//! is identified by a pair of 32-bit FNV-1a hashes (namespace, type name),
//! so producers and consumers negotiate types by identity rather than by
//! layout.
//!
//! ## Quick Start
//!
//! ```ignore
//! use entuple::{Field, FieldType, Registry, TupleBuilder, TupleType};
//!
//! let mut user = TupleType::new("app", "user");
//! user.add_version(vec![
//!     Field::new("uuid", true, FieldType::String),
//!     Field::new("age", false, FieldType::Uint8),
//! ])?;
//!
//! let registry = Registry::new();
//! registry.register(user.clone());
//!
//! let mut buffer = vec![0u8; 1024];
//! let mut builder = TupleBuilder::new(user, &mut buffer);
//! builder.put_string("uuid", "ab-cd-ef")?;
//! builder.put_uint8("age", 29)?;
//! let tuple = builder.build()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------+
//! |      Schema DSL (lexer/parser/compile)     |
//! +--------------------------------------------+
//! |  TupleType / Version / Field   |  Registry |
//! +--------------------------------------------+
//! |   TupleBuilder  ->  Tuple  <-  accessors   |
//! +--------------------------------------------+
//! |      TupleHeader (offset table, hashes)    |
//! +--------------------------------------------+
//! |    Wire envelope (Encoder / Decoder)       |
//! +--------------------------------------------+
//! ```
//!
//! A producer obtains a [`TupleType`], fills a [`TupleBuilder`] against
//! its own buffer, and seals a [`Tuple`]. An [`Encoder`] frames the tuple
//! onto any writer. A [`Decoder`] reads frames from any reader, resolves
//! the type through a [`Registry`], and reconstructs the tuple. The
//! schema subsystem is independent: it turns `.ent` source text into a
//! `Package` AST from which tuple types are compiled.
//!
//! ## Module Overview
//!
//! - [`codes`]: the tag-byte table and size classes
//! - [`hash`]: stable FNV-1a name hashing
//! - [`registry`]: concurrent type registry
//! - [`tuple`]: types, builder, header, sealed tuples, accessors
//! - [`wire`]: framing envelope, encoder, decoder
//! - [`schema`]: the `.ent` schema language

pub mod codes;
pub mod error;
pub mod hash;
pub mod registry;
pub mod schema;
pub mod tuple;
pub mod wire;

pub use codes::{SizeClass, TypeCode};
pub use error::TupleError;
pub use registry::Registry;
pub use tuple::{Field, FieldType, Tuple, TupleBuilder, TupleHeader, TupleType, Version};
pub use wire::{Decoder, Encoder};
