//! # Schema AST
//!
//! The tree produced by the parser. Identifiers borrow from the input
//! text; [`compile`](crate::schema::compile) turns a `Package` into owned
//! [`TupleType`](crate::tuple::TupleType) values.

/// An entire schema document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package<'a> {
    pub name: &'a str,
    pub imports: Vec<Import<'a>>,
    pub types: Vec<TypeDecl<'a>>,
}

/// References one or more types from another package, or all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import<'a> {
    pub package: &'a str,
    pub type_names: Vec<&'a str>,
    pub wildcard: bool,
}

/// A tuple type declaration with its versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl<'a> {
    pub name: &'a str,
    pub versions: Vec<VersionDecl<'a>>,
}

/// The only construct for adding fields to a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDecl<'a> {
    pub number: u8,
    pub fields: Vec<FieldDecl<'a>>,
}

/// A field declaration. Brackets before the type make it an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl<'a> {
    pub required: bool,
    pub array: bool,
    pub type_name: &'a str,
    pub name: &'a str,
}
