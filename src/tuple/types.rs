//! # Field Types and Tuple Schemas
//!
//! This module defines the in-memory schema representation:
//!
//! - `FieldType`: the closed set of logical field categories
//! - `Field`: a named, typed, required-or-optional declaration
//! - `Version`: a numbered group of fields appended to a type
//! - `TupleType`: a named record schema identified by two FNV-1a hashes
//!
//! A tuple type is built once, versions are appended in declaration order,
//! and the type is then treated as frozen. Field names are unique across
//! all versions and every field gets a dense index in declaration order;
//! that index is the field's position in the header offset table.

use eyre::{ensure, Result};
use hashbrown::HashMap;

use crate::hash::hash_name;

/// Logical field categories understood by the schema and the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Timestamp,
    Bytes,
    Tuple,
    BoolArray,
    Uint8Array,
    Uint16Array,
    Uint32Array,
    Uint64Array,
    Int8Array,
    Int16Array,
    Int32Array,
    Int64Array,
    Float32Array,
    Float64Array,
    TimestampArray,
    TupleArray,
}

impl FieldType {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            FieldType::BoolArray
                | FieldType::Uint8Array
                | FieldType::Uint16Array
                | FieldType::Uint32Array
                | FieldType::Uint64Array
                | FieldType::Int8Array
                | FieldType::Int16Array
                | FieldType::Int32Array
                | FieldType::Int64Array
                | FieldType::Float32Array
                | FieldType::Float64Array
                | FieldType::TimestampArray
                | FieldType::TupleArray
        )
    }
}

/// A single field declaration. Immutable once its version is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub required: bool,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, required: bool, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            required,
            field_type,
        }
    }
}

/// A numbered set of fields. The number equals the version's 1-based
/// position; later versions only ever add fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub number: u8,
    pub fields: Vec<Field>,
}

/// The tuple version field in the header is 6 bits wide.
pub const MAX_VERSIONS: usize = 63;

/// A named record schema, identified on the wire by the FNV-1a hashes of
/// its namespace and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleType {
    namespace: String,
    name: String,
    namespace_hash: u32,
    type_hash: u32,
    versions: Vec<Version>,
    field_index: HashMap<String, usize>,
}

impl TupleType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let namespace_hash = hash_name(&namespace);
        let type_hash = hash_name(&name);
        Self {
            namespace,
            name,
            namespace_hash,
            type_hash,
            versions: Vec::new(),
            field_index: HashMap::new(),
        }
    }

    /// Appends the next version. Fails on a duplicate field name or when
    /// the 6-bit version space is exhausted.
    pub fn add_version(&mut self, fields: Vec<Field>) -> Result<()> {
        ensure!(
            self.versions.len() < MAX_VERSIONS,
            "tuple type '{}' cannot have more than {} versions",
            self.name,
            MAX_VERSIONS
        );
        for field in &fields {
            ensure!(
                !self.field_index.contains_key(&field.name),
                "duplicate field '{}' in tuple type '{}'",
                field.name,
                self.name
            );
        }
        for field in &fields {
            let index = self.field_index.len();
            self.field_index.insert(field.name.clone(), index);
        }
        self.versions.push(Version {
            number: self.versions.len() as u8 + 1,
            fields,
        });
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace_hash(&self) -> u32 {
        self.namespace_hash
    }

    pub fn type_hash(&self) -> u32 {
        self.type_hash
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_index.contains_key(field)
    }

    /// Dense index of a field, assigned in declaration order across all
    /// versions. This is the field's slot in the header offset table.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.field_index.get(field).copied()
    }

    /// Total number of fields across all versions.
    pub fn field_count(&self) -> usize {
        self.field_index.len()
    }

    /// Looks up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.versions
            .iter()
            .flat_map(|version| version.fields.iter())
            .find(|field| field.name == name)
    }
}
