//! # Schema Compilation
//!
//! Turns a parsed [`Package`] into frozen [`TupleType`] values ready for
//! registration and building. The package name becomes the namespace of
//! every type it declares. Version numbers are validated against their
//! 1-based positions, and field declarations are mapped onto the closed
//! [`FieldType`] set; any non-built-in type name (imported or declared
//! elsewhere) is a nested tuple.

use eyre::{bail, Result};

use crate::schema::ast::{FieldDecl, Package};
use crate::schema::parser::SyntaxError;
use crate::tuple::{Field, FieldType, TupleType};

/// Compiles every type declared by the package.
pub fn compile(package: &Package<'_>) -> Result<Vec<TupleType>> {
    let mut types = Vec::with_capacity(package.types.len());
    for decl in &package.types {
        let mut tuple_type = TupleType::new(package.name, decl.name);
        for (position, version) in decl.versions.iter().enumerate() {
            let expected = position as u8 + 1;
            if version.number != expected {
                bail!(SyntaxError::new(format!(
                    "version numbers must be sequential starting at 1: type '{}' declares version {} in position {}",
                    decl.name, version.number, expected
                )));
            }
            let fields = version
                .fields
                .iter()
                .map(|field| Ok(Field::new(field.name, field.required, field_type(field)?)))
                .collect::<Result<Vec<_>>>()?;
            tuple_type.add_version(fields)?;
        }
        types.push(tuple_type);
    }
    Ok(types)
}

fn field_type(field: &FieldDecl<'_>) -> Result<FieldType> {
    if field.array {
        return Ok(match field.type_name {
            "bool" => FieldType::BoolArray,
            // An array of bytes is the byte-array category, not a
            // per-element encoding.
            "byte" => FieldType::Bytes,
            "uint8" => FieldType::Uint8Array,
            "uint16" => FieldType::Uint16Array,
            "uint32" => FieldType::Uint32Array,
            "uint64" => FieldType::Uint64Array,
            "int8" => FieldType::Int8Array,
            "int16" => FieldType::Int16Array,
            "int32" => FieldType::Int32Array,
            "int64" => FieldType::Int64Array,
            "float32" => FieldType::Float32Array,
            "float64" => FieldType::Float64Array,
            "timestamp" => FieldType::TimestampArray,
            "tuple" => FieldType::TupleArray,
            "string" => bail!(SyntaxError::new(format!(
                "type 'string' cannot be an array (field '{}')",
                field.name
            ))),
            _ => FieldType::TupleArray,
        });
    }
    Ok(match field.type_name {
        "bool" => FieldType::Bool,
        "byte" | "uint8" => FieldType::Uint8,
        "uint16" => FieldType::Uint16,
        "uint32" => FieldType::Uint32,
        "uint64" => FieldType::Uint64,
        "int8" => FieldType::Int8,
        "int16" => FieldType::Int16,
        "int32" => FieldType::Int32,
        "int64" => FieldType::Int64,
        "float32" => FieldType::Float32,
        "float64" => FieldType::Float64,
        "string" => FieldType::String,
        "timestamp" => FieldType::Timestamp,
        "tuple" => FieldType::Tuple,
        _ => FieldType::Tuple,
    })
}
