//! End-to-end schema language scenarios: lex, parse, compile, then build
//! tuples from the compiled types.

use std::io::Cursor;

use entuple::schema::{compile, Parser, SyntaxError};
use entuple::{Decoder, Encoder, FieldType, Registry, TupleBuilder};

#[test]
fn a_minimal_type_parses_into_the_expected_ast() {
    let mut parser = Parser::new(
        "user.ent",
        "package demo\ntype User { version 1 { required string uuid } }",
    );
    let package = parser.parse().unwrap();

    assert_eq!(package.name, "demo");
    assert_eq!(package.types.len(), 1);
    let user = &package.types[0];
    assert_eq!(user.name, "User");
    assert_eq!(user.versions.len(), 1);
    assert_eq!(user.versions[0].number, 1);
    let field = &user.versions[0].fields[0];
    assert!(field.required);
    assert!(!field.array);
    assert_eq!(field.type_name, "string");
    assert_eq!(field.name, "uuid");
}

#[test]
fn lexer_token_stream_matches_the_source_order() {
    let mut tokens = Vec::new();
    entuple::schema::Lexer::new("user.ent", "package demo\ntype User {}")
        .run(|token| tokens.push(token.describe()));
    assert_eq!(
        tokens,
        vec!["package", "demo", "type", "User", "{", "}", "end of input"]
    );
}

#[test]
fn a_full_schema_compiles_and_round_trips() {
    let source = "\
// user management schema
package com.example.users

from common import Location

type User {
    version 1 {
        required string uuid
        required string username
        optional uint8 age
    }
    version 2 {
        optional Location location
        optional [] uint32 scores
    }
}

type Session {
    version 1 {
        required string token
        required timestamp started
    }
}
";
    let mut parser = Parser::new("users.ent", source);
    let package = parser.parse().unwrap();
    assert_eq!(package.name, "com.example.users");
    let types = compile(&package).unwrap();
    assert_eq!(types.len(), 2);

    let user = types[0].clone();
    assert_eq!(user.namespace(), "com.example.users");
    assert_eq!(user.field_count(), 5);
    assert_eq!(
        user.field("scores").unwrap().field_type,
        FieldType::Uint32Array
    );
    assert_eq!(
        user.field("location").unwrap().field_type,
        FieldType::Tuple
    );

    let registry = Registry::new();
    for t in &types {
        registry.register(t.clone());
    }
    assert_eq!(registry.len(), 2);
    assert!(registry.contains_name("com.example.users", "Session"));

    let mut buffer = vec![0u8; 256];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "ab-cd").unwrap();
    builder.put_string("username", "bugs").unwrap();
    builder.put_uint32_array("scores", &[3, 700]).unwrap();
    let tuple = builder.build().unwrap();
    assert_eq!(tuple.header.tuple_version, 2);

    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&tuple).unwrap();
    let frame = encoder.into_inner().unwrap();
    let mut decoder = Decoder::new(registry, 4096, Cursor::new(frame));
    let decoded = decoder.decode().unwrap();
    assert_eq!(decoded.get_string("username").unwrap(), Some("bugs"));
    assert_eq!(
        decoded.get_uint32_array("scores").unwrap(),
        Some(vec![3, 700])
    );
}

#[test]
fn schema_errors_are_syntax_errors_with_messages() {
    for (source, needle) in [
        ("", "empty input string"),
        ("type User {}", "expected package declaration"),
        ("package demo\ntype User { version { } }", "expected version number"),
        (
            "package demo\ntype User { version 1 { required Widget w } }",
            "unknown type 'Widget'",
        ),
        ("package demo_\n", "period or underscore"),
    ] {
        let err = Parser::new("bad.ent", source).parse().unwrap_err();
        assert!(
            err.downcast_ref::<SyntaxError>().is_some(),
            "expected SyntaxError for {source:?}"
        );
        assert!(
            err.to_string().contains(needle),
            "message {:?} should contain {needle:?}",
            err.to_string()
        );
    }
}
