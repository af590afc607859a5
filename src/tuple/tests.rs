//! Tests for the tuple subsystem

use super::*;

use crate::codes::{SizeClass, TypeCode};
use crate::error::TupleError;
use crate::registry::Registry;
use crate::wire::decoder::decode_tuple;

fn user_type() -> TupleType {
    let mut user = TupleType::new("testing", "user");
    user.add_version(vec![
        Field::new("uuid", true, FieldType::String),
        Field::new("username", true, FieldType::String),
        Field::new("age", false, FieldType::Uint8),
    ])
    .unwrap();
    user.add_version(vec![Field::new("location", false, FieldType::Tuple)])
        .unwrap();
    user
}

fn location_type() -> TupleType {
    let mut location = TupleType::new("testing", "location");
    location
        .add_version(vec![
            Field::new("address", true, FieldType::String),
            Field::new("zip", true, FieldType::Uint32),
        ])
        .unwrap();
    location
}

fn int_pair(name: &str, a: FieldType, b: FieldType) -> TupleType {
    let mut t = TupleType::new("testing", name);
    t.add_version(vec![Field::new("a", true, a), Field::new("b", true, b)])
        .unwrap();
    t
}

#[test]
fn tuple_type_assigns_dense_indices_in_declaration_order() {
    let user = user_type();
    assert_eq!(user.field_index("uuid"), Some(0));
    assert_eq!(user.field_index("username"), Some(1));
    assert_eq!(user.field_index("age"), Some(2));
    assert_eq!(user.field_index("location"), Some(3));
    assert_eq!(user.field_count(), 4);
    assert!(user.contains("age"));
    assert!(!user.contains("school"));
}

#[test]
fn tuple_type_hashes_namespace_and_name() {
    let user = user_type();
    assert_eq!(user.namespace_hash(), crate::hash::hash_name("testing"));
    assert_eq!(user.type_hash(), crate::hash::hash_name("user"));
}

#[test]
fn tuple_type_rejects_duplicate_fields_across_versions() {
    let mut user = TupleType::new("testing", "user");
    user.add_version(vec![Field::new("uuid", true, FieldType::String)])
        .unwrap();
    let err = user
        .add_version(vec![Field::new("uuid", false, FieldType::Uint8)])
        .unwrap_err();
    assert!(err.to_string().contains("duplicate field"));
}

#[test]
fn builder_starts_with_the_whole_buffer_available() {
    let user = user_type();
    let mut buffer = vec![0u8; 1024];
    let builder = TupleBuilder::new(user.clone(), &mut buffer);
    assert_eq!(builder.available(), 1024);
    assert_eq!(builder.position(), 0);
    assert_eq!(builder.tuple_type(), &user);
}

#[test]
fn put_rejects_unknown_fields() {
    let mut buffer = vec![0u8; 16];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    let err = builder.put_uint8("school", 1).unwrap_err();
    assert_eq!(
        err.downcast_ref::<TupleError>(),
        Some(&TupleError::UnknownField("school".to_string()))
    );
}

#[test]
fn put_rejects_type_mismatches() {
    let mut buffer = vec![0u8; 16];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    let err = builder.put_uint8("uuid", 1).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TupleError>(),
        Some(TupleError::TypeMismatch { field, .. }) if field == "uuid"
    ));
    assert_eq!(builder.position(), 0);
}

#[test]
fn put_uint8_writes_tag_then_value() {
    let user = user_type();
    let mut buffer = vec![0u8; 2];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    let wrote = builder.put_uint8("age", 20).unwrap();
    assert_eq!(wrote, 2);
    assert_eq!(builder.position(), 2);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint8.as_u8());
    assert_eq!(buffer[1], 20);
}

#[test]
fn failed_space_check_leaves_the_cursor_alone() {
    let user = user_type();
    let mut buffer = vec![0u8; 1];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    let err = builder.put_uint8("age", 20).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TupleError>(),
        Some(TupleError::BufferTooSmall {
            required: 2,
            available: 1,
        })
    ));
    assert_eq!(builder.position(), 0);
}

#[test]
fn put_uint16_narrows_small_values() {
    let t = int_pair("uint16", FieldType::Int16, FieldType::Uint16);
    let mut buffer = vec![0u8; 8];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_uint16("b", 20).unwrap(), 2);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint16As8.as_u8());
    assert_eq!(buffer[1], 20);
}

#[test]
fn put_uint16_keeps_wide_values_wide() {
    let t = int_pair("uint16", FieldType::Int16, FieldType::Uint16);
    let mut buffer = vec![0u8; 8];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_uint16("b", 300).unwrap(), 3);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint16As16.as_u8());
    assert_eq!(u16::from_le_bytes([buffer[1], buffer[2]]), 300);
}

#[test]
fn put_uint16_max_value_stays_in_family() {
    let t = int_pair("uint16", FieldType::Int16, FieldType::Uint16);
    let mut buffer = vec![0u8; 8];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_uint16("b", u16::MAX).unwrap(), 3);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint16As16.as_u8());
}

#[test]
fn put_uint32_selects_each_width() {
    let t = int_pair("uint32", FieldType::Int32, FieldType::Uint32);
    for (value, tag, wrote) in [
        (20u32, TypeCode::Uint32As8, 2usize),
        (300, TypeCode::Uint32As16, 3),
        (135_000, TypeCode::Uint32As32, 5),
    ] {
        let mut buffer = vec![0u8; 8];
        let mut builder = TupleBuilder::new(t.clone(), &mut buffer);
        assert_eq!(builder.put_uint32("b", value).unwrap(), wrote);
        drop(builder);
        assert_eq!(buffer[0], tag.as_u8());
    }
}

#[test]
fn put_uint64_selects_each_width() {
    let t = int_pair("uint64", FieldType::Int64, FieldType::Uint64);
    for (value, tag, wrote) in [
        (20u64, TypeCode::Uint64As8, 2usize),
        (300, TypeCode::Uint64As16, 3),
        (135_000, TypeCode::Uint64As32, 5),
        (1 << 34, TypeCode::Uint64As64, 9),
    ] {
        let mut buffer = vec![0u8; 16];
        let mut builder = TupleBuilder::new(t.clone(), &mut buffer);
        assert_eq!(builder.put_uint64("b", value).unwrap(), wrote);
        drop(builder);
        assert_eq!(buffer[0], tag.as_u8());
    }
}

#[test]
fn put_int8_writes_twos_complement() {
    let t = int_pair("int8", FieldType::Int8, FieldType::Uint8);
    let mut buffer = vec![0u8; 4];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_int8("a", -20).unwrap(), 2);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Int8.as_u8());
    assert_eq!(buffer[1] as i8, -20);
}

#[test]
fn put_int16_narrowing_preserves_sign() {
    let t = int_pair("int16", FieldType::Int16, FieldType::Uint16);
    let mut buffer = vec![0u8; 8];
    let mut builder = TupleBuilder::new(t.clone(), &mut buffer);
    assert_eq!(builder.put_int16("a", 20).unwrap(), 2);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Int16As8.as_u8());
    assert_eq!(buffer[1] as i8, 20);

    let mut buffer = vec![0u8; 8];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_int16("a", -300).unwrap(), 3);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Int16As16.as_u8());
    assert_eq!(i16::from_le_bytes([buffer[1], buffer[2]]), -300);
}

#[test]
fn put_int64_selects_each_width() {
    let t = int_pair("int64", FieldType::Int64, FieldType::Uint64);
    for (value, tag, wrote) in [
        (20i64, TypeCode::Int64As8, 2usize),
        (-300, TypeCode::Int64As16, 3),
        (135_000, TypeCode::Int64As32, 5),
        (1 << 34, TypeCode::Int64As64, 9),
        (i64::MIN, TypeCode::Int64As64, 9),
    ] {
        let mut buffer = vec![0u8; 16];
        let mut builder = TupleBuilder::new(t.clone(), &mut buffer);
        assert_eq!(builder.put_int64("a", value).unwrap(), wrote);
        drop(builder);
        assert_eq!(buffer[0], tag.as_u8());
    }
}

#[test]
fn floats_are_always_fixed_width() {
    let t = int_pair("float", FieldType::Float32, FieldType::Float64);
    let mut buffer = vec![0u8; 16];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_float32("a", 3.14159).unwrap(), 5);
    assert_eq!(builder.put_float64("b", 3.14159).unwrap(), 9);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Float32.as_u8());
    assert_eq!(
        f32::from_le_bytes(buffer[1..5].try_into().unwrap()),
        3.14159
    );
    assert_eq!(buffer[5], TypeCode::Float64.as_u8());
    assert_eq!(
        f64::from_le_bytes(buffer[6..14].try_into().unwrap()),
        3.14159
    );
}

#[test]
fn timestamps_are_always_nine_bytes() {
    let mut t = TupleType::new("testing", "time");
    t.add_version(vec![Field::new("at", true, FieldType::Timestamp)])
        .unwrap();
    let nanos = 1_700_000_000_000_000_123i64;
    let mut buffer = vec![0u8; 16];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_timestamp("at", nanos).unwrap(), 9);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Timestamp.as_u8());
    assert_eq!(i64::from_le_bytes(buffer[1..9].try_into().unwrap()), nanos);
}

#[test]
fn put_string_uses_one_byte_prefix_for_short_strings() {
    let user = user_type();
    let mut buffer = vec![0u8; 12];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    assert_eq!(builder.put_string("uuid", "tuplecraft").unwrap(), 12);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::String8.as_u8());
    assert_eq!(buffer[1], 10);
    assert_eq!(&buffer[2..12], b"tuplecraft");
}

#[test]
fn put_string_widens_the_prefix_with_length() {
    let user = user_type();

    let mut buffer = vec![0u8; 303];
    let mut builder = TupleBuilder::new(user.clone(), &mut buffer);
    let input = "x".repeat(300);
    assert_eq!(builder.put_string("uuid", &input).unwrap(), 303);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::String16.as_u8());
    assert_eq!(u16::from_le_bytes([buffer[1], buffer[2]]), 300);

    let mut buffer = vec![0u8; 135_005];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    let input = "x".repeat(135_000);
    assert_eq!(builder.put_string("uuid", &input).unwrap(), 135_005);
    drop(builder);
    assert_eq!(buffer[0], TypeCode::String32.as_u8());
    assert_eq!(
        u32::from_le_bytes(buffer[1..5].try_into().unwrap()),
        135_000
    );
}

#[test]
fn put_records_the_offset_of_the_tag_byte() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    builder.put_uint8("age", 25).unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(tuple.offset("uuid").unwrap(), Some(0));
    assert_eq!(tuple.offset("username").unwrap(), Some(5));
    assert_eq!(tuple.offset("age").unwrap(), Some(8));
    assert_eq!(tuple.payload()[8], TypeCode::Uint8.as_u8());
}

#[test]
fn repeated_puts_are_later_wins() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    builder.put_string("uuid", "def").unwrap();
    builder.put_uint8("age", 1).unwrap();
    let tuple = builder.build().unwrap();

    // The first uuid record stays behind as dead payload.
    assert_eq!(tuple.offset("uuid").unwrap(), Some(8));
    assert_eq!(tuple.get_string("uuid").unwrap(), Some("def"));
}

#[test]
fn build_reports_the_highest_satisfied_version_prefix() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    builder.put_uint8("age", 25).unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(tuple.header.tuple_version, 1);
    assert_eq!(tuple.header.field_count, 4);
    assert_eq!(tuple.header.offsets[3], u64::MAX);
    assert_eq!(tuple.offset("location").unwrap(), None);
}

#[test]
fn build_counts_later_versions_once_their_fields_appear() {
    let registry = Registry::new();
    registry.register(location_type());

    let mut loc_buffer = vec![0u8; 64];
    let mut loc_builder = TupleBuilder::new(location_type(), &mut loc_buffer);
    loc_builder.put_string("address", "12 Appleberry Ln").unwrap();
    loc_builder.put_uint32("zip", 35_749).unwrap();
    let location = loc_builder.build().unwrap();

    let mut buffer = vec![0u8; 256];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    builder.put_tuple("location", &location).unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(tuple.header.tuple_version, 2);
    let nested = tuple.get_tuple("location", &registry).unwrap().unwrap();
    assert!(nested.is(&location_type()));
    assert_eq!(nested.get_uint32("zip").unwrap(), Some(35_749));
}

#[test]
fn build_fails_without_required_fields() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("username", "x").unwrap();
    builder.put_uint8("age", 25).unwrap();
    let err = builder.build().unwrap_err();
    assert_eq!(
        err.downcast_ref::<TupleError>(),
        Some(&TupleError::MissingRequiredField("uuid".to_string()))
    );
    // A failing build leaves the builder reset.
    assert_eq!(builder.position(), 0);
}

#[test]
fn a_gap_version_caps_the_tuple_version() {
    let mut t = TupleType::new("testing", "gapped");
    t.add_version(vec![Field::new("a", true, FieldType::Uint8)])
        .unwrap();
    t.add_version(vec![Field::new("b", true, FieldType::Uint8)])
        .unwrap();
    t.add_version(vec![Field::new("c", false, FieldType::Uint8)])
        .unwrap();

    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    builder.put_uint8("a", 1).unwrap();
    builder.put_uint8("c", 3).unwrap();
    let tuple = builder.build().unwrap();

    // Version 2 is unsatisfied, so version 3 cannot be claimed even
    // though its field was written.
    assert_eq!(tuple.header.tuple_version, 1);
    assert_eq!(tuple.offset("c").unwrap(), Some(2));
}

#[test]
fn build_resets_the_builder_for_reuse() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    let first = builder.build().unwrap();
    assert_eq!(builder.position(), 0);

    builder.put_string("uuid", "def").unwrap();
    builder.put_string("username", "y").unwrap();
    let second = builder.build().unwrap();

    assert_eq!(first.get_string("uuid").unwrap(), Some("abc"));
    assert_eq!(second.get_string("uuid").unwrap(), Some("def"));
}

#[test]
fn header_width_follows_content_length() {
    let user = user_type();

    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user.clone(), &mut buffer);
    builder.put_string("uuid", "a").unwrap();
    builder.put_string("username", "b").unwrap();
    let small = builder.build().unwrap();
    assert_eq!(small.header.field_size, SizeClass::One);

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", &"x".repeat(300)).unwrap();
    builder.put_string("username", "b").unwrap();
    let large = builder.build().unwrap();
    assert_eq!(large.header.field_size, SizeClass::Two);
}

#[test]
fn header_size_counts_prefix_table_and_length() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "a").unwrap();
    builder.put_string("username", "b").unwrap();
    let tuple = builder.build().unwrap();

    // 13 fixed + 4 offsets * 1 byte + 1 byte content length.
    assert_eq!(tuple.header.size(), 18);
}

#[test]
fn header_encode_rejects_offset_count_mismatch() {
    let user = user_type();
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user, &mut buffer);
    builder.put_string("uuid", "a").unwrap();
    builder.put_string("username", "b").unwrap();
    let mut tuple = builder.build().unwrap();

    tuple.header.offsets.pop();
    let mut dst = vec![0u8; 64];
    let err = tuple.header.encode(&mut dst).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TupleError>(),
        Some(TupleError::InvalidHeader(_))
    ));
}

#[test]
fn sentinel_offsets_survive_a_wide_header_round_trip() {
    let registry = Registry::new();
    registry.register(user_type());

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", &"x".repeat(300)).unwrap();
    builder.put_string("username", "b").unwrap();
    let tuple = builder.build().unwrap();
    assert_eq!(tuple.header.field_size, SizeClass::Two);

    let mut body = vec![0u8; tuple.header.size() + tuple.size()];
    tuple.write(&mut body).unwrap();
    let decoded = decode_tuple(&registry, &body).unwrap();

    assert_eq!(decoded.header.offsets[2], u64::MAX);
    assert_eq!(decoded.header.offsets[3], u64::MAX);
    assert_eq!(decoded.offset("age").unwrap(), None);
}

#[test]
fn tuple_write_round_trips_through_decode() {
    let registry = Registry::new();
    registry.register(user_type());

    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    builder.put_uint8("age", 25).unwrap();
    let tuple = builder.build().unwrap();

    let mut body = vec![0u8; tuple.header.size() + tuple.size()];
    let wrote = tuple.write(&mut body).unwrap();
    assert_eq!(wrote, body.len());

    let decoded = decode_tuple(&registry, &body).unwrap();
    assert_eq!(decoded.header, tuple.header);
    assert_eq!(decoded.payload(), tuple.payload());
}

#[test]
fn tuple_write_rejects_short_buffers() {
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    let tuple = builder.build().unwrap();

    let mut short = vec![0u8; 4];
    let err = tuple.write(&mut short).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TupleError>(),
        Some(TupleError::BufferTooSmall { .. })
    ));
}

#[test]
fn tuple_identity_compares_both_hashes() {
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    let tuple = builder.build().unwrap();

    assert!(tuple.is(&user_type()));
    assert!(!tuple.is(&location_type()));

    let mut other_namespace = TupleType::new("elsewhere", "user");
    other_namespace
        .add_version(vec![Field::new("uuid", true, FieldType::String)])
        .unwrap();
    assert!(!tuple.is(&other_namespace));
}

#[test]
fn offset_rejects_unknown_fields_and_index_disagreement() {
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    let mut tuple = builder.build().unwrap();

    let err = tuple.offset("school").unwrap_err();
    assert_eq!(
        err.downcast_ref::<TupleError>(),
        Some(&TupleError::UnknownField("school".to_string()))
    );

    // Shrink the header behind the schema's back; the guard must trip.
    tuple.header.field_count = 2;
    tuple.header.offsets.truncate(2);
    let err = tuple.offset("age").unwrap_err();
    assert_eq!(
        err.downcast_ref::<TupleError>(),
        Some(&TupleError::InvalidFieldIndex {
            index: 2,
            field_count: 2,
        })
    );
}

#[test]
fn scalar_getters_round_trip_every_family() {
    let mut t = TupleType::new("testing", "scalars");
    t.add_version(vec![
        Field::new("flag", true, FieldType::Bool),
        Field::new("u8", true, FieldType::Uint8),
        Field::new("u16", true, FieldType::Uint16),
        Field::new("u32", true, FieldType::Uint32),
        Field::new("u64", true, FieldType::Uint64),
        Field::new("i8", true, FieldType::Int8),
        Field::new("i16", true, FieldType::Int16),
        Field::new("i32", true, FieldType::Int32),
        Field::new("i64", true, FieldType::Int64),
        Field::new("f32", true, FieldType::Float32),
        Field::new("f64", true, FieldType::Float64),
        Field::new("at", true, FieldType::Timestamp),
        Field::new("name", true, FieldType::String),
        Field::new("blob", true, FieldType::Bytes),
    ])
    .unwrap();

    let mut buffer = vec![0u8; 256];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    builder.put_bool("flag", true).unwrap();
    builder.put_uint8("u8", 200).unwrap();
    builder.put_uint16("u16", 300).unwrap();
    builder.put_uint32("u32", 135_000).unwrap();
    builder.put_uint64("u64", 1 << 34).unwrap();
    builder.put_int8("i8", -5).unwrap();
    builder.put_int16("i16", -300).unwrap();
    builder.put_int32("i32", -135_000).unwrap();
    builder.put_int64("i64", -(1 << 34)).unwrap();
    builder.put_float32("f32", 2.5).unwrap();
    builder.put_float64("f64", -2.5).unwrap();
    builder.put_timestamp("at", 123_456_789).unwrap();
    builder.put_string("name", "bugs").unwrap();
    builder.put_bytes("blob", &[1, 2, 3]).unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(tuple.get_bool("flag").unwrap(), Some(true));
    assert_eq!(tuple.get_uint8("u8").unwrap(), Some(200));
    assert_eq!(tuple.get_uint16("u16").unwrap(), Some(300));
    assert_eq!(tuple.get_uint32("u32").unwrap(), Some(135_000));
    assert_eq!(tuple.get_uint64("u64").unwrap(), Some(1 << 34));
    assert_eq!(tuple.get_int8("i8").unwrap(), Some(-5));
    assert_eq!(tuple.get_int16("i16").unwrap(), Some(-300));
    assert_eq!(tuple.get_int32("i32").unwrap(), Some(-135_000));
    assert_eq!(tuple.get_int64("i64").unwrap(), Some(-(1 << 34)));
    assert_eq!(tuple.get_float32("f32").unwrap(), Some(2.5));
    assert_eq!(tuple.get_float64("f64").unwrap(), Some(-2.5));
    assert_eq!(tuple.get_timestamp("at").unwrap(), Some(123_456_789));
    assert_eq!(tuple.get_string("name").unwrap(), Some("bugs"));
    assert_eq!(tuple.get_bytes("blob").unwrap(), Some(&[1u8, 2, 3][..]));
}

#[test]
fn getters_enforce_declared_types_and_absence() {
    let mut buffer = vec![0u8; 64];
    let mut builder = TupleBuilder::new(user_type(), &mut buffer);
    builder.put_string("uuid", "abc").unwrap();
    builder.put_string("username", "x").unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(tuple.get_uint8("age").unwrap(), None);
    let err = tuple.get_uint8("uuid").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TupleError>(),
        Some(TupleError::TypeMismatch { .. })
    ));
}

#[test]
fn array_puts_round_trip_through_getters() {
    let mut t = TupleType::new("testing", "arrays");
    t.add_version(vec![
        Field::new("flags", true, FieldType::BoolArray),
        Field::new("bytes", true, FieldType::Uint8Array),
        Field::new("shorts", true, FieldType::Uint16Array),
        Field::new("words", true, FieldType::Uint32Array),
        Field::new("longs", true, FieldType::Uint64Array),
        Field::new("i8s", true, FieldType::Int8Array),
        Field::new("i16s", true, FieldType::Int16Array),
        Field::new("i32s", true, FieldType::Int32Array),
        Field::new("i64s", true, FieldType::Int64Array),
        Field::new("f32s", true, FieldType::Float32Array),
        Field::new("f64s", true, FieldType::Float64Array),
        Field::new("ats", true, FieldType::TimestampArray),
    ])
    .unwrap();

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    builder.put_bool_array("flags", &[true, false, true]).unwrap();
    builder.put_uint8_array("bytes", &[1, 2, 255]).unwrap();
    builder.put_uint16_array("shorts", &[300, 65_535]).unwrap();
    builder.put_uint32_array("words", &[1, 135_000]).unwrap();
    builder.put_uint64_array("longs", &[1 << 40]).unwrap();
    builder.put_int8_array("i8s", &[-1, 2]).unwrap();
    builder.put_int16_array("i16s", &[-300]).unwrap();
    builder.put_int32_array("i32s", &[-135_000]).unwrap();
    builder.put_int64_array("i64s", &[-(1 << 40)]).unwrap();
    builder.put_float32_array("f32s", &[1.5, -1.5]).unwrap();
    builder.put_float64_array("f64s", &[2.5]).unwrap();
    builder.put_timestamp_array("ats", &[7, 8, 9]).unwrap();
    let tuple = builder.build().unwrap();

    assert_eq!(
        tuple.get_bool_array("flags").unwrap(),
        Some(vec![true, false, true])
    );
    assert_eq!(
        tuple.get_uint8_array("bytes").unwrap(),
        Some(vec![1, 2, 255])
    );
    assert_eq!(
        tuple.get_uint16_array("shorts").unwrap(),
        Some(vec![300, 65_535])
    );
    assert_eq!(
        tuple.get_uint32_array("words").unwrap(),
        Some(vec![1, 135_000])
    );
    assert_eq!(tuple.get_uint64_array("longs").unwrap(), Some(vec![1 << 40]));
    assert_eq!(tuple.get_int8_array("i8s").unwrap(), Some(vec![-1, 2]));
    assert_eq!(tuple.get_int16_array("i16s").unwrap(), Some(vec![-300]));
    assert_eq!(tuple.get_int32_array("i32s").unwrap(), Some(vec![-135_000]));
    assert_eq!(
        tuple.get_int64_array("i64s").unwrap(),
        Some(vec![-(1 << 40)])
    );
    assert_eq!(
        tuple.get_float32_array("f32s").unwrap(),
        Some(vec![1.5, -1.5])
    );
    assert_eq!(tuple.get_float64_array("f64s").unwrap(), Some(vec![2.5]));
    assert_eq!(tuple.get_timestamp_array("ats").unwrap(), Some(vec![7, 8, 9]));
}

#[test]
fn array_tags_use_the_count_for_the_size_class() {
    let mut t = TupleType::new("testing", "counts");
    t.add_version(vec![Field::new("bytes", true, FieldType::Uint8Array)])
        .unwrap();

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(t.clone(), &mut buffer);
    builder.put_uint8_array("bytes", &[0; 10]).unwrap();
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint8Array8.as_u8());
    assert_eq!(buffer[1], 10);

    let mut buffer = vec![0u8; 1024];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    builder.put_uint8_array("bytes", &[0; 300]).unwrap();
    drop(builder);
    assert_eq!(buffer[0], TypeCode::Uint8Array16.as_u8());
    assert_eq!(u16::from_le_bytes([buffer[1], buffer[2]]), 300);
}

#[test]
fn empty_arrays_are_legal() {
    let mut t = TupleType::new("testing", "empty");
    t.add_version(vec![Field::new("words", true, FieldType::Uint32Array)])
        .unwrap();

    let mut buffer = vec![0u8; 16];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    assert_eq!(builder.put_uint32_array("words", &[]).unwrap(), 2);
    let tuple = builder.build().unwrap();
    assert_eq!(tuple.get_uint32_array("words").unwrap(), Some(vec![]));
}

#[test]
fn tuple_arrays_round_trip() {
    let registry = Registry::new();
    registry.register(location_type());

    let mut places = Vec::new();
    for zip in [1u32, 70_000] {
        let mut buffer = vec![0u8; 128];
        let mut builder = TupleBuilder::new(location_type(), &mut buffer);
        builder.put_string("address", "somewhere").unwrap();
        builder.put_uint32("zip", zip).unwrap();
        places.push(builder.build().unwrap());
    }

    let mut t = TupleType::new("testing", "trip");
    t.add_version(vec![Field::new("stops", true, FieldType::TupleArray)])
        .unwrap();

    let mut buffer = vec![0u8; 512];
    let mut builder = TupleBuilder::new(t, &mut buffer);
    builder.put_tuple_array("stops", &places).unwrap();
    let tuple = builder.build().unwrap();

    let stops = tuple.get_tuple_array("stops", &registry).unwrap().unwrap();
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].get_uint32("zip").unwrap(), Some(1));
    assert_eq!(stops[1].get_uint32("zip").unwrap(), Some(70_000));
    assert_eq!(stops[1].get_string("address").unwrap(), Some("somewhere"));
}
