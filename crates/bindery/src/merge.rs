//! JSON deep-merge decoding.
//!
//! The destination is serialized to a JSON tree, the body is laid over it
//! member by member, and the result is deserialized back. Object members
//! absent from the body keep the destination's current values; any other
//! JSON value in the body, `null` included, replaces what was there.
//!
//! An object laid over an unset record (`null` in the tree) starts from the
//! record type's default value, so a partial body fills in the members it
//! names and leaves the rest at their defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{Record, Schema, ValueKind};

/// Decode `body` onto a copy of `destination`.
pub(crate) fn merge_json<T>(destination: &T, body: &[u8]) -> serde_json::Result<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    let patch: Value = serde_json::from_slice(body)?;
    let mut merged = serde_json::to_value(destination)?;
    merge_record(&mut merged, patch, Some(T::describe()));
    serde_json::from_value(merged)
}

/// An owned copy of `destination` made through its serde representation.
pub(crate) fn snapshot<T>(destination: &T) -> serde_json::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    serde_json::from_value(serde_json::to_value(destination)?)
}

/// Lay `patch` over `base`; `schema` describes the record `base` holds.
fn merge_record(base: &mut Value, patch: Value, schema: Option<&Schema>) {
    if base.is_null() && patch.is_object() {
        if let Some(default) = schema.and_then(Schema::default_value) {
            *base = default;
        }
    }
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => merge_members(base, patch, schema),
        (base, patch) => *base = patch,
    }
}

fn merge_members(base: &mut Map<String, Value>, patch: Map<String, Value>, schema: Option<&Schema>) {
    for (key, value) in patch {
        let nested = schema
            .and_then(|schema| schema.field(&key))
            .and_then(|field| record_schema(&field.kind));
        let slot = base.entry(key).or_insert(Value::Null);
        merge_record(slot, value, nested);
    }
}

/// Schema of the record a field holds, directly or behind `Option`.
fn record_schema(kind: &ValueKind) -> Option<&'static Schema> {
    match kind {
        ValueKind::Record(schema) => Some(schema()),
        ValueKind::Optional(inner) => record_schema(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde::Deserialize;
    use serde_json::json;

    fn deep_merge(base: &mut Value, patch: Value) {
        merge_record(base, patch, None);
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: String,
        zip: String,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Pt {
        x: i64,
        y: i64,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: i64,
        address: Address,
        nickname: Option<String>,
        geo: Option<Pt>,
    }

    record!(Address { city, zip });
    record!(Pt { x, y });
    record!(Profile { name, age, address, nickname, geo });

    #[test]
    fn members_present_in_body_overwrite() {
        let mut base = json!({"a": 1, "b": 2});
        deep_merge(&mut base, json!({"b": 3, "c": 4}));
        assert_eq!(base, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut base = json!({"outer": {"keep": true, "swap": 1}});
        deep_merge(&mut base, json!({"outer": {"swap": 2}}));
        assert_eq!(base, json!({"outer": {"keep": true, "swap": 2}}));
    }

    #[test]
    fn arrays_and_scalars_replace() {
        let mut base = json!({"list": [1, 2, 3]});
        deep_merge(&mut base, json!({"list": [9]}));
        assert_eq!(base, json!({"list": [9]}));
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let destination = Profile {
            name: "alice".into(),
            age: 30,
            address: Address {
                city: "Oslo".into(),
                zip: "0150".into(),
            },
            nickname: Some("al".into()),
            geo: None,
        };
        let merged = merge_json(&destination, br#"{"age": 31, "address": {"zip": "0151"}}"#).unwrap();

        assert_eq!(merged.name, "alice");
        assert_eq!(merged.age, 31);
        assert_eq!(merged.address.city, "Oslo");
        assert_eq!(merged.address.zip, "0151");
        assert_eq!(merged.nickname.as_deref(), Some("al"));
    }

    #[test]
    fn partial_object_fills_unset_optional_record() {
        let merged = merge_json(&Profile::default(), br#"{"geo": {"x": 3}}"#).unwrap();
        assert_eq!(merged.geo, Some(Pt { x: 3, y: 0 }));
        assert_eq!(merged.name, "");
    }

    #[test]
    fn partial_object_keeps_set_optional_record() {
        let destination = Profile {
            geo: Some(Pt { x: 1, y: 2 }),
            ..Profile::default()
        };
        let merged = merge_json(&destination, br#"{"geo": {"y": 5}}"#).unwrap();
        assert_eq!(merged.geo, Some(Pt { x: 1, y: 5 }));
    }

    #[test]
    fn unset_without_schema_takes_the_object_as_is() {
        let mut base = json!({"geo": null});
        deep_merge(&mut base, json!({"geo": {"x": 3}}));
        assert_eq!(base, json!({"geo": {"x": 3}}));
    }

    #[test]
    fn null_clears_optional_fields() {
        let destination = Profile {
            nickname: Some("al".into()),
            ..Profile::default()
        };
        let merged = merge_json(&destination, br#"{"nickname": null}"#).unwrap();
        assert_eq!(merged.nickname, None);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(merge_json(&Profile::default(), b"{not json").is_err());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(merge_json(&Profile::default(), br#"{"age": "old"}"#).is_err());
        assert!(merge_json(&Profile::default(), b"[1, 2]").is_err());
    }

    #[test]
    fn snapshot_copies_through_serde() {
        let original = Profile {
            name: "bob".into(),
            ..Profile::default()
        };
        assert_eq!(snapshot(&original).unwrap(), original);
    }
}
