//! Static per-type field schemas.
//!
//! A [`Schema`] is the descriptor table of one record type: for each field
//! its binding key, its [`ValueKind`] and its declared type name. Schemas
//! are pure metadata, built once on first use and shared for the life of
//! the process.
//!
//! Mutation goes through [`Slot`]s: a record hands out one slot per field,
//! in schema order, and the walker pairs each slot with its descriptor.
//! Both sides come from the same [`Field`] implementation, so the kind in
//! the descriptor always matches the shape of the slot.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::coerce::ScalarValue;

/// Scalar leaf kinds the coercer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Uint,
    Bool,
    F32,
    F64,
    /// A leaf type the coercer has no rule for, by declared type name.
    Other(&'static str),
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => f.write_str("string"),
            ScalarKind::Int => f.write_str("integer"),
            ScalarKind::Uint => f.write_str("unsigned integer"),
            ScalarKind::Bool => f.write_str("boolean"),
            ScalarKind::F32 => f.write_str("f32"),
            ScalarKind::F64 => f.write_str("f64"),
            ScalarKind::Other(name) => f.write_str(name),
        }
    }
}

/// Shape of a field value.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Scalar(ScalarKind),
    /// An inline nested record; the function returns its schema.
    Record(fn() -> &'static Schema),
    /// `Option<T>`; allocated on demand by the walker.
    Optional(Box<ValueKind>),
    /// A fixed-size array `[T; len]`.
    Sequence { len: usize, element: Box<ValueKind> },
    /// Anything the walker cannot traverse, by declared type name.
    Unsupported(&'static str),
}

impl ValueKind {
    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueKind::Scalar(_))
    }

    /// Short human-readable name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ValueKind::Scalar(kind) => kind.to_string(),
            ValueKind::Record(schema) => schema().type_name().to_string(),
            ValueKind::Optional(inner) => format!("Option<{}>", inner.describe()),
            ValueKind::Sequence { len, element } => format!("[{}; {len}]", element.describe()),
            ValueKind::Unsupported(name) => (*name).to_string(),
        }
    }
}

/// One row of a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field identifier as written in the struct.
    pub name: &'static str,
    /// Lookup key in path and form sources.
    pub key: Cow<'static, str>,
    pub kind: ValueKind,
    pub type_name: &'static str,
}

/// The descriptor table of one record type.
#[derive(Debug)]
pub struct Schema {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    defaults: Option<fn() -> Option<Value>>,
}

impl Schema {
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            type_name,
            fields,
            defaults: None,
        }
    }

    /// Attach the function producing the JSON form of the type's default
    /// value. The body decoder starts from it when a body fills in a
    /// record that is currently unset.
    pub fn with_defaults(mut self, defaults: fn() -> Option<Value>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// JSON form of the type's default value, when the schema has one.
    pub fn default_value(&self) -> Option<Value> {
        self.defaults.and_then(|defaults| defaults())
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Default binding key for a field: its name, lower-cased, without a raw
/// identifier prefix.
pub fn default_key(name: &str) -> Cow<'static, str> {
    Cow::Owned(name.trim_start_matches("r#").to_lowercase())
}

/// JSON form of `T::default()`. Used by [`record!`](crate::record).
pub fn default_json<T: Serialize + Default>() -> Option<Value> {
    serde_json::to_value(T::default()).ok()
}

/// Build a descriptor for the field `project` points at. Used by
/// [`record!`](crate::record) to infer the field type.
pub fn describe_field<R, F, P>(_project: P, name: &'static str, key: Cow<'static, str>) -> FieldDescriptor
where
    F: Field,
    P: Fn(&R) -> &F,
{
    FieldDescriptor {
        name: name.trim_start_matches("r#"),
        key,
        kind: F::kind(),
        type_name: std::any::type_name::<F>(),
    }
}

/// A record type with a static schema.
pub trait Record {
    /// The schema of this type, built once.
    fn describe() -> &'static Schema
    where
        Self: Sized;

    fn schema(&self) -> &'static Schema;

    /// One slot per schema field, in schema order.
    fn slots(&mut self) -> Vec<Slot<'_>>;
}

/// A type that can appear as a record field.
pub trait Field {
    fn kind() -> ValueKind
    where
        Self: Sized;

    fn slot(&mut self) -> Slot<'_>;
}

/// Mutable access to one field value.
pub enum Slot<'a> {
    Scalar(&'a mut dyn ScalarField),
    Record(&'a mut dyn Record),
    Optional(&'a mut dyn OptionalField),
    Sequence(Vec<Slot<'a>>),
    Unsupported,
}

/// A scalar leaf that accepts a coerced value.
pub trait ScalarField {
    /// Store `value`; fails when the value does not fit the field type.
    fn assign(&mut self, value: ScalarValue) -> Result<(), String>;
}

/// An optional value the walker may allocate.
pub trait OptionalField {
    fn is_set(&self) -> bool;

    /// Allocate a default value if unset and return its slot.
    fn allocate(&mut self) -> Slot<'_>;
}

fn mismatch(value: &ScalarValue, target: &str) -> String {
    format!("cannot store {} value in {target}", value.kind())
}

impl ScalarField for String {
    fn assign(&mut self, value: ScalarValue) -> Result<(), String> {
        match value {
            ScalarValue::String(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch(&other, "String")),
        }
    }
}

impl Field for String {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::String)
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar(self)
    }
}

macro_rules! integer_fields {
    ($variant:ident, $kind:ident: $($t:ty),*) => {$(
        impl ScalarField for $t {
            fn assign(&mut self, value: ScalarValue) -> Result<(), String> {
                match value {
                    ScalarValue::$variant(v) => {
                        *self = <$t>::try_from(v)
                            .map_err(|_| format!("{v} is out of range for {}", stringify!($t)))?;
                        Ok(())
                    }
                    other => Err(mismatch(&other, stringify!($t))),
                }
            }
        }

        impl Field for $t {
            fn kind() -> ValueKind {
                ValueKind::Scalar(ScalarKind::$kind)
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::Scalar(self)
            }
        }
    )*};
}

integer_fields!(Int, Int: i8, i16, i32, i64, isize);
integer_fields!(Uint, Uint: u8, u16, u32, u64, usize);

macro_rules! exact_fields {
    ($($t:ty => $variant:ident / $kind:ident),*) => {$(
        impl ScalarField for $t {
            fn assign(&mut self, value: ScalarValue) -> Result<(), String> {
                match value {
                    ScalarValue::$variant(v) => {
                        *self = v;
                        Ok(())
                    }
                    other => Err(mismatch(&other, stringify!($t))),
                }
            }
        }

        impl Field for $t {
            fn kind() -> ValueKind {
                ValueKind::Scalar(ScalarKind::$kind)
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::Scalar(self)
            }
        }
    )*};
}

exact_fields!(bool => Bool / Bool, f32 => F32 / F32, f64 => F64 / F64);

// No coercion rule for `char`; declaring one surfaces as an unsupported
// scalar type when a value arrives for it.
impl ScalarField for char {
    fn assign(&mut self, value: ScalarValue) -> Result<(), String> {
        Err(mismatch(&value, "char"))
    }
}

impl Field for char {
    fn kind() -> ValueKind {
        ValueKind::Scalar(ScalarKind::Other("char"))
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar(self)
    }
}

impl<T: Field + Default> OptionalField for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn allocate(&mut self) -> Slot<'_> {
        self.get_or_insert_with(T::default).slot()
    }
}

impl<T: Field + Default> Field for Option<T> {
    fn kind() -> ValueKind {
        ValueKind::Optional(Box::new(T::kind()))
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Optional(self)
    }
}

impl<T: Field> Field for Box<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}

impl<T: Field, const N: usize> Field for [T; N] {
    fn kind() -> ValueKind {
        ValueKind::Sequence {
            len: N,
            element: Box::new(T::kind()),
        }
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self.iter_mut().map(|element| element.slot()).collect())
    }
}

macro_rules! unsupported_fields {
    ($($t:ident<$($p:ident),+>),*) => {$(
        impl<$($p),+> Field for $t<$($p),+> {
            fn kind() -> ValueKind {
                ValueKind::Unsupported(std::any::type_name::<Self>())
            }

            fn slot(&mut self) -> Slot<'_> {
                Slot::Unsupported
            }
        }
    )*};
}

unsupported_fields!(
    Vec<T>,
    VecDeque<T>,
    HashMap<K, V, S>,
    BTreeMap<K, V>,
    HashSet<T, S>,
    BTreeSet<T>
);

/// Implement [`Record`] and [`Field`] for a struct.
///
/// Each listed field binds under its lower-cased name unless a key is
/// given with `field = "key"`. Fields not listed are left to the body
/// decoder only.
///
/// The type must implement `Default` and `serde::Serialize`: the JSON form
/// of its default value seeds the body decoder when a partial body fills
/// in an unset `Option` of this type.
///
/// A record that contains itself through `Option<Box<Self>>` cannot be
/// bound from path or form values with a finite depth limit: the walker
/// allocates every unset optional record it meets, so the chain grows
/// until it reaches `max_depth` and the bind fails with
/// [`BindError::DepthExceeded`](crate::BindError::DepthExceeded). Leave
/// such a field out of the list and let the body decoder fill it.
///
/// ```
/// use bindery::{record, Record, ValueKind};
///
/// #[derive(Default, serde::Serialize)]
/// struct Address {
///     city: String,
///     zip: String,
/// }
///
/// #[derive(Default, serde::Serialize)]
/// struct Signup {
///     user_name: String,
///     age: i32,
///     address: Option<Address>,
/// }
///
/// record!(Address { city, zip = "postal_code" });
/// record!(Signup { user_name = "name", age, address });
///
/// let schema = Signup::describe();
/// assert_eq!(schema.fields()[0].key, "name");
/// assert_eq!(schema.fields()[1].key, "age");
/// assert!(matches!(schema.fields()[2].kind, ValueKind::Optional(_)));
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ident { $($field:ident $(= $key:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn describe() -> &'static $crate::Schema {
                static SCHEMA: ::std::sync::OnceLock<$crate::Schema> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::Schema::new(
                        ::std::any::type_name::<$ty>(),
                        ::std::vec![$(
                            $crate::schema::describe_field(
                                |record: &$ty| &record.$field,
                                ::std::stringify!($field),
                                $crate::__binding_key!($field $(, $key)?),
                            )
                        ),*],
                    )
                    .with_defaults($crate::schema::default_json::<$ty>)
                })
            }

            fn schema(&self) -> &'static $crate::Schema {
                <Self as $crate::Record>::describe()
            }

            fn slots(&mut self) -> ::std::vec::Vec<$crate::Slot<'_>> {
                ::std::vec![$($crate::Field::slot(&mut self.$field)),*]
            }
        }

        impl $crate::Field for $ty {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Record(<$ty as $crate::Record>::describe)
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __binding_key {
    ($field:ident) => {
        $crate::schema::default_key(::std::stringify!($field))
    };
    ($field:ident, $key:literal) => {
        ::std::borrow::Cow::Borrowed($key)
    };
}
