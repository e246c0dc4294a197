//! Recursive field walker.
//!
//! Pairs every [`FieldDescriptor`](crate::FieldDescriptor) of a record with
//! the record's [`Slot`] for it and binds leaves from the resolver. Nested
//! records are walked in place, unset optional records are allocated
//! first, array elements are walked in index order.

use std::borrow::Cow;
use std::fmt;

use crate::coerce::{coerce, CoerceError, ScalarValue};
use crate::config::{BinderConfig, SequenceKeys};
use crate::error::{BindError, BindResult};
use crate::logger::Logger;
use crate::resolve::ValueResolver;
use crate::schema::{Record, ScalarField, ScalarKind, Slot, ValueKind};

/// Key namespace for the fields of one record.
///
/// Top-level and plainly nested records share one flat namespace. Inside
/// an array, a record's fields are qualified per element:
///
/// - [`SequenceKeys::Indexed`]: element `i` of `pts` reads `pts[i].x`.
/// - [`SequenceKeys::Repeated`]: element `i` reads the `i`-th `x`.
/// - [`SequenceKeys::Shared`]: every element reads `x`.
#[derive(Debug, Clone, Default)]
struct Scope {
    prefix: Option<String>,
    occurrence: usize,
}

impl Scope {
    fn field<'k>(&self, key: &'k str) -> Lookup<'k> {
        let key = match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}.{key}")),
            None => Cow::Borrowed(key),
        };
        Lookup {
            key,
            occurrence: self.occurrence,
            scope: self.clone(),
        }
    }
}

/// Where a leaf reads its value: a key and which occurrence of it.
/// `scope` is what the fields of a record bound here resolve under.
#[derive(Debug, Clone)]
struct Lookup<'k> {
    key: Cow<'k, str>,
    occurrence: usize,
    scope: Scope,
}

impl<'k> Lookup<'k> {
    #[cfg(test)]
    fn new(key: &'k str) -> Self {
        Scope::default().field(key)
    }

    /// Lookup for element `index` of an array of `len` bound under `self`.
    fn element(&self, index: usize, len: usize, policy: SequenceKeys) -> Lookup<'k> {
        match policy {
            SequenceKeys::Indexed => {
                let key = format!("{}[{index}]", self.key);
                Lookup {
                    scope: Scope {
                        prefix: Some(key.clone()),
                        occurrence: self.occurrence,
                    },
                    key: Cow::Owned(key),
                    occurrence: self.occurrence,
                }
            }
            SequenceKeys::Repeated => {
                let occurrence = self.occurrence * len + index;
                Lookup {
                    key: self.key.clone(),
                    occurrence,
                    scope: Scope {
                        prefix: self.scope.prefix.clone(),
                        occurrence,
                    },
                }
            }
            SequenceKeys::Shared => self.clone(),
        }
    }
}

impl fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            0 => f.write_str(&self.key),
            n => write!(f, "{} (occurrence {})", self.key, n + 1),
        }
    }
}

pub(crate) struct FieldWalker<'a> {
    resolver: ValueResolver<'a>,
    config: &'a BinderConfig,
    logger: &'a dyn Logger,
    assigned: usize,
}

impl<'a> FieldWalker<'a> {
    pub(crate) fn new(
        resolver: ValueResolver<'a>,
        config: &'a BinderConfig,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            resolver,
            config,
            logger,
            assigned: 0,
        }
    }

    /// Number of leaves assigned so far.
    pub(crate) fn assigned(&self) -> usize {
        self.assigned
    }

    pub(crate) fn walk(&mut self, record: &mut dyn Record) -> BindResult<()> {
        self.walk_record(record, &Scope::default(), 0)
    }

    fn walk_record(&mut self, record: &mut dyn Record, scope: &Scope, depth: usize) -> BindResult<()> {
        let schema = record.schema();
        for (field, slot) in schema.fields().iter().zip(record.slots()) {
            self.bind(&scope.field(&field.key), &field.kind, slot, depth)?;
        }
        Ok(())
    }

    fn bind(
        &mut self,
        lookup: &Lookup<'_>,
        kind: &ValueKind,
        slot: Slot<'_>,
        depth: usize,
    ) -> BindResult<()> {
        match (kind, slot) {
            (ValueKind::Scalar(scalar), Slot::Scalar(target)) => {
                let raw = self.lookup(lookup);
                if raw.is_empty() {
                    return Ok(());
                }
                let value = self.coerce(lookup, *scalar, raw)?;
                self.store(lookup, *scalar, raw, target, value)
            }
            (ValueKind::Record(_), Slot::Record(inner)) => self.descend(lookup, inner, depth),
            (ValueKind::Optional(inner), Slot::Optional(optional)) => match inner.as_ref() {
                // Optional leaves stay unset unless a value arrives.
                ValueKind::Scalar(scalar) => {
                    let raw = self.lookup(lookup);
                    if raw.is_empty() {
                        return Ok(());
                    }
                    let value = self.coerce(lookup, *scalar, raw)?;
                    match optional.allocate() {
                        Slot::Scalar(target) => self.store(lookup, *scalar, raw, target, value),
                        _ => Err(unsupported(kind)),
                    }
                }
                _ => {
                    if !optional.is_set() {
                        self.logger.debug(format_args!("{lookup}: allocating {}", inner.describe()));
                    }
                    self.bind(lookup, inner, optional.allocate(), depth)
                }
            },
            (ValueKind::Sequence { len, element }, Slot::Sequence(elements)) => {
                for (index, element_slot) in elements.into_iter().enumerate() {
                    let element_lookup = lookup.element(index, *len, self.config.sequence_keys);
                    self.bind(&element_lookup, element, element_slot, depth)?;
                }
                Ok(())
            }
            // Also covers hand-written records whose slot disagrees with
            // the declared kind.
            (kind, _) => Err(unsupported(kind)),
        }
    }

    fn descend(
        &mut self,
        lookup: &Lookup<'_>,
        record: &mut dyn Record,
        depth: usize,
    ) -> BindResult<()> {
        let depth = depth + 1;
        if depth > self.config.max_depth {
            return Err(BindError::DepthExceeded {
                key: lookup.to_string(),
                max_depth: self.config.max_depth,
            });
        }
        self.walk_record(record, &lookup.scope, depth)
    }

    fn lookup(&self, lookup: &Lookup<'_>) -> &'a str {
        self.resolver.resolve_nth(&lookup.key, lookup.occurrence)
    }

    fn coerce(&self, lookup: &Lookup<'_>, kind: ScalarKind, raw: &str) -> BindResult<ScalarValue> {
        coerce(raw, kind).map_err(|e| match e {
            CoerceError::Invalid(reason) => BindError::Coercion {
                key: lookup.to_string(),
                raw: raw.to_owned(),
                kind,
                reason,
            },
            CoerceError::Unsupported(type_name) => BindError::UnsupportedType {
                type_name: type_name.to_owned(),
            },
        })
    }

    fn store(
        &mut self,
        lookup: &Lookup<'_>,
        kind: ScalarKind,
        raw: &str,
        target: &mut dyn ScalarField,
        value: ScalarValue,
    ) -> BindResult<()> {
        target.assign(value).map_err(|reason| BindError::Coercion {
            key: lookup.to_string(),
            raw: raw.to_owned(),
            kind,
            reason,
        })?;
        self.logger.debug(format_args!("{lookup}: {raw}"));
        self.assigned += 1;
        Ok(())
    }
}

fn unsupported(kind: &ValueKind) -> BindError {
    let type_name = match kind {
        ValueKind::Unsupported(name) => (*name).to_owned(),
        other => other.describe(),
    };
    BindError::UnsupportedKind { type_name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NoopLogger;
    use crate::record;
    use bindery_http::{FormValues, FormView, PathParams};
    use serde::Serialize;

    #[derive(Debug, Default, PartialEq, Serialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    #[derive(Debug, Default, Serialize)]
    struct Shape {
        name: String,
        origin: Point,
        anchor: Option<Point>,
        scale: Option<f64>,
        corners: [i32; 2],
    }

    record!(Point { x, y });
    record!(Shape { name, origin, anchor, scale, corners = "corner" });

    #[derive(Debug, Default, Serialize)]
    struct Chain {
        label: String,
        next: Option<Box<Chain>>,
    }

    record!(Chain { label, next });

    #[derive(Debug, Default, Serialize)]
    struct Polyline {
        pts: [Point; 2],
    }

    record!(Polyline { pts });

    fn point(x: i64, y: i64) -> Point {
        Point { x, y }
    }

    fn walk_with(
        record: &mut dyn Record,
        query: &str,
        config: &BinderConfig,
    ) -> (BindResult<()>, usize) {
        let path = PathParams::new();
        let body = FormValues::new();
        let query = FormValues::parse(query.as_bytes());
        let resolver = ValueResolver::new(&path, FormView::new(&body, &query));
        let mut walker = FieldWalker::new(resolver, config, &NoopLogger);
        let result = walker.walk(record);
        (result, walker.assigned())
    }

    fn walk(record: &mut dyn Record, query: &str) -> (BindResult<()>, usize) {
        walk_with(record, query, &BinderConfig::default())
    }

    #[test]
    fn binds_scalars_and_nested_records() {
        let mut shape = Shape::default();
        let (result, assigned) = walk(&mut shape, "name=square&x=3&y=4");
        result.unwrap();

        assert_eq!(shape.name, "square");
        assert_eq!((shape.origin.x, shape.origin.y), (3, 4));
        // The optional anchor shares the keys and is allocated.
        let anchor = shape.anchor.unwrap();
        assert_eq!((anchor.x, anchor.y), (3, 4));
        assert_eq!(assigned, 5);
    }

    #[test]
    fn optional_record_is_allocated_even_without_values() {
        let mut shape = Shape::default();
        walk(&mut shape, "").0.unwrap();
        assert!(shape.anchor.is_some());
    }

    #[test]
    fn optional_scalar_stays_none_without_value() {
        let mut shape = Shape::default();
        walk(&mut shape, "").0.unwrap();
        assert_eq!(shape.scale, None);

        walk(&mut shape, "scale=1.5").0.unwrap();
        assert_eq!(shape.scale, Some(1.5));
    }

    #[test]
    fn invalid_optional_scalar_is_not_allocated() {
        let mut shape = Shape::default();
        let err = walk(&mut shape, "scale=big").0.unwrap_err();
        assert!(matches!(err, BindError::Coercion { ref key, .. } if key == "scale"));
        assert_eq!(shape.scale, None);
    }

    #[test]
    fn empty_value_leaves_field_unchanged() {
        let mut shape = Shape {
            name: "kept".into(),
            ..Shape::default()
        };
        walk(&mut shape, "name=").0.unwrap();
        assert_eq!(shape.name, "kept");
    }

    #[test]
    fn indexed_sequence_keys() {
        let mut shape = Shape::default();
        walk(&mut shape, "corner[0]=1&corner[1]=2").0.unwrap();
        assert_eq!(shape.corners, [1, 2]);
    }

    #[test]
    fn repeated_sequence_keys() {
        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Repeated);
        let mut shape = Shape::default();
        walk_with(&mut shape, "corner=5&corner=6", &config).0.unwrap();
        assert_eq!(shape.corners, [5, 6]);
    }

    #[test]
    fn repeated_sequence_keys_leave_missing_tail() {
        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Repeated);
        let mut shape = Shape::default();
        walk_with(&mut shape, "corner=5", &config).0.unwrap();
        assert_eq!(shape.corners, [5, 0]);
    }

    #[test]
    fn shared_sequence_keys_copy_one_value() {
        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Shared);
        let mut shape = Shape::default();
        walk_with(&mut shape, "corner=9", &config).0.unwrap();
        assert_eq!(shape.corners, [9, 9]);
    }

    #[test]
    fn out_of_range_element_reports_indexed_key() {
        let mut shape = Shape::default();
        let err = walk(&mut shape, "corner[1]=99999999999").0.unwrap_err();
        match err {
            BindError::Coercion { key, raw, kind, .. } => {
                assert_eq!(key, "corner[1]");
                assert_eq!(raw, "99999999999");
                assert_eq!(kind, ScalarKind::Int);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coercion_failure_stops_the_walk() {
        let mut shape = Shape::default();
        let err = walk(&mut shape, "name=tri&x=abc&y=4").0.unwrap_err();
        assert!(matches!(err, BindError::Coercion { ref raw, .. } if raw == "abc"));
        // Fields before the failure keep their new values, later ones are untouched.
        assert_eq!(shape.name, "tri");
        assert_eq!(shape.origin.y, 0);
    }

    #[test]
    fn self_referential_optional_hits_depth_limit() {
        let config = BinderConfig::default().with_max_depth(3);
        let mut chain = Chain::default();
        let err = walk_with(&mut chain, "label=a", &config).0.unwrap_err();
        assert!(matches!(err, BindError::DepthExceeded { max_depth: 3, .. }));
        assert_eq!(chain.label, "a");
    }

    #[test]
    fn lookup_element_keys() {
        let base = Lookup::new("tag");
        assert_eq!(base.element(2, 3, SequenceKeys::Indexed).to_string(), "tag[2]");
        assert_eq!(
            base.element(2, 3, SequenceKeys::Repeated).to_string(),
            "tag (occurrence 3)"
        );
        assert_eq!(base.element(2, 3, SequenceKeys::Shared).to_string(), "tag");

        let nested = base.element(1, 3, SequenceKeys::Repeated);
        assert_eq!(nested.element(2, 3, SequenceKeys::Repeated).occurrence, 5);
    }

    #[test]
    fn indexed_record_elements_read_qualified_keys() {
        let mut line = Polyline::default();
        let (result, assigned) = walk(&mut line, "pts[0].x=1&pts[0].y=2&pts[1].x=3&x=9");
        result.unwrap();
        assert_eq!(line.pts, [point(1, 2), point(3, 0)]);
        assert_eq!(assigned, 3);
    }

    #[test]
    fn repeated_record_elements_read_successive_occurrences() {
        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Repeated);
        let mut line = Polyline::default();
        walk_with(&mut line, "x=1&x=2&y=5", &config).0.unwrap();
        assert_eq!(line.pts, [point(1, 5), point(2, 0)]);
    }

    #[test]
    fn shared_record_elements_read_bare_keys() {
        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Shared);
        let mut line = Polyline::default();
        walk_with(&mut line, "x=7", &config).0.unwrap();
        assert_eq!(line.pts, [point(7, 0), point(7, 0)]);
    }

    #[test]
    fn record_element_errors_name_the_qualified_key() {
        let mut line = Polyline::default();
        let err = walk(&mut line, "pts[1].y=up").0.unwrap_err();
        assert_eq!(err.key(), Some("pts[1].y"));

        let config = BinderConfig::default().with_sequence_keys(SequenceKeys::Repeated);
        let err = walk_with(&mut Polyline::default(), "x=1&x=oops", &config)
            .0
            .unwrap_err();
        assert_eq!(err.key(), Some("x (occurrence 2)"));
    }
}
