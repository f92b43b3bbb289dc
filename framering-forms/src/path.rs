//! Field path codec
//!
//! Converts between a field name as it appears in a submission (`a.b.c`,
//! `a[b][c]`, `items[0][title]`, `tags[]`) and the ordered list of keys it
//! addresses. The canonical encoding is bracketed: `a[b][c]`.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{FormError, Result};

/// One key of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    Name(String),
    Index(usize),
    /// An empty bracket (`[]`): the next free slot of a list.
    Append,
}

impl PathKey {
    /// A key for a single segment given by name. All-digit segments become
    /// [`PathKey::Index`], as they do when decoded.
    pub fn name(segment: &str) -> Result<Self> {
        if segment.is_empty() {
            return Err(FormError::invalid_name(segment, "empty segment"));
        }
        if let Some(c) = segment.chars().find(|c| matches!(c, '.' | '[' | ']')) {
            return Err(FormError::invalid_name(
                segment,
                format!("'{c}' is not allowed in a key"),
            ));
        }
        Ok(Self::parse(segment))
    }

    /// Re-check a key built directly from its variants.
    fn checked(self) -> Result<Self> {
        match self {
            PathKey::Name(name) => Self::name(&name),
            key => Ok(key),
        }
    }

    fn parse(segment: &str) -> Self {
        let canonical_index = segment == "0" || !segment.starts_with('0');
        match segment.parse::<usize>() {
            Ok(index) if canonical_index && segment.bytes().all(|b| b.is_ascii_digit()) => {
                PathKey::Index(index)
            }
            _ => PathKey::Name(segment.to_string()),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Name(name) => f.write_str(name),
            PathKey::Index(index) => write!(f, "{index}"),
            PathKey::Append => Ok(()),
        }
    }
}

impl From<usize> for PathKey {
    fn from(i: usize) -> Self {
        PathKey::Index(i)
    }
}

/// Ordered keys addressing a value inside a nested submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathKey>);

impl FieldPath {
    /// Build a path from keys. Names go through [`PathKey::name`], so the
    /// result encodes to a string that decodes back to the same keys.
    pub fn new(keys: Vec<PathKey>) -> Result<Self> {
        let keys = keys
            .into_iter()
            .map(PathKey::checked)
            .collect::<Result<Vec<_>>>()?;
        match keys.first() {
            None => Err(FormError::invalid_name("", "name is empty")),
            Some(PathKey::Append) => Err(FormError::invalid_name("[]", "must start with a key")),
            Some(_) => Ok(Self(keys)),
        }
    }

    /// Decode a dotted or bracketed name.
    pub fn decode(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(FormError::invalid_name(name, "name is empty"));
        }

        let mut keys = Vec::new();
        let mut segment = String::new();
        let mut chars = name.chars().peekable();
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if segment.is_empty() && !after_bracket {
                        return Err(FormError::invalid_name(name, "empty segment"));
                    }
                    if !segment.is_empty() {
                        keys.push(PathKey::parse(&segment));
                        segment.clear();
                    }
                    if chars.peek().is_none() {
                        return Err(FormError::invalid_name(name, "trailing '.'"));
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !segment.is_empty() {
                        keys.push(PathKey::parse(&segment));
                        segment.clear();
                    } else if keys.is_empty() {
                        return Err(FormError::invalid_name(name, "must start with a key"));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            ']' => {
                                closed = true;
                                break;
                            }
                            '[' => return Err(FormError::invalid_name(name, "nested '['")),
                            c => inner.push(c),
                        }
                    }
                    if !closed {
                        return Err(FormError::invalid_name(name, "unclosed '['"));
                    }
                    keys.push(if inner.is_empty() {
                        PathKey::Append
                    } else {
                        PathKey::parse(&inner)
                    });
                    after_bracket = true;
                }
                ']' => return Err(FormError::invalid_name(name, "unbalanced ']'")),
                c => {
                    if after_bracket {
                        return Err(FormError::invalid_name(name, "text after ']'"));
                    }
                    segment.push(c);
                }
            }
        }

        if !segment.is_empty() {
            keys.push(PathKey::parse(&segment));
        }
        Ok(Self(keys))
    }

    /// Canonical bracketed form: the first key bare, the rest in brackets.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, key) in self.0.iter().enumerate() {
            if i == 0 && *key != PathKey::Append {
                out.push_str(&key.to_string());
            } else {
                out.push('[');
                out.push_str(&key.to_string());
                out.push(']');
            }
        }
        out
    }

    /// `[namespace, scope, ...self]`, or `[namespace, ...self]` without a scope.
    pub fn namespaced(&self, namespace: &str, scope: Option<&str>) -> Result<Self> {
        let mut keys = Vec::with_capacity(self.0.len() + 2);
        keys.push(PathKey::name(namespace)?);
        if let Some(scope) = scope {
            keys.push(PathKey::name(scope)?);
        }
        keys.extend(self.0.iter().cloned());
        Ok(Self(keys))
    }

    /// This path followed by `other`.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut keys = self.0.clone();
        keys.extend(other.0.iter().cloned());
        Self(keys)
    }

    pub fn push(&mut self, key: impl Into<PathKey>) -> Result<()> {
        self.0.push(key.into().checked()?);
        Ok(())
    }

    pub fn keys(&self) -> &[PathKey] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathKey> {
        self.0.first()
    }

    /// Everything after the first key.
    pub fn rest(&self) -> FieldPath {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value at this path. An append key addresses the list itself.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for key in &self.0 {
            current = match (key, current) {
                (PathKey::Name(name), Value::Object(map)) => map.get(name)?,
                (PathKey::Index(index), Value::Array(items)) => items.get(*index)?,
                (PathKey::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
                (PathKey::Append, Value::Array(_)) => current,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate objects and lists.
    pub fn set(&self, root: &mut Value, value: Value) {
        let mut current = root;
        for key in &self.0 {
            current = slot(current, key);
        }
        *current = value;
    }
}

fn slot<'a>(current: &'a mut Value, key: &PathKey) -> &'a mut Value {
    match key {
        PathKey::Name(name) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            &mut current[name.as_str()]
        }
        PathKey::Index(index) if current.is_object() => &mut current[index.to_string().as_str()],
        PathKey::Index(index) => {
            let items = ensure_array(current);
            while items.len() <= *index {
                items.push(Value::Null);
            }
            &mut items[*index]
        }
        PathKey::Append => {
            let items = ensure_array(current);
            items.push(Value::Null);
            let last = items.len() - 1;
            &mut items[last]
        }
    }
}

fn ensure_array(current: &mut Value) -> &mut Vec<Value> {
    if !current.is_array() {
        *current = Value::Array(Vec::new());
    }
    match current {
        Value::Array(items) => items,
        _ => unreachable!("replaced with an array above"),
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn names(keys: &[&str]) -> FieldPath {
        FieldPath::new(keys.iter().map(|k| PathKey::parse(k)).collect()).unwrap()
    }

    #[rstest]
    #[case("headline", &["headline"])]
    #[case("a.b.c", &["a", "b", "c"])]
    #[case("a[b][c]", &["a", "b", "c"])]
    #[case("a.b[c]", &["a", "b", "c"])]
    #[case("a[b].c", &["a", "b", "c"])]
    #[case("items[0][title]", &["items", "0", "title"])]
    fn decode_cases(#[case] name: &str, #[case] keys: &[&str]) {
        assert_eq!(FieldPath::decode(name).unwrap(), names(keys));
    }

    #[test]
    fn decode_index_and_append() {
        let path = FieldPath::decode("items[3][]").unwrap();
        assert_eq!(
            path.keys(),
            &[PathKey::Name("items".into()), PathKey::Index(3), PathKey::Append]
        );
        assert_eq!(path.encode(), "items[3][]");
    }

    #[test]
    fn leading_zero_stays_a_name() {
        let path = FieldPath::decode("code[007]").unwrap();
        assert_eq!(path.keys()[1], PathKey::Name("007".into()));
    }

    #[rstest]
    #[case("")]
    #[case("[a]")]
    #[case("a..b")]
    #[case("a.")]
    #[case(".a")]
    #[case("a[b")]
    #[case("a]b")]
    #[case("a[b[c]]")]
    #[case("a[b]c")]
    fn decode_rejects(#[case] name: &str) {
        assert!(matches!(
            FieldPath::decode(name),
            Err(FormError::InvalidName { .. })
        ));
    }

    #[test]
    fn encode_is_bracketed() {
        assert_eq!(FieldPath::decode("a.b.c").unwrap().encode(), "a[b][c]");
    }

    #[test]
    fn namespaced_nests_existing_brackets() {
        let path = FieldPath::decode("meta[title]").unwrap();
        let wire = path.namespaced("framering", Some("hero")).unwrap().encode();
        assert_eq!(wire, "framering[hero][meta][title]");
        assert_eq!(
            FieldPath::decode(&wire).unwrap(),
            names(&["framering", "hero", "meta", "title"])
        );
    }

    #[test]
    fn digit_names_become_indexes() {
        let path = FieldPath::new(vec![
            PathKey::Name("items".into()),
            PathKey::Name("12".into()),
        ])
        .unwrap();
        assert_eq!(path.keys()[1], PathKey::Index(12));
        assert_eq!(path.encode(), "items[12]");
        assert_eq!(FieldPath::decode(&path.encode()).unwrap(), path);
        assert_eq!(PathKey::name("007").unwrap(), PathKey::Name("007".into()));
    }

    #[rstest]
    #[case(&["a.b", "c"])]
    #[case(&["a", "x]y"])]
    #[case(&["a", "x[y"])]
    #[case(&["a", ""])]
    fn new_rejects_keys_that_would_not_decode_back(#[case] keys: &[&str]) {
        let keys = keys.iter().map(|k| PathKey::Name(k.to_string())).collect();
        assert!(matches!(
            FieldPath::new(keys),
            Err(FormError::InvalidName { .. })
        ));
    }

    #[test]
    fn new_rejects_empty_and_leading_append() {
        assert!(FieldPath::new(Vec::new()).is_err());
        assert!(FieldPath::new(vec![PathKey::Append, PathKey::Index(0)]).is_err());
    }

    #[test]
    fn namespaced_rejects_bad_scope() {
        let path = FieldPath::decode("title").unwrap();
        assert!(path.namespaced("framering", Some("hero.main")).is_err());
        assert!(path.namespaced("fr[", None).is_err());
    }

    #[test]
    fn push_checks_names() {
        let mut path = FieldPath::decode("items").unwrap();
        path.push(3).unwrap();
        path.push(PathKey::Name("title".into())).unwrap();
        assert_eq!(path.encode(), "items[3][title]");
        assert!(path.push(PathKey::Name("a]b".into())).is_err());
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn lookup_nested() {
        let data = json!({"a": {"b": [10, {"c": "x"}]}, "m": {"0": "zero"}});
        assert_eq!(
            FieldPath::decode("a[b][1][c]").unwrap().lookup(&data),
            Some(&json!("x"))
        );
        assert_eq!(FieldPath::decode("m[0]").unwrap().lookup(&data), Some(&json!("zero")));
        assert_eq!(FieldPath::decode("a[z]").unwrap().lookup(&data), None);
        assert_eq!(FieldPath::decode("a[b][c]").unwrap().lookup(&data), None);
    }

    #[test]
    fn lookup_append_addresses_the_list() {
        let data = json!({"tags": ["a", "b"]});
        assert_eq!(
            FieldPath::decode("tags[]").unwrap().lookup(&data),
            Some(&json!(["a", "b"]))
        );
    }

    #[test]
    fn set_creates_intermediates() {
        let mut root = Value::Null;
        FieldPath::decode("a.b").unwrap().set(&mut root, json!(1));
        FieldPath::decode("a[c][1]").unwrap().set(&mut root, json!("y"));
        FieldPath::decode("list[]").unwrap().set(&mut root, json!("p"));
        FieldPath::decode("list[]").unwrap().set(&mut root, json!("q"));
        assert_eq!(
            root,
            json!({"a": {"b": 1, "c": [null, "y"]}, "list": ["p", "q"]})
        );
    }

    #[test]
    fn set_index_into_existing_object_uses_string_key() {
        let mut root = json!({"m": {"x": 1}});
        FieldPath::decode("m[2]").unwrap().set(&mut root, json!(true));
        assert_eq!(root, json!({"m": {"x": 1, "2": true}}));
    }

    #[test]
    fn first_and_rest() {
        let path = FieldPath::decode("seo[title][main]").unwrap();
        assert_eq!(path.first(), Some(&PathKey::Name("seo".into())));
        assert_eq!(path.rest().encode(), "title[main]");
        assert!(FieldPath::decode("seo").unwrap().rest().is_empty());
    }
}
