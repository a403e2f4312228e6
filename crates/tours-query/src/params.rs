use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Maximum bracket nesting honoured by [`RawParams::from_pairs`]. Deeper
/// segments are kept as one literal key.
pub const MAX_DEPTH: usize = 5;

/// A single value in the raw parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    /// Repeated key (`tag=a&tag=b`) or explicit append (`tag[]=a`).
    List(Vec<String>),
    /// Bracket nesting (`duration[gte]=5`).
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Comma-joined form used by the list-valued keys (`sort`, `fields`).
    /// Maps have no flat form.
    pub fn joined(&self) -> Option<String> {
        match self {
            ParamValue::Str(s) => Some(s.clone()),
            ParamValue::List(items) => Some(items.join(",")),
            ParamValue::Map(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// Untrusted query parameters as decoded from an HTTP query string.
///
/// Keys are kept sorted so every derived filter is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: BTreeMap<String, ParamValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Append,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the parameter tree from decoded `(key, value)` pairs.
    ///
    /// - `a=1&a=2` → `a: ["1", "2"]`
    /// - `a[]=1` → `a: ["1"]`
    /// - `a[b][c]=1` → `a: { b: { c: "1" } }`
    /// - unbalanced keys such as `a[b` are kept literally
    ///
    /// A key used both as a scalar and as a nested map keeps whichever
    /// shape arrived last.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            let path = split_key(key.as_ref());
            insert_path(&mut entries, &path, value.into());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with `key` set to `value`, replacing any previous value.
    pub fn with(&self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// Drop every key, at any depth, that starts with `$` so clients cannot
    /// smuggle store operators (`$where`, `$ne`, ...) into a filter. Dotted
    /// keys such as `startLocation.description` are field paths and stay.
    pub fn sanitized(&self) -> Self {
        Self {
            entries: strip_operator_keys(&self.entries),
        }
    }

    /// Collapse repeated top-level keys to their last value unless the key is
    /// whitelisted. Guards against parameter pollution such as
    /// `sort=price&sort=name`.
    pub fn without_pollution(&self, whitelist: &[&str]) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    ParamValue::List(items) if !whitelist.contains(&key.as_str()) => {
                        match items.last() {
                            Some(last) => ParamValue::Str(last.clone()),
                            None => value.clone(),
                        }
                    }
                    _ => value.clone(),
                };
                (key.clone(), value)
            })
            .collect();
        Self { entries }
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

fn strip_operator_keys(entries: &BTreeMap<String, ParamValue>) -> BTreeMap<String, ParamValue> {
    entries
        .iter()
        .filter_map(|(key, value)| {
            if key.starts_with('$') {
                tracing::debug!(key, "dropping operator-like query key");
                return None;
            }
            let value = match value {
                ParamValue::Map(inner) => ParamValue::Map(strip_operator_keys(inner)),
                other => other.clone(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Split `root[a][b]` into segments. Anything malformed is one literal key.
fn split_key(key: &str) -> Vec<Segment> {
    let literal = || vec![Segment::Key(key.to_string())];

    let open = match key.find('[') {
        Some(0) | None => return literal(),
        Some(i) => i,
    };

    let mut segments = vec![Segment::Key(key[..open].to_string())];
    let mut rest = &key[open..];

    while !rest.is_empty() {
        if segments.len() > MAX_DEPTH {
            segments.push(Segment::Key(rest.to_string()));
            break;
        }
        let Some(inner) = rest.strip_prefix('[') else {
            return literal();
        };
        let Some(close) = inner.find(']') else {
            return literal();
        };
        let name = &inner[..close];
        if name.contains('[') {
            return literal();
        }
        segments.push(if name.is_empty() {
            Segment::Append
        } else {
            Segment::Key(name.to_string())
        });
        rest = &inner[close + 1..];
    }

    // `[]` only makes sense as the final segment.
    let last = segments.len() - 1;
    if segments[..last].contains(&Segment::Append) {
        return literal();
    }
    segments
}

fn insert_path(map: &mut BTreeMap<String, ParamValue>, path: &[Segment], value: String) {
    let Some((Segment::Key(key), rest)) = path.split_first() else {
        return;
    };

    match rest {
        [] => push_value(map.entry(key.clone()), value, false),
        [Segment::Append] => push_value(map.entry(key.clone()), value, true),
        _ => {
            let child = map
                .entry(key.clone())
                .or_insert_with(|| ParamValue::Map(BTreeMap::new()));
            if !matches!(child, ParamValue::Map(_)) {
                *child = ParamValue::Map(BTreeMap::new());
            }
            if let ParamValue::Map(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}

fn push_value(slot: Entry<'_, String, ParamValue>, value: String, force_list: bool) {
    match slot {
        Entry::Vacant(v) => {
            v.insert(if force_list {
                ParamValue::List(vec![value])
            } else {
                ParamValue::Str(value)
            });
        }
        Entry::Occupied(mut o) => {
            let slot = o.get_mut();
            let next = match slot {
                ParamValue::List(items) => {
                    items.push(value);
                    return;
                }
                ParamValue::Str(prev) => ParamValue::List(vec![std::mem::take(prev), value]),
                ParamValue::Map(_) if force_list => ParamValue::List(vec![value]),
                ParamValue::Map(_) => ParamValue::Str(value),
            };
            *slot = next;
        }
    }
}
