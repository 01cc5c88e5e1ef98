use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dotted path identifying where a scalar lives inside a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath(pub String);

impl KeyPath {
    pub fn new(path: impl Into<String>) -> Self {
        KeyPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric identity of a JSON number literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NumericKey {
    /// Exact decimal digits of an integral value, `-` only when negative
    Integer(String),
    /// Bit pattern of a non-integral `f64`
    Float(u64),
}

impl NumericKey {
    fn from_f64(f: f64) -> Self {
        if f == 0.0 {
            NumericKey::Integer(String::from("0"))
        } else if f.is_finite() && f.fract() == 0.0 {
            // Fixed-precision formatting of an f64 is exact
            NumericKey::Integer(format!("{:.0}", f))
        } else {
            NumericKey::Float(f.to_bits())
        }
    }

    fn from_integer_literal(text: &str) -> Self {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.bytes().all(|b| b == b'0') {
            NumericKey::Integer(String::from("0"))
        } else {
            NumericKey::Integer(text.to_string())
        }
    }
}

/// A JSON number that compares by numeric value but remembers its literal.
///
/// Integer literals keep every digit, so values beyond the 64-bit range stay
/// distinct. `1`, `1.0` and `1e0` are equal, as are `0` and `-0.0`; the text
/// kept for output is whichever literal was counted first.
#[derive(Debug, Clone)]
pub struct JsonNumber {
    text: String,
    key: NumericKey,
}

impl JsonNumber {
    pub fn from_literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let is_integer = !text.contains(|c| matches!(c, '.' | 'e' | 'E'));
        let key = if is_integer {
            NumericKey::from_integer_literal(&text)
        } else {
            match text.parse::<f64>() {
                Ok(f) => NumericKey::from_f64(f),
                Err(_) => NumericKey::Integer(text.clone()),
            }
        };
        JsonNumber { text, key }
    }

    /// The literal as it appeared in the input
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&Number> for JsonNumber {
    fn from(n: &Number) -> Self {
        // With `arbitrary_precision` this is the literal from the input
        JsonNumber::from_literal(n.to_string())
    }
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for JsonNumber {}

impl Hash for JsonNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// A non-null JSON scalar used as a histogram key.
///
/// The variant tag is part of the identity, so the number `1`, the string
/// `"1"` and the boolean `true` are three different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    Bool(bool),
    Number(JsonNumber),
    String(String),
}

impl ScalarValue {
    /// Convert a JSON leaf into a scalar. Returns `None` for null and for
    /// containers.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            Value::Number(n) => Some(ScalarValue::Number(n.into())),
            Value::String(s) => Some(ScalarValue::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => f.write_str(n.as_str()),
            ScalarValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Number(JsonNumber::from_literal(n.to_string()))
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

/// Occurrence counts for the distinct values seen at one key path.
///
/// Entries keep the order in which each value was first counted.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    entries: Vec<(ScalarValue, u64)>,
    index: HashMap<ScalarValue, usize>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `value`
    pub fn increment(&mut self, value: ScalarValue) {
        if let Some(&slot) = self.index.get(&value) {
            self.entries[slot].1 += 1;
            return;
        }
        self.index.insert(value.clone(), self.entries.len());
        self.entries.push((value, 1));
    }

    pub fn count(&self, value: &ScalarValue) -> u64 {
        self.index
            .get(value)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&ScalarValue, u64)> {
        self.entries.iter().map(|(value, count)| (value, *count))
    }

    /// Entries sorted by count, highest first. Equal counts keep first-seen
    /// order because `sort_by` is stable.
    pub fn ranked(&self) -> Vec<(&ScalarValue, u64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Per-key histograms for a whole dataset, in first-seen key order
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    keys: Vec<(KeyPath, Histogram)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value` at `path`, registering the path on
    /// first use
    pub fn record(&mut self, path: &str, value: ScalarValue) {
        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                let slot = self.keys.len();
                self.index.insert(path.to_string(), slot);
                self.keys.push((KeyPath::new(path), Histogram::new()));
                slot
            }
        };
        self.keys[slot].1.increment(value);
    }

    pub fn get(&self, path: &str) -> Option<&Histogram> {
        self.index.get(path).map(|&slot| &self.keys[slot].1)
    }

    /// Number of distinct key paths
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyPath, &Histogram)> {
        self.keys.iter().map(|(path, histogram)| (path, histogram))
    }

    pub fn key_paths(&self) -> impl Iterator<Item = &KeyPath> {
        self.keys.iter().map(|(path, _)| path)
    }
}

/// Settings for the flattening walk
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Separator placed between nested object keys
    pub separator: String,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from("."),
        }
    }
}
