//! OPL data format, as read by `oplrun` next to the model file:
//!
//! ```text
//! N = 4;
//! V = 2;
//! capacity = [14 15 8 10];
//! size = [[6 3 2 1] [7 8 5 3]];
//! ```
//!
//! Values may be separated by commas and/or whitespace, `//` starts a line comment.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail, ensure};
use itertools::Itertools;
use log::debug;

use crate::entities::Instance;

const KEY_N: &str = "N";
const KEY_V: &str = "V";
const KEY_CAPACITY: &str = "capacity";
const KEY_SIZE: &str = "size";

/// A value on the right hand side of an OPL data statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatValue {
    Int(u64),
    Array(Vec<DatValue>),
}

impl DatValue {
    fn as_int(&self, key: &str) -> Result<u64> {
        match self {
            DatValue::Int(v) => Ok(*v),
            DatValue::Array(_) => bail!("expected {key} to be an integer, found an array"),
        }
    }

    fn as_int_array(&self, key: &str) -> Result<Vec<u64>> {
        match self {
            DatValue::Array(values) => values.iter().map(|v| v.as_int(key)).collect(),
            DatValue::Int(_) => bail!("expected {key} to be an array, found an integer"),
        }
    }

    fn as_int_matrix(&self, key: &str) -> Result<Vec<Vec<u64>>> {
        match self {
            DatValue::Array(rows) => rows.iter().map(|r| r.as_int_array(key)).collect(),
            DatValue::Int(_) => bail!("expected {key} to be a matrix, found an integer"),
        }
    }
}

pub fn decode(text: &str) -> Result<Instance> {
    let statements = parse_statements(text)?;

    let capacities = statements
        .get(KEY_CAPACITY)
        .ok_or_else(|| anyhow!("missing '{KEY_CAPACITY}' statement"))?
        .as_int_array(KEY_CAPACITY)?;
    let sizes = statements
        .get(KEY_SIZE)
        .ok_or_else(|| anyhow!("missing '{KEY_SIZE}' statement"))?
        .as_int_matrix(KEY_SIZE)?;

    if let Some(n) = statements.get(KEY_N) {
        let n = n.as_int(KEY_N)?;
        ensure!(
            n as usize == capacities.len(),
            "{KEY_N} = {n} but {} capacities were given",
            capacities.len()
        );
    }
    if let Some(v) = statements.get(KEY_V) {
        let v = v.as_int(KEY_V)?;
        ensure!(
            v as usize == sizes.len(),
            "{KEY_V} = {v} but {} size rows were given",
            sizes.len()
        );
    }

    Instance::new(capacities, sizes)
}

pub fn encode(instance: &Instance) -> String {
    let rows = instance
        .sizes()
        .iter()
        .map(|row| format!("  [{}]", row.iter().join(" ")))
        .join("\n");
    format!(
        "{KEY_N} = {};\n{KEY_V} = {};\n{KEY_CAPACITY} = [{}];\n{KEY_SIZE} = [\n{rows}\n];\n",
        instance.n_bins(),
        instance.n_items(),
        instance.capacities().iter().join(" "),
    )
}

/// Splits the text into `key = value;` statements.
/// Later statements with the same key override earlier ones.
pub fn parse_statements(text: &str) -> Result<HashMap<String, DatValue>> {
    let without_comments = text
        .lines()
        .map(|line| match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .join("\n");

    let mut statements = HashMap::new();
    for (idx, stmt) in without_comments.split(';').enumerate() {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        let (key, value) = stmt
            .split_once('=')
            .with_context(|| format!("statement {idx} is not of the form 'key = value': {stmt:?}"))?;
        let key = key.trim();
        ensure!(
            !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_'),
            "invalid key in statement {idx}: {key:?}"
        );
        let value = parse_value(value).with_context(|| format!("invalid value for '{key}'"))?;
        if ![KEY_N, KEY_V, KEY_CAPACITY, KEY_SIZE].contains(&key) {
            debug!("ignoring unknown key '{key}' in data file");
        }
        statements.insert(key.to_string(), value);
    }
    Ok(statements)
}

fn parse_value(text: &str) -> Result<DatValue> {
    let mut parser = ValueParser {
        chars: text.trim().chars().collect(),
        pos: 0,
    };
    let value = parser.value()?;
    parser.skip_separators();
    ensure!(
        parser.pos == parser.chars.len(),
        "unexpected trailing input at position {}",
        parser.pos
    );
    Ok(value)
}

struct ValueParser {
    chars: Vec<char>,
    pos: usize,
}

impl ValueParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() || c == ',') {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<DatValue> {
        self.skip_separators();
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                let mut elements = vec![];
                loop {
                    self.skip_separators();
                    match self.peek() {
                        Some(']') => {
                            self.pos += 1;
                            return Ok(DatValue::Array(elements));
                        }
                        None => bail!("unterminated array"),
                        _ => elements.push(self.value()?),
                    }
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits = self.chars[start..self.pos].iter().collect::<String>();
                let value = digits
                    .parse::<u64>()
                    .with_context(|| format!("integer out of range: {digits}"))?;
                Ok(DatValue::Int(value))
            }
            Some(c) => bail!("unexpected character {c:?} at position {}", self.pos),
            None => bail!("missing value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_with_commas_and_comments() {
        let text = "// generated\nN = 2;\nV = 1;\ncapacity = [5, 6];\nsize = [[3, 4]]; // row\n";
        let instance = decode(text).unwrap();
        assert_eq!(instance.capacities(), &[5, 6]);
        assert_eq!(instance.sizes(), &[vec![3, 4]]);
    }

    #[test]
    fn ignores_unknown_keys() {
        let text = "capacity = [5];\nsize = [[3]];\nseed = 12;";
        assert!(decode(text).is_ok());
    }

    #[test]
    fn rejects_inconsistent_counts() {
        let text = "N = 3;\ncapacity = [5, 6];\nsize = [[3, 4]];";
        assert!(decode(text).is_err());
    }

    #[test]
    fn rejects_unterminated_array() {
        assert!(decode("capacity = [5, 6;\nsize = [[3, 4]];").is_err());
    }

    #[test]
    fn rejects_missing_sizes() {
        assert!(decode("capacity = [5, 6];").is_err());
    }

    #[test]
    fn encodes_rows_on_separate_lines() {
        let instance = Instance::new(vec![5, 6], vec![vec![3, 4], vec![1, 2]]).unwrap();
        let text = encode(&instance);
        assert!(text.contains("capacity = [5 6];"));
        assert!(text.contains("  [1 2]"));
    }
}
