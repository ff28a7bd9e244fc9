//! Newline-delimited JSON record reading.
//!
//! Each non-blank line is one JSON object carrying an identifier field and
//! zero or more attribute fields whose values are arrays of scalar ids:
//!
//! ```text
//! {"id": 17, "authors": ["smith", "jones"], "venue": ["kdd"]}
//! ```

use crate::config::AttributeSchema;
use crate::error::{Error, Result};
use serde_json::Value;
use std::io::BufRead;

/// One parsed input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    /// Attribute values, aligned with the schema's attribute order.
    pub values: Vec<Vec<String>>,
}

impl Record {
    /// Parse one JSON line against `schema`.
    ///
    /// Missing, `null` and empty-array fields yield no values. Anything that is
    /// not an array of scalars is rejected.
    pub fn parse(line: &str, line_no: usize, id_field: &str, schema: &AttributeSchema) -> Result<Self> {
        let json: Value =
            serde_json::from_str(line).map_err(|source| Error::InvalidJson { line: line_no, source })?;
        let obj = json.as_object().ok_or_else(|| Error::MalformedRecord {
            line: line_no,
            reason: "record is not a JSON object".to_string(),
        })?;

        let id = obj
            .get(id_field)
            .and_then(scalar_to_string)
            .ok_or_else(|| Error::MalformedRecord {
                line: line_no,
                reason: format!("missing or non-scalar `{id_field}` field"),
            })?;

        let mut values = Vec::with_capacity(schema.len());
        for (name, _) in schema.attributes() {
            let field = match obj.get(name) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| {
                        scalar_to_string(item).ok_or_else(|| Error::MalformedRecord {
                            line: line_no,
                            reason: format!("field `{name}` contains a non-scalar value"),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                Some(_) => {
                    return Err(Error::MalformedRecord {
                        line: line_no,
                        reason: format!("field `{name}` is not an array"),
                    })
                }
            };
            values.push(field);
        }

        Ok(Self { id, values })
    }

    /// Total number of attribute occurrences, duplicates included.
    pub fn occurrence_count(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Iterator over the records of a JSONL stream.
///
/// Stops at the first error; the caller is expected to abort on it.
pub struct RecordReader<'a, R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    id_field: &'a str,
    schema: &'a AttributeSchema,
}

impl<'a, R: BufRead> RecordReader<'a, R> {
    pub fn new(reader: R, id_field: &'a str, schema: &'a AttributeSchema) -> Self {
        Self { lines: reader.lines(), line_no: 0, id_field, schema }
    }
}

impl<R: BufRead> Iterator for RecordReader<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(Record::parse(&line, self.line_no, self.id_field, self.schema));
        }
    }
}
