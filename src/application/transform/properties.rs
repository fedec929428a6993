//! Readers for Notion page properties and block trees.
//!
//! Every reader is total: a missing property, a `null` value or an unexpected
//! property type yields `None` / an empty `Vec`.

use serde_json::{Map, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_timestamp(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim();
    if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(parsed);
    }
    Date::parse(input, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Concatenated `plain_text` of a rich-text array.
fn rich_text(runs: &Value) -> String {
    runs.as_array()
        .map(|runs| {
            runs.iter()
                .filter_map(|run| {
                    run.get("plain_text")
                        .or_else(|| run.get("text").and_then(|text| text.get("content")))
                        .and_then(Value::as_str)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// URL of an `external` or `file` object (page cover or files-property entry).
pub(super) fn file_url(file: &Value) -> Option<String> {
    let kind = file.get("type").and_then(Value::as_str)?;
    file.get(kind)
        .and_then(|inner| inner.get("url"))
        .and_then(Value::as_str)
        .and_then(|url| non_empty(url.to_string()))
}

pub(super) struct Properties<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Properties<'a> {
    pub(super) fn of(page: &'a Map<String, Value>) -> Self {
        Self {
            map: page.get("properties").and_then(Value::as_object),
        }
    }

    /// First property matching one of `names`, exact match before case-insensitive.
    fn find(&self, names: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        names.iter().find_map(|name| map.get(*name)).or_else(|| {
            names.iter().find_map(|name| {
                map.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
        })
    }

    fn typed(property: &'a Value) -> Option<(&'a str, &'a Value)> {
        let kind = property.get("type").and_then(Value::as_str)?;
        let value = property.get(kind)?;
        Some((kind, value))
    }

    /// The page title, whatever the title property is named.
    pub(super) fn title(&self) -> Option<String> {
        let map = self.map?;
        map.values()
            .find(|property| property.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(|property| property.get("title"))
            .map(rich_text)
            .and_then(non_empty)
    }

    pub(super) fn text(&self, names: &[&str]) -> Option<String> {
        let (kind, value) = Self::typed(self.find(names)?)?;
        let text = match kind {
            "title" | "rich_text" => rich_text(value),
            "select" | "status" => value.get("name")?.as_str()?.to_string(),
            "url" | "email" | "phone_number" => value.as_str()?.to_string(),
            "number" => value.as_f64().map(format_number)?,
            "formula" => {
                let formula_kind = value.get("type").and_then(Value::as_str)?;
                match value.get(formula_kind)? {
                    Value::String(text) => text.clone(),
                    Value::Number(number) => number.as_f64().map(format_number)?,
                    _ => return None,
                }
            }
            _ => return None,
        };
        non_empty(text)
    }

    /// Multi-select names, a single select, or rich text split into lines.
    pub(super) fn list(&self, names: &[&str]) -> Vec<String> {
        let Some((kind, value)) = self.find(names).and_then(Self::typed) else {
            return Vec::new();
        };
        match kind {
            "multi_select" => value
                .as_array()
                .map(|options| {
                    options
                        .iter()
                        .filter_map(|option| option.get("name").and_then(Value::as_str))
                        .filter_map(|name| non_empty(name.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            "select" | "status" => value
                .get("name")
                .and_then(Value::as_str)
                .and_then(|name| non_empty(name.to_string()))
                .into_iter()
                .collect(),
            "title" | "rich_text" => rich_text(value)
                .lines()
                .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(super) fn date(&self, names: &[&str]) -> Option<OffsetDateTime> {
        let (kind, value) = Self::typed(self.find(names)?)?;
        match kind {
            "date" => parse_timestamp(value.get("start")?.as_str()?),
            "created_time" | "last_edited_time" => parse_timestamp(value.as_str()?),
            "rich_text" => parse_timestamp(&rich_text(value)),
            _ => None,
        }
    }

    pub(super) fn checkbox(&self, names: &[&str]) -> Option<bool> {
        let (kind, value) = Self::typed(self.find(names)?)?;
        match kind {
            "checkbox" => value.as_bool(),
            "formula" => value.get("boolean").and_then(Value::as_bool),
            _ => None,
        }
    }

    pub(super) fn number(&self, names: &[&str]) -> Option<f64> {
        let (kind, value) = Self::typed(self.find(names)?)?;
        match kind {
            "number" => value.as_f64(),
            "formula" => value.get("number").and_then(Value::as_f64),
            "rich_text" => rich_text(value).trim().parse().ok(),
            _ => None,
        }
    }

    /// `(url, name)` pairs of a files property.
    pub(super) fn files(&self, names: &[&str]) -> Vec<(String, Option<String>)> {
        let Some(("files", value)) = self.find(names).and_then(Self::typed) else {
            return Vec::new();
        };
        value
            .as_array()
            .map(|files| {
                files
                    .iter()
                    .filter_map(|file| {
                        let url = file_url(file)?;
                        let name = file
                            .get("name")
                            .and_then(Value::as_str)
                            .and_then(|name| non_empty(name.to_string()));
                        Some((url, name))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// Plain text of a block tree, one line per block, children included.
pub(super) fn blocks_plain_text(blocks: &[Value]) -> String {
    let mut out = String::new();
    collect_block_text(blocks, &mut out);
    out
}

fn collect_block_text(blocks: &[Value], out: &mut String) {
    for block in blocks {
        if let Some(kind) = block.get("type").and_then(Value::as_str) {
            if let Some(runs) = block.get(kind).and_then(|inner| inner.get("rich_text")) {
                let text = rich_text(runs);
                if !text.trim().is_empty() {
                    out.push_str(&text);
                    out.push('\n');
                }
            }
        }
        if let Some(children) = block.get("children").and_then(Value::as_array) {
            collect_block_text(children, out);
        }
    }
}
