//! Front-matter parsing
//!
//! Posts start with a block like
//!
//! ```text
//! ---
//! title: Hello
//! keywords: rust, web
//! ---
//! ```
//!
//! Each header line is `key: value`, split on the first colon. Values are
//! trimmed and lose one leading and one trailing quote character. There is no
//! escaping, no nesting and no multi-line values: a value spanning lines is
//! flattened to one line when written.

use indexmap::IndexMap;

const DELIMITER: &str = "---";

/// Header fields of a post plus the position where its body starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: IndexMap<String, String>,
    body_start: usize,
}

impl FrontMatter {
    /// Parse the header of `source`.
    ///
    /// Without an opening `---` line, or without a closing one, the result has
    /// no fields and the whole text is body.
    pub fn parse(source: &str) -> Self {
        let mut lines = source.split_inclusive('\n');

        let mut offset = match lines.next() {
            Some(first) if is_delimiter(first) => first.len(),
            _ => return Self::default(),
        };

        let mut fields = IndexMap::new();
        for line in lines {
            let line_end = offset + line.len();
            if is_delimiter(line) {
                return Self {
                    fields,
                    body_start: line_end,
                };
            }

            if let Some((key, value)) = parse_line(line) {
                fields.insert(key, value);
            }
            offset = line_end;
        }

        tracing::debug!("Front-matter has no closing delimiter, treating as body");
        Self::default()
    }

    /// Body slice of the `source` this header was parsed from
    pub fn body<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.body_start..).unwrap_or("")
    }

    /// Non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set a field; line breaks in `value` are flattened to spaces
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = value
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.fields.insert(key.to_string(), value);
    }

    /// Set a field only when a non-blank value is present
    pub fn insert_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.insert(key, v);
        }
    }

    /// Render the delimited header block, ending with a newline
    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_quotes(value.trim()).to_string()))
}

/// Drop one leading and one trailing quote character
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
