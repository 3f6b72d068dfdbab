//! Minimal quote-aware CSV reader.
//!
//! The feeds we ingest are plain ASCII CSV with occasional double-quoted
//! fields (`"Korea, South"`), no embedded newlines, and no escaped quotes
//! beyond the RFC 4180 `""` pair. That is all this reader handles.

/// Split one CSV line on commas, respecting double-quoted fields and
/// collapsing `""` escapes inside them.
pub(crate) fn split_line(line: &str) -> Vec<String> {
  let mut fields = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '"' if in_quotes && chars.peek() == Some(&'"') => {
        chars.next();
        field.push('"');
      }
      '"' => in_quotes = !in_quotes,
      ',' if !in_quotes => {
        fields.push(std::mem::take(&mut field));
      }
      _ => field.push(c),
    }
  }
  fields.push(field);
  fields
}

/// Parse a whole CSV document into rows of fields. Blank lines are
/// dropped; a UTF-8 BOM on the first line is stripped.
pub fn parse(input: &str) -> Vec<Vec<String>> {
  input
    .strip_prefix('\u{feff}')
    .unwrap_or(input)
    .lines()
    .map(|l| l.strip_suffix('\r').unwrap_or(l))
    .filter(|l| !l.is_empty())
    .map(split_line)
    .collect()
}
