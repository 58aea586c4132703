//! JSON data file codec.
//!
//! The data file is a small, fixed-shape JSON document:
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "next_id": 3,
//!   "tasks": [
//!     {
//!       "id": 1,
//!       "title": "Buy milk",
//!       ...
//!     }
//!   ]
//! }
//! ```
//!
//! Encoding writes fields in a fixed order so the output is deterministic.
//! Decoding is a single-pass scanner for exactly this dialect: a top-level
//! object of scalars plus the `tasks` array of flat objects. Strings are
//! tokenised before any structure is looked at, so braces and brackets inside
//! titles never confuse it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use tracing::{debug, info, warn};

use crate::error::JsonError;
use crate::fields::Status;
use crate::store::TaskStore;
use crate::task::{Task, TaskRecord, MAX_PRIORITY};

/// Format version written to every file.
pub const FORMAT_VERSION: &str = "1.0";
/// Data file used when no name is given.
pub const DEFAULT_FILE: &str = "tasks.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
// `%.f` also accepts a missing fraction.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Escape a string for use inside a JSON string literal.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0c}' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape`]. An unknown escape yields the escaped character itself.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            // trailing lone backslash
            None => out.push('\\'),
        }
    }
    out
}

pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a local timestamp written by [`format_timestamp`]. The millisecond
/// part is optional.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Local>, JsonError> {
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT)
        .map_err(|e| JsonError::ParseError(format!("bad timestamp '{s}': {e}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| JsonError::ParseError(format!("timestamp '{s}' does not exist locally")))
}

fn encode_task(task: &Task, out: &mut String) {
    const INDENT: &str = "      ";
    out.push_str("    {\n");
    out.push_str(&format!("{INDENT}\"id\": {},\n", task.id()));
    out.push_str(&format!("{INDENT}\"title\": \"{}\",\n", escape(task.title())));
    out.push_str(&format!(
        "{INDENT}\"description\": \"{}\",\n",
        escape(task.description())
    ));
    out.push_str(&format!("{INDENT}\"status\": \"{}\",\n", task.status().as_str()));
    out.push_str(&format!("{INDENT}\"category\": \"{}\",\n", escape(task.category())));
    out.push_str(&format!("{INDENT}\"priority\": {},\n", task.priority()));
    out.push_str(&format!(
        "{INDENT}\"created_at\": \"{}\",\n",
        format_timestamp(&task.created_at())
    ));
    out.push_str(&format!(
        "{INDENT}\"updated_at\": \"{}\"",
        format_timestamp(&task.updated_at())
    ));
    if let Some(done) = task.completed_at() {
        out.push_str(&format!(
            ",\n{INDENT}\"completed_at\": \"{}\"",
            format_timestamp(&done)
        ));
    }
    out.push_str("\n    }");
}

/// Encode the whole store as a JSON document.
pub fn encode(store: &TaskStore) -> String {
    let mut out = String::new();
    out.push_str("{\n");
    out.push_str(&format!("  \"version\": \"{FORMAT_VERSION}\",\n"));
    out.push_str(&format!("  \"next_id\": {},\n", store.next_id()));
    out.push_str("  \"tasks\": [\n");
    let count = store.len();
    for (i, task) in store.tasks().iter().enumerate() {
        encode_task(task, &mut out);
        if i + 1 < count {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("  ]\n");
    out.push('}');
    out
}

/// A scalar value as it appeared in the document.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    /// A quoted string, already unescaped.
    Str(String),
    /// An unquoted token, whitespace-trimmed.
    Bare(String),
}

impl Scalar {
    fn text(&self) -> &str {
        match self {
            Scalar::Str(s) | Scalar::Bare(s) => s,
        }
    }
}

/// Key/value pairs of one flat object, in document order.
type Fields = Vec<(String, Scalar)>;

fn field<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.text())
}

/// Everything the top-level object holds.
#[derive(Debug, Default)]
struct Document {
    scalars: Fields,
    tasks: Option<Vec<Fields>>,
}

/// Single-pass scanner over the document text.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn fail(&self, what: &str) -> JsonError {
        JsonError::InvalidFormat(format!("{what} at byte {}", self.pos))
    }

    fn expect(&mut self, want: char) -> Result<(), JsonError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.fail(&format!("expected '{want}', found '{c}'"))),
            None => Err(self.fail(&format!("expected '{want}', found end of input"))),
        }
    }

    /// Read a quoted string; the opening quote must be next.
    fn string(&mut self) -> Result<String, JsonError> {
        self.expect('"')?;
        let start = self.pos;
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(self.fail("unterminated string"));
                    }
                }
                Some(_) => {}
                None => return Err(self.fail("unterminated string")),
            }
        }
        Ok(unescape(&self.src[start..self.pos - 1]))
    }

    /// Read an unquoted token up to the next `,`, `}`, `]` or line break.
    fn bare(&mut self) -> Result<String, JsonError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | '}' | ']' | '\n' | '\r') {
                break;
            }
            self.bump();
        }
        let token = self.src[start..self.pos].trim();
        if token.is_empty() {
            return Err(self.fail("missing value"));
        }
        Ok(token.to_string())
    }

    fn scalar(&mut self) -> Result<Scalar, JsonError> {
        self.skip_ws();
        match self.peek() {
            Some('"') => Ok(Scalar::Str(self.string()?)),
            Some('{') | Some('[') => Err(self.fail("nested value not allowed here")),
            Some(_) => Ok(Scalar::Bare(self.bare()?)),
            None => Err(self.fail("missing value")),
        }
    }

    /// Walk a `{ ... }` object, handing each key to `on_entry`, which must
    /// consume the value.
    fn object<F>(&mut self, mut on_entry: F) -> Result<(), JsonError>
    where
        F: FnMut(&mut Self, String) -> Result<(), JsonError>,
    {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(());
        }
        loop {
            self.skip_ws();
            let key = self.string()?;
            self.expect(':')?;
            on_entry(self, key)?;
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(()),
                _ => return Err(self.fail("expected ',' or '}' in object")),
            }
        }
    }

    fn flat_object(&mut self) -> Result<Fields, JsonError> {
        let mut fields = Fields::new();
        self.object(|s, key| {
            let value = s.scalar()?;
            fields.push((key, value));
            Ok(())
        })?;
        Ok(fields)
    }

    fn task_array(&mut self) -> Result<Vec<Fields>, JsonError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(self.flat_object()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(items),
                _ => return Err(self.fail("expected ',' or ']' in tasks array")),
            }
        }
    }

    fn document(&mut self) -> Result<Document, JsonError> {
        let mut doc = Document::default();
        self.object(|s, key| {
            if key == "tasks" {
                s.skip_ws();
                if s.peek() != Some('[') {
                    return Err(s.fail("\"tasks\" is not an array"));
                }
                doc.tasks = Some(s.task_array()?);
            } else {
                let value = s.scalar()?;
                doc.scalars.push((key, value));
            }
            Ok(())
        })?;
        self.skip_ws();
        if self.peek().is_some() {
            return Err(self.fail("trailing content after document"));
        }
        Ok(doc)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, JsonError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| JsonError::ParseError(format!("\"{key}\" value '{raw}': {e}")))
}

fn decode_task(fields: &Fields) -> Result<Task, JsonError> {
    let id_raw = field(fields, "id").unwrap_or_default();
    let title = field(fields, "title").unwrap_or_default();
    if id_raw.is_empty() || title.is_empty() {
        return Err(JsonError::InvalidFormat(
            "task is missing \"id\" or \"title\"".to_string(),
        ));
    }
    let id: u64 = parse_number("id", id_raw)?;
    if id == 0 {
        return Err(JsonError::InvalidFormat("task id must be positive".to_string()));
    }
    // The counter must still be able to move past every stored id.
    if id == u64::MAX {
        return Err(JsonError::InvalidFormat(format!("task id {id} out of range")));
    }

    let status_raw = field(fields, "status").unwrap_or_default();
    let status = Status::from_file_name(status_raw)
        .ok_or_else(|| JsonError::InvalidFormat(format!("unknown status '{status_raw}'")))?;

    let priority = match field(fields, "priority").filter(|p| !p.is_empty()) {
        Some(raw) => {
            let p: i64 = parse_number("priority", raw)?;
            u8::try_from(p)
                .ok()
                .filter(|p| *p <= MAX_PRIORITY)
                .ok_or_else(|| JsonError::InvalidFormat(format!("priority {p} out of range")))?
        }
        None => 0,
    };

    let category = field(fields, "category")
        .unwrap_or(crate::task::DEFAULT_CATEGORY)
        .to_string();

    let stamp = |key: &str| -> Result<Option<DateTime<Local>>, JsonError> {
        field(fields, key)
            .filter(|s| !s.is_empty())
            .map(parse_timestamp)
            .transpose()
    };
    let now = crate::task::now();
    let created_at = stamp("created_at")?.unwrap_or(now);
    let updated_at = stamp("updated_at")?.unwrap_or(created_at);

    Ok(Task::from(TaskRecord {
        id,
        title: title.to_string(),
        description: field(fields, "description").unwrap_or_default().to_string(),
        status,
        category,
        priority,
        created_at,
        updated_at,
        completed_at: stamp("completed_at")?,
    }))
}

/// Replace the store's contents with the decoded document.
///
/// Nothing in the store changes unless the whole document decodes.
pub fn decode_into(store: &mut TaskStore, text: &str) -> Result<(), JsonError> {
    let doc = Scanner::new(text).document()?;
    let Some(raw_tasks) = doc.tasks else {
        return Err(JsonError::InvalidFormat("missing \"tasks\" array".to_string()));
    };

    let mut tasks: Vec<Task> = Vec::with_capacity(raw_tasks.len());
    for fields in &raw_tasks {
        let task = decode_task(fields)?;
        if tasks.iter().any(|t| t.id() == task.id()) {
            return Err(JsonError::InvalidFormat(format!("duplicate task id {}", task.id())));
        }
        tasks.push(task);
    }

    let next_id = match field(&doc.scalars, "next_id").filter(|s| !s.is_empty()) {
        Some(raw) => parse_number("next_id", raw)?,
        None => 1,
    };
    debug!(tasks = tasks.len(), next_id, "decoded document");
    store.replace(tasks, next_id);
    Ok(())
}

/// Decode a document into a fresh store.
pub fn decode(text: &str) -> Result<TaskStore, JsonError> {
    let mut store = TaskStore::new();
    decode_into(&mut store, text)?;
    Ok(store)
}

/// Read a data file without touching any store.
pub fn read_file(path: &Path) -> Result<String, JsonError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JsonError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => JsonError::ParseError(format!("reading {}: {e}", path.display())),
    })
}

pub fn load_from_file(store: &mut TaskStore, path: &Path) -> Result<(), JsonError> {
    let text = read_file(path)?;
    decode_into(store, &text)?;
    info!(path = %path.display(), tasks = store.len(), "loaded data file");
    Ok(())
}

/// Write the store to `path` via a temp file and rename.
pub fn save_to_file(store: &TaskStore, path: &Path) -> Result<(), JsonError> {
    let data = encode(store);
    let tmp = path.with_extension("json.tmp");
    let write_err = |source| JsonError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, data.as_bytes()).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JsonError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => write_err(e),
    })?;
    if let Err(e) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %cleanup, "could not remove temp file");
        }
        return Err(write_err(e));
    }
    info!(path = %path.display(), bytes = data.len(), tasks = store.len(), "saved data file");
    Ok(())
}

/// Summary of a data file, for viewing without loading it into a store.
#[derive(Debug)]
pub struct FileSummary {
    pub version: Option<String>,
    pub next_id: Option<String>,
    pub size: usize,
    pub tasks: TaskStore,
}

/// Decode a file's text for read-only display.
pub fn summarize(text: &str) -> Result<FileSummary, JsonError> {
    let doc = Scanner::new(text).document()?;
    let store = decode(text)?;
    Ok(FileSummary {
        version: field(&doc.scalars, "version").map(str::to_string),
        next_id: field(&doc.scalars, "next_id").map(str::to_string),
        size: text.len(),
        tasks: store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::new();
        let a = store.add_task("Buy milk", "").unwrap();
        let b = store
            .add_task("Say \"hi\"\nthen {leave}", "tabs\tand \\ slashes")
            .unwrap();
        let c = store.add_task("Plan trip [Q3]", "Café ✈ 日本").unwrap();
        store.add_task("Dropped", "").unwrap();
        store.remove_task(4).unwrap();

        store.get_mut(a).unwrap().set_category("Home").unwrap();
        store.get_mut(a).unwrap().set_priority(3).unwrap();
        store.get_mut(b).unwrap().set_priority(10).unwrap();
        store.update_status(b, Status::Completed).unwrap();
        store.update_status(b, Status::InProgress).unwrap();
        store.get_mut(c).unwrap().set_category("").unwrap();
        store.update_status(c, Status::Cancelled).unwrap();
        store
    }

    #[test]
    fn escape_covers_quotes_and_controls() {
        assert_eq!(escape("a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(escape("\n\r\t\u{08}\u{0c}"), "\\n\\r\\t\\b\\f");
        assert_eq!(escape("\u{01}x\u{1f}"), "\\u0001x\\u001f");
        assert_eq!(escape("héllo ✓"), "héllo ✓");
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "quote\" slash\\ nl\n cr\r tab\t bell\u{07} bs\u{08} ff\u{0c} ✓";
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn unescape_passes_unknown_escapes_through() {
        assert_eq!(unescape("a\\qb"), "aqb");
        assert_eq!(unescape("\\/"), "/");
        assert_eq!(unescape("\\uZZZZ"), "uZZZZ");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn encode_has_fixed_shape() {
        let mut store = TaskStore::new();
        assert_eq!(
            encode(&store),
            "{\n  \"version\": \"1.0\",\n  \"next_id\": 1,\n  \"tasks\": [\n  ]\n}"
        );

        store.add_task("One", "").unwrap();
        let text = encode(&store);
        assert!(text.contains("      \"id\": 1,\n      \"title\": \"One\",\n"));
        assert!(text.contains("\"status\": \"Pending\""));
        assert!(!text.contains("completed_at"));
        assert!(text.ends_with("    }\n  ]\n}"));
    }

    #[test]
    fn encoded_document_is_standard_json() {
        let store = sample_store();
        let value: serde_json::Value = serde_json::from_str(&encode(&store)).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["next_id"], 5);
        assert_eq!(value["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(value["tasks"][1]["title"], "Say \"hi\"\nthen {leave}");
        assert_eq!(value["tasks"][1]["status"], "InProgress");
        assert!(value["tasks"][1].get("completed_at").is_some());
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let store = sample_store();
        let text = encode(&store);
        let decoded = decode(&text).unwrap();

        assert_eq!(decoded.next_id(), store.next_id());
        assert_eq!(decoded.len(), store.len());
        for (a, b) in store.tasks().iter().zip(decoded.tasks()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.title(), b.title());
            assert_eq!(a.description(), b.description());
            assert_eq!(a.status(), b.status());
            assert_eq!(a.priority(), b.priority());
            assert_eq!(a.created_at(), b.created_at());
            assert_eq!(a.updated_at(), b.updated_at());
            assert_eq!(a.completed_at(), b.completed_at());
        }
        for (a, b) in store.tasks().iter().zip(decoded.tasks()) {
            assert_eq!(a.category(), b.category());
        }
        assert_eq!(decoded.tasks()[2].category(), "");
        assert_eq!(decoded.tasks()[0].category(), "Home");
    }

    #[test]
    fn re_encoding_is_deterministic() {
        let store = sample_store();
        let text = encode(&store);
        let again = encode(&decode(&text).unwrap());
        assert_eq!(text, again);
    }

    #[test]
    fn decode_is_replacing_not_merging() {
        let mut store = sample_store();
        decode_into(&mut store, "{\"next_id\": 9, \"tasks\": []}").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 9);
    }

    #[test]
    fn decode_raises_stale_next_id() {
        let text = r#"{"next_id": 1, "tasks": [{"id": 7, "title": "x", "status": "Pending"}]}"#;
        let store = decode(text).unwrap();
        assert_eq!(store.next_id(), 8);
        assert_eq!(store.tasks()[0].category(), "General");
        assert_eq!(store.tasks()[0].priority(), 0);
    }

    #[test]
    fn decode_keeps_empty_category_verbatim() {
        let text = r#"{"next_id": 2, "tasks": [{"id": 1, "title": "x", "status": "Pending", "category": ""}]}"#;
        let store = decode(text).unwrap();
        assert_eq!(store.tasks()[0].category(), "");
        assert!(encode(&store).contains("\"category\": \"\","));
    }

    #[test]
    fn decode_rejects_ids_the_counter_cannot_pass() {
        let text = r#"{"next_id": 1, "tasks": [{"id": 18446744073709551615, "title": "x", "status": "Pending"}]}"#;
        assert!(matches!(decode(text), Err(JsonError::InvalidFormat(_))));

        let text = r#"{"next_id": 18446744073709551615, "tasks": [{"id": 18446744073709551614, "title": "x", "status": "Pending"}]}"#;
        let mut store = decode(text).unwrap();
        assert_eq!(store.next_id(), u64::MAX);
        assert_eq!(
            store.add_task("y", ""),
            Err(crate::error::TaskError::IdsExhausted)
        );
    }

    #[test]
    fn decode_accepts_legacy_status_and_compact_layout() {
        let text = r#"{"version":"1.0","next_id":3,"tasks":[{"id":2,"title":"t","status":"In Progress","priority":4,"created_at":"2024-03-01T10:00:00.250","updated_at":"2024-03-01T11:00:00"}]}"#;
        let store = decode(text).unwrap();
        let task = &store.tasks()[0];
        assert_eq!(task.status(), Status::InProgress);
        assert_eq!(task.priority(), 4);
        assert_eq!(format_timestamp(&task.created_at()), "2024-03-01T10:00:00.250");
        assert_eq!(format_timestamp(&task.updated_at()), "2024-03-01T11:00:00.000");
    }

    #[test]
    fn decode_failures_map_to_error_kinds() {
        let invalid = [
            r#"{"version": "1.0", "next_id": 1}"#,
            r#"{"tasks": {"id": 1}}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "Pending"}"#,
            r#"{"tasks": [{"title": "x", "status": "Pending"}]}"#,
            r#"{"tasks": [{"id": 1, "title": "", "status": "Pending"}]}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "Sleeping"}]}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "done"}]}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "PENDING"}]}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "Pending", "priority": 11}]}"#,
            r#"{"tasks": [{"id": 1, "title": "a", "status": "Pending"}, {"id": 1, "title": "b", "status": "Pending"}]}"#,
            "not json at all",
        ];
        for text in invalid {
            assert!(
                matches!(decode(text), Err(JsonError::InvalidFormat(_))),
                "expected InvalidFormat for {text}"
            );
        }

        let unparsable = [
            r#"{"tasks": [{"id": abc, "title": "x", "status": "Pending"}]}"#,
            r#"{"next_id": 1.5, "tasks": []}"#,
            r#"{"tasks": [{"id": 1, "title": "x", "status": "Pending", "created_at": "yesterday"}]}"#,
        ];
        for text in unparsable {
            assert!(
                matches!(decode(text), Err(JsonError::ParseError(_))),
                "expected ParseError for {text}"
            );
        }
    }

    #[test]
    fn failed_decode_leaves_store_untouched() {
        let mut store = sample_store();
        let before = encode(&store);
        assert!(decode_into(&mut store, r#"{"tasks": [{"id": 1}]}"#).is_err());
        assert_eq!(encode(&store), before);
    }

    #[test]
    fn braces_inside_strings_do_not_split_tasks() {
        let mut store = TaskStore::new();
        store.add_task("}{ tricky ]", "{\"nested\": [1, 2]}").unwrap();
        store.add_task("second", "").unwrap();
        let decoded = decode(&encode(&store)).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.tasks()[0].title(), "}{ tricky ]");
        assert_eq!(decoded.tasks()[0].description(), "{\"nested\": [1, 2]}");
    }

    #[test]
    fn save_and_load_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let store = sample_store();
        store.save(&path).unwrap();
        assert!(!dir.path().join("tasks.json.tmp").exists());

        let mut loaded = TaskStore::new();
        loaded.add_task("will be replaced", "").unwrap();
        loaded.load(&path).unwrap();
        assert_eq!(encode(&loaded), encode(&store));
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let err = TaskStore::new().save(&target).unwrap_err();
        assert!(matches!(err, JsonError::WriteError { .. }));
        assert!(!dir.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TaskStore::new();
        let err = store.load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, JsonError::FileNotFound { .. }));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new();
        let err = store.save(&dir.path().join("no/such/dir/tasks.json")).unwrap_err();
        assert!(matches!(err, JsonError::FileNotFound { .. }));
    }

    #[test]
    fn summarize_reports_metadata() {
        let store = sample_store();
        let text = encode(&store);
        let summary = summarize(&text).unwrap();
        assert_eq!(summary.version.as_deref(), Some("1.0"));
        assert_eq!(summary.next_id.as_deref(), Some("5"));
        assert_eq!(summary.size, text.len());
        assert_eq!(summary.tasks.len(), 3);
    }
}
