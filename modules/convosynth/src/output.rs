use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use convosynth_common::{Conversation, ConvoSynthError};
use serde::Serialize;
use tracing::debug;

use crate::json_text::{self, AsciiFormatter};

pub const CSV_HEADER: [&str; 8] = [
    "id",
    "category",
    "location",
    "user_question",
    "assistant_answer",
    "date",
    "time",
    "latency_ms",
];

fn output_error(path: &Path, e: impl std::fmt::Display) -> ConvoSynthError {
    ConvoSynthError::Output(format!("{}: {e}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<(), ConvoSynthError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| output_error(parent, e))
        }
        _ => Ok(()),
    }
}

/// Pretty-printed JSON (two-space indent, non-ASCII escaped), parent
/// directories created.
pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ConvoSynthError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| output_error(path, e))?;
    let mut writer = BufWriter::new(file);
    json_text::write_with(&mut writer, AsciiFormatter::pretty(), value)
        .map_err(|e| output_error(path, e))?;
    writer.flush().map_err(|e| output_error(path, e))?;
    debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

pub fn write_json(path: &Path, conversations: &[Conversation]) -> Result<(), ConvoSynthError> {
    write_pretty_json(path, conversations)
}

/// One row per conversation, columns as in [`CSV_HEADER`].
pub fn write_csv(path: &Path, conversations: &[Conversation]) -> Result<(), ConvoSynthError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| output_error(path, e))?;
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| output_error(path, e))?;

    for conv in conversations {
        let latency = conv.meta.latency_ms.to_string();
        writer
            .write_record([
                conv.id.as_str(),
                conv.category.as_str(),
                conv.location.as_deref().unwrap_or(""),
                conv.user_question(),
                conv.assistant_answer(),
                conv.meta.date.as_str(),
                conv.meta.time.as_str(),
                latency.as_str(),
            ])
            .map_err(|e| output_error(path, e))?;
    }

    writer.flush().map_err(|e| output_error(path, e))?;
    debug!(path = %path.display(), rows = conversations.len(), "Wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use convosynth_common::{ConversationMessage, ConversationMeta};

    fn conversation(answer: &str) -> Conversation {
        Conversation {
            id: "conv_42_0".to_string(),
            category: "restaurants_cafes".to_string(),
            location: Some("Ravi Restaurant".to_string()),
            messages: vec![
                ConversationMessage::user("Which bus, please?"),
                ConversationMessage::assistant(answer),
            ],
            meta: ConversationMeta {
                model: "m".to_string(),
                source: "lmstudio".to_string(),
                date: "2025-03-02".to_string(),
                time: "21:15:00".to_string(),
                latency_ms: 812,
            },
        }
    }

    #[test]
    fn csv_has_header_and_quotes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        write_csv(&path, &[conversation("Take bus 9, then walk \"two\" minutes.\nEnjoy.")]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "conv_42_0");
        assert_eq!(&rows[0][3], "Which bus, please?");
        assert_eq!(&rows[0][4], "Take bus 9, then walk \"two\" minutes.\nEnjoy.");
        assert_eq!(&rows[0][7], "812");
    }

    #[test]
    fn json_round_trips_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.json");
        let conversations = vec![conversation(""), conversation("ok")];
        write_json(&path, &conversations).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"));
        let back: Vec<Conversation> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, conversations);
    }

    #[test]
    fn empty_batch_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &[]).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim_end(), CSV_HEADER.join(","));
    }

    #[test]
    fn json_escapes_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut conv = conversation("Take bus 27 to Café Bateel.");
        conv.location = Some("Café Bateel".to_string());
        write_json(&path, &[conv.clone()]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.is_ascii());
        assert!(raw.contains(r#""location": "Caf\u00e9 Bateel""#));
        let back: Vec<Conversation> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, vec![conv]);
    }
}
