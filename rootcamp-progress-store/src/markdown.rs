use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Stores serializable documents as markdown files with an embedded JSON block.
///
/// Each key maps to `<dir>/<key>.md`. The JSON block is the source of truth;
/// the bullet summary underneath is only there for humans.
#[derive(Debug, Clone)]
pub struct MarkdownStorage {
    storage_dir: PathBuf,
}

impl MarkdownStorage {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    /// Initialize storage directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.storage_dir).with_context(|| {
            format!(
                "Failed to create storage directory {}",
                self.storage_dir.display()
            )
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.storage_dir.join(format!("{key}.md"))
    }

    /// Store data as markdown
    pub fn store<T: Serialize>(&self, key: &str, data: &T, title: &str) -> Result<()> {
        let file_path = self.file_path(key);
        let markdown = serialize_to_markdown(data, title)?;
        fs::write(&file_path, markdown)
            .with_context(|| format!("Failed to write {}", file_path.display()))
    }

    /// Load data from markdown
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T> {
        let file_path = self.file_path(key);
        let content = fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        deserialize_from_markdown(&content)
            .with_context(|| format!("Corrupt document {}", file_path.display()))
    }

    /// Load `key`, or `None` when it has never been stored.
    pub fn load_optional<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        if !self.exists(key) {
            return Ok(None);
        }
        self.load(key).map(Some)
    }

    /// Delete stored item
    pub fn delete(&self, key: &str) -> Result<()> {
        let file_path = self.file_path(key);
        if file_path.exists() {
            fs::remove_file(&file_path)
                .with_context(|| format!("Failed to delete {}", file_path.display()))?;
        }
        Ok(())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.file_path(key).exists()
    }
}

fn serialize_to_markdown<T: Serialize>(data: &T, title: &str) -> Result<String> {
    let json = serde_json::to_string_pretty(data)?;

    Ok(format!(
        "# {}\n\n\
        ## JSON\n\n\
        ```json\n\
        {}\n\
        ```\n\n\
        ## Summary\n\n\
        {}\n",
        title,
        json,
        format_raw_data(data)
    ))
}

fn deserialize_from_markdown<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    let json_block =
        extract_code_block(content, "json").ok_or_else(|| anyhow!("No JSON block found in markdown"))?;
    serde_json::from_str(json_block).context("Failed to parse JSON from markdown")
}

fn extract_code_block<'a>(content: &'a str, language: &str) -> Option<&'a str> {
    let start_pattern = format!("```{language}");
    let end_pattern = "```";

    let start_idx = content.find(&start_pattern)?;
    let code_start = start_idx + start_pattern.len();
    let end_idx = content[code_start..].find(end_pattern)?;
    Some(content[code_start..code_start + end_idx].trim())
}

fn format_raw_data<T: Serialize>(data: &T) -> String {
    match serde_json::to_value(data) {
        Ok(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(key, value)| format!("- **{}**: {}", key, format_value(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => "Complex data structure".to_string(),
    }
}

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("\"{s}\""),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => format!("[{} items]", arr.len()),
        serde_json::Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        serde_json::Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        name: String,
        value: u32,
    }

    #[test]
    fn markdown_storage_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let storage = MarkdownStorage::new(dir.path().to_path_buf());
        storage.init().expect("init storage");

        let data = Sample {
            name: "example".to_string(),
            value: 42,
        };

        storage.store("sample", &data, "Sample Data").expect("store");
        let loaded: Sample = storage.load("sample").expect("load");
        assert_eq!(loaded, data);

        let raw = fs::read_to_string(dir.path().join("sample.md")).expect("read");
        assert!(raw.starts_with("# Sample Data"));
        assert!(raw.contains("- **value**: 42"));
    }

    #[test]
    fn missing_key_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let storage = MarkdownStorage::new(dir.path().to_path_buf());
        let loaded: Option<Sample> = storage.load_optional("absent").expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn document_without_json_block_is_an_error() {
        let result: Result<Sample> = deserialize_from_markdown("# Title\n\nno data here\n");
        assert!(result.is_err());
    }
}
