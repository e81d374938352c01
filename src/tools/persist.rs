//! `save_json_to_file`: writes model-supplied JSON text to the output directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;

use super::CallableTool;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaveJsonArgs {
    pub filename: String,
    pub json_data: String,
}

/// Persistence tool rooted at a fixed output directory.
///
/// The text is written verbatim. Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct SaveJsonTool {
    output_dir: PathBuf,
}

impl SaveJsonTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for `filename`, with `.json` appended when missing.
    ///
    /// The name must stay inside the output directory.
    pub fn target_path(&self, filename: &str) -> Result<PathBuf, String> {
        let name = filename.trim();
        if name.is_empty() {
            return Err("filename is empty".to_string());
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(format!("filename '{name}' must not contain a path"));
        }
        let name = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{name}.json")
        };
        Ok(self.output_dir.join(name))
    }
}

impl CallableTool for SaveJsonTool {
    type Args = SaveJsonArgs;

    const NAME: &'static str = "save_json_to_file";

    fn description(&self) -> &'static str {
        "Saves a JSON string to a file inside the output folder. Use it when the \
         user asks to save a result. The .json extension is added when missing."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "File name, without directories, e.g. 'usina_iii'."
                },
                "json_data": {
                    "type": "string",
                    "description": "The JSON content to write, as a string."
                }
            },
            "required": ["filename", "json_data"]
        })
    }

    fn call(&self, args: SaveJsonArgs) -> Result<String, String> {
        let fail = |e: String| format!("Error saving file: {e}");

        let path = self.target_path(&args.filename).map_err(fail)?;
        std::fs::create_dir_all(&self.output_dir).map_err(|e| fail(e.to_string()))?;
        std::fs::write(&path, args.json_data.as_bytes()).map_err(|e| fail(e.to_string()))?;

        tracing::info!(path = %path.display(), bytes = args.json_data.len(), "json saved");
        Ok(format!("Success! File saved to: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(filename: &str, json_data: &str) -> SaveJsonArgs {
        SaveJsonArgs {
            filename: filename.to_string(),
            json_data: json_data.to_string(),
        }
    }

    #[test]
    fn test_appends_json_suffix_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveJsonTool::new(dir.path().join("data"));

        let message = tool.call(args("report", r#"{"a": 1}"#)).unwrap();

        let path = dir.path().join("data/report.json");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"a": 1}"#);
        assert!(message.starts_with("Success!"));
        assert!(message.contains("report.json"));
    }

    #[test]
    fn test_does_not_double_append_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveJsonTool::new(dir.path());

        tool.call(args("report.json", "[]")).unwrap();

        assert!(dir.path().join("report.json").exists());
        assert!(!dir.path().join("report.json.json").exists());
    }

    #[test]
    fn test_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveJsonTool::new(dir.path());

        tool.call(args("r", "1")).unwrap();
        tool.call(args("r", "2")).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("r.json")).unwrap(), "2");
    }

    #[test]
    fn test_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveJsonTool::new(dir.path());

        let err = tool.call(args("../escape", "{}")).unwrap_err();
        assert!(err.starts_with("Error saving file"));
        assert!(tool.call(args("", "{}")).is_err());
        assert!(tool.call(args("a\\b", "{}")).is_err());
    }

    #[test]
    fn test_write_failure_is_message() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "x").unwrap();
        let tool = SaveJsonTool::new(&blocker);

        let err = tool.call(args("report", "{}")).unwrap_err();
        assert!(err.starts_with("Error saving file"));
    }
}
