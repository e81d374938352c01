//! `get_usina_data`: extraction bound to one sheet snapshot.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::extraction::{self, schema::entity_list};
use crate::tabular::LoadedSheet;

use super::CallableTool;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractArgs {
    #[serde(rename = "usina_name")]
    pub entity_id: String,
}

/// Extraction tool over the sheet that was active when it was built.
///
/// Holds its own `Arc` to the snapshot; selecting another sheet in the
/// store does not change what this tool reads.
#[derive(Debug, Clone)]
pub struct ExtractEntityTool {
    sheet: Arc<LoadedSheet>,
}

impl ExtractEntityTool {
    pub fn new(sheet: Arc<LoadedSheet>) -> Self {
        Self { sheet }
    }

    pub fn sheet(&self) -> &LoadedSheet {
        &self.sheet
    }
}

impl CallableTool for ExtractEntityTool {
    type Args = ExtractArgs;

    const NAME: &'static str = "get_usina_data";

    fn description(&self) -> &'static str {
        "Extracts the hourly production data of one plant (usina) from the loaded \
         sheet and returns it as JSON with the plant name, the total produced and \
         the list of hourly events. Call it once per plant."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "usina_name": {
                    "type": "string",
                    "description": format!(
                        "Exact plant name to extract, one of: {}.",
                        entity_list()
                    )
                }
            },
            "required": ["usina_name"]
        })
    }

    fn call(&self, args: ExtractArgs) -> Result<String, String> {
        extraction::extract_json(&args.entity_id, &self.sheet).map_err(|e| format!("Error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{expected_total, plant_sheet};
    use crate::tools::ToolError;

    fn tool() -> ExtractEntityTool {
        ExtractEntityTool::new(Arc::new(plant_sheet()))
    }

    #[test]
    fn test_definition() {
        let def = tool().definition();
        assert_eq!(def.r#type, "function");
        assert_eq!(def.function.name, "get_usina_data");
        assert_eq!(def.function.parameters["required"][0], "usina_name");
    }

    #[test]
    fn test_call_with_valid_args() {
        let tool = tool();
        let args = tool.parse_args(&json!({"usina_name": "usina iii"})).unwrap();
        assert_eq!(args.entity_id, "usina iii");

        let text = tool.call(args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["usina"], "USINA III");
        assert_eq!(value["total_produzido"], expected_total(2));
    }

    #[test]
    fn test_unknown_plant_is_tool_failure() {
        let tool = tool();
        let args = tool.parse_args(&json!({"usina_name": "USINA X"})).unwrap();
        let err = tool.call(args).unwrap_err();
        assert!(err.contains("USINA X"));
    }

    #[test]
    fn test_schema_violation() {
        let err = tool().parse_args(&json!({"usina": "USINA I"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = tool().parse_args(&json!({"usina_name": 3})).unwrap_err();
        assert!(err.to_string().contains("usina_name"));
    }
}
