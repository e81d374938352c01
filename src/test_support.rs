//! Shared fixtures for unit tests: a production sheet laid out at the fixed
//! 4-column stride (in memory, as `.xlsx` and as `.csv`) and a scripted
//! decision engine standing in for the model.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::agent::{AgentError, Decision, DecisionEngine};
use crate::inference::{ChatMessage, ToolCall, ToolDefinition};
use crate::tabular::{CellValue, LoadedSheet};

pub const PLANT_TITLES: [&str; 5] = ["USINA I", "USINA II", "USINA III", "USINA IV", "USINA V"];

/// Quantity cell for `plant` (0-based) at `hour` (0-based).
///
/// USINA III has an unparsable value at hour 5 and a blank at hour 7;
/// USINA I has a fractional value at hour 3.
pub fn plant_quantity(plant: usize, hour: usize) -> CellValue {
    match (plant, hour) {
        (2, 5) => CellValue::Text("n/d".into()),
        (2, 7) => CellValue::Empty,
        (0, 3) => CellValue::Number(13.7),
        _ => CellValue::Number(((plant + 1) * 10 + hour) as f64),
    }
}

/// Note cell: every sixth hour carries a stop justification.
pub fn plant_note(plant: usize, hour: usize) -> CellValue {
    if hour % 6 == 0 {
        CellValue::Text(format!("Parada programada U{}", plant + 1))
    } else {
        CellValue::Empty
    }
}

/// Sum of the coerced quantities of one plant's 24-hour window.
pub fn expected_total(plant: usize) -> i64 {
    (0..24)
        .map(|hour| {
            plant_quantity(plant, hour)
                .as_number()
                .map(|q| q.trunc() as i64)
                .unwrap_or(0)
        })
        .sum()
}

/// Title row, header row, then 24 hourly rows; 20 columns.
pub fn plant_rows() -> Vec<Vec<CellValue>> {
    let mut title = vec![CellValue::Empty; 20];
    let mut header = vec![CellValue::Empty; 20];
    title[0] = CellValue::Text("DATA".into());
    for (plant, name) in PLANT_TITLES.iter().enumerate() {
        let base = 1 + plant * 4;
        title[base] = CellValue::Text((*name).into());
        header[base] = CellValue::Text("Hora".into());
        header[base + 1] = CellValue::Text("Qtde".into());
        header[base + 2] = CellValue::Text("Justificativa".into());
    }

    let mut rows = vec![title, header];
    for hour in 0..24 {
        let mut row = vec![CellValue::Empty; 20];
        row[0] = CellValue::Text("2024-01-15".into());
        for plant in 0..PLANT_TITLES.len() {
            let base = 1 + plant * 4;
            row[base] = CellValue::Text(format!("{:02}:00", hour + 1));
            row[base + 1] = plant_quantity(plant, hour);
            row[base + 2] = plant_note(plant, hour);
        }
        rows.push(row);
    }
    rows
}

pub fn plant_sheet() -> LoadedSheet {
    LoadedSheet::from_rows("Plan1", plant_rows())
}

/// Write the plant layout into every named sheet of a new `.xlsx` file.
pub fn write_plant_workbook(path: &Path, sheet_names: &[&str]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for name in sheet_names {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in plant_rows().iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    CellValue::Text(s) => {
                        worksheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    _ => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Write the plant layout as a comma-separated file.
pub fn write_plant_csv(path: &Path) {
    let content: String = plant_rows()
        .iter()
        .map(|row| {
            let fields: Vec<String> = row.iter().map(CellValue::display).collect();
            fields.join(",") + "\n"
        })
        .collect();
    std::fs::write(path, content).unwrap();
}

// ─── Scripted decision engine ───────────────────────────────────────────────

/// Plays back a fixed list of decisions, then goes silent. Records the
/// history it was shown on every call.
pub struct ScriptedEngine {
    script: Mutex<Vec<Result<Decision, AgentError>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<Result<Decision, AgentError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().rev().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Histories passed to each `decide` call, in order.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionEngine for ScriptedEngine {
    async fn decide(
        &self,
        _system_prompt: &str,
        history: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<Decision, AgentError> {
        assert!(!tools.is_empty(), "tools must be offered to the model");
        self.seen.lock().unwrap().push(history.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Ok(Decision::Silent))
    }
}

/// A `get_usina_data` call for `plant`.
pub fn extract_call(id: &str, plant: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "get_usina_data".to_string(),
        arguments: serde_json::json!({ "usina_name": plant }),
    }
}
