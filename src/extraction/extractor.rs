//! FixedOffsetExtractor: plant id + sheet snapshot → `ExtractionResult`.

use crate::tabular::{column_name, CellValue, LoadedSheet};

use super::errors::ExtractionError;
use super::schema::{self, EntitySchema, ROW_WINDOW};
use super::types::{ExtractionRecord, ExtractionResult};

/// Extract the hourly window of `entity_id` from `sheet`.
///
/// Pure in `(entity_id, sheet)`. Rows past the end of a short sheet are
/// simply absent from the result.
pub fn extract(entity_id: &str, sheet: &LoadedSheet) -> Result<ExtractionResult, ExtractionError> {
    let entity = schema::lookup(entity_id).ok_or_else(|| ExtractionError::UnknownEntity {
        entity_id: entity_id.to_string(),
        valid: schema::entity_list(),
    })?;
    check_columns(entity, sheet)?;

    let last_row = ROW_WINDOW.end.min(sheet.num_rows());
    let records = (ROW_WINDOW.start..last_row)
        .map(|row| ExtractionRecord {
            hour: sheet.cell(row, entity.hour_column).display(),
            quantity: coerce_quantity(sheet.cell(row, entity.quantity_column)),
            note: sheet.cell(row, entity.note_column).display(),
        })
        .collect();

    ExtractionResult::new(entity.entity_id, records)
}

/// Extract and serialize to the canonical JSON text.
pub fn extract_json(entity_id: &str, sheet: &LoadedSheet) -> Result<String, ExtractionError> {
    Ok(extract(entity_id, sheet)?.to_json()?)
}

/// Never-failing form: canonical JSON on success, an error message otherwise.
pub fn extract_to_json(entity_id: &str, sheet: &LoadedSheet) -> String {
    extract_json(entity_id, sheet).unwrap_or_else(|e| {
        tracing::warn!(entity = %entity_id, error = %e, "extraction failed");
        format!("Error: {e}")
    })
}

fn check_columns(entity: &EntitySchema, sheet: &LoadedSheet) -> Result<(), ExtractionError> {
    match entity.columns().into_iter().find(|&c| c >= sheet.num_cols()) {
        Some(missing) => Err(ExtractionError::MissingColumn {
            entity_id: entity.entity_id.to_string(),
            column: column_name(missing),
        }),
        None => Ok(()),
    }
}

/// Numeric cells truncate toward zero; anything unparsable counts as 0.
fn coerce_quantity(cell: &CellValue) -> i64 {
    cell.as_number()
        .filter(|n| n.is_finite())
        .map(|n| n.trunc() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{expected_total, plant_sheet};

    #[test]
    fn test_extract_usina_iii() {
        let sheet = plant_sheet();
        let result = extract("USINA III", &sheet).unwrap();

        assert_eq!(result.entity_id, "USINA III");
        assert_eq!(result.records.len(), 24);
        assert_eq!(result.total_quantity, expected_total(2));
        assert_eq!(result.records[0].hour, "01:00");
        assert_eq!(result.records[0].quantity, 30);
        assert_eq!(result.records[0].note, "Parada programada U3");
        assert_eq!(result.records[23].hour, "24:00");
    }

    #[test]
    fn test_unparsable_and_missing_quantities_become_zero() {
        let sheet = plant_sheet();
        let result = extract("USINA III", &sheet).unwrap();

        assert_eq!(result.records[5].quantity, 0);
        assert_eq!(result.records[7].quantity, 0);
        assert_eq!(result.records[7].note, "");
        let sum: i64 = result.records.iter().map(|r| r.quantity).sum();
        assert_eq!(sum, result.total_quantity);
    }

    #[test]
    fn test_fractional_quantity_truncates() {
        let result = extract("USINA I", &plant_sheet()).unwrap();
        assert_eq!(result.records[3].quantity, 13);
        assert_eq!(result.total_quantity, expected_total(0));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let sheet = plant_sheet();
        let lower = extract("usina iii", &sheet).unwrap();
        let upper = extract("USINA III", &sheet).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.entity_id, "USINA III");
    }

    #[test]
    fn test_unknown_entity_names_the_id() {
        let message = extract_to_json("USINA VII", &plant_sheet());
        assert!(message.starts_with("Error:"));
        assert!(message.contains("USINA VII"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let sheet = plant_sheet();
        assert_eq!(
            extract_to_json("USINA IV", &sheet),
            extract_to_json("USINA IV", &sheet)
        );
    }

    #[test]
    fn test_narrow_sheet_names_missing_column() {
        let rows: Vec<Vec<CellValue>> = (0..26)
            .map(|_| vec![CellValue::Text("x".into()); 10])
            .collect();
        let sheet = LoadedSheet::from_rows("narrow", rows);

        let err = extract("USINA III", &sheet).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingColumn { .. }));
        assert!(err.to_string().contains("col_10"));

        let message = extract_to_json("USINA III", &sheet);
        assert!(message.contains("col_10"));
    }

    #[test]
    fn test_short_sheet_yields_fewer_records() {
        let mut rows = crate::test_support::plant_rows();
        rows.truncate(12);
        let sheet = LoadedSheet::from_rows("short", rows);

        let result = extract("USINA II", &sheet).unwrap();
        assert_eq!(result.records.len(), 10);
        let sum: i64 = result.records.iter().map(|r| r.quantity).sum();
        assert_eq!(result.total_quantity, sum);
    }

    #[test]
    fn test_missing_hour_renders_empty() {
        let mut rows = crate::test_support::plant_rows();
        rows[2][1] = CellValue::Empty;
        let sheet = LoadedSheet::from_rows("gaps", rows);
        let result = extract("USINA I", &sheet).unwrap();

        assert_eq!(result.records.len(), 24);
        assert_eq!(result.records[0].hour, "");
        assert_eq!(result.records[1].hour, "02:00");
    }

    #[test]
    fn test_total_overflow_is_error_text() {
        let mut rows = crate::test_support::plant_rows();
        rows[2][2] = CellValue::Number(9.0e18);
        rows[3][2] = CellValue::Number(9.0e18);
        let sheet = LoadedSheet::from_rows("huge", rows);

        let err = extract("USINA I", &sheet).unwrap_err();
        assert!(matches!(err, ExtractionError::TotalOverflow { .. }));

        let message = extract_to_json("USINA I", &sheet);
        assert!(message.starts_with("Error:"));
        assert!(message.contains("USINA I"));
    }

    #[test]
    fn test_json_output_is_canonical() {
        let json = extract_to_json("usina v", &plant_sheet());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["usina"], "USINA V");
        assert_eq!(value["total_produzido"], expected_total(4));
        assert_eq!(value["eventos"].as_array().unwrap().len(), 24);
        assert!(json.starts_with("{\n    \"usina\""));
    }
}
