//! Extraction output types and their canonical JSON form.

use serde::{Deserialize, Serialize};

use super::errors::ExtractionError;

/// One hourly row of a plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(rename = "hora")]
    pub hour: String,
    #[serde(rename = "quantidade")]
    pub quantity: i64,
    #[serde(rename = "justificativa")]
    pub note: String,
}

/// All hourly rows of one plant plus their total.
///
/// Field order is the serialized key order: `usina`, `total_produzido`,
/// `eventos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "usina")]
    pub entity_id: String,
    #[serde(rename = "total_produzido")]
    pub total_quantity: i64,
    #[serde(rename = "eventos")]
    pub records: Vec<ExtractionRecord>,
}

impl ExtractionResult {
    /// Fails when the total does not fit in an `i64`.
    pub fn new(entity_id: &str, records: Vec<ExtractionRecord>) -> Result<Self, ExtractionError> {
        let entity_id = entity_id.to_uppercase();
        let total_quantity = records
            .iter()
            .try_fold(0i64, |total, r| total.checked_add(r.quantity))
            .ok_or_else(|| ExtractionError::TotalOverflow {
                entity_id: entity_id.clone(),
            })?;
        Ok(Self {
            entity_id,
            total_quantity,
            records,
        })
    }

    /// Canonical JSON: 4-space indentation, non-ASCII kept as UTF-8.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hour: &str, quantity: i64, note: &str) -> ExtractionRecord {
        ExtractionRecord {
            hour: hour.to_string(),
            quantity,
            note: note.to_string(),
        }
    }

    #[test]
    fn test_total_is_sum_of_records() {
        let result = ExtractionResult::new(
            "usina i",
            vec![record("01:00", 10, ""), record("02:00", 0, "n/d"), record("03:00", 7, "")],
        )
        .unwrap();
        assert_eq!(result.entity_id, "USINA I");
        assert_eq!(result.total_quantity, 17);
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let err = ExtractionResult::new(
            "usina i",
            vec![record("01:00", i64::MAX, ""), record("02:00", 1, "")],
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::TotalOverflow { ref entity_id } if entity_id == "USINA I"));
    }

    #[test]
    fn test_canonical_json_shape() {
        let result =
            ExtractionResult::new("USINA II", vec![record("01:00", 5, "Manutenção")]).unwrap();
        let json = result.to_json().unwrap();

        let expected = "{\n    \"usina\": \"USINA II\",\n    \"total_produzido\": 5,\n    \"eventos\": [\n        {\n            \"hora\": \"01:00\",\n            \"quantidade\": 5,\n            \"justificativa\": \"Manutenção\"\n        }\n    ]\n}";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_json_parses_back() {
        let result = ExtractionResult::new("USINA V", vec![record("24:00", 3, "")]).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(parsed, result);
    }
}
