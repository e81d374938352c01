//! Static plant layout.

use std::ops::Range;

/// Leading title/header rows skipped before the hourly data.
pub const DATA_ROW_OFFSET: usize = 2;

/// Hourly rows per plant.
pub const DATA_ROW_COUNT: usize = 24;

/// Row window holding the hourly data, end-exclusive.
pub const ROW_WINDOW: Range<usize> = DATA_ROW_OFFSET..DATA_ROW_OFFSET + DATA_ROW_COUNT;

/// Column positions of one plant's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity_id: &'static str,
    pub hour_column: usize,
    pub quantity_column: usize,
    pub note_column: usize,
}

impl EntitySchema {
    const fn at(entity_id: &'static str, first_column: usize) -> Self {
        Self {
            entity_id,
            hour_column: first_column,
            quantity_column: first_column + 1,
            note_column: first_column + 2,
        }
    }

    pub fn columns(&self) -> [usize; 3] {
        [self.hour_column, self.quantity_column, self.note_column]
    }
}

/// The closed set of plants, in sheet order.
pub const ENTITY_SCHEMAS: [EntitySchema; 5] = [
    EntitySchema::at("USINA I", 1),
    EntitySchema::at("USINA II", 5),
    EntitySchema::at("USINA III", 9),
    EntitySchema::at("USINA IV", 13),
    EntitySchema::at("USINA V", 17),
];

/// Case-insensitive exact lookup. No trimming, no fuzzy matching.
pub fn lookup(entity_id: &str) -> Option<&'static EntitySchema> {
    let wanted = entity_id.to_uppercase();
    ENTITY_SCHEMAS.iter().find(|s| s.entity_id == wanted)
}

/// Comma-separated plant ids, for messages and prompts.
pub fn entity_list() -> String {
    ENTITY_SCHEMAS
        .iter()
        .map(|s| s.entity_id)
        .collect::<Vec<_>>()
        .join(", ")
}
