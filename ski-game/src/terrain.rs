//! Terrain cells and the glyphs used when overlaying entities onto a row.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of the slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainCell {
    #[default]
    Snow,
    Tree,
    Ground,
    Ice,
}

impl TerrainCell {
    /// Hazard channels in regeneration priority order.
    pub const GROWTH_ORDER: [Self; 3] = [Self::Tree, Self::Ice, Self::Ground];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Snow => '.',
            Self::Tree => 'Y',
            Self::Ground => ':',
            Self::Ice => '#',
        }
    }

    #[must_use]
    pub const fn is_hazard(self) -> bool {
        !matches!(self, Self::Snow)
    }
}

impl fmt::Display for TerrainCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snow => write!(f, "snow"),
            Self::Tree => write!(f, "tree"),
            Self::Ground => write!(f, "ground"),
            Self::Ice => write!(f, "ice"),
        }
    }
}

/// Mobile things that can occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityMarker {
    Player,
    Yeti,
    Icbm,
    Demon,
}

impl EntityMarker {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Player => 'I',
            Self::Yeti => 'A',
            Self::Icbm => '*',
            Self::Demon => 'D',
        }
    }
}

/// One rendered position: bare terrain or the entity standing on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RowCell {
    Terrain(TerrainCell),
    Entity(EntityMarker),
}

impl RowCell {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Terrain(cell) => cell.symbol(),
            Self::Entity(marker) => marker.symbol(),
        }
    }
}

/// Collapse a rendered row into its display string.
#[must_use]
pub fn row_to_string(row: &[RowCell]) -> String {
    row.iter().map(|cell| cell.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_distinct() {
        let mut symbols: Vec<char> = [
            TerrainCell::Snow,
            TerrainCell::Tree,
            TerrainCell::Ground,
            TerrainCell::Ice,
        ]
        .iter()
        .map(|cell| cell.symbol())
        .collect();
        symbols.extend(
            [
                EntityMarker::Player,
                EntityMarker::Yeti,
                EntityMarker::Icbm,
                EntityMarker::Demon,
            ]
            .iter()
            .map(|marker| marker.symbol()),
        );
        let before = symbols.len();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), before);
    }

    #[test]
    fn row_cells_serialize_with_kind_tags() {
        let json = serde_json::to_string(&RowCell::Entity(EntityMarker::Yeti)).unwrap();
        assert_eq!(json, r#"{"kind":"entity","value":"yeti"}"#);
        let json = serde_json::to_string(&RowCell::Terrain(TerrainCell::Ice)).unwrap();
        assert_eq!(json, r#"{"kind":"terrain","value":"ice"}"#);
    }

    #[test]
    fn row_string_uses_symbols() {
        let row = [
            RowCell::Terrain(TerrainCell::Snow),
            RowCell::Entity(EntityMarker::Player),
            RowCell::Terrain(TerrainCell::Tree),
        ];
        assert_eq!(row_to_string(&row), ".IY");
        assert!(!TerrainCell::Snow.is_hazard());
        assert!(TerrainCell::Ice.is_hazard());
    }
}
