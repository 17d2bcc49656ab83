//! Category domain model and color palette.
//!
//! # Invariants
//! - At most one category per `id`; ids are never reused after deletion.
//! - `color` is always one of the five palette entries.

use serde::{Deserialize, Serialize};

/// Opaque category identifier.
pub type CategoryId = String;

/// Fixed palette of category color tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryColor {
    #[serde(rename = "category-work")]
    Work,
    #[serde(rename = "category-personal")]
    Personal,
    #[serde(rename = "category-health")]
    Health,
    #[serde(rename = "category-shopping")]
    Shopping,
    #[serde(rename = "category-ideas")]
    Ideas,
}

impl CategoryColor {
    /// Palette in assignment order.
    pub const PALETTE: [CategoryColor; 5] = [
        CategoryColor::Work,
        CategoryColor::Personal,
        CategoryColor::Health,
        CategoryColor::Shopping,
        CategoryColor::Ideas,
    ];

    /// Stable style tag, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "category-work",
            Self::Personal => "category-personal",
            Self::Health => "category-health",
            Self::Shopping => "category-shopping",
            Self::Ideas => "category-ideas",
        }
    }

    /// Picks the color for a new category given the colors already in use.
    ///
    /// Returns the first palette entry nobody uses; once the palette is
    /// exhausted, cycles with `PALETTE[existing_count % 5]`.
    pub fn next_available<'a>(in_use: impl IntoIterator<Item = &'a CategoryColor>) -> Self {
        let used = in_use.into_iter().copied().collect::<Vec<_>>();
        Self::PALETTE
            .into_iter()
            .find(|color| !used.contains(color))
            .unwrap_or(Self::PALETTE[used.len() % Self::PALETTE.len()])
    }
}

/// Named grouping applied to todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: CategoryColor,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, color: CategoryColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
        }
    }
}
