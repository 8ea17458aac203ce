//! Item catalog: what can be placed on a floor and how big it is.
//!
//! Two families share the grid: *zones* (pathway, kitchen, WC, conference,
//! workspace) whose size is chosen by the planner, and *furniture* from the
//! item menu whose footprint is fixed. Every kind maps to a persisted
//! `o_type` code from [`crate::constants::object_types`].

use serde::{Deserialize, Serialize};

use crate::constants::object_types;
use crate::grid::Footprint;

/// Area category of a zone object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Pathway,
    Kitchen,
    Wc,
    Conference,
    Workspace,
}

impl ObjectType {
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Pathway,
        ObjectType::Kitchen,
        ObjectType::Wc,
        ObjectType::Conference,
        ObjectType::Workspace,
    ];

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            object_types::PATHWAY => Some(Self::Pathway),
            object_types::KITCHEN => Some(Self::Kitchen),
            object_types::WC => Some(Self::Wc),
            object_types::CONFERENCE => Some(Self::Conference),
            object_types::WORKSPACE => Some(Self::Workspace),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Pathway => object_types::PATHWAY,
            Self::Kitchen => object_types::KITCHEN,
            Self::Wc => object_types::WC,
            Self::Conference => object_types::CONFERENCE,
            Self::Workspace => object_types::WORKSPACE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pathway => "Pathway",
            Self::Kitchen => "Kitchen",
            Self::Wc => "WC",
            Self::Conference => "Conference",
            Self::Workspace => "Workspace",
        }
    }

    /// Parse a zone name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Display color used by the 2D and 3D views.
    pub fn color(self) -> &'static str {
        match self {
            Self::Pathway => "darkgray",
            Self::Kitchen => "green",
            Self::Wc => "gray",
            Self::Conference => "blue",
            Self::Workspace => "orange",
        }
    }
}

/// Anything that can be dropped on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Cabinet,
    Door,
    TableSmall,
    TableMedium,
    TableLarge,
    TableSmallVertical,
    TableMediumVertical,
    TableLargeVertical,
    Zone(ObjectType),
}

impl ItemKind {
    /// Furniture offered by the item menu, in menu order.
    pub const MENU: [ItemKind; 8] = [
        ItemKind::Cabinet,
        ItemKind::Door,
        ItemKind::TableSmall,
        ItemKind::TableMedium,
        ItemKind::TableLarge,
        ItemKind::TableSmallVertical,
        ItemKind::TableMediumVertical,
        ItemKind::TableLargeVertical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cabinet => "Cabinet",
            Self::Door => "Door",
            Self::TableSmall => "Table Small",
            Self::TableMedium => "Table Medium",
            Self::TableLarge => "Table Large",
            Self::TableSmallVertical => "Table Small (Vertical)",
            Self::TableMediumVertical => "Table Medium (Vertical)",
            Self::TableLargeVertical => "Table Large (Vertical)",
            Self::Zone(t) => t.name(),
        }
    }

    /// Parse a menu label or zone name.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::MENU
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(label))
            .or_else(|| ObjectType::from_name(label).map(Self::Zone))
    }

    /// Footprint (columns × rows) of menu furniture; zones default to one cell.
    pub fn default_footprint(self) -> Footprint {
        match self {
            Self::Cabinet => Footprint::new(1, 1),
            Self::Door => Footprint::new(1, 2),
            Self::TableSmall => Footprint::new(2, 1),
            Self::TableMedium => Footprint::new(2, 2),
            Self::TableLarge => Footprint::new(3, 2),
            Self::TableSmallVertical => Footprint::new(1, 2),
            Self::TableMediumVertical => Footprint::new(1, 3),
            Self::TableLargeVertical => Footprint::new(1, 4),
            Self::Zone(_) => Footprint::UNIT,
        }
    }

    /// Whether the footprint is fixed by the catalog.
    pub fn is_furniture(self) -> bool {
        !matches!(self, Self::Zone(_))
    }

    pub fn is_workspace(self) -> bool {
        self == Self::Zone(ObjectType::Workspace)
    }

    /// Persisted `o_type` code.
    pub fn code(self) -> u8 {
        match self {
            Self::Cabinet => object_types::CABINET,
            Self::Door => object_types::DOOR,
            Self::TableSmall => object_types::TABLE_SMALL,
            Self::TableMedium => object_types::TABLE_MEDIUM,
            Self::TableLarge => object_types::TABLE_LARGE,
            Self::TableSmallVertical => object_types::TABLE_SMALL_VERTICAL,
            Self::TableMediumVertical => object_types::TABLE_MEDIUM_VERTICAL,
            Self::TableLargeVertical => object_types::TABLE_LARGE_VERTICAL,
            Self::Zone(t) => t.as_u8(),
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        if let Some(t) = ObjectType::from_u8(code) {
            return Some(Self::Zone(t));
        }
        Self::MENU.into_iter().find(|k| k.code() == code)
    }

    /// Single-character map symbol.
    pub fn symbol(self) -> char {
        match self {
            Self::Cabinet => 'c',
            Self::Door => 'd',
            Self::TableSmall | Self::TableMedium | Self::TableLarge => 't',
            Self::TableSmallVertical | Self::TableMediumVertical | Self::TableLargeVertical => 'v',
            Self::Zone(ObjectType::Pathway) => '=',
            Self::Zone(ObjectType::Kitchen) => 'K',
            Self::Zone(ObjectType::Wc) => 'R',
            Self::Zone(ObjectType::Conference) => 'M',
            Self::Zone(ObjectType::Workspace) => 'W',
        }
    }
}

/// A concrete item ready to be placed: kind, display label and footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub kind: ItemKind,
    pub label: String,
    pub footprint: Footprint,
}

impl ItemSpec {
    /// Item at its catalog size.
    pub fn menu(kind: ItemKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            footprint: kind.default_footprint(),
        }
    }

    pub fn custom(kind: ItemKind, label: impl Into<String>, footprint: Footprint) -> Self {
        Self {
            kind,
            label: label.into(),
            footprint,
        }
    }

    /// Zone of the given `o_type` covering `footprint`. `None` for non-zone codes.
    pub fn zone(o_type: u8, footprint: Footprint) -> Option<Self> {
        let t = ObjectType::from_u8(o_type)?;
        Some(Self::custom(ItemKind::Zone(t), t.name(), footprint))
    }

    /// Item for a dropped menu label, e.g. `"Table Large"`.
    pub fn from_label(label: &str) -> Option<Self> {
        ItemKind::from_label(label).map(Self::menu)
    }

    /// Item for a persisted object row. Zero dimensions fall back to one cell.
    pub fn from_object(o_type: u8, width: u32, length: u32) -> Option<Self> {
        let kind = ItemKind::from_code(o_type)?;
        let footprint = Footprint::new(width.max(1), length.max(1));
        Some(Self::custom(kind, kind.label(), footprint))
    }

    /// Item for a new placement request. Menu furniture always takes its
    /// catalog size; zones take the requested size as-is.
    pub fn placement(o_type: u8, width: u32, length: u32) -> Option<Self> {
        match ItemKind::from_code(o_type)? {
            ItemKind::Zone(_) => Self::zone(o_type, Footprint::new(width, length)),
            kind => Some(Self::menu(kind)),
        }
    }
}
