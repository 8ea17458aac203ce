//! Planner constants: persisted object types, capacity thresholds, scene sizes.
//!
//! These are simple constants with no database dependency.
//! Both the SpacetimeDB server and the native simtest use these.

/// Persisted `o_type` codes for floor objects.
pub mod object_types {
    pub const PATHWAY: u8 = 1;
    pub const KITCHEN: u8 = 2;
    pub const WC: u8 = 3;
    pub const CONFERENCE: u8 = 4;
    pub const WORKSPACE: u8 = 5;
    // Furniture from the item menu
    pub const CABINET: u8 = 10;
    pub const DOOR: u8 = 11;
    pub const TABLE_SMALL: u8 = 12;
    pub const TABLE_MEDIUM: u8 = 13;
    pub const TABLE_LARGE: u8 = 14;
    pub const TABLE_SMALL_VERTICAL: u8 = 15;
    pub const TABLE_MEDIUM_VERTICAL: u8 = 16;
    pub const TABLE_LARGE_VERTICAL: u8 = 17;
}

/// Persisted `state` values for floor objects.
pub mod object_states {
    pub const INACTIVE: u8 = 0;
    pub const ACTIVE: u8 = 1;
}

/// Occupancy ratios at which a floor changes capacity tier.
pub mod capacity {
    pub const MEDIUM_THRESHOLD: f32 = 0.5;
    pub const HIGH_THRESHOLD: f32 = 0.8;
}

/// Default dimensions used by the scene builder (world units).
pub mod scene {
    pub const FLOOR_HEIGHT: f32 = 3.0;
    pub const WALL_THICKNESS: f32 = 0.7;
    pub const BUILDING_OFFSET: f32 = 1.0;
    pub const CELL_SIZE: f32 = 1.0;
    pub const LAYOUT_WALL_HEIGHT: f32 = 3.0;
    pub const LAYOUT_WALL_THICKNESS: f32 = 0.2;
    pub const ZONE_ELEVATION: f32 = 0.01;
    pub const ITEM_HEIGHT: f32 = 0.75;
}

/// Default floor size for newly created floors (cells).
pub const DEFAULT_FLOOR_WIDTH: u32 = 20;
pub const DEFAULT_FLOOR_LENGTH: u32 = 12;
