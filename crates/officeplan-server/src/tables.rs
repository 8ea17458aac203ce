//! SpacetimeDB table definitions for the office planner.
//!
//! Each table mirrors a record type from `officeplan_logic::floor` so rows can
//! be handed to the planning logic without any further lookup.

use officeplan_logic::floor as logic;
use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// BUILDINGS
// ============================================================================

#[table(name = building, public)]
#[derive(Clone)]
pub struct Building {
    #[primary_key]
    #[auto_inc]
    pub id: u32,
    pub name: String,
    pub floor_count: u32,
}

/// One storey. `width` is columns, `length` rows.
#[table(name = floor, public)]
#[derive(Clone)]
pub struct Floor {
    #[primary_key]
    #[auto_inc]
    pub id: u32,
    pub building_id: u32,
    pub number: u32,
    pub width: u32,
    pub length: u32,
    pub capacity: u32,
}

impl Floor {
    pub fn to_logic(&self) -> logic::Floor {
        logic::Floor {
            id: self.id,
            building_id: self.building_id,
            number: self.number,
            width: self.width,
            length: self.length,
            capacity: self.capacity,
        }
    }
}

// ============================================================================
// FLOOR CONTENTS
// ============================================================================

/// A placed zone or piece of furniture. `x_coor` is the column, `y_coor` the row.
#[table(name = floor_object, public)]
#[derive(Clone)]
pub struct FloorObject {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub floor_id: u32,
    pub o_type: u8, // object_types::*
    pub x_coor: u32,
    pub y_coor: u32,
    pub width: u32,
    pub length: u32,
    pub state: u8, // object_states::*
}

impl FloorObject {
    pub fn to_logic(&self) -> logic::FloorObject {
        logic::FloorObject {
            id: self.id,
            floor_id: self.floor_id,
            o_type: self.o_type,
            x_coor: self.x_coor,
            y_coor: self.y_coor,
            width: self.width,
            length: self.length,
            state: self.state,
        }
    }
}

// ============================================================================
// PEOPLE
// ============================================================================

/// Staff member; the seat is set only while they are placed on a floor.
#[table(name = personnel, public)]
#[derive(Clone)]
pub struct Personnel {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub floor_id: Option<u32>,
    pub x_coor: Option<u32>,
    pub y_coor: Option<u32>,
}

impl Personnel {
    pub fn to_logic(&self) -> logic::Personnel {
        logic::Personnel {
            id: self.id,
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            floor_id: self.floor_id,
            x_coor: self.x_coor,
            y_coor: self.y_coor,
        }
    }
}

#[table(name = feedback, public)]
pub struct Feedback {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub personnel_id: u64,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
}

// ============================================================================
// SESSIONS
// ============================================================================

/// Connected client session
#[table(name = connected_client, public)]
pub struct ConnectedClient {
    #[primary_key]
    pub identity: Identity,
    pub connected_at: Timestamp,
}
