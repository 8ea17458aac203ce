//! Buildings, floors and the assembled floor plan.
//!
//! The record structs mirror the rows stored in the hosted database. A
//! [`FloorPlan`] is the in-memory working copy of one floor: the occupancy
//! grid rebuilt from the floor's objects plus the seat map rebuilt from its
//! personnel. The plan is discarded when the floor view closes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ItemSpec;
use crate::constants::object_states;
use crate::grid::{
    Cell, GridError, ItemHandle, OccupancyGrid, PlaceError, PlacedItem, MAX_CELLS,
};
use crate::seating::{PersonnelId, SeatError, SeatMap};
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    pub name: String,
    pub floor_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: u32,
    pub building_id: u32,
    /// Storey number within the building, ground floor = 0.
    pub number: u32,
    /// Columns.
    pub width: u32,
    /// Rows.
    pub length: u32,
    /// Maximum number of seated personnel.
    pub capacity: u32,
}

impl Floor {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.length)
    }

    pub fn name(&self) -> String {
        format!("Floor {}", self.number)
    }
}

/// A persisted placement. `x_coor` is the column, `y_coor` the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorObject {
    pub id: u64,
    pub floor_id: u32,
    pub o_type: u8,
    pub x_coor: u32,
    pub y_coor: u32,
    pub width: u32,
    pub length: u32,
    pub state: u8,
}

impl FloorObject {
    pub fn anchor(&self) -> Cell {
        Cell::new(self.y_coor, self.x_coor)
    }

    pub fn spec(&self) -> Option<ItemSpec> {
        ItemSpec::from_object(self.o_type, self.width, self.length)
    }

    pub fn is_active(&self) -> bool {
        self.state != object_states::INACTIVE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: PersonnelId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub floor_id: Option<u32>,
    pub x_coor: Option<u32>,
    pub y_coor: Option<u32>,
}

impl Personnel {
    /// Unplaced person.
    pub fn new(id: PersonnelId, name: &str, surname: &str, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            floor_id: None,
            x_coor: None,
            y_coor: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// `(floor_id, cell)` if the person has a complete seat.
    pub fn seat(&self) -> Option<(u32, Cell)> {
        Some((self.floor_id?, Cell::new(self.y_coor?, self.x_coor?)))
    }

    pub fn is_placed(&self) -> bool {
        self.x_coor.is_some() && self.y_coor.is_some()
    }
}

/// Check a floor record before it is stored.
pub fn validate_floor(floor: &Floor) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if floor.width == 0 || floor.length == 0 {
        errors.push(ValidationError::error(
            "floor_geometry",
            format!(
                "{} has non-positive dimensions: {}×{}",
                floor.name(),
                floor.width,
                floor.length
            ),
        ));
    } else if floor.area() > MAX_CELLS {
        errors.push(ValidationError::error(
            "floor_geometry",
            format!(
                "{} is {}×{}, more than {} cells",
                floor.name(),
                floor.width,
                floor.length,
                MAX_CELLS
            ),
        ));
    }
    if floor.capacity == 0 {
        errors.push(ValidationError::warning(
            "floor_capacity",
            format!("{} has zero capacity", floor.name()),
        ));
    } else if u64::from(floor.capacity) > floor.area() {
        errors.push(ValidationError::warning(
            "floor_capacity",
            format!(
                "{} capacity {} exceeds its {} cells",
                floor.name(),
                floor.capacity,
                floor.area()
            ),
        ));
    }
    errors
}

/// Something in the stored data that could not be reproduced on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    #[error("object #{object_id} has unknown type {o_type}")]
    UnknownObjectType { object_id: u64, o_type: u8 },
    #[error("object #{object_id} skipped: {error}")]
    ObjectRejected { object_id: u64, error: PlaceError },
    #[error("personnel #{personnel_id} not seated: {error}")]
    SeatRejected {
        personnel_id: PersonnelId,
        error: SeatError,
    },
}

/// What a removal took off the floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub item: PlacedItem,
    /// Database row backing the item, if it was persisted.
    pub object_id: Option<u64>,
    /// People who were sitting on the removed workspace.
    pub unseated: Vec<(PersonnelId, Cell)>,
}

/// Working copy of one floor.
#[derive(Debug, Clone)]
pub struct FloorPlan {
    floor: Floor,
    grid: OccupancyGrid,
    seats: SeatMap,
    object_ids: BTreeMap<ItemHandle, u64>,
}

impl FloorPlan {
    /// Empty plan for `floor`.
    pub fn new(floor: Floor) -> Result<Self, GridError> {
        let grid = OccupancyGrid::new(floor.width, floor.length)?;
        Ok(Self {
            floor,
            grid,
            seats: SeatMap::new(),
            object_ids: BTreeMap::new(),
        })
    }

    /// Rebuild a plan from stored rows.
    ///
    /// Rows for other floors and inactive objects are ignored. Objects are
    /// placed in id order; anything that no longer fits is skipped and
    /// reported instead of failing the whole load.
    pub fn load(
        floor: Floor,
        objects: &[FloorObject],
        personnel: &[Personnel],
    ) -> Result<(Self, Vec<LoadWarning>), GridError> {
        let mut plan = Self::new(floor)?;
        let mut warnings = Vec::new();

        let mut rows: Vec<&FloorObject> = objects
            .iter()
            .filter(|o| o.floor_id == plan.floor.id && o.is_active())
            .collect();
        rows.sort_by_key(|o| o.id);

        for object in rows {
            let Some(spec) = object.spec() else {
                warnings.push(LoadWarning::UnknownObjectType {
                    object_id: object.id,
                    o_type: object.o_type,
                });
                continue;
            };
            match plan.grid.place(spec, object.anchor()) {
                Ok(handle) => {
                    plan.object_ids.insert(handle, object.id);
                }
                Err(error) => warnings.push(LoadWarning::ObjectRejected {
                    object_id: object.id,
                    error,
                }),
            }
        }

        for person in personnel {
            let Some((floor_id, cell)) = person.seat() else {
                continue;
            };
            if floor_id != plan.floor.id {
                continue;
            }
            if let Err(error) = plan.seats.seat(&plan.grid, person.id, cell) {
                warnings.push(LoadWarning::SeatRejected {
                    personnel_id: person.id,
                    error,
                });
            }
        }

        for w in &warnings {
            log::warn!("{}: {}", plan.floor.name(), w);
        }
        Ok((plan, warnings))
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn seats(&self) -> &SeatMap {
        &self.seats
    }

    /// Place an item that has no database row yet.
    pub fn place(&mut self, spec: ItemSpec, anchor: Cell) -> Result<ItemHandle, PlaceError> {
        let label = spec.label.clone();
        self.grid.place(spec, anchor).inspect_err(|e| {
            log::warn!("{}: rejected {} at {}: {}", self.floor.name(), label, anchor, e);
        })
    }

    /// Associate a placed item with its database row.
    pub fn bind_object(&mut self, handle: ItemHandle, object_id: u64) {
        if self.grid.item(handle).is_some() {
            self.object_ids.insert(handle, object_id);
        }
    }

    pub fn object_id(&self, handle: ItemHandle) -> Option<u64> {
        self.object_ids.get(&handle).copied()
    }

    /// Handle of the item backed by `object_id`.
    pub fn handle_of(&self, object_id: u64) -> Option<ItemHandle> {
        self.object_ids
            .iter()
            .find(|&(_, &id)| id == object_id)
            .map(|(&h, _)| h)
    }

    /// Remove the item covering `cell`, unseating anyone sitting on it.
    pub fn remove(&mut self, cell: Cell) -> Option<Removal> {
        let handle = self.grid.handle_at(cell)?;
        self.remove_item(handle)
    }

    pub fn remove_item(&mut self, handle: ItemHandle) -> Option<Removal> {
        let item = self.grid.remove_item(handle)?;
        let object_id = self.object_ids.remove(&handle);
        let unseated = self.seats.evict(&item);
        Some(Removal {
            item,
            object_id,
            unseated,
        })
    }

    /// Seat a person; see [`SeatMap::seat`].
    pub fn seat(&mut self, person: PersonnelId, cell: Cell) -> Result<Option<Cell>, SeatError> {
        self.seats.seat(&self.grid, person, cell)
    }

    pub fn unseat(&mut self, person: PersonnelId) -> Option<Cell> {
        self.seats.unseat(person)
    }

    /// Number of seated personnel.
    pub fn occupants(&self) -> usize {
        self.seats.len()
    }

    /// Cells a person could sit on.
    pub fn workspace_cells(&self) -> u64 {
        self.grid
            .items()
            .filter(|i| i.spec.kind.is_workspace())
            .map(|i| i.footprint().area())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::object_types;

    fn floor() -> Floor {
        Floor {
            id: 3,
            building_id: 1,
            number: 2,
            width: 6,
            length: 4,
            capacity: 10,
        }
    }

    fn object(id: u64, o_type: u8, x: u32, y: u32, w: u32, l: u32) -> FloorObject {
        FloorObject {
            id,
            floor_id: 3,
            o_type,
            x_coor: x,
            y_coor: y,
            width: w,
            length: l,
            state: object_states::ACTIVE,
        }
    }

    fn seated(id: u64, floor_id: u32, x: u32, y: u32) -> Personnel {
        Personnel {
            floor_id: Some(floor_id),
            x_coor: Some(x),
            y_coor: Some(y),
            ..Personnel::new(id, "Test", "Person", "t@example.com")
        }
    }

    #[test]
    fn floor_name_and_area() {
        let f = floor();
        assert_eq!(f.name(), "Floor 2");
        assert_eq!(f.area(), 24);
    }

    #[test]
    fn validate_floor_flags_zero_dims() {
        let mut f = floor();
        f.width = 0;
        let errors = validate_floor(&f);
        assert!(crate::validation::has_errors(&errors));
    }

    #[test]
    fn validate_floor_rejects_floors_the_grid_cannot_hold() {
        let mut f = floor();
        f.width = 5000;
        f.length = 5000;
        assert!(crate::validation::has_errors(&validate_floor(&f)));
        assert!(FloorPlan::new(f).is_err());

        let mut f = floor();
        f.width = 4096;
        f.length = 4096;
        assert!(!crate::validation::has_errors(&validate_floor(&f)));
    }

    #[test]
    fn validate_floor_warns_capacity_over_area() {
        let mut f = floor();
        f.capacity = 100;
        let errors = validate_floor(&f);
        assert_eq!(errors.len(), 1);
        assert!(!crate::validation::has_errors(&errors));
    }

    #[test]
    fn load_places_objects_x_as_column() {
        let objects = vec![object(1, object_types::WORKSPACE, 4, 1, 2, 1)];
        let (plan, warnings) = FloorPlan::load(floor(), &objects, &[]).unwrap();
        assert!(warnings.is_empty());
        let item = plan.grid().item_at(Cell::new(1, 5)).unwrap();
        assert_eq!(item.anchor, Cell::new(1, 4));
        assert_eq!(plan.object_id(item.handle), Some(1));
    }

    #[test]
    fn load_skips_conflicts_and_foreign_rows() {
        let mut foreign = object(9, object_types::KITCHEN, 0, 0, 1, 1);
        foreign.floor_id = 99;
        let mut inactive = object(8, object_types::KITCHEN, 5, 3, 1, 1);
        inactive.state = object_states::INACTIVE;
        let objects = vec![
            object(2, object_types::KITCHEN, 0, 0, 2, 2),
            object(3, object_types::WC, 1, 1, 1, 1),
            object(4, object_types::CONFERENCE, 5, 0, 3, 1),
            object(5, 42, 0, 3, 1, 1),
            foreign,
            inactive,
        ];
        let (plan, warnings) = FloorPlan::load(floor(), &objects, &[]).unwrap();
        assert_eq!(plan.grid().item_count(), 1);
        assert_eq!(warnings.len(), 3);
        assert!(matches!(
            warnings[0],
            LoadWarning::ObjectRejected {
                object_id: 3,
                error: PlaceError::Occupied { .. }
            }
        ));
        assert!(matches!(
            warnings[1],
            LoadWarning::ObjectRejected {
                object_id: 4,
                error: PlaceError::OutOfBounds { .. }
            }
        ));
        assert_eq!(
            warnings[2],
            LoadWarning::UnknownObjectType {
                object_id: 5,
                o_type: 42
            }
        );
    }

    #[test]
    fn load_seats_personnel_on_this_floor() {
        let objects = vec![object(1, object_types::WORKSPACE, 0, 0, 3, 1)];
        let personnel = vec![
            seated(10, 3, 1, 0),
            seated(11, 4, 1, 0),
            seated(12, 3, 5, 3),
            Personnel::new(13, "No", "Seat", "n@example.com"),
        ];
        let (plan, warnings) = FloorPlan::load(floor(), &objects, &personnel).unwrap();
        assert_eq!(plan.occupants(), 1);
        assert_eq!(plan.seats().seat_of(10), Some(Cell::new(0, 1)));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            LoadWarning::SeatRejected {
                personnel_id: 12,
                ..
            }
        ));
    }

    #[test]
    fn remove_workspace_unseats_people() {
        let objects = vec![object(1, object_types::WORKSPACE, 0, 0, 2, 1)];
        let personnel = vec![seated(10, 3, 1, 0)];
        let (mut plan, _) = FloorPlan::load(floor(), &objects, &personnel).unwrap();
        let removal = plan.remove(Cell::new(0, 0)).unwrap();
        assert_eq!(removal.object_id, Some(1));
        assert_eq!(removal.unseated, vec![(10, Cell::new(0, 1))]);
        assert_eq!(plan.occupants(), 0);
        assert!(plan.grid().is_empty());
    }

    #[test]
    fn bind_and_find_object() {
        let mut plan = FloorPlan::new(floor()).unwrap();
        let h = plan
            .place(
                ItemSpec::zone(object_types::WORKSPACE, crate::grid::Footprint::new(2, 2))
                    .unwrap(),
                Cell::new(0, 0),
            )
            .unwrap();
        plan.bind_object(h, 77);
        assert_eq!(plan.handle_of(77), Some(h));
        assert_eq!(plan.workspace_cells(), 4);
    }

    #[test]
    fn personnel_seat_requires_all_parts() {
        let mut p = Personnel::new(1, "A", "B", "a@b");
        assert_eq!(p.seat(), None);
        p.x_coor = Some(1);
        p.y_coor = Some(2);
        assert!(p.is_placed());
        assert_eq!(p.seat(), None);
        p.floor_id = Some(5);
        assert_eq!(p.seat(), Some((5, Cell::new(2, 1))));
        assert_eq!(p.full_name(), "A B");
    }
}
