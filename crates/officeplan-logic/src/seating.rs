//! Seat assignment of personnel onto workspace cells.
//!
//! Seats are a separate layer over the occupancy grid: a person sits on a
//! cell covered by a workspace zone, and unseating them leaves the workspace
//! itself in place. One person per cell, one cell per person.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::floor::Personnel;
use crate::grid::{Cell, OccupancyGrid, PlacedItem};

pub type PersonnelId = u64;

/// Why a seat assignment was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatError {
    #[error("cell {0} is outside the floor")]
    OutOfBounds(Cell),
    #[error("drop not allowed at {0}: not a workspace")]
    NotAWorkspace(Cell),
    #[error("seat at {cell} is taken by personnel #{by}")]
    SeatTaken { cell: Cell, by: PersonnelId },
}

/// Two-way map between personnel and the cells they sit on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatMap {
    by_person: BTreeMap<PersonnelId, Cell>,
    by_cell: BTreeMap<Cell, PersonnelId>,
}

impl SeatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `person` could sit at `cell`.
    pub fn check_seat(
        &self,
        grid: &OccupancyGrid,
        person: PersonnelId,
        cell: Cell,
    ) -> Result<(), SeatError> {
        if !grid.contains(cell) {
            return Err(SeatError::OutOfBounds(cell));
        }
        let on_workspace = grid
            .item_at(cell)
            .is_some_and(|item| item.spec.kind.is_workspace());
        if !on_workspace {
            return Err(SeatError::NotAWorkspace(cell));
        }
        match self.by_cell.get(&cell) {
            Some(&by) if by != person => Err(SeatError::SeatTaken { cell, by }),
            _ => Ok(()),
        }
    }

    /// Seat `person` at `cell`, moving them if already seated elsewhere.
    ///
    /// Returns the seat they left, if any.
    pub fn seat(
        &mut self,
        grid: &OccupancyGrid,
        person: PersonnelId,
        cell: Cell,
    ) -> Result<Option<Cell>, SeatError> {
        self.check_seat(grid, person, cell)?;
        let previous = self.by_person.insert(person, cell);
        if let Some(prev) = previous {
            if prev != cell {
                self.by_cell.remove(&prev);
            }
        }
        self.by_cell.insert(cell, person);
        Ok(previous.filter(|&prev| prev != cell))
    }

    /// Clear `person`'s seat. Returns the cell they occupied.
    pub fn unseat(&mut self, person: PersonnelId) -> Option<Cell> {
        let cell = self.by_person.remove(&person)?;
        self.by_cell.remove(&cell);
        Some(cell)
    }

    /// Clear whoever sits at `cell`.
    pub fn unseat_cell(&mut self, cell: Cell) -> Option<PersonnelId> {
        let person = self.by_cell.remove(&cell)?;
        self.by_person.remove(&person);
        Some(person)
    }

    /// Unseat everyone sitting on `item`'s footprint.
    pub fn evict(&mut self, item: &PlacedItem) -> Vec<(PersonnelId, Cell)> {
        let seated: Vec<Cell> = self
            .by_cell
            .keys()
            .copied()
            .filter(|&c| item.covers(c))
            .collect();
        seated
            .into_iter()
            .filter_map(|c| self.unseat_cell(c).map(|p| (p, c)))
            .collect()
    }

    pub fn seat_of(&self, person: PersonnelId) -> Option<Cell> {
        self.by_person.get(&person).copied()
    }

    pub fn occupant(&self, cell: Cell) -> Option<PersonnelId> {
        self.by_cell.get(&cell).copied()
    }

    pub fn len(&self) -> usize {
        self.by_person.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_person.is_empty()
    }

    /// `(person, cell)` pairs ordered by person id.
    pub fn iter(&self) -> impl Iterator<Item = (PersonnelId, Cell)> + '_ {
        self.by_person.iter().map(|(&p, &c)| (p, c))
    }
}

/// Personnel without any seat on any floor.
pub fn unplaced(personnel: &[Personnel]) -> impl Iterator<Item = &Personnel> {
    personnel.iter().filter(|p| !p.is_placed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemKind, ItemSpec};
    use crate::constants::object_types;
    use crate::grid::Footprint;

    fn office() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(5, 4).unwrap();
        let ws = ItemSpec::zone(object_types::WORKSPACE, Footprint::new(3, 1)).unwrap();
        grid.place(ws, Cell::new(0, 0)).unwrap();
        grid.place(ItemSpec::menu(ItemKind::Cabinet), Cell::new(2, 2))
            .unwrap();
        grid
    }

    #[test]
    fn seat_on_workspace() {
        let grid = office();
        let mut seats = SeatMap::new();
        assert_eq!(seats.seat(&grid, 7, Cell::new(0, 1)), Ok(None));
        assert_eq!(seats.seat_of(7), Some(Cell::new(0, 1)));
        assert_eq!(seats.occupant(Cell::new(0, 1)), Some(7));
    }

    #[test]
    fn reject_non_workspace_cells() {
        let grid = office();
        let mut seats = SeatMap::new();
        assert_eq!(
            seats.seat(&grid, 1, Cell::new(3, 3)),
            Err(SeatError::NotAWorkspace(Cell::new(3, 3)))
        );
        assert_eq!(
            seats.seat(&grid, 1, Cell::new(2, 2)),
            Err(SeatError::NotAWorkspace(Cell::new(2, 2)))
        );
        assert_eq!(
            seats.seat(&grid, 1, Cell::new(9, 0)),
            Err(SeatError::OutOfBounds(Cell::new(9, 0)))
        );
        assert!(seats.is_empty());
    }

    #[test]
    fn one_person_per_seat() {
        let grid = office();
        let mut seats = SeatMap::new();
        seats.seat(&grid, 1, Cell::new(0, 0)).unwrap();
        assert_eq!(
            seats.seat(&grid, 2, Cell::new(0, 0)),
            Err(SeatError::SeatTaken {
                cell: Cell::new(0, 0),
                by: 1
            })
        );
    }

    #[test]
    fn reseating_moves_person() {
        let grid = office();
        let mut seats = SeatMap::new();
        seats.seat(&grid, 1, Cell::new(0, 0)).unwrap();
        assert_eq!(
            seats.seat(&grid, 1, Cell::new(0, 2)),
            Ok(Some(Cell::new(0, 0)))
        );
        assert_eq!(seats.occupant(Cell::new(0, 0)), None);
        assert_eq!(seats.len(), 1);
        // Same seat again is a no-op.
        assert_eq!(seats.seat(&grid, 1, Cell::new(0, 2)), Ok(None));
    }

    #[test]
    fn unseat_leaves_workspace() {
        let grid = office();
        let mut seats = SeatMap::new();
        seats.seat(&grid, 4, Cell::new(0, 1)).unwrap();
        assert_eq!(seats.unseat(4), Some(Cell::new(0, 1)));
        assert_eq!(seats.unseat(4), None);
        assert!(grid.item_at(Cell::new(0, 1)).is_some());
    }

    #[test]
    fn evict_clears_footprint_only() {
        let mut grid = OccupancyGrid::new(5, 4).unwrap();
        let ws = ItemSpec::zone(object_types::WORKSPACE, Footprint::new(2, 1)).unwrap();
        let a = grid.place(ws.clone(), Cell::new(0, 0)).unwrap();
        grid.place(ws, Cell::new(1, 0)).unwrap();
        let mut seats = SeatMap::new();
        seats.seat(&grid, 1, Cell::new(0, 0)).unwrap();
        seats.seat(&grid, 2, Cell::new(0, 1)).unwrap();
        seats.seat(&grid, 3, Cell::new(1, 1)).unwrap();

        let item = grid.item(a).unwrap().clone();
        let evicted = seats.evict(&item);
        assert_eq!(evicted, vec![(1, Cell::new(0, 0)), (2, Cell::new(0, 1))]);
        assert_eq!(seats.seat_of(3), Some(Cell::new(1, 1)));
    }

    #[test]
    fn unplaced_filters_coordinates() {
        let seated = Personnel {
            floor_id: Some(1),
            x_coor: Some(0),
            y_coor: Some(0),
            ..Personnel::new(1, "Ada", "Lovelace", "ada@example.com")
        };
        let waiting = Personnel::new(2, "Alan", "Turing", "alan@example.com");
        let all = vec![seated, waiting];
        let ids: Vec<u64> = unplaced(&all).map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
