//! Optimistic mutations against a floor plan.
//!
//! The planner applies a change locally the moment the user makes it, then
//! waits for the backend to confirm. Each change is tracked as
//! `Pending → Committed | RolledBack`; a failed write is undone on the local
//! plan so the view never shows state the backend rejected.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::catalog::ItemSpec;
use crate::floor::{FloorPlan, Removal};
use crate::grid::{Cell, ItemHandle, PlaceError};
use crate::seating::{PersonnelId, SeatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(u64);

impl MutationId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("unknown mutation #{0}")]
    Unknown(u64),
    #[error("mutation #{id} already {state:?}")]
    AlreadyResolved { id: u64, state: MutationState },
    #[error("mutation #{id} could not be rolled back: {reason}")]
    RollbackConflict { id: u64, reason: String },
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Seat(#[from] SeatError),
}

/// What was done locally, with enough to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Placed(ItemHandle),
    Removed(Removal),
    Seated {
        person: PersonnelId,
        cell: Cell,
        previous: Option<Cell>,
    },
    Unseated { person: PersonnelId, cell: Cell },
}

#[derive(Debug, Clone)]
struct Tracked {
    change: Change,
    state: MutationState,
}

/// A floor plan plus the log of locally applied, unconfirmed changes.
#[derive(Debug, Clone)]
pub struct PendingMutations {
    plan: FloorPlan,
    log: BTreeMap<MutationId, Tracked>,
    next_id: u64,
}

impl PendingMutations {
    pub fn new(plan: FloorPlan) -> Self {
        Self {
            plan,
            log: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    fn track(&mut self, change: Change) -> MutationId {
        let id = MutationId(self.next_id);
        self.next_id += 1;
        log::debug!("mutation #{} pending: {:?}", id.0, change);
        self.log.insert(
            id,
            Tracked {
                change,
                state: MutationState::Pending,
            },
        );
        id
    }

    /// Place locally. Rejected placements are not tracked.
    pub fn place(
        &mut self,
        spec: ItemSpec,
        anchor: Cell,
    ) -> Result<(MutationId, ItemHandle), MutationError> {
        let handle = self.plan.place(spec, anchor)?;
        Ok((self.track(Change::Placed(handle)), handle))
    }

    /// Remove the item covering `cell`. `None` if the cell was empty.
    pub fn remove(&mut self, cell: Cell) -> Option<MutationId> {
        let removal = self.plan.remove(cell)?;
        Some(self.track(Change::Removed(removal)))
    }

    pub fn seat(&mut self, person: PersonnelId, cell: Cell) -> Result<MutationId, MutationError> {
        let previous = self.plan.seat(person, cell)?;
        Ok(self.track(Change::Seated {
            person,
            cell,
            previous,
        }))
    }

    /// Unseat `person`. `None` if they had no seat.
    pub fn unseat(&mut self, person: PersonnelId) -> Option<MutationId> {
        let cell = self.plan.unseat(person)?;
        Some(self.track(Change::Unseated { person, cell }))
    }

    pub fn state(&self, id: MutationId) -> Option<MutationState> {
        self.log.get(&id).map(|t| t.state)
    }

    pub fn change(&self, id: MutationId) -> Option<&Change> {
        self.log.get(&id).map(|t| &t.change)
    }

    /// Ids still waiting for the backend, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = MutationId> + '_ {
        self.log
            .iter()
            .filter(|(_, t)| t.state == MutationState::Pending)
            .map(|(&id, _)| id)
    }

    fn pending_entry(&mut self, id: MutationId) -> Result<&mut Tracked, MutationError> {
        let tracked = self
            .log
            .get_mut(&id)
            .ok_or(MutationError::Unknown(id.0))?;
        match tracked.state {
            MutationState::Pending => Ok(tracked),
            state => Err(MutationError::AlreadyResolved { id: id.0, state }),
        }
    }

    /// The backend accepted the change.
    pub fn commit(&mut self, id: MutationId) -> Result<(), MutationError> {
        self.pending_entry(id)?.state = MutationState::Committed;
        log::debug!("mutation #{} committed", id.0);
        Ok(())
    }

    /// The backend rejected the change: undo it locally.
    ///
    /// If a later local change makes the undo impossible (e.g. the cells of a
    /// removed item were taken since), the mutation is still marked rolled
    /// back and the conflict is returned so the caller can reload the floor.
    pub fn fail(&mut self, id: MutationId) -> Result<(), MutationError> {
        let change = self.pending_entry(id)?.change.clone();
        let undo = self.undo(&change);
        if let Some(tracked) = self.log.get_mut(&id) {
            tracked.state = MutationState::RolledBack;
        }
        match undo {
            Ok(()) => {
                log::info!("mutation #{} rolled back", id.0);
                Ok(())
            }
            Err(reason) => {
                log::warn!("mutation #{} rollback conflict: {}", id.0, reason);
                Err(MutationError::RollbackConflict { id: id.0, reason })
            }
        }
    }

    fn undo(&mut self, change: &Change) -> Result<(), String> {
        match change {
            Change::Placed(handle) => {
                // Anyone seated on it since goes with it.
                self.plan.remove_item(*handle);
                Ok(())
            }
            Change::Removed(removal) => {
                let handle = self
                    .plan
                    .place(removal.item.spec.clone(), removal.item.anchor)
                    .map_err(|e| e.to_string())?;
                if let Some(object_id) = removal.object_id {
                    self.plan.bind_object(handle, object_id);
                }
                self.rebind_pending(removal.item.handle, handle);
                for &(person, cell) in &removal.unseated {
                    if self.plan.seats().seat_of(person).is_none() {
                        self.plan.seat(person, cell).map_err(|e| e.to_string())?;
                    }
                }
                Ok(())
            }
            Change::Seated {
                person,
                cell,
                previous,
            } => {
                if self.plan.seats().seat_of(*person) == Some(*cell) {
                    self.plan.unseat(*person);
                }
                if let Some(prev) = previous {
                    self.plan.seat(*person, *prev).map_err(|e| e.to_string())?;
                }
                Ok(())
            }
            Change::Unseated { person, cell } => self
                .plan
                .seat(*person, *cell)
                .map(|_| ())
                .map_err(|e| e.to_string()),
        }
    }

    /// Point pending placements of a re-placed item at its new handle.
    fn rebind_pending(&mut self, old: ItemHandle, new: ItemHandle) {
        for tracked in self.log.values_mut() {
            if tracked.state != MutationState::Pending {
                continue;
            }
            if let Change::Placed(handle) = &mut tracked.change {
                if *handle == old {
                    *handle = new;
                }
            }
        }
    }

    /// Forget resolved mutations. Returns how many were dropped.
    pub fn prune_resolved(&mut self) -> usize {
        let before = self.log.len();
        self.log.retain(|_, t| t.state == MutationState::Pending);
        before - self.log.len()
    }
}
