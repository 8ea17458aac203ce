//! Integration tests for the floor planning flow.
//!
//! Exercises: stored rows → FloorPlan → placement and seating through
//! PendingMutations → capacity summary → layout export → 3D scene
//!
//! All tests are pure logic; no SpacetimeDB, no rendering.

use officeplan_logic::capacity::{summarize_building, CapacityThresholds, CapacityTier};
use officeplan_logic::catalog::{ItemKind, ItemSpec};
use officeplan_logic::constants::{object_states, object_types};
use officeplan_logic::floor::{Building, Floor, FloorObject, FloorPlan, LoadWarning, Personnel};
use officeplan_logic::grid::{Cell, Footprint, PlaceError};
use officeplan_logic::layout::{export, rasterize, validate_layout, OfficeLayout};
use officeplan_logic::mutation::{MutationState, PendingMutations};
use officeplan_logic::scene::{building_scene, floor_plan_scene, SceneConfig, Shape};
use officeplan_logic::seating::{unplaced, SeatError};
use officeplan_logic::validation::has_errors;

// ── Helpers ────────────────────────────────────────────────────────────

fn building() -> Building {
    Building {
        id: 1,
        name: "HQ".to_string(),
        floor_count: 2,
    }
}

fn floors() -> Vec<Floor> {
    vec![
        Floor {
            id: 10,
            building_id: 1,
            number: 0,
            width: 10,
            length: 6,
            capacity: 4,
        },
        Floor {
            id: 11,
            building_id: 1,
            number: 1,
            width: 10,
            length: 6,
            capacity: 8,
        },
    ]
}

fn object(id: u64, o_type: u8, x: u32, y: u32, w: u32, l: u32) -> FloorObject {
    FloorObject {
        id,
        floor_id: 10,
        o_type,
        x_coor: x,
        y_coor: y,
        width: w,
        length: l,
        state: object_states::ACTIVE,
    }
}

fn stored_objects() -> Vec<FloorObject> {
    vec![
        object(1, object_types::WORKSPACE, 0, 0, 4, 2),
        object(2, object_types::KITCHEN, 7, 0, 3, 3),
        object(3, object_types::PATHWAY, 0, 3, 10, 1),
        object(4, object_types::TABLE_MEDIUM, 4, 4, 2, 2),
    ]
}

fn staff() -> Vec<Personnel> {
    let seated = |id, x, y| Personnel {
        floor_id: Some(10),
        x_coor: Some(x),
        y_coor: Some(y),
        ..Personnel::new(id, "Seated", &format!("#{id}"), "s@example.com")
    };
    vec![
        seated(1, 0, 0),
        seated(2, 1, 0),
        Personnel::new(3, "New", "Hire", "n@example.com"),
    ]
}

// ── Load ───────────────────────────────────────────────────────────────

#[test]
fn stored_floor_loads_cleanly() {
    let (plan, warnings) = FloorPlan::load(floors()[0].clone(), &stored_objects(), &staff()).unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(plan.grid().item_count(), 4);
    assert_eq!(plan.occupants(), 2);
    assert_eq!(plan.workspace_cells(), 8);
    assert_eq!(
        plan.grid().to_string(),
        "WWWW...KKK\n\
         WWWW...KKK\n\
         .......KKK\n\
         ==========\n\
         ....tt....\n\
         ....tt....\n"
    );
}

#[test]
fn inactive_and_conflicting_rows_are_reported_not_fatal() {
    let mut objects = stored_objects();
    let mut retired = object(5, object_types::CONFERENCE, 0, 5, 2, 1);
    retired.state = object_states::INACTIVE;
    objects.push(retired);
    objects.push(object(6, object_types::WC, 8, 2, 2, 2));

    let (plan, warnings) = FloorPlan::load(floors()[0].clone(), &objects, &staff()).unwrap();
    assert_eq!(plan.grid().item_count(), 4);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        LoadWarning::ObjectRejected {
            object_id: 6,
            error: PlaceError::Occupied { .. }
        }
    ));
}

// ── Editing ────────────────────────────────────────────────────────────

#[test]
fn edit_session_with_commit_and_rollback() {
    let (plan, _) = FloorPlan::load(floors()[0].clone(), &stored_objects(), &staff()).unwrap();
    let mut session = PendingMutations::new(plan);

    // New hire gets a seat on the existing workspace.
    let seat = session.seat(3, Cell::new(1, 3)).unwrap();
    session.commit(seat).unwrap();

    // Dropping a cabinet onto the pathway is refused locally.
    let err = session
        .place(ItemSpec::menu(ItemKind::Cabinet), Cell::new(3, 5))
        .unwrap_err();
    assert!(err.to_string().contains("occupied"), "{err}");

    // A vertical table the backend later rejects.
    let (id, _) = session
        .place(ItemSpec::menu(ItemKind::TableSmallVertical), Cell::new(4, 8))
        .unwrap();
    assert!(session.plan().grid().is_occupied(Cell::new(5, 8)));
    session.fail(id).unwrap();
    assert_eq!(session.state(id), Some(MutationState::RolledBack));
    assert!(!session.plan().grid().is_occupied(Cell::new(5, 8)));

    // Removing the workspace unseats all three; the backend refuses, so they come back.
    let removal = session.remove(Cell::new(1, 1)).unwrap();
    assert_eq!(session.plan().occupants(), 0);
    session.fail(removal).unwrap();
    assert_eq!(session.plan().occupants(), 3);
    assert_eq!(session.plan().seats().seat_of(3), Some(Cell::new(1, 3)));
    assert_eq!(session.pending().count(), 0);
}

#[test]
fn people_only_sit_on_workspaces() {
    let (mut plan, _) = FloorPlan::load(floors()[0].clone(), &stored_objects(), &staff()).unwrap();
    assert_eq!(
        plan.seat(3, Cell::new(0, 8)),
        Err(SeatError::NotAWorkspace(Cell::new(0, 8)))
    );
    assert_eq!(
        plan.seat(3, Cell::new(0, 0)),
        Err(SeatError::SeatTaken {
            cell: Cell::new(0, 0),
            by: 1
        })
    );
    let ids: Vec<u64> = unplaced(&staff()).map(|p| p.id).collect();
    assert_eq!(ids, vec![3]);
}

// ── Building overview ──────────────────────────────────────────────────

#[test]
fn building_summary_and_scene() {
    let b = building();
    let rows = summarize_building(b.id, &floors(), &staff(), &CapacityThresholds::default());
    assert_eq!(rows.len(), b.floor_count as usize);
    assert_eq!(rows[0].tier, CapacityTier::Medium);
    assert_eq!(rows[1].tier, CapacityTier::Low);
    assert_eq!(rows[0].users, vec!["Seated #1", "Seated #2"]);

    let nodes = building_scene(&rows, None, 10.0, 6.0, &SceneConfig::default());
    assert_eq!(nodes.len(), 10);
    assert!(nodes[5].center[1] > nodes[0].center[1]);
}

// ── Layout files ───────────────────────────────────────────────────────

#[test]
fn exported_layout_reimports() {
    let (plan, _) = FloorPlan::load(floors()[0].clone(), &stored_objects(), &staff()).unwrap();
    let layout = export(&plan);
    assert_eq!(layout.office.desks.len(), 8);
    assert!(layout.office.kitchen.is_some());
    assert!(layout.office.hallway.is_some());
    assert!(layout.office.wc.is_none());

    let json = layout.to_json().unwrap();
    let parsed = OfficeLayout::from_json(&json).unwrap();
    assert!(!has_errors(&validate_layout(&parsed)));

    let (grid, skipped) = rasterize(&parsed).unwrap();
    assert!(skipped.is_empty());
    // Furniture is not part of the layout format.
    assert_eq!(grid.occupied_count(), plan.grid().occupied_count() - 4);
}

#[test]
fn floor_scene_has_node_per_item() {
    let (plan, _) = FloorPlan::load(floors()[0].clone(), &stored_objects(), &[]).unwrap();
    let nodes = floor_plan_scene(&plan, &SceneConfig::default());
    assert_eq!(nodes.len(), 5);
    assert_eq!(nodes.iter().filter(|n| n.shape == Shape::Box).count(), 1);
    let table = nodes.iter().find(|n| n.shape == Shape::Box).unwrap();
    assert_eq!(table.size[0], Footprint::new(2, 2).width as f32);
}
