//! Client-facing reducers for building, floor, placement and seating edits.
//!
//! Every edit that touches a floor rebuilds the floor's plan from its rows and
//! lets `officeplan_logic` decide whether the change is legal, so the server
//! enforces the same grid rules as the planner UI.

use crate::tables::*;
use officeplan_logic::capacity::{summarize_building, CapacityThresholds};
use officeplan_logic::catalog::ItemSpec;
use officeplan_logic::constants::object_states;
use officeplan_logic::floor::{self as logic, validate_floor, FloorPlan};
use officeplan_logic::grid::Cell;
use officeplan_logic::layout::{self, OfficeLayout};
use officeplan_logic::validation::{has_errors, Severity};
use spacetimedb::{reducer, ReducerContext, Table};

// ============================================================================
// CONNECTIONS
// ============================================================================

/// Called when a client connects
#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    ctx.db.connected_client().insert(ConnectedClient {
        identity: ctx.sender,
        connected_at: ctx.timestamp,
    });
}

/// Called when a client disconnects
#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    if let Some(client) = ctx.db.connected_client().identity().find(ctx.sender) {
        ctx.db.connected_client().identity().delete(client.identity);
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Rebuild the working plan for `floor_id` from its stored rows.
fn load_plan(ctx: &ReducerContext, floor_id: u32) -> Result<FloorPlan, String> {
    let floor = ctx
        .db
        .floor()
        .id()
        .find(floor_id)
        .ok_or_else(|| format!("Floor #{floor_id} not found"))?;
    let objects: Vec<logic::FloorObject> = ctx
        .db
        .floor_object()
        .iter()
        .filter(|o| o.floor_id == floor_id)
        .map(|o| o.to_logic())
        .collect();
    let personnel: Vec<logic::Personnel> = ctx
        .db
        .personnel()
        .iter()
        .filter(|p| p.floor_id == Some(floor_id))
        .map(|p| p.to_logic())
        .collect();
    let (plan, _warnings) =
        FloorPlan::load(floor.to_logic(), &objects, &personnel).map_err(|e| e.to_string())?;
    Ok(plan)
}

fn clear_seat(ctx: &ReducerContext, personnel_id: u64) {
    if let Some(mut person) = ctx.db.personnel().id().find(personnel_id) {
        person.floor_id = None;
        person.x_coor = None;
        person.y_coor = None;
        ctx.db.personnel().id().update(person);
    }
}

fn sync_floor_count(ctx: &ReducerContext, building_id: u32) {
    let count = ctx
        .db
        .floor()
        .iter()
        .filter(|f| f.building_id == building_id)
        .count() as u32;
    if let Some(mut building) = ctx.db.building().id().find(building_id) {
        building.floor_count = count;
        ctx.db.building().id().update(building);
    }
}

/// Reject a floor record whose validation has errors; log its warnings.
fn check_floor(floor: &logic::Floor) -> Result<(), String> {
    let findings = validate_floor(floor);
    for f in findings.iter().filter(|f| f.severity == Severity::Warning) {
        log::warn!("{}", f);
    }
    if has_errors(&findings) {
        let messages: Vec<String> = findings.iter().map(|f| f.to_string()).collect();
        return Err(messages.join("; "));
    }
    Ok(())
}

fn remove_floor_contents(ctx: &ReducerContext, floor_id: u32) {
    let objects: Vec<u64> = ctx
        .db
        .floor_object()
        .iter()
        .filter(|o| o.floor_id == floor_id)
        .map(|o| o.id)
        .collect();
    for id in objects {
        ctx.db.floor_object().id().delete(id);
    }
    let seated: Vec<u64> = ctx
        .db
        .personnel()
        .iter()
        .filter(|p| p.floor_id == Some(floor_id))
        .map(|p| p.id)
        .collect();
    for id in seated {
        clear_seat(ctx, id);
    }
}

// ============================================================================
// BUILDINGS
// ============================================================================

#[reducer]
pub fn create_building(ctx: &ReducerContext, name: String) -> Result<(), String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("Building name must not be empty".to_string());
    }
    let id = ctx
        .db
        .building()
        .insert(Building {
            id: 0,
            name: name.clone(),
            floor_count: 0,
        })
        .id;
    log::info!("Created building #{} '{}'", id, name);
    Ok(())
}

#[reducer]
pub fn rename_building(ctx: &ReducerContext, building_id: u32, name: String) -> Result<(), String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("Building name must not be empty".to_string());
    }
    let mut building = ctx
        .db
        .building()
        .id()
        .find(building_id)
        .ok_or_else(|| format!("Building #{building_id} not found"))?;
    building.name = name;
    ctx.db.building().id().update(building);
    Ok(())
}

/// Delete a building with all its floors and their objects; unseat its staff.
#[reducer]
pub fn delete_building(ctx: &ReducerContext, building_id: u32) -> Result<(), String> {
    if ctx.db.building().id().find(building_id).is_none() {
        return Err(format!("Building #{building_id} not found"));
    }
    let floors: Vec<u32> = ctx
        .db
        .floor()
        .iter()
        .filter(|f| f.building_id == building_id)
        .map(|f| f.id)
        .collect();
    for floor_id in &floors {
        remove_floor_contents(ctx, *floor_id);
        ctx.db.floor().id().delete(*floor_id);
    }
    ctx.db.building().id().delete(building_id);
    log::info!(
        "Deleted building #{} with {} floor(s)",
        building_id,
        floors.len()
    );
    Ok(())
}

/// Log the occupancy summary of every floor in a building.
#[reducer]
pub fn report_building_capacity(ctx: &ReducerContext, building_id: u32) -> Result<(), String> {
    let building = ctx
        .db
        .building()
        .id()
        .find(building_id)
        .ok_or_else(|| format!("Building #{building_id} not found"))?;
    let floors: Vec<logic::Floor> = ctx.db.floor().iter().map(|f| f.to_logic()).collect();
    let personnel: Vec<logic::Personnel> =
        ctx.db.personnel().iter().map(|p| p.to_logic()).collect();
    let rows = summarize_building(
        building_id,
        &floors,
        &personnel,
        &CapacityThresholds::default(),
    );
    log::info!("{}: {} floor(s)", building.name, rows.len());
    for row in &rows {
        log::info!(
            "  {}: {}/{} seated, {}",
            row.name,
            row.occupants,
            row.capacity,
            row.tier.label()
        );
    }
    let json = serde_json::to_string(&rows).map_err(|e| e.to_string())?;
    log::debug!("Capacity summary: {}", json);
    Ok(())
}

// ============================================================================
// FLOORS
// ============================================================================

#[reducer]
pub fn create_floor(
    ctx: &ReducerContext,
    building_id: u32,
    number: u32,
    width: u32,
    length: u32,
    capacity: u32,
) -> Result<(), String> {
    if ctx.db.building().id().find(building_id).is_none() {
        return Err(format!("Building #{building_id} not found"));
    }
    if ctx
        .db
        .floor()
        .iter()
        .any(|f| f.building_id == building_id && f.number == number)
    {
        return Err(format!(
            "Building #{building_id} already has a floor {number}"
        ));
    }
    let row = Floor {
        id: 0,
        building_id,
        number,
        width,
        length,
        capacity,
    };
    check_floor(&row.to_logic())?;
    let id = ctx.db.floor().insert(row).id;
    sync_floor_count(ctx, building_id);
    log::info!(
        "Created floor #{} ({}×{}, capacity {}) in building #{}",
        id,
        width,
        length,
        capacity,
        building_id
    );
    Ok(())
}

/// Resize a floor. Refused if any existing object would no longer fit.
#[reducer]
pub fn update_floor(
    ctx: &ReducerContext,
    floor_id: u32,
    width: u32,
    length: u32,
    capacity: u32,
) -> Result<(), String> {
    let mut row = ctx
        .db
        .floor()
        .id()
        .find(floor_id)
        .ok_or_else(|| format!("Floor #{floor_id} not found"))?;
    row.width = width;
    row.length = length;
    row.capacity = capacity;
    check_floor(&row.to_logic())?;

    let objects: Vec<logic::FloorObject> = ctx
        .db
        .floor_object()
        .iter()
        .filter(|o| o.floor_id == floor_id)
        .map(|o| o.to_logic())
        .collect();
    let (_, warnings) =
        FloorPlan::load(row.to_logic(), &objects, &[]).map_err(|e| e.to_string())?;
    if let Some(w) = warnings.first() {
        return Err(format!("Resize would drop objects: {w}"));
    }

    ctx.db.floor().id().update(row);
    log::info!("Floor #{} resized to {}×{}", floor_id, width, length);
    Ok(())
}

#[reducer]
pub fn delete_floor(ctx: &ReducerContext, floor_id: u32) -> Result<(), String> {
    let row = ctx
        .db
        .floor()
        .id()
        .find(floor_id)
        .ok_or_else(|| format!("Floor #{floor_id} not found"))?;
    remove_floor_contents(ctx, floor_id);
    ctx.db.floor().id().delete(floor_id);
    sync_floor_count(ctx, row.building_id);
    log::info!("Deleted floor #{}", floor_id);
    Ok(())
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// Place a zone or menu item with its top-left corner at column `x`, row `y`.
#[reducer]
pub fn place_object(
    ctx: &ReducerContext,
    floor_id: u32,
    o_type: u8,
    x: u32,
    y: u32,
    width: u32,
    length: u32,
) -> Result<(), String> {
    let mut plan = load_plan(ctx, floor_id)?;
    let spec = ItemSpec::placement(o_type, width, length)
        .ok_or_else(|| format!("Unknown object type {o_type}"))?;
    let footprint = spec.footprint;
    let label = spec.label.clone();
    plan.place(spec, Cell::new(y, x))
        .map_err(|e| format!("Drop not allowed: {e}"))?;

    let id = ctx
        .db
        .floor_object()
        .insert(FloorObject {
            id: 0,
            floor_id,
            o_type,
            x_coor: x,
            y_coor: y,
            width: footprint.width,
            length: footprint.height,
            state: object_states::ACTIVE,
        })
        .id;
    log::info!(
        "Placed {} #{} ({}) at ({}, {}) on floor #{}",
        label,
        id,
        footprint,
        x,
        y,
        floor_id
    );
    Ok(())
}

/// Remove whatever covers column `x`, row `y`. An empty cell is a no-op.
#[reducer]
pub fn remove_object(ctx: &ReducerContext, floor_id: u32, x: u32, y: u32) -> Result<(), String> {
    let mut plan = load_plan(ctx, floor_id)?;
    let Some(removal) = plan.remove(Cell::new(y, x)) else {
        log::debug!("Nothing to remove at ({}, {}) on floor #{}", x, y, floor_id);
        return Ok(());
    };
    if let Some(object_id) = removal.object_id {
        ctx.db.floor_object().id().delete(object_id);
    }
    for (personnel_id, _) in &removal.unseated {
        clear_seat(ctx, *personnel_id);
    }
    log::info!(
        "Removed {} from floor #{} ({} unseated)",
        removal.item.spec.label,
        floor_id,
        removal.unseated.len()
    );
    Ok(())
}

// ============================================================================
// PERSONNEL
// ============================================================================

#[reducer]
pub fn create_personnel(
    ctx: &ReducerContext,
    name: String,
    surname: String,
    email: String,
) -> Result<(), String> {
    let email = email.trim().to_string();
    if name.trim().is_empty() || surname.trim().is_empty() {
        return Err("Name and surname are required".to_string());
    }
    if !email.contains('@') {
        return Err(format!("Invalid email '{email}'"));
    }
    if ctx
        .db
        .personnel()
        .iter()
        .any(|p| p.email.eq_ignore_ascii_case(&email))
    {
        return Err(format!("Email '{email}' is already registered"));
    }
    let id = ctx
        .db
        .personnel()
        .insert(Personnel {
            id: 0,
            name,
            surname,
            email,
            floor_id: None,
            x_coor: None,
            y_coor: None,
        })
        .id;
    log::info!("Created personnel #{}", id);
    Ok(())
}

#[reducer]
pub fn update_personnel(
    ctx: &ReducerContext,
    personnel_id: u64,
    name: String,
    surname: String,
) -> Result<(), String> {
    if name.trim().is_empty() || surname.trim().is_empty() {
        return Err("Name and surname are required".to_string());
    }
    let mut person = ctx
        .db
        .personnel()
        .id()
        .find(personnel_id)
        .ok_or_else(|| format!("Personnel #{personnel_id} not found"))?;
    person.name = name;
    person.surname = surname;
    ctx.db.personnel().id().update(person);
    Ok(())
}

#[reducer]
pub fn delete_personnel(ctx: &ReducerContext, personnel_id: u64) -> Result<(), String> {
    if ctx.db.personnel().id().find(personnel_id).is_none() {
        return Err(format!("Personnel #{personnel_id} not found"));
    }
    let feedback = feedback_by(
        ctx.db.feedback().iter().map(|f| (f.id, f.personnel_id)),
        personnel_id,
    );
    for id in &feedback {
        ctx.db.feedback().id().delete(*id);
    }
    ctx.db.personnel().id().delete(personnel_id);
    log::info!(
        "Deleted personnel #{} and {} feedback row(s)",
        personnel_id,
        feedback.len()
    );
    Ok(())
}

/// Feedback ids written by `personnel_id`, from `(id, personnel_id)` rows.
fn feedback_by(rows: impl IntoIterator<Item = (u64, u64)>, personnel_id: u64) -> Vec<u64> {
    rows.into_iter()
        .filter(|&(_, author)| author == personnel_id)
        .map(|(id, _)| id)
        .collect()
}

// ============================================================================
// SEATING
// ============================================================================

/// Seat a person on a workspace cell, moving them if already seated.
#[reducer]
pub fn assign_seat(
    ctx: &ReducerContext,
    personnel_id: u64,
    floor_id: u32,
    x: u32,
    y: u32,
) -> Result<(), String> {
    let mut person = ctx
        .db
        .personnel()
        .id()
        .find(personnel_id)
        .ok_or_else(|| format!("Personnel #{personnel_id} not found"))?;
    let mut plan = load_plan(ctx, floor_id)?;
    plan.seat(personnel_id, Cell::new(y, x))
        .map_err(|e| e.to_string())?;

    person.floor_id = Some(floor_id);
    person.x_coor = Some(x);
    person.y_coor = Some(y);
    ctx.db.personnel().id().update(person);
    log::info!(
        "Seated personnel #{} at ({}, {}) on floor #{}",
        personnel_id,
        x,
        y,
        floor_id
    );
    Ok(())
}

#[reducer]
pub fn unassign_seat(ctx: &ReducerContext, personnel_id: u64) -> Result<(), String> {
    if ctx.db.personnel().id().find(personnel_id).is_none() {
        return Err(format!("Personnel #{personnel_id} not found"));
    }
    clear_seat(ctx, personnel_id);
    log::info!("Unseated personnel #{}", personnel_id);
    Ok(())
}

// ============================================================================
// FEEDBACK
// ============================================================================

#[reducer]
pub fn submit_feedback(
    ctx: &ReducerContext,
    personnel_id: u64,
    title: String,
    content: String,
) -> Result<(), String> {
    if ctx.db.personnel().id().find(personnel_id).is_none() {
        return Err(format!("Personnel #{personnel_id} not found"));
    }
    if title.trim().is_empty() {
        return Err("Feedback title must not be empty".to_string());
    }
    ctx.db.feedback().insert(Feedback {
        id: 0,
        personnel_id,
        title,
        content,
        created_at: ctx.timestamp,
    });
    log::info!("Feedback received from personnel #{}", personnel_id);
    Ok(())
}

#[reducer]
pub fn delete_feedback(ctx: &ReducerContext, feedback_id: u64) -> Result<(), String> {
    if ctx.db.feedback().id().find(feedback_id).is_none() {
        return Err(format!("Feedback #{feedback_id} not found"));
    }
    ctx.db.feedback().id().delete(feedback_id);
    Ok(())
}

// ============================================================================
// LAYOUT FILES
// ============================================================================

/// Log the floor as office-layout JSON.
#[reducer]
pub fn export_floor_layout(ctx: &ReducerContext, floor_id: u32) -> Result<(), String> {
    let plan = load_plan(ctx, floor_id)?;
    let json = layout::export(&plan)
        .to_json()
        .map_err(|e| e.to_string())?;
    log::info!("Layout for floor #{}:\n{}", floor_id, json);
    Ok(())
}

/// Populate an empty floor from office-layout JSON.
///
/// Desks become one-cell workspaces and the kitchen, WC and hallway become
/// zones. The layout must fit the floor.
#[reducer]
pub fn import_floor_layout(ctx: &ReducerContext, floor_id: u32, json: String) -> Result<(), String> {
    let plan = load_plan(ctx, floor_id)?;
    if !plan.grid().is_empty() {
        return Err(format!("Floor #{floor_id} already has objects"));
    }
    let doc = OfficeLayout::from_json(&json).map_err(|e| e.to_string())?;
    let findings = layout::validate_layout(&doc);
    if has_errors(&findings) {
        let messages: Vec<String> = findings.iter().map(|f| f.to_string()).collect();
        return Err(messages.join("; "));
    }
    let (grid, skipped) = layout::rasterize(&doc).map_err(|e| e.to_string())?;
    if grid.width() > plan.grid().width() || grid.length() > plan.grid().length() {
        return Err(format!(
            "Layout is {}×{} but floor #{} is {}×{}",
            grid.width(),
            grid.length(),
            floor_id,
            plan.grid().width(),
            plan.grid().length()
        ));
    }

    for item in grid.items() {
        let fp = item.footprint();
        ctx.db.floor_object().insert(FloorObject {
            id: 0,
            floor_id,
            o_type: item.spec.kind.code(),
            x_coor: item.anchor.col,
            y_coor: item.anchor.row,
            width: fp.width,
            length: fp.height,
            state: object_states::ACTIVE,
        });
    }
    log::info!(
        "Imported {} object(s) onto floor #{} ({} skipped)",
        grid.item_count(),
        floor_id,
        skipped.len()
    );
    Ok(())
}
