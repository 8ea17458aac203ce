//! OfficePlan Headless Planning Harness
//!
//! Validates pure planning logic and data without SpacetimeDB.
//! Runs entirely in-process: no DB, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p officeplan-simtest
//!   cargo run -p officeplan-simtest -- --verbose
//!   cargo run -p officeplan-simtest -- --layout office.json --config planner.json

use std::path::PathBuf;

use clap::Parser;
use officeplan_logic::capacity::{classify, heat_hsl, summarize_building, CapacityTier};
use officeplan_logic::catalog::{ItemKind, ItemSpec, ObjectType};
use officeplan_logic::config::{validate_config, PlannerConfig};
use officeplan_logic::constants::object_types;
use officeplan_logic::floor::{Floor, FloorPlan, Personnel};
use officeplan_logic::grid::{Cell, Footprint, OccupancyGrid, PlaceError};
use officeplan_logic::layout::{self, OfficeLayout};
use officeplan_logic::mutation::{MutationState, PendingMutations};
use officeplan_logic::scene::{self, Shape};
use officeplan_logic::validation::has_errors;

// ── Bundled layout (same file the planner ships as its example) ────────
const LAYOUT_JSON: &str = include_str!("../../../data/sample_office_layout.json");

#[derive(Parser)]
#[command(
    name = "officeplan-simtest",
    version,
    about = "Headless harness for OfficePlan planning logic"
)]
struct Args {
    /// Print every check, not just failures
    #[arg(long)]
    verbose: bool,
    /// Office layout JSON to validate instead of the bundled sample
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Planner config JSON
    #[arg(long)]
    config: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("=== OfficePlan Planning Harness ===\n");

    let mut results = Vec::new();

    // 1. Planner configuration
    let config = load_config(&args, &mut results);

    // 2. Item catalog consistency
    results.extend(validate_catalog(args.verbose));

    // 3. Grid placement scenarios
    results.extend(validate_grid_scenarios(args.verbose));

    // 4. Layout file: parse, validate, rasterize, export
    results.extend(validate_layout_file(&args, &config));

    // 5. Seating and optimistic mutations
    results.extend(validate_seating_and_mutations(args.verbose));

    // 6. Capacity summary and building scene
    results.extend(validate_capacity(&config, args.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn load_config(args: &Args, results: &mut Vec<TestResult>) -> PlannerConfig {
    println!("--- Config ---");
    let config = match &args.config {
        Some(path) => match PlannerConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                results.push(TestResult::check("config_load", false, e.to_string()));
                return PlannerConfig::default();
            }
        },
        None => {
            let mut c = PlannerConfig::default();
            c.apply_env();
            c
        }
    };

    let errors = validate_config(&config);
    results.push(TestResult::check(
        "config_valid",
        errors.is_empty(),
        if errors.is_empty() {
            format!("backend {}", config.backend.url)
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    ));
    results.push(TestResult::check(
        "config_api_key",
        true,
        if config.api_key().is_some() {
            format!("{} is set", config.backend.api_key_env)
        } else {
            format!("{} not set (offline run)", config.backend.api_key_env)
        },
    ));
    config
}

// ── 2. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    let mut codes: Vec<u8> = ItemKind::MENU.iter().map(|k| k.code()).collect();
    codes.extend(ObjectType::ALL.iter().map(|t| t.as_u8()));
    let total = codes.len();
    codes.sort_unstable();
    codes.dedup();
    results.push(TestResult::check(
        "catalog_unique_codes",
        codes.len() == total,
        format!("{} object type codes", codes.len()),
    ));

    let bad: Vec<&str> = ItemKind::MENU
        .iter()
        .filter(|k| k.default_footprint().is_empty())
        .map(|k| k.label())
        .collect();
    results.push(TestResult::check(
        "catalog_footprints",
        bad.is_empty(),
        if bad.is_empty() {
            "every menu item covers at least one cell".to_string()
        } else {
            format!("empty footprints: {}", bad.join(", "))
        },
    ));

    let unparsed: Vec<&str> = ItemKind::MENU
        .iter()
        .filter(|k| ItemKind::from_label(k.label()) != Some(**k))
        .map(|k| k.label())
        .collect();
    results.push(TestResult::check(
        "catalog_labels_parse",
        unparsed.is_empty(),
        format!("{} labels unparsed", unparsed.len()),
    ));

    if verbose {
        for kind in ItemKind::MENU {
            println!(
                "    {:<24} {:>4}  code {}",
                kind.label(),
                kind.default_footprint().to_string(),
                kind.code()
            );
        }
    }
    results
}

// ── 3. Grid ─────────────────────────────────────────────────────────────

fn block(width: u32, height: u32) -> ItemSpec {
    ItemSpec::custom(ItemKind::Cabinet, "block", Footprint::new(width, height))
}

fn validate_grid_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Grid ---");
    let mut results = Vec::new();

    let Ok(mut grid) = OccupancyGrid::new(5, 5) else {
        results.push(TestResult::check("grid_create", false, "5×5 grid rejected"));
        return results;
    };

    let first = grid.place(block(2, 1), Cell::new(0, 0));
    results.push(TestResult::check(
        "grid_place_2x1",
        first.is_ok() && grid.is_occupied(Cell::new(0, 1)) && grid.occupied_count() == 2,
        format!("{} cells occupied", grid.occupied_count()),
    ));

    let before = grid.clone();
    let overlap = grid.place(block(1, 1), Cell::new(0, 0));
    results.push(TestResult::check(
        "grid_reject_overlap",
        matches!(overlap, Err(PlaceError::Occupied { .. })) && grid == before,
        match &overlap {
            Err(e) => e.to_string(),
            Ok(_) => "overlap accepted".to_string(),
        },
    ));

    let second = grid.place(block(1, 1), Cell::new(1, 1));
    let removed = grid.remove(Cell::new(0, 1));
    results.push(TestResult::check(
        "grid_remove_whole_item",
        second.is_ok()
            && removed.is_some()
            && !grid.is_occupied(Cell::new(0, 0))
            && grid.is_occupied(Cell::new(1, 1)),
        format!("{} cells left", grid.occupied_count()),
    ));
    if verbose {
        print!("{grid}");
    }

    let oversized = OccupancyGrid::new(3, 3).map(|mut small| {
        let r = small.place(block(4, 1), Cell::new(0, 0));
        (r, small.is_empty())
    });
    results.push(TestResult::check(
        "grid_reject_out_of_bounds",
        matches!(oversized, Ok((Err(PlaceError::OutOfBounds { .. }), true))),
        "4×1 on a 3×3 grid",
    ));

    results
}

// ── 4. Layout ───────────────────────────────────────────────────────────

fn validate_layout_file(args: &Args, config: &PlannerConfig) -> Vec<TestResult> {
    println!("--- Layout ---");
    let mut results = Vec::new();

    let parsed = match &args.layout {
        Some(path) => OfficeLayout::load(path),
        None => OfficeLayout::from_json(LAYOUT_JSON),
    };
    let doc = match parsed {
        Ok(d) => {
            log::info!(
                "layout source: {}",
                args.layout
                    .as_ref()
                    .map_or("bundled sample".to_string(), |p| p.display().to_string())
            );
            d
        }
        Err(e) => {
            results.push(TestResult::check("layout_parse", false, e.to_string()));
            return results;
        }
    };
    results.push(TestResult::check(
        "layout_parse",
        true,
        format!(
            "{} walls, {} desks, {} zones",
            doc.office.walls.len(),
            doc.office.desks.len(),
            doc.zones().count()
        ),
    ));

    let findings = layout::validate_layout(&doc);
    results.push(TestResult::check(
        "layout_valid",
        !has_errors(&findings),
        if findings.is_empty() {
            "no findings".to_string()
        } else {
            findings
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    ));

    let (grid, skipped) = match layout::rasterize(&doc) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult::check("layout_rasterize", false, e.to_string()));
            return results;
        }
    };
    let workspaces = grid.items().filter(|i| i.spec.kind.is_workspace()).count();
    results.push(TestResult::check(
        "layout_rasterize",
        skipped.is_empty() && workspaces == doc.office.desks.len(),
        format!(
            "{}×{} grid, {} items, {} skipped",
            grid.width(),
            grid.length(),
            grid.item_count(),
            skipped.len()
        ),
    ));
    if args.verbose {
        print!("{grid}");
    }

    // Rebuild as a floor plan and export it back out.
    let floor = Floor {
        id: 1,
        building_id: 1,
        number: 0,
        width: grid.width(),
        length: grid.length(),
        capacity: workspaces as u32,
    };
    let exported = FloorPlan::new(floor).map(|mut plan| {
        for item in grid.items() {
            let _ = plan.place(item.spec.clone(), item.anchor);
        }
        let scene_nodes = scene::floor_plan_scene(&plan, &config.scene).len();
        (layout::export(&plan), scene_nodes)
    });
    match exported {
        Ok((out, scene_nodes)) => {
            results.push(TestResult::check(
                "layout_export_round_trip",
                out.office.desks.len() == workspaces && out.zones().count() == doc.zones().count(),
                format!("{} desks exported", out.office.desks.len()),
            ));
            results.push(TestResult::check(
                "layout_floor_scene",
                scene_nodes == grid.item_count() + 1,
                format!("{} scene nodes", scene_nodes),
            ));
        }
        Err(e) => results.push(TestResult::check("layout_export_round_trip", false, e.to_string())),
    }

    let nodes = scene::layout_scene(&doc);
    let walls = nodes
        .iter()
        .filter(|n| n.shape == Shape::Box && n.name.starts_with("wall"))
        .count();
    results.push(TestResult::check(
        "layout_scene_walls",
        walls == doc.office.walls.len(),
        format!("{} nodes, {} walls", nodes.len(), walls),
    ));

    results
}

// ── 5. Seating & mutations ──────────────────────────────────────────────

fn validate_seating_and_mutations(_verbose: bool) -> Vec<TestResult> {
    println!("--- Seating ---");
    let mut results = Vec::new();

    let floor = Floor {
        id: 7,
        building_id: 1,
        number: 2,
        width: 8,
        length: 4,
        capacity: 4,
    };
    let plan = match FloorPlan::new(floor) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult::check("seating_floor", false, e.to_string()));
            return results;
        }
    };
    let mut session = PendingMutations::new(plan);

    let desks = ItemSpec::zone(object_types::WORKSPACE, Footprint::new(4, 1))
        .ok_or("workspace code rejected")
        .and_then(|spec| {
            session
                .place(spec, Cell::new(0, 0))
                .map_err(|_| "workspace placement rejected")
        });
    let Ok((placed, _)) = desks else {
        results.push(TestResult::check("seating_workspace", false, "could not place workspace"));
        return results;
    };
    let _ = session.commit(placed);

    let on_kitchen = session
        .place(
            ItemSpec::custom(ItemKind::Zone(ObjectType::Kitchen), "Kitchen", Footprint::new(2, 2)),
            Cell::new(2, 0),
        )
        .is_ok()
        && session.seat(1, Cell::new(2, 0)).is_err();
    results.push(TestResult::check(
        "seating_workspace_only",
        on_kitchen,
        "kitchen cells refuse a seat",
    ));

    let seated = session.seat(1, Cell::new(0, 0)).is_ok() && session.seat(2, Cell::new(0, 0)).is_err();
    results.push(TestResult::check(
        "seating_one_per_cell",
        seated,
        format!("{} seated", session.plan().occupants()),
    ));

    let removal = session.remove(Cell::new(0, 2));
    let emptied = session.plan().occupants() == 0;
    let restored = removal
        .map(|id| session.fail(id).is_ok() && session.state(id) == Some(MutationState::RolledBack))
        .unwrap_or(false);
    results.push(TestResult::check(
        "mutation_rollback_restores",
        emptied && restored && session.plan().occupants() == 1,
        format!("{} pending", session.pending().count()),
    ));

    let unplaced = vec![
        Personnel::new(1, "Ada", "Lovelace", "ada@example.com"),
        Personnel::new(2, "Alan", "Turing", "alan@example.com"),
    ];
    results.push(TestResult::check(
        "seating_unplaced",
        officeplan_logic::seating::unplaced(&unplaced).count() == 2,
        "fresh personnel have no seat",
    ));

    results
}

// ── 6. Capacity ─────────────────────────────────────────────────────────

fn validate_capacity(config: &PlannerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Capacity ---");
    let mut results = Vec::new();
    let thresholds = &config.capacity_thresholds;

    let tiers = [
        classify(0, 10, thresholds),
        classify(6, 10, thresholds),
        classify(9, 10, thresholds),
        classify(1, 0, thresholds),
    ];
    results.push(TestResult::check(
        "capacity_tiers",
        tiers
            == [
                CapacityTier::Low,
                CapacityTier::Medium,
                CapacityTier::High,
                CapacityTier::High,
            ],
        format!("{:?}", tiers),
    ));

    let fills =
        [CapacityTier::Low, CapacityTier::Medium, CapacityTier::High].map(CapacityTier::rgba);
    results.push(TestResult::check(
        "capacity_tier_fills",
        fills[0] != fills[1]
            && fills[1] != fills[2]
            && fills.iter().flatten().all(|c| (0.0..=1.0).contains(c)),
        format!("{:?}", fills),
    ));

    let (empty_hue, _, _) = heat_hsl(0.0);
    let (full_hue, _, _) = heat_hsl(1.0);
    results.push(TestResult::check(
        "capacity_heat_scale",
        empty_hue > full_hue,
        format!("hue {empty_hue:.2} → {full_hue:.2}"),
    ));

    let floors: Vec<Floor> = (0..3)
        .map(|n| Floor {
            id: 100 + n,
            building_id: 1,
            number: n,
            width: config.default_floor_width,
            length: config.default_floor_length,
            capacity: 4,
        })
        .collect();
    let staff: Vec<Personnel> = (0..5u64)
        .map(|i| Personnel {
            floor_id: Some(100 + (i % 2) as u32),
            x_coor: Some(i as u32),
            y_coor: Some(0),
            ..Personnel::new(i, "Staff", &format!("{i}"), "staff@example.com")
        })
        .collect();
    let rows = summarize_building(1, &floors, &staff, thresholds);
    let seated: u32 = rows.iter().map(|r| r.occupants).sum();
    results.push(TestResult::check(
        "capacity_building_summary",
        rows.len() == 3 && seated == 5,
        rows.iter()
            .map(|r| format!("{} {}/{}", r.name, r.occupants, r.capacity))
            .collect::<Vec<_>>()
            .join(", "),
    ));

    if verbose {
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("could not serialize summary: {e}"),
        }
    }

    let nodes = scene::building_scene(
        &rows,
        None,
        config.default_floor_width as f32,
        config.default_floor_length as f32,
        &config.scene,
    );
    results.push(TestResult::check(
        "capacity_building_scene",
        nodes.len() == rows.len() * 5,
        format!("{} nodes", nodes.len()),
    ));

    results
}
