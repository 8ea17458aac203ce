//! Office layout JSON: the import/export file format.
//!
//! A layout is a free-form description of one floor in world units: wall
//! segments, desk positions and up to three rectangular zones (kitchen, WC,
//! hallway). Zones are stored as a `start`/`end` corner pair.
//!
//! ```json
//! { "office": {
//!     "walls": [{ "start": { "x": 0, "y": 0 }, "end": { "x": 20, "y": 0 } }],
//!     "desks": [{ "id": 1, "position": { "x": 2, "y": 2 } }],
//!     "kitchen": { "start": { "x": 1, "y": 1 }, "end": { "x": 5, "y": 3 } },
//!     "dimensions": { "width": 20, "length": 12 }
//! } }
//! ```
//!
//! [`rasterize`] turns a layout into an [`OccupancyGrid`] and [`export`] goes
//! the other way from a [`FloorPlan`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ItemKind, ItemSpec, ObjectType};
use crate::constants::object_types;
use crate::floor::FloorPlan;
use crate::grid::{Cell, Footprint, GridError, OccupancyGrid, MAX_CELLS};
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("layout has no dimensions")]
    MissingDimensions,
    #[error("invalid layout dimensions {width}×{length}")]
    InvalidDimensions { width: f64, length: f64 },
    #[error("layout {width}×{length} exceeds {max} cells")]
    TooLarge { width: f64, length: f64, max: u64 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A wall, or a zone's corner pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        dx.hypot(dy)
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Whether `end` lies before `start` on either axis.
    pub fn is_inverted(&self) -> bool {
        self.end.x < self.start.x || self.end.y < self.start.y
    }

    /// Same rectangle with `start` at the minimum corner.
    pub fn normalized(&self) -> Self {
        Self {
            start: Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            end: Point::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        }
    }

    fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Desk {
    pub id: u64,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Office {
    #[serde(default)]
    pub walls: Vec<Segment>,
    #[serde(default)]
    pub desks: Vec<Desk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wc: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hallway: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

/// Top-level layout document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OfficeLayout {
    pub office: Office,
}

impl OfficeLayout {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Zones present in the layout, with the area type each one maps to.
    pub fn zones(&self) -> impl Iterator<Item = (ObjectType, &Segment)> {
        [
            (ObjectType::Kitchen, self.office.kitchen.as_ref()),
            (ObjectType::Wc, self.office.wc.as_ref()),
            (ObjectType::Pathway, self.office.hallway.as_ref()),
        ]
        .into_iter()
        .filter_map(|(t, zone)| zone.map(|z| (t, z)))
    }
}

fn zone_field(t: ObjectType) -> &'static str {
    match t {
        ObjectType::Kitchen => "kitchen",
        ObjectType::Wc => "wc",
        _ => "hallway",
    }
}

/// Perimeter walls of a `width × length` rectangle, clockwise from the origin.
pub fn perimeter_walls(width: f64, length: f64) -> Vec<Segment> {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, length),
        Point::new(0.0, length),
    ];
    (0..4)
        .map(|i| Segment::new(corners[i], corners[(i + 1) % 4]))
        .collect()
}

fn check_dimensions(width: f64, length: f64) -> Result<(), LayoutError> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !(ok(width) && ok(length)) {
        return Err(LayoutError::InvalidDimensions { width, length });
    }
    if width.ceil() * length.ceil() > MAX_CELLS as f64 {
        return Err(LayoutError::TooLarge {
            width,
            length,
            max: MAX_CELLS,
        });
    }
    Ok(())
}

/// Number of steps `start + i * step` that stay strictly below `end`.
fn steps_below(start: f64, end: f64, step: f64) -> u64 {
    ((end - start) / step).ceil().max(0.0) as u64
}

/// Generate a starter layout for an empty floor.
///
/// Outer walls on the perimeter, a kitchen and a WC each taking a fifth of
/// the floor in the two corners at `y = 1`, a vertical hallway through the
/// middle (15% of the width) and desks on a 2-unit grid everywhere else.
pub fn generate_layout(width: f64, length: f64) -> Result<OfficeLayout, LayoutError> {
    check_dimensions(width, length)?;
    let margin = 1.0;
    let spacing = 2.0;

    let kitchen = Segment::new(
        Point::new(margin, margin),
        Point::new(margin + width * 0.2, margin + length * 0.2),
    );
    let wc = Segment::new(
        Point::new(width - margin - width * 0.2, margin),
        Point::new(width - margin, margin + length * 0.2),
    );
    let hallway_width = width * 0.15;
    let hallway = Segment::new(
        Point::new((width - hallway_width) / 2.0, margin),
        Point::new((width + hallway_width) / 2.0, length - margin),
    );

    let inside = |zone: &Segment, p: Point| {
        p.x >= zone.start.x && p.x <= zone.end.x && p.y >= zone.start.y && p.y <= zone.end.y
    };

    let first = margin + spacing / 2.0;
    let columns = steps_below(first, width - margin, spacing);
    let rows = steps_below(first, length - margin, spacing);

    let mut desks = Vec::new();
    for i in 0..columns {
        let x = first + i as f64 * spacing;
        if x >= hallway.start.x && x <= hallway.end.x {
            continue;
        }
        for j in 0..rows {
            let p = Point::new(x, first + j as f64 * spacing);
            if !inside(&kitchen, p) && !inside(&wc, p) {
                desks.push(Desk {
                    id: desks.len() as u64 + 1,
                    position: p,
                });
            }
        }
    }

    Ok(OfficeLayout {
        office: Office {
            walls: perimeter_walls(width, length),
            desks,
            kitchen: Some(kitchen),
            wc: Some(wc),
            hallway: Some(hallway),
            dimensions: Some(Dimensions { width, length }),
        },
    })
}

/// Check a layout before import. Collects every finding.
pub fn validate_layout(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let office = &layout.office;

    for (i, wall) in office.walls.iter().enumerate() {
        if !wall.is_finite() {
            errors.push(ValidationError::error(
                "layout_walls",
                format!("wall {i} has non-finite coordinates"),
            ));
        } else if wall.length() == 0.0 {
            errors.push(ValidationError::warning(
                "layout_walls",
                format!("wall {i} has zero length"),
            ));
        }
    }

    let mut seen = BTreeSet::new();
    for desk in &office.desks {
        if !seen.insert(desk.id) {
            errors.push(ValidationError::error(
                "layout_desks",
                format!("duplicate desk id {}", desk.id),
            ));
        }
        if !desk.position.is_finite() {
            errors.push(ValidationError::error(
                "layout_desks",
                format!("desk {} has non-finite position", desk.id),
            ));
        }
    }

    for (t, zone) in layout.zones() {
        if !zone.is_finite() {
            errors.push(ValidationError::error(
                "layout_zones",
                format!("{} has non-finite corners", zone_field(t)),
            ));
        } else if zone.is_inverted() {
            errors.push(ValidationError::warning(
                "layout_zones",
                format!("{} corners are inverted", zone_field(t)),
            ));
        }
    }

    let Some(dims) = office.dimensions else {
        errors.push(ValidationError::warning(
            "layout_dimensions",
            "no dimensions; layout cannot be rasterized",
        ));
        return errors;
    };
    if check_dimensions(dims.width, dims.length).is_err() {
        errors.push(ValidationError::error(
            "layout_dimensions",
            format!("non-positive dimensions {}×{}", dims.width, dims.length),
        ));
        return errors;
    }

    let within = |p: Point| p.x >= 0.0 && p.y >= 0.0 && p.x <= dims.width && p.y <= dims.length;
    for desk in &office.desks {
        if desk.position.is_finite() && !within(desk.position) {
            errors.push(ValidationError::error(
                "layout_desks",
                format!(
                    "desk {} at ({}, {}) is outside the {}×{} floor",
                    desk.id, desk.position.x, desk.position.y, dims.width, dims.length
                ),
            ));
        }
    }
    for (t, zone) in layout.zones() {
        if zone.is_finite() && !(within(zone.start) && within(zone.end)) {
            errors.push(ValidationError::error(
                "layout_zones",
                format!("{} extends outside the floor", zone_field(t)),
            ));
        }
    }

    errors
}

/// Whole cells fully inside `zone`, clipped to the grid.
fn zone_cells(zone: &Segment, grid: &OccupancyGrid) -> Option<(Cell, Footprint)> {
    let z = zone.normalized();
    let col0 = z.start.x.max(0.0).ceil();
    let row0 = z.start.y.max(0.0).ceil();
    let col1 = z.end.x.floor().min(f64::from(grid.width()));
    let row1 = z.end.y.floor().min(f64::from(grid.length()));
    if col1 <= col0 || row1 <= row0 {
        return None;
    }
    Some((
        Cell::new(row0 as u32, col0 as u32),
        Footprint::new((col1 - col0) as u32, (row1 - row0) as u32),
    ))
}

/// Build an occupancy grid from a layout.
///
/// The grid is `ceil(width) × ceil(length)`. Zones cover the whole cells
/// inside their rectangle and are placed first; each desk then becomes a
/// one-cell workspace at the cell containing its position. Zones too small to
/// cover a cell and desks that collide are skipped and reported as warnings.
pub fn rasterize(layout: &OfficeLayout) -> Result<(OccupancyGrid, Vec<ValidationError>), LayoutError> {
    let dims = layout
        .office
        .dimensions
        .ok_or(LayoutError::MissingDimensions)?;
    check_dimensions(dims.width, dims.length)?;
    let mut grid = OccupancyGrid::new(dims.width.ceil() as u32, dims.length.ceil() as u32)?;
    let mut skipped = Vec::new();

    for (t, zone) in layout.zones() {
        if !zone.is_finite() {
            continue;
        }
        let Some((anchor, footprint)) = zone_cells(zone, &grid) else {
            skipped.push(ValidationError::warning(
                "layout_zones",
                format!("{} covers no whole cell", zone_field(t)),
            ));
            continue;
        };
        let spec = ItemSpec::custom(ItemKind::Zone(t), t.name(), footprint);
        if let Err(e) = grid.place(spec, anchor) {
            skipped.push(ValidationError::warning(
                "layout_zones",
                format!("{} not placed: {e}", zone_field(t)),
            ));
        }
    }

    for desk in &layout.office.desks {
        let p = desk.position;
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            skipped.push(ValidationError::warning(
                "layout_desks",
                format!("desk {} is off the grid", desk.id),
            ));
            continue;
        }
        let anchor = Cell::new(p.y.floor() as u32, p.x.floor() as u32);
        let spec = ItemSpec::custom(
            ItemKind::Zone(ObjectType::Workspace),
            format!("Desk {}", desk.id),
            Footprint::UNIT,
        );
        if let Err(e) = grid.place(spec, anchor) {
            skipped.push(ValidationError::warning(
                "layout_desks",
                format!("desk {} not placed: {e}", desk.id),
            ));
        }
    }

    for w in &skipped {
        log::warn!("rasterize: {w}");
    }
    Ok((grid, skipped))
}

/// Describe a floor plan as a layout document.
///
/// Every workspace cell becomes a desk at the cell centre, numbered in
/// row-major order. The first kitchen, WC and pathway become the three zones;
/// further zones of the same type and furniture have no place in the format
/// and are left out.
pub fn export(plan: &FloorPlan) -> OfficeLayout {
    let grid = plan.grid();
    let width = f64::from(grid.width());
    let length = f64::from(grid.length());

    let mut desks = Vec::new();
    for (index, slot) in grid.cells().iter().enumerate() {
        let is_workspace = slot
            .and_then(|h| grid.item(h))
            .is_some_and(|item| item.spec.kind.is_workspace());
        let Some(cell) = grid.cell_at(index).filter(|_| is_workspace) else {
            continue;
        };
        desks.push(Desk {
            id: desks.len() as u64 + 1,
            position: Point::new(f64::from(cell.col) + 0.5, f64::from(cell.row) + 0.5),
        });
    }

    let zone_of = |code: u8| {
        grid.items()
            .find(|item| item.spec.kind.code() == code)
            .map(|item| {
                let fp = item.footprint();
                Segment::new(
                    Point::new(f64::from(item.anchor.col), f64::from(item.anchor.row)),
                    Point::new(
                        f64::from(item.anchor.col + fp.width),
                        f64::from(item.anchor.row + fp.height),
                    ),
                )
            })
    };

    let dropped = grid
        .items()
        .filter(|item| !item.spec.kind.is_workspace())
        .count()
        .saturating_sub(
            [object_types::KITCHEN, object_types::WC, object_types::PATHWAY]
                .into_iter()
                .filter(|&c| zone_of(c).is_some())
                .count(),
        );
    if dropped > 0 {
        log::debug!(
            "{}: {} item(s) have no layout equivalent",
            plan.floor().name(),
            dropped
        );
    }

    OfficeLayout {
        office: Office {
            walls: perimeter_walls(width, length),
            desks,
            kitchen: zone_of(object_types::KITCHEN),
            wc: zone_of(object_types::WC),
            hallway: zone_of(object_types::PATHWAY),
            dimensions: Some(Dimensions { width, length }),
        },
    }
}
