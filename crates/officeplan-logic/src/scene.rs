//! Renderer-agnostic 3D scene description.
//!
//! The 3D views draw nothing but axis-aligned boxes and flat planes, so the
//! scene is a flat list of [`SceneNode`]s that any renderer can consume.
//! World axes: `x` runs along grid columns, `z` along grid rows, `y` is up.

use serde::{Deserialize, Serialize};

use crate::capacity::{heat_hsl, FloorSummary};
use crate::catalog::{ItemKind, ObjectType};
use crate::constants::scene as dims;
use crate::floor::FloorPlan;
use crate::grid::PlacedItem;
use crate::layout::{OfficeLayout, Segment};

/// Scene dimensions in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Storey height in the building view.
    pub floor_height: f32,
    /// Thickness of floor plates and building walls.
    pub wall_thickness: f32,
    /// Lift of the ground floor above y = 0.
    pub building_offset: f32,
    /// World size of one grid cell.
    pub cell_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            floor_height: dims::FLOOR_HEIGHT,
            wall_thickness: dims::WALL_THICKNESS,
            building_offset: dims::BUILDING_OFFSET,
            cell_size: dims::CELL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Box,
    /// Horizontal plane; `size[1]` is zero.
    Plane,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub shape: Shape,
    pub center: [f32; 3],
    pub size: [f32; 3],
    /// Rotation about the vertical axis, radians.
    pub rotation_y: f32,
    /// CSS color string.
    pub color: String,
}

impl SceneNode {
    fn cuboid(name: impl Into<String>, center: [f32; 3], size: [f32; 3], color: &str) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Box,
            center,
            size,
            rotation_y: 0.0,
            color: color.to_string(),
        }
    }

    fn plane(name: impl Into<String>, center: [f32; 3], extent: [f32; 2], color: &str) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Plane,
            center,
            size: [extent[0], 0.0, extent[1]],
            rotation_y: 0.0,
            color: color.to_string(),
        }
    }

    /// Height of the top face.
    pub fn top(&self) -> f32 {
        self.center[1] + self.size[1] / 2.0
    }
}

const FLOOR_COLOR: &str = "#222";
const WALL_COLOR: &str = "#555";
const DESK_COLOR: &str = "#00e6ff";
const TABLE_COLOR: &str = "#8b4513";
const HIGHLIGHT_COLOR: &str = "#00ff00";

fn furniture_color(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Cabinet => "#666666",
        ItemKind::Door => "#a0522d",
        ItemKind::Zone(t) => t.color(),
        _ => TABLE_COLOR,
    }
}

/// Layout zone colors, distinct from the grid zone palette.
fn layout_zone_color(t: ObjectType) -> &'static str {
    match t {
        ObjectType::Kitchen => "#ff7f50",
        ObjectType::Wc => "#8a2be2",
        _ => "#39ff14",
    }
}

fn item_node(item: &PlacedItem, cell: f32) -> SceneNode {
    let fp = item.footprint();
    let w = fp.width as f32 * cell;
    let d = fp.height as f32 * cell;
    let x = item.anchor.col as f32 * cell + w / 2.0;
    let z = item.anchor.row as f32 * cell + d / 2.0;
    let kind = item.spec.kind;
    if kind.is_furniture() {
        SceneNode::cuboid(
            item.spec.label.clone(),
            [x, dims::ITEM_HEIGHT / 2.0, z],
            [w, dims::ITEM_HEIGHT, d],
            furniture_color(kind),
        )
    } else {
        SceneNode::plane(
            item.spec.label.clone(),
            [x, dims::ZONE_ELEVATION, z],
            [w, d],
            furniture_color(kind),
        )
    }
}

/// One floor: the plate, a plane per zone and a box per piece of furniture.
pub fn floor_plan_scene(plan: &FloorPlan, cfg: &SceneConfig) -> Vec<SceneNode> {
    let grid = plan.grid();
    let w = grid.width() as f32 * cfg.cell_size;
    let d = grid.length() as f32 * cfg.cell_size;
    let mut nodes = Vec::with_capacity(grid.item_count() + 1);
    nodes.push(SceneNode::plane(
        plan.floor().name(),
        [w / 2.0, 0.0, d / 2.0],
        [w, d],
        FLOOR_COLOR,
    ));
    nodes.extend(grid.items().map(|item| item_node(item, cfg.cell_size)));
    nodes
}

fn wall_node(index: usize, wall: &Segment) -> SceneNode {
    let mid = wall.midpoint();
    let dx = wall.end.x - wall.start.x;
    let dy = wall.end.y - wall.start.y;
    SceneNode {
        rotation_y: -(dy.atan2(dx) as f32),
        ..SceneNode::cuboid(
            format!("wall {index}"),
            [mid.x as f32, dims::LAYOUT_WALL_HEIGHT / 2.0, mid.y as f32],
            [
                wall.length() as f32,
                dims::LAYOUT_WALL_HEIGHT,
                dims::LAYOUT_WALL_THICKNESS,
            ],
            WALL_COLOR,
        )
    }
}

/// A layout document: walls, unit-cube desks and flat zones.
pub fn layout_scene(layout: &OfficeLayout) -> Vec<SceneNode> {
    let office = &layout.office;
    let mut nodes = Vec::new();
    if let Some(d) = office.dimensions {
        // Floor overhangs the walls by one unit each side.
        let (w, l) = (d.width as f32, d.length as f32);
        nodes.push(SceneNode::plane(
            "floor",
            [w / 2.0, 0.0, l / 2.0],
            [w + 2.0, l + 2.0],
            FLOOR_COLOR,
        ));
    }
    nodes.extend(office.walls.iter().enumerate().map(|(i, w)| wall_node(i, w)));
    nodes.extend(office.desks.iter().map(|desk| {
        SceneNode::cuboid(
            format!("desk {}", desk.id),
            [desk.position.x as f32, 0.5, desk.position.y as f32],
            [1.0, 1.0, 1.0],
            DESK_COLOR,
        )
    }));
    nodes.extend(layout.zones().map(|(t, zone)| {
        let z = zone.normalized();
        let mid = z.midpoint();
        SceneNode::plane(
            t.name(),
            [mid.x as f32, dims::ZONE_ELEVATION, mid.y as f32],
            [(z.end.x - z.start.x) as f32, (z.end.y - z.start.y) as f32],
            layout_zone_color(t),
        )
    }));
    nodes
}

/// CSS `hsl()` string from unit-range components.
pub fn hsl_css((h, s, l): (f32, f32, f32)) -> String {
    format!(
        "hsl({:.0}, {:.0}%, {:.0}%)",
        h * 360.0,
        s * 100.0,
        l * 100.0
    )
}

/// Stacked building: per floor a plate plus four perimeter walls.
///
/// Floors are stacked in the given order, centred on the origin. Plates are
/// tinted by occupancy; `highlight` marks one floor (e.g. the viewer's own).
pub fn building_scene(
    floors: &[FloorSummary],
    highlight: Option<u32>,
    width: f32,
    depth: f32,
    cfg: &SceneConfig,
) -> Vec<SceneNode> {
    let t = cfg.wall_thickness;
    let h = cfg.floor_height;
    let mut nodes = Vec::with_capacity(floors.len() * 5);
    for (index, summary) in floors.iter().enumerate() {
        let base = index as f32 * h + cfg.building_offset;
        let color = if highlight == Some(summary.floor_id) {
            HIGHLIGHT_COLOR.to_string()
        } else {
            let fallback = if summary.occupants > 0 { 1.0 } else { 0.0 };
            hsl_css(heat_hsl(summary.ratio().unwrap_or(fallback)))
        };
        let mid = base + h / 2.0;
        let mut group = vec![
            SceneNode::cuboid(summary.name.clone(), [0.0, base, 0.0], [width, t, depth], &color),
            SceneNode::cuboid("front", [0.0, mid, depth / 2.0 - t / 2.0], [width, h, t], &color),
            SceneNode::cuboid("back", [0.0, mid, -depth / 2.0 + t / 2.0], [width, h, t], &color),
            SceneNode::cuboid("left", [-width / 2.0 + t / 2.0, mid, 0.0], [t, h, depth], &color),
            SceneNode::cuboid("right", [width / 2.0 - t / 2.0, mid, 0.0], [t, h, depth], &color),
        ];
        for node in &mut group[1..] {
            node.name = format!("{} {} wall", summary.name, node.name);
        }
        nodes.append(&mut group);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CapacityTier;
    use crate::catalog::ItemSpec;
    use crate::constants::object_types;
    use crate::floor::Floor;
    use crate::grid::{Cell, Footprint};
    use crate::layout::{generate_layout, Point};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn plan() -> FloorPlan {
        let mut plan = FloorPlan::new(Floor {
            id: 1,
            building_id: 1,
            number: 0,
            width: 6,
            length: 4,
            capacity: 4,
        })
        .unwrap();
        plan.place(ItemSpec::menu(ItemKind::TableLarge), Cell::new(1, 2))
            .unwrap();
        plan.place(
            ItemSpec::zone(object_types::KITCHEN, Footprint::new(2, 4)).unwrap(),
            Cell::new(0, 0),
        )
        .unwrap();
        plan
    }

    #[test]
    fn floor_scene_centres_items_on_footprint() {
        let nodes = floor_plan_scene(&plan(), &SceneConfig::default());
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].name, "Floor 0");
        assert_eq!(nodes[0].size, [6.0, 0.0, 4.0]);

        let table = nodes.iter().find(|n| n.name == "Table Large").unwrap();
        assert_eq!(table.shape, Shape::Box);
        // 3×2 at row 1, col 2: x spans 2..5, z spans 1..3.
        assert!(close(table.center[0], 3.5));
        assert!(close(table.center[2], 2.0));
        assert!(close(table.top(), dims::ITEM_HEIGHT));

        let kitchen = nodes.iter().find(|n| n.name == "Kitchen").unwrap();
        assert_eq!(kitchen.shape, Shape::Plane);
        assert_eq!(kitchen.color, "green");
    }

    #[test]
    fn cell_size_scales_scene() {
        let cfg = SceneConfig {
            cell_size: 2.0,
            ..SceneConfig::default()
        };
        let nodes = floor_plan_scene(&plan(), &cfg);
        let table = nodes.iter().find(|n| n.name == "Table Large").unwrap();
        assert!(close(table.center[0], 7.0));
        assert_eq!(table.size[0], 6.0);
    }

    #[test]
    fn walls_follow_segments() {
        let layout = generate_layout(10.0, 6.0).unwrap();
        let nodes = layout_scene(&layout);
        let walls: Vec<&SceneNode> = nodes.iter().filter(|n| n.name.starts_with("wall")).collect();
        assert_eq!(walls.len(), 4);
        // Bottom wall (0,0)->(10,0).
        assert!(close(walls[0].center[0], 5.0));
        assert!(close(walls[0].center[1], 1.5));
        assert!(close(walls[0].size[0], 10.0));
        assert!(close(walls[0].rotation_y, 0.0));
        // Right wall (10,0)->(10,6) runs along +z.
        assert!(close(walls[1].rotation_y, -std::f32::consts::FRAC_PI_2));
        assert!(close(walls[1].size[0], 6.0));
    }

    #[test]
    fn desks_and_zones_in_layout_scene() {
        let mut layout = OfficeLayout::default();
        layout.office.desks.push(crate::layout::Desk {
            id: 7,
            position: Point::new(3.0, 4.0),
        });
        layout.office.wc = Some(Segment::new(Point::new(4.0, 2.0), Point::new(2.0, 0.0)));
        let nodes = layout_scene(&layout);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].center, [3.0, 0.5, 4.0]);
        assert_eq!(nodes[1].center, [3.0, dims::ZONE_ELEVATION, 1.0]);
        assert_eq!(nodes[1].size, [2.0, 0.0, 2.0]);
        assert_eq!(nodes[1].color, "#8a2be2");
    }

    #[test]
    fn building_floors_stack() {
        let summary = |floor_id, occupants, capacity| FloorSummary {
            floor_id,
            number: floor_id,
            name: format!("Floor {floor_id}"),
            area: 100,
            occupants,
            capacity,
            tier: CapacityTier::Low,
            users: Vec::new(),
        };
        let floors = vec![summary(0, 0, 10), summary(1, 10, 10), summary(2, 1, 0)];
        let cfg = SceneConfig::default();
        let nodes = building_scene(&floors, Some(2), 20.0, 12.0, &cfg);
        assert_eq!(nodes.len(), 15);
        assert!(close(nodes[0].center[1], cfg.building_offset));
        assert!(close(nodes[5].center[1], cfg.floor_height + cfg.building_offset));
        assert_eq!(nodes[0].color, "hsl(108, 80%, 80%)");
        assert_eq!(nodes[5].color, "hsl(0, 80%, 50%)");
        assert_eq!(nodes[10].color, HIGHLIGHT_COLOR);
        assert_eq!(nodes[6].name, "Floor 1 front wall");
    }
}
