//! Floor occupancy against capacity.
//!
//! Drives the building dashboard: each floor gets a ratio of seated
//! personnel to capacity, a three-step tier for the 2D capacity view, and a
//! continuous hue for the 3D building view.

use serde::{Deserialize, Serialize};

use crate::constants::capacity::{HIGH_THRESHOLD, MEDIUM_THRESHOLD};
use crate::floor::{Floor, Personnel};

/// Tier boundaries as occupancy ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityThresholds {
    pub medium: f32,
    pub high: f32,
}

impl Default for CapacityThresholds {
    fn default() -> Self {
        Self {
            medium: MEDIUM_THRESHOLD,
            high: HIGH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityTier {
    /// Below the medium threshold.
    Low,
    Medium,
    /// At or above the high threshold.
    High,
}

impl CapacityTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Below 50% Capacity",
            Self::Medium => "50% - 80% Capacity",
            Self::High => "80%+ Capacity",
        }
    }

    /// RGBA fill used by the 2D capacity boxes.
    pub fn rgba(self) -> [f32; 4] {
        match self {
            Self::Low => [0.0, 1.0, 0.0, 0.8],
            Self::Medium => [1.0, 1.0, 0.0, 0.8],
            Self::High => [1.0, 0.0, 0.0, 0.8],
        }
    }
}

/// Occupants per unit of capacity. `None` when capacity is zero.
pub fn occupancy_ratio(occupants: u32, capacity: u32) -> Option<f32> {
    if capacity == 0 {
        return None;
    }
    Some(occupants as f32 / capacity as f32)
}

/// Tier for a floor. A zero-capacity floor is `High` as soon as anyone sits on it.
pub fn classify(occupants: u32, capacity: u32, thresholds: &CapacityThresholds) -> CapacityTier {
    match occupancy_ratio(occupants, capacity) {
        None if occupants > 0 => CapacityTier::High,
        None => CapacityTier::Low,
        Some(r) if r < thresholds.medium => CapacityTier::Low,
        Some(r) if r < thresholds.high => CapacityTier::Medium,
        Some(_) => CapacityTier::High,
    }
}

/// Hue/saturation/lightness for the 3D floor plate, each in `0.0..=1.0`.
///
/// Green at empty, shifting to red and darker as the floor fills.
pub fn heat_hsl(ratio: f32) -> (f32, f32, f32) {
    let r = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let shift = 0.3 - r * 0.3;
    (shift, 0.8, 0.5 + shift)
}

/// Per-floor dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub floor_id: u32,
    pub number: u32,
    pub name: String,
    pub area: u64,
    pub occupants: u32,
    pub capacity: u32,
    pub tier: CapacityTier,
    /// Full names of seated personnel, sorted.
    pub users: Vec<String>,
}

impl FloorSummary {
    pub fn ratio(&self) -> Option<f32> {
        occupancy_ratio(self.occupants, self.capacity)
    }
}

/// Summarize one floor from the personnel assigned to it.
pub fn summarize_floor(
    floor: &Floor,
    personnel: &[Personnel],
    thresholds: &CapacityThresholds,
) -> FloorSummary {
    let mut users: Vec<String> = personnel
        .iter()
        .filter(|p| p.floor_id == Some(floor.id))
        .map(Personnel::full_name)
        .collect();
    users.sort();
    let occupants = users.len() as u32;
    FloorSummary {
        floor_id: floor.id,
        number: floor.number,
        name: floor.name(),
        area: floor.area(),
        occupants,
        capacity: floor.capacity,
        tier: classify(occupants, floor.capacity, thresholds),
        users,
    }
}

/// Summaries for every floor of `building_id`, ordered bottom-up.
pub fn summarize_building(
    building_id: u32,
    floors: &[Floor],
    personnel: &[Personnel],
    thresholds: &CapacityThresholds,
) -> Vec<FloorSummary> {
    let mut own: Vec<&Floor> = floors
        .iter()
        .filter(|f| f.building_id == building_id)
        .collect();
    own.sort_by_key(|f| (f.number, f.id));
    own.into_iter()
        .map(|f| summarize_floor(f, personnel, thresholds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(id: u32, number: u32, capacity: u32) -> Floor {
        Floor {
            id,
            building_id: 1,
            number,
            width: 10,
            length: 10,
            capacity,
        }
    }

    fn person(id: u64, floor_id: Option<u32>, name: &str) -> Personnel {
        Personnel {
            floor_id,
            x_coor: floor_id.map(|_| 0),
            y_coor: floor_id.map(|_| 0),
            ..Personnel::new(id, name, "Doe", "x@example.com")
        }
    }

    #[test]
    fn ratio_handles_zero_capacity() {
        assert_eq!(occupancy_ratio(3, 0), None);
        assert_eq!(occupancy_ratio(1, 4), Some(0.25));
    }

    #[test]
    fn tiers_at_boundaries() {
        let t = CapacityThresholds::default();
        assert_eq!(classify(0, 10, &t), CapacityTier::Low);
        assert_eq!(classify(4, 10, &t), CapacityTier::Low);
        assert_eq!(classify(5, 10, &t), CapacityTier::Medium);
        assert_eq!(classify(7, 10, &t), CapacityTier::Medium);
        assert_eq!(classify(8, 10, &t), CapacityTier::High);
        assert_eq!(classify(12, 10, &t), CapacityTier::High);
    }

    #[test]
    fn zero_capacity_tiers() {
        let t = CapacityThresholds::default();
        assert_eq!(classify(0, 0, &t), CapacityTier::Low);
        assert_eq!(classify(1, 0, &t), CapacityTier::High);
    }

    #[test]
    fn heat_goes_from_green_to_red() {
        let (h0, s0, l0) = heat_hsl(0.0);
        assert!((h0 - 0.3).abs() < 1e-6);
        assert!((s0 - 0.8).abs() < 1e-6);
        assert!((l0 - 0.8).abs() < 1e-6);
        let (h1, _, l1) = heat_hsl(1.0);
        assert!(h1.abs() < 1e-6);
        assert!((l1 - 0.5).abs() < 1e-6);
        assert_eq!(heat_hsl(3.0), heat_hsl(1.0));
        assert_eq!(heat_hsl(f32::NAN), heat_hsl(1.0));
    }

    #[test]
    fn building_summary_orders_floors() {
        let floors = vec![floor(20, 1, 4), floor(10, 0, 2), {
            let mut other = floor(30, 0, 9);
            other.building_id = 2;
            other
        }];
        let personnel = vec![
            person(1, Some(10), "Zed"),
            person(2, Some(10), "Amy"),
            person(3, Some(20), "Bob"),
            person(4, None, "Unplaced"),
        ];
        let rows = summarize_building(1, &floors, &personnel, &CapacityThresholds::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Floor 0");
        assert_eq!(rows[0].users, vec!["Amy Doe", "Zed Doe"]);
        assert_eq!(rows[0].tier, CapacityTier::High);
        assert_eq!(rows[1].occupants, 1);
        assert_eq!(rows[1].tier, CapacityTier::Low);
        assert_eq!(rows[1].ratio(), Some(0.25));
    }
}
