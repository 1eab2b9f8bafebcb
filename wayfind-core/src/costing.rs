//! Travel modes understood by the routing engine.
//!
//! # Examples
//! ```
//! use wayfind_core::Costing;
//!
//! assert_eq!(Costing::Pedestrian.as_str(), "pedestrian");
//! assert_eq!("AUTO".parse::<Costing>(), Ok(Costing::Auto));
//! ```

use serde::{Deserialize, Serialize};

/// Costing model passed to the engine with every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Costing {
    /// Private car.
    #[default]
    Auto,
    /// Bicycle.
    Bicycle,
    /// Walking.
    Pedestrian,
    /// Heavy goods vehicle.
    Truck,
    /// Scheduled bus.
    Bus,
    /// Moped or scooter.
    MotorScooter,
    /// Motorcycle.
    Motorcycle,
    /// Taxi, allowed on taxi lanes.
    Taxi,
}

impl Costing {
    /// Every costing model, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Auto,
        Self::Bicycle,
        Self::Pedestrian,
        Self::Truck,
        Self::Bus,
        Self::MotorScooter,
        Self::Motorcycle,
        Self::Taxi,
    ];

    /// Return the engine's name for this costing.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Bicycle => "bicycle",
            Self::Pedestrian => "pedestrian",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::MotorScooter => "motor_scooter",
            Self::Motorcycle => "motorcycle",
            Self::Taxi => "taxi",
        }
    }
}

impl std::fmt::Display for Costing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Costing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|costing| costing.as_str() == wanted)
            .ok_or_else(|| format!("unknown costing '{s}'"))
    }
}
