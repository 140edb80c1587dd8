use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Claim status of an order. `Taken` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unassigned,
    Taken,
}

impl OrderStatus {
    /// Storage encoding: 0 = unassigned, 1 = taken.
    pub const fn code(self) -> u8 {
        match self {
            OrderStatus::Unassigned => 0,
            OrderStatus::Taken => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OrderStatus::Unassigned),
            1 => Some(OrderStatus::Taken),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            OrderStatus::Unassigned => "UNASSIGNED",
            OrderStatus::Taken => "TAKEN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_meters: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Distance formatted for presentation, e.g. `467560.00`.
    pub fn display_distance(&self) -> String {
        format!("{:.2}", self.distance_meters as f64)
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id,
            distance: self.distance_meters,
            status: self.status.label(),
        }
    }
}

/// Row returned by the order listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub distance: u64,
    pub status: &'static str,
}

/// Result of the store's conditional `UNASSIGNED -> TAKEN` write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned,
    NotFound,
    AlreadyTaken,
}
