pub mod estimate;
pub mod order;

pub use estimate::{EstimateBook, TwapEstimate};
pub use order::{TwapOrder, ValueBasis};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse the side codes seen on the order feed. HyperLiquid reports
    /// bids as `B` and asks as `A`; older payloads spell the words out.
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "B" | "BUY" | "BID" => Some(Side::Buy),
            "A" | "S" | "SELL" | "ASK" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}
