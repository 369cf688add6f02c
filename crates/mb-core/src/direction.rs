//! Row direction tags.
//!
//! Every calculation row tags its known and unknown sides with one of six
//! single-letter directions saying where a quantity is read from or written
//! to during balancing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Where a flow quantity lives during balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `i`: crosses the process boundary inward.
    Inflow,
    /// `o`: crosses the process boundary outward.
    Outflow,
    /// `t`: internal intermediate, kept for later rows but not reported.
    Temp,
    /// `d`: computed and thrown away.
    Discard,
    /// `e`: emission, accumulated and folded into outflows.
    Emission,
    /// `c`: co-inflow, accumulated and folded into inflows.
    CoInflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction tag '{token}'")]
pub struct UnknownDirection {
    pub token: String,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Inflow,
        Direction::Outflow,
        Direction::Temp,
        Direction::Discard,
        Direction::Emission,
        Direction::CoInflow,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Direction::Inflow => "i",
            Direction::Outflow => "o",
            Direction::Temp => "t",
            Direction::Discard => "d",
            Direction::Emission => "e",
            Direction::CoInflow => "c",
        }
    }

    /// Long name for error messages and logs.
    pub fn word(&self) -> &'static str {
        match self {
            Direction::Inflow => "inflow",
            Direction::Outflow => "outflow",
            Direction::Temp => "temp",
            Direction::Discard => "discard",
            Direction::Emission => "emission",
            Direction::CoInflow => "co-inflow",
        }
    }

    /// Emission and co-inflow entries accumulate across rows; every other
    /// destination overwrites.
    pub fn accumulates(&self) -> bool {
        matches!(self, Direction::Emission | Direction::CoInflow)
    }

    /// Only boundary directions can seed a balance or anchor a chain target.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Direction::Inflow | Direction::Outflow)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "i" | "in" | "inflow" => Ok(Direction::Inflow),
            "o" | "out" | "outflow" => Ok(Direction::Outflow),
            "t" | "temp" => Ok(Direction::Temp),
            "d" | "discard" => Ok(Direction::Discard),
            "e" | "emission" => Ok(Direction::Emission),
            "c" | "coinflow" | "co-inflow" => Ok(Direction::CoInflow),
            other => Err(UnknownDirection {
                token: other.to_string(),
            }),
        }
    }
}
