use thiserror::Error;

/// Why a single multiplier trial failed. None of these abort a search; they
/// only tell the caller to try a smaller multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasibility {
    #[error("crop '{crop}' would require {pieces} pieces which exceeds {rows} rows")]
    InfeasibleSplit {
        crop: String,
        pieces: u64,
        rows: usize,
    },

    #[error("total required length {required} in exceeds garden capacity {capacity} in")]
    CapacityExceeded { required: u64, capacity: u64 },

    #[error("no packing found for {pieces} pieces (exact search failed)")]
    PackingInfeasible { pieces: usize },

    #[error("crop '{crop}' needs a length too large to represent")]
    LengthOverflow { crop: String },
}

/// Errors that stop a planning run.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("multiplier search exceeded the ceiling {ceiling} without finding an infeasible multiplier")]
    SearchExhausted { ceiling: f64 },

    #[error("no feasible packing found")]
    NoFeasiblePacking,

    #[error("failed to read crop file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse crop file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
