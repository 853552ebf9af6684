//! Generation status shared by plans and segments.

/// Raw wire code meaning "recommendations are ready".
pub const STATUS_READY: i32 = 1;
/// Raw wire code meaning "generation still running".
pub const STATUS_GENERATING: i32 = 0;

/// Tri-state derived from the raw `generated_status` code:
/// `< 0` unavailable (with an optional server message), `0` generating,
/// `>= 1` ready.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GenerationStatus {
    Generating,
    Ready,
    Unavailable { message: Option<String> },
}

impl GenerationStatus {
    pub fn from_code(code: i32, message: Option<&str>) -> Self {
        if code < 0 {
            GenerationStatus::Unavailable {
                message: message.map(str::to_owned),
            }
        } else if code == STATUS_GENERATING {
            GenerationStatus::Generating
        } else {
            GenerationStatus::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GenerationStatus::Ready)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, GenerationStatus::Generating)
    }

    /// Ready and unavailable are terminal: a later poll reporting
    /// "generating" does not regress them.
    pub fn is_terminal(&self) -> bool {
        !self.is_generating()
    }
}
