use serde::Serialize;

/// Read-only projection of where the user is within a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    current: u32,
    total: u32,
    percentage: u8,
}

impl Progress {
    /// `current` is 1-based and is clamped into `[1, total]`. A zero-length
    /// quiz reports `0 of 0` at 0%.
    pub fn new(current: u32, total: u32) -> Self {
        if total == 0 {
            return Self {
                current: 0,
                total: 0,
                percentage: 0,
            };
        }
        let current = current.clamp(1, total);
        let percentage = ((u64::from(current) * 100 + u64::from(total) / 2) / u64::from(total)) as u8;
        Self {
            current,
            total,
            percentage,
        }
    }

    /// Uses a percentage computed elsewhere, clamped to 100.
    pub fn with_percentage(current: u32, total: u32, percentage: u32) -> Self {
        let base = Self::new(current, total);
        Self {
            percentage: percentage.min(100) as u8,
            ..base
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    pub fn position_label(&self) -> String {
        format!("Question {} of {}", self.current, self.total)
    }

    pub fn completion_label(&self) -> String {
        format!("{}% Complete", self.percentage)
    }
}
