use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Emergency lifecycle, `Idle -> Detected -> Routing -> Active -> Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyPhase {
    #[default]
    Idle,
    Detected,
    Routing,
    Active,
    Resolved,
}

impl EmergencyPhase {
    pub fn has_ambulance(self) -> bool {
        self != EmergencyPhase::Idle
    }

    pub fn accepts_injection(self) -> bool {
        matches!(self, EmergencyPhase::Idle | EmergencyPhase::Resolved)
    }
}

impl fmt::Display for EmergencyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmergencyPhase::Idle => "IDLE",
            EmergencyPhase::Detected => "DETECTED",
            EmergencyPhase::Routing => "ROUTING",
            EmergencyPhase::Active => "ACTIVE",
            EmergencyPhase::Resolved => "RESOLVED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("emergency already in progress (phase {0})")]
    EmergencyInProgress(EmergencyPhase),

    #[error("cannot {command} while in phase {phase}, expected {expected}")]
    OutOfOrder {
        command: &'static str,
        phase: EmergencyPhase,
        expected: EmergencyPhase,
    },
}
