use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

pub const EVENT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    System,
    Vision,
    TrafficAgent,
    LogisticsAgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warning,
    Alert,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Reset,
    AmbulanceDetected,
    LightsPrewarned,
    RouteCommitted,
    RoutePlanningFailed,
    PathCleared,
    AmbulanceArrived,
    AmbulanceHalted,
    FleetResumed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineEvent {
    pub tick: u64,
    pub kind: EventKind,
    pub source: EventSource,
    pub level: EventLevel,
    pub message: String,
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {:>5}] {:?}: {}", self.tick, self.source, self.message)
    }
}

#[derive(Debug, Default)]
pub struct EventLog {
    entries: VecDeque<EngineEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: EngineEvent) {
        log::debug!("{}", event);

        if self.entries.len() >= EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.entries.iter()
    }

    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
