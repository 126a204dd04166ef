use crate::config::SimulationConfig;
use crate::engine::{EmergencyPhase, EngineError, SimulationEngine};
use rand::Rng;

// Deadlines are absolute engine tick counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioStep {
    Idle,
    Armed { fire_at: u64 },
    Detected { epoch: u64, route_at: u64 },
    Routing { epoch: u64, activate_at: u64 },
    Active,
}

/// Drives `inject -> highlight -> activate` with fixed delays between the
/// phases. A pending phase whose engine epoch no longer matches is dropped.
#[derive(Debug, Clone)]
pub struct ScenarioDirector {
    step: ScenarioStep,
    trigger_window: (u64, u64),
    detect_to_route: u64,
    route_to_activate: u64,
}

impl ScenarioDirector {
    pub fn new(config: &SimulationConfig) -> Self {
        let emergency = &config.emergency;
        Self {
            step: ScenarioStep::Idle,
            trigger_window: (
                config.ms_to_ticks(emergency.auto_trigger_min_ms),
                config.ms_to_ticks(emergency.auto_trigger_max_ms),
            ),
            detect_to_route: config.ms_to_ticks(emergency.detect_to_route_ms),
            route_to_activate: config.ms_to_ticks(emergency.route_to_activate_ms),
        }
    }

    pub fn step(&self) -> ScenarioStep {
        self.step
    }

    pub fn is_idle(&self) -> bool {
        self.step == ScenarioStep::Idle
    }

    pub fn arm<R: Rng>(&mut self, engine: &SimulationEngine, rng: &mut R) -> Option<u64> {
        if !self.is_idle() || engine.emergency_active() {
            return None;
        }

        // Random tick inside the configured window
        let (min, max) = self.trigger_window;
        let fire_at = engine.tick_count() + rng.gen_range(min..=max);
        self.step = ScenarioStep::Armed { fire_at };
        log::info!("Emergency scenario scheduled for tick {}", fire_at);
        Some(fire_at)
    }

    pub fn trigger_now(&mut self, engine: &mut SimulationEngine) -> Result<(), EngineError> {
        match self.step {
            ScenarioStep::Idle | ScenarioStep::Armed { .. } => {}
            _ => return Err(EngineError::EmergencyInProgress(engine.phase())),
        }

        // An armed trigger is simply replaced
        log::info!("Manual override initiated");
        self.detect(engine)
    }

    pub fn cancel(&mut self) {
        if !self.is_idle() {
            log::info!("Emergency scenario cancelled at {:?}", self.step);
        }
        self.step = ScenarioStep::Idle;
    }

    // Call once per tick, after `step`
    pub fn advance(&mut self, engine: &mut SimulationEngine) -> Result<(), EngineError> {
        let now = engine.tick_count();

        match self.step {
            ScenarioStep::Idle | ScenarioStep::Active => Ok(()),
            ScenarioStep::Armed { fire_at } => {
                if now < fire_at {
                    return Ok(());
                }
                if !engine.phase().accepts_injection() {
                    // Someone else started an emergency meanwhile
                    self.cancel();
                    return Ok(());
                }
                self.detect(engine)
            }
            ScenarioStep::Detected { epoch, route_at } => {
                if !self.still_current(engine, epoch, EmergencyPhase::Detected) || now < route_at {
                    return Ok(());
                }
                engine.highlight_traffic_lights()?;
                self.step = ScenarioStep::Routing {
                    epoch,
                    activate_at: now + self.route_to_activate,
                };
                Ok(())
            }
            ScenarioStep::Routing { epoch, activate_at } => {
                if !self.still_current(engine, epoch, EmergencyPhase::Routing)
                    || now < activate_at
                {
                    return Ok(());
                }
                engine.activate_agents()?;
                self.step = ScenarioStep::Active;
                Ok(())
            }
        }
    }

    fn detect(&mut self, engine: &mut SimulationEngine) -> Result<(), EngineError> {
        engine.inject_ambulance()?;
        self.step = ScenarioStep::Detected {
            epoch: engine.emergency_epoch(),
            route_at: engine.tick_count() + self.detect_to_route,
        };
        Ok(())
    }

    // Cancels the sequence when the engine was reset or moved on without us
    fn still_current(
        &mut self,
        engine: &SimulationEngine,
        epoch: u64,
        expected: EmergencyPhase,
    ) -> bool {
        if engine.emergency_epoch() == epoch && engine.phase() == expected {
            return true;
        }
        self.cancel();
        false
    }
}
