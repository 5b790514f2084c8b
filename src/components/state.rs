use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the simulation state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    #[default]
    Idle,
    Init,
    Work,
    Freeze,
    Pause,
    Stop,
}

impl SimulationState {
    /// Next state for a requested phase. Total over every pair of states.
    ///
    /// Init only leaves by a Stop request here; the manager moves it to Work
    /// once trim has been resolved. Stop is only left through a manager reset.
    pub fn transition(self, requested: SimulationState) -> SimulationState {
        use SimulationState::*;

        match (self, requested) {
            (_, Stop) => Stop,
            (Stop, _) => Stop,
            (Idle, Init) => Init,
            (Idle, _) => Idle,
            (Init, _) => Init,
            (Work, Freeze) => Freeze,
            (Work, Pause) => Pause,
            (Work, _) => Work,
            (Freeze, Work) => Work,
            (Freeze, Pause) => Pause,
            (Freeze, _) => Freeze,
            (Pause, Work) => Work,
            (Pause, _) => Pause,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == SimulationState::Stop
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulationState::Idle => "idle",
            SimulationState::Init => "init",
            SimulationState::Work => "work",
            SimulationState::Freeze => "freeze",
            SimulationState::Pause => "pause",
            SimulationState::Stop => "stop",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationState::{self, *};
    use pretty_assertions::assert_eq;

    const ALL: [SimulationState; 6] = [Idle, Init, Work, Freeze, Pause, Stop];

    #[test]
    fn test_stop_reachable_from_everywhere_and_terminal() {
        for state in ALL {
            assert_eq!(state.transition(Stop), Stop);
            assert_eq!(Stop.transition(state), Stop);
        }
    }

    #[test]
    fn test_idle_only_leaves_for_init() {
        assert_eq!(Idle.transition(Init), Init);
        assert_eq!(Idle.transition(Work), Idle);
        assert_eq!(Idle.transition(Freeze), Idle);
        assert_eq!(Idle.transition(Pause), Idle);
    }

    #[test]
    fn test_freeze_and_pause_cycles() {
        assert_eq!(Work.transition(Freeze), Freeze);
        assert_eq!(Freeze.transition(Work), Work);
        assert_eq!(Work.transition(Pause), Pause);
        assert_eq!(Freeze.transition(Pause), Pause);
        assert_eq!(Pause.transition(Work), Work);
        assert_eq!(Pause.transition(Freeze), Pause);
        assert_eq!(Work.transition(Init), Work);
    }

    #[test]
    fn test_transition_is_deterministic() {
        for current in ALL {
            for requested in ALL {
                assert_eq!(current.transition(requested), current.transition(requested));
            }
        }
    }
}
