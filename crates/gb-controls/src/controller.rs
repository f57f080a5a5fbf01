//! Controller state and decision application.

use tracing::debug;

use crate::actuator::Actuator;
use crate::error::ControlResult;
use crate::rule::Rule;

/// Outcome of evaluating one controller for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the device should be active.
    pub active: bool,
    /// Whether a would-be activation was suppressed by a gating peer.
    pub suppressed: bool,
}

impl Decision {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            suppressed: false,
        }
    }
}

/// Apply the pairwise gating rule to a base decision.
///
/// If the peer's freshly computed decision is active, the base decision
/// is forced inactive and marked suppressed so the fact is observable
/// rather than silently dropped. If the peer could not be evaluated
/// (`None`, e.g. its sensor has no fresh reading), the gate does not
/// gate: a stalled peer must never permanently lock a gated controller
/// off.
pub fn gate(base: Decision, peer: Option<Decision>) -> Decision {
    match peer {
        Some(peer_decision) if peer_decision.active => Decision {
            active: false,
            suppressed: base.active,
        },
        _ => base,
    }
}

/// One controlled device: a decision rule plus the only piece of
/// cross-tick state, the `active` bit.
///
/// The bit is owned exclusively by the controller and mutated only
/// through [`Controller::apply`], invoked inside the orchestrator's
/// single-threaded tick.
#[derive(Debug)]
pub struct Controller {
    quantity: String,
    device: String,
    rule: Rule,
    active: bool,
}

impl Controller {
    /// Create a controller in the documented initial state,
    /// `active = false`.
    pub fn new(quantity: impl Into<String>, device: impl Into<String>, rule: Rule) -> Self {
        Self {
            quantity: quantity.into(),
            device: device.into(),
            rule,
            active: false,
        }
    }

    /// Human-readable name of the measure this controller manages.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// Human-readable name of the device this controller toggles.
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Replace the rule wholesale on reconfiguration. The `active` bit
    /// survives; the next evaluation uses the new rule.
    pub fn set_rule(&mut self, rule: Rule) {
        self.rule = rule;
    }

    /// Pure decision: no side effects beyond computing the next state.
    pub fn evaluate(&self, value: f64) -> Decision {
        Decision::new(self.rule.should_be_active(self.active, value))
    }

    /// Drive the actuator toward the decision.
    ///
    /// Calls `set` only on a transition, and advances the stored bit
    /// only if the set succeeds, so the engine stays consistent with the
    /// actuator's actual last-known state. On failure the same
    /// transition is retried next tick. Returns whether the actuator was
    /// toggled.
    pub fn apply(&mut self, decision: Decision, actuator: &mut dyn Actuator) -> ControlResult<bool> {
        if decision.active == self.active {
            return Ok(false);
        }
        debug!(
            device = %self.device,
            measure = %self.quantity,
            active = decision.active,
            "switching controller state"
        );
        actuator.set(decision.active)?;
        self.active = decision.active;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::ActuatorError;
    use crate::rule::{BandRule, Direction};

    /// Records every set call; optionally fails.
    struct Recording {
        calls: Vec<bool>,
        fail: bool,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail: false,
            }
        }
    }

    impl Actuator for Recording {
        fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
            if self.fail {
                return Err(ActuatorError {
                    device: "test".to_string(),
                    wanted: on,
                    what: "wire fell off".to_string(),
                });
            }
            self.calls.push(on);
            Ok(())
        }
    }

    fn co2_controller() -> Controller {
        Controller::new(
            "co2",
            "exhaust_fan",
            Rule::Band(BandRule::new(800.0, Direction::Below, 100.0).unwrap()),
        )
    }

    #[test]
    fn evaluate_is_pure() {
        let ctrl = co2_controller();
        let first = ctrl.evaluate(950.0);
        let second = ctrl.evaluate(950.0);
        assert_eq!(first, second);
        assert!(!ctrl.active());
    }

    #[test]
    fn apply_toggles_only_on_transition() {
        let mut ctrl = co2_controller();
        let mut actuator = Recording::new();

        // 901 crosses threshold + band: activate.
        let decision = ctrl.evaluate(901.0);
        assert!(ctrl.apply(decision, &mut actuator).unwrap());
        assert!(ctrl.active());

        // Same value again: no second toggle.
        let decision = ctrl.evaluate(901.0);
        assert!(!ctrl.apply(decision, &mut actuator).unwrap());
        assert_eq!(actuator.calls, vec![true]);
    }

    #[test]
    fn failed_actuator_write_keeps_state_and_retries() {
        let mut ctrl = co2_controller();
        let mut actuator = Recording::new();
        actuator.fail = true;

        let decision = ctrl.evaluate(901.0);
        assert!(ctrl.apply(decision, &mut actuator).is_err());
        assert!(!ctrl.active());

        // Next tick, same input: the same transition is attempted again.
        actuator.fail = false;
        let decision = ctrl.evaluate(901.0);
        assert!(ctrl.apply(decision, &mut actuator).unwrap());
        assert!(ctrl.active());
        assert_eq!(actuator.calls, vec![true]);
    }

    #[test]
    fn gate_passes_through_when_peer_inactive() {
        let base = Decision::new(true);
        let gated = gate(base, Some(Decision::new(false)));
        assert_eq!(gated, base);
    }

    #[test]
    fn gate_suppresses_when_peer_active() {
        let gated = gate(Decision::new(true), Some(Decision::new(true)));
        assert!(!gated.active);
        assert!(gated.suppressed);
    }

    #[test]
    fn gate_forces_inactive_without_suppression_mark_when_base_inactive() {
        let gated = gate(Decision::new(false), Some(Decision::new(true)));
        assert!(!gated.active);
        assert!(!gated.suppressed);
    }

    #[test]
    fn gate_defaults_to_not_gating_when_peer_unreadable() {
        let base = Decision::new(true);
        assert_eq!(gate(base, None), base);
    }

    #[test]
    fn set_rule_preserves_active_bit() {
        let mut ctrl = co2_controller();
        let mut actuator = Recording::new();
        let decision = ctrl.evaluate(901.0);
        ctrl.apply(decision, &mut actuator).unwrap();
        assert!(ctrl.active());

        ctrl.set_rule(Rule::Band(
            BandRule::new(1000.0, Direction::Below, 50.0).unwrap(),
        ));
        assert!(ctrl.active());
        // New threshold: 900 is no longer an excess once active.
        assert!(!ctrl.evaluate(900.0).active);
    }
}
