use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use super::{
    clock::Clock,
    errors::RoundSpecError,
    identity::IdentityGate,
    round::{RoundId, RoundSpec, VotingRound},
};

/// All rounds known to this process, keyed by ID. The most recently created
/// round is the current one.
pub struct RoundRegistry {
    clock: Arc<dyn Clock>,
    gate: Arc<dyn IdentityGate>,
    rounds: RwLock<BTreeMap<RoundId, Arc<VotingRound>>>,
}

impl RoundRegistry {
    pub fn new(clock: Arc<dyn Clock>, gate: Arc<dyn IdentityGate>) -> Self {
        Self {
            clock,
            gate,
            rounds: Default::default(),
        }
    }

    /// Create a round with the next free ID and make it current.
    pub fn create_round(&self, spec: RoundSpec) -> Result<Arc<VotingRound>, RoundSpecError> {
        let mut rounds = self.rounds.write().unwrap_or_else(PoisonError::into_inner);
        let id = rounds.keys().next_back().map_or(1, |last| last + 1);
        let round = Arc::new(VotingRound::new(
            id,
            spec,
            self.clock.clone(),
            self.gate.clone(),
        )?);
        rounds.insert(id, round.clone());
        Ok(round)
    }

    /// The round votes currently go to, if any round exists.
    pub fn current(&self) -> Option<Arc<VotingRound>> {
        self.read().values().next_back().cloned()
    }

    pub fn get(&self, id: RoundId) -> Option<Arc<VotingRound>> {
        self.read().get(&id).cloned()
    }

    /// Every round, oldest first.
    pub fn all(&self) -> Vec<Arc<VotingRound>> {
        self.read().values().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<RoundId, Arc<VotingRound>>> {
        self.rounds.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{
        clock::{Clock, MockClock},
        errors::VoteError,
        identity::{examples::*, WalletGate},
        round::RoundStatus,
    };

    fn registry() -> (RoundRegistry, MockClock) {
        let clock = MockClock::default();
        let registry = RoundRegistry::new(
            Arc::new(clock.clone()),
            Arc::new(WalletGate::new(b"registry")),
        );
        (registry, clock)
    }

    #[test]
    fn empty_registry_has_no_current_round() {
        let (registry, _) = registry();
        assert!(registry.current().is_none());
        assert!(registry.get(1).is_none());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn newest_round_is_current() {
        let (registry, clock) = registry();
        let first = registry.create_round(RoundSpec::example(clock.now())).unwrap();
        assert_eq!(first.id(), 1);
        assert_eq!(registry.current().unwrap().id(), 1);

        let second = registry
            .create_round(RoundSpec::past_example(clock.now()))
            .unwrap();
        assert_eq!(second.id(), 2);
        assert_eq!(registry.current().unwrap().id(), 2);
        assert_eq!(
            registry.all().iter().map(|r| r.id()).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn rounds_are_independent() {
        let (registry, clock) = registry();
        let first = registry.create_round(RoundSpec::example(clock.now())).unwrap();
        let second = registry
            .create_round(RoundSpec {
                deadline: clock.now() + Duration::days(7),
                ..RoundSpec::example(clock.now())
            })
            .unwrap();

        // The same voter may vote once in each round.
        first.cast_vote(WALLET_X, 1).unwrap();
        second.cast_vote(WALLET_X, 2).unwrap();
        assert_eq!(
            second.cast_vote(WALLET_X, 2),
            Err(VoteError::DuplicateVote(2))
        );

        // Closing one leaves the other open.
        clock.advance(Duration::hours(2));
        assert_eq!(first.current_state().status, RoundStatus::Closed);
        assert_eq!(second.current_state().status, RoundStatus::Open);
        assert_eq!(registry.get(1).unwrap().current_state().tally.count1, 1);
    }

    #[test]
    fn rejected_spec_does_not_take_an_id() {
        let (registry, clock) = registry();
        let bad = RoundSpec {
            option1_name: String::new(),
            ..RoundSpec::example(clock.now())
        };
        assert_eq!(
            registry.create_round(bad).map(|r| r.id()),
            Err(RoundSpecError::EmptyOption)
        );
        assert!(registry.current().is_none());
        let round = registry.create_round(RoundSpec::example(clock.now())).unwrap();
        assert_eq!(round.id(), 1);
    }
}
