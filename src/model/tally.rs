use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ballot::{Ballot, Choice},
    errors::VoteError,
    identity::Identity,
    round::RoundId,
};

/// Per-option vote counts at a single point in time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySnapshot {
    pub count1: u64,
    pub count2: u64,
}

impl TallySnapshot {
    pub fn total(&self) -> u64 {
        self.count1 + self.count2
    }

    fn increment(&mut self, choice: Choice) {
        match choice {
            Choice::Option1 => self.count1 += 1,
            Choice::Option2 => self.count2 += 1,
        }
    }
}

/// Everything guarded by the store's lock. The counts are only ever updated
/// together with `ballots`, so `counts.total() == ballots.len()` holds
/// whenever the lock is free.
#[derive(Default)]
struct Ledger {
    ballots: Vec<Ballot>,
    voters: HashSet<Identity>,
    counts: TallySnapshot,
}

/// The authoritative record of one round's ballots.
pub struct TallyStore {
    round_id: RoundId,
    ledger: Mutex<Ledger>,
}

impl TallyStore {
    pub fn new(round_id: RoundId) -> Self {
        Self {
            round_id,
            ledger: Default::default(),
        }
    }

    /// Record a ballot unless `identity` has already voted.
    ///
    /// The duplicate check, the append and the counter increment happen under
    /// a single lock acquisition, so concurrent calls are totally ordered and
    /// a refused call leaves no trace.
    pub fn record_if_absent(
        &self,
        identity: Identity,
        choice: Choice,
        cast_at: DateTime<Utc>,
    ) -> Result<Ballot, VoteError> {
        let mut ledger = self.lock();
        if ledger.voters.contains(&identity) {
            return Err(VoteError::DuplicateVote(self.round_id));
        }
        let ballot = Ballot::new(identity.clone(), choice, cast_at);
        ledger.voters.insert(identity);
        ledger.counts.increment(choice);
        ledger.ballots.push(ballot.clone());
        debug_assert_eq!(ledger.counts.total(), ledger.ballots.len() as u64);
        Ok(ballot)
    }

    /// Current counts. Never observes a half-recorded ballot.
    pub fn snapshot(&self) -> TallySnapshot {
        self.lock().counts
    }

    /// Has this identity already voted?
    pub fn has_voted(&self, identity: &Identity) -> bool {
        self.lock().voters.contains(identity)
    }

    /// Every ballot in acceptance order, with the counts, read under one lock
    /// acquisition.
    pub fn audit(&self) -> (Vec<Ballot>, TallySnapshot) {
        let ledger = self.lock();
        (ledger.ballots.clone(), ledger.counts)
    }

    // Nothing inside the critical sections panics part-way through an update,
    // so a poisoned ledger is still consistent.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::model::identity::{examples::wallet, IdentityGate, WalletGate};

    fn identity(n: u32) -> Identity {
        WalletGate::new(b"tally").resolve(&wallet(n)).unwrap()
    }

    #[test]
    fn records_once_per_identity() {
        let store = TallyStore::new(7);
        let now = Utc::now();

        let ballot = store
            .record_if_absent(identity(1), Choice::Option1, now)
            .unwrap();
        assert_eq!(ballot.identity(), &identity(1));
        assert_eq!(ballot.choice(), Choice::Option1);
        assert_eq!(ballot.cast_at(), now);
        assert!(store.has_voted(&identity(1)));

        assert_eq!(
            store.record_if_absent(identity(1), Choice::Option2, now),
            Err(VoteError::DuplicateVote(7))
        );
        assert_eq!(
            store.snapshot(),
            TallySnapshot {
                count1: 1,
                count2: 0
            }
        );
        assert_eq!(store.audit().0, vec![ballot]);
    }

    #[test]
    fn counts_follow_choices() {
        let store = TallyStore::new(1);
        let now = Utc::now();
        for n in 0..5 {
            store
                .record_if_absent(identity(n), Choice::Option2, now)
                .unwrap();
        }
        store
            .record_if_absent(identity(5), Choice::Option1, now)
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!((snapshot.count1, snapshot.count2), (1, 5));
        assert_eq!(snapshot.total(), 6);
        assert!(!store.has_voted(&identity(6)));
    }

    #[test]
    fn concurrent_duplicates_accept_exactly_one() {
        let store = Arc::new(TallyStore::new(1));
        let now = Utc::now();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                let choice = if i % 2 == 0 {
                    Choice::Option1
                } else {
                    Choice::Option2
                };
                thread::spawn(move || store.record_if_absent(identity(42), choice, now).is_ok())
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(store.snapshot().total(), 1);
        assert_eq!(store.audit().0.len(), 1);
    }

    #[test]
    fn snapshots_never_drift_from_ballots() {
        let store = Arc::new(TallyStore::new(1));
        let now = Utc::now();

        let writers: Vec<_> = (0..4u32)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for n in 0..250 {
                        let choice = if n % 3 == 0 {
                            Choice::Option1
                        } else {
                            Choice::Option2
                        };
                        store
                            .record_if_absent(identity(t * 1000 + n), choice, now)
                            .unwrap();
                    }
                })
            })
            .collect();
        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let (ballots, counts) = store.audit();
                    assert_eq!(counts.total(), ballots.len() as u64);
                    let ones = ballots
                        .iter()
                        .filter(|b| b.choice() == Choice::Option1)
                        .count() as u64;
                    assert_eq!(counts.count1, ones);
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(store.snapshot().total(), 1000);
    }
}
