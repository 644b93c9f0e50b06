//! The explicit phase graph.
//!
//! Every transition the controller commits must appear here. Any phase may
//! additionally fall into [`Phase::Error`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

use crate::game::{Phase, PhaseKind};

/// Phase graph validation errors
#[derive(Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    #[error("phase {0} has no entry in the graph")]
    MissingPhase(Phase),
    #[error("phase {0} has no successor")]
    DeadEnd(Phase),
    #[error("phase {0} is unreachable from LOADING")]
    Unreachable(Phase),
    #[error("ERROR cannot recover to another phase")]
    NoRecovery,
}

/// One row of the graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhaseEntry {
    pub kind: PhaseKind,
    pub next: BTreeSet<Phase>,
}

/// `phase -> (kind, allowed next phases)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhaseGraph {
    entries: BTreeMap<Phase, PhaseEntry>,
}

impl Default for PhaseGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl PhaseGraph {
    /// The client's game flow.
    #[must_use]
    pub fn standard() -> Self {
        use Phase::*;

        let rows: [(Phase, &[Phase]); 19] = [
            (Loading, &[OutOfTokens, RecoveryDecision, Betting]),
            (RecoveryDecision, &[SplitTurn, SplitFinish, MainTurn, Betting]),
            (Shuffling, &[InitGame]),
            (Betting, &[Betting, Shuffling, InitGame]),
            (InitGame, &[MainTurn, MainStand]),
            (
                MainTurn,
                &[
                    MainTurn,
                    MainStandRewardsTransit,
                    MainStand,
                    SplitTurn,
                    SplitAceTransit,
                    SplitNat21Transit,
                ],
            ),
            (MainStandRewardsTransit, &[MainStand]),
            (MainStand, &[Betting, OutOfTokens]),
            (SplitTurn, &[SplitTurn, SplitStand, SplitStandDouble]),
            (SplitStand, &[SplitTurn, SplitNat21Transit, SplitFinish]),
            (SplitStandDouble, &[SplitTurn, SplitNat21Transit, SplitFinish]),
            (SplitNat21Transit, &[SplitStand]),
            (SplitAceTransit, &[SplitAceTransit, SplitFinish]),
            (SplitFinish, &[SplitFinishOutcome]),
            (SplitFinishOutcome, &[SplitFinish, Betting, OutOfTokens]),
            (OutOfTokens, &[RestartGame]),
            (RestartGame, &[Reloading]),
            (Error, &[Reloading]),
            (Reloading, &[Betting]),
        ];

        let entries = rows
            .into_iter()
            .map(|(phase, next)| {
                (
                    phase,
                    PhaseEntry {
                        kind: phase.kind(),
                        next: next.iter().copied().collect(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn entry(&self, phase: Phase) -> Option<&PhaseEntry> {
        self.entries.get(&phase)
    }

    /// Whether `from -> to` may be committed.
    #[must_use]
    pub fn allows(&self, from: Phase, to: Phase) -> bool {
        to == Phase::Error
            || self
                .entries
                .get(&from)
                .is_some_and(|entry| entry.next.contains(&to))
    }

    /// Checks completeness and reachability. Run once at startup.
    pub fn validate(&self) -> Result<(), GraphError> {
        for phase in Phase::ALL {
            let entry = self.entries.get(&phase).ok_or(GraphError::MissingPhase(phase))?;
            if entry.next.is_empty() {
                return Err(GraphError::DeadEnd(phase));
            }
        }

        let recovers = self
            .entries
            .get(&Phase::Error)
            .is_some_and(|entry| entry.next.iter().any(|p| *p != Phase::Error));
        if !recovers {
            return Err(GraphError::NoRecovery);
        }

        let mut seen = BTreeSet::from([Phase::Loading, Phase::Error]);
        let mut queue = VecDeque::from([Phase::Loading, Phase::Error]);
        while let Some(phase) = queue.pop_front() {
            if let Some(entry) = self.entries.get(&phase) {
                for next in &entry.next {
                    if seen.insert(*next) {
                        queue.push_back(*next);
                    }
                }
            }
        }
        match Phase::ALL.into_iter().find(|p| !seen.contains(p)) {
            Some(phase) => Err(GraphError::Unreachable(phase)),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    fn without(mut self, phase: Phase) -> Self {
        self.entries.remove(&phase);
        self
    }
}
