// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence service lifecycle: `NotStarted → Recovering → Serving`

use crate::checkpoint::CheckpointWriter;
use crate::context::PersistContext;
use crate::error::{CheckpointError, PersistError, RecoveryError};
use crate::operlog::OperlogWriter;
use crate::recovery::{RecoveryCoordinator, RecoveryOutcome};
use crate::scheduler::{CheckpointScheduler, CheckpointTicket};
use me_core::{Clock, EngineState, Operation, OperationLogEntry, PersistConfig, SliceHistoryEntry};
use me_storage::BackingStore;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Where the service is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    NotStarted,
    Recovering,
    Serving,
}

type CheckpointHandle = JoinHandle<Result<SliceHistoryEntry, CheckpointError>>;

/// Owns the persistence context and drives recovery, logging and checkpoints
pub struct Persistence<S, C> {
    phase: LifecyclePhase,
    store: S,
    clock: C,
    scheduler: CheckpointScheduler,
    checkpoints: CheckpointWriter<S>,
    operlog: OperlogWriter<S, C>,
    context: Option<PersistContext>,
    in_flight: Vec<CheckpointHandle>,
}

/// A serving service together with the state it recovered
pub struct Recovered<S, C, E> {
    pub persistence: Persistence<S, C>,
    pub state: E,
    pub outcome: RecoveryOutcome,
}

impl<S: BackingStore, C: Clock> Persistence<S, C> {
    pub fn new(store: S, clock: C, config: &PersistConfig) -> Self {
        Self {
            phase: LifecyclePhase::NotStarted,
            scheduler: CheckpointScheduler::from_config(config),
            checkpoints: CheckpointWriter::new(store.clone()),
            operlog: OperlogWriter::new(store.clone(), clock.clone()),
            store,
            clock,
            context: None,
            in_flight: Vec::new(),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// The persistence context; `None` until recovery completes
    pub fn context(&self) -> Option<&PersistContext> {
        self.context.as_ref()
    }

    /// Number of checkpoint workers not yet reaped
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Run startup recovery and begin serving
    ///
    /// Only a service that has not started can recover. On failure the
    /// service is consumed: there is no path from a failed recovery to
    /// serving.
    pub fn recover<E: EngineState + Default>(
        mut self,
    ) -> Result<Recovered<S, C, E>, RecoveryError> {
        if self.phase != LifecyclePhase::NotStarted {
            return Err(RecoveryError::InvalidPhase(self.phase));
        }
        self.phase = LifecyclePhase::Recovering;

        let coordinator = RecoveryCoordinator::new(self.store.clone(), self.clock.clone());
        let (state, outcome) = coordinator.recover::<E>()?;

        let last_checkpoint_time = outcome.checkpoint.map(|c| c.timestamp).unwrap_or(0);
        self.context = Some(PersistContext::recovered(
            last_checkpoint_time,
            outcome.cursor,
        ));
        self.phase = LifecyclePhase::Serving;
        info!(
            operlog_id_start = outcome.cursor,
            last_checkpoint_time, "persistence serving"
        );

        Ok(Recovered {
            persistence: self,
            state,
            outcome,
        })
    }

    /// Apply `op` to the live state, then append it to the operation log
    ///
    /// A rejected operation is neither applied nor logged. A log failure
    /// after a successful apply leaves the state ahead of the log; callers
    /// must treat it as fatal.
    pub fn record<E: EngineState>(
        &mut self,
        state: &mut E,
        op: Operation,
    ) -> Result<OperationLogEntry, PersistError> {
        let phase = self.phase;
        let ctx = self
            .context
            .as_mut()
            .ok_or(PersistError::NotServing(phase))?;
        state.apply(&op)?;
        Ok(self.operlog.append(ctx, op)?)
    }

    /// Scheduler tick: reap finished workers and start a checkpoint if due
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_tick<E: EngineState>(&mut self, state: &E) -> Option<CheckpointTicket> {
        self.in_flight.retain(|handle| !handle.is_finished());

        let ctx = self.context.as_mut()?;
        let ticket = self.scheduler.tick(ctx, self.clock.unix_now())?;
        self.in_flight.push(self.checkpoints.spawn(state, ticket));
        Some(ticket)
    }

    /// Wait for every in-flight checkpoint worker
    pub async fn shutdown(&mut self) -> Vec<Result<SliceHistoryEntry, CheckpointError>> {
        let mut results = Vec::with_capacity(self.in_flight.len());
        for handle in self.in_flight.drain(..) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "checkpoint worker did not finish");
                    Err(CheckpointError::Worker(e.to_string()))
                }
            };
            results.push(result);
        }
        info!(drained = results.len(), "persistence shut down");
        results
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
