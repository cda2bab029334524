// SPDX-License-Identifier: BUSL-1.1

//! The synchronisation server's data model: transition strings, processes,
//! transitions, and the sensitivity matrix linking them.
//!
//! Cross-linked nodes are represented per the arena-plus-index-map option:
//! each `Process` owns a contiguous `Vec<bool>` of sensitivities (the arena),
//! and each `Transition` holds an ordered list of `(ProcessId, slot)` pairs
//! into those arenas instead of intrusive prev/next pointers.

use std::collections::HashMap;

use tokio::sync::mpsc;

use sync_protocol::SyncErrorCode;

use crate::error::SyncError;

pub type ProcessId = uuid::Uuid;

/// A unique `(prefix, action)` pair and its server-assigned global index.
#[derive(Debug, Clone)]
struct TransitionString {
    index: u64,
    prefix: String,
    action: String,
}

/// One participant slot in a transition's participant list.
#[derive(Debug, Clone, Copy)]
struct ParticipantRef {
    process_id: ProcessId,
    slot: usize,
}

/// A distinct global transition and the processes currently registered for it.
#[derive(Debug, Clone, Default)]
struct Transition {
    participants: Vec<ParticipantRef>,
}

/// A registered client process.
#[derive(Debug)]
struct Process {
    /// slot `i` -> global transition index for the `i`-th registered action.
    alphabet_indices: Vec<u64>,
    /// slot `i` -> whether the process's current state enables that transition.
    sensitivities: Vec<bool>,
    waiting_for_update: bool,
    /// Sender half of the process's notification socket, bound once its
    /// WebSocket connects. `None` before connection or after disconnect —
    /// the substitute for the original's unopened/stale FIFO.
    notify_tx: Option<mpsc::UnboundedSender<u64>>,
}

/// The authoritative server-side model. Holds the transition-string table,
/// the process roster, the transition table, and the quiescence counter.
///
/// Encapsulated as one value passed through handlers (never free-floating
/// statics) so the model can be driven directly in tests.
#[derive(Debug, Default)]
pub struct ServerModel {
    transition_strings: Vec<TransitionString>,
    transitions: Vec<Transition>,
    processes: HashMap<ProcessId, Process>,
    /// Count of processes with `waiting_for_update == true`. Synchronisation
    /// is permitted only when this is zero.
    waiting_for_update: usize,
}

impl ServerModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transition_strings.len()
    }

    pub fn is_quiescent(&self) -> bool {
        self.waiting_for_update == 0
    }

    /// Look up `(prefix, action)`, creating a new transition string (and its
    /// matching `Transition`) if this is the first mention. Linear scan, as
    /// in the original — the table is small relative to a single server run.
    fn intern_transition_string(&mut self, prefix: &str, action: &str) -> u64 {
        if let Some(existing) =
            self.transition_strings.iter().find(|t| t.prefix == prefix && t.action == action)
        {
            return existing.index;
        }
        let index = self.transition_strings.len() as u64;
        self.transition_strings.push(TransitionString {
            index,
            prefix: prefix.to_owned(),
            action: action.to_owned(),
        });
        self.transitions.push(Transition::default());
        index
    }

    /// §4.1.1 `alphabet`: register a process's alphabet, returning its
    /// assigned `ProcessId` and the global transition index per action.
    ///
    /// `existing_process_id`, when present, models a caller attempting to
    /// re-announce its alphabet against an id it already holds — a protocol
    /// error per §4.1.1; the caller must `delete` first.
    pub fn register_process(
        &mut self,
        prefix: &str,
        actions: &[String],
        existing_process_id: Option<ProcessId>,
    ) -> Result<(ProcessId, Vec<u64>), SyncError> {
        if let Some(id) = existing_process_id {
            if self.processes.contains_key(&id) {
                return Err(SyncError(SyncErrorCode::DuplicateAlphabet));
            }
        }

        let mut seen = std::collections::HashSet::with_capacity(actions.len());
        for action in actions {
            if !seen.insert(action.as_str()) {
                return Err(SyncError(SyncErrorCode::DuplicateAction));
            }
        }

        let indices: Vec<u64> =
            actions.iter().map(|action| self.intern_transition_string(prefix, action)).collect();

        let process_id = uuid::Uuid::new_v4();
        let process = Process {
            alphabet_indices: indices.clone(),
            sensitivities: vec![false; indices.len()],
            waiting_for_update: false,
            notify_tx: None,
        };
        self.processes.insert(process_id, process);

        for (slot, &global_index) in indices.iter().enumerate() {
            self.transitions[global_index as usize]
                .participants
                .push(ParticipantRef { process_id, slot });
        }

        Ok((process_id, indices))
    }

    /// Bind a process's notification sender once its socket connects.
    pub fn bind_notifier(
        &mut self,
        process_id: &ProcessId,
        tx: mpsc::UnboundedSender<u64>,
    ) -> Result<(), SyncError> {
        match self.processes.get_mut(process_id) {
            Some(process) => {
                process.notify_tx = Some(tx);
                Ok(())
            }
            None => Err(SyncError(SyncErrorCode::UnknownProcess)),
        }
    }

    /// §4.1.2 `update_sensitivities`.
    pub fn update_sensitivities(
        &mut self,
        process_id: &ProcessId,
        sensitivities: &[bool],
    ) -> Result<(), SyncError> {
        let process = self
            .processes
            .get_mut(process_id)
            .ok_or(SyncError(SyncErrorCode::UnknownProcess))?;

        if sensitivities.len() != process.sensitivities.len() {
            return Err(SyncError(SyncErrorCode::LengthMismatch));
        }

        process.sensitivities.copy_from_slice(sensitivities);

        if process.waiting_for_update {
            process.waiting_for_update = false;
            self.waiting_for_update -= 1;
        }

        Ok(())
    }

    /// §4.1.3 `synchronise`: fire iff every participant is currently sensitive.
    ///
    /// On any notification failure, remaining participants are left
    /// un-notified and un-marked; participants already notified keep their
    /// `waiting_for_update` flag set — recovery is an operator action (§7).
    pub fn synchronise(&mut self, transition_index: u64) -> Result<(), SyncError> {
        if !self.is_quiescent() {
            return Err(SyncError(SyncErrorCode::NotQuiescent));
        }

        let transition = self
            .transitions
            .get(transition_index as usize)
            .ok_or(SyncError(SyncErrorCode::UnknownTransition))?;

        if transition.participants.is_empty() {
            // §8: synchronise on a transition with zero participants
            // succeeds vacuously.
            return Ok(());
        }

        let fire_iff_all_sensitive = transition.participants.iter().all(|p| {
            self.processes
                .get(&p.process_id)
                .map(|proc| proc.sensitivities[p.slot])
                .unwrap_or(false)
        });
        if !fire_iff_all_sensitive {
            return Err(SyncError(SyncErrorCode::NotSensitive));
        }

        let participants = transition.participants.clone();
        for participant in participants {
            let process = self
                .processes
                .get_mut(&participant.process_id)
                .ok_or(SyncError(SyncErrorCode::Internal))?;
            let sent = match &process.notify_tx {
                Some(tx) => tx.send(transition_index).is_ok(),
                None => false,
            };
            if !sent {
                return Err(SyncError(SyncErrorCode::NotificationFailed));
            }
            process.waiting_for_update = true;
            self.waiting_for_update += 1;
        }

        Ok(())
    }

    /// §4.1.4 `delete`: unlink every sensitivity the process owns from its
    /// transition's participant list, then drop the process.
    pub fn delete_process(&mut self, process_id: &ProcessId) -> Result<(), SyncError> {
        let process =
            self.processes.remove(process_id).ok_or(SyncError(SyncErrorCode::UnknownProcess))?;

        for &global_index in &process.alphabet_indices {
            if let Some(transition) = self.transitions.get_mut(global_index as usize) {
                transition.participants.retain(|p| p.process_id != *process_id);
            }
        }

        if process.waiting_for_update {
            self.waiting_for_update -= 1;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn actions(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alphabet_assigns_dense_indices() {
        let mut model = ServerModel::new();
        let (_, indices) = model.register_process("a", &actions(&["x", "y"]), None).unwrap();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(model.transition_count(), 2);
    }

    #[test]
    fn shared_transition_gets_same_index() {
        let mut model = ServerModel::new();
        let (_, i1) = model.register_process("shared", &actions(&["go"]), None).unwrap();
        let (_, i2) = model.register_process("shared", &actions(&["go"]), None).unwrap();
        assert_eq!(i1, i2);
        assert_eq!(model.transition_count(), 1);
    }

    #[test]
    fn duplicate_action_in_one_request_is_rejected() {
        let mut model = ServerModel::new();
        let err = model.register_process("a", &actions(&["x", "x"]), None).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::DuplicateAction);
    }

    #[test]
    fn re_announcing_alphabet_without_delete_is_rejected() {
        let mut model = ServerModel::new();
        let (id, _) = model.register_process("a", &actions(&["x"]), None).unwrap();
        let err = model.register_process("a", &actions(&["y"]), Some(id)).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::DuplicateAlphabet);
    }

    #[test]
    fn empty_alphabet_is_valid() {
        let mut model = ServerModel::new();
        let (_, indices) = model.register_process("a", &[], None).unwrap();
        assert!(indices.is_empty());
    }

    #[test]
    fn synchronise_requires_quiescence() {
        let mut model = ServerModel::new();
        let (p1, idx) = model.register_process("a", &actions(&["x"]), None).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        model.bind_notifier(&p1, tx).unwrap();
        model.update_sensitivities(&p1, &[true]).unwrap();

        model.synchronise(idx[0]).unwrap();
        assert!(!model.is_quiescent());

        let err = model.synchronise(idx[0]).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::NotQuiescent);
    }

    #[test]
    fn synchronise_blocks_when_any_participant_not_sensitive() {
        let mut model = ServerModel::new();
        let (p1, idx) = model.register_process("a", &actions(&["go"]), None).unwrap();
        let (p2, _) = model.register_process("b", &actions(&["go"]), None).unwrap();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        model.bind_notifier(&p1, tx1).unwrap();
        model.bind_notifier(&p2, tx2).unwrap();
        model.update_sensitivities(&p1, &[true]).unwrap();
        model.update_sensitivities(&p2, &[false]).unwrap();

        let err = model.synchronise(idx[0]).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::NotSensitive);
        assert!(model.is_quiescent());
    }

    #[test]
    fn synchronise_on_unknown_transition_fails() {
        let mut model = ServerModel::new();
        let err = model.synchronise(42).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::UnknownTransition);
    }

    #[test]
    fn synchronise_vacuous_when_zero_participants() {
        let mut model = ServerModel::new();
        let (_p, idx) = model.register_process("a", &actions(&["x"]), None).unwrap();
        model.delete_process(&_p).unwrap();
        assert!(model.synchronise(idx[0]).is_ok());
        assert!(model.is_quiescent());
    }

    #[test]
    fn delete_unlinks_from_transition_participants() {
        let mut model = ServerModel::new();
        let (p1, idx) = model.register_process("shared", &actions(&["go"]), None).unwrap();
        let (p2, _) = model.register_process("shared", &actions(&["go"]), None).unwrap();
        model.delete_process(&p1).unwrap();

        let (tx2, _rx2) = mpsc::unbounded_channel();
        model.bind_notifier(&p2, tx2).unwrap();
        model.update_sensitivities(&p2, &[true]).unwrap();
        // only p2 remains; synchronise now depends solely on it.
        assert!(model.synchronise(idx[0]).is_ok());
    }

    #[test]
    fn update_sensitivities_rejects_length_mismatch() {
        let mut model = ServerModel::new();
        let (p1, _) = model.register_process("a", &actions(&["x", "y"]), None).unwrap();
        let err = model.update_sensitivities(&p1, &[true]).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::LengthMismatch);
    }

    #[test]
    fn update_sensitivities_unknown_process_fails_without_mutation() {
        let mut model = ServerModel::new();
        let err = model.update_sensitivities(&uuid::Uuid::new_v4(), &[]).unwrap_err();
        assert_eq!(err.code(), SyncErrorCode::UnknownProcess);
    }

    #[test]
    fn delete_then_alphabet_round_trips() {
        let mut model = ServerModel::new();
        let before_transitions = model.transition_count();
        let (p1, _) = model.register_process("a", &actions(&["x"]), None).unwrap();
        model.delete_process(&p1).unwrap();
        assert_eq!(model.process_count(), 0);
        // TransitionStrings persist even though the process is gone.
        assert_eq!(model.transition_count(), before_transitions + 1);
    }
}
