// SPDX-License-Identifier: BUSL-1.1

//! Alphabet interning and state-transition lookup for a parsed automaton —
//! the driver-side counterpart to `sync_server::model`.

use crate::automaton::Automaton;

/// A parsed automaton with its action alphabet interned into dense local
/// indices, in first-seen order.
#[derive(Debug, Clone)]
pub struct FsmModel {
    nr_states: usize,
    /// local action index -> action string, first-seen order.
    alphabet: Vec<String>,
    /// state -> ordered list of (local_action_index, dst_state); order is
    /// parse order, which is what makes first-match-wins well-defined for
    /// non-deterministic automata (§9).
    outgoing: Vec<Vec<(usize, usize)>>,
}

impl FsmModel {
    pub fn from_automaton(automaton: &Automaton) -> Self {
        let mut alphabet: Vec<String> = Vec::new();
        let mut outgoing = vec![Vec::new(); automaton.nr_states];

        for transition in &automaton.transitions {
            let local_index = match alphabet.iter().position(|a| a == &transition.action) {
                Some(index) => index,
                None => {
                    alphabet.push(transition.action.clone());
                    alphabet.len() - 1
                }
            };
            outgoing[transition.src].push((local_index, transition.dst));
        }

        Self { nr_states: automaton.nr_states, alphabet, outgoing }
    }

    pub fn nr_states(&self) -> usize {
        self.nr_states
    }

    /// Actions in first-seen order — the order `alphabet` is registered in.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }

    /// First matching outgoing transition for `local_action_index` from
    /// `state` — "first match wins" per §4.2.3 step 4.
    pub fn change_state(&self, state: usize, local_action_index: usize) -> Option<usize> {
        self.outgoing
            .get(state)?
            .iter()
            .find(|(action, _)| *action == local_action_index)
            .map(|(_, dst)| *dst)
    }

    /// Boolean vector, one slot per alphabet entry: true where `state` has a
    /// matching outgoing transition (§4.2.3 step 5).
    pub fn sensitivities_for_state(&self, state: usize) -> Vec<bool> {
        let mut sensitivities = vec![false; self.alphabet.len()];
        if let Some(edges) = self.outgoing.get(state) {
            for &(local_index, _) in edges {
                sensitivities[local_index] = true;
            }
        }
        sensitivities
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::automaton::RawTransition;

    fn automaton(transitions: Vec<(usize, &str, usize)>, nr_states: usize) -> Automaton {
        Automaton {
            nr_states,
            transitions: transitions
                .into_iter()
                .map(|(src, action, dst)| RawTransition { src, action: action.to_owned(), dst })
                .collect(),
        }
    }

    #[test]
    fn interns_actions_in_first_seen_order() {
        let automaton = automaton(vec![(0, "b", 1), (1, "a", 0), (0, "a", 1)], 2);
        let model = FsmModel::from_automaton(&automaton);
        assert_eq!(model.alphabet(), &["b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn non_deterministic_automaton_resolves_to_first_match() {
        // state 0 has two outgoing edges on the same action, to different
        // destinations; §9 mandates the first one in parse order wins.
        let automaton = automaton(vec![(0, "go", 1), (0, "go", 2)], 3);
        let model = FsmModel::from_automaton(&automaton);
        let go = model.alphabet().iter().position(|a| a == "go").expect("go interned");
        assert_eq!(model.change_state(0, go), Some(1));
    }

    #[test]
    fn sensitivities_mark_every_outgoing_local_action() {
        let automaton = automaton(vec![(0, "a", 1), (0, "b", 2), (1, "c", 0)], 3);
        let model = FsmModel::from_automaton(&automaton);
        assert_eq!(model.sensitivities_for_state(0), vec![true, true, false]);
        assert_eq!(model.sensitivities_for_state(1), vec![false, false, true]);
    }

    #[test]
    fn change_state_returns_none_for_unmatched_action() {
        let automaton = automaton(vec![(0, "a", 1)], 2);
        let model = FsmModel::from_automaton(&automaton);
        assert_eq!(model.change_state(0, 99), None);
    }
}
