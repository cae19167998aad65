use std::collections::VecDeque;

use super::VariableId;
use crate::containers::KeyedVec;
use crate::tabula_assert_moderate;

/// FIFO queue of variables whose domains shrank since they were last handed to their
/// propagators. Enqueueing a variable which is already queued is a no-op.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariableQueue {
    queue: VecDeque<VariableId>,
    is_enqueued: KeyedVec<VariableId, bool>,
}

impl VariableQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn enqueue(&mut self, variable: VariableId) {
        if !self.is_variable_enqueued(variable) {
            self.is_enqueued.ensure_key(variable, false);
            self.is_enqueued[variable] = true;
            self.queue.push_back(variable);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<VariableId> {
        let next_variable = self.queue.pop_front();

        if let Some(variable) = next_variable {
            tabula_assert_moderate!(self.is_enqueued[variable]);
            self.is_enqueued[variable] = false;
        }

        next_variable
    }

    pub(crate) fn clear(&mut self) {
        while let Some(variable) = self.queue.pop_front() {
            self.is_enqueued[variable] = false;
        }
    }

    pub(crate) fn is_variable_enqueued(&self, variable: VariableId) -> bool {
        self.is_enqueued
            .get(variable)
            .copied()
            .unwrap_or_default()
    }
}
