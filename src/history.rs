//!undo/redo snapshots of stack and registers

use std::collections::VecDeque;
use tracing::debug;
use crate::error::EvalError;
use crate::num::Operand;
use crate::registers::RegisterBank;

///complete copy of the mutable calculator state, display modes excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
	pub stack: Vec<Operand>,
	pub registers: RegisterBank,
}

///two snapshot stacks, the undo side optionally capped
#[derive(Debug, Clone, Default)]
pub struct History {
	undo: VecDeque<Snapshot>,	//oldest at front
	redo: Vec<Snapshot>,
	limit: Option<usize>,
}

impl History {
	///`limit` caps the undo depth, None is unbounded
	pub fn new(limit: Option<usize>) -> Self {
		Self {undo: VecDeque::new(), redo: Vec::new(), limit}
	}

	pub fn undo_depth(&self) -> usize {self.undo.len()}
	pub fn redo_depth(&self) -> usize {self.redo.len()}

	///record the state from before a mutation, invalidates redo
	///
	///Returns true if the oldest snapshot had to be dropped to respect the cap.
	pub fn record(&mut self, snap: Snapshot) -> bool {
		self.redo.clear();
		self.undo.push_back(snap);
		debug!(depth = self.undo.len(), "snapshot recorded");
		match self.limit {
			Some(l) if self.undo.len()>l => {
				self.undo.pop_front();
				debug!(limit = l, "oldest snapshot evicted");
				true
			},
			_ => false
		}
	}

	///step back: `current` goes to redo, the previous state is returned
	pub fn undo(&mut self, current: Snapshot) -> Result<Snapshot, EvalError> {
		let prev = self.undo.pop_back().ok_or(EvalError::NothingToUndo)?;
		self.redo.push(current);
		Ok(prev)
	}

	///step forward: `current` goes back to undo, the undone state is returned
	pub fn redo(&mut self, current: Snapshot) -> Result<Snapshot, EvalError> {
		let next = self.redo.pop().ok_or(EvalError::NothingToRedo)?;
		self.undo.push_back(current);
		Ok(next)
	}
}
