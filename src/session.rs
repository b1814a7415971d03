//!one calculator session: state, line transactions, rendering
//!
//!A line is the unit of atomicity. Tokens are all resolved first, then executed in order
//!against the live state; any failure restores the stack, registers, display modes and undo
//!history exactly as they were before the line. A line that mutates stack or registers leaves
//!one undo snapshot behind, taken just before its first mutating command.

use rand::{RngCore, SeedableRng, rngs::{OsRng, StdRng}};
use tracing::{debug, info, warn};
use crate::command::{self, Command, Op};
use crate::config::CalcConfig;
use crate::engine::{self, Env, Stack};
use crate::error::EvalError;
use crate::history::{History, Snapshot};
use crate::mode::{AngleUnit, Base, ModeChange, Modes};
use crate::num::Operand;
use crate::registers::RegisterBank;

///rendered state handed to the host after each line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackView {
	///bottom first, the last entry is the top
	pub entries: Vec<String>,
	pub precision: u32,
	pub base: Base,
	pub angle: AngleUnit,
	///occupied registers only, in key order
	pub registers: Vec<(usize, String)>,
	pub warnings: Vec<String>,
}

///result of one line: always a view, plus the error if the line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOutcome {
	pub view: StackView,
	pub error: Option<EvalError>,
}

///state rolled back to when a line fails
struct Checkpoint {
	stack: Vec<Operand>,
	registers: RegisterBank,
	modes: Modes,
	///copied on demand, only lines with undo/redo touch history before they end
	history: Option<History>,
}

pub struct Session {
	config: CalcConfig,
	stack: Stack,
	registers: RegisterBank,
	modes: Modes,
	history: History,
	rng: StdRng,
}

impl Default for Session {
	fn default() -> Self {Self::new(CalcConfig::default())}
}

impl Session {
	///fresh session; `config` is expected to be validated already
	pub fn new(config: CalcConfig) -> Self {
		let rng = match config.rng_seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut seed = [0_u8; 32];
				OsRng.fill_bytes(&mut seed);	//seed with OS randomness
				StdRng::from_seed(seed)
			}
		};
		Self {
			stack: Stack::new(),
			registers: RegisterBank::new(config.registers),
			modes: Modes::new(config.display()),
			history: History::new(config.history_limit),
			rng,
			config,
		}
	}

	pub fn stack(&self) -> &Stack {&self.stack}
	pub fn registers(&self) -> &RegisterBank {&self.registers}
	pub fn modes(&self) -> &Modes {&self.modes}
	pub fn history(&self) -> &History {&self.history}
	pub fn config(&self) -> &CalcConfig {&self.config}

	///evaluate a line, never fails as a whole
	pub fn evaluate(&mut self, line: &str) -> EvalOutcome {
		let mut warnings = Vec::new();
		match self.run_line(line, &mut warnings) {
			Ok(()) => EvalOutcome {view: self.view(warnings), error: None},
			Err(e) => {
				warn!(line, error = %e, "line rejected");
				EvalOutcome {view: self.view(Vec::new()), error: Some(e)}
			}
		}
	}

	///evaluate a line, the error replaces the view
	pub fn process(&mut self, line: &str) -> Result<StackView, EvalError> {
		let out = self.evaluate(line);
		match out.error {
			Some(e) => Err(e),
			None => Ok(out.view)
		}
	}

	fn snapshot(&self) -> Snapshot {
		Snapshot {stack: self.stack.items().to_vec(), registers: self.registers.clone()}
	}

	fn restore(&mut self, snap: Snapshot) {
		self.stack.restore(snap.stack);
		self.registers = snap.registers;
	}

	///push the pre-mutation snapshot of this line, if any
	fn commit(&mut self, pending: Option<Snapshot>, warnings: &mut Vec<String>) {
		if let Some(s) = pending {
			if self.history.record(s) {
				warnings.push("oldest undo snapshot evicted".to_string());
			}
		}
	}

	fn run_line(&mut self, line: &str, warnings: &mut Vec<String>) -> Result<(), EvalError> {
		let cmds = command::tokenize(line, &self.modes)?;
		if cmds.is_empty() {return Ok(());}
		debug!(line, count = cmds.len(), "executing line");

		let mut cp = Checkpoint {
			stack: self.stack.items().to_vec(),
			registers: self.registers.clone(),
			modes: self.modes,
			history: None,
		};
		let mut pending = None;
		match self.execute(&cmds, &mut pending, &mut cp, warnings) {
			Ok(()) => {
				self.commit(pending, warnings);
				Ok(())
			},
			Err(e) => {
				self.stack.restore(cp.stack);
				self.registers = cp.registers;
				self.modes = cp.modes;
				if let Some(h) = cp.history {self.history = h;}
				warnings.clear();
				Err(e)
			}
		}
	}

	fn execute(&mut self, cmds: &[Command], pending: &mut Option<Snapshot>, cp: &mut Checkpoint, warnings: &mut Vec<String>) -> Result<(), EvalError> {
		for cmd in cmds {
			match cmd {
				Command::Op(op@(Op::Undo|Op::Redo)) => {
					if cp.history.is_none() {cp.history = Some(self.history.clone());}
					self.commit(pending.take(), warnings);	//earlier mutations of this line become undoable first
					let current = self.snapshot();
					let target = if *op==Op::Undo {self.history.undo(current)?} else {self.history.redo(current)?};
					self.restore(target);
					info!(?op, undo = self.history.undo_depth(), redo = self.history.redo_depth(), "history step");
				},
				Command::Op(Op::Mode(m)) => {
					if let ModeChange::Precision(p) = m {
						let max = self.config.max_precision();
						if *p>max {
							return Err(EvalError::domain(format!("precision {p} is above {max}, the most the working digits allow")));
						}
					}
					self.modes.apply(*m);
					debug!(modes = ?self.modes.current, "mode change");
				},
				_ => {
					if pending.is_none() {*pending = Some(self.snapshot());}
					match cmd {
						Command::Push(o) => self.stack.push(o.clone()),
						Command::Op(op) => {
							let mut env = Env {digits: self.config.working_digits, angle: self.modes.current.angle, rng: &mut self.rng};
							engine::apply(&mut self.stack, &mut self.registers, *op, &mut env)?;
						}
					}
				}
			}
		}
		Ok(())
	}

	///render the current state with the active display settings
	pub fn view(&self, mut warnings: Vec<String>) -> StackView {
		let d = self.modes.current;
		let mut truncated = 0;
		let mut render = |o: &Operand| {
			let (s, cut) = o.render(d.base, d.precision);
			if cut {truncated += 1;}
			s
		};
		let entries: Vec<String> = self.stack.items().iter().map(&mut render).collect();
		let registers = self.registers.occupied().map(|(k, o)| (k, render(o))).collect();
		if truncated>0 {
			warnings.push(format!("{truncated} fractional value{} shown truncated in base {}", if truncated==1 {""} else {"s"}, d.base));
		}
		StackView {
			entries,
			precision: d.precision,
			base: d.base,
			angle: d.angle,
			registers,
			warnings,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn seeded() -> Session {
		Session::new(CalcConfig {rng_seed: Some(1), ..CalcConfig::default()})
	}

	fn entries(s: &mut Session, line: &str) -> Vec<String> {
		s.process(line).unwrap().entries
	}

	#[test]
	fn failed_line_rolls_back_everything() {
		let mut s = seeded();
		s.process("1 2 sto3").unwrap();
		let before = s.snapshot();
		let modes = *s.modes();
		let err = s.process("5 sto4 prec2 basehex ff 0 /").unwrap_err();
		assert_eq!(err, EvalError::DivisionByZero);
		assert_eq!(s.snapshot(), before);
		assert_eq!(*s.modes(), modes);
		assert_eq!(s.history().undo_depth(), 1);
	}

	#[test]
	fn one_snapshot_per_mutating_line() {
		let mut s = seeded();
		s.process("1 2 3").unwrap();
		s.process("+ +").unwrap();
		assert_eq!(s.history().undo_depth(), 2);
		s.process("prec3 basedec").unwrap();
		assert_eq!(s.history().undo_depth(), 2);
		assert_eq!(entries(&mut s, "undo"), ["1", "2", "3"]);
		assert_eq!(entries(&mut s, "undo"), Vec::<String>::new());
		assert_eq!(s.process("undo"), Err(EvalError::NothingToUndo));
	}

	#[test]
	fn undo_inside_a_line() {
		let mut s = seeded();
		assert_eq!(entries(&mut s, "5 3 + undo"), Vec::<String>::new());
		assert_eq!(entries(&mut s, "redo"), ["8"]);
		assert_eq!(s.process("redo"), Err(EvalError::NothingToRedo));
	}

	#[test]
	fn failed_undo_line_restores_history() {
		let mut s = seeded();
		s.process("4").unwrap();
		s.process("9").unwrap();
		assert_eq!(s.process("undo undo undo"), Err(EvalError::NothingToUndo));
		assert_eq!(s.history().undo_depth(), 2);
		assert_eq!(s.history().redo_depth(), 0);
		assert_eq!(entries(&mut s, ""), ["4", "9"]);
	}

	#[test]
	fn new_mutation_clears_redo() {
		let mut s = seeded();
		s.process("1").unwrap();
		s.process("undo").unwrap();
		s.process("7").unwrap();
		assert_eq!(s.process("redo"), Err(EvalError::NothingToRedo));
	}

	#[test]
	fn eviction_is_reported() {
		let mut s = Session::new(CalcConfig {history_limit: Some(1), ..CalcConfig::default()});
		assert!(s.process("1").unwrap().warnings.is_empty());
		let v = s.process("2").unwrap();
		assert_eq!(v.warnings, ["oldest undo snapshot evicted"]);
		s.process("undo").unwrap();
		assert_eq!(s.process("undo"), Err(EvalError::NothingToUndo));
	}

	#[test]
	fn view_uses_display_modes() {
		let mut s = seeded();
		let v = s.process("1 3 / prec4").unwrap();
		assert_eq!(v.entries, ["0.3333"]);
		assert_eq!(v.precision, 4);
		let v = s.process("clear 255 10.5 basehex").unwrap();
		assert_eq!(v.entries, ["ff", "a.8"]);
		let v = s.process("clear 0.1 basebin").unwrap();
		assert_eq!(v.warnings, ["1 fractional value shown truncated in base bin"]);
		let v = s.process("prevmode").unwrap();
		assert_eq!(v.base, Base::Hex);
	}

	#[test]
	fn registers_in_view() {
		let mut s = seeded();
		let v = s.process("2.5 sto2 7 sto0").unwrap();
		assert_eq!(v.registers, [(0, "7".to_string()), (2, "2.5".to_string())]);
		let v = s.process("clsall").unwrap();
		assert!(v.registers.is_empty());
		assert_eq!(s.process("rcl2"), Err(EvalError::EmptyRegister(2)));
		assert!(matches!(s.process("1 sto10"), Err(EvalError::InvalidRegister(_))));
	}

	#[test]
	fn evaluate_keeps_view_on_error() {
		let mut s = seeded();
		s.process("10").unwrap();
		let out = s.evaluate("0 /");
		assert_eq!(out.error, Some(EvalError::DivisionByZero));
		assert_eq!(out.view.entries, ["10"]);
	}

	#[test]
	fn precision_limited_by_working_digits() {
		let mut s = Session::new(CalcConfig {working_digits: 50, ..CalcConfig::default()});
		s.process("1 3 /").unwrap();
		assert!(matches!(s.process("2 prec35"), Err(EvalError::DomainError(_))));
		assert_eq!(entries(&mut s, ""), ["0.333333333333"]);
		assert_eq!(entries(&mut s, "prec34"), ["0.3333333333333333333333333333333333"]);
	}

	#[test]
	fn seeded_dice_repeat() {
		let mut a = seeded();
		let mut b = seeded();
		assert_eq!(entries(&mut a, "dice3d20 rand"), entries(&mut b, "dice3d20 rand"));
	}
}
