//!fixed-size bank of numbered memory registers

use crate::error::EvalError;
use crate::num::Operand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
	slots: Vec<Option<Operand>>,
}

impl RegisterBank {
	///`size` registers, all empty
	pub fn new(size: usize) -> Self {
		Self {slots: vec![None; size]}
	}

	pub fn len(&self) -> usize {self.slots.len()}
	pub fn is_empty(&self) -> bool {self.slots.is_empty()}

	///index check shared by every accessor
	fn slot(&mut self, key: usize) -> Result<&mut Option<Operand>, EvalError> {
		self.slots.get_mut(key).ok_or_else(|| EvalError::InvalidRegister(key.to_string()))
	}

	///store a copy, overwriting silently
	pub fn store(&mut self, key: usize, value: Operand) -> Result<(), EvalError> {
		*self.slot(key)? = Some(value);
		Ok(())
	}

	pub fn recall(&mut self, key: usize) -> Result<Operand, EvalError> {
		self.slot(key)?.clone().ok_or(EvalError::EmptyRegister(key))
	}

	///empty one register, already empty is fine
	pub fn clear(&mut self, key: usize) -> Result<(), EvalError> {
		*self.slot(key)? = None;
		Ok(())
	}

	pub fn clear_all(&mut self) {
		self.slots.iter_mut().for_each(|s| *s = None);
	}

	///put `value` in the register and return what was there
	pub fn exchange(&mut self, key: usize, value: Operand) -> Result<Operand, EvalError> {
		let slot = self.slot(key)?;
		let old = slot.take().ok_or(EvalError::EmptyRegister(key))?;
		*slot = Some(value);
		Ok(old)
	}

	///occupied registers in key order
	pub fn occupied(&self) -> impl Iterator<Item = (usize, &Operand)> {
		self.slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|o| (i, o)))
	}
}
