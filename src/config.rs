//!calculator configuration, loaded from TOML

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::mode::{AngleUnit, Base, DisplayConfig, MAX_PRECISION};

///digits kept beyond the largest display precision
const GUARD_DIGITS: u32 = 16;

///startup settings of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalcConfig {
	///fraction digits shown
	pub precision: u32,
	pub base: Base,
	pub angle: AngleUnit,
	///significant digits carried by inexact operations, fixed for the whole session
	pub working_digits: u32,
	///number of memory registers
	pub registers: usize,
	///undo depth cap, unbounded when absent
	pub history_limit: Option<usize>,
	///fixed seed for `rand` and `dice`, OS entropy when absent
	pub rng_seed: Option<u64>,
}

impl Default for CalcConfig {
	fn default() -> Self {
		Self {
			precision: 12,
			base: Base::Dec,
			angle: AngleUnit::Deg,
			working_digits: MAX_PRECISION+GUARD_DIGITS,
			registers: 10,
			history_limit: None,
			rng_seed: None,
		}
	}
}

impl CalcConfig {
	///read, parse and validate a TOML file
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
		let config: CalcConfig = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.precision>MAX_PRECISION {
			return Err(ConfigError::Validation(format!("precision must be at most {MAX_PRECISION}, got {}", self.precision)));
		}
		if !(16..=10_000).contains(&self.working_digits) {
			return Err(ConfigError::Validation(format!("working_digits must be between 16 and 10000, got {}", self.working_digits)));
		}
		if !(1..=1000).contains(&self.registers) {
			return Err(ConfigError::Validation(format!("registers must be between 1 and 1000, got {}", self.registers)));
		}
		if self.precision>self.max_precision() {
			return Err(ConfigError::Validation(format!(
				"precision {} needs working_digits of at least {}, got {}",
				self.precision, self.precision+GUARD_DIGITS, self.working_digits
			)));
		}
		if self.history_limit==Some(0) {
			return Err(ConfigError::Validation("history_limit must be at least 1 when set".to_string()));
		}
		Ok(())
	}

	///initial display settings
	pub fn display(&self) -> DisplayConfig {
		DisplayConfig {precision: self.precision, base: self.base, angle: self.angle}
	}

	///largest display precision the working digits can back
	pub fn max_precision(&self) -> u32 {
		self.working_digits.saturating_sub(GUARD_DIGITS).min(MAX_PRECISION)
	}
}
