//!display settings: precision, numeric base, angle unit

use std::fmt;
use serde::{Deserialize, Serialize};

///numeric base for literal input and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base {
	Dec,
	Hex,
	Oct,
	Bin,
}

impl Base {
	pub fn radix(self) -> u32 {
		match self {
			Self::Dec => 10,
			Self::Hex => 16,
			Self::Oct => 8,
			Self::Bin => 2,
		}
	}

	///bits per digit for power-of-two bases
	pub fn bits_per_digit(self) -> Option<u32> {
		match self {
			Self::Dec => None,
			Self::Hex => Some(4),
			Self::Oct => Some(3),
			Self::Bin => Some(1),
		}
	}
}

impl fmt::Display for Base {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Dec => "dec",
			Self::Hex => "hex",
			Self::Oct => "oct",
			Self::Bin => "bin",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
	Deg,
	Rad,
}

impl fmt::Display for AngleUnit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Deg => "deg",
			Self::Rad => "rad",
		})
	}
}

///largest accepted display precision
pub const MAX_PRECISION: u32 = 1000;

///one change of display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
	Precision(u32),
	Base(Base),
	Angle(AngleUnit),
	///swap with the previous-settings slot
	Previous,
}

///rendering parameters, never consulted by arithmetic except for the angle unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
	pub precision: u32,
	pub base: Base,
	pub angle: AngleUnit,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {precision: 12, base: Base::Dec, angle: AngleUnit::Deg}
	}
}

///current settings plus the single-level previous slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
	pub current: DisplayConfig,
	pub previous: Option<DisplayConfig>,
}

impl Modes {
	pub fn new(current: DisplayConfig) -> Self {
		Self {current, previous: None}
	}

	///apply a change; the slot always holds the settings from before the last change
	pub fn apply(&mut self, change: ModeChange) {
		let before = self.current;
		match change {
			ModeChange::Precision(p) => {self.current.precision = p;},
			ModeChange::Base(b) => {self.current.base = b;},
			ModeChange::Angle(a) => {self.current.angle = a;},
			ModeChange::Previous => {
				if let Some(prev) = self.previous {
					self.current = prev;
				}
				else {return;}	//nothing to go back to
			},
		}
		self.previous = Some(before);
	}
}
