//!command vocabulary and token classification
//!
//!A line is split on whitespace and every token is resolved to one or more [`Command`]s before
//!anything executes. Resolution order: numeric literal in the active base, fixed vocabulary,
//!parameterized forms (`sto3`, `prec4`, `dice2d6`, ...), and finally the error kind.

use phf::phf_map;
use regex::Regex;
use rug::Integer;
use tracing::debug;
use crate::error::EvalError;
use crate::mode::{AngleUnit, Base, ModeChange, Modes, MAX_PRECISION};
use crate::num::Operand;

///most rolls a single `dice<X>d<Y>` token may ask for
pub const MAX_DICE: u32 = 10_000;
///denominator of a bare `frac`
pub const DEFAULT_DENOMINATOR: u32 = 64;

///exact conversion factor `man × 10^-scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Factor {
	pub man: i64,
	pub scale: u32,
}

impl Factor {
	pub fn value(self) -> Operand {
		Operand::new(Integer::from(self.man), self.scale)
	}
}

const HUNDRED: Factor = Factor {man: 100, scale: 0};
const MM_PER_INCH: Factor = Factor {man: 254, scale: 1};
const INCH_PER_FOOT: Factor = Factor {man: 12, scale: 0};
const KG_PER_POUND: Factor = Factor {man: 45_359_237, scale: 8};
const GRAM_PER_OUNCE: Factor = Factor {man: 28_349_523_125, scale: 9};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	Pow,
	Rem,
	Hypot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
	Sqrt,
	Sin,
	Cos,
	Tan,
	Asin,
	Acos,
	Atan,
	Log,
	Ln,
	Exp,
	Factorial,
	Neg,
	Inv,
	Abs,
	Int,
	///round half-up to this many fraction digits
	Round(u32),
	Deg2Rad,
	Rad2Deg,
	///multiply by an exact factor, or divide by it when `invert`
	Convert {factor: Factor, invert: bool},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
	Dup,
	Drop,
	Swap,
	Clear,
	Roll,
	Up,
	Down,
	Reverse,
	///ascending from the bottom, largest on top
	SortAsc,
	SortDesc,
	///push a copy of this line, 1 is the top
	CopyLine(usize),
	///remove lines `from..=to`, 1 is the top
	DeleteLines {from: usize, to: usize},
}

///whole-stack reductions, pushed on top without consuming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
	Sum,
	Mean,
	StdDev,
	Median,
	Min,
	Max,
	///least-squares line through the stack, bottom is x=1, evaluated at `at` or one past the top
	Regression {at: Option<u32>},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
	Pi,
	Euler,
	Phi,
	Gamma,
	Sol,
}

impl Constant {
	pub fn name(self) -> &'static str {
		match self {
			Self::Pi => "pi",
			Self::Euler => "euler",
			Self::Phi => "phi",
			Self::Gamma => "gamma",
			Self::Sol => "sol",
		}
	}
}

///zero-arity producers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	Const(Constant),
	///uniform integer in 1..=100
	Random,
	Dice {count: u32, sides: u32},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOp {
	Store(usize),
	Recall(usize),
	Clear(usize),
	Exchange(usize),
	ClearAll,
}

///everything except literal pushes; closed and copyable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
	Binary(BinaryOp),
	Unary(UnaryOp),
	Stack(StackOp),
	Aggregate(AggregateOp),
	Produce(Source),
	Memory(MemoryOp),
	///replace the top by numerator and denominator of the nearest fraction over this denominator
	Fraction(u32),
	Undo,
	Redo,
	Mode(ModeChange),
}

impl Op {
	///operands that must be present before the command runs
	pub fn arity(&self) -> usize {
		match self {
			Self::Binary(_) => 2,
			Self::Unary(_) => 1,
			Self::Stack(s) => match s {
				StackOp::Dup|StackOp::Drop|StackOp::Roll => 1,
				StackOp::Swap|StackOp::Up|StackOp::Down => 2,
				StackOp::Clear|StackOp::Reverse|StackOp::SortAsc|StackOp::SortDesc => 0,
				StackOp::CopyLine(n) => *n,
				StackOp::DeleteLines {to, ..} => *to,
			},
			Self::Aggregate(AggregateOp::StdDev|AggregateOp::Regression {..}) => 2,
			Self::Aggregate(_) => 1,
			Self::Fraction(_) => 1,
			Self::Memory(MemoryOp::Store(_)|MemoryOp::Exchange(_)) => 1,
			Self::Produce(_)|Self::Memory(_)|Self::Undo|Self::Redo|Self::Mode(_) => 0,
		}
	}

	///whether the command changes stack or registers and so needs a snapshot
	pub fn is_mutating(&self) -> bool {
		!matches!(self, Self::Undo|Self::Redo|Self::Mode(_))
	}
}

///one resolved command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Push(Operand),
	Op(Op),
}

impl Command {
	pub fn arity(&self) -> usize {
		match self {
			Self::Push(_) => 0,
			Self::Op(op) => op.arity(),
		}
	}

	pub fn is_mutating(&self) -> bool {
		match self {
			Self::Push(_) => true,
			Self::Op(op) => op.is_mutating(),
		}
	}
}

use self::BinaryOp as B;
use self::UnaryOp as U;
use self::StackOp as S;
use self::AggregateOp as A;

///fixed vocabulary
static VOCAB: phf::Map<&'static str, Op> = phf_map! {
	"+" => Op::Binary(B::Add),
	"-" => Op::Binary(B::Sub),
	"*" => Op::Binary(B::Mul),
	"/" => Op::Binary(B::Div),
	"^" => Op::Binary(B::Pow),
	"%" => Op::Binary(B::Rem),
	"hypot" => Op::Binary(B::Hypot),

	"sqrt" => Op::Unary(U::Sqrt),
	"sin" => Op::Unary(U::Sin),
	"cos" => Op::Unary(U::Cos),
	"tan" => Op::Unary(U::Tan),
	"asin" => Op::Unary(U::Asin),
	"acos" => Op::Unary(U::Acos),
	"atan" => Op::Unary(U::Atan),
	"log" => Op::Unary(U::Log),
	"ln" => Op::Unary(U::Ln),
	"exp" => Op::Unary(U::Exp),
	"!" => Op::Unary(U::Factorial),
	"neg" => Op::Unary(U::Neg),
	"inv" => Op::Unary(U::Inv),
	"abs" => Op::Unary(U::Abs),
	"int" => Op::Unary(U::Int),
	"round" => Op::Unary(U::Round(0)),
	"deg2rad" => Op::Unary(U::Deg2Rad),
	"rad2deg" => Op::Unary(U::Rad2Deg),
	"to%" => Op::Unary(U::Convert {factor: HUNDRED, invert: false}),
	"from%" => Op::Unary(U::Convert {factor: HUNDRED, invert: true}),
	"in2mm" => Op::Unary(U::Convert {factor: MM_PER_INCH, invert: false}),
	"mm2in" => Op::Unary(U::Convert {factor: MM_PER_INCH, invert: true}),
	"ft2in" => Op::Unary(U::Convert {factor: INCH_PER_FOOT, invert: false}),
	"in2ft" => Op::Unary(U::Convert {factor: INCH_PER_FOOT, invert: true}),
	"lb2kg" => Op::Unary(U::Convert {factor: KG_PER_POUND, invert: false}),
	"kg2lb" => Op::Unary(U::Convert {factor: KG_PER_POUND, invert: true}),
	"oz2gram" => Op::Unary(U::Convert {factor: GRAM_PER_OUNCE, invert: false}),
	"gram2oz" => Op::Unary(U::Convert {factor: GRAM_PER_OUNCE, invert: true}),

	"dup" => Op::Stack(S::Dup),
	"drop" => Op::Stack(S::Drop),
	"swap" => Op::Stack(S::Swap),
	"clear" => Op::Stack(S::Clear),
	"roll" => Op::Stack(S::Roll),
	"up" => Op::Stack(S::Up),
	"down" => Op::Stack(S::Down),
	"rev" => Op::Stack(S::Reverse),
	"sorta" => Op::Stack(S::SortAsc),
	"sortd" => Op::Stack(S::SortDesc),

	"sum" => Op::Aggregate(A::Sum),
	"mean" => Op::Aggregate(A::Mean),
	"stddev" => Op::Aggregate(A::StdDev),
	"median" => Op::Aggregate(A::Median),
	"min" => Op::Aggregate(A::Min),
	"max" => Op::Aggregate(A::Max),
	"lr" => Op::Aggregate(A::Regression {at: None}),

	"pi" => Op::Produce(Source::Const(Constant::Pi)),
	"euler" => Op::Produce(Source::Const(Constant::Euler)),
	"phi" => Op::Produce(Source::Const(Constant::Phi)),
	"gamma" => Op::Produce(Source::Const(Constant::Gamma)),
	"sol" => Op::Produce(Source::Const(Constant::Sol)),
	"rand" => Op::Produce(Source::Random),
	"dice" => Op::Produce(Source::Dice {count: 1, sides: 6}),

	"clsall" => Op::Memory(MemoryOp::ClearAll),

	"undo" => Op::Undo,
	"redo" => Op::Redo,

	"basedec" => Op::Mode(ModeChange::Base(Base::Dec)),
	"basehex" => Op::Mode(ModeChange::Base(Base::Hex)),
	"baseoct" => Op::Mode(ModeChange::Base(Base::Oct)),
	"basebin" => Op::Mode(ModeChange::Base(Base::Bin)),
	"deg" => Op::Mode(ModeChange::Angle(AngleUnit::Deg)),
	"rad" => Op::Mode(ModeChange::Angle(AngleUnit::Rad)),
	"prevmode" => Op::Mode(ModeChange::Previous),
};

lazy_static! {
	static ref MEMORY: Regex = Regex::new(r"^(sto|rcl|cls|xchg)(\d*)$").unwrap();
	static ref COPY: Regex = Regex::new(r"^copy(\d*)$").unwrap();
	static ref DELETE: Regex = Regex::new(r"^(?:del|delete)(?:(\d+)(?:-(\d+))?)?$").unwrap();
	static ref REGRESSION: Regex = Regex::new(r"^lr(\d+)$").unwrap();
	static ref TO_FRACTION: Regex = Regex::new(r"^(?:frac|fraction)(\d*)$").unwrap();
	static ref PREC: Regex = Regex::new(r"^prec(\d+)$").unwrap();
	static ref ROUND: Regex = Regex::new(r"^round(\d+)$").unwrap();
	static ref DICE: Regex = Regex::new(r"^dice(\d+)d(\d+)$").unwrap();
	static ref PERCENT: Regex = Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+))%$").unwrap();
	static ref FRACTION: Regex = Regex::new(r"^([+-]?\d+)/(\d+)$").unwrap();
	static ref NUMOP: Regex = Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)([-+*/^])$").unwrap();
	static ref NUMERIC_LOOK: Regex = Regex::new(r"^[+-]?\.?\d").unwrap();
}

///literal in the active base, plus the decimal-only shorthand forms
fn literal(token: &str, base: Base) -> Option<Vec<Command>> {
	if let Some(n) = Operand::parse_radix(token, base) {
		return Some(vec![Command::Push(n)]);
	}
	if base!=Base::Dec {return None;}

	let plain = token.replace(',', "");	//thousands separators
	if plain.is_empty() {return None;}
	if let Some(n) = Operand::parse_scientific(&plain) {
		return Some(vec![Command::Push(n)]);
	}
	if let Some(c) = PERCENT.captures(&plain) {
		let n = Operand::parse_radix(&c[1], Base::Dec)?;
		let pct = Operand::new(n.mantissa().clone(), n.scale()+2);
		return Some(vec![Command::Push(pct)]);
	}
	if let Some(c) = FRACTION.captures(&plain) {
		let num = Operand::parse_radix(&c[1], Base::Dec)?;
		let den = Operand::parse_radix(&c[2], Base::Dec)?;
		return Some(vec![Command::Push(num), Command::Push(den), Command::Op(Op::Binary(B::Div))]);
	}
	if let Some(c) = NUMOP.captures(&plain) {
		let n = Operand::parse_scientific(&c[1])?;
		let op = *VOCAB.get(&c[2])?;
		return Some(vec![Command::Push(n), Command::Op(op)]);
	}
	None
}

///register key from the digits of a memory token, bare token means register 0
fn register_key(token: &str, digits: &str) -> Result<usize, EvalError> {
	if digits.is_empty() {return Ok(0);}
	digits.parse().map_err(|_| EvalError::InvalidRegister(token.to_string()))
}

///stack line from the digits of a token, `default` when there are none
fn line_number(token: &str, digits: Option<&str>, default: usize) -> Result<usize, EvalError> {
	match digits.filter(|d| !d.is_empty()) {
		None => Ok(default),
		Some(d) => match d.parse::<usize>() {
			Ok(n) if n>=1 => Ok(n),
			_ => Err(EvalError::domain(format!("'{token}' needs a line number of at least 1")))
		}
	}
}

///parameterized tokens
fn pattern(token: &str) -> Option<Result<Op, EvalError>> {
	if let Some(c) = MEMORY.captures(token) {
		return Some(register_key(token, &c[2]).map(|k| Op::Memory(match &c[1] {
			"sto" => MemoryOp::Store(k),
			"rcl" => MemoryOp::Recall(k),
			"cls" => MemoryOp::Clear(k),
			_ => MemoryOp::Exchange(k),
		})));
	}
	if let Some(c) = COPY.captures(token) {
		return Some(line_number(token, Some(&c[1]), 1).map(|n| Op::Stack(S::CopyLine(n))));
	}
	if let Some(c) = DELETE.captures(token) {
		let group = |i| c.get(i).map(|m| m.as_str());
		return Some(line_number(token, group(1), 1).and_then(|a| {
			let b = line_number(token, group(2), a)?;
			Ok(Op::Stack(S::DeleteLines {from: a.min(b), to: a.max(b)}))
		}));
	}
	if let Some(c) = REGRESSION.captures(token) {
		return Some(match c[1].parse::<u32>() {
			Ok(x) => Ok(Op::Aggregate(A::Regression {at: Some(x)})),
			Err(_) => Err(EvalError::domain(format!("'{token}' names a position out of range")))
		});
	}
	if let Some(c) = TO_FRACTION.captures(token) {
		if c[1].is_empty() {return Some(Ok(Op::Fraction(DEFAULT_DENOMINATOR)));}
		return Some(match c[1].parse::<u32>() {
			Ok(d) if d>=1 => Ok(Op::Fraction(d)),
			_ => Err(EvalError::domain(format!("fraction denominator must be between 1 and {}", u32::MAX)))
		});
	}
	if let Some(c) = PREC.captures(token) {
		return Some(match c[1].parse::<u32>() {
			Ok(p) if p<=MAX_PRECISION => Ok(Op::Mode(ModeChange::Precision(p))),
			_ => Err(EvalError::domain(format!("precision must be between 0 and {MAX_PRECISION}")))
		});
	}
	if let Some(c) = ROUND.captures(token) {
		return Some(match c[1].parse::<u32>() {
			Ok(p) if p<=MAX_PRECISION => Ok(Op::Unary(U::Round(p))),
			_ => Err(EvalError::domain(format!("rounding places must be between 0 and {MAX_PRECISION}")))
		});
	}
	if let Some(c) = DICE.captures(token) {
		return Some(match (c[1].parse::<u32>(), c[2].parse::<u32>()) {
			(Ok(count), Ok(sides)) if (1..=MAX_DICE).contains(&count) && sides>=1 => {
				Ok(Op::Produce(Source::Dice {count, sides}))
			},
			_ => Err(EvalError::domain(format!("dice needs 1 to {MAX_DICE} rolls of at least 1 side")))
		});
	}
	None
}

///resolve one token in the given base
pub fn classify(token: &str, base: Base) -> Result<Vec<Command>, EvalError> {
	if let Some(cmds) = literal(token, base) {
		return Ok(cmds);
	}
	if let Some(op) = VOCAB.get(token) {
		return Ok(vec![Command::Op(*op)]);
	}
	if let Some(res) = pattern(token) {
		return res.map(|op| vec![Command::Op(op)]);
	}
	if NUMERIC_LOOK.is_match(token) {
		Err(EvalError::MalformedLiteral(token.to_string()))
	}
	else {
		Err(EvalError::UnknownCommand(token.to_string()))
	}
}

///resolve a whole line, following base changes made by earlier tokens of the same line
pub fn tokenize(line: &str, modes: &Modes) -> Result<Vec<Command>, EvalError> {
	let mut modes = *modes;
	let mut out = Vec::new();
	for token in line.split_whitespace() {
		let cmds = classify(token, modes.current.base)?;
		debug!(token, ?cmds, "classified");
		for c in &cmds {
			if let Command::Op(Op::Mode(m)) = c {
				modes.apply(*m);
			}
		}
		out.extend(cmds);
	}
	Ok(out)
}
