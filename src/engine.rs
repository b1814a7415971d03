//!operand stack and command execution
//!
//!Every command checks its operands before touching the stack, so a failing command leaves
//!the stack exactly as it found it.

use rand::{Rng, rngs::StdRng};
use rug::{Float, Integer, float::Constant};
use tracing::debug;
use crate::command::{AggregateOp, BinaryOp, MemoryOp, Op, Source, StackOp, UnaryOp};
use crate::error::EvalError;
use crate::mode::AngleUnit;
use crate::num::Operand;
use crate::registers::RegisterBank;

///largest argument accepted by `!`
pub const MAX_FACTORIAL: u32 = 100_000;

///LIFO of operands, index 0 is the bottom
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
	items: Vec<Operand>,
}

impl Stack {
	pub fn new() -> Self {Self::default()}

	pub fn len(&self) -> usize {self.items.len()}
	pub fn is_empty(&self) -> bool {self.items.is_empty()}

	///bottom-first view
	pub fn items(&self) -> &[Operand] {&self.items}

	pub fn push(&mut self, o: Operand) {self.items.push(o);}

	pub fn pop(&mut self) -> Option<Operand> {self.items.pop()}

	///element at `depth` from the top, 0 is the top
	pub fn peek(&self, depth: usize) -> Option<&Operand> {
		self.items.len().checked_sub(depth+1).map(|i| &self.items[i])
	}

	///fail unless at least `n` operands are present
	pub fn require(&self, n: usize) -> Result<(), EvalError> {
		if self.items.len()<n {
			Err(EvalError::StackUnderflow {needed: n, available: self.items.len()})
		}
		else {Ok(())}
	}

	///top two as (second, top), caller has checked arity
	fn top2(&self) -> (&Operand, &Operand) {
		let n = self.items.len();
		(&self.items[n-2], &self.items[n-1])
	}

	fn top(&self) -> &Operand {&self.items[self.items.len()-1]}

	///swap the top for `o`
	fn replace_top(&mut self, o: Operand) {
		let n = self.items.len();
		self.items[n-1] = o;
	}

	///drop the top two and push `o`
	fn collapse2(&mut self, o: Operand) {
		self.items.truncate(self.items.len()-2);
		self.items.push(o);
	}

	///replace all contents
	pub fn restore(&mut self, items: Vec<Operand>) {self.items = items;}
}

///per-command execution parameters
pub struct Env<'a> {
	///significant digits for inexact results
	pub digits: u32,
	pub angle: AngleUnit,
	pub rng: &'a mut StdRng,
}

///execute one non-history, non-mode command against stack and registers
///
///Undo, redo and mode changes are the session's business and pass through untouched.
pub fn apply(stack: &mut Stack, regs: &mut RegisterBank, op: Op, env: &mut Env) -> Result<(), EvalError> {
	stack.require(op.arity())?;
	debug!(?op, depth = stack.len(), "apply");
	match op {
		Op::Binary(b) => {
			let (x, y) = stack.top2();
			let r = binary(b, x, y, env.digits)?;
			stack.collapse2(r);
		},
		Op::Unary(u) => {
			let r = unary(u, stack.top(), env)?;
			stack.replace_top(r);
		},
		Op::Stack(s) => stack_op(s, stack)?,
		Op::Aggregate(a) => {
			let r = aggregate(a, stack.items(), env.digits)?;
			stack.push(r);
		},
		Op::Produce(p) => produce(p, stack, env)?,
		Op::Memory(m) => memory(m, stack, regs)?,
		Op::Fraction(den) => {
			let (num, den) = fraction(stack.top(), den)?;
			stack.replace_top(num);
			stack.push(den);
		},
		Op::Undo|Op::Redo|Op::Mode(_) => {}
	}
	Ok(())
}

/*--------------------
	ARITHMETIC
--------------------*/
///`x` is second from top, `y` is the top
fn binary(op: BinaryOp, x: &Operand, y: &Operand, digits: u32) -> Result<Operand, EvalError> {
	match op {
		BinaryOp::Add => Ok(x.add(y)),
		BinaryOp::Sub => Ok(x.sub(y)),
		BinaryOp::Mul => x.mul(y),
		BinaryOp::Div => x.div(y, digits),
		BinaryOp::Pow => x.pow(y, digits),
		BinaryOp::Rem => x.rem(y),
		BinaryOp::Hypot => x.float_op2(y, digits, |a, b| a.hypot(&b)),
	}
}

#[inline(always)]
fn pi_like(f: &Float) -> Float {
	Float::with_val(f.prec(), Constant::Pi)
}

///angle argument in radians
fn to_rad(f: Float, angle: AngleUnit) -> Float {
	match angle {
		AngleUnit::Rad => f,
		AngleUnit::Deg => {let pi = pi_like(&f); f*pi/180_u32}
	}
}

///radian result in the active unit
fn from_rad(f: Float, angle: AngleUnit) -> Float {
	match angle {
		AngleUnit::Rad => f,
		AngleUnit::Deg => {let pi = pi_like(&f); f*180_u32/pi}
	}
}

///number of quarter turns mod 4 when `x` degrees is an exact multiple of 90
fn quarter_turns(x: &Operand) -> Option<u32> {
	let ninety = Operand::from(90_i64);
	if !x.rem(&ninety).ok()?.is_zero() {return None;}
	Some((x.to_integer() / 90_u32).mod_u(4))
}

fn trig(op: UnaryOp, x: &Operand, env: &Env) -> Result<Operand, EvalError> {
	let (d, a) = (env.digits, env.angle);
	if a==AngleUnit::Deg && matches!(op, UnaryOp::Sin|UnaryOp::Cos|UnaryOp::Tan) {
		if let Some(q) = quarter_turns(x) {	//exact on the axes
			const SIN: [i64; 4] = [0, 1, 0, -1];
			let q = q as usize;
			return match op {
				UnaryOp::Sin => Ok(Operand::from(SIN[q])),
				UnaryOp::Cos => Ok(Operand::from(SIN[(q+1)%4])),
				_ if q%2==0 => Ok(Operand::zero()),
				_ => Err(EvalError::domain("tangent is undefined at odd multiples of 90 degrees"))
			};
		}
	}
	if matches!(op, UnaryOp::Asin|UnaryOp::Acos) && x.abs()>Operand::from(1_i64) {
		return Err(EvalError::domain("inverse sine and cosine need an argument in [-1, 1]"));
	}
	match op {
		UnaryOp::Sin => x.float_op(d, |f| to_rad(f, a).sin()),
		UnaryOp::Cos => x.float_op(d, |f| to_rad(f, a).cos()),
		UnaryOp::Tan => x.float_op(d, |f| to_rad(f, a).tan()),
		UnaryOp::Asin => x.float_op(d, |f| from_rad(f.asin(), a)),
		UnaryOp::Acos => x.float_op(d, |f| from_rad(f.acos(), a)),
		_ => x.float_op(d, |f| from_rad(f.atan(), a)),
	}
}

fn unary(op: UnaryOp, x: &Operand, env: &Env) -> Result<Operand, EvalError> {
	let d = env.digits;
	match op {
		UnaryOp::Sqrt => {
			if x.is_negative() {return Err(EvalError::domain("square root of a negative number"));}
			x.float_op(d, |f| f.sqrt())
		},
		UnaryOp::Sin|UnaryOp::Cos|UnaryOp::Tan|UnaryOp::Asin|UnaryOp::Acos|UnaryOp::Atan => trig(op, x, env),
		UnaryOp::Log|UnaryOp::Ln => {
			if x.is_negative() || x.is_zero() {return Err(EvalError::domain("logarithm of a non-positive number"));}
			if op==UnaryOp::Log {x.float_op(d, |f| f.log10())} else {x.float_op(d, |f| f.ln())}
		},
		UnaryOp::Exp => x.float_op(d, |f| f.exp()),
		UnaryOp::Factorial => x.factorial(MAX_FACTORIAL),
		UnaryOp::Neg => Ok(x.neg()),
		UnaryOp::Inv => Operand::from(1_i64).div(x, d),
		UnaryOp::Abs => Ok(x.abs()),
		UnaryOp::Int => Ok(x.trunc()),
		UnaryOp::Round(places) => Ok(x.round_places(places)),
		UnaryOp::Deg2Rad => x.float_op(d, |f| to_rad(f, AngleUnit::Deg)),
		UnaryOp::Rad2Deg => x.float_op(d, |f| from_rad(f, AngleUnit::Deg)),
		UnaryOp::Convert {factor, invert} => {
			let k = factor.value();
			if invert {x.div(&k, d)} else {x.mul(&k)}
		},
	}
}

/*--------------------
	STACK SHUFFLING
--------------------*/
fn stack_op(op: StackOp, stack: &mut Stack) -> Result<(), EvalError> {
	let n = stack.items.len();
	let items = &mut stack.items;
	match op {
		StackOp::Roll => {return roll(stack);},
		StackOp::Dup => {let t = items[n-1].clone(); items.push(t);},
		StackOp::Drop => {items.pop();},
		StackOp::Swap => {items.swap(n-1, n-2);},
		StackOp::Clear => {items.clear();},
		StackOp::Up => {items.rotate_left(1);},	//bottom comes to the top
		StackOp::Down => {items.rotate_right(1);},	//top goes to the bottom
		StackOp::Reverse => {items.reverse();},
		StackOp::SortAsc => {items.sort();},
		StackOp::SortDesc => {items.sort_by(|a, b| b.cmp(a));},
		StackOp::CopyLine(k) => {let t = items[n-k].clone(); items.push(t);},
		StackOp::DeleteLines {from, to} => {items.drain(n-to..=n-from);},
	}
	Ok(())
}

///pop N, then rotate the top |N| operands by one position
///
///Positive N moves the top down to depth N, negative N brings depth |N| up to the top.
fn roll(stack: &mut Stack) -> Result<(), EvalError> {
	let count = stack.top();
	if !count.is_integer() {
		return Err(EvalError::domain("roll count must be an integer"));
	}
	let back = count.is_negative();
	let span = count.mantissa().clone().abs().to_usize().unwrap_or(usize::MAX);
	stack.require(span.saturating_add(1))?;
	stack.items.pop();
	if span==0 {return Ok(());}
	let k = stack.items.len();
	let window = &mut stack.items[k-span..];
	if back {window.rotate_left(1);}
	else {window.rotate_right(1);}
	Ok(())
}

/*--------------------
	AGGREGATES
--------------------*/
fn sum(items: &[Operand]) -> Operand {
	items.iter().fold(Operand::zero(), |acc, x| acc.add(x))
}

fn mean(items: &[Operand], digits: u32) -> Result<Operand, EvalError> {
	sum(items).div(&Operand::from(items.len() as i64), digits)
}

fn aggregate(op: AggregateOp, items: &[Operand], digits: u32) -> Result<Operand, EvalError> {
	match op {
		AggregateOp::Sum => Ok(sum(items)),
		AggregateOp::Mean => mean(items, digits),
		AggregateOp::StdDev => {	//population
			let m = mean(items, digits)?;
			let sq = items.iter().map(|x| {let d = x.sub(&m); d.mul(&d)}).collect::<Result<Vec<_>, _>>()?;
			let var = mean(&sq, digits)?;
			var.float_op(digits, |f| f.sqrt())
		},
		AggregateOp::Median => {
			let mut v: Vec<&Operand> = items.iter().collect();
			v.sort();
			let n = v.len();
			if n%2==1 {Ok(v[n/2].clone())}
			else {
				let half = Operand::new(Integer::from(5), 1);
				v[n/2-1].add(v[n/2]).mul(&half)
			}
		},
		AggregateOp::Min => items.iter().min().cloned().ok_or(EvalError::StackUnderflow {needed: 1, available: 0}),
		AggregateOp::Max => items.iter().max().cloned().ok_or(EvalError::StackUnderflow {needed: 1, available: 0}),
		AggregateOp::Regression {at} => regression(items, at, digits),
	}
}

///least-squares fit y = a + bx over (1, y1) .. (n, yn), evaluated at `at` or n+1
///
///All sums are exact, the only rounding is the final division.
fn regression(items: &[Operand], at: Option<u32>, digits: u32) -> Result<Operand, EvalError> {
	let n = Operand::from(items.len() as i64);
	let (mut sx, mut sx2, mut sy, mut sxy) = (Operand::zero(), Operand::zero(), Operand::zero(), Operand::zero());
	for (i, y) in items.iter().enumerate() {
		let x = Operand::from(i as i64 + 1);
		sx = sx.add(&x);
		sx2 = sx2.add(&x.mul(&x)?);
		sy = sy.add(y);
		sxy = sxy.add(&x.mul(y)?);
	}
	let den = n.mul(&sx2)?.sub(&sx.mul(&sx)?);
	let a = sy.mul(&sx2)?.sub(&sx.mul(&sxy)?);	//intercept times den
	let b = n.mul(&sxy)?.sub(&sx.mul(&sy)?);	//slope times den
	let x = Operand::from(at.map_or(items.len() as i64 + 1, i64::from));
	a.add(&b.mul(&x)?).div(&den, digits)
}

///nearest `num/den` to `x` with the given denominator, half-up, in lowest terms
fn fraction(x: &Operand, den: u32) -> Result<(Operand, Operand), EvalError> {
	let num = x.mul(&Operand::from(den as i64))?.round_places(0).to_integer();
	let den = Integer::from(den);
	let g = num.clone().gcd(&den);
	Ok((Operand::from(num / &g), Operand::from(den / &g)))
}

/*--------------------
	PRODUCERS
--------------------*/
fn produce(src: Source, stack: &mut Stack, env: &mut Env) -> Result<(), EvalError> {
	match src {
		Source::Const(c) => {
			let v = Operand::constant(c.name(), env.digits)
				.ok_or_else(|| EvalError::domain(format!("constant {} unavailable", c.name())))?;
			stack.push(v);
		},
		Source::Random => {
			stack.push(Operand::from(env.rng.gen_range(1..=100_i64)));
		},
		Source::Dice {count, sides} => {	//one operand per roll
			for _ in 0..count {
				stack.push(Operand::from(env.rng.gen_range(1..=sides as i64)));
			}
		},
	}
	Ok(())
}

/*--------------------
	MEMORY
--------------------*/
fn memory(op: MemoryOp, stack: &mut Stack, regs: &mut RegisterBank) -> Result<(), EvalError> {
	match op {
		MemoryOp::Store(k) => regs.store(k, stack.top().clone()),
		MemoryOp::Recall(k) => {
			stack.push(regs.recall(k)?);
			Ok(())
		},
		MemoryOp::Clear(k) => regs.clear(k),
		MemoryOp::ClearAll => {regs.clear_all(); Ok(())},
		MemoryOp::Exchange(k) => {
			let old = regs.exchange(k, stack.top().clone())?;
			stack.replace_top(old);
			Ok(())
		},
	}
}
