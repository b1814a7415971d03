//!arbitrary-precision decimal operand
//!
//!An [`Operand`] is `mantissa × 10^-scale` on top of a [`rug::Integer`]. Addition, subtraction,
//!multiplication and remainder are exact; everything else is rounded half-up to a requested
//!number of significant digits. Transcendental functions go through [`rug::Float`] with guard
//!bits and come back through an exact binary-to-decimal conversion.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use rug::{Integer, Float, Complete, float::Constant, ops::Pow};
use crate::error::EvalError;
use crate::mode::Base;

///exact integer powers are computed up to this many estimated result digits
const MAX_EXACT_DIGITS: u64 = 100_000;
///binary exponent bound for values coming back from Float, about 300k decimal digits
const MAX_FLOAT_EXP: i32 = 1_000_000;
///largest accepted decimal exponent in scientific literals
const MAX_LITERAL_EXP: i64 = 100_000;
///most fraction digits an exact product or power may carry
const MAX_SCALE: u64 = 2_000_000;

#[inline(always)]
fn pow10(n: u32) -> Integer {
	Integer::u_pow_u(10, n).complete()
}

#[inline(always)]
fn is_zero(n: &Integer) -> bool {
	n.cmp0()==Ordering::Equal
}

///number of decimal digits in the magnitude, 1 for zero
fn digit_count(n: &Integer) -> u32 {
	n.to_string_radix(10).trim_start_matches('-').len() as u32
}

///divide by 10^places, rounding half away from zero
fn div_pow10_half_up(n: &Integer, places: u32) -> Integer {
	if places==0 {return n.clone();}
	let neg = n.cmp0()==Ordering::Less;
	let den = pow10(places);
	let (mut q, r) = n.clone().abs().div_rem(den.clone());
	if r*2_u32 >= den {q += 1;}
	if neg {-q} else {q}
}

///scale of a product or power, refused past MAX_SCALE
fn product_scale(s: u64) -> Result<u32, EvalError> {
	if s<=MAX_SCALE {Ok(s as u32)}
	else {Err(EvalError::domain("result out of range"))}
}

///precision in bits giving `digits` decimal digits plus guard bits
fn float_bits(digits: u32) -> u32 {
	(digits as f64 * std::f64::consts::LOG2_10).ceil() as u32 + 64
}

///arbitrary-precision decimal, always normalized (no trailing zeros in the fraction)
#[derive(Clone, PartialEq, Eq)]
pub struct Operand {
	man: Integer,
	scale: u32,
}

impl Operand {
	///build from unscaled mantissa and scale, normalizing
	pub fn new(man: Integer, scale: u32) -> Self {
		let mut o = Self {man, scale};
		o.normalize();
		o
	}

	pub fn zero() -> Self {
		Self {man: Integer::ZERO, scale: 0}
	}

	fn normalize(&mut self) {
		if is_zero(&self.man) {
			self.scale = 0;
			return;
		}
		while self.scale>0 && self.man.is_divisible_u(10) {
			self.man /= 10_u32;
			self.scale -= 1;
		}
	}

	pub fn mantissa(&self) -> &Integer {&self.man}
	pub fn scale(&self) -> u32 {self.scale}

	pub fn is_zero(&self) -> bool {is_zero(&self.man)}
	pub fn is_negative(&self) -> bool {self.man.cmp0()==Ordering::Less}
	pub fn is_integer(&self) -> bool {self.scale==0}

	///integer part, truncated toward zero
	pub fn to_integer(&self) -> Integer {
		if self.scale==0 {self.man.clone()}
		else {self.man.clone().div_rem(pow10(self.scale)).0}
	}

	///exact value as i64, only for integers that fit
	pub fn to_i64(&self) -> Option<i64> {
		if self.is_integer() {self.man.to_i64()} else {None}
	}

	///(aligned mantissa a, aligned mantissa b, common scale)
	fn align(&self, other: &Self) -> (Integer, Integer, u32) {
		let s = self.scale.max(other.scale);
		(
			self.man.clone() * pow10(s-self.scale),
			other.man.clone() * pow10(s-other.scale),
			s
		)
	}

	pub fn add(&self, other: &Self) -> Self {
		let (a, b, s) = self.align(other);
		Self::new(a+b, s)
	}

	pub fn sub(&self, other: &Self) -> Self {
		let (a, b, s) = self.align(other);
		Self::new(a-b, s)
	}

	pub fn mul(&self, other: &Self) -> Result<Self, EvalError> {
		let scale = product_scale(self.scale as u64 + other.scale as u64)?;
		Ok(Self::new((&self.man * &other.man).complete(), scale))
	}

	pub fn neg(&self) -> Self {
		Self {man: -self.man.clone(), scale: self.scale}
	}

	pub fn abs(&self) -> Self {
		Self {man: self.man.clone().abs(), scale: self.scale}
	}

	///exact quotient num/den of two integers, rounded to `digits` significant digits
	fn quotient(num: Integer, den: Integer, digits: u32) -> Self {
		let neg = (num.cmp0()==Ordering::Less) != (den.cmp0()==Ordering::Less);
		let (num, den) = (num.abs(), den.abs());
		let shift = (digits as i64 + 2 + digit_count(&den) as i64 - digit_count(&num) as i64).max(0) as u32;
		let q = (num * pow10(shift)).div_rem(den).0;	//truncated, at least digits+1 digits
		let q = if neg {-q} else {q};
		Self::new(q, shift).round_sig(digits)
	}

	///division rounded to `digits` significant digits
	pub fn div(&self, other: &Self, digits: u32) -> Result<Self, EvalError> {
		if other.is_zero() {return Err(EvalError::DivisionByZero);}
		Ok(Self::quotient(
			self.man.clone() * pow10(other.scale),
			other.man.clone() * pow10(self.scale),
			digits
		))
	}

	///remainder of truncated division, sign follows the dividend
	pub fn rem(&self, other: &Self) -> Result<Self, EvalError> {
		if other.is_zero() {return Err(EvalError::DivisionByZero);}
		let (a, b, s) = self.align(other);
		Ok(Self::new(a % b, s))
	}

	///round to `digits` significant digits, half away from zero
	pub fn round_sig(&self, digits: u32) -> Self {
		let d = digit_count(&self.man);
		if d<=digits {return self.clone();}
		let drop = d-digits;
		let man = div_pow10_half_up(&self.man, drop);
		if drop<=self.scale {
			Self::new(man, self.scale-drop)
		}
		else {
			Self::new(man * pow10(drop-self.scale), 0)	//rounded inside the integer part
		}
	}

	///round to `places` fraction digits, half away from zero
	pub fn round_places(&self, places: u32) -> Self {
		if self.scale<=places {return self.clone();}
		Self::new(div_pow10_half_up(&self.man, self.scale-places), places)
	}

	///drop the fraction, toward zero
	pub fn trunc(&self) -> Self {
		Self::new(self.to_integer(), 0)
	}

	///power with exact integer exponents where feasible, Float path otherwise
	pub fn pow(&self, exp: &Self, digits: u32) -> Result<Self, EvalError> {
		if exp.is_integer() {
			if exp.is_zero() {return Ok(Self::from(1_i64));}
			if self.is_zero() {
				return if exp.is_negative() {Err(EvalError::DivisionByZero)} else {Ok(Self::zero())};
			}
			let mag = exp.man.clone().abs();
			if let Some(e) = mag.to_u32() {
				if digit_count(&self.man) as u64 * e as u64 <= MAX_EXACT_DIGITS {
					let scale = product_scale(self.scale as u64 * e as u64)?;
					let p = Self::new(self.man.clone().pow(e), scale);
					return if exp.is_negative() {Self::from(1_i64).div(&p, digits)} else {Ok(p)};
				}
			}
			let bits = float_bits(digits);
			let base = self.to_float(bits);
			let e = Float::with_val(bits, &exp.man);
			return Self::from_float(&base.pow(e), digits);
		}
		if self.is_negative() {
			return Err(EvalError::domain("fractional power of a negative number"));
		}
		if self.is_zero() {
			return if exp.is_negative() {Err(EvalError::DivisionByZero)} else {Ok(Self::zero())};
		}
		let bits = float_bits(digits);
		Self::from_float(&self.to_float(bits).pow(exp.to_float(bits)), digits)
	}

	///factorial of a non-negative integer no larger than `limit`
	pub fn factorial(&self, limit: u32) -> Result<Self, EvalError> {
		if !self.is_integer() || self.is_negative() {
			return Err(EvalError::domain("factorial requires a non-negative integer"));
		}
		match self.man.to_u32() {
			Some(n) if n<=limit => Ok(Self::new(Integer::factorial(n).complete(), 0)),
			_ => Err(EvalError::domain(format!("factorial argument above {limit}")))
		}
	}

	/*-------------------
		FLOAT BRIDGE
	-------------------*/
	///approximate as a Float with `bits` of mantissa
	pub fn to_float(&self, bits: u32) -> Float {
		let f = Float::with_val(bits, &self.man);
		if self.scale==0 {f}
		else {f / Float::with_val(bits, pow10(self.scale))}
	}

	///exact decimal expansion of a finite Float, then rounded to `digits` significant digits
	pub fn from_float(f: &Float, digits: u32) -> Result<Self, EvalError> {
		if !f.is_finite() {
			return Err(EvalError::domain("result is not a finite number"));
		}
		if f.is_zero() {return Ok(Self::zero());}
		match f.get_exp() {
			Some(e) if e.abs()<=MAX_FLOAT_EXP => {},
			_ => {return Err(EvalError::domain("result out of range"));}
		}
		let (m, e) = f.to_integer_exp().ok_or_else(|| EvalError::domain("result is not a finite number"))?;
		let exact = if e>=0 {
			Self::new(m << e as u32, 0)
		}
		else {
			let k = e.unsigned_abs();
			Self::new(m * Integer::u_pow_u(5, k).complete(), k)	//m/2^k = m*5^k/10^k
		};
		Ok(exact.round_sig(digits))
	}

	///evaluate a Float function at the working precision
	pub fn float_op(&self, digits: u32, fun: impl FnOnce(Float) -> Float) -> Result<Self, EvalError> {
		Self::from_float(&fun(self.to_float(float_bits(digits))), digits)
	}

	///evaluate a two-argument Float function at the working precision
	pub fn float_op2(&self, other: &Self, digits: u32, fun: impl FnOnce(Float, Float) -> Float) -> Result<Self, EvalError> {
		let bits = float_bits(digits);
		Self::from_float(&fun(self.to_float(bits), other.to_float(bits)), digits)
	}

	///mathematical constant by name at the working precision
	pub fn constant(name: &str, digits: u32) -> Option<Self> {
		let bits = float_bits(digits);
		let f = match name {
			"pi" => Float::with_val(bits, Constant::Pi),
			"euler" => Float::with_val(bits, 1_u8).exp(),
			"phi" => (Float::with_val(bits, 5_u8).sqrt()+1_u8)/2_u8,
			"gamma" => Float::with_val(bits, Constant::Euler),
			"sol" => {return Some(Self::from(299_792_458_i64));},
			_ => {return None;}
		};
		Self::from_float(&f, digits).ok()
	}

	/*-------------
		PARSING
	-------------*/
	///`[+-]digits[.digits]` in the given base, None if any character is off
	pub fn parse_radix(src: &str, base: Base) -> Option<Self> {
		let radix = base.radix();
		let (neg, body) = match src.as_bytes().first() {
			Some(b'-') => (true, &src[1..]),
			Some(b'+') => (false, &src[1..]),
			_ => (false, src)
		};
		let (ipart, fpart) = body.split_once('.').unwrap_or((body, ""));
		if ipart.is_empty() && fpart.is_empty() {return None;}
		if !ipart.chars().chain(fpart.chars()).all(|c| c.is_digit(radix)) {return None;}	//also rejects a second '.'

		let mut man = Integer::from_str_radix(&format!("0{ipart}{fpart}"), radix as i32).ok()?;
		if neg {man = -man;}
		let k = fpart.len() as u32;
		Some(match base.bits_per_digit() {
			None => Self::new(man, k),
			Some(b) => {
				let j = k*b;	//m/2^j = m*5^j/10^j
				Self::new(man * Integer::u_pow_u(5, j).complete(), j)
			}
		})
	}

	///decimal with optional exponent: `1.5e3`, `-2E-4`
	pub fn parse_scientific(src: &str) -> Option<Self> {
		let (m, e) = match src.find(['e', 'E']) {
			Some(i) => (&src[..i], &src[i+1..]),
			None => (src, "")
		};
		let man = Self::parse_radix(m, Base::Dec)?;
		if e.is_empty() {return if src.len()==m.len() {Some(man)} else {None};}
		let exp: i64 = e.parse().ok()?;
		if exp.abs()>MAX_LITERAL_EXP {return None;}
		Some(if exp>=0 {
			Self::new(man.man * pow10(exp as u32), man.scale)
		}
		else {
			Self::new(man.man, man.scale.checked_add(exp.unsigned_abs() as u32)?)
		})
	}

	/*----------------
		RENDERING
	----------------*/
	///exact plain decimal notation
	pub fn to_plain_string(&self) -> String {
		let digits = self.man.to_string_radix(10);
		let (sign, digits) = match digits.strip_prefix('-') {
			Some(d) => ("-", d.to_string()),
			None => ("", digits)
		};
		if self.scale==0 {return format!("{sign}{digits}");}
		let scale = self.scale as usize;
		let padded = if digits.len()<=scale {"0".repeat(scale+1-digits.len()) + &digits} else {digits};
		let (ipart, fpart) = padded.split_at(padded.len()-scale);
		format!("{sign}{ipart}.{fpart}")
	}

	///display form in `base` with `precision` fraction digits
	///
	///Decimal output is rounded half-up, other bases truncate the fraction.
	///The flag is true when fraction digits were cut off in a non-decimal base.
	pub fn render(&self, base: Base, precision: u32) -> (String, bool) {
		if base==Base::Dec {
			return (self.round_places(precision).to_plain_string(), false);
		}
		let radix = base.radix();
		let mag = self.abs();
		let int = mag.trunc();
		let mut out = int.man.to_string_radix(radix as i32);
		let mut frac = mag.sub(&int);
		if !frac.is_zero() && precision>0 {
			out.push('.');
			let mut n = 0;
			while !frac.is_zero() && n<precision {
				frac = Self::new(frac.man * radix, frac.scale);
				let d = frac.trunc();
				out.push_str(&d.man.to_string_radix(radix as i32));
				frac = frac.sub(&d);
				n += 1;
			}
			let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
			out.truncate(trimmed);
		}
		if self.is_negative() && out!="0" {out.insert(0, '-');}
		(out, !frac.is_zero())
	}
}

impl From<i64> for Operand {
	fn from(v: i64) -> Self {
		Self {man: Integer::from(v), scale: 0}
	}
}

impl From<Integer> for Operand {
	fn from(v: Integer) -> Self {
		Self {man: v, scale: 0}
	}
}

impl FromStr for Operand {
	type Err = EvalError;
	///plain or scientific decimal notation
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_scientific(s).ok_or_else(|| EvalError::MalformedLiteral(s.to_string()))
	}
}

impl PartialOrd for Operand {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {Some(self.cmp(other))}
}

impl Ord for Operand {
	fn cmp(&self, other: &Self) -> Ordering {
		let (a, b, _) = self.align(other);
		a.cmp(&b)
	}
}

impl fmt::Display for Operand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_plain_string())
	}
}

impl fmt::Debug for Operand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Operand({})", self.to_plain_string())
	}
}
