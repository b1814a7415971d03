use pretty_assertions::assert_eq;
use rpncalc::{CalcConfig, EvalError, Session, StackView};

fn session() -> Session {
	Session::new(CalcConfig {rng_seed: Some(99), ..CalcConfig::default()})
}

fn run(s: &mut Session, line: &str) -> Vec<String> {
	s.process(line).unwrap_or_else(|e| panic!("{line}: {e}")).entries
}

fn view(s: &mut Session, line: &str) -> StackView {
	s.process(line).unwrap_or_else(|e| panic!("{line}: {e}"))
}

#[test]
fn square_roots_multiply_exactly() {
	let mut s = session();
	assert_eq!(run(&mut s, "4 sqrt 9 sqrt *"), ["6"]);
}

#[test]
fn store_clear_recall() {
	let mut s = session();
	assert_eq!(run(&mut s, "5 sto1 clear 3 rcl1 +"), ["8"]);
	assert_eq!(view(&mut s, "").registers, [(1, "5".to_string())]);
}

#[test]
fn underflow_on_empty_stack() {
	let mut s = session();
	assert_eq!(s.process("+"), Err(EvalError::StackUnderflow {needed: 2, available: 0}));
	assert!(run(&mut s, "").is_empty());
}

#[test]
fn division_by_zero_keeps_operands() {
	let mut s = session();
	run(&mut s, "10");
	assert_eq!(s.process("0 /"), Err(EvalError::DivisionByZero));
	assert_eq!(run(&mut s, ""), ["10"]);
	assert_eq!(s.process("10 0 /"), Err(EvalError::DivisionByZero));
	assert_eq!(run(&mut s, ""), ["10"]);
}

#[test]
fn undo_redo_across_lines() {
	let mut s = session();
	run(&mut s, "5 3");
	assert_eq!(run(&mut s, "+"), ["8"]);
	assert_eq!(run(&mut s, "undo"), ["5", "3"]);
	assert_eq!(run(&mut s, "redo"), ["8"]);
}

#[test]
fn swap_and_dup() {
	let mut s = session();
	assert_eq!(run(&mut s, "1 2 swap"), ["2", "1"]);
	assert_eq!(run(&mut s, "dup"), ["2", "1", "1"]);
	assert_eq!(run(&mut s, "clear 7 dup *"), ["49"]);
}

#[test]
fn exact_decimal_sums() {
	let mut s = session();
	assert_eq!(run(&mut s, "0.1 0.2 +"), ["0.3"]);
	assert_eq!(run(&mut s, "clear 1 3 / 3 *"), ["1"]);
}

#[test]
fn precision_changes_rendering_only() {
	let mut s = session();
	assert_eq!(run(&mut s, "2 3 /"), ["0.666666666667"]);
	assert_eq!(run(&mut s, "prec2"), ["0.67"]);
	assert_eq!(run(&mut s, "prec0"), ["1"]);
	assert_eq!(run(&mut s, "prec20 3 *"), ["2"]);
}

#[test]
fn bases_for_input_and_output() {
	let mut s = session();
	assert_eq!(run(&mut s, "basehex ff 1 +"), ["100"]);
	assert_eq!(run(&mut s, "basedec"), ["256"]);
	assert_eq!(run(&mut s, "baseoct"), ["400"]);
	assert_eq!(run(&mut s, "basebin 11 +"), ["100000011"]);
	assert_eq!(s.process("2"), Err(EvalError::MalformedLiteral("2".into())));
}

#[test]
fn angle_modes() {
	let mut s = session();
	assert_eq!(run(&mut s, "30 sin prec6"), ["0.5"]);
	assert_eq!(run(&mut s, "clear rad pi 2 / sin"), ["1"]);
	assert_eq!(run(&mut s, "clear deg 1 atan"), ["45"]);
	assert!(matches!(s.process("90 tan"), Err(EvalError::DomainError(_))));
}

#[test]
fn literal_shorthands() {
	let mut s = session();
	assert_eq!(run(&mut s, "1,000 50%"), ["1000", "0.5"]);
	assert_eq!(run(&mut s, "*"), ["500"]);
	assert_eq!(run(&mut s, "clear 3/4"), ["0.75"]);
	assert_eq!(run(&mut s, "clear 6 10*"), ["60"]);
	assert_eq!(run(&mut s, "clear 2e3"), ["2000"]);
}

#[test]
fn stack_rearrangement() {
	let mut s = session();
	assert_eq!(run(&mut s, "1 2 3 4 3 roll"), ["1", "4", "2", "3"]);
	assert_eq!(run(&mut s, "-3 roll"), ["1", "2", "3", "4"]);
	assert_eq!(run(&mut s, "sortd"), ["4", "3", "2", "1"]);
	assert_eq!(run(&mut s, "sorta"), ["1", "2", "3", "4"]);
	assert_eq!(run(&mut s, "sortd"), ["4", "3", "2", "1"]);
	assert_eq!(run(&mut s, "rev"), ["1", "2", "3", "4"]);
	assert_eq!(run(&mut s, "up"), ["2", "3", "4", "1"]);
	assert_eq!(run(&mut s, "down"), ["1", "2", "3", "4"]);
	assert_eq!(run(&mut s, "drop"), ["1", "2", "3"]);
}

#[test]
fn aggregates() {
	let mut s = session();
	assert_eq!(run(&mut s, "1 2 3 4 sum"), ["1", "2", "3", "4", "10"]);
	assert_eq!(run(&mut s, "drop mean"), ["1", "2", "3", "4", "2.5"]);
	assert_eq!(run(&mut s, "drop max"), ["1", "2", "3", "4", "4"]);
	assert_eq!(run(&mut s, "drop min"), ["1", "2", "3", "4", "1"]);
	assert_eq!(run(&mut s, "clear 5 median"), ["5", "5"]);
	assert_eq!(s.process("clear 5 stddev"), Err(EvalError::StackUnderflow {needed: 2, available: 1}));
}

#[test]
fn unit_conversions() {
	let mut s = session();
	assert_eq!(run(&mut s, "1 in2mm"), ["25.4"]);
	assert_eq!(run(&mut s, "mm2in"), ["1"]);
	assert_eq!(run(&mut s, "clear 3 ft2in"), ["36"]);
	assert_eq!(run(&mut s, "clear 10 lb2kg"), ["4.5359237"]);
	assert_eq!(run(&mut s, "clear 0.25 to%"), ["25"]);
	assert_eq!(run(&mut s, "from%"), ["0.25"]);
}

#[test]
fn unary_functions() {
	let mut s = session();
	assert_eq!(run(&mut s, "5 !"), ["120"]);
	assert_eq!(run(&mut s, "clear 4 inv"), ["0.25"]);
	assert_eq!(run(&mut s, "clear -2.7 int"), ["-2"]);
	assert_eq!(run(&mut s, "clear -2.7 abs"), ["2.7"]);
	assert_eq!(run(&mut s, "clear 2.345 round2"), ["2.35"]);
	assert_eq!(run(&mut s, "clear 2.5 round"), ["3"]);
	assert_eq!(run(&mut s, "clear 3 4 hypot"), ["5"]);
	assert_eq!(run(&mut s, "clear 0 exp"), ["1"]);
	assert_eq!(run(&mut s, "clear 7 3 %"), ["1"]);
	assert_eq!(s.process("0 inv"), Err(EvalError::DivisionByZero));
	assert!(matches!(s.process("-1 log"), Err(EvalError::DomainError(_))));
}

#[test]
fn prevmode_swaps_back() {
	let mut s = session();
	run(&mut s, "255");
	assert_eq!(run(&mut s, "basehex"), ["ff"]);
	assert_eq!(run(&mut s, "prevmode"), ["255"]);
	assert_eq!(run(&mut s, "prevmode"), ["ff"]);
}

#[test]
fn whole_line_rejected_on_bad_token() {
	let mut s = session();
	assert_eq!(s.process("1 2 frob"), Err(EvalError::UnknownCommand("frob".into())));
	assert!(run(&mut s, "").is_empty());
	assert_eq!(s.history().undo_depth(), 0);
}

#[test]
fn exchange_with_register() {
	let mut s = session();
	assert_eq!(run(&mut s, "4 sto2 9 xchg2"), ["4", "4"]);
	assert_eq!(run(&mut s, "rcl2"), ["4", "4", "9"]);
	assert_eq!(s.process("xchg5"), Err(EvalError::EmptyRegister(5)));
	assert_eq!(run(&mut s, "cls2 clear"), Vec::<String>::new());
	assert_eq!(s.process("rcl2"), Err(EvalError::EmptyRegister(2)));
}

#[test]
fn undo_covers_registers() {
	let mut s = session();
	run(&mut s, "5 sto1");
	run(&mut s, "clsall");
	assert!(view(&mut s, "").registers.is_empty());
	assert_eq!(view(&mut s, "undo").registers, [(1, "5".to_string())]);
}

#[test]
fn dice_within_bounds() {
	let mut s = session();
	let rolls = run(&mut s, "dice4d6");
	assert_eq!(rolls.len(), 4);
	for r in rolls {
		let v: u32 = r.parse().unwrap();
		assert!((1..=6).contains(&v));
	}
	let r: u32 = run(&mut s, "clear rand")[0].parse().unwrap();
	assert!((1..=100).contains(&r));
}

#[test]
fn literal_exponent_limit() {
	let mut s = session();
	assert_eq!(run(&mut s, "1e100000 log"), ["100000"]);
	assert_eq!(run(&mut s, "clear 1e-100000"), ["0"]);
	assert_eq!(s.process("1e100001"), Err(EvalError::MalformedLiteral("1e100001".into())));
	assert_eq!(s.process("1e-100001"), Err(EvalError::MalformedLiteral("1e-100001".into())));
}

#[test]
fn large_integer_powers_switch_to_floats() {
	let mut s = session();
	assert_eq!(run(&mut s, "3 100000 ^ 10 %"), ["1"]);
	assert_eq!(run(&mut s, "clear 3 100001 ^ 10 %"), ["0"]);
}

#[test]
fn float_results_have_a_range() {
	let mut s = session();
	assert_eq!(run(&mut s, "2 999999 ^")[0].len(), 301_030);
	assert_eq!(s.process("clear 2 1000000 ^"), Err(EvalError::DomainError("result out of range".into())));
	assert_eq!(s.process("clear 1000000 exp"), Err(EvalError::DomainError("result out of range".into())));
	assert_eq!(run(&mut s, "").len(), 1);
}

#[test]
fn factorial_limit() {
	let mut s = session();
	assert_eq!(run(&mut s, "100000 !")[0].len(), 456_574);
	assert!(matches!(s.process("clear 100001 !"), Err(EvalError::DomainError(_))));
}

#[test]
fn dice_limit() {
	let mut s = session();
	assert_eq!(run(&mut s, "dice10000d6").len(), 10_000);
	assert!(matches!(s.process("clear dice10001d6"), Err(EvalError::DomainError(_))));
}

#[test]
fn scale_overflow_is_a_domain_error() {
	let mut s = session();
	assert_eq!(s.process("1e-50000 100000 ^"), Err(EvalError::DomainError("result out of range".into())));
	assert!(run(&mut s, "").is_empty());
	run(&mut s, "1e-100000");
	let squarings = vec!["dup *"; 16].join(" ");
	assert_eq!(s.process(&squarings), Err(EvalError::DomainError("result out of range".into())));
	assert_eq!(run(&mut s, "prec0"), ["0"]);
	assert_eq!(s.stack().items()[0].scale(), 100_000);
}

#[test]
fn display_precision_does_not_change_stored_values() {
	let mut a = session();
	let mut b = session();
	run(&mut a, "prec12 2 3 / 7 * sqrt");
	run(&mut b, "prec40 2 3 / 7 * sqrt");
	assert_eq!(run(&mut a, "prec1000"), run(&mut b, "prec1000"));
}

#[test]
fn regression_and_line_commands() {
	let mut s = session();
	assert_eq!(run(&mut s, "10 20 30 lr"), ["10", "20", "30", "40"]);
	assert_eq!(run(&mut s, "del"), ["10", "20", "30"]);
	assert_eq!(run(&mut s, "lr1"), ["10", "20", "30", "10"]);
	assert_eq!(run(&mut s, "copy3"), ["10", "20", "30", "10", "20"]);
	assert_eq!(run(&mut s, "del2-3"), ["10", "20", "20"]);
	assert_eq!(run(&mut s, "undo"), ["10", "20", "30", "10", "20"]);
	assert_eq!(s.process("del9"), Err(EvalError::StackUnderflow {needed: 9, available: 5}));
	assert_eq!(s.process("copy6"), Err(EvalError::StackUnderflow {needed: 6, available: 5}));
}

#[test]
fn fractions_of_the_top() {
	let mut s = session();
	assert_eq!(run(&mut s, "0.3125 frac"), ["5", "16"]);
	assert_eq!(run(&mut s, "/"), ["0.3125"]);
	assert_eq!(run(&mut s, "clear 3.14159 frac8"), ["25", "8"]);
	assert_eq!(run(&mut s, "clear -0.5 fraction"), ["-1", "2"]);
}

#[test]
fn memory_words_need_numeric_keys() {
	let mut s = session();
	assert_eq!(s.process("5 store"), Err(EvalError::UnknownCommand("store".into())));
	assert_eq!(s.process("5 clsx"), Err(EvalError::UnknownCommand("clsx".into())));
	assert!(matches!(s.process("5 sto12"), Err(EvalError::InvalidRegister(_))));
}

#[test]
fn huge_roll_count_underflows() {
	let mut s = session();
	assert_eq!(s.process("1 2 99999999999999999999 roll"), Err(EvalError::StackUnderflow {needed: usize::MAX, available: 3}));
	assert!(run(&mut s, "").is_empty());
}
