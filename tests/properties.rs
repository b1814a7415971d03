use proptest::prelude::*;
use rpncalc::{CalcConfig, Session};

fn session() -> Session {
	Session::new(CalcConfig {rng_seed: Some(5), ..CalcConfig::default()})
}

///tokens that always parse; some of them fail at run time
fn token() -> impl Strategy<Value = String> {
	prop_oneof![
		(-1000_i64..1000).prop_map(|n| n.to_string()),
		(-99_i64..99, 1_u32..4).prop_map(|(n, k)| format!("{}.{}", n, "7".repeat(k as usize))),
		prop::sample::select(vec![
			"+", "-", "*", "/", "%", "^", "dup", "drop", "swap", "neg", "abs", "sqrt", "inv",
			"sum", "max", "rev", "sorta", "up", "down", "sto1", "rcl1", "xchg1", "clear", "prec4",
			"lr", "copy2", "del", "del1-2", "frac8"
		]).prop_map(String::from),
	]
}

fn line() -> impl Strategy<Value = String> {
	prop::collection::vec(token(), 0..8).prop_map(|t| t.join(" "))
}

proptest! {
	#[test]
	fn integer_addition_is_exact(a in -1_000_000_000_i64..1_000_000_000, b in -1_000_000_000_i64..1_000_000_000) {
		let mut s = session();
		let v = s.process(&format!("{a} {b} +")).unwrap();
		prop_assert_eq!(v.entries, vec![(a+b).to_string()]);
	}

	#[test]
	fn rejected_lines_change_nothing(pre in line(), body in line()) {
		let mut s = session();
		s.evaluate(&pre);
		let before = s.evaluate("");
		let undo = s.history().undo_depth();
		let out = s.evaluate(&format!("{body} frob"));
		prop_assert!(out.error.is_some());
		prop_assert_eq!(out.view, before.view);
		prop_assert_eq!(s.history().undo_depth(), undo);
	}

	#[test]
	fn undo_reverts_any_accepted_line(pre in line(), body in line()) {
		let mut s = session();
		s.evaluate(&pre);
		let before = s.evaluate("prec12").view;
		let out = s.evaluate(&body);
		let mutated = out.error.is_none() && body.split_whitespace().any(|t| t!="prec4");
		if mutated {
			let back = s.process("undo prec12").unwrap();
			prop_assert_eq!(back.entries, before.entries);
			prop_assert_eq!(back.registers, before.registers);
		}
	}

	#[test]
	fn double_swap_is_identity(a in -500_i64..500, b in -500_i64..500) {
		let mut s = session();
		s.process(&format!("{a} {b}")).unwrap();
		let v = s.process("swap swap").unwrap();
		prop_assert_eq!(v.entries, vec![a.to_string(), b.to_string()]);
	}

	#[test]
	fn binary_ops_shrink_stack_by_one(vals in prop::collection::vec(1_i64..1000, 2..10), op in prop::sample::select(vec!["+", "-", "*", "/", "%", "^", "hypot"])) {
		let mut s = session();
		let line: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
		s.process(&line.join(" ")).unwrap();
		let v = s.process(op).unwrap();
		prop_assert_eq!(v.entries.len(), vals.len()-1);
		prop_assert_eq!(&v.entries[..vals.len()-2], &line[..vals.len()-2]);
	}

	#[test]
	fn unary_ops_keep_depth(vals in prop::collection::vec(1_i64..1000, 1..10), op in prop::sample::select(vec!["neg", "abs", "sqrt", "inv", "ln", "int", "round", "sin", "to%"])) {
		let mut s = session();
		let line: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
		s.process(&line.join(" ")).unwrap();
		let v = s.process(op).unwrap();
		prop_assert_eq!(v.entries.len(), vals.len());
		prop_assert_eq!(&v.entries[..vals.len()-1], &line[..vals.len()-1]);
	}

	#[test]
	fn dup_copies_top(vals in prop::collection::vec(-1000_i64..1000, 1..10)) {
		let mut s = session();
		let line: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
		s.process(&line.join(" ")).unwrap();
		let v = s.process("dup").unwrap();
		let mut expect = line.clone();
		expect.push(line[line.len()-1].clone());
		prop_assert_eq!(v.entries, expect);
	}

	#[test]
	fn redo_replays_undone_line(pre in line(), body in line()) {
		let mut s = session();
		s.evaluate(&pre);
		let out = s.evaluate(&body);
		if out.error.is_none() && s.history().undo_depth()>0 {
			let after = s.evaluate("").view;
			s.process("undo").unwrap();
			let again = s.process("redo").unwrap();
			prop_assert_eq!(again.entries, after.entries);
			prop_assert_eq!(again.registers, after.registers);
		}
	}
}
