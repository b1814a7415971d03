//!line-oriented front end over generic IO streams

use std::io::{BufRead, Write};
use crate::session::{EvalOutcome, Session, StackView};

///input, output and error streams of a shell
pub struct IOTriple<'a> {
	pub input: &'a mut dyn BufRead,
	pub output: &'a mut dyn Write,
	pub error: &'a mut dyn Write
}
#[macro_export]
///Default IO triple using stdin, stdout, stderr
macro_rules! stdio {
	() => {
		$crate::shell::IOTriple {
			input: &mut ::std::io::BufReader::new(::std::io::stdin()),
			output: &mut ::std::io::stdout(),
			error: &mut ::std::io::stderr()
		}
	}
}

///words that end a shell
fn is_quit(cmd: &str) -> bool {
	matches!(cmd, "q"|"quit"|"exit")
}

///drop a trailing `#` comment
fn strip_comment(line: &str) -> &str {
	line.split_once('#').map_or(line, |(code, _)| code)
}

///stack numbered from the top, the top printed last
pub fn print_stack(out: &mut dyn Write, view: &StackView) -> std::io::Result<()> {
	let n = view.entries.len();
	for (i, e) in view.entries.iter().enumerate() {
		writeln!(out, "{:>3}: {e}", n-i)?;
	}
	Ok(())
}

fn report_problems(err: &mut dyn Write, out: &EvalOutcome) -> std::io::Result<()> {
	if let Some(e) = &out.error {
		writeln!(err, "! {e}")?;
	}
	for w in &out.view.warnings {
		writeln!(err, "! {w}")?;
	}
	Ok(())
}

///Interactive loop: prompt, read a line, evaluate it, print the stack.
///
///Stops at end of input or on `q`, `quit`, `exit`. Only IO failures end it with `Err`;
///rejected lines are reported on the error stream and the loop carries on.
pub fn run(sess: &mut Session, io: &mut IOTriple, prompt: &str) -> std::io::Result<()> {
	let mut line = String::new();
	loop {
		write!(io.output, "{prompt}")?;
		io.output.flush()?;
		line.clear();
		if io.input.read_line(&mut line)?==0 {	//EOF
			writeln!(io.output)?;
			break;
		}
		let cmd = strip_comment(&line).trim();
		if is_quit(cmd) {break;}
		let out = sess.evaluate(cmd);
		report_problems(io.error, &out)?;
		print_stack(io.output, &out.view)?;
	}
	Ok(())
}

///batch mode: evaluate every line of every source in order, then print the final stack once
///
///A quit word ends the whole batch, not just its own source.
pub fn run_lines<'a>(sess: &mut Session, io: &mut IOTriple, sources: impl IntoIterator<Item = &'a str>) -> std::io::Result<()> {
	let mut last = None;
	'batch: for text in sources {
		for line in text.lines() {
			let cmd = strip_comment(line).trim();
			if is_quit(cmd) {break 'batch;}
			if cmd.is_empty() {continue;}
			let out = sess.evaluate(cmd);
			report_problems(io.error, &out)?;
			last = Some(out.view);
		}
	}
	match last {
		Some(v) => print_stack(io.output, &v),
		None => Ok(())
	}
}
