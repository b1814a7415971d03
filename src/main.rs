use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use rpncalc::{shell, stdio, CalcConfig, Session};

///RPN calculator with arbitrary-precision decimals, memory registers and undo
#[derive(Parser)]
#[command(name = "rpncalc", version, about, long_about = None)]
struct Cli {
	///TOML configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	///evaluate an expression line, may be repeated
	#[arg(short, long)]
	expr: Vec<String>,

	///evaluate a file line by line, `#` starts a comment
	#[arg(short, long)]
	file: Vec<PathBuf>,

	///continue interactively after expressions and files
	#[arg(short, long)]
	inter: bool,

	///prompt for interactive mode
	#[arg(short, long, default_value = "> ")]
	prompt: String,

	///more log output on stderr (-v, -vv)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let filter = match cli.verbose {
		0 => "warn",
		1 => "debug",
		_ => "trace",
	};
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
		.with_writer(std::io::stderr)
		.init();

	let config = match &cli.config {
		Some(path) => CalcConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => CalcConfig::default(),
	};
	debug!(?config, "configuration");
	let mut sess = Session::new(config);
	let mut io = stdio!();

	let mut sources = cli.expr.clone();
	for f in &cli.file {
		let text = std::fs::read_to_string(f).with_context(|| format!("reading {}", f.display()))?;
		info!(file = %f.display(), lines = text.lines().count(), "loaded file");
		sources.push(text);
	}
	shell::run_lines(&mut sess, &mut io, sources.iter().map(String::as_str))?;
	if cli.inter || (cli.expr.is_empty() && cli.file.is_empty()) {	//default to interactive
		shell::run(&mut sess, &mut io, &cli.prompt)?;
	}
	Ok(())
}
