//!error taxonomy of the evaluation core and the config loader

///every way a line can be rejected, none of them fatal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
	#[error("Unknown command: '{0}'")]
	UnknownCommand(String),

	#[error("Stack underflow: needs {needed} operand{}, stack has {available}", plural(.needed))]
	StackUnderflow {needed: usize, available: usize},

	#[error("Division by zero")]
	DivisionByZero,

	#[error("Domain error: {0}")]
	DomainError(String),

	#[error("Invalid register: '{0}'")]
	InvalidRegister(String),

	#[error("Register {0} is empty")]
	EmptyRegister(usize),

	#[error("Nothing to undo")]
	NothingToUndo,

	#[error("Nothing to redo")]
	NothingToRedo,

	#[error("Malformed literal: '{0}'")]
	MalformedLiteral(String),
}

///english plural ending
fn plural(n: &usize) -> &'static str {
	if *n==1 {""} else {"s"}
}

impl EvalError {
	///shorthand for domain failures
	pub(crate) fn domain(msg: impl Into<String>) -> Self {
		Self::DomainError(msg.into())
	}
}

///failures while loading or validating a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse TOML: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("validation error: {0}")]
	Validation(String),
}
