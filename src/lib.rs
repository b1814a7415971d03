//!Console RPN calculator core: arbitrary-precision decimal operands on a stack, numbered memory
//!registers, multi-level undo/redo and switchable display modes.
//!
//!```
//!let mut sess = rpncalc::Session::default();
//!let view = sess.process("4 sqrt 9 sqrt *").unwrap();
//!assert_eq!(view.entries, ["6"]);
//!```

#[macro_use]
extern crate lazy_static;

pub mod error;
pub mod num;
pub mod mode;
pub mod command;
pub mod engine;
pub mod registers;
pub mod history;
pub mod config;
pub mod session;
pub mod shell;

pub use config::CalcConfig;
pub use error::{ConfigError, EvalError};
pub use num::Operand;
pub use session::{EvalOutcome, Session, StackView};
pub use shell::IOTriple;
