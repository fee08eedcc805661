//! An interpreter for a small turtle-graphics LOGO.
//!
//! There's no parse tree. Each line is run straight from its text: the evaluator takes tokens
//! off the front of a [`token::Buffer`]. A call made while gathering inputs hands its value
//! straight to the caller, so `FD SUM 10 20` moves forward 30. A call in command position has its
//! value spliced back onto the front of the buffer, where the next command finds it: `SUM 1 2`
//! on its own leaves a 3 that nothing uses.
//!
//! The outside world is behind two traits: a [`Device`] for the turtle to draw on, and a
//! [`Console`] for reading lines and printing results.

pub mod args;
pub mod console;
pub mod define;
pub mod env;
pub mod eval;
pub mod parse;
pub mod proc;
pub mod session;
pub mod symbols;
pub mod token;
pub mod turtle;
pub mod typ;

pub use console::{Console, ScriptConsole};
pub use env::{Config, Env, Scope};
pub use session::Session;
pub use turtle::{Device, Geometry, Recording};
pub use typ::{Error, Procedure, Value};
