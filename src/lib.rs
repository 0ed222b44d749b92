//! Plain-text task lists in the todo.txt format, and a scanner that turns
//! `TODO`/`FIXME`-style source comments into tasks of the same format.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
