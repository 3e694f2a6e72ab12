// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
// Additional warnings that are allow by default (`rustc -W help`)
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused)]

pub mod background;
pub mod board;
pub mod data;
pub mod editor;
pub mod solver;

use crate::board::Board;
use crate::solver::{SolverErr, SolverOk};

pub trait Solve {
    fn solve(&self, goal: &Board, print_status: bool) -> Result<SolverOk, SolverErr>;
}
