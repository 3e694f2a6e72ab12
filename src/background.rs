use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::debug;

use crate::board::Board;
use crate::solver::{self, SolverErr, SolverOk};

/// Lifecycle of a background solve.
#[derive(Debug)]
pub enum TaskState {
    NotStarted,
    Running,
    Completed(Result<SolverOk, SolverErr>),
}

/// Runs one solve on a worker thread so an interactive caller can keep
/// polling instead of blocking. One task runs at most one solve - `start`
/// refuses a second launch. There is no cancellation, the search always
/// runs to completion.
#[derive(Debug)]
pub struct SolverTask {
    state: TaskState,
    result_rx: Option<Receiver<Result<SolverOk, SolverErr>>>,
    worker: Option<JoinHandle<()>>,
}

impl SolverTask {
    pub fn new() -> Self {
        SolverTask {
            state: TaskState::NotStarted,
            result_rx: None,
            worker: None,
        }
    }

    /// Launches the solve on a worker thread. False without doing anything
    /// if this task was already started.
    pub fn start(&mut self, start: Board, goal: Board) -> bool {
        if !matches!(self.state, TaskState::NotStarted) {
            return false;
        }

        let (result_tx, result_rx) = mpsc::channel();
        self.worker = Some(thread::spawn(move || {
            debug!("Solving on worker thread");
            // the receiver is only gone if the task itself was dropped
            let _ = result_tx.send(solver::solve(&start, &goal, false));
        }));
        self.result_rx = Some(result_rx);
        self.state = TaskState::Running;
        true
    }

    /// Current state. Polls the worker while `Running` and promotes to
    /// `Completed` once the result is in. Never blocks.
    pub fn state(&mut self) -> &TaskState {
        if matches!(self.state, TaskState::Running) {
            // `solve` neither panics nor drops the sender before sending,
            // so the only errors here are "not done yet"
            let received = match &self.result_rx {
                Some(result_rx) => result_rx.try_recv().ok(),
                None => None,
            };
            if let Some(result) = received {
                if let Some(worker) = self.worker.take() {
                    // the result was already sent, this doesn't wait
                    let _ = worker.join();
                }
                self.result_rx = None;
                self.state = TaskState::Completed(result);
            }
        }
        &self.state
    }
}

impl Default for SolverTask {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::data::Cell;

    fn poll_to_completion(task: &mut SolverTask) -> Result<SolverOk, SolverErr> {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            if let TaskState::Completed(_) = task.state() {
                break;
            }
            assert!(Instant::now() < deadline, "solver task did not finish");
            thread::sleep(Duration::from_millis(1));
        }
        match std::mem::replace(&mut task.state, TaskState::NotStarted) {
            TaskState::Completed(result) => result,
            _ => unreachable!(),
        }
    }

    #[test]
    fn solves_in_background() {
        let goal = Board::goal(3).unwrap();
        let mut start = goal.clone();
        assert!(start.move_tile(crate::data::Pos::new(2, 1)));
        assert!(start.move_tile(crate::data::Pos::new(1, 1)));

        let mut task = SolverTask::new();
        assert!(matches!(task.state(), TaskState::NotStarted));
        assert!(task.start(start.clone(), goal.clone()));

        let solution = poll_to_completion(&mut task).unwrap();
        let boards = solution.path_boards.unwrap();
        assert_eq!(boards.first(), Some(&start));
        assert_eq!(boards.last(), Some(&goal));
        assert_eq!(boards.len(), 3);
    }

    #[test]
    fn starts_only_once() {
        let goal = Board::goal(2).unwrap();
        let mut task = SolverTask::new();

        assert!(task.start(goal.clone(), goal.clone()));
        // already running or done - either way the second launch is refused
        assert!(!task.start(goal.clone(), goal.clone()));

        let solution = poll_to_completion(&mut task).unwrap();
        assert_eq!(solution.move_cnt(), Some(0));
    }

    #[test]
    fn reports_no_solution() {
        let start = Board::from_cells(
            2,
            vec![Cell::Tile(2), Cell::Tile(1), Cell::Tile(3), Cell::Empty],
        )
        .unwrap();
        let goal = Board::goal(2).unwrap();

        let mut task = SolverTask::new();
        assert!(task.start(start, goal));
        let solution = poll_to_completion(&mut task).unwrap();
        assert_eq!(solution.path_boards, None);
    }
}
