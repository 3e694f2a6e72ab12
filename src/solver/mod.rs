use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use fnv::{FnvHashMap, FnvHashSet};
use log::debug;

use crate::board::Board;
use crate::data::{Cell, Pos};
use crate::Solve;

mod a_star;

pub use self::a_star::Stats;

use self::a_star::{OpenEntry, SearchNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErr {
    SizeMismatch,
}

impl Display for SolverErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SolverErr::SizeMismatch => write!(f, "Start and goal boards have different sizes"),
        }
    }
}

impl Error for SolverErr {}

pub struct SolverOk {
    /// Boards from start to goal inclusive, one legal move apart.
    /// `None` means the goal is unreachable - a normal outcome for boards
    /// edited into the wrong parity class, not an error.
    pub path_boards: Option<Vec<Board>>,
    pub stats: Stats,
}

impl SolverOk {
    fn new(path_boards: Option<Vec<Board>>, stats: Stats) -> Self {
        Self { path_boards, stats }
    }

    /// Number of moves in the solution, if there is one.
    pub fn move_cnt(&self) -> Option<usize> {
        self.path_boards.as_ref().map(|boards| boards.len() - 1)
    }
}

impl Debug for SolverOk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.path_boards {
            None => writeln!(f, "No solution")?,
            Some(ref boards) => writeln!(f, "Moves: {}", boards.len() - 1)?,
        }
        write!(f, "{:?}", self.stats)
    }
}

impl Solve for Board {
    fn solve(&self, goal: &Board, print_status: bool) -> Result<SolverOk, SolverErr> {
        solve(self, goal, print_status)
    }
}

/// Finds a minimum-length move sequence from `start` to `goal` using A*.
///
/// Reads both boards, mutates neither. `print_status` reports every newly
/// reached depth on stdout while the search runs.
pub fn solve(start: &Board, goal: &Board, print_status: bool) -> Result<SolverOk, SolverErr> {
    if start.size() != goal.size() {
        return Err(SolverErr::SizeMismatch);
    }

    debug!("Building goal coordinate table...");
    let goal_coords = GoalCoords::new(goal);
    Ok(search(start, goal, &goal_coords, print_status))
}

fn search(start: &Board, goal: &Board, goal_coords: &GoalCoords, print_status: bool) -> SolverOk {
    debug!("Search called");

    let mut stats = Stats::new();

    let mut arena: Vec<SearchNode> = Vec::new();
    let mut to_visit = BinaryHeap::new();
    let mut open: FnvHashMap<Board, usize> = FnvHashMap::default();
    let mut closed: FnvHashSet<Board> = FnvHashSet::default();
    let mut next_seq = 0_u64;

    let root = SearchNode::new(start.clone(), None, 0, heuristic(start, goal_coords));
    stats.add_created(root.dist);
    to_visit.push(Reverse(OpenEntry {
        cost: root.cost(),
        seq: next_seq,
        node: 0,
    }));
    next_seq += 1;
    open.insert(start.clone(), 0);
    arena.push(root);

    while let Some(Reverse(entry)) = to_visit.pop() {
        let cur_index = entry.node;
        // an entry left over from a g-improvement - a cheaper one covers this node
        if entry.cost != arena[cur_index].cost() {
            continue;
        }

        let cur_dist = arena[cur_index].dist;
        open.remove(&arena[cur_index].board);
        closed.insert(arena[cur_index].board.clone());

        if stats.add_unique_visited(cur_dist) && print_status {
            println!("Visited new depth: {}", cur_dist);
            println!("{:?}", stats);
        }

        if arena[cur_index].board == *goal {
            debug!("Solved, backtracking path");
            return SolverOk::new(Some(backtrack_path(&arena, cur_index)), stats);
        }

        for move_pos in arena[cur_index].board.available_moves() {
            let mut neighbor = arena[cur_index].board.clone();
            if !neighbor.move_tile(move_pos) {
                // available_moves only returns legal targets
                continue;
            }
            let dist = cur_dist + 1;

            // already expanded optimally
            if closed.contains(&neighbor) {
                stats.add_reached_duplicate(dist);
                continue;
            }

            if let Some(&known_index) = open.get(&neighbor) {
                if dist < arena[known_index].dist {
                    // shorter way to a known open node - update it in place
                    // instead of inserting a duplicate
                    arena[known_index].dist = dist;
                    arena[known_index].parent = Some(cur_index);
                    stats.add_improved(dist);
                    to_visit.push(Reverse(OpenEntry {
                        cost: arena[known_index].cost(),
                        seq: next_seq,
                        node: known_index,
                    }));
                    next_seq += 1;
                } else {
                    stats.add_reached_duplicate(dist);
                }
                continue;
            }

            let h = heuristic(&neighbor, goal_coords);
            let node_index = arena.len();
            open.insert(neighbor.clone(), node_index);
            let node = SearchNode::new(neighbor, Some(cur_index), dist, h);
            stats.add_created(node.dist);
            to_visit.push(Reverse(OpenEntry {
                cost: node.cost(),
                seq: next_seq,
                node: node_index,
            }));
            next_seq += 1;
            arena.push(node);
        }
    }

    SolverOk::new(None, stats)
}

/// Goal position of every cell value, indexed by tile id with the empty cell
/// in slot 0. Built once per solve so the heuristic is a single pass over
/// the candidate grid instead of a scan per tile.
struct GoalCoords(Vec<Option<Pos>>);

impl GoalCoords {
    fn new(goal: &Board) -> Self {
        let mut coords = vec![None; goal.cell_cnt()];
        for y in 0..i32::from(goal.size()) {
            for x in 0..i32::from(goal.size()) {
                let pos = Pos::new(x, y);
                match goal.tile_at(pos) {
                    Some(Cell::Tile(id)) if usize::from(id) < coords.len() => {
                        coords[usize::from(id)] = Some(pos);
                    }
                    Some(Cell::Empty) => coords[0] = Some(pos),
                    _ => {}
                }
            }
        }
        GoalCoords(coords)
    }

    fn get(&self, cell: Cell) -> Option<Pos> {
        match cell {
            Cell::Tile(id) => self.0.get(usize::from(id)).copied().flatten(),
            Cell::Empty => self.0[0],
        }
    }
}

/// Manhattan-distance sum between `board` and the goal over every cell,
/// the empty cell included. A value missing on either side contributes
/// nothing instead of failing the whole estimate.
fn heuristic(board: &Board, goal_coords: &GoalCoords) -> i32 {
    let mut sum = 0;
    for y in 0..i32::from(board.size()) {
        for x in 0..i32::from(board.size()) {
            let pos = Pos::new(x, y);
            if let Some(cell) = board.tile_at(pos) {
                if let Some(goal_pos) = goal_coords.get(cell) {
                    sum += pos.dist(goal_pos);
                }
            }
        }
    }
    sum
}

fn backtrack_path(arena: &[SearchNode], final_index: usize) -> Vec<Board> {
    let mut ret = Vec::new();
    let mut index = final_index;
    loop {
        ret.push(arena[index].board.clone());
        match arena[index].parent {
            Some(parent) => index = parent,
            None => {
                ret.reverse();
                return ret;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn board_3x3(ids: [u16; 9]) -> Board {
        let cells = ids
            .iter()
            .map(|&id| if id == 0 { Cell::Empty } else { Cell::Tile(id) })
            .collect();
        Board::from_cells(3, cells).unwrap()
    }

    #[test]
    fn heuristic_zero_iff_goal() {
        let goal = Board::goal(3).unwrap();
        let goal_coords = GoalCoords::new(&goal);
        assert_eq!(heuristic(&goal, &goal_coords), 0);

        // one move away: the moved tile and the empty cell are each one off
        let one_away = board_3x3([1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(heuristic(&one_away, &goal_coords), 2);

        let scrambled = board_3x3([1, 2, 3, 4, 8, 5, 7, 0, 6]);
        assert_eq!(heuristic(&scrambled, &goal_coords), 4);

        let far = board_3x3([8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert!(heuristic(&far, &goal_coords) > 0);
    }

    #[test]
    fn size_mismatch() {
        let start = Board::goal(3).unwrap();
        let goal = Board::goal(4).unwrap();
        assert_eq!(solve(&start, &goal, false).unwrap_err(), SolverErr::SizeMismatch);
    }

    #[test]
    fn already_solved() {
        init_logging();

        let goal = Board::goal(3).unwrap();
        let solution = solve(&goal, &goal, false).unwrap();
        assert_eq!(solution.path_boards, Some(vec![goal]));
        assert_eq!(solution.move_cnt(), Some(0));
        assert_eq!(solution.stats.total_created(), 1);
        assert_eq!(solution.stats.total_unique_visited(), 1);
    }

    #[test]
    fn one_move() {
        let start = board_3x3([1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let goal = Board::goal(3).unwrap();

        let solution = solve(&start, &goal, false).unwrap();
        assert_eq!(solution.path_boards, Some(vec![start, goal]));
        assert_eq!(solution.stats.total_created(), 4);
        assert_eq!(solution.stats.total_unique_visited(), 2);
    }

    #[test]
    fn two_moves() {
        let start = board_3x3([1, 2, 3, 4, 5, 6, 0, 7, 8]);
        let goal = Board::goal(3).unwrap();

        let solution = solve(&start, &goal, false).unwrap();
        assert_eq!(solution.move_cnt(), Some(2));
        let boards = solution.path_boards.unwrap();
        assert_eq!(boards[0], start);
        assert_eq!(boards[2], goal);
    }

    #[test]
    fn three_moves() {
        // three tiles each one step from home, solved by walking the empty
        // cell back through them
        let start = board_3x3([1, 2, 3, 4, 8, 5, 7, 0, 6]);
        let goal = Board::goal(3).unwrap();

        let solution = solve(&start, &goal, false).unwrap();
        assert_eq!(solution.move_cnt(), Some(3));
        assert_eq!(solution.stats.total_created(), 9);
        assert_eq!(solution.stats.total_unique_visited(), 4);
        assert_eq!(solution.stats.total_reached_duplicates(), 2);

        let boards = solution.path_boards.unwrap();
        assert_eq!(boards[0], start);
        assert_eq!(*boards.last().unwrap(), goal);
    }

    #[test]
    fn no_solution_2x2() {
        init_logging();

        // tiles 1 and 2 swapped by a raw edit - the other parity class
        let start = Board::from_cells(
            2,
            vec![Cell::Tile(2), Cell::Tile(1), Cell::Tile(3), Cell::Empty],
        )
        .unwrap();
        let goal = Board::goal(2).unwrap();
        assert!(!start.is_solvable());

        let solution = solve(&start, &goal, false).unwrap();
        assert_eq!(solution.path_boards, None);
        assert_eq!(solution.move_cnt(), None);
        // the whole reachable half of the 2x2 state space: 4!/2
        assert_eq!(solution.stats.total_unique_visited(), 12);
    }

    #[test]
    fn solve_trait() {
        let goal = Board::goal(3).unwrap();
        let solution = goal.solve(&goal, false).unwrap();
        assert_eq!(solution.move_cnt(), Some(0));
    }
}
