use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};

use separator::Separatable;

use crate::board::Board;

/// One explored configuration. Nodes live in a `Vec` arena owned by a single
/// search and point at their parent by index, so path reconstruction is an
/// index-following loop and there is no link cycle to clean up.
#[derive(Debug)]
pub(crate) struct SearchNode {
    pub(crate) board: Board,
    pub(crate) parent: Option<usize>,
    /// Moves from the start node (`g`).
    pub(crate) dist: i32,
    /// Heuristic estimate to the goal (`h`).
    pub(crate) h: i32,
}

impl SearchNode {
    pub(crate) fn new(board: Board, parent: Option<usize>, dist: i32, h: i32) -> Self {
        SearchNode {
            board,
            parent,
            dist,
            h,
        }
    }

    /// Total cost (`f = g + h`).
    pub(crate) fn cost(&self) -> i32 {
        self.dist + self.h
    }
}

/// Open-set heap entry. Ordered by total cost, then by insertion sequence so
/// that of equal-cost candidates the earliest-created one is expanded first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OpenEntry {
    pub(crate) cost: i32,
    pub(crate) seq: u64,
    pub(crate) node: usize,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.cmp(&other.cost).then(self.seq.cmp(&other.seq))
    }
}

/// Per-depth node accounting for one search.
#[derive(PartialEq, Eq)]
pub struct Stats {
    created_states: Vec<i32>,
    visited_states: Vec<i32>,
    duplicate_states: Vec<i32>,
    improved_states: Vec<i32>,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Stats {
            created_states: vec![],
            visited_states: vec![],
            duplicate_states: vec![],
            improved_states: vec![],
        }
    }

    pub fn total_created(&self) -> i32 {
        self.created_states.iter().sum()
    }

    pub fn total_unique_visited(&self) -> i32 {
        self.visited_states.iter().sum()
    }

    pub fn total_reached_duplicates(&self) -> i32 {
        self.duplicate_states.iter().sum()
    }

    pub fn total_improved(&self) -> i32 {
        self.improved_states.iter().sum()
    }

    pub(crate) fn add_created(&mut self, dist: i32) -> bool {
        Self::add(&mut self.created_states, dist)
    }

    pub(crate) fn add_unique_visited(&mut self, dist: i32) -> bool {
        Self::add(&mut self.visited_states, dist)
    }

    pub(crate) fn add_reached_duplicate(&mut self, dist: i32) -> bool {
        Self::add(&mut self.duplicate_states, dist)
    }

    pub(crate) fn add_improved(&mut self, dist: i32) -> bool {
        Self::add(&mut self.improved_states, dist)
    }

    fn add(counts: &mut Vec<i32>, dist: i32) -> bool {
        let mut ret = false;

        // while because depths might be skipped
        while dist as usize >= counts.len() {
            counts.push(0);
            ret = true;
        }
        counts[dist as usize] += 1;
        ret
    }
}

impl Debug for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "created by depth: {:?}", self.created_states)?;
        writeln!(f, "unique visited by depth: {:?}", self.visited_states)?;
        writeln!(f, "reached duplicates by depth: {:?}", self.duplicate_states)?;
        writeln!(f, "improved in open by depth: {:?}", self.improved_states)?;
        writeln!(
            f,
            "total created: {}",
            self.total_created().separated_string()
        )?;
        writeln!(
            f,
            "total unique visited: {}",
            self.total_unique_visited().separated_string()
        )?;
        writeln!(
            f,
            "total reached duplicates: {}",
            self.total_reached_duplicates().separated_string()
        )?;
        writeln!(
            f,
            "total improved in open: {}",
            self.total_improved().separated_string()
        )
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let created = self.total_created();
        let visited = self.total_unique_visited();
        writeln!(f, "States created total: {}", created.separated_string())?;
        writeln!(f, "Unique visited total: {}", visited.separated_string())?;
        writeln!(
            f,
            "Reached duplicates total: {}",
            self.total_reached_duplicates().separated_string()
        )?;
        writeln!(
            f,
            "Improved in open total: {}",
            self.total_improved().separated_string()
        )?;
        writeln!(
            f,
            "Created but not visited total: {}",
            (created - visited).separated_string()
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<8}{:<15}{:<15}{:<15}{:<15}",
            "Depth", "Created", "Visited", "Duplicates", "Improved"
        )?;
        let depths = self
            .created_states
            .len()
            .max(self.visited_states.len())
            .max(self.duplicate_states.len())
            .max(self.improved_states.len());
        for depth in 0..depths {
            let at = |counts: &[i32]| counts.get(depth).copied().unwrap_or(0);
            writeln!(
                f,
                "{:<8}{:<15}{:<15}{:<15}{:<15}",
                format!("{}:", depth),
                at(&self.created_states).separated_string(),
                at(&self.visited_states).separated_string(),
                at(&self.duplicate_states).separated_string(),
                at(&self.improved_states).separated_string(),
            )?;
        }
        Ok(())
    }
}
