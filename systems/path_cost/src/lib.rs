#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement-cost analysis of paths produced by an external pathfinder.
//!
//! A [`FindPathResult`] wraps the immutable step list of one pathfinding call.
//! Its total cost and its legs are derived from stored terrain knowledge the
//! first time either is requested and cached for the rest of its lifetime.

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use terrain_knowledge_core::{
    Direction, MovementCostSource, PathStep, RoomCoord, RoomName, RoomPosition, IMPASSABLE_COST,
    PLAIN_COST,
};

/// Options the pathfinder was invoked with, carried alongside the result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindPathOptions {
    /// Whether creeps were treated as walkable.
    pub ignore_creeps: bool,
    /// Whether destructible structures were treated as walkable.
    pub ignore_destructible_structures: bool,
    /// Search effort limit handed to the pathfinder.
    pub max_ops: Option<u32>,
}

/// Maximal run of consecutive steps sharing a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leg {
    /// Direction shared by every step of the leg.
    pub direction: Direction,
    /// Total column displacement.
    pub dx: i32,
    /// Total row displacement.
    pub dy: i32,
    /// Cell reached at the end of the leg.
    pub end: RoomCoord,
    /// Summed movement cost of the leg's cells.
    pub movement_cost: u64,
}

impl Leg {
    fn start(step: &PathStep, movement_cost: u64) -> Self {
        Self {
            direction: step.direction,
            dx: i32::from(step.dx),
            dy: i32::from(step.dy),
            end: step.cell,
            movement_cost,
        }
    }

    fn extend(&mut self, step: &PathStep, movement_cost: u64) {
        self.dx += i32::from(step.dx);
        self.dy += i32::from(step.dy);
        self.end = step.cell;
        self.movement_cost += movement_cost;
    }
}

#[derive(Debug)]
struct PathAnalysis {
    movement_cost: u64,
    legs: Vec<Leg>,
}

/// Outcome of a single pathfinding call.
#[derive(Debug)]
pub struct FindPathResult {
    start: RoomPosition,
    end: RoomPosition,
    options: FindPathOptions,
    steps: Vec<PathStep>,
    analysis: OnceCell<PathAnalysis>,
}

impl FindPathResult {
    /// Wraps the steps returned by the pathfinder.
    #[must_use]
    pub fn new(
        start: RoomPosition,
        end: RoomPosition,
        options: FindPathOptions,
        steps: Vec<PathStep>,
    ) -> Self {
        Self {
            start,
            end,
            options,
            steps,
            analysis: OnceCell::new(),
        }
    }

    /// Position the path starts from.
    #[must_use]
    pub fn start(&self) -> &RoomPosition {
        &self.start
    }

    /// Position the path was searched toward.
    #[must_use]
    pub fn end(&self) -> &RoomPosition {
        &self.end
    }

    /// Options the pathfinder was invoked with.
    #[must_use]
    pub fn options(&self) -> &FindPathOptions {
        &self.options
    }

    /// Steps of the path in travel order.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Reports whether cost and legs have already been computed.
    #[must_use]
    pub fn is_analysed(&self) -> bool {
        self.analysis.get().is_some()
    }

    /// Total cost of entering every cell on the path.
    pub fn movement_cost<S>(&self, terrain: &mut S) -> u64
    where
        S: MovementCostSource + ?Sized,
    {
        self.analysis(terrain).movement_cost
    }

    /// Steps grouped into maximal same-direction legs.
    pub fn legs<S>(&self, terrain: &mut S) -> &[Leg]
    where
        S: MovementCostSource + ?Sized,
    {
        &self.analysis(terrain).legs
    }

    /// Estimated ticks needed to walk the path.
    ///
    /// `weight` counts the body parts that slow the unit down and
    /// `move_parts` the parts that carry it. A unit without move parts never
    /// arrives; an unburdened unit takes one tick per step.
    pub fn move_duration<S>(&self, terrain: &mut S, weight: u32, move_parts: u32) -> u64
    where
        S: MovementCostSource + ?Sized,
    {
        if move_parts == 0 {
            return u64::from(IMPASSABLE_COST);
        }
        if weight == 0 {
            return self.steps.len() as u64;
        }
        let scaled = self.movement_cost(terrain) * u64::from(weight);
        scaled.div_ceil(u64::from(move_parts)).max(1)
    }

    fn analysis<S>(&self, terrain: &mut S) -> &PathAnalysis
    where
        S: MovementCostSource + ?Sized,
    {
        self.analysis
            .get_or_init(|| analyse(&self.start.room, &self.steps, terrain))
    }
}

fn analyse<S>(room: &RoomName, steps: &[PathStep], terrain: &mut S) -> PathAnalysis
where
    S: MovementCostSource + ?Sized,
{
    let mut movement_cost = 0;
    let mut legs: Vec<Leg> = Vec::new();

    for step in steps {
        let cost = u64::from(step_cost(room, step.cell, terrain));
        movement_cost += cost;
        match legs.last_mut() {
            Some(leg) if leg.direction == step.direction => leg.extend(step, cost),
            _ => legs.push(Leg::start(step, cost)),
        }
    }

    PathAnalysis {
        movement_cost,
        legs,
    }
}

fn step_cost<S>(room: &RoomName, cell: RoomCoord, terrain: &mut S) -> u32
where
    S: MovementCostSource + ?Sized,
{
    terrain.movement_cost(room, cell).unwrap_or_else(|| {
        log::warn!(
            "no terrain for ({}, {}) in room {room}; assuming plain",
            cell.x(),
            cell.y()
        );
        PLAIN_COST
    })
}
