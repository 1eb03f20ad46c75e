//! Formation geometry: align and distribute selected entities
//!
//! Every operation reads a keyframe's entities plus a selection and returns
//! one `EntityUpdate` per selected entity. Nothing is mutated here; the
//! caller turns the updates into a `Mutation`. Calls below the minimum
//! selection size, or on degenerate layouts, return no updates.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Point, Vec2};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::{Entity, EntityId, EntityUpdate};
use crate::geometry::point::centroid;
use crate::geometry::Pose;

/// Below this the selection has no spread to work with.
const DEGENERATE_EPSILON: f64 = 1e-9;
/// Improvements smaller than this do not change the circle assignment.
const SCORE_EPSILON: f64 = 1e-12;
/// Starting phases tried per slot gap when fitting a circle.
const PHASE_GRID: usize = 64;
/// Upper bound on assignment/phase alternations per starting phase.
const MAX_REFINEMENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignAxis {
    /// Collapse onto a common Y
    Horizontal,
    /// Collapse onto a common X
    Vertical,
}

/// What happens to headings when distributing on a circle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum CircleHeading {
    /// Leave headings alone, only move
    Keep,
    /// Face along the circle, counter-clockwise
    #[default]
    Tangent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationOp {
    Align(AlignAxis),
    DistributeLine,
    DistributeCircle(CircleHeading),
}

impl FormationOp {
    pub fn description(&self) -> &'static str {
        match self {
            FormationOp::Align(AlignAxis::Horizontal) => {
                "Align horizontally"
            }
            FormationOp::Align(AlignAxis::Vertical) => "Align vertically",
            FormationOp::DistributeLine => "Distribute on line",
            FormationOp::DistributeCircle(_) => "Distribute on circle",
        }
    }

    /// Smallest selection the operation does anything with.
    pub fn min_selection(&self) -> usize {
        match self {
            FormationOp::DistributeLine => 3,
            _ => 2,
        }
    }

    pub fn updates(
        &self,
        entities: &[Entity],
        selection: &[EntityId],
    ) -> Vec<EntityUpdate> {
        let selected = selected(entities, selection);
        if selected.len() < self.min_selection() {
            warn!(
                "{} needs at least {} entities, got {}",
                self.description(),
                self.min_selection(),
                selected.len()
            );
            return Vec::new();
        }
        match *self {
            FormationOp::Align(axis) => align(&selected, axis),
            FormationOp::DistributeLine => distribute_on_line(&selected),
            FormationOp::DistributeCircle(heading) => {
                distribute_on_circle(&selected, heading)
            }
        }
    }
}

/// Selected entities in keyframe order, each at most once.
fn selected<'a>(
    entities: &'a [Entity],
    selection: &[EntityId],
) -> Vec<&'a Entity> {
    entities
        .iter()
        .filter(|e| selection.contains(&e.id))
        .collect()
}

fn moved_to(entity: &Entity, target: Pose) -> EntityUpdate {
    EntityUpdate::between(entity.id, entity.pose(), target)
}

/// Set one coordinate of every entity to the selection's mean.
pub fn align(selected: &[&Entity], axis: AlignAxis) -> Vec<EntityUpdate> {
    if selected.len() < 2 {
        return Vec::new();
    }
    let n = selected.len() as f64;
    match axis {
        AlignAxis::Horizontal => {
            let y = selected.iter().map(|e| e.position.y).sum::<f64>() / n;
            selected
                .iter()
                .map(|e| {
                    let delta = Vec2::new(0.0, y - e.position.y);
                    EntityUpdate {
                        entity_id: e.id,
                        position_delta: delta,
                        heading_delta: 0.0,
                    }
                })
                .collect()
        }
        AlignAxis::Vertical => {
            let x = selected.iter().map(|e| e.position.x).sum::<f64>() / n;
            selected
                .iter()
                .map(|e| EntityUpdate {
                    entity_id: e.id,
                    position_delta: Vec2::new(x - e.position.x, 0.0),
                    heading_delta: 0.0,
                })
                .collect()
        }
    }
}

/// Space entities evenly between the two that are farthest apart.
///
/// The endpoints stay put. Everyone else keeps their order along the line,
/// measured by projection onto it.
pub fn distribute_on_line(selected: &[&Entity]) -> Vec<EntityUpdate> {
    if selected.len() < 3 {
        return Vec::new();
    }

    let mut ends = (0, 1);
    let mut widest = -1.0;
    for i in 0..selected.len() {
        for j in i + 1..selected.len() {
            let d = (selected[j].position - selected[i].position).hypot2();
            if d > widest {
                widest = d;
                ends = (i, j);
            }
        }
    }
    if widest < DEGENERATE_EPSILON {
        return Vec::new();
    }

    let start = selected[ends.0].position;
    let axis = selected[ends.1].position - start;
    let mut interior: Vec<(f64, &Entity)> = selected
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ends.0 && *i != ends.1)
        .map(|(_, e)| ((e.position - start).dot(axis) / widest, *e))
        .collect();
    interior.sort_by(|a, b| a.0.total_cmp(&b.0));

    let gaps = (selected.len() - 1) as f64;
    let mut updates = vec![
        moved_to(selected[ends.0], selected[ends.0].pose()),
        moved_to(selected[ends.1], selected[ends.1].pose()),
    ];
    for (slot, (_, entity)) in interior.into_iter().enumerate() {
        let t = (slot + 1) as f64 / gaps;
        let target = Pose {
            position: start + axis * t,
            heading: entity.heading,
        };
        updates.push(moved_to(entity, target));
    }
    updates
}

/// Slot angles and assignment for circle distribution
#[derive(Debug, Clone, PartialEq)]
struct CircleFit {
    /// Rotation of slot 0
    phase: f64,
    /// `slots[i]` is the slot of the i-th entity
    slots: Vec<usize>,
    /// Sum of `q_i · u(phase + β_slot)`; larger means less displacement
    score: f64,
}

fn slot_angle(slot: usize, n: usize) -> f64 {
    TAU * slot as f64 / n as f64
}

/// Best phase for a fixed assignment, with its score.
///
/// Total squared displacement is a constant minus `2r` times the score, so
/// the best phase is the direction of `Σ q_i` rotated back by its slot.
fn fit_phase(offsets: &[Vec2], slots: &[usize]) -> (f64, f64) {
    let n = offsets.len();
    let sum = offsets
        .iter()
        .zip(slots)
        .fold(Vec2::ZERO, |acc, (q, &slot)| {
            let back = Vec2::from_angle(-slot_angle(slot, n));
            acc + Vec2::new(
                q.x * back.x - q.y * back.y,
                q.x * back.y + q.y * back.x,
            )
        });
    let phase = if sum.hypot2() < DEGENERATE_EPSILON {
        0.0
    } else {
        sum.atan2()
    };
    (phase, sum.hypot())
}

/// Minimum-cost perfect matching of rows to columns on a square matrix.
///
/// Kuhn-Munkres with row and column potentials, O(n³). Returns the column
/// of every row.
fn assign(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    // 1-based; column 0 is a sentinel
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col = 0;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[col] = true;
            let current = owner[col];
            let mut delta = f64::INFINITY;
            let mut next = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let slack = cost[current - 1][j - 1] - u[current] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = col;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    next = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }
            col = next;
            if col == 0 || owner[col] == 0 {
                break;
            }
        }
        // flip the augmenting path
        while col != 0 {
            let previous = way[col];
            owner[col] = owner[previous];
            col = previous;
        }
    }

    let mut columns = vec![0; n];
    for j in 1..=n {
        if owner[j] > 0 {
            columns[owner[j] - 1] = j - 1;
        }
    }
    columns
}

/// Slot assignment with the highest score for a fixed phase.
fn best_slots(offsets: &[Vec2], phase: f64) -> Vec<usize> {
    let n = offsets.len();
    let cost: Vec<Vec<f64>> = offsets
        .iter()
        .map(|q| {
            (0..n)
                .map(|slot| {
                    -q.dot(Vec2::from_angle(phase + slot_angle(slot, n)))
                })
                .collect()
        })
        .collect();
    assign(&cost)
}

/// Alternate exact assignment and phase fitting from a starting phase
/// until the score stops improving.
fn refine(offsets: &[Vec2], start: f64) -> CircleFit {
    let slots = best_slots(offsets, start);
    let (phase, score) = fit_phase(offsets, &slots);
    let mut fit = CircleFit {
        phase,
        slots,
        score,
    };
    for _ in 0..MAX_REFINEMENTS {
        let slots = best_slots(offsets, fit.phase);
        let (phase, score) = fit_phase(offsets, &slots);
        if score <= fit.score + SCORE_EPSILON {
            break;
        }
        fit = CircleFit {
            phase,
            slots,
            score,
        };
    }
    fit
}

/// Choose phase and slot assignment with the least squared displacement.
///
/// Relabelling slots turns a phase shift of one slot gap into the same
/// layout, so only phases in `[0, 2π/N)` are searched: a grid of
/// `PHASE_GRID` starts plus the phase that puts each entity exactly on a
/// slot. Every start is refined with [`refine`]. The best grid start is
/// within half a grid step of the optimal phase, which bounds the score
/// to at least `cos(π / (N·PHASE_GRID))` of the optimum before
/// refinement. Ties keep the earlier candidate, which makes the result
/// deterministic.
fn fit_circle(offsets: &[Vec2]) -> CircleFit {
    let n = offsets.len();
    let empty = CircleFit {
        phase: 0.0,
        slots: Vec::new(),
        score: 0.0,
    };
    if n == 0 {
        return empty;
    }
    let sector = TAU / n as f64;
    let grid = (0..PHASE_GRID).map(|k| sector * k as f64 / PHASE_GRID as f64);
    let aligned = offsets.iter().map(|q| q.atan2().rem_euclid(sector));

    let mut best: Option<CircleFit> = None;
    for start in grid.chain(aligned) {
        let fit = refine(offsets, start);
        if best
            .as_ref()
            .map_or(true, |b| fit.score > b.score + SCORE_EPSILON)
        {
            best = Some(fit);
        }
    }
    best.unwrap_or(empty)
}

/// Place entities on equally spaced slots of their mean circle.
///
/// The center is the centroid and the radius the mean distance to it. The
/// phase and slot assignment minimize total squared displacement, so
/// entities already on a circle barely move.
pub fn distribute_on_circle(
    selected: &[&Entity],
    heading: CircleHeading,
) -> Vec<EntityUpdate> {
    if selected.len() < 2 {
        return Vec::new();
    }
    let points: Vec<Point> = selected.iter().map(|e| e.position).collect();
    let Some(center) = centroid(&points) else {
        return Vec::new();
    };
    let offsets: Vec<Vec2> = points.iter().map(|p| *p - center).collect();
    let radius =
        offsets.iter().map(|q| q.hypot()).sum::<f64>() / offsets.len() as f64;
    if radius < DEGENERATE_EPSILON {
        return Vec::new();
    }

    let n = selected.len();
    let fit = fit_circle(&offsets);
    selected
        .iter()
        .zip(&fit.slots)
        .map(|(entity, &slot)| {
            let angle = fit.phase + slot_angle(slot, n);
            let position = center + Vec2::from_angle(angle) * radius;
            let target = match heading {
                CircleHeading::Keep => Pose {
                    position,
                    heading: entity.heading,
                },
                CircleHeading::Tangent => {
                    Pose::new(position, angle + FRAC_PI_2)
                }
            };
            moved_to(entity, target)
        })
        .collect()
}
