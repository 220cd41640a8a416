//! Deferred effects keyed by the scaled clock time at which they run.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap},
    time::Duration,
};

use artifact_defence_core::{MonsterId, Tower, TowerId};
use glam::DVec2;

use crate::{strategies, CombatContext};

/// Effect that resolves after a delay.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Task {
    /// Next jump of a chain attack.
    ChainLink {
        tower: TowerId,
        target: MonsterId,
        jumps: u32,
        hit_list: Vec<MonsterId>,
    },
    /// Ricochet projectile reaching its target.
    RicochetArrival {
        tower: TowerId,
        target: MonsterId,
        bounces: u32,
        hit_list: Vec<MonsterId>,
    },
    /// Bomb reaching its target.
    BombImpact {
        tower: TowerId,
        target: MonsterId,
        fallback: DVec2,
    },
    /// Random bomb landing on its chosen point.
    RandomBombImpact { tower: TowerId, point: DVec2 },
}

impl Task {
    fn tower(&self) -> TowerId {
        match self {
            Task::ChainLink { tower, .. }
            | Task::RicochetArrival { tower, .. }
            | Task::BombImpact { tower, .. }
            | Task::RandomBombImpact { tower, .. } => *tower,
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    run_at: Duration,
    sequence: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.run_at, self.sequence).cmp(&(other.run_at, other.sequence))
    }
}

/// Single-threaded queue of deferred tasks ordered by run time, then by
/// insertion order.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_sequence: u64,
}

impl Scheduler {
    pub(crate) fn schedule(&mut self, run_at: Duration, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.queue.push(Reverse(Scheduled {
            run_at,
            sequence,
            task,
        }));
    }

    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<Task> {
        if self.queue.peek()?.0.run_at > now {
            return None;
        }
        self.queue.pop().map(|Reverse(scheduled)| scheduled.task)
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Runs every task due at the context's clock reading, including tasks
/// scheduled by tasks run in the same drain.
pub(crate) fn drain_due(towers: &BTreeMap<TowerId, Tower>, ctx: &mut CombatContext<'_>) {
    while let Some(task) = ctx.scheduler.pop_due(ctx.now) {
        let Some(tower) = towers.get(&task.tower()) else {
            tracing::trace!(tower = task.tower().get(), "deferred task dropped");
            continue;
        };
        match task {
            Task::ChainLink {
                target,
                jumps,
                hit_list,
                ..
            } => strategies::chain::link(tower, target, jumps, hit_list, ctx),
            Task::RicochetArrival {
                target,
                bounces,
                hit_list,
                ..
            } => strategies::chain::ricochet_arrival(tower, target, bounces, hit_list, ctx),
            Task::BombImpact {
                target, fallback, ..
            } => strategies::ordnance::bomb_impact(tower, target, fallback, ctx),
            Task::RandomBombImpact { point, .. } => {
                strategies::ordnance::random_bomb_impact(tower, point, ctx)
            }
        }
    }
}
