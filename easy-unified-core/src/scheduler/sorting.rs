/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use crate::model::configuration::{Policy, SchedulerConfig};
use crate::model::job::SchedJob;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Sort key for `job` under `policy` at time `now`. Smaller keys sort first.
/// EXP depends on the current time, so keys must be recomputed on every sort.
pub fn policy_key(policy: Policy, job: &SchedJob, now: f64) -> f64 {
    match policy {
        Policy::Fcfs => job.submit_time,
        Policy::Lcfs => -job.submit_time,
        Policy::Sqf => job.nb_hosts as f64,
        Policy::Lqf => -(job.nb_hosts as f64),
        Policy::Spf => job.walltime,
        Policy::Lpf => -job.walltime,
        Policy::Exp => -((now - job.submit_time + job.walltime) / job.walltime),
    }
}

fn is_old(job: &SchedJob, now: f64, age_threshold: Option<f64>) -> bool {
    age_threshold.map_or(false, |threshold| now - job.submit_time > threshold)
}

/// Primary queue order. With the age threshold enabled, jobs that have been
/// waiting longer than the threshold come before all others; within each group
/// the primary policy key decides. Ties keep submission order (the sort is
/// stable).
pub fn sort_primary(pending: &mut IndexMap<Box<str>, SchedJob>, now: f64, config: &SchedulerConfig) {
    pending.sort_by(|_id_a, a, _id_b, b| {
        let a_old = is_old(a, now, config.age_threshold);
        let b_old = is_old(b, now, config.age_threshold);
        if a_old != b_old {
            return if a_old { Ordering::Less } else { Ordering::Greater };
        }
        let key_a = policy_key(config.primary_policy, a, now);
        let key_b = policy_key(config.primary_policy, b, now);
        key_a.partial_cmp(&key_b).unwrap_or(Ordering::Equal)
    });
}

/// Backfill candidates: every pending job but the head, in backfill order.
/// The age threshold is ignored here. Returns a snapshot of ids so the caller
/// can remove started jobs from the queue while iterating.
pub fn backfill_order(pending: &IndexMap<Box<str>, SchedJob>, now: f64, policy: Policy) -> Vec<Box<str>> {
    let mut candidates: Vec<&SchedJob> = pending.values().skip(1).collect();
    candidates.sort_by(|a, b| {
        policy_key(policy, a, now)
            .partial_cmp(&policy_key(policy, b, now))
            .unwrap_or(Ordering::Equal)
    });
    candidates.into_iter().map(|job| job.job_id.clone()).collect()
}
