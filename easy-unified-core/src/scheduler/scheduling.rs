use crate::model::configuration::SchedulerConfig;
use crate::model::events::Decision;
use crate::model::job::{HostSetOps, SchedJob};
use crate::scheduler::cluster::ClusterState;
use crate::scheduler::sorting;
use indexmap::IndexMap;
use log::info;
use std::cmp::Ordering;

/// Earliest time at which `need` hosts can be free, assuming running jobs
/// complete exactly at their walltime bound.
///
/// Returns `now` when enough hosts are already free. Otherwise scans the
/// projected release times in ascending order and returns the first time at
/// which the cumulative freed count reaches `need`. Jobs sharing an end time
/// count as a single release. When even a fully drained cluster stays short,
/// returns the latest release time (only reachable for requests wider than the
/// platform, which are rejected at submission), and `now` when nothing runs.
pub fn compute_reservation(cluster: &ClusterState, now: f64, need: u32) -> f64 {
    let mut free = cluster.free_count();
    if free >= need {
        return now;
    }

    let mut releases: Vec<(f64, u32)> = cluster
        .iter_running()
        .map(|(_job_id, end_time, nb_hosts)| (end_time, nb_hosts))
        .collect();
    releases.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    for (end_time, nb_hosts) in &releases {
        free += nb_hosts;
        if free >= need {
            return *end_time;
        }
    }
    releases.last().map_or(now, |(end_time, _)| *end_time)
}

/// One EASY decision cycle over the pending queue.
///
/// Repeats until a full pass makes no progress: order the queue, start the head
/// when it fits, otherwise reserve the head's earliest start time and backfill
/// every later job that fits now and completes by the reservation. Starting the
/// head consumes hosts and can change which later jobs fit, so the loop
/// re-evaluates from the top after any progress.
pub fn schedule_jobs(
    cluster: &mut ClusterState,
    pending: &mut IndexMap<Box<str>, SchedJob>,
    now: f64,
    config: &SchedulerConfig,
    decisions: &mut Vec<Decision>,
) {
    loop {
        if pending.is_empty() {
            return;
        }
        sorting::sort_primary(pending, now, config);

        let head = match pending.get_index(0) {
            Some((_job_id, job)) => job.clone(),
            None => return,
        };

        if cluster.free_count() >= head.nb_hosts {
            start_job(cluster, pending, &head, now, decisions);
            continue;
        }

        let reservation = compute_reservation(cluster, now, head.nb_hosts);

        let mut progress = false;
        for candidate_id in sorting::backfill_order(pending, now, config.backfill_policy) {
            let candidate = match pending.get(&candidate_id) {
                Some(job) => job.clone(),
                None => continue,
            };
            // Under the walltime bound the candidate releases its hosts no
            // later than the reservation, so the head is not delayed.
            if cluster.free_count() >= candidate.nb_hosts && now + candidate.walltime <= reservation {
                start_job(cluster, pending, &candidate, now, decisions);
                progress = true;
            }
        }

        if !progress {
            return;
        }
    }
}

/// Moves a job from the pending queue onto the cluster and records the execute
/// decision.
fn start_job(
    cluster: &mut ClusterState,
    pending: &mut IndexMap<Box<str>, SchedJob>,
    job: &SchedJob,
    now: f64,
    decisions: &mut Vec<Decision>,
) {
    let hosts = cluster.allocate(&job.job_id, job.nb_hosts, now + job.walltime);
    pending.shift_remove(&job.job_id);
    let hosts_csv = hosts.format_csv();
    info!("Executing job {} on hosts [{}]", job.job_id, hosts_csv);
    decisions.push(Decision::ExecuteJob {
        job_id: job.job_id.clone(),
        hosts: hosts_csv.into(),
    });
}
