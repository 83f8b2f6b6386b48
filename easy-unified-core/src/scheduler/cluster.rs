use crate::model::job::{HostSet, HostSetOps, RunningJob};
use indexmap::IndexMap;

/// Tracks the free host set and the currently running allocations.
///
/// Hosts are identified by ids in `[0, nb_hosts)`. The free set and the running
/// allocations partition that range at all times.
#[derive(Debug)]
pub struct ClusterState {
    nb_hosts: u32,
    free_hosts: HostSet,
    running: IndexMap<Box<str>, RunningJob>,
}

impl ClusterState {
    pub fn new(nb_hosts: u32) -> ClusterState {
        ClusterState {
            nb_hosts,
            free_hosts: HostSet::from_iter(0..nb_hosts),
            running: IndexMap::new(),
        }
    }

    pub fn nb_hosts(&self) -> u32 {
        self.nb_hosts
    }

    pub fn free_count(&self) -> u32 {
        self.free_hosts.host_count()
    }

    pub fn is_running(&self, job_id: &str) -> bool {
        self.running.contains_key(job_id)
    }

    /// Claims the `nb_hosts` numerically smallest free hosts for `job_id` and
    /// records its projected end time. Callers must have checked `free_count`;
    /// requesting more hosts than are free is a scheduling bug.
    pub fn allocate(&mut self, job_id: &str, nb_hosts: u32, end_time: f64) -> HostSet {
        assert!(
            nb_hosts <= self.free_count(),
            "allocation underflow: job {} requests {} hosts but only {} are free",
            job_id,
            nb_hosts,
            self.free_count()
        );
        let hosts = self
            .free_hosts
            .sub_host_set(nb_hosts)
            .expect("free host set smaller than its reported count");
        self.free_hosts = &self.free_hosts - &hosts;
        self.running.insert(
            job_id.into(),
            RunningJob {
                hosts: hosts.clone(),
                nb_hosts,
                end_time,
            },
        );
        #[cfg(debug_assertions)]
        self.check_invariants();
        hosts
    }

    /// Returns the job's hosts to the free set and erases its running state.
    /// Returns `false` when the id is not running.
    pub fn release(&mut self, job_id: &str) -> bool {
        match self.running.shift_remove(job_id) {
            Some(running) => {
                self.free_hosts |= &running.hosts;
                #[cfg(debug_assertions)]
                self.check_invariants();
                true
            }
            None => false,
        }
    }

    /// `(job_id, projected_end_time, nb_hosts)` for every running job, used by
    /// the reservation scan.
    pub fn iter_running(&self) -> impl Iterator<Item = (&str, f64, u32)> + '_ {
        self.running
            .iter()
            .map(|(job_id, running)| (job_id.as_ref(), running.end_time, running.nb_hosts))
    }

    /// The free set and the running allocations must partition `[0, nb_hosts)`,
    /// and every allocation must match its job's request.
    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        let mut covered = self.free_hosts.clone();
        for (job_id, running) in &self.running {
            assert_eq!(
                running.hosts.host_count(),
                running.nb_hosts,
                "allocation of job {} does not match its request",
                job_id
            );
            assert!(
                (&covered & &running.hosts).is_empty(),
                "allocation of job {} overlaps another allocation or the free set",
                job_id
            );
            covered |= &running.hosts;
        }
        assert_eq!(covered, HostSet::from_iter(0..self.nb_hosts));
    }
}
