use range_set_blaze::RangeSetBlaze;

pub type HostSet = RangeSetBlaze<u32>;

/// A submitted job waiting in the pending queue.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedJob {
    pub job_id: Box<str>,
    /// Number of hosts requested, checked against the platform size at submission.
    pub nb_hosts: u32,
    /// User-supplied upper bound on the runtime, in seconds.
    pub walltime: f64,
    /// Time at which the submission was observed.
    pub submit_time: f64,
}

/// State kept for a started job until its completion is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningJob {
    pub hosts: HostSet,
    pub nb_hosts: u32,
    /// Projected completion, `start + walltime`. The job is assumed to release
    /// its hosts no later than this.
    pub end_time: f64,
}

pub trait HostSetOps {
    fn sub_host_set(&self, host_count: u32) -> Option<HostSet>;
    fn host_count(&self) -> u32;
    fn format_csv(&self) -> String;
}

impl HostSetOps for HostSet {
    /// Tries to claim a subset of the `HostSet` with the specified number of hosts,
    /// taking the numerically smallest ids first. The receiver is left untouched.
    /// Returns `None` if there are not enough hosts available.
    fn sub_host_set(&self, host_count: u32) -> Option<HostSet> {
        if self.host_count() < host_count {
            return None;
        }
        let mut selected_host_set = HostSet::new();
        let mut remaining_host_count = host_count;
        for range in self.ranges() {
            let range_host_count = range.end() - range.start() + 1;
            if remaining_host_count >= range_host_count {
                selected_host_set |= &HostSet::from_iter(range);
                if remaining_host_count == range_host_count {
                    break;
                }
                remaining_host_count -= range_host_count;
            } else {
                // Split and break
                let sub_range = *range.start()..=(range.start() + remaining_host_count - 1);
                selected_host_set |= &HostSet::from_iter(sub_range);
                break;
            }
        }
        Some(selected_host_set)
    }
    #[inline]
    fn host_count(&self) -> u32 {
        self.len() as u32
    }

    /// Ascending comma-separated host id list, the form emitted in execute decisions.
    fn format_csv(&self) -> String {
        let mut s = String::new();
        for host in self.iter() {
            if !s.is_empty() {
                s.push(',');
            }
            s.push_str(&host.to_string());
        }
        s
    }
}
