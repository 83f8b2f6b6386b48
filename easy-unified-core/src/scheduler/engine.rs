use crate::model::configuration::SchedulerConfig;
use crate::model::events::{Decision, Event};
use crate::model::job::SchedJob;
use crate::scheduler::cluster::ClusterState;
use crate::scheduler::scheduling;
use indexmap::IndexMap;
use log::{info, warn};
use thiserror::Error;

/// Name announced in the hello response.
pub const EDC_NAME: &str = "easy-unified";
/// Version announced in the hello response.
pub const EDC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol violations that stop the plug-in.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("received a second simulation begins event")]
    SimulationAlreadyBegan,
    #[error("job {0} submitted before the simulation began")]
    SubmissionBeforeSimulationBegins(Box<str>),
}

/// The decision engine. One instance per simulation, owning the cluster state,
/// the pending queue and the policy configuration. Created at init, dropped at
/// deinit; tests instantiate engines independently.
pub struct Engine {
    config: SchedulerConfig,
    cluster: Option<ClusterState>,
    pending: IndexMap<Box<str>, SchedJob>,
    hello_sent: bool,
}

impl Engine {
    pub fn new(config: SchedulerConfig) -> Engine {
        Engine {
            config,
            cluster: None,
            pending: IndexMap::new(),
            hello_sent: false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cluster(&self) -> Option<&ClusterState> {
        self.cluster.as_ref()
    }

    /// One decision cycle: dispatches the decoded events in arrival order, then
    /// runs the EASY loop. Returns the decisions of this wakeup, in emission
    /// order. A fatal error leaves the engine consistent enough to drop.
    pub fn take_decisions(&mut self, now: f64, events: &[Event]) -> Result<Vec<Decision>, EngineError> {
        let mut decisions = Vec::new();

        for event in events {
            match event {
                Event::Hello => {
                    if self.hello_sent {
                        warn!("Ignoring duplicate hello event");
                    } else {
                        self.hello_sent = true;
                        decisions.push(Decision::EdcHello {
                            name: EDC_NAME.into(),
                            version: EDC_VERSION.into(),
                        });
                    }
                }
                Event::SimulationBegins { nb_hosts } => {
                    if self.cluster.is_some() {
                        return Err(EngineError::SimulationAlreadyBegan);
                    }
                    info!("Simulation begins: {} hosts, {:?}", nb_hosts, self.config);
                    self.cluster = Some(ClusterState::new(*nb_hosts));
                }
                Event::JobSubmitted {
                    job_id,
                    nb_hosts,
                    walltime,
                } => {
                    let cluster = match &self.cluster {
                        Some(cluster) => cluster,
                        None => return Err(EngineError::SubmissionBeforeSimulationBegins(job_id.clone())),
                    };
                    if *nb_hosts > cluster.nb_hosts() {
                        warn!(
                            "Rejecting job {}: {} hosts requested, platform has {}",
                            job_id,
                            nb_hosts,
                            cluster.nb_hosts()
                        );
                        decisions.push(Decision::RejectJob { job_id: job_id.clone() });
                    } else {
                        self.pending.insert(
                            job_id.clone(),
                            SchedJob {
                                job_id: job_id.clone(),
                                nb_hosts: *nb_hosts,
                                walltime: *walltime,
                                submit_time: now,
                            },
                        );
                    }
                }
                Event::JobCompleted { job_id } => match &mut self.cluster {
                    Some(cluster) => {
                        if !cluster.release(job_id) {
                            warn!("Ignoring completion of unknown job {}", job_id);
                        }
                    }
                    None => warn!("Ignoring completion of job {} before the simulation began", job_id),
                },
                Event::Unknown => {}
            }
        }

        if let Some(cluster) = &mut self.cluster {
            scheduling::schedule_jobs(cluster, &mut self.pending, now, &self.config, &mut decisions);
        }

        Ok(decisions)
    }
}
