use serde::{Deserialize, Serialize};

/// Events decoded from one simulator wakeup, in arrival order.
///
/// The wire carries a tagged union; event types this plug-in does not react to
/// decode to [`Event::Unknown`] and are dropped silently.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Hello,
    SimulationBegins {
        #[serde(rename = "computation_host_number")]
        nb_hosts: u32,
    },
    JobSubmitted {
        job_id: Box<str>,
        #[serde(rename = "resource_request")]
        nb_hosts: u32,
        walltime: f64,
    },
    JobCompleted {
        job_id: Box<str>,
    },
    #[serde(other)]
    Unknown,
}

/// Decisions emitted back to the simulator. All decisions of one wakeup are
/// simultaneous at the message time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    EdcHello {
        name: Box<str>,
        version: Box<str>,
    },
    ExecuteJob {
        job_id: Box<str>,
        /// Ascending comma-separated host ids, e.g. `"0,1,3"`.
        hosts: Box<str>,
    },
    RejectJob {
        job_id: Box<str>,
    },
}
