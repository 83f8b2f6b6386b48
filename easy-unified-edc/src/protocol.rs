use easy_unified_core::model::events::{Decision, Event};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flag bits of the `batsim_edc_init` flags word.
pub const FORMAT_BINARY: u32 = 0x1;
pub const FORMAT_JSON: u32 = 0x2;

/// Wire rendering negotiated at init time. Both modes carry the same tagged
/// unions through serde; binary selects compact bytes, text a human-readable
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Binary,
    Text,
}

impl WireFormat {
    pub fn from_flags(flags: u32) -> Result<WireFormat, CodecError> {
        if flags & !(FORMAT_BINARY | FORMAT_JSON) != 0 {
            return Err(CodecError::UnknownFlags(flags));
        }
        if flags & FORMAT_BINARY != 0 {
            Ok(WireFormat::Binary)
        } else {
            Ok(WireFormat::Text)
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("unknown format flags {0:#x}")]
    UnknownFlags(u32),
    #[error("cannot decode message: {0}")]
    Decode(String),
    #[error("cannot encode message: {0}")]
    Encode(String),
}

/// One simulator wakeup: the current time and the event batch, in arrival
/// order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub now: f64,
    pub events: Vec<Event>,
}

/// The reply. The simulator treats all decisions of one wakeup as simultaneous
/// at `now`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecisionMessage {
    pub now: f64,
    pub events: Vec<Decision>,
}

pub fn decode(_format: WireFormat, bytes: &[u8]) -> Result<Message, CodecError> {
    serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(err.to_string()))
}

pub fn encode(format: WireFormat, message: &DecisionMessage) -> Result<Vec<u8>, CodecError> {
    match format {
        WireFormat::Binary => serde_json::to_vec(message),
        WireFormat::Text => serde_json::to_vec_pretty(message),
    }
    .map_err(|err| CodecError::Encode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_the_format() {
        assert_eq!(WireFormat::from_flags(FORMAT_BINARY), Ok(WireFormat::Binary));
        assert_eq!(WireFormat::from_flags(FORMAT_JSON), Ok(WireFormat::Text));
        assert_eq!(WireFormat::from_flags(0), Ok(WireFormat::Text));
        assert_eq!(WireFormat::from_flags(0x8), Err(CodecError::UnknownFlags(0x8)));
    }

    #[test]
    fn events_decode_from_tagged_json() {
        let message = decode(
            WireFormat::Text,
            br#"{
                "now": 3.5,
                "events": [
                    {"type": "hello"},
                    {"type": "simulation_begins", "computation_host_number": 16},
                    {"type": "job_submitted", "job_id": "w0!j1", "resource_request": 2, "walltime": 60.0},
                    {"type": "job_completed", "job_id": "w0!j0"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(message.now, 3.5);
        assert_eq!(
            message.events,
            vec![
                Event::Hello,
                Event::SimulationBegins { nb_hosts: 16 },
                Event::JobSubmitted {
                    job_id: "w0!j1".into(),
                    nb_hosts: 2,
                    walltime: 60.0,
                },
                Event::JobCompleted { job_id: "w0!j0".into() },
            ]
        );
    }

    #[test]
    fn unrecognized_event_types_decode_to_unknown() {
        let message = decode(
            WireFormat::Text,
            br#"{"now": 1.0, "events": [{"type": "job_killed", "job_id": "w0!j0"}]}"#,
        )
        .unwrap();
        assert_eq!(message.events, vec![Event::Unknown]);
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        assert!(matches!(decode(WireFormat::Binary, b"not json"), Err(CodecError::Decode(_))));
    }

    #[test]
    fn decisions_encode_with_their_tags() {
        let reply = DecisionMessage {
            now: 2.0,
            events: vec![Decision::ExecuteJob {
                job_id: "w0!j1".into(),
                hosts: "0,1".into(),
            }],
        };
        let bytes = encode(WireFormat::Binary, &reply).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["now"], 2.0);
        assert_eq!(value["events"][0]["type"], "execute_job");
        assert_eq!(value["events"][0]["job_id"], "w0!j1");
        assert_eq!(value["events"][0]["hosts"], "0,1");
    }

    #[test]
    fn text_mode_is_pretty_printed() {
        let reply = DecisionMessage { now: 0.0, events: vec![] };
        let text = encode(WireFormat::Text, &reply).unwrap();
        let binary = encode(WireFormat::Binary, &reply).unwrap();
        assert!(text.len() > binary.len());
        assert_eq!(
            serde_json::from_slice::<DecisionMessage>(&text).unwrap(),
            serde_json::from_slice::<DecisionMessage>(&binary).unwrap()
        );
    }
}
