//! Entity commands produced by picks.

use serde::ser::{Serialize, SerializeStruct, Serializer};

pub const LIGHT_DOMAIN: &str = "light";
pub const TOGGLE_SERVICE: &str = "toggle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCommand {
    pub domain: &'static str,
    pub service: &'static str,
    pub entity_id: String,
}

impl ToggleCommand {
    pub fn toggle_light(entity_id: &str) -> Self {
        Self {
            domain: LIGHT_DOMAIN,
            service: TOGGLE_SERVICE,
            entity_id: entity_id.to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct ServiceData<'a> {
    entity_id: &'a str,
}

/// Serializes as a service call: `{"domain", "service", "service_data": {"entity_id"}}`.
impl Serialize for ToggleCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut call = serializer.serialize_struct("ServiceCall", 3)?;
        call.serialize_field("domain", self.domain)?;
        call.serialize_field("service", self.service)?;
        call.serialize_field(
            "service_data",
            &ServiceData {
                entity_id: &self.entity_id,
            },
        )?;
        call.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown entity {0}")]
    UnknownEntity(String),
    #[error("service call rejected: {0}")]
    Rejected(String),
}

/// External service-invocation API.
pub trait CommandSink {
    fn toggle_light(&mut self, entity_id: &str) -> Result<(), CommandError>;

    fn dispatch(&mut self, command: &ToggleCommand) -> Result<(), CommandError> {
        if command.domain != LIGHT_DOMAIN || command.service != TOGGLE_SERVICE {
            return Err(CommandError::Rejected(format!(
                "{}.{}",
                command.domain, command.service
            )));
        }
        self.toggle_light(&command.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        toggled: Vec<String>,
    }

    impl CommandSink for RecordingSink {
        fn toggle_light(&mut self, entity_id: &str) -> Result<(), CommandError> {
            self.toggled.push(entity_id.to_string());
            Ok(())
        }
    }

    #[test]
    fn toggle_serializes_as_service_call() {
        let command = ToggleCommand::toggle_light("light.kitchen");
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "domain": "light",
                "service": "toggle",
                "service_data": { "entity_id": "light.kitchen" }
            })
        );
    }

    #[test]
    fn dispatch_forwards_light_toggles() {
        let mut sink = RecordingSink::default();
        sink.dispatch(&ToggleCommand::toggle_light("light.hall"))
            .unwrap();
        assert_eq!(sink.toggled, vec!["light.hall".to_string()]);

        let other = ToggleCommand {
            domain: "switch",
            service: "toggle",
            entity_id: "switch.fan".to_string(),
        };
        assert!(matches!(
            sink.dispatch(&other),
            Err(CommandError::Rejected(_))
        ));
        assert_eq!(sink.toggled.len(), 1);
    }
}
