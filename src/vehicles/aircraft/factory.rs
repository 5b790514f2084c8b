use std::collections::HashMap;

use super::{GenericAircraft, GenericAircraftConfig};
use crate::components::AircraftType;
use crate::physics::{Aircraft, AircraftFactory, PhysicsError};

/// Builds [`GenericAircraft`] instances for the built-in type and for any
/// custom configurations registered by name.
#[derive(Debug, Clone, Default)]
pub struct BuiltinAircraftFactory {
    custom: HashMap<String, GenericAircraftConfig>,
}

impl BuiltinAircraftFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configs(configs: impl IntoIterator<Item = GenericAircraftConfig>) -> Self {
        let mut factory = Self::new();
        for config in configs {
            factory.register(config);
        }
        factory
    }

    /// Register a custom type; a later config with the same name replaces it.
    pub fn register(&mut self, config: GenericAircraftConfig) {
        self.custom.insert(config.name.clone(), config);
    }
}

impl AircraftFactory for BuiltinAircraftFactory {
    fn create(&self, aircraft_type: &AircraftType) -> Result<Box<dyn Aircraft>, PhysicsError> {
        let config = match aircraft_type {
            AircraftType::GenericLight => GenericAircraftConfig::generic_light(),
            AircraftType::Custom(name) => self
                .custom
                .get(name)
                .cloned()
                .ok_or_else(|| PhysicsError::UnsupportedAircraft(name.clone()))?,
        };
        Ok(Box::new(GenericAircraft::new(config)?))
    }
}
