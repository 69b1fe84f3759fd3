/*!
 * Identifier issuing for containers and components
 */

use uuid::Uuid;

/// Prefix of generated container identifiers
pub const CONTAINER_PREFIX: &str = "directory_";

/// Prefix of generated component identifiers
pub const COMPONENT_PREFIX: &str = "component_";

/// A component identifier paired with its instance token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentId {
    pub id: String,
    pub instance_token: String,
}

/// Issues identifiers for one generation run
///
/// Container and component counters are independent and both start at 1.
/// Every component identifier is appended to the ledger, which the manifest
/// section reads once the walk is finished.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    containers: u64,
    components: u64,
    ledger: Vec<String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next `directory_N` identifier
    pub fn next_container_id(&mut self) -> String {
        self.containers += 1;
        format!("{}{}", CONTAINER_PREFIX, self.containers)
    }

    /// Next `component_M` identifier, recorded in the ledger
    pub fn next_component_id(&mut self, instance_token: String) -> ComponentId {
        self.components += 1;
        let id = format!("{}{}", COMPONENT_PREFIX, self.components);
        self.ledger.push(id.clone());
        ComponentId { id, instance_token }
    }

    /// A random 128-bit token rendered as an uppercase GUID
    pub fn new_instance_token(&self) -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }

    /// Component identifiers issued so far, in issue order
    pub fn ledger(&self) -> &[String] {
        &self.ledger
    }

    /// Number of containers issued so far
    pub fn containers_issued(&self) -> u64 {
        self.containers
    }
}
