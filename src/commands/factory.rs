//! Command factories: name to command resolution for one domain.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::traits::Command;

/// Resolves command names for one domain.
///
/// Lookups are pure: the mapping is fixed when the factory is built and
/// every call for the same name returns the same shared command.
pub trait CommandFactory: Send + Sync {
    /// The command registered under `name`, or `None` for an unknown command.
    fn get_command(&self, name: &str) -> Option<Arc<dyn Command>>;

    /// All resolvable names.
    fn command_names(&self) -> Vec<&'static str>;
}

/// Table-backed factory built once at construction.
#[derive(Clone)]
pub struct CommandTable {
    domain: &'static str,
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandTable {
    /// Build a table from commands, keyed by [`Command::name`].
    pub fn new(domain: &'static str, commands: Vec<Arc<dyn Command>>) -> Self {
        let mut table = Self {
            domain,
            commands: HashMap::new(),
        };

        for command in commands {
            table.register(command);
        }

        info!(
            domain = domain,
            count = table.commands.len(),
            "Command table initialized"
        );

        table
    }

    /// Register a command. A later command with the same name replaces the
    /// earlier one; returns whether that happened.
    fn register(&mut self, command: Arc<dyn Command>) -> bool {
        let name = command.name();
        debug!(domain = self.domain, command = name, "Registering command");
        let replaced = self.commands.insert(name, command).is_some();
        if replaced {
            warn!(
                domain = self.domain,
                command = name,
                "Duplicate command name, earlier registration replaced"
            );
        }
        replaced
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandFactory for CommandTable {
    fn get_command(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
