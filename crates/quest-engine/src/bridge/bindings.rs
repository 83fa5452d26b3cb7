use std::collections::HashMap;
use super::protocol::{Binding, Command};

/// Tracks which click bindings are live in each splice container.
///
/// Replacing a container's HTML detaches every listener that was attached to
/// the old nodes, so the table mirrors that: a splice drops the container's
/// previous bindings before recording the new ones.
#[derive(Debug, Default)]
pub struct BindingTable {
    containers: HashMap<String, Vec<Binding>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a splice and build the command that performs it.
    pub fn splice(
        &mut self,
        container: impl Into<String>,
        html: impl Into<String>,
        bindings: Vec<Binding>,
    ) -> Command {
        let container = container.into();
        self.containers.insert(container.clone(), bindings.clone());
        Command::Splice {
            container,
            html: html.into(),
            bindings,
        }
    }

    /// Forget a container's bindings (its content was cleared).
    pub fn release(&mut self, container: &str) {
        self.containers.remove(container);
    }

    /// Bindings currently attached inside `container`.
    pub fn bindings(&self, container: &str) -> &[Binding] {
        self.containers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of live bindings across all containers.
    pub fn len(&self) -> usize {
        self.containers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
