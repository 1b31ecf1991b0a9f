//! Common table expressions for chained predicates.
//!
//! Each chained predicate becomes a CTE selecting the ids of the target
//! resources that satisfy the nested predicate. A chain's slot is reserved
//! before its nested predicate is compiled, so entries are in discovery order
//! with every outer chain ahead of the chains nested inside it. An outer body
//! refers to its nested CTEs by name, so the `WITH` preamble lists the
//! entries in reverse.

/// A registered CTE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteDefinition {
    /// CTE name, unique within the query.
    pub name: String,
    /// The `SELECT` producing the `Id` column.
    pub body: String,
}

/// Ordered CTE definitions for one top-level compile.
#[derive(Debug, Default)]
pub struct CteRegistry {
    definitions: Vec<CteDefinition>,
}

impl CteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered CTEs.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no chain has been registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Reserves the next slot and returns a unique name for it.
    ///
    /// The name is `cte_{parameter}_{target}_{n}` with every character outside
    /// `[A-Za-z0-9_]` replaced by `_`.
    pub fn reserve(&mut self, parameter: &str, target_resource_type: &str) -> (usize, String) {
        let slot = self.definitions.len();
        let name = format!(
            "cte_{}_{}_{}",
            sanitize(parameter),
            sanitize(target_resource_type),
            slot
        );
        self.definitions.push(CteDefinition {
            name: name.clone(),
            body: String::new(),
        });
        (slot, name)
    }

    /// Stores the body of a reserved slot.
    pub fn define(&mut self, slot: usize, body: String) {
        if let Some(definition) = self.definitions.get_mut(slot) {
            definition.body = body;
        }
    }

    /// Definitions in discovery order.
    pub fn definitions(&self) -> &[CteDefinition] {
        &self.definitions
    }

    /// Writes the `WITH` preamble, dependencies first.
    ///
    /// Writes nothing when the registry is empty.
    pub fn write_preamble(&self, out: &mut String) {
        if self.definitions.is_empty() {
            return;
        }

        out.push_str("WITH ");
        for (i, definition) in self.definitions.iter().rev().enumerate() {
            if i > 0 {
                out.push_str(",\n");
            }
            out.push_str(&definition.name);
            out.push_str("(Id)\nAS (\n");
            out.push_str(&definition.body);
            out.push(')');
        }
        out.push('\n');
    }
}

fn sanitize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
