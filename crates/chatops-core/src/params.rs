//! Parameter slots and the explicit parameter bag passed between turns.
//!
//! Every command registers its parameters up front as an ordered
//! [`ParameterSet`]. Values never live on the command itself: they travel in a
//! [`ParameterBag`] that is serialized into button payloads and handed to
//! resolvers read-only. Resolvers answer with [`ParameterUpdates`], which the
//! engine applies.

use crate::error::{ChatOpsError, Result};
use crate::setter::ParameterSetter;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Known parameter values, keyed by parameter name.
pub type ParameterBag = BTreeMap<String, String>;

/// Absent or blank after trimming.
pub fn is_empty_value(value: Option<&String>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

// ---------------------------------------------------------------------------
// ParameterUpdates
// ---------------------------------------------------------------------------

/// Values assigned by a resolver in one step. May cover several parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterUpdates(ParameterBag);

impl ParameterUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().with(name, value)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill the empty slots of `bag`. A value that is already set is never
    /// replaced or blanked; the names of such updates are returned.
    pub fn apply_to(self, bag: &mut ParameterBag) -> Vec<String> {
        let mut ignored = Vec::new();
        for (name, value) in self.0 {
            if is_empty_value(bag.get(&name)) {
                bag.insert(name, value);
            } else if bag.get(&name) != Some(&value) {
                ignored.push(name);
            }
        }
        ignored
    }
}

// ---------------------------------------------------------------------------
// ParameterKind / ParameterSpec
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum ParameterKind {
    /// Supplied by the invoker; the engine never resolves it.
    Input,
    /// Resolved by `setter`, possibly across several chat turns.
    Recursive {
        setter: Arc<dyn ParameterSetter>,
        selection_message: Option<String>,
    },
}

impl fmt::Debug for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Input => f.write_str("Input"),
            ParameterKind::Recursive {
                selection_message, ..
            } => f
                .debug_struct("Recursive")
                .field("selection_message", selection_message)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub label: Option<String>,
    pub kind: ParameterKind,
    pub call_order: u32,
    pub force_set: bool,
    pub display: bool,
}

impl ParameterSpec {
    /// A value the invoker must supply. Missing force-set inputs fail the
    /// turn before the command runs; see [`ParameterSet::missing_input`].
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: ParameterKind::Input,
            call_order: 0,
            force_set: true,
            display: true,
        }
    }

    pub fn recursive(
        name: impl Into<String>,
        call_order: u32,
        setter: Arc<dyn ParameterSetter>,
    ) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: ParameterKind::Recursive {
                setter,
                selection_message: None,
            },
            call_order,
            force_set: true,
            display: true,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn selection_message(mut self, message: impl Into<String>) -> Self {
        if let ParameterKind::Recursive {
            selection_message, ..
        } = &mut self.kind
        {
            *selection_message = Some(message.into());
        }
        self
    }

    /// Optional parameters are never resolved or required by the engine.
    pub fn optional(mut self) -> Self {
        self.force_set = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display = false;
        self
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self.kind, ParameterKind::Recursive { .. })
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// ParameterSet
// ---------------------------------------------------------------------------

/// Parameters of one command in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    specs: Vec<ParameterSpec>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn push(&mut self, spec: ParameterSpec) {
        self.specs.push(spec);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// All parameters sorted by call order. The sort is stable, so equal call
    /// orders keep declaration order.
    pub fn by_call_order(&self) -> Vec<&ParameterSpec> {
        let mut ordered: Vec<&ParameterSpec> = self.specs.iter().collect();
        ordered.sort_by_key(|s| s.call_order);
        ordered
    }

    /// The first force-set recursive parameter whose value is empty.
    pub fn next_unresolved(&self, bag: &ParameterBag) -> Option<&ParameterSpec> {
        self.by_call_order()
            .into_iter()
            .filter(|s| s.is_recursive() && s.force_set)
            .find(|s| is_empty_value(bag.get(&s.name)))
    }

    /// The first force-set input parameter whose value is empty.
    pub fn missing_input(&self, bag: &ParameterBag) -> Option<&ParameterSpec> {
        self.specs
            .iter()
            .filter(|s| !s.is_recursive() && s.force_set)
            .find(|s| is_empty_value(bag.get(&s.name)))
    }

    /// Reject duplicate names and duplicate call orders among recursive parameters.
    pub fn validate(&self, command: &str) -> Result<()> {
        let mut names = HashSet::new();
        let mut orders = HashSet::new();
        for spec in &self.specs {
            if !names.insert(spec.name.as_str()) {
                return Err(ChatOpsError::InvalidParameters {
                    command: command.to_string(),
                    reason: format!("parameter '{}' is declared twice", spec.name),
                });
            }
            if spec.is_recursive() && !orders.insert(spec.call_order) {
                return Err(ChatOpsError::InvalidParameters {
                    command: command.to_string(),
                    reason: format!(
                        "call order {} is used by more than one recursive parameter",
                        spec.call_order
                    ),
                });
            }
        }
        Ok(())
    }
}
