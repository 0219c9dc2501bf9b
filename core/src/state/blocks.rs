//! Named state blocks that can be excluded from serialization

/// Block toggling errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("state block name: '{0}' not found")]
    NotFound(String),
}

/// Enabled/disabled flag per named state block
///
/// The set of names is fixed by the core at construction; only the flags
/// change afterwards. Blocks are kept in the order the core declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateBlockSet {
    blocks: Vec<(String, bool)>,
}

impl StateBlockSet {
    /// Create a set with every named block enabled
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocks: names.into_iter().map(|n| (n.into(), true)).collect(),
        }
    }

    /// Include a block in serialized state
    pub fn enable(&mut self, name: &str) -> Result<(), BlockError> {
        self.set(name, true)
    }

    /// Exclude a block from serialized state
    pub fn disable(&mut self, name: &str) -> Result<(), BlockError> {
        self.set(name, false)
    }

    fn set(&mut self, name: &str, enabled: bool) -> Result<(), BlockError> {
        let entry = self
            .blocks
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| BlockError::NotFound(name.to_string()))?;
        entry.1 = enabled;
        Ok(())
    }

    /// Whether a block is serialized (unknown names are never serialized)
    pub fn is_enabled(&self, name: &str) -> bool {
        self.blocks.iter().any(|(n, enabled)| n == name && *enabled)
    }

    /// All block names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|(n, _)| n.as_str())
    }

    /// Names of the disabled blocks in declaration order
    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|(_, enabled)| !enabled)
            .map(|(n, _)| n.as_str())
    }
}
