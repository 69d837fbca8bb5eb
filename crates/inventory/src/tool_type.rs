use serde::{Deserialize, Serialize};

use toolcrib_core::{DomainError, DomainResult, Entity, ToolTypeId};

/// A named kind of tool (e.g. "drill").
///
/// Total stock is not stored here: it is the sum of quantities across the
/// type's instances, adjusted only through catalog stock operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolType {
    id: ToolTypeId,
    name: String,
}

impl ToolType {
    pub fn new(id: ToolTypeId, name: impl Into<String>) -> DomainResult<Self> {
        let name = normalize_name(name.into())?;
        Ok(Self { id, name })
    }

    pub fn id(&self) -> ToolTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same type under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> DomainResult<Self> {
        Self::new(self.id, name)
    }
}

impl Entity for ToolType {
    type Id = ToolTypeId;

    fn id(&self) -> ToolTypeId {
        self.id
    }
}

fn normalize_name(raw: String) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("tool type name must not be blank"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let tool_type = ToolType::new(ToolTypeId::new(), "  drill  ").unwrap();
        assert_eq!(tool_type.name(), "drill");
    }

    #[test]
    fn rejects_blank_name() {
        let err = ToolType::new(ToolTypeId::new(), "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn renamed_keeps_the_id() {
        let original = ToolType::new(ToolTypeId::new(), "drill").unwrap();
        let renamed = original.renamed("impact drill").unwrap();
        assert_eq!(renamed.id(), original.id());
        assert_eq!(renamed.name(), "impact drill");
    }
}
