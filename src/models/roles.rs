use serde::{Deserialize, Serialize};

/// One row of the role table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    #[serde(alias = "Author")]
    pub author: String,
    #[serde(alias = "Role", alias = "Function", alias = "function", alias = "Position")]
    pub role: String,
}

impl RoleEntry {
    pub fn new(author: &str, role: &str) -> Self {
        Self { author: author.to_string(), role: role.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_entry_accepts_export_column_names() {
        let json = r#"{"Author": "motley-fox", "Function": "Staff"}"#;
        let entry: RoleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, RoleEntry::new("motley-fox", "Staff"));

        let json = r#"{"author": "bob", "role": "Keeper", "Team": "H1"}"#;
        let entry: RoleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, RoleEntry::new("bob", "Keeper"));

        let json = r#"{"Author": "cees", "Position": "Parent"}"#;
        let entry: RoleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, RoleEntry::new("cees", "Parent"));
    }
}
