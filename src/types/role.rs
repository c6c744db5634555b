use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a user holds on a list.
///
/// Variants are ordered by privilege so checks can be expressed as comparisons:
/// `None < Reader < Editor < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    None,
    Reader,
    Editor,
    Owner,
}

impl Role {
    /// Returns true if the role may view the list and its items.
    #[must_use]
    pub fn can_read(self) -> bool {
        self >= Role::Reader
    }

    /// Returns true if the role may add, edit or delete items.
    #[must_use]
    pub fn can_edit(self) -> bool {
        self >= Role::Editor
    }

    #[must_use]
    pub fn can_delete_items(self) -> bool {
        self.can_edit()
    }

    /// Share links may be issued by anyone who can edit.
    #[must_use]
    pub fn can_share(self) -> bool {
        self.can_edit()
    }

    /// Only the owner may delete the list or remove members.
    #[must_use]
    pub fn can_delete_list(self) -> bool {
        self == Role::Owner
    }

    /// Returns true for roles that can be granted through a share.
    #[must_use]
    pub fn is_grantable(self) -> bool {
        matches!(self, Role::Reader | Role::Editor)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Reader => "reader",
            Role::Editor => "editor",
            Role::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "none" => Some(Role::None),
            "reader" => Some(Role::Reader),
            "editor" => Some(Role::Editor),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }

    /// Parses a role that may be granted to another user (editor or reader).
    pub fn parse_grantable(s: &str) -> Option<Role> {
        Self::parse(&s.trim().to_ascii_lowercase()).filter(|r| r.is_grantable())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
