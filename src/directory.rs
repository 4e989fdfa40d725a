use std::collections::HashMap;

use crate::slack::MemberRecord;

/// Display and real name for one workspace member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNames {
    pub name: String,
    pub real_name: String,
}

/// In-memory member roster, built once per run from a users.list snapshot
/// and immutable afterwards.
///
/// `all` backs report rendering; `eligible` gates which authors' messages
/// are scanned at all. Deleted members appear in neither.
#[derive(Debug, Default)]
pub struct Directory {
    all: HashMap<String, MemberNames>,
    eligible: HashMap<String, MemberNames>,
}

impl Directory {
    pub fn from_members(members: Vec<MemberRecord>) -> Self {
        let mut directory = Self::default();
        for member in members {
            if member.deleted {
                continue;
            }
            let eligible = member.is_eligible();
            let real_name = member
                .real_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| member.name.clone());
            let names = MemberNames {
                name: member.name,
                real_name,
            };
            if eligible {
                directory.eligible.insert(member.id.clone(), names.clone());
            }
            directory.all.insert(member.id, names);
        }
        directory
    }

    /// Names for any non-deleted member.
    pub fn names(&self, id: &str) -> Option<&MemberNames> {
        self.all.get(id)
    }

    pub fn is_eligible(&self, id: &str) -> bool {
        self.eligible.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn eligible_len(&self) -> usize {
        self.eligible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str) -> MemberRecord {
        MemberRecord {
            id: id.to_string(),
            deleted: false,
            is_restricted: Some(false),
            is_ultra_restricted: Some(false),
            is_bot: Some(false),
            name: name.to_string(),
            real_name: None,
        }
    }

    #[test]
    fn deleted_members_are_in_neither_mapping() {
        let mut m = member("U1", "alice");
        m.deleted = true;
        let directory = Directory::from_members(vec![m]);
        assert!(directory.names("U1").is_none());
        assert!(!directory.is_eligible("U1"));
        assert!(directory.is_empty());
    }

    #[test]
    fn restricted_members_are_listed_but_not_eligible() {
        let mut m = member("U1", "guest");
        m.is_restricted = Some(true);
        let directory = Directory::from_members(vec![m]);
        assert!(directory.names("U1").is_some());
        assert!(!directory.is_eligible("U1"));
    }

    #[test]
    fn missing_flags_make_a_member_ineligible() {
        let mut m = member("U1", "mystery");
        m.is_bot = None;
        let directory = Directory::from_members(vec![m]);
        assert!(directory.names("U1").is_some());
        assert!(!directory.is_eligible("U1"));
    }

    #[test]
    fn bots_are_not_eligible() {
        let mut m = member("U1", "beep");
        m.is_bot = Some(true);
        let directory = Directory::from_members(vec![m]);
        assert!(!directory.is_eligible("U1"));
    }

    #[test]
    fn real_name_falls_back_to_display_name() {
        let mut with_real = member("U1", "alice");
        with_real.real_name = Some("Alice Park".to_string());
        let mut empty_real = member("U2", "bob");
        empty_real.real_name = Some(String::new());
        let no_real = member("U3", "carol");

        let directory = Directory::from_members(vec![with_real, empty_real, no_real]);
        assert_eq!(directory.names("U1").unwrap().real_name, "Alice Park");
        assert_eq!(directory.names("U2").unwrap().real_name, "bob");
        assert_eq!(directory.names("U3").unwrap().real_name, "carol");
    }

    #[test]
    fn eligible_members_appear_in_both_mappings() {
        let directory = Directory::from_members(vec![member("U1", "alice")]);
        assert!(directory.names("U1").is_some());
        assert!(directory.is_eligible("U1"));
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.eligible_len(), 1);
    }
}
