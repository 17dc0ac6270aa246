//! Version policies: branch, tag or fixed commit

use std::fmt;

/// Kind of ref a pin follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Branch,
    Tag,
    Sha,
}

impl RefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
            RefKind::Sha => "sha",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named pointer to a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefSpec {
    /// Follows the head of a branch; re-resolved on every fetch
    Branch(String),
    /// Fixed to the commit a tag pointed at when pinned
    Tag(String),
    /// Fixed to a commit
    Sha(String),
}

impl RefSpec {
    pub fn kind(&self) -> RefKind {
        match self {
            RefSpec::Branch(_) => RefKind::Branch,
            RefSpec::Tag(_) => RefKind::Tag,
            RefSpec::Sha(_) => RefKind::Sha,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            RefSpec::Branch(v) | RefSpec::Tag(v) | RefSpec::Sha(v) => v,
        }
    }

    /// Branch pins move; tag and SHA pins do not
    pub fn is_floating(&self) -> bool {
        matches!(self, RefSpec::Branch(_))
    }

    /// Refs an untyped name may stand for, in lookup order.
    ///
    /// 7 to 40 hex digits read as a commit SHA; anything else is tried as a
    /// branch first, then as a tag.
    pub fn candidates(name: &str) -> Vec<RefSpec> {
        let looks_like_sha =
            (7..=40).contains(&name.len()) && name.bytes().all(|b| b.is_ascii_hexdigit());
        if looks_like_sha {
            vec![RefSpec::Sha(name.to_string())]
        } else {
            vec![
                RefSpec::Branch(name.to_string()),
                RefSpec::Tag(name.to_string()),
            ]
        }
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.value())
    }
}
