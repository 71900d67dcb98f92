use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const LOCAL: &str = "local";
pub const STAGING: &str = "staging";
pub const LIVE: &str = "live";

bitflags! {
    /// Deployment tiers the current process believes it runs in.
    ///
    /// Nothing forces exactly one bit: a misconfigured host may report several
    /// tiers at once, and every reported tier gets its configuration branch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct EnvironmentSet: u8 {
        const LOCAL = 1 << 0;
        const STAGING = 1 << 1;
        const LIVE = 1 << 2;
    }
}

impl EnvironmentSet {
    /// Builds the set from the three environment predicates.
    #[must_use]
    pub fn from_predicates(local: bool, staging: bool, live: bool) -> Self {
        let mut set = Self::empty();
        set.set(Self::LOCAL, local);
        set.set(Self::STAGING, staging);
        set.set(Self::LIVE, live);
        set
    }

    /// `true` when more than one tier is reported.
    #[must_use]
    pub const fn is_ambiguous(self) -> bool {
        self.bits().count_ones() > 1
    }
}

impl From<&str> for EnvironmentSet {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            LOCAL => Self::LOCAL,
            STAGING => Self::STAGING,
            LIVE | "production" => Self::LIVE,
            _ => Self::empty(),
        }
    }
}

impl fmt::Display for EnvironmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let names = [(Self::LOCAL, LOCAL), (Self::STAGING, STAGING), (Self::LIVE, LIVE)];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Serialize for EnvironmentSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for EnvironmentSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
