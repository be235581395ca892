//! Optimization-pass model.
//!
//! Each pass of the compiler under test occupies one bit of a `PassSet`.
//! Adding a pass means extending the `Pass` enum and its `ALL` table; the
//! bitmask layout follows the enum order automatically.

use serde::{Deserialize, Deserializer, Serialize};

/// A single selectable optimization pass of the compiler under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Replaces constant expressions with their evaluated values.
    ConstantFolding,
    /// Removes unreachable code.
    DeadCodeElimination,
}

impl Pass {
    /// Every known pass, in bit order.
    pub const ALL: [Pass; 2] = [Pass::ConstantFolding, Pass::DeadCodeElimination];

    /// The bit this pass occupies in a [`PassSet`].
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// The pass name as the compiler under test spells it.
    pub const fn name(self) -> &'static str {
        match self {
            Pass::ConstantFolding => "ConstantFolding",
            Pass::DeadCodeElimination => "DeadCodeElimination",
        }
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a pass name cannot be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassParseError(String);

impl std::fmt::Display for PassParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown optimization pass: {}", self.0)
    }
}

impl std::error::Error for PassParseError {}

impl std::str::FromStr for Pass {
    type Err = PassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ConstantFolding" | "constant-folding" => Ok(Pass::ConstantFolding),
            "DeadCodeElimination" | "dead-code-elimination" => Ok(Pass::DeadCodeElimination),
            other => Err(PassParseError(other.to_string())),
        }
    }
}

/// An immutable set of enabled passes - the chromosome of the search.
///
/// Serializes transparently as its integer bitmask, which is also the
/// checkpoint representation. Deserialization masks away bits that no known
/// pass occupies, so a stale or hand-edited checkpoint cannot smuggle in an
/// out-of-range pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PassSet(u32);

impl<'de> Deserialize<'de> for PassSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(PassSet(bits & PassSet::all().0))
    }
}

impl PassSet {
    /// The set with no passes enabled.
    pub const fn empty() -> Self {
        PassSet(0)
    }

    /// The set with every known pass enabled.
    pub fn all() -> Self {
        Pass::ALL.iter().fold(PassSet::empty(), |set, &p| set.with(p))
    }

    /// Whether `pass` is enabled in this set.
    pub const fn contains(self, pass: Pass) -> bool {
        self.0 & pass.bit() != 0
    }

    /// A copy of this set with `pass` enabled.
    pub const fn with(self, pass: Pass) -> Self {
        PassSet(self.0 | pass.bit())
    }

    /// A copy of this set with `pass` flipped.
    pub const fn toggled(self, pass: Pass) -> Self {
        PassSet(self.0 ^ pass.bit())
    }

    /// Whether no pass is enabled.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The enabled passes, in bit order.
    pub fn passes(self) -> impl Iterator<Item = Pass> {
        Pass::ALL.into_iter().filter(move |&p| self.contains(p))
    }

    /// Names of the enabled passes; `["None"]` when the set is empty.
    pub fn pass_names(self) -> Vec<&'static str> {
        let names: Vec<_> = self.passes().map(Pass::name).collect();
        if names.is_empty() {
            vec!["None"]
        } else {
            names
        }
    }
}

impl std::fmt::Display for PassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pass_names().join("+"))
    }
}

impl FromIterator<Pass> for PassSet {
    fn from_iter<I: IntoIterator<Item = Pass>>(iter: I) -> Self {
        iter.into_iter().fold(PassSet::empty(), PassSet::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_tracks_bits() {
        let set = PassSet::empty().with(Pass::ConstantFolding);
        assert!(set.contains(Pass::ConstantFolding));
        assert!(!set.contains(Pass::DeadCodeElimination));
        assert_eq!(set.bits(), Pass::ConstantFolding.bit());
    }

    #[test]
    fn test_all_enables_every_known_pass() {
        let all = PassSet::all();
        for pass in Pass::ALL {
            assert!(all.contains(pass), "{} missing from PassSet::all()", pass);
        }
    }

    #[test]
    fn test_toggled_flips_exactly_one_bit() {
        let set = PassSet::all();
        let flipped = set.toggled(Pass::DeadCodeElimination);
        assert!(!flipped.contains(Pass::DeadCodeElimination));
        assert!(flipped.contains(Pass::ConstantFolding));
        assert_eq!(flipped.toggled(Pass::DeadCodeElimination), set);
    }

    #[test]
    fn test_pass_names_empty_set() {
        assert_eq!(PassSet::empty().pass_names(), vec!["None"]);
        assert_eq!(PassSet::empty().to_string(), "None");
    }

    #[test]
    fn test_pass_names_full_set() {
        assert_eq!(
            PassSet::all().pass_names(),
            vec!["ConstantFolding", "DeadCodeElimination"]
        );
    }

    #[test]
    fn test_parse_pass_names() {
        assert_eq!("ConstantFolding".parse::<Pass>(), Ok(Pass::ConstantFolding));
        assert_eq!(
            "dead-code-elimination".parse::<Pass>(),
            Ok(Pass::DeadCodeElimination)
        );
        assert!("Inlining".parse::<Pass>().is_err());
    }

    #[test]
    fn test_serializes_as_bitmask() {
        let set = PassSet::all();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, set.bits().to_string());
        let back: PassSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_deserialization_masks_unknown_bits() {
        let set: PassSet = serde_json::from_str("255").unwrap();
        assert_eq!(set, PassSet::all());
    }
}
