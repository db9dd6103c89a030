//! Member lookup filters
//!
//! Visibility here is a lookup filter only. Asking for `NON_PUBLIC` members
//! always succeeds; nothing in the catalog enforces access control.

use std::ops::BitOr;

/// Declared visibility of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Visible to every caller
    #[default]
    Public,
    /// Private, protected or internal
    NonPublic,
}

impl Visibility {
    /// Lowercase name for listings
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::NonPublic => "non-public",
        }
    }
}

/// Lookup filter flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingFlags(u8);

impl BindingFlags {
    /// Matches nothing
    pub const NONE: Self = Self(0x00);
    /// Public members
    pub const PUBLIC: Self = Self(0x01);
    /// Non-public members
    pub const NON_PUBLIC: Self = Self(0x02);
    /// Instance members
    pub const INSTANCE: Self = Self(0x04);
    /// Static members
    pub const STATIC: Self = Self(0x08);

    /// PUBLIC | INSTANCE | STATIC
    pub const DEFAULT: Self = Self(0x0D);
    /// PUBLIC | NON_PUBLIC | INSTANCE | STATIC
    pub const ALL: Self = Self(0x0F);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all flags of `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether a member with this visibility and staticness passes the filter.
    ///
    /// When neither `INSTANCE` nor `STATIC` is set both kinds match.
    pub fn matches(&self, visibility: Visibility, is_static: bool) -> bool {
        let visible = match visibility {
            Visibility::Public => self.contains(Self::PUBLIC),
            Visibility::NonPublic => self.contains(Self::NON_PUBLIC),
        };
        if !visible {
            return false;
        }

        let wants_instance = self.contains(Self::INSTANCE);
        let wants_static = self.contains(Self::STATIC);
        if !wants_instance && !wants_static {
            return true;
        }
        if is_static {
            wants_static
        } else {
            wants_instance
        }
    }

    /// Parse from a flag name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "PUBLIC" => Some(Self::PUBLIC),
            "NON_PUBLIC" | "NONPUBLIC" => Some(Self::NON_PUBLIC),
            "INSTANCE" => Some(Self::INSTANCE),
            "STATIC" => Some(Self::STATIC),
            "DEFAULT" => Some(Self::DEFAULT),
            "ALL" => Some(Self::ALL),
            _ => None,
        }
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for BindingFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations() {
        assert_eq!(
            BindingFlags::PUBLIC | BindingFlags::INSTANCE | BindingFlags::STATIC,
            BindingFlags::DEFAULT
        );
        assert!(BindingFlags::ALL.contains(BindingFlags::NON_PUBLIC));
        assert!(!BindingFlags::DEFAULT.contains(BindingFlags::NON_PUBLIC));
    }

    #[test]
    fn test_matches_visibility() {
        let public = BindingFlags::PUBLIC;
        assert!(public.matches(Visibility::Public, false));
        assert!(public.matches(Visibility::Public, true));
        assert!(!public.matches(Visibility::NonPublic, false));

        let private_instance = BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE;
        assert!(private_instance.matches(Visibility::NonPublic, false));
        assert!(!private_instance.matches(Visibility::NonPublic, true));
        assert!(!private_instance.matches(Visibility::Public, false));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(BindingFlags::from_name("non_public"), Some(BindingFlags::NON_PUBLIC));
        assert_eq!(BindingFlags::from_name("Static"), Some(BindingFlags::STATIC));
        assert_eq!(BindingFlags::from_name("bogus"), None);
    }

    #[test]
    fn test_from_bits_masks_unknown() {
        assert_eq!(BindingFlags::from_bits(0xFF), BindingFlags::ALL);
    }
}
