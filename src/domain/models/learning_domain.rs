//! The fixed set of subject domains over which mastery is tracked.
//!
//! Domains form a closed enumeration, so per-domain data lives in a
//! [`DomainMap`] backed by a fixed-size array. Every domain always has an
//! entry; there is no "missing key" case to guard against at runtime.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// Number of learning domains.
pub const DOMAIN_COUNT: usize = 5;

/// A subject-matter category whose mastery is tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningDomain {
    Budgeting,
    Saving,
    Debt,
    Investing,
    Credit,
}

impl LearningDomain {
    /// All domains in canonical order.
    pub const ALL: [Self; DOMAIN_COUNT] = [
        Self::Budgeting,
        Self::Saving,
        Self::Debt,
        Self::Investing,
        Self::Credit,
    ];

    /// Stable string name, used as the persisted key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Budgeting => "budgeting",
            Self::Saving => "saving",
            Self::Debt => "debt",
            Self::Investing => "investing",
            Self::Credit => "credit",
        }
    }

    /// Human-facing label.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Budgeting => "Budgeting",
            Self::Saving => "Saving",
            Self::Debt => "Debt Management",
            Self::Investing => "Investing",
            Self::Credit => "Credit",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Budgeting => 0,
            Self::Saving => 1,
            Self::Debt => 2,
            Self::Investing => 3,
            Self::Credit => 4,
        }
    }
}

impl fmt::Display for LearningDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| DomainError::UnknownDomain(s.to_string()))
    }
}

/// A total mapping from every [`LearningDomain`] to a value.
///
/// Serializes as an object keyed by domain name. Deserialization fills any
/// absent domain with `T::default()` and skips unrecognised keys, so state
/// written by an older or newer schema still loads.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainMap<T> {
    entries: [T; DOMAIN_COUNT],
}

impl<T> DomainMap<T> {
    /// Build a map by evaluating `f` for each domain.
    pub fn from_fn(mut f: impl FnMut(LearningDomain) -> T) -> Self {
        Self {
            entries: LearningDomain::ALL.map(&mut f),
        }
    }

    pub fn get(&self, domain: LearningDomain) -> &T {
        &self.entries[domain.index()]
    }

    pub fn get_mut(&mut self, domain: LearningDomain) -> &mut T {
        &mut self.entries[domain.index()]
    }

    /// Iterate `(domain, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (LearningDomain, &T)> {
        LearningDomain::ALL.into_iter().zip(self.entries.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LearningDomain, &mut T)> {
        LearningDomain::ALL.into_iter().zip(self.entries.iter_mut())
    }
}

impl<T: Default> Default for DomainMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<LearningDomain> for DomainMap<T> {
    type Output = T;

    fn index(&self, domain: LearningDomain) -> &T {
        self.get(domain)
    }
}

impl<T> IndexMut<LearningDomain> for DomainMap<T> {
    fn index_mut(&mut self, domain: LearningDomain) -> &mut T {
        self.get_mut(domain)
    }
}

impl<T: Serialize> Serialize for DomainMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DOMAIN_COUNT))?;
        for (domain, value) in self.iter() {
            map.serialize_entry(domain.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for DomainMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DomainMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de> + Default> Visitor<'de> for DomainMapVisitor<T> {
            type Value = DomainMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by learning domain name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = DomainMap::<T>::default();
                while let Some(key) = access.next_key::<String>()? {
                    match key.parse::<LearningDomain>() {
                        Ok(domain) => out[domain] = access.next_value()?,
                        Err(_) => {
                            access.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(DomainMapVisitor(PhantomData))
    }
}
