use crate::plugin_system::traits::ServiceType;

/// An already registered service equivalent to the one being registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRegistration {
    /// Key the existing service is registered under.
    pub existing_key: String,
    /// Fully qualified type name of the existing service.
    pub existing_type: &'static str,
}

/// Detects services whose concrete type is already registered, whatever key it
/// was registered under.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicateGuard;

impl DuplicateGuard {
    pub fn new() -> Self {
        Self
    }

    /// First entry of `registered` equivalent to `candidate`, if any.
    pub fn find_equivalent<'a, I>(&self, candidate: &ServiceType, registered: I) -> Option<DuplicateRegistration>
    where
        I: IntoIterator<Item = (&'a str, ServiceType)>,
    {
        registered
            .into_iter()
            .find(|(_, existing)| candidate.is_equivalent(existing))
            .map(|(key, existing)| DuplicateRegistration {
                existing_key: key.to_string(),
                existing_type: existing.name(),
            })
    }

    /// Same as [`find_equivalent`](Self::find_equivalent), logging a warning
    /// when a duplicate is found. Duplicates are never an error.
    pub fn check<'a, I>(&self, candidate: &ServiceType, registered: I) -> Option<DuplicateRegistration>
    where
        I: IntoIterator<Item = (&'a str, ServiceType)>,
    {
        let duplicate = self.find_equivalent(candidate, registered);
        if let Some(existing) = &duplicate {
            log::warn!(
                "{} is already registered as '{}'",
                candidate.simple_name(),
                existing.existing_key
            );
        }
        duplicate
    }
}
