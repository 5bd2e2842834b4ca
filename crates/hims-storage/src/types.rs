//! Query parameter types shared by the store traits.

use hims_core::{BedStatus, PatientStatus, StaffRole};
use serde::{Deserialize, Serialize};

/// Default page size for list operations.
pub const DEFAULT_LIMIT: i64 = 50;
/// Upper bound applied to any requested page size.
pub const MAX_LIMIT: i64 = 500;

/// Paging window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Builds a page, clamping the limit to `1..=MAX_LIMIT` and the offset to `>= 0`.
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Applies this window to an already filtered, ordered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFilter {
    #[serde(default)]
    pub status: Option<PatientStatus>,
    /// Case-insensitive substring of first or last name.
    #[serde(default)]
    pub name: Option<String>,
}

impl PatientFilter {
    pub fn matches(&self, patient: &hims_core::Patient) -> bool {
        if let Some(status) = self.status
            && patient.status != status
        {
            return false;
        }
        if let Some(ref name) = self.name {
            let needle = name.to_lowercase();
            if !patient.first_name.to_lowercase().contains(&needle)
                && !patient.last_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedFilter {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub status: Option<BedStatus>,
    /// Only active beds in `available` state.
    #[serde(default)]
    pub available_only: bool,
}

impl BedFilter {
    pub fn matches(&self, bed: &hims_core::Bed) -> bool {
        if let Some(ref service) = self.service
            && !bed.service.eq_ignore_ascii_case(service)
        {
            return false;
        }
        if let Some(status) = self.status
            && bed.status != status
        {
            return false;
        }
        !self.available_only || bed.is_available()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffFilter {
    #[serde(default)]
    pub role: Option<StaffRole>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl StaffFilter {
    pub fn matches(&self, staff: &hims_core::Staff) -> bool {
        self.role.is_none_or(|r| staff.role == r) && self.active.is_none_or(|a| staff.active == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        assert_eq!(Page::new(None, None), Page::default());
        assert_eq!(Page::new(Some(10_000), Some(-3)).limit, MAX_LIMIT);
        assert_eq!(Page::new(Some(0), Some(-3)).offset, 0);
        assert_eq!(Page::new(Some(0), None).limit, 1);
    }

    #[test]
    fn test_page_apply() {
        let page = Page::new(Some(2), Some(1));
        assert_eq!(page.apply(1..=5), vec![2, 3]);
    }
}
