//! Campus hierarchy configuration
//!
//! A hub campus implicitly covers a fixed set of satellite campuses. The
//! table below is deployment configuration, not logic: operators extend it
//! without touching the resolvers that consume it.

use crate::access::office_key::normalize;
use crate::models::Role;
use std::collections::{HashMap, HashSet};

/// Campus strings that grant unrestricted visibility regardless of role.
const UNRESTRICTED_MARKERS: &[&str] = &["main campus", "all campuses"];

/// Hub campus -> satellites (the hub itself included).
const DEFAULT_HUBS: &[(&str, &[&str])] = &[
    (
        "Pablo Borbon",
        &["Pablo Borbon", "Rosario", "San Juan", "Lemery"],
    ),
    ("Alangilan", &["Alangilan", "Lobo", "Balayan", "Mabini"]),
];

/// The campus set an actor may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampusAccess {
    /// No campus filtering at all.
    All,
    /// Restricted to this set (normalized campus names). Empty means
    /// no access.
    Campuses(HashSet<String>),
}

impl CampusAccess {
    pub fn contains(&self, campus: &str) -> bool {
        match self {
            CampusAccess::All => true,
            CampusAccess::Campuses(set) => set.contains(&normalize(campus)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CampusHierarchy {
    /// Normalized hub name -> normalized satellite set.
    hubs: HashMap<String, HashSet<String>>,
}

impl CampusHierarchy {
    pub fn new(hubs: &[(&str, &[&str])]) -> Self {
        let hubs = hubs
            .iter()
            .map(|(hub, satellites)| {
                (
                    normalize(hub),
                    satellites.iter().map(|s| normalize(s)).collect(),
                )
            })
            .collect();
        Self { hubs }
    }

    /// The hierarchy shipped with this deployment.
    pub fn default_deployment() -> Self {
        Self::new(DEFAULT_HUBS)
    }

    /// Resolve the campuses an actor with this campus and role may see.
    ///
    /// Super admins and the unrestricted campus markers see everything.
    /// A hub campus sees its full satellite set; anything else sees only
    /// itself. A missing campus grants no access.
    pub fn accessible_campuses(&self, campus: Option<&str>, role: Role) -> CampusAccess {
        if role == Role::SuperAdmin {
            return CampusAccess::All;
        }
        let campus = match campus {
            Some(c) if !c.trim().is_empty() => normalize(c),
            _ => return CampusAccess::Campuses(HashSet::new()),
        };
        if UNRESTRICTED_MARKERS.contains(&campus.as_str()) {
            return CampusAccess::All;
        }
        if let Some(satellites) = self.hubs.get(&campus) {
            return CampusAccess::Campuses(satellites.clone());
        }
        CampusAccess::Campuses(HashSet::from([campus]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_covers_its_satellites() {
        let h = CampusHierarchy::default_deployment();
        let access = h.accessible_campuses(Some("Pablo Borbon"), Role::Admin);
        for c in ["Pablo Borbon", "Rosario", "San Juan", "Lemery"] {
            assert!(access.contains(c), "hub should cover {}", c);
        }
        assert!(!access.contains("Alangilan"));
    }

    #[test]
    fn solo_campus_sees_only_itself() {
        let h = CampusHierarchy::default_deployment();
        let access = h.accessible_campuses(Some("Nasugbu"), Role::Admin);
        assert!(access.contains("Nasugbu"));
        assert!(access.contains("nasugbu"));
        assert!(!access.contains("Lipa"));
    }

    #[test]
    fn super_admin_is_unrestricted() {
        let h = CampusHierarchy::default_deployment();
        assert_eq!(
            h.accessible_campuses(Some("Lipa"), Role::SuperAdmin),
            CampusAccess::All
        );
        assert_eq!(h.accessible_campuses(None, Role::SuperAdmin), CampusAccess::All);
    }

    #[test]
    fn unrestricted_markers_grant_everything() {
        let h = CampusHierarchy::default_deployment();
        assert_eq!(
            h.accessible_campuses(Some("Main Campus"), Role::User),
            CampusAccess::All
        );
        assert_eq!(
            h.accessible_campuses(Some("ALL CAMPUSES"), Role::Admin),
            CampusAccess::All
        );
    }

    #[test]
    fn missing_campus_means_no_access() {
        let h = CampusHierarchy::default_deployment();
        let access = h.accessible_campuses(None, Role::Admin);
        assert_eq!(access, CampusAccess::Campuses(Default::default()));
        assert!(!access.contains("Lipa"));

        let blank = h.accessible_campuses(Some("   "), Role::User);
        assert!(!blank.contains("Lipa"));
    }

    #[test]
    fn satellite_is_not_a_hub() {
        let h = CampusHierarchy::default_deployment();
        let access = h.accessible_campuses(Some("Rosario"), Role::Admin);
        assert!(access.contains("Rosario"));
        assert!(!access.contains("Pablo Borbon"));
    }
}
