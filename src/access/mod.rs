//! Access & assignment resolution core: campus hierarchy, office-key
//! matching, and campus scoping.

pub mod guard;
pub mod hierarchy;
pub mod office_key;

pub use guard::{AccessGuard, CampusFilter};
pub use hierarchy::{CampusAccess, CampusHierarchy};
pub use office_key::{is_match, normalize, office_campus_combo};
