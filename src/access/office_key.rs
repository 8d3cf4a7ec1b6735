//! Office-key normalization and matching
//!
//! `assigned_office` values accumulated over time in two shapes: a bare
//! office name ("RGO") or an office+campus combination ("RGO Lipa"). Both
//! must keep matching, and every endpoint must go through this one
//! predicate instead of inlining its own comparison.

/// Canonical form used for all office/campus comparisons.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn campus_present(campus: Option<&str>) -> bool {
    campus.map(|c| !c.trim().is_empty()).unwrap_or(false)
}

/// The canonical office key for an office acting within a campus:
/// "office campus" when a campus is present, else the bare office name.
pub fn office_campus_combo(office: &str, campus: Option<&str>) -> String {
    match campus {
        Some(c) if !c.trim().is_empty() => normalize(&format!("{} {}", office.trim(), c.trim())),
        _ => normalize(office),
    }
}

/// Does an assignment's stored office field refer to this (office, campus)?
///
/// A bare-office assignment is campus-agnostic: it matches the office on
/// any campus. This permissiveness is intended, not a defect.
pub fn is_match(assigned_office: &str, office: &str, campus: Option<&str>) -> bool {
    let assigned = normalize(assigned_office);
    if assigned == office_campus_combo(office, campus) {
        return true;
    }
    assigned == normalize(office) && campus_present(campus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  RGO Lipa  "), "rgo lipa");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn combo_includes_campus_when_present() {
        assert_eq!(office_campus_combo("RGO", Some("Lipa")), "rgo lipa");
        assert_eq!(office_campus_combo("RGO", Some("  ")), "rgo");
        assert_eq!(office_campus_combo("RGO", None), "rgo");
    }

    #[test]
    fn matches_office_campus_combination() {
        assert!(is_match("RGO Lipa", "RGO", Some("Lipa")));
        assert!(is_match("rgo lipa", "rgo", Some("LIPA")));
        // Internal spacing is preserved by normalize, so it must agree.
        assert!(!is_match("rgo   lipa", "RGO", Some("Lipa")));
    }

    #[test]
    fn bare_office_assignment_is_campus_agnostic() {
        assert!(is_match("RGO", "RGO", Some("Lipa")));
        assert!(is_match("RGO", "RGO", Some("Nasugbu")));
    }

    #[test]
    fn bare_office_requires_a_campus_on_the_user() {
        // Without a campus the only valid match is the bare name itself,
        // which the combo branch already covers.
        assert!(is_match("RGO", "RGO", None));
        assert!(!is_match("RGO Lipa", "RGO", None));
    }

    #[test]
    fn different_office_never_matches() {
        assert!(!is_match("EMU Lipa", "RGO", Some("Lipa")));
        assert!(!is_match("EMU", "RGO", Some("Lipa")));
    }
}
