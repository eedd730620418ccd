//! Content equivalence between controls and part trees.
//!
//! Part ids are not compared: readers of the per-control layout mint their own
//! ids, so only names, trimmed prose, and nesting must agree.

use crate::catalog::model::{Control, Part};

pub fn part_equivalent(a: &Part, b: &Part) -> bool {
    if a.name != b.name {
        return false;
    }
    match (&a.prose, &b.prose) {
        (Some(left), Some(right)) if left.trim() != right.trim() => return false,
        (Some(_), None) | (None, Some(_)) => return false,
        _ => {}
    }
    parts_equivalent(&a.parts, &b.parts)
}

pub fn parts_equivalent(a: &[Part], b: &[Part]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(left, right)| part_equivalent(left, right))
}

/// Compare id, title, and parts of two controls.
///
/// Sub-controls are not compared. The per-control layout does not record
/// which controls a control contains, so a round trip through it cannot be
/// expected to agree on them.
pub fn controls_equivalent(a: &Control, b: &Control) -> bool {
    a.id == b.id && a.title == b.title && parts_equivalent(&a.parts, &b.parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(prose: &str, items: Vec<Part>) -> Part {
        let mut part = Part::new("statement", Some("ac-1_smt"), Some(prose));
        part.parts = items;
        part
    }

    #[test]
    fn prose_compares_after_trimming_and_ignores_ids() {
        let a = statement("  Do the thing.\n", vec![Part::new("item", Some("x"), Some("a"))]);
        let b = statement("Do the thing.", vec![Part::new("item", Some("y"), Some(" a "))]);
        assert!(part_equivalent(&a, &b));
    }

    #[test]
    fn missing_prose_or_sub_part_breaks_equivalence() {
        let a = statement("text", vec![]);
        let mut b = a.clone();
        b.prose = None;
        assert!(!part_equivalent(&a, &b));

        let c = statement("text", vec![Part::new("item", None, None)]);
        assert!(!part_equivalent(&a, &c));

        let mut d = a.clone();
        d.name = "guidance".to_string();
        assert!(!part_equivalent(&a, &d));
    }

    #[test]
    fn sub_controls_are_not_compared() {
        let mut a = Control::new("ac-2", "Account Management");
        a.parts = vec![statement("x", vec![])];
        let mut b = a.clone();
        b.controls = vec![Control::new("ac-2.1", "Automated")];
        assert!(controls_equivalent(&a, &b));

        b.title = "Accounts".to_string();
        assert!(!controls_equivalent(&a, &b));
    }
}
