//! Relation table: typed relations and their inverses
//!
//! Each pair is listed once; lookups check both columns, so the table is
//! symmetric and closed without having to spell out both directions.
//! Relations missing from the table are one-directional (informational
//! tags such as `aka` or `founded`).

/// The hierarchy relation. Edges of this type form the acyclic is-a subgraph.
pub const IS_A: &str = "is_a";

/// Inverse of [`IS_A`].
pub const HAS_INSTANCE: &str = "has_instance";

const INVERSE_PAIRS: &[(&str, &str)] = &[
    (IS_A, HAS_INSTANCE),
    ("part_of", "has_part"),
    ("located_in", "location_of"),
    ("created_by", "creator_of"),
    ("precedes", "follows"),
    ("causes", "caused_by"),
    ("enables", "enabled_by"),
    ("regulates", "regulated_by"),
    ("offers", "offered_by"),
];

/// Look up the inverse of a relation type.
///
/// Returns `None` for relation types without a declared inverse.
pub fn inverse_of(relation: &str) -> Option<&'static str> {
    INVERSE_PAIRS.iter().find_map(|&(forward, backward)| {
        if forward == relation {
            Some(backward)
        } else if backward == relation {
            Some(forward)
        } else {
            None
        }
    })
}

/// All relation types that have a declared inverse.
pub fn known_relations() -> impl Iterator<Item = &'static str> {
    INVERSE_PAIRS
        .iter()
        .flat_map(|&(forward, backward)| [forward, backward])
}

/// Whether inserting `relation` implies an is-a edge in one direction or the other.
///
/// Returns the `(child, parent)` orientation of that implied is-a edge.
pub fn hierarchy_orientation<'a>(
    source: &'a str,
    relation: &str,
    target: &'a str,
) -> Option<(&'a str, &'a str)> {
    if relation == IS_A {
        Some((source, target))
    } else if relation == HAS_INSTANCE {
        Some((target, source))
    } else {
        None
    }
}
