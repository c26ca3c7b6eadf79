//! Search scope and the scope-aware DN intersection predicate.

use crate::dn::DistinguishedName;

/// Selector over the portion of the namespace a scoped entry denotes,
/// mirroring LDAP's three search scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScope {
    /// The DN itself, nothing else.
    Object,
    /// The immediate children of the DN, not the DN itself.
    OneLevel,
    /// The DN and all of its descendants.
    Subtree,
}

/// Do the point-sets denoted by `(dn_l, scope_l)` and `(dn_r, scope_r)`
/// intersect?
///
/// This is the symmetric match table from the data model: two scoped
/// entries are in potential conflict iff the regions of the namespace they
/// each denote overlap.
pub fn scopes_match(
    dn_l: &DistinguishedName,
    scope_l: SearchScope,
    dn_r: &DistinguishedName,
    scope_r: SearchScope,
) -> bool {
    use SearchScope::*;
    match (scope_l, scope_r) {
        (Object, Object) => dn_l == dn_r,
        (Object, OneLevel) => dn_r.is_immediate_parent_of(dn_l),
        (OneLevel, Object) => dn_l.is_immediate_parent_of(dn_r),
        (Object, Subtree) => dn_r.is_ancestor_or_equal_of(dn_l),
        (Subtree, Object) => dn_l.is_ancestor_or_equal_of(dn_r),
        (OneLevel, OneLevel) => {
            dn_l == dn_r
                || dn_l.is_immediate_parent_of(dn_r)
                || dn_r.is_immediate_parent_of(dn_l)
        }
        (OneLevel, Subtree) => {
            dn_r.is_ancestor_or_equal_of(dn_l) || dn_l.is_immediate_parent_of(dn_r)
        }
        (Subtree, OneLevel) => {
            dn_l.is_ancestor_or_equal_of(dn_r) || dn_r.is_immediate_parent_of(dn_l)
        }
        (Subtree, Subtree) => {
            dn_l.is_ancestor_or_equal_of(dn_r) || dn_r.is_ancestor_or_equal_of(dn_l)
        }
    }
}
