use std::collections::{HashMap, HashSet};

use crate::models::{DeclaredDependency, Reconciliation, UsageReference};

/// The single source of truth for "same package" comparisons. Applied
/// identically to declared names and usage references on both sides of the
/// reconciliation. Idempotent.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Compare the declared list against the used references.
///
/// `unused` holds every declared entry whose canonical name never appears
/// in a usage reference, in original declaration order; when the same name
/// is declared in multiple blocks only the first occurrence is considered.
/// `missing` holds every usage reference whose canonical name is not
/// declared, per reference; the same missing package appears once per
/// usage location. Peer-inferred references are exempt from the missing
/// classification: they still mark their package as used, but an
/// undeclared peer is installed implicitly and needs no declaration.
pub fn reconcile(declared: &[DeclaredDependency], used: &[UsageReference]) -> Reconciliation {
    let mut declared_map: HashMap<String, &DeclaredDependency> = HashMap::new();
    let mut declaration_order: Vec<String> = Vec::new();
    for dep in declared {
        let canon = canonical_name(&dep.name);
        if !declared_map.contains_key(&canon) {
            declared_map.insert(canon.clone(), dep);
            declaration_order.push(canon);
        }
    }

    let used_set: HashSet<String> = used
        .iter()
        .map(|r| canonical_name(&r.package_name))
        .collect();

    let unused: Vec<DeclaredDependency> = declaration_order
        .iter()
        .filter(|canon| !used_set.contains(*canon))
        .map(|canon| declared_map[canon].clone())
        .collect();

    let missing: Vec<UsageReference> = used
        .iter()
        .filter(|r| !declared_map.contains_key(&canonical_name(&r.package_name)))
        .filter(|r| !r.is_inferred_peer())
        .cloned()
        .collect();

    Reconciliation {
        total: declared.len(),
        used_count: used.len(),
        unused,
        missing,
    }
}
