use std::collections::BTreeSet;

use proptest::prelude::*;
use revlang_ir::Module;

/// Reference reachability over an adjacency list.
fn reachable(edges: &[(usize, usize)], entry: usize) -> BTreeSet<usize> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![entry];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        stack.extend(
            edges
                .iter()
                .filter(|(from, _)| *from == node)
                .map(|(_, to)| *to),
        );
    }
    seen
}

fn graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        let edge = (0..n, 0..n);
        (Just(n), prop::collection::vec(edge, 0..(n * 3)))
    })
}

proptest! {
    #[test]
    fn valid_iff_every_block_is_reachable((n, edges) in graph(), entry_set in any::<bool>()) {
        let mut module = Module::new("prop");
        let f = module.make_func("f");
        let blocks: Vec<_> = (0..n)
            .map(|i| module.make_block(f, &format!("bb.{i}"), i == 0 && entry_set))
            .collect();
        for (i, (from, to)) in edges.iter().enumerate() {
            module.add_succ(blocks[*from], &format!("e{i}"), blocks[*to]);
        }

        let expected = entry_set && reachable(&edges, 0).len() == n;
        prop_assert_eq!(module.is_valid(f), expected);
    }

    #[test]
    fn unreachable_block_is_never_valid((n, edges) in graph()) {
        let mut module = Module::new("prop");
        let f = module.make_func("f");
        let blocks: Vec<_> = (0..n)
            .map(|i| module.make_block(f, &format!("bb.{i}"), i == 0))
            .collect();
        for (i, (from, to)) in edges.iter().enumerate() {
            module.add_succ(blocks[*from], &format!("e{i}"), blocks[*to]);
        }

        // A block that only points at others, and at itself, is unreachable.
        let orphan = module.make_block(f, "orphan", false);
        module.add_succ(orphan, "self", orphan);
        module.add_succ(orphan, "out", blocks[0]);
        prop_assert!(!module.is_valid(f));
    }
}
