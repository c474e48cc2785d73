//! Cycle enumeration over the token graph.
//!
//! The graph is complete over the permitted token universe: any permitted
//! token can be swapped into any other. Cycles start and end at the base
//! token and never revisit an intermediate token.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::token::{Token, TokenPolicy};

/// Bounds for cycle generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    pub min_hops: usize,
    pub max_hops: usize,
    /// Stop after this many cycles.
    pub limit: usize,
}

impl Default for CycleBounds {
    fn default() -> Self {
        Self {
            min_hops: 2,
            max_hops: 3,
            limit: 5_000,
        }
    }
}

/// Enumerate closed token sequences `base -> .. -> base`.
///
/// Output order is deterministic: depth-first over intermediates sorted by
/// symbol. Tokens the policy does not permit are never visited; a base the
/// policy does not permit yields nothing.
#[must_use]
pub fn enumerate_cycles(
    base: &Token,
    universe: &[Token],
    policy: &TokenPolicy,
    bounds: CycleBounds,
) -> Vec<Vec<Token>> {
    if !policy.permits(base.mint()) || bounds.max_hops < 2 {
        return Vec::new();
    }

    // Dedupe by mint, order by symbol.
    let mut nodes: Vec<Token> = universe
        .iter()
        .filter(|t| t.mint() != base.mint() && policy.permits(t.mint()))
        .map(|t| (t.mint().clone(), t.clone()))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect();
    nodes.sort_by(|a, b| a.symbol().cmp(b.symbol()).then_with(|| a.mint().cmp(b.mint())));

    let mut out = Vec::new();
    let mut stack = vec![base.clone()];
    let mut visited = vec![false; nodes.len()];
    walk(base, &nodes, bounds, &mut stack, &mut visited, &mut out);

    if out.len() >= bounds.limit {
        warn!(
            base = %base.symbol(),
            limit = bounds.limit,
            "Cycle generation hit its limit, remaining cycles dropped"
        );
    }
    out
}

fn walk(
    base: &Token,
    nodes: &[Token],
    bounds: CycleBounds,
    stack: &mut Vec<Token>,
    visited: &mut [bool],
    out: &mut Vec<Vec<Token>>,
) {
    // Closing the cycle now adds one hop.
    let hops_if_closed = stack.len();
    if hops_if_closed >= bounds.min_hops.max(2) && hops_if_closed <= bounds.max_hops {
        let mut cycle = stack.clone();
        cycle.push(base.clone());
        out.push(cycle);
    }
    if hops_if_closed >= bounds.max_hops {
        return;
    }

    for (i, node) in nodes.iter().enumerate() {
        if out.len() >= bounds.limit {
            return;
        }
        if visited[i] {
            continue;
        }
        visited[i] = true;
        stack.push(node.clone());
        walk(base, nodes, bounds, stack, visited, out);
        stack.pop();
        visited[i] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::Mint;
    use crate::testkit::domain::token;

    fn symbols(cycles: &[Vec<Token>]) -> Vec<String> {
        cycles
            .iter()
            .map(|c| c.iter().map(Token::symbol).collect::<Vec<_>>().join(">"))
            .collect()
    }

    #[test]
    fn test_two_and_three_hop_cycles() {
        let universe = vec![token("USDC"), token("SOL"), token("BONK")];
        let cycles = enumerate_cycles(
            &token("USDC"),
            &universe,
            &TokenPolicy::default(),
            CycleBounds::default(),
        );
        assert_eq!(
            symbols(&cycles),
            vec![
                "USDC>BONK>USDC",
                "USDC>BONK>SOL>USDC",
                "USDC>SOL>USDC",
                "USDC>SOL>BONK>USDC",
            ]
        );
    }

    #[test]
    fn test_denied_tokens_are_skipped() {
        let universe = vec![token("USDC"), token("SOL"), token("BONK")];
        let policy = TokenPolicy::new([], [Mint::from("bonk")]);
        let cycles = enumerate_cycles(&token("USDC"), &universe, &policy, CycleBounds::default());
        assert_eq!(symbols(&cycles), vec!["USDC>SOL>USDC"]);
    }

    #[test]
    fn test_allowlist_restricts_universe() {
        let universe = vec![token("USDC"), token("SOL"), token("BONK"), token("JUP")];
        let policy = TokenPolicy::new([Mint::from("usdc"), Mint::from("jup")], []);
        let cycles = enumerate_cycles(&token("USDC"), &universe, &policy, CycleBounds::default());
        assert_eq!(symbols(&cycles), vec!["USDC>JUP>USDC"]);
    }

    #[test]
    fn test_denied_base_yields_nothing() {
        let universe = vec![token("USDC"), token("SOL")];
        let policy = TokenPolicy::new([], [Mint::from("usdc")]);
        let cycles = enumerate_cycles(&token("USDC"), &universe, &policy, CycleBounds::default());
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_limit_caps_output() {
        let universe: Vec<_> = ["A", "B", "C", "D", "E", "F"].iter().map(|s| token(s)).collect();
        let bounds = CycleBounds {
            min_hops: 2,
            max_hops: 4,
            limit: 7,
        };
        let cycles = enumerate_cycles(&token("USDC"), &universe, &TokenPolicy::default(), bounds);
        assert_eq!(cycles.len(), 7);
    }

    #[test]
    fn test_no_intermediate_repeats() {
        let universe: Vec<_> = ["A", "B", "C"].iter().map(|s| token(s)).collect();
        let bounds = CycleBounds {
            min_hops: 2,
            max_hops: 4,
            limit: 1_000,
        };
        for cycle in enumerate_cycles(&token("USDC"), &universe, &TokenPolicy::default(), bounds) {
            let inner = &cycle[1..cycle.len() - 1];
            let mut mints: Vec<_> = inner.iter().map(Token::mint).collect();
            mints.sort();
            mints.dedup();
            assert_eq!(mints.len(), inner.len());
        }
    }
}
