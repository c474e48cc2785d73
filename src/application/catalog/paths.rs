//! Static and generated cycle sets and the per-scan candidate list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::history::PathHistoryStore;
use crate::domain::{
    path::{Path, PathOrigin},
    token::{Token, TokenPolicy},
};

use super::graph::{enumerate_cycles, CycleBounds};
use super::ranking::{rank, top_k_per_group, RankedPath, RankingWeights};

/// Which paths a cycle scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Configured pairs and triangles only.
    #[default]
    Static,
    /// Static paths plus ranked generated cycles.
    Dynamic,
}

/// Catalog tunables.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub mode: ScanMode,
    /// Base token for generated cycles. `None` disables generation.
    pub base: Option<Token>,
    /// Tokens generated cycles may pass through.
    pub universe: Vec<Token>,
    pub bounds: CycleBounds,
    /// Generated cycles kept per (base, hop count).
    pub top_k: usize,
    /// Threshold applied to generated cycles.
    pub dynamic_min_profit_percent: f64,
    pub dynamic_max_slippage_bps: u16,
    pub weights: RankingWeights,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::Static,
            base: None,
            universe: Vec::new(),
            bounds: CycleBounds::default(),
            top_k: 10,
            dynamic_min_profit_percent: 0.5,
            dynamic_max_slippage_bps: 50,
            weights: RankingWeights::default(),
        }
    }
}

/// Static and generated cycles.
pub struct PathCatalog {
    static_paths: Vec<Path>,
    dynamic_paths: Vec<Path>,
    settings: CatalogSettings,
}

impl PathCatalog {
    /// Build the catalog, dropping static paths the token policy forbids and
    /// generating dynamic cycles when the mode calls for them.
    #[must_use]
    pub fn new(static_paths: Vec<Path>, policy: &TokenPolicy, settings: CatalogSettings) -> Self {
        let total = static_paths.len();
        let static_paths: Vec<Path> = static_paths
            .into_iter()
            .filter(|p| {
                let permitted = p.tokens().iter().all(|t| policy.permits(t.mint()));
                if !permitted {
                    debug!(path = %p.key(), "Static path excluded by token policy");
                }
                permitted
            })
            .collect();

        let dynamic_paths = match (&settings.mode, &settings.base) {
            (ScanMode::Dynamic, Some(base)) => generate(base, policy, &settings),
            (ScanMode::Dynamic, None) => {
                warn!("Dynamic scan mode without a base token, only static paths are used");
                Vec::new()
            }
            (ScanMode::Static, _) => Vec::new(),
        };

        info!(
            static_paths = static_paths.len(),
            excluded = total - static_paths.len(),
            dynamic_paths = dynamic_paths.len(),
            mode = ?settings.mode,
            "Path catalog built"
        );
        Self {
            static_paths,
            dynamic_paths,
            settings,
        }
    }

    #[must_use]
    pub fn static_paths(&self) -> &[Path] {
        &self.static_paths
    }

    #[must_use]
    pub fn dynamic_paths(&self) -> &[Path] {
        &self.dynamic_paths
    }

    #[must_use]
    pub const fn mode(&self) -> ScanMode {
        self.settings.mode
    }

    /// Paths to scan this cycle: every static path, then the top-K ranked
    /// generated cycles not already covered by a static path.
    #[must_use]
    pub fn candidates(&self, history: &PathHistoryStore, now: DateTime<Utc>) -> Vec<Path> {
        let mut out = self.static_paths.clone();
        if self.settings.mode == ScanMode::Dynamic {
            out.extend(self.ranked_dynamic(history, now).into_iter().map(|r| r.path));
        }
        out
    }

    /// Every catalog path with its score, for reporting.
    #[must_use]
    pub fn ranked(&self, history: &PathHistoryStore, now: DateTime<Utc>) -> Vec<RankedPath> {
        let mut all = rank(
            self.static_paths.iter().cloned(),
            |key| history.get(key),
            &self.settings.weights,
            now,
        );
        all.extend(self.ranked_dynamic(history, now));
        all
    }

    fn ranked_dynamic(&self, history: &PathHistoryStore, now: DateTime<Utc>) -> Vec<RankedPath> {
        let fresh = self
            .dynamic_paths
            .iter()
            .filter(|p| !self.static_paths.iter().any(|s| s.key() == p.key()))
            .cloned();
        let ranked = rank(fresh, |key| history.get(key), &self.settings.weights, now);
        top_k_per_group(ranked, self.settings.top_k)
    }
}

fn generate(base: &Token, policy: &TokenPolicy, settings: &CatalogSettings) -> Vec<Path> {
    enumerate_cycles(base, &settings.universe, policy, settings.bounds)
        .into_iter()
        .filter_map(|tokens| {
            Path::new(
                tokens,
                settings.dynamic_min_profit_percent,
                settings.dynamic_max_slippage_bps,
                PathOrigin::Dynamic,
            )
            .map_err(|e| warn!(error = %e, "Generated cycle rejected"))
            .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::id::Mint;
    use crate::testkit::domain::{cycle, token};
    use crate::testkit::store::MemoryStore;

    fn dynamic_settings() -> CatalogSettings {
        CatalogSettings {
            mode: ScanMode::Dynamic,
            base: Some(token("USDC")),
            universe: vec![token("USDC"), token("SOL"), token("BONK")],
            top_k: 1,
            ..CatalogSettings::default()
        }
    }

    #[test]
    fn test_static_mode_never_generates() {
        let catalog = PathCatalog::new(
            vec![cycle(&["USDC", "SOL"], 0.5)],
            &TokenPolicy::default(),
            CatalogSettings {
                mode: ScanMode::Static,
                ..dynamic_settings()
            },
        );
        assert!(catalog.dynamic_paths().is_empty());
        assert_eq!(catalog.static_paths().len(), 1);
    }

    #[test]
    fn test_denied_static_paths_are_dropped() {
        let catalog = PathCatalog::new(
            vec![cycle(&["USDC", "SOL"], 0.5), cycle(&["USDC", "BONK"], 0.5)],
            &TokenPolicy::new([], [Mint::from("bonk")]),
            CatalogSettings::default(),
        );
        let keys: Vec<_> = catalog.static_paths().iter().map(|p| p.key().to_string()).collect();
        assert_eq!(keys, vec!["USDC->SOL->USDC"]);
    }

    #[tokio::test]
    async fn test_candidates_dedupe_and_limit_dynamic() {
        let history = PathHistoryStore::new(Arc::new(MemoryStore::new()));
        let catalog = PathCatalog::new(
            vec![cycle(&["USDC", "BONK"], 1.0)],
            &TokenPolicy::default(),
            dynamic_settings(),
        );
        assert_eq!(catalog.dynamic_paths().len(), 4);

        let candidates = catalog.candidates(&history, Utc::now());
        let keys: Vec<_> = candidates.iter().map(|p| p.key().to_string()).collect();
        // Static first; then one 3-hop and one 2-hop generated cycle, the
        // 2-hop USDC->BONK->USDC being covered by the static path.
        assert_eq!(
            keys,
            vec!["USDC->BONK->USDC", "USDC->BONK->SOL->USDC", "USDC->SOL->USDC"]
        );
        assert_eq!(candidates[0].min_profit_percent(), 1.0);
        assert_eq!(candidates[2].origin(), PathOrigin::Dynamic);
    }
}
