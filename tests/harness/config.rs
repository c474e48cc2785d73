use std::fs;
use std::path::{Path, PathBuf};

/// USDC/SOL/BONK with one static pair, state kept under `state_dir`.
pub fn engine_toml(state_dir: &Path) -> String {
    format!(
        r#"
dry_run = true

[[tokens]]
symbol = "USDC"
mint = "usdc"
decimals = 6

[[tokens]]
symbol = "SOL"
mint = "sol"
decimals = 6

[[tokens]]
symbol = "BONK"
mint = "bonk"
decimals = 6

[[paths]]
tokens = ["USDC", "SOL"]
min_profit_percent = 0.5

[[wallets]]
id = "w1"
address = "addr-w1"

[quote]
min_spacing_ms = 0

[catalog]
base = "USDC"

[storage]
dir = "{}"
"#,
        state_dir.display()
    )
}

pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}
