use anyhow::Context;
use mines_core::{Account, GameConfig, MemoryLedger, SettlementConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Defaults read from an optional TOML file; command-line flags win over it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub grid_size: u8,
    pub mine_count: u16,
    pub stake: f64,
    pub player: String,
    pub house: String,
    pub player_balance: f64,
    pub house_balance: f64,
    pub ledger_timeout_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            grid_size: game.grid_size,
            mine_count: game.mine_count,
            stake: 1.0,
            player: "player".to_string(),
            house: "house".to_string(),
            player_balance: 100.0,
            house_balance: 10_000.0,
            ledger_timeout_ms: SettlementConfig::DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn game_config(&self) -> mines_core::Result<GameConfig> {
        GameConfig::new(self.grid_size, self.mine_count)
    }

    pub fn player_account(&self) -> Account {
        Account::new(&self.player)
    }

    pub fn settlement_config(&self) -> SettlementConfig {
        SettlementConfig::new(Account::new(&self.house))
            .with_timeout(Duration::from_millis(self.ledger_timeout_ms))
    }

    /// Toy ledger funded with the configured balances.
    pub fn ledger(&self) -> MemoryLedger {
        MemoryLedger::with_balances([
            (self.player_account(), self.player_balance),
            (Account::new(&self.house), self.house_balance),
        ])
    }
}
