//! Messages exchanged between a round and whatever presents it.
//!
//! Views never carry the contents of hidden tiles, so a renderer cannot leak the layout before the round discloses it.

use serde::{Deserialize, Serialize};

/// Player intent, one per UI event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    NewGame,
    ChangeConfig { grid_size: u8, mine_count: u16 },
    SetStake { amount: f64 },
    Stake { amount: f64 },
    Click { row: u8, col: u8 },
    CashOut,
    RetryPayout,
}

impl Command {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Playing,
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellView {
    Hidden,
    Gem,
    Mine,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoutView {
    NotDue,
    Due,
    Pending,
    Paid { tx_id: String },
    Unresolved { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub phase: Phase,
    pub grid_size: u8,
    pub mine_count: u16,
    /// Row-major cells, `cells[row][col]`.
    pub cells: Vec<Vec<CellView>>,
    pub multiplier: f64,
    pub stake: f64,
    pub potential_reward: f64,
    pub seed_hash: String,
    pub success_rate: f64,
    pub payout: PayoutView,
}

impl RoundView {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn hidden_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == CellView::Hidden)
            .count()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Failure,
}

/// A discrete, non-blocking message for the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_are_tagged_by_type() {
        let click = Command::from_json(r#"{"type":"click","row":2,"col":4}"#).unwrap();
        assert_eq!(click, Command::Click { row: 2, col: 4 });

        let value = serde_json::to_value(Command::CashOut).unwrap();
        assert_eq!(value, json!({"type": "cash_out"}));
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(Command::from_json(r#"{"type":"peek"}"#).is_err());
    }

    #[test]
    fn view_serializes_hidden_cells_without_contents() {
        let view = RoundView {
            phase: Phase::Playing,
            grid_size: 2,
            mine_count: 1,
            cells: vec![
                vec![CellView::Gem, CellView::Hidden],
                vec![CellView::Hidden, CellView::Hidden],
            ],
            multiplier: 1.0,
            stake: 1.0,
            potential_reward: 1.0,
            seed_hash: "seed".into(),
            success_rate: 0.75,
            payout: PayoutView::NotDue,
        };

        let value: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(value["cells"], json!([["gem", "hidden"], ["hidden", "hidden"]]));
        assert_eq!(value["phase"], json!("playing"));
        assert_eq!(value["payout"], json!({"status": "not_due"}));
        assert_eq!(view.hidden_count(), 3);
    }

    #[test]
    fn notice_levels() {
        let notice = Notice::failure("You hit a mine! Game over.");
        assert_eq!(notice.level, NoticeLevel::Failure);
        assert_eq!(
            notice.to_json().unwrap(),
            r#"{"level":"failure","message":"You hit a mine! Game over."}"#
        );
    }
}
