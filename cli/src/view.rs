use mines_core::{PayoutStatus, RoundSnapshot, RoundState, TileKind};
use mines_protocol::{CellView, PayoutView, Phase, RoundView};
use std::fmt::Write;

pub fn phase(state: RoundState) -> Phase {
    match state {
        RoundState::Waiting => Phase::Waiting,
        RoundState::Playing => Phase::Playing,
        RoundState::Won => Phase::Won,
        RoundState::Lost => Phase::Lost,
    }
}

pub fn payout_view(status: &PayoutStatus) -> PayoutView {
    match status {
        PayoutStatus::NotDue => PayoutView::NotDue,
        PayoutStatus::Due => PayoutView::Due,
        PayoutStatus::Pending => PayoutView::Pending,
        PayoutStatus::Paid(receipt) => PayoutView::Paid {
            tx_id: receipt.tx_id.clone(),
        },
        PayoutStatus::Unresolved(err) => PayoutView::Unresolved {
            reason: err.to_string(),
        },
    }
}

/// Player-safe view of the round: unrevealed tiles stay `Hidden` whatever they hold.
pub fn round_view(snapshot: &RoundSnapshot, payout: &PayoutStatus) -> RoundView {
    let board = &snapshot.board;
    let size = board.grid_size();
    let cells = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| {
                    let tile = board[(row, col)];
                    match (tile.is_revealed(), tile.kind()) {
                        (false, _) => CellView::Hidden,
                        (true, TileKind::Gem) => CellView::Gem,
                        (true, TileKind::Mine) => CellView::Mine,
                    }
                })
                .collect()
        })
        .collect();

    RoundView {
        phase: phase(snapshot.state),
        grid_size: size,
        mine_count: snapshot.config.mine_count,
        cells,
        multiplier: snapshot.multiplier,
        stake: snapshot.stake,
        potential_reward: snapshot.potential_reward,
        seed_hash: snapshot.seed_hash.clone(),
        success_rate: snapshot.config.success_rate(),
        payout: payout_view(payout),
    }
}

fn status_line(phase: Phase) -> &'static str {
    match phase {
        Phase::Waiting => "Place a stake to start",
        Phase::Playing => "Game in progress - find the gems!",
        Phase::Won => "You won!",
        Phase::Lost => "You hit a mine! Game over.",
    }
}

/// Plain-text board for terminals. `#` hidden, `*` gem, `X` mine.
pub fn render(view: &RoundView) -> String {
    let mut out = String::new();
    out.push_str("   ");
    for col in 0..view.grid_size {
        let _ = write!(out, "{col:>2}");
    }
    out.push('\n');

    for (row, cells) in view.cells.iter().enumerate() {
        let _ = write!(out, "{row:>2} ");
        for cell in cells {
            let glyph = match cell {
                CellView::Hidden => '#',
                CellView::Gem => '*',
                CellView::Mine => 'X',
            };
            let _ = write!(out, " {glyph}");
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Bet {:.2} | Multiplier {:.2}x | Potential win {:.2} | Success rate {:.1}%",
        view.stake,
        view.multiplier,
        view.potential_reward,
        view.success_rate * 100.0
    );
    let _ = writeln!(out, "{}", status_line(view.phase));
    let _ = write!(out, "Provably fair hash: {}", view.seed_hash);
    out
}
