//! Plain-text frames for the terminal.

use remote_blackjack::{
    GameView, Phase, Tokens,
    game::{PlayerData, outcome_label},
};
use std::fmt::Write;

/// Formats a token amount with thousands separators.
///
/// # Examples
///
/// ```
/// use rb_client::render::format_tokens;
///
/// assert_eq!(format_tokens(1234567), "1,234,567");
/// assert_eq!(format_tokens(-950), "-950");
/// ```
#[must_use]
pub fn format_tokens(amount: Tokens) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn hand_line(label: &str, hand: &[String], sum: i64) -> String {
    if hand.is_empty() {
        return format!("{label}: -");
    }
    format!("{label}: {} ({sum})", hand.join(" "))
}

fn player_line(label: &str, player: &PlayerData) -> String {
    let mut line = hand_line(label, &player.hand, player.sum);
    if player.bet > 0 {
        let _ = write!(line, " bet {}", format_tokens(player.bet));
    }
    let state = outcome_label(player.hand_state);
    if !state.is_empty() {
        let _ = write!(line, " [{state}]");
    }
    line
}

fn prompt(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::RecoveryDecision => Some("A round was interrupted: 'continue' or 'new'"),
        Phase::Betting => Some("Place your bet: 'bet N', 'retake', 'deal'"),
        Phase::MainTurn => Some("Your move: 'hit', 'stand', 'double', 'insure', 'split'"),
        Phase::SplitTurn => Some("Split hand: 'hit', 'stand', 'double'"),
        _ => None,
    }
}

fn status(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Loading => Some("Connecting..."),
        Phase::Shuffling => Some("Shuffling..."),
        Phase::OutOfTokens => Some("You are out of tokens."),
        Phase::RestartGame => Some("Restarting the game..."),
        Phase::Reloading => Some("Reloading..."),
        Phase::Error => Some("Something went wrong. Restarting..."),
        _ => None,
    }
}

/// Renders the current view as a multi-line frame.
#[must_use]
pub fn render_view(view: &GameView) -> String {
    let state = &view.state;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "=== {} === bank {} | bet {} | deck {}/{}",
        state.phase,
        format_tokens(state.tokens),
        format_tokens(state.bet),
        state.deck_len,
        view.init_deck_len
    );

    if let Some(status) = status(state.phase) {
        let _ = writeln!(out, "{status}");
    }

    let dealer_revealed = !state.dealer_unmasked.hand.is_empty();
    if dealer_revealed {
        let _ = writeln!(
            out,
            "{}",
            hand_line("Dealer", &state.dealer_unmasked.hand, state.dealer_unmasked.sum)
        );
    } else if !state.dealer_masked.hand.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            hand_line("Dealer", &state.dealer_masked.hand, state.dealer_masked.sum)
        );
    }

    if !state.player.hand.is_empty() {
        let _ = writeln!(out, "{}", player_line("You", &state.player));
    }
    for hand in &state.players {
        let _ = writeln!(out, "{}", player_line(&format!("  {}", hand.id), hand));
    }

    if view.ins_placed {
        let _ = writeln!(out, "Insurance placed");
    }
    if view.show_ins_lost {
        let _ = writeln!(out, "Insurance lost");
    }

    let winner = outcome_label(state.winner);
    if !winner.is_empty() {
        let _ = writeln!(out, "Result: {winner}");
    }

    if let Some(snapshot) = &view.pre_reward {
        let _ = writeln!(
            out,
            "Bet {} -> {} | bank {} -> {}",
            format_tokens(snapshot.bet),
            format_tokens(state.player.bet),
            format_tokens(snapshot.tokens),
            format_tokens(state.tokens)
        );
    }

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {notice}");
    }

    if view.waiting {
        let _ = writeln!(out, "...");
    } else if let Some(prompt) = prompt(state.phase) {
        let _ = write!(out, "{prompt}\n> ");
    }

    out
}
