//! Server endpoints consumed by the client.

use std::fmt;

/// One game server endpoint. All of them are `POST /api/<name>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Endpoint {
    InitializeSession,
    Bet,
    RetakeBet,
    CreateDeck,
    StartGame,
    Hit,
    Rewards,
    DoubleRequest,
    InsRequest,
    StandAndRewards,
    SplitRequest,
    SplitHit,
    SplitDoubleRequest,
    AddToPlayersListByStand,
    AddSplitPlayerToGame,
    AddPlayerFromPlayers,
    SplitStandAndRewards,
    SetRestart,
    ForceRestart,
    RecoverGameState,
    ClearGameState,
}

impl Endpoint {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Endpoint::InitializeSession => "initialize_session",
            Endpoint::Bet => "bet",
            Endpoint::RetakeBet => "retake_bet",
            Endpoint::CreateDeck => "create_deck",
            Endpoint::StartGame => "start_game",
            Endpoint::Hit => "hit",
            Endpoint::Rewards => "rewards",
            Endpoint::DoubleRequest => "double_request",
            Endpoint::InsRequest => "ins_request",
            Endpoint::StandAndRewards => "stand_and_rewards",
            Endpoint::SplitRequest => "split_request",
            Endpoint::SplitHit => "split_hit",
            Endpoint::SplitDoubleRequest => "split_double_request",
            Endpoint::AddToPlayersListByStand => "add_to_players_list_by_stand",
            Endpoint::AddSplitPlayerToGame => "add_split_player_to_game",
            Endpoint::AddPlayerFromPlayers => "add_player_from_players",
            Endpoint::SplitStandAndRewards => "split_stand_and_rewards",
            Endpoint::SetRestart => "set_restart",
            Endpoint::ForceRestart => "force_restart",
            Endpoint::RecoverGameState => "recover_game_state",
            Endpoint::ClearGameState => "clear_game_state",
        }
    }

    /// Request path relative to the server root.
    #[must_use]
    pub fn path(self) -> String {
        format!("/api/{}", self.name())
    }

    /// Changes server state and therefore carries an idempotency key.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Endpoint::InitializeSession | Endpoint::RecoverGameState)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(Endpoint::Bet.path(), "/api/bet");
        assert_eq!(
            Endpoint::AddToPlayersListByStand.path(),
            "/api/add_to_players_list_by_stand"
        );
    }

    #[test]
    fn reads_skip_idempotency() {
        assert!(!Endpoint::InitializeSession.is_mutating());
        assert!(!Endpoint::RecoverGameState.is_mutating());
        assert!(Endpoint::Hit.is_mutating());
        assert!(Endpoint::ForceRestart.is_mutating());
    }
}
