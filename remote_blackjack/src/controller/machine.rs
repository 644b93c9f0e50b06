//! The state-transition controller.
//!
//! [`Controller`] is the only writer of the client's game state. It turns
//! the current phase plus a server response into the next phase plus the
//! merged state, and checks every transition against the [`PhaseGraph`].

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use super::{
    config::{ConfigError, ControllerConfig},
    graph::{GraphError, PhaseGraph},
    messages::{Action, Outcome, Step},
};
use crate::{
    game::{GameStateData, GameStatePatch, INITIAL_DECK_LEN, Phase, Tokens},
    net::{
        api::GameApi,
        endpoint::Endpoint,
        errors::{ErrorClass, GatewayError, GatewayResult},
        messages::{ActionResponse, Params, bet_params},
    },
};

/// Errors raised while building a controller
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid phase graph: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Bet and balance captured before a balance-changing action.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RewardSnapshot {
    pub bet: Tokens,
    pub tokens: Tokens,
}

/// Everything the presentation layer renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameView {
    pub state: GameStateData,
    pub pre_reward: Option<RewardSnapshot>,
    pub ins_placed: bool,
    pub show_ins_lost: bool,
    /// Deck size when the current round started.
    pub init_deck_len: i64,
    /// A server call is in flight.
    pub waiting: bool,
    /// Last error shown to the user.
    pub notice: Option<String>,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            state: GameStateData::default(),
            pre_reward: None,
            ins_placed: false,
            show_ins_lost: false,
            init_deck_len: INITIAL_DECK_LEN,
            waiting: false,
            notice: None,
        }
    }
}

/// A computed move, committed after its delay.
#[derive(Debug)]
struct Transition {
    next: Phase,
    fresh_round: bool,
    delay: Duration,
}

impl Transition {
    fn to(next: Phase) -> Self {
        Self {
            next,
            fresh_round: false,
            delay: Duration::ZERO,
        }
    }

    /// Moves on with a new round that keeps the balance and the shoe.
    fn fresh(next: Phase) -> Self {
        Self {
            fresh_round: true,
            ..Self::to(next)
        }
    }

    fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct Controller<A> {
    api: A,
    config: ControllerConfig,
    graph: PhaseGraph,
    view: GameView,
    /// The automatic handler already ran for the current phase entry.
    handled: bool,
    /// Set by a natural-21 transit; skips the next split-stand pacing once.
    split_nat21: bool,
}

impl<A: GameApi> Controller<A> {
    /// Creates a controller in `LOADING` with the standard phase graph.
    pub fn new(api: A, config: ControllerConfig) -> Result<Self, ControllerError> {
        Self::with_graph(api, config, PhaseGraph::standard())
    }

    pub fn with_graph(
        api: A,
        config: ControllerConfig,
        graph: PhaseGraph,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        graph.validate()?;
        Ok(Self {
            api,
            config,
            graph,
            view: GameView::default(),
            handled: false,
            split_nat21: false,
        })
    }

    #[must_use]
    pub fn view(&self) -> &GameView {
        &self.view
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.view.state.phase
    }

    /// Runs a user action. Actions outside their phase are ignored without
    /// touching the server.
    pub async fn dispatch(&mut self, action: Action) -> Outcome {
        let phase = self.phase();
        if action.phase() != phase {
            log::debug!("Ignoring {action} in {phase}");
            return Outcome::Ignored;
        }
        if !self.accepts(action) {
            log::debug!("Ignoring {action}: precondition not met");
            return Outcome::Ignored;
        }

        self.view.notice = None;
        self.view.waiting = true;
        let result = self.run_action(action).await;
        self.view.waiting = false;

        match result {
            Ok(transition) => Outcome::Applied(self.commit(transition)),
            Err(err) => match err.class() {
                ErrorClass::Recoverable | ErrorClass::Benign => {
                    log::warn!("{action} rejected in {phase}: {err}");
                    let message = notice_for(&err);
                    self.view.notice = Some(message.clone());
                    Outcome::Rejected(message)
                }
                ErrorClass::SessionExpired | ErrorClass::Fatal => {
                    log::error!("{action} failed in {phase}: {err}");
                    let message = notice_for(&err);
                    self.fail(message.clone());
                    Outcome::Failed(message)
                }
            },
        }
    }

    /// Runs the handler of the current automatic phase, once per entry.
    pub async fn drive(&mut self) -> Step {
        let phase = self.phase();
        if !phase.is_automatic() {
            return Step::AwaitingInput;
        }
        if self.handled {
            return Step::Parked;
        }
        self.handled = true;

        self.view.waiting = true;
        let result = self.run_automatic(phase).await;
        self.view.waiting = false;

        match result {
            Ok(transition) => {
                sleep(transition.delay).await;
                Step::Advanced(self.commit(transition))
            }
            Err(err) if phase == Phase::Error => {
                log::error!("Forced restart failed, staying in {phase}: {err}");
                self.view.notice = Some(notice_for(&err));
                Step::Parked
            }
            Err(err) => {
                log::error!("{phase} failed: {err}");
                self.fail(notice_for(&err));
                Step::Advanced(Phase::Error)
            }
        }
    }

    fn accepts(&self, action: Action) -> bool {
        let state = &self.view.state;
        match action {
            Action::PlaceBet(amount) => amount > 0 && amount <= state.tokens,
            Action::RetakeBet => !state.bet_list.is_empty(),
            Action::StartGame => state.bet > 0,
            _ => true,
        }
    }

    async fn run_action(&mut self, action: Action) -> GatewayResult<Transition> {
        match action {
            Action::Continue => {
                self.request(Endpoint::RecoverGameState, Params::new()).await?;
                let state = &self.view.state;
                let next = if state.has_split_shape() {
                    if state.player.stated {
                        Phase::SplitFinish
                    } else {
                        Phase::SplitTurn
                    }
                } else if !state.player.hand.is_empty() {
                    Phase::MainTurn
                } else {
                    Phase::Betting
                };
                Ok(Transition::to(next))
            }
            Action::StartNew => {
                self.request(Endpoint::ClearGameState, Params::new()).await?;
                Ok(Transition::to(self.hinted_target(Phase::Betting)))
            }
            Action::PlaceBet(amount) => {
                self.request(Endpoint::Bet, bet_params(amount)).await?;
                Ok(Transition::to(self.hinted_target(Phase::Betting)))
            }
            Action::RetakeBet => {
                self.request(Endpoint::RetakeBet, Params::new()).await?;
                Ok(Transition::to(self.hinted_target(Phase::Betting)))
            }
            Action::StartGame => {
                let state = &self.view.state;
                let hint = state.pre_phase.or(state.target_phase);
                Ok(Transition::to(self.hinted(hint, Phase::InitGame)))
            }
            Action::Hit => {
                self.view.show_ins_lost = false;
                self.snapshot();
                self.request(Endpoint::Hit, Params::new()).await?;
                Ok(Transition::to(self.hinted_target(Phase::MainTurn)))
            }
            Action::Stand => {
                self.view.show_ins_lost = false;
                self.snapshot();
                Ok(Transition::to(Phase::MainStandRewardsTransit))
            }
            Action::Double => {
                self.view.show_ins_lost = false;
                self.request(Endpoint::DoubleRequest, Params::new()).await?;
                self.view.pre_reward = Some(RewardSnapshot {
                    bet: self.view.state.player.bet,
                    tokens: self.view.state.tokens,
                });
                Ok(Transition::to(Phase::MainStandRewardsTransit))
            }
            Action::Insurance => {
                self.view.ins_placed = true;
                self.snapshot();
                self.request(Endpoint::InsRequest, Params::new()).await?;
                if self.view.state.natural_21 == 3 {
                    Ok(Transition::to(Phase::MainStand))
                } else {
                    self.view.show_ins_lost = true;
                    Ok(Transition::to(Phase::MainTurn))
                }
            }
            Action::Split => {
                self.view.show_ins_lost = false;
                self.snapshot();
                self.request(Endpoint::SplitRequest, Params::new()).await?;
                let state = &self.view.state;
                let next = if state.aces {
                    Phase::SplitAceTransit
                } else if state.player.is_natural_21() {
                    Phase::SplitNat21Transit
                } else {
                    Phase::SplitTurn
                };
                Ok(Transition::to(next))
            }
            Action::SplitHit => {
                self.request(Endpoint::SplitHit, Params::new()).await?;
                Ok(Transition::to(Phase::SplitTurn))
            }
            Action::SplitStand => {
                let next = if self.view.state.player.has_hit == 0 {
                    Phase::SplitStandDouble
                } else {
                    Phase::SplitStand
                };
                Ok(Transition::to(next))
            }
            Action::SplitDouble => {
                self.request(Endpoint::SplitDoubleRequest, Params::new())
                    .await?;
                Ok(Transition::to(Phase::SplitStandDouble))
            }
        }
    }

    async fn run_automatic(&mut self, phase: Phase) -> GatewayResult<Transition> {
        let delays = self.config.delays;
        match phase {
            Phase::Loading => self.load().await,
            Phase::Shuffling => {
                self.request(Endpoint::CreateDeck, Params::new()).await?;
                Ok(Transition::to(self.hinted_target(Phase::InitGame)).after(delays.shuffle))
            }
            Phase::InitGame => self.init_game().await,
            Phase::MainStandRewardsTransit => {
                self.request(Endpoint::StandAndRewards, Params::new())
                    .await?;
                Ok(Transition::to(Phase::MainStand).after(delays.rewards_settle))
            }
            Phase::MainStand => {
                let transition = if self.view.state.tokens == 0 {
                    Transition::to(Phase::OutOfTokens)
                } else {
                    let pre_phase = self.view.state.pre_phase;
                    Transition::fresh(self.hinted(pre_phase, Phase::Betting))
                };
                Ok(transition.after(delays.main_stand))
            }
            Phase::SplitStand | Phase::SplitStandDouble => {
                match self.split_stand(phase).await {
                    Err(err) if err.class() == ErrorClass::Benign => {
                        log::debug!("Split queue exhausted in {phase}");
                        Ok(Transition::to(Phase::SplitFinish))
                    }
                    other => other,
                }
            }
            Phase::SplitNat21Transit => {
                self.split_nat21 = true;
                Ok(Transition::to(Phase::SplitStand).after(delays.split_nat21))
            }
            Phase::SplitAceTransit => match self.split_ace().await {
                Err(err) if err.class() == ErrorClass::Benign => {
                    log::debug!("Split queue exhausted in {phase}");
                    Ok(Transition::to(Phase::SplitFinish).after(delays.split_ace))
                }
                other => other,
            },
            Phase::SplitFinish => {
                self.snapshot();
                self.request(Endpoint::SplitStandAndRewards, Params::new())
                    .await?;
                Ok(Transition::to(Phase::SplitFinishOutcome))
            }
            Phase::SplitFinishOutcome => {
                if !self.view.state.players.is_empty() {
                    self.request(Endpoint::AddPlayerFromPlayers, Params::new())
                        .await?;
                    Ok(Transition::to(Phase::SplitFinish).after(delays.split_outcome))
                } else if self.view.state.tokens == 0 {
                    Ok(Transition::to(Phase::OutOfTokens))
                } else {
                    Ok(Transition::fresh(Phase::Betting).after(delays.split_outcome))
                }
            }
            Phase::OutOfTokens => {
                self.request(Endpoint::SetRestart, Params::new()).await?;
                Ok(Transition::to(Phase::RestartGame).after(delays.out_of_tokens))
            }
            Phase::RestartGame => {
                self.reset_turn();
                Ok(Transition::to(Phase::Reloading).after(delays.restart))
            }
            Phase::Reloading => Ok(Transition::fresh(Phase::Betting).after(delays.reloading)),
            Phase::Error => {
                sleep(delays.error_retry).await;
                self.request(Endpoint::ForceRestart, Params::new()).await?;
                Ok(Transition::to(Phase::Reloading))
            }
            // Input phases never reach here; `drive` returns before.
            Phase::RecoveryDecision | Phase::Betting | Phase::MainTurn | Phase::SplitTurn => {
                Ok(Transition::to(phase))
            }
        }
    }

    async fn load(&mut self) -> GatewayResult<Transition> {
        let (init, ()) = tokio::join!(
            self.api.initialize_session(),
            sleep(self.config.delays.min_loading)
        );
        let init = init?;

        let deck_len = init.game_state.deck_len;
        self.view.init_deck_len = deck_len;
        self.view.state.merge(GameStatePatch {
            is_round_active: Some(init.game_state.is_round_active),
            ..GameStatePatch::balance(init.tokens, deck_len)
        });

        let next = if init.tokens == 0 {
            Phase::OutOfTokens
        } else if init.game_state.is_round_active {
            Phase::RecoveryDecision
        } else {
            Phase::Betting
        };
        Ok(Transition::to(next))
    }

    async fn init_game(&mut self) -> GatewayResult<Transition> {
        self.reset_turn();
        self.view.init_deck_len = self.view.state.deck_len;
        self.request(Endpoint::StartGame, Params::new()).await?;

        let pre_phase = self.view.state.pre_phase;
        if pre_phase == Some(Phase::MainStand) || self.view.state.dealer_masked.settles_on_deal() {
            self.snapshot();
            self.request(Endpoint::Rewards, Params::new()).await?;
            return Ok(Transition::to(Phase::MainStand));
        }
        Ok(Transition::to(self.hinted(pre_phase, Phase::MainTurn)))
    }

    async fn split_stand(&mut self, phase: Phase) -> GatewayResult<Transition> {
        let pacing = self.config.delays.split_stand;
        let queued = self
            .request(Endpoint::AddToPlayersListByStand, Params::new())
            .await?;

        if queued.split_req.unwrap_or(0) == 0 {
            let next = self.hinted_target(Phase::SplitFinish);
            return Ok(Transition::to(next).after(self.split_pacing(pacing)));
        }

        self.request(Endpoint::AddSplitPlayerToGame, Params::new())
            .await?;
        let local = if self.view.state.player.is_natural_21() {
            Phase::SplitNat21Transit
        } else {
            Phase::SplitTurn
        };
        let next = self.hinted_target(local);
        let delay = if next == Phase::SplitNat21Transit {
            // A natural coming straight off a plain stand is shown at once.
            if phase == Phase::SplitStandDouble {
                pacing
            } else {
                Duration::ZERO
            }
        } else {
            self.split_pacing(pacing)
        };
        Ok(Transition::to(next).after(delay))
    }

    async fn split_ace(&mut self) -> GatewayResult<Transition> {
        let pacing = self.config.delays.split_ace;
        let queued = self
            .request(Endpoint::AddToPlayersListByStand, Params::new())
            .await?;

        if queued.split_req.unwrap_or(0) > 0 {
            self.request(Endpoint::AddSplitPlayerToGame, Params::new())
                .await?;
            Ok(Transition::to(Phase::SplitAceTransit).after(pacing))
        } else {
            Ok(Transition::to(Phase::SplitFinish).after(pacing))
        }
    }

    /// Split-stand pacing, skipped once right after a natural-21 transit.
    fn split_pacing(&mut self, pacing: Duration) -> Duration {
        if std::mem::take(&mut self.split_nat21) {
            Duration::ZERO
        } else {
            pacing
        }
    }

    /// Calls the server and merges the reply into the state. Returns the
    /// reply's own patch for callers that must look at it alone.
    async fn request(
        &mut self,
        endpoint: Endpoint,
        params: Params,
    ) -> GatewayResult<GameStatePatch> {
        let patch = self
            .api
            .call(endpoint, params)
            .await
            .map(ActionResponse::into_patch)?;
        self.view.state.merge(patch.clone());
        Ok(patch)
    }

    fn hinted_target(&self, default: Phase) -> Phase {
        self.hinted(self.view.state.target_phase, default)
    }

    /// A server hint, provided the graph allows it from the current phase.
    fn hinted(&self, hint: Option<Phase>, default: Phase) -> Phase {
        let from = self.phase();
        match hint {
            Some(phase) if self.graph.allows(from, phase) => phase,
            Some(phase) => {
                log::warn!("Ignoring hint {phase} from {from}, using {default}");
                default
            }
            None => default,
        }
    }

    /// Records the active hand's bet and the balance.
    fn snapshot(&mut self) {
        self.view.pre_reward = Some(RewardSnapshot {
            bet: self.view.state.player.bet,
            tokens: self.view.state.tokens,
        });
    }

    fn reset_turn(&mut self) {
        self.view.pre_reward = None;
        self.view.ins_placed = false;
        self.view.show_ins_lost = false;
    }

    fn commit(&mut self, transition: Transition) -> Phase {
        let from = self.phase();
        if !self.graph.allows(from, transition.next) {
            log::error!("{from} -> {} is not in the phase graph", transition.next);
            self.fail(format!("Unexpected transition from {from}"));
            return self.phase();
        }

        if transition.fresh_round {
            self.view.state = self.view.state.next_round();
        }
        self.enter(transition.next);

        if let Some(guarded) = self.threshold_guard() {
            self.enter(guarded);
        }
        self.phase()
    }

    /// Hands at 21 or more never wait for user input.
    fn threshold_guard(&self) -> Option<Phase> {
        let player = &self.view.state.player;
        if player.sum < 21 {
            return None;
        }
        match self.phase() {
            Phase::MainTurn => Some(Phase::MainStandRewardsTransit),
            Phase::SplitTurn if player.has_hit == 1 => Some(Phase::SplitStandDouble),
            Phase::SplitTurn => Some(Phase::SplitStand),
            _ => None,
        }
    }

    fn enter(&mut self, next: Phase) {
        log::info!("{} -> {next}", self.phase());
        self.view.state.phase = next;
        self.handled = false;
    }

    fn fail(&mut self, message: String) {
        self.view.notice = Some(message);
        self.enter(Phase::Error);
    }
}

fn notice_for(err: &GatewayError) -> String {
    match err {
        GatewayError::Http { error, .. } => error.message(),
        other => other.to_string(),
    }
}
