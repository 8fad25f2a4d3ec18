use crate::{
    api::{
        ApiClient,
        ApiError,
        BlackjackHit,
        BlackjackResolution,
        BlackjackStart,
        Card,
        ClickerSnapshot,
        HistoryEntry,
        RevealOutcome,
        RoundResult,
        RouletteChoice,
        RouletteColor,
        RouletteOutcome,
        SlotsOutcome,
        StatsSnapshot,
        UpgradeKind,
    },
    timers::TimerQueue,
    ui,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use rand::Rng;
use std::time::{
    Duration,
    Instant,
};
use tokio::{
    sync::mpsc,
    time,
};
use tracing::warn;

const MONEY_PULSE: Duration = Duration::from_millis(500);
const CLICK_PULSE: Duration = Duration::from_millis(100);
const FLOATING_NUMBER_TTL: Duration = Duration::from_secs(2);
const ROUND_HOLD: Duration = Duration::from_secs(3);
const ROULETTE_SPIN_TIME: Duration = Duration::from_secs(3);
const SLOTS_SPIN_TIME: Duration = Duration::from_secs(2);
const SLOTS_TICK: Duration = Duration::from_millis(100);
const SLOTS_TICKS: u32 = 20;
const BOMB_STAGGER_MAX_MS: u64 = 1_000;
const GRID_SIZE: usize = 25;
const GRID_WIDTH: usize = 5;
const MIN_BOMBS: u8 = 3;
const MAX_BOMBS: u8 = 10;
const MAX_ROULETTE_NUMBER: u8 = 36;
const BET_INPUT_MAX_DIGITS: usize = 9;
const ERROR_LOG_CAP: usize = 50;
const FLOATING_NUMBER_CAP: usize = 8;

pub const SLOT_SYMBOLS: [&str; 6] = ["🎰", "🍋", "🍊", "🍇", "7️⃣", "💎"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_url: String,
    pub log_file: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Clicker,
    Blackjack,
    Roulette,
    Minebomb,
    Slots,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Menu => "Casino Portal",
            Screen::Clicker => "Money Clicker",
            Screen::Blackjack => "Blackjack",
            Screen::Roulette => "Roulette",
            Screen::Minebomb => "Minebomb",
            Screen::Slots => "Slots",
        }
    }
}

/// Which part of the app a timer belongs to. Screen-scoped entries die when
/// the player navigates away, so a delayed panel transition can never touch
/// a screen that is no longer showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Screen(Screen),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ClearMoneyPulse(u64),
    ClearClickPulse(u64),
    ExpireFloatingNumber(u64),
    BlackjackBackToBetting,
    RouletteReveal,
    RouletteClearMessage,
    MinebombRevealBomb(usize),
    MinebombBackToBetting,
    SlotsAnimationTick,
    SlotsReveal,
    SlotsClearMessage,
}

/// Outcome of a request that raced a cosmetic animation. Tagged with the
/// round that issued it so superseded rounds are dropped on arrival.
#[derive(Debug)]
pub enum NetEvent {
    Roulette {
        round: u64,
        result: Result<RouletteOutcome, ApiError>,
    },
    Slots {
        round: u64,
        result: Result<SlotsOutcome, ApiError>,
    },
}

/// Server-acknowledged state. `money` is `None` until the server has
/// confirmed a balance; the client never computes one itself.
#[derive(Debug, Default)]
pub struct ClientState {
    pub money: Option<i64>,
    pub clicker: ClickerSnapshot,
    pub stats: Option<StatsSnapshot>,
    pub selected_color: Option<RouletteColor>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Clone, Debug)]
pub struct FloatingNumber {
    pub id: u64,
    pub amount: i64,
}

#[derive(Debug, Default)]
pub struct ClickerView {
    pub click_pulse: bool,
    pub floating: Vec<FloatingNumber>,
    click_pulse_seq: u64,
    next_floating_id: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlackjackPhase {
    #[default]
    Betting,
    InProgress,
    Resolved,
}

#[derive(Debug, Default)]
pub struct BlackjackView {
    pub phase: BlackjackPhase,
    pub bet_input: String,
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_hand: Vec<Card>,
    pub dealer_total: Option<u32>,
    pub num_decks: u32,
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouletteBetMode {
    #[default]
    Color,
    Number,
}

#[derive(Debug)]
pub struct RouletteView {
    pub bet_input: String,
    pub mode: RouletteBetMode,
    pub number: u8,
    pub locked: bool,
    pub message: Option<String>,
    pub last_result: Option<(u8, String)>,
    round: u64,
    pending: Option<RouletteOutcome>,
    reveal_due: bool,
}

impl Default for RouletteView {
    fn default() -> Self {
        Self {
            bet_input: String::new(),
            mode: RouletteBetMode::Color,
            number: 7,
            locked: false,
            message: None,
            last_result: None,
            round: 0,
            pending: None,
            reveal_due: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Hidden,
    Safe,
    Bomb,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinebombPhase {
    #[default]
    Betting,
    Active,
    Busted,
    CashedOut,
}

#[derive(Debug)]
pub struct MinebombView {
    pub phase: MinebombPhase,
    pub bet_input: String,
    pub bombs: u8,
    pub cursor: usize,
    pub grid: [CellState; GRID_SIZE],
    pub multiplier: f64,
    pub potential_win: i64,
    pub diamonds_found: u32,
    pub cashout_enabled: bool,
    pub message: Option<String>,
}

impl Default for MinebombView {
    fn default() -> Self {
        Self {
            phase: MinebombPhase::Betting,
            bet_input: String::new(),
            bombs: MIN_BOMBS,
            cursor: 0,
            grid: [CellState::Hidden; GRID_SIZE],
            multiplier: 1.0,
            potential_win: 0,
            diamonds_found: 0,
            cashout_enabled: false,
            message: None,
        }
    }
}

#[derive(Debug)]
pub struct SlotsView {
    pub bet_input: String,
    pub reels: [String; 3],
    pub locked: bool,
    pub message: Option<String>,
    pub jackpot: Option<&'static str>,
    round: u64,
    pending: Option<SlotsOutcome>,
    reveal_due: bool,
}

impl Default for SlotsView {
    fn default() -> Self {
        Self {
            bet_input: String::new(),
            reels: [
                SLOT_SYMBOLS[0].to_string(),
                SLOT_SYMBOLS[0].to_string(),
                SLOT_SYMBOLS[0].to_string(),
            ],
            locked: false,
            message: None,
            jackpot: None,
            round: 0,
            pending: None,
            reveal_due: false,
        }
    }
}

pub struct AppController {
    pub api: ApiClient,
    pub screen: Screen,
    pub state: ClientState,
    pub clicker_view: ClickerView,
    pub blackjack: BlackjackView,
    pub roulette: RouletteView,
    pub minebomb: MinebombView,
    pub slots: SlotsView,
    pub money_pulse: bool,
    pub status: String,
    pub errors: Vec<String>,
    pub timers: TimerQueue<Scope, Effect>,
    net_tx: mpsc::UnboundedSender<NetEvent>,
    money_pulse_seq: u64,
    round_counter: u64,
    history_dirty: bool,
}

impl AppController {
    pub fn new(api: ApiClient, net_tx: mpsc::UnboundedSender<NetEvent>) -> Self {
        Self {
            api,
            screen: Screen::Menu,
            state: ClientState::default(),
            clicker_view: ClickerView::default(),
            blackjack: BlackjackView::default(),
            roulette: RouletteView::default(),
            minebomb: MinebombView::default(),
            slots: SlotsView::default(),
            money_pulse: false,
            status: String::from("Welcome to the casino"),
            errors: Vec::new(),
            timers: TimerQueue::new(),
            net_tx,
            money_pulse_seq: 0,
            round_counter: 0,
            history_dirty: false,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.errors.clear();
    }

    fn push_errors(&mut self, errs: Vec<String>) {
        for err in errs {
            self.errors.push(err);
        }
        let overflow = self.errors.len().saturating_sub(ERROR_LOG_CAP);
        if overflow > 0 {
            self.errors.drain(..overflow);
        }
    }

    fn report_api_error(&mut self, action: &'static str, err: ApiError) {
        match err {
            ApiError::Rejected(message) => self.push_errors(vec![message]),
            ApiError::Transport(report) => {
                tracing::error!(action, error = %report, "request failed");
                self.push_errors(vec![String::from("Connection error")]);
            }
        }
    }

    /// The single path through which a balance ever changes.
    fn apply_money(&mut self, money: i64) {
        self.state.money = Some(money);
        self.money_pulse = true;
        self.money_pulse_seq += 1;
        self.timers.schedule(
            Scope::Global,
            MONEY_PULSE,
            Effect::ClearMoneyPulse(self.money_pulse_seq),
        );
    }

    pub fn take_history_dirty(&mut self) -> bool {
        std::mem::take(&mut self.history_dirty)
    }

    // ------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------

    pub async fn bootstrap(&mut self) {
        // The portal has no read-only balance endpoint; a passive collection
        // returns the balance and credits nothing while the rate is zero.
        let (clicker, balance, stats) = tokio::join!(
            self.api.clicker_data(),
            self.api.passive_income(),
            self.api.stats(),
        );
        match clicker {
            Ok(snapshot) => self.state.clicker = snapshot,
            Err(err) => self.report_api_error("clicker bootstrap", err),
        }
        match balance {
            Ok(update) => self.apply_money(update.money),
            Err(err) => self.report_api_error("balance bootstrap", err),
        }
        match stats {
            Ok(stats) => self.state.stats = Some(stats),
            Err(err) => self.report_api_error("stats bootstrap", err),
        }
        self.refresh_history().await;
    }

    pub async fn refresh_history(&mut self) {
        match self.api.history().await {
            Ok(history) => self.state.history = history,
            Err(err) => warn!(error = %err, "history refresh failed"),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn open_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        let leaving = self.screen;
        self.timers.cancel_scope(Scope::Screen(leaving));
        match leaving {
            Screen::Clicker => {
                self.clicker_view.click_pulse = false;
                self.clicker_view.floating.clear();
            }
            Screen::Roulette => {
                let view = &mut self.roulette;
                view.locked = false;
                view.pending = None;
                view.reveal_due = false;
                view.message = None;
                view.last_result = None;
            }
            Screen::Slots => {
                let view = &mut self.slots;
                view.locked = false;
                view.pending = None;
                view.reveal_due = false;
                view.message = None;
                view.jackpot = None;
            }
            Screen::Blackjack if self.blackjack.phase == BlackjackPhase::Resolved => {
                reset_blackjack_round(&mut self.blackjack);
            }
            Screen::Minebomb
                if matches!(
                    self.minebomb.phase,
                    MinebombPhase::Busted | MinebombPhase::CashedOut
                ) =>
            {
                reset_minebomb_round(&mut self.minebomb);
            }
            _ => {}
        }
        self.screen = screen;
    }

    pub fn back_to_menu(&mut self) {
        self.open_screen(Screen::Menu);
    }

    // ------------------------------------------------------------------
    // Clicker
    // ------------------------------------------------------------------

    pub async fn click(&mut self) {
        match self.api.click().await {
            Ok(update) => self.ingest_click(update.money),
            Err(err) => self.report_api_error("click", err),
        }
    }

    /// The click response carries only the balance; the gain shown in the
    /// floating number is the click power from the cached snapshot.
    fn ingest_click(&mut self, money: i64) {
        let gain = self.state.clicker.click_power;
        self.apply_money(money);
        self.pulse_click_button();
        self.spawn_floating_number(gain);
    }

    pub async fn buy_upgrade(&mut self, kind: UpgradeKind) {
        match self.api.buy_upgrade(kind).await {
            Ok((money, snapshot)) => {
                self.ingest_clicker_update(money, snapshot);
                self.set_status(format!("Bought {}", kind.title()));
            }
            Err(err) => self.report_api_error("upgrade", err),
        }
    }

    /// The 1s collection tick only asks the server while the acknowledged
    /// rate is positive.
    pub fn passive_collection_due(&self) -> bool {
        self.state.clicker.passive_income > 0
    }

    pub async fn collect_passive_income(&mut self) {
        match self.api.passive_income().await {
            Ok(update) => self.apply_money(update.money),
            // A missed tick is invisible; the next one reconciles the balance.
            Err(err) => warn!(error = %err, "passive income tick failed"),
        }
    }

    /// Replaces the clicker snapshot wholesale; no cost or level is ever
    /// recomputed locally.
    fn ingest_clicker_update(&mut self, money: i64, snapshot: ClickerSnapshot) {
        self.state.clicker = snapshot;
        self.apply_money(money);
    }

    fn pulse_click_button(&mut self) {
        self.clicker_view.click_pulse = true;
        self.clicker_view.click_pulse_seq += 1;
        self.timers.schedule(
            Scope::Screen(Screen::Clicker),
            CLICK_PULSE,
            Effect::ClearClickPulse(self.clicker_view.click_pulse_seq),
        );
    }

    fn spawn_floating_number(&mut self, amount: i64) {
        let view = &mut self.clicker_view;
        view.next_floating_id += 1;
        let id = view.next_floating_id;
        view.floating.push(FloatingNumber { id, amount });
        let overflow = view.floating.len().saturating_sub(FLOATING_NUMBER_CAP);
        if overflow > 0 {
            view.floating.drain(..overflow);
        }
        self.timers.schedule(
            Scope::Screen(Screen::Clicker),
            FLOATING_NUMBER_TTL,
            Effect::ExpireFloatingNumber(id),
        );
    }

    // ------------------------------------------------------------------
    // Bet input editing
    // ------------------------------------------------------------------

    fn active_bet_input(&mut self) -> Option<&mut String> {
        match self.screen {
            Screen::Blackjack if self.blackjack.phase == BlackjackPhase::Betting => {
                Some(&mut self.blackjack.bet_input)
            }
            Screen::Roulette if !self.roulette.locked => Some(&mut self.roulette.bet_input),
            Screen::Minebomb if self.minebomb.phase == MinebombPhase::Betting => {
                Some(&mut self.minebomb.bet_input)
            }
            Screen::Slots if !self.slots.locked => Some(&mut self.slots.bet_input),
            _ => None,
        }
    }

    pub fn push_bet_digit(&mut self, digit: char) {
        if let Some(input) = self.active_bet_input()
            && input.len() < BET_INPUT_MAX_DIGITS
        {
            input.push(digit);
        }
    }

    pub fn pop_bet_digit(&mut self) {
        if let Some(input) = self.active_bet_input() {
            input.pop();
        }
    }

    // ------------------------------------------------------------------
    // Blackjack
    // ------------------------------------------------------------------

    pub async fn blackjack_deal(&mut self) {
        if self.blackjack.phase != BlackjackPhase::Betting {
            return;
        }
        let Some(bet) = parse_bet(&self.blackjack.bet_input) else {
            self.push_errors(vec![String::from("Enter a bet amount first")]);
            return;
        };
        match self.api.blackjack_start(bet).await {
            Ok(start) => self.ingest_blackjack_start(start),
            Err(err) => self.report_api_error("blackjack start", err),
        }
    }

    fn ingest_blackjack_start(&mut self, start: BlackjackStart) {
        self.apply_money(start.money);
        let view = &mut self.blackjack;
        view.phase = BlackjackPhase::InProgress;
        view.player_hand = start.player_hand;
        view.player_total = start.player_total;
        // The start response discloses the full dealer hand; only the first
        // card may be shown until resolution.
        let mut dealer_hand = start.dealer_hand;
        dealer_hand.truncate(1);
        view.dealer_hand = dealer_hand;
        view.dealer_total = None;
        view.num_decks = start.num_decks;
        view.message = None;
    }

    pub async fn blackjack_hit(&mut self) {
        if self.blackjack.phase != BlackjackPhase::InProgress {
            return;
        }
        match self.api.blackjack_hit().await {
            Ok(hit) => {
                if self.ingest_blackjack_hit(hit) {
                    self.finish_blackjack_round().await;
                }
            }
            Err(err) => self.report_api_error("blackjack hit", err),
        }
    }

    /// Returns true when the hand busted and the round must be resolved.
    /// Busting locks the phase first, so resolution runs once.
    fn ingest_blackjack_hit(&mut self, hit: BlackjackHit) -> bool {
        if self.blackjack.phase != BlackjackPhase::InProgress {
            return false;
        }
        self.blackjack.player_hand = hit.player_hand;
        self.blackjack.player_total = hit.player_total;
        if hit.busted {
            self.blackjack.phase = BlackjackPhase::Resolved;
            true
        } else {
            false
        }
    }

    pub async fn blackjack_stand(&mut self) {
        if self.blackjack.phase != BlackjackPhase::InProgress {
            return;
        }
        self.finish_blackjack_round().await;
    }

    async fn finish_blackjack_round(&mut self) {
        match self.api.blackjack_stand().await {
            Ok(resolution) => self.ingest_blackjack_resolution(resolution),
            Err(err) => self.report_api_error("blackjack stand", err),
        }
    }

    fn ingest_blackjack_resolution(&mut self, resolution: BlackjackResolution) {
        self.apply_money(resolution.money);
        self.state.stats = Some(resolution.stats);
        self.history_dirty = true;
        self.timers.schedule(
            Scope::Screen(Screen::Blackjack),
            ROUND_HOLD,
            Effect::BlackjackBackToBetting,
        );
        let view = &mut self.blackjack;
        view.phase = BlackjackPhase::Resolved;
        view.dealer_hand = resolution.dealer_hand;
        view.dealer_total = Some(resolution.dealer_total);
        view.message = Some(match resolution.result {
            RoundResult::Win => format!("You win {} $!", resolution.profit),
            RoundResult::Lose => String::from("Dealer wins. You lose your bet."),
            RoundResult::Draw => String::from("Push! Your bet is returned."),
        });
    }

    // ------------------------------------------------------------------
    // Roulette
    // ------------------------------------------------------------------

    pub fn roulette_select_color(&mut self, color: RouletteColor) {
        if !self.roulette.locked {
            self.state.selected_color = Some(color);
        }
    }

    pub fn roulette_toggle_mode(&mut self) {
        if self.roulette.locked {
            return;
        }
        self.roulette.mode = match self.roulette.mode {
            RouletteBetMode::Color => RouletteBetMode::Number,
            RouletteBetMode::Number => RouletteBetMode::Color,
        };
    }

    pub fn roulette_number_up(&mut self) {
        if !self.roulette.locked {
            self.roulette.number = if self.roulette.number == MAX_ROULETTE_NUMBER {
                0
            } else {
                self.roulette.number + 1
            };
        }
    }

    pub fn roulette_number_down(&mut self) {
        if !self.roulette.locked {
            self.roulette.number = if self.roulette.number == 0 {
                MAX_ROULETTE_NUMBER
            } else {
                self.roulette.number - 1
            };
        }
    }

    /// Validates the wager without touching the network. A color bet with no
    /// color selected never leaves the client.
    fn roulette_spin_request(&self) -> Result<(u64, RouletteChoice), String> {
        let bet = parse_bet(&self.roulette.bet_input)
            .ok_or_else(|| String::from("Enter a bet amount first"))?;
        let choice = match self.roulette.mode {
            RouletteBetMode::Color => RouletteChoice::Color(
                self.state
                    .selected_color
                    .ok_or_else(|| String::from("Pick red or black before spinning"))?,
            ),
            RouletteBetMode::Number => RouletteChoice::Number(self.roulette.number),
        };
        Ok((bet, choice))
    }

    pub fn roulette_spin(&mut self) {
        if self.roulette.locked {
            return;
        }
        let (bet, choice) = match self.roulette_spin_request() {
            Ok(request) => request,
            Err(message) => {
                self.push_errors(vec![message]);
                return;
            }
        };
        let round = self.begin_roulette_round();
        let api = self.api.clone();
        let net_tx = self.net_tx.clone();
        tokio::spawn(async move {
            let result = api.roulette_spin(bet, choice).await;
            let _ = net_tx.send(NetEvent::Roulette { round, result });
        });
    }

    /// Arms the wheel animation. The request runs in parallel; the outcome
    /// is shown at whichever comes later, the animation deadline or the
    /// response.
    fn begin_roulette_round(&mut self) -> u64 {
        self.round_counter += 1;
        let round = self.round_counter;
        self.timers.cancel_scope(Scope::Screen(Screen::Roulette));
        self.timers.schedule(
            Scope::Screen(Screen::Roulette),
            ROULETTE_SPIN_TIME,
            Effect::RouletteReveal,
        );
        let view = &mut self.roulette;
        view.round = round;
        view.locked = true;
        view.pending = None;
        view.reveal_due = false;
        view.message = None;
        view.last_result = None;
        round
    }

    fn apply_roulette_outcome(&mut self, outcome: RouletteOutcome) {
        self.apply_money(outcome.money);
        self.state.stats = Some(outcome.stats);
        self.history_dirty = true;
        self.timers.schedule(
            Scope::Screen(Screen::Roulette),
            ROUND_HOLD,
            Effect::RouletteClearMessage,
        );
        let view = &mut self.roulette;
        view.locked = false;
        view.reveal_due = false;
        view.message = Some(match outcome.result {
            RoundResult::Win => format!(
                "The ball lands on {} {}. You win {} $!",
                outcome.number, outcome.color, outcome.profit
            ),
            _ => format!(
                "The ball lands on {} {}. You lose {} $.",
                outcome.number,
                outcome.color,
                outcome.profit.unsigned_abs()
            ),
        });
        view.last_result = Some((outcome.number, outcome.color));
    }

    // ------------------------------------------------------------------
    // Minebomb
    // ------------------------------------------------------------------

    pub fn minebomb_bombs_up(&mut self) {
        if self.minebomb.phase == MinebombPhase::Betting {
            self.minebomb.bombs = (self.minebomb.bombs + 1).min(MAX_BOMBS);
        }
    }

    pub fn minebomb_bombs_down(&mut self) {
        if self.minebomb.phase == MinebombPhase::Betting {
            self.minebomb.bombs = (self.minebomb.bombs - 1).max(MIN_BOMBS);
        }
    }

    pub fn minebomb_move_cursor(&mut self, direction: ui::GridDirection) {
        let cursor = self.minebomb.cursor;
        self.minebomb.cursor = match direction {
            ui::GridDirection::Up if cursor >= GRID_WIDTH => cursor - GRID_WIDTH,
            ui::GridDirection::Down if cursor + GRID_WIDTH < GRID_SIZE => {
                cursor + GRID_WIDTH
            }
            ui::GridDirection::Left if cursor % GRID_WIDTH > 0 => cursor - 1,
            ui::GridDirection::Right if cursor % GRID_WIDTH < GRID_WIDTH - 1 => {
                cursor + 1
            }
            _ => cursor,
        };
    }

    fn minebomb_start_request(&self) -> Result<(u64, u8), String> {
        let bet = parse_bet(&self.minebomb.bet_input)
            .ok_or_else(|| String::from("Enter a bet amount first"))?;
        if !(MIN_BOMBS..=MAX_BOMBS).contains(&self.minebomb.bombs) {
            return Err(format!(
                "Bomb count must be between {MIN_BOMBS} and {MAX_BOMBS}"
            ));
        }
        Ok((bet, self.minebomb.bombs))
    }

    pub async fn minebomb_begin(&mut self) {
        if self.minebomb.phase != MinebombPhase::Betting {
            return;
        }
        let (bet, bombs) = match self.minebomb_start_request() {
            Ok(request) => request,
            Err(message) => {
                self.push_errors(vec![message]);
                return;
            }
        };
        match self.api.minebomb_start(bet, bombs).await {
            Ok(update) => {
                self.apply_money(update.money);
                let view = &mut self.minebomb;
                view.phase = MinebombPhase::Active;
                view.grid = [CellState::Hidden; GRID_SIZE];
                view.multiplier = 1.0;
                view.potential_win = 0;
                view.diamonds_found = 0;
                view.cashout_enabled = false;
                view.message = None;
            }
            Err(err) => self.report_api_error("minebomb start", err),
        }
    }

    fn minebomb_can_reveal(&self, index: usize) -> bool {
        self.minebomb.phase == MinebombPhase::Active
            && self.minebomb.grid[index] == CellState::Hidden
    }

    pub async fn minebomb_reveal(&mut self) {
        let index = self.minebomb.cursor;
        // An already-revealed cell never produces a second request.
        if !self.minebomb_can_reveal(index) {
            return;
        }
        match self.api.minebomb_reveal(index).await {
            Ok(outcome) => self.ingest_minebomb_reveal(index, outcome),
            Err(err) => self.report_api_error("minebomb reveal", err),
        }
    }

    fn ingest_minebomb_reveal(&mut self, index: usize, outcome: RevealOutcome) {
        match outcome {
            RevealOutcome::Safe {
                multiplier,
                potential_win,
                diamonds_found,
            } => {
                let view = &mut self.minebomb;
                view.grid[index] = CellState::Safe;
                view.multiplier = multiplier;
                view.potential_win = potential_win;
                view.diamonds_found = diamonds_found;
                view.cashout_enabled = true;
            }
            RevealOutcome::Bomb { money, grid, stats } => {
                self.apply_money(money);
                self.state.stats = Some(stats);
                self.history_dirty = true;
                self.minebomb.grid[index] = CellState::Bomb;
                self.minebomb.phase = MinebombPhase::Busted;
                self.minebomb.cashout_enabled = false;
                self.minebomb.message =
                    Some(String::from("Boom! You hit a bomb and lose your bet."));
                // The remaining bombs pop in one by one.
                if let Some(layout) = grid {
                    let mut rng = rand::rng();
                    for (cell, kind) in layout.iter().enumerate() {
                        if *kind == crate::api::CellKind::Bomb
                            && cell != index
                            && self.minebomb.grid[cell] == CellState::Hidden
                        {
                            let delay = Duration::from_millis(
                                rng.random_range(0..BOMB_STAGGER_MAX_MS),
                            );
                            self.timers.schedule(
                                Scope::Screen(Screen::Minebomb),
                                delay,
                                Effect::MinebombRevealBomb(cell),
                            );
                        }
                    }
                }
                self.timers.schedule(
                    Scope::Screen(Screen::Minebomb),
                    ROUND_HOLD,
                    Effect::MinebombBackToBetting,
                );
            }
        }
    }

    pub async fn minebomb_cashout(&mut self) {
        if self.minebomb.phase != MinebombPhase::Active || !self.minebomb.cashout_enabled
        {
            return;
        }
        match self.api.minebomb_cashout().await {
            Ok(outcome) => {
                self.apply_money(outcome.money);
                self.state.stats = Some(outcome.stats);
                self.history_dirty = true;
                let view = &mut self.minebomb;
                view.phase = MinebombPhase::CashedOut;
                view.cashout_enabled = false;
                view.message = Some(format!(
                    "Cashed out at x{:.2} for {} $ profit!",
                    outcome.multiplier, outcome.profit
                ));
                self.timers.schedule(
                    Scope::Screen(Screen::Minebomb),
                    ROUND_HOLD,
                    Effect::MinebombBackToBetting,
                );
            }
            Err(err) => self.report_api_error("minebomb cashout", err),
        }
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    pub fn slots_spin(&mut self) {
        if self.slots.locked {
            return;
        }
        let Some(bet) = parse_bet(&self.slots.bet_input) else {
            self.push_errors(vec![String::from("Enter a bet amount first")]);
            return;
        };
        let round = self.begin_slots_round();
        let api = self.api.clone();
        let net_tx = self.net_tx.clone();
        tokio::spawn(async move {
            let result = api.slots_spin(bet).await;
            let _ = net_tx.send(NetEvent::Slots { round, result });
        });
    }

    fn begin_slots_round(&mut self) -> u64 {
        self.round_counter += 1;
        let round = self.round_counter;
        self.timers.cancel_scope(Scope::Screen(Screen::Slots));
        for tick in 1..=SLOTS_TICKS {
            self.timers.schedule(
                Scope::Screen(Screen::Slots),
                SLOTS_TICK * tick,
                Effect::SlotsAnimationTick,
            );
        }
        self.timers.schedule(
            Scope::Screen(Screen::Slots),
            SLOTS_SPIN_TIME,
            Effect::SlotsReveal,
        );
        let view = &mut self.slots;
        view.round = round;
        view.locked = true;
        view.pending = None;
        view.reveal_due = false;
        view.message = None;
        view.jackpot = None;
        round
    }

    fn apply_slots_outcome(&mut self, outcome: SlotsOutcome) {
        self.apply_money(outcome.money);
        self.state.stats = Some(outcome.stats);
        self.history_dirty = true;
        self.timers.schedule(
            Scope::Screen(Screen::Slots),
            ROUND_HOLD,
            Effect::SlotsClearMessage,
        );
        let view = &mut self.slots;
        view.reels = outcome.reels;
        view.reveal_due = false;
        view.jackpot = match outcome.multiplier {
            100 => Some("MEGA JACKPOT!"),
            50 => Some("JACKPOT!"),
            _ => None,
        };
        view.message = Some(match outcome.result {
            RoundResult::Win => {
                format!("You win {} $ (x{})!", outcome.profit, outcome.multiplier)
            }
            _ => String::from("No luck this time."),
        });
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    pub async fn reset_progress(&mut self) {
        match self.api.reset().await {
            Ok(outcome) => {
                self.apply_money(outcome.money);
                if let Some(stats) = outcome.stats {
                    self.state.stats = Some(stats);
                }
                match self.api.clicker_data().await {
                    Ok(snapshot) => self.state.clicker = snapshot,
                    Err(err) => self.report_api_error("clicker refresh", err),
                }
                self.history_dirty = true;
                self.back_to_menu();
                self.set_status("Progress reset");
            }
            Err(err) => self.report_api_error("reset", err),
        }
    }

    // ------------------------------------------------------------------
    // Timed effects and network completions
    // ------------------------------------------------------------------

    pub fn handle_net_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Roulette { round, result } => {
                if round != self.roulette.round || !self.roulette.locked {
                    tracing::debug!(round, "dropping superseded roulette outcome");
                    return;
                }
                match result {
                    Ok(outcome) => {
                        if self.roulette.reveal_due {
                            self.apply_roulette_outcome(outcome);
                        } else {
                            self.roulette.pending = Some(outcome);
                        }
                    }
                    Err(err) => {
                        self.timers.cancel_scope(Scope::Screen(Screen::Roulette));
                        self.roulette.locked = false;
                        self.roulette.reveal_due = false;
                        self.report_api_error("roulette spin", err);
                    }
                }
            }
            NetEvent::Slots { round, result } => {
                if round != self.slots.round || !self.slots.locked {
                    tracing::debug!(round, "dropping superseded slots outcome");
                    return;
                }
                match result {
                    Ok(outcome) => {
                        if self.slots.reveal_due {
                            self.apply_slots_outcome(outcome);
                        } else {
                            self.slots.pending = Some(outcome);
                        }
                    }
                    Err(err) => {
                        self.timers.cancel_scope(Scope::Screen(Screen::Slots));
                        self.slots.locked = false;
                        self.slots.reveal_due = false;
                        self.report_api_error("slots spin", err);
                    }
                }
            }
        }
    }

    pub fn process_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ClearMoneyPulse(seq) => {
                if seq == self.money_pulse_seq {
                    self.money_pulse = false;
                }
            }
            Effect::ClearClickPulse(seq) => {
                if seq == self.clicker_view.click_pulse_seq {
                    self.clicker_view.click_pulse = false;
                }
            }
            Effect::ExpireFloatingNumber(id) => {
                self.clicker_view.floating.retain(|number| number.id != id);
            }
            Effect::BlackjackBackToBetting => {
                reset_blackjack_round(&mut self.blackjack);
            }
            Effect::RouletteReveal => {
                self.roulette.reveal_due = true;
                if let Some(outcome) = self.roulette.pending.take() {
                    self.apply_roulette_outcome(outcome);
                }
            }
            Effect::RouletteClearMessage => {
                self.roulette.message = None;
                self.roulette.last_result = None;
            }
            Effect::MinebombRevealBomb(index) => {
                if self.minebomb.grid[index] == CellState::Hidden {
                    self.minebomb.grid[index] = CellState::Bomb;
                }
            }
            Effect::MinebombBackToBetting => {
                reset_minebomb_round(&mut self.minebomb);
            }
            Effect::SlotsAnimationTick => {
                if self.slots.locked && !self.slots.reveal_due {
                    let mut rng = rand::rng();
                    for reel in &mut self.slots.reels {
                        *reel =
                            SLOT_SYMBOLS[rng.random_range(0..SLOT_SYMBOLS.len())].to_string();
                    }
                }
            }
            Effect::SlotsReveal => {
                self.slots.reveal_due = true;
                if let Some(outcome) = self.slots.pending.take() {
                    self.apply_slots_outcome(outcome);
                }
            }
            Effect::SlotsClearMessage => {
                self.slots.message = None;
                self.slots.jackpot = None;
                self.slots.locked = false;
            }
        }
    }

    pub async fn handle_event(&mut self, event: ui::UserEvent) {
        use ui::UserEvent;
        match event {
            UserEvent::Quit | UserEvent::Redraw => {}
            UserEvent::OpenScreen(screen) => self.open_screen(screen),
            UserEvent::BackToMenu => self.back_to_menu(),
            UserEvent::ResetConfirmed => self.reset_progress().await,
            UserEvent::Click => self.click().await,
            UserEvent::BuyUpgrade(kind) => self.buy_upgrade(kind).await,
            UserEvent::BetDigit(digit) => self.push_bet_digit(digit),
            UserEvent::BetBackspace => self.pop_bet_digit(),
            UserEvent::BlackjackDeal => self.blackjack_deal().await,
            UserEvent::BlackjackHit => self.blackjack_hit().await,
            UserEvent::BlackjackStand => self.blackjack_stand().await,
            UserEvent::RouletteSelectColor(color) => self.roulette_select_color(color),
            UserEvent::RouletteToggleMode => self.roulette_toggle_mode(),
            UserEvent::RouletteNumberUp => self.roulette_number_up(),
            UserEvent::RouletteNumberDown => self.roulette_number_down(),
            UserEvent::RouletteSpin => self.roulette_spin(),
            UserEvent::MinebombBombsUp => self.minebomb_bombs_up(),
            UserEvent::MinebombBombsDown => self.minebomb_bombs_down(),
            UserEvent::MinebombMove(direction) => self.minebomb_move_cursor(direction),
            UserEvent::MinebombStart => self.minebomb_begin().await,
            UserEvent::MinebombReveal => self.minebomb_reveal().await,
            UserEvent::MinebombCashout => self.minebomb_cashout().await,
            UserEvent::SlotsSpin => self.slots_spin(),
        }
    }
}

fn reset_blackjack_round(view: &mut BlackjackView) {
    view.phase = BlackjackPhase::Betting;
    view.player_hand.clear();
    view.player_total = 0;
    view.dealer_hand.clear();
    view.dealer_total = None;
    view.num_decks = 0;
    view.message = None;
}

fn reset_minebomb_round(view: &mut MinebombView) {
    view.phase = MinebombPhase::Betting;
    view.grid = [CellState::Hidden; GRID_SIZE];
    view.multiplier = 1.0;
    view.potential_win = 0;
    view.diamonds_found = 0;
    view.cashout_enabled = false;
    view.message = None;
}

fn parse_bet(input: &str) -> Option<u64> {
    let amount: u64 = input.parse().ok()?;
    (amount > 0).then_some(amount)
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let api = ApiClient::new(&config.server_url)?;
    let (net_tx, net_rx) = mpsc::unbounded_channel();
    let mut controller = AppController::new(api, net_tx);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut controller, &mut ui_state, &mut input_events, net_rx).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    controller: &mut AppController,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
    mut net_rx: mpsc::UnboundedReceiver<NetEvent>,
) -> Result<()> {
    controller.bootstrap().await;
    let mut passive_ticker = time::interval(Duration::from_secs(1));
    passive_ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    ui::draw(ui_state, controller).wrap_err("initial draw failed")?;

    loop {
        let next_deadline = controller.timers.next_deadline();
        let quit = tokio::select! {
            _ = passive_ticker.tick() => {
                if controller.passive_collection_due() {
                    controller.collect_passive_income().await;
                }
                false
            }
            _ = sleep_until_deadline(next_deadline) => {
                for effect in controller.timers.pop_due(Instant::now()) {
                    controller.process_effect(effect);
                }
                false
            }
            maybe_net = net_rx.recv() => {
                if let Some(event) = maybe_net {
                    controller.handle_net_event(event);
                }
                false
            }
            _ = tokio::signal::ctrl_c() => true,
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                match ui::interpret_event(ui_state, event) {
                    None => false,
                    Some(ui::UserEvent::Quit) => true,
                    Some(user_event) => {
                        controller.handle_event(user_event).await;
                        false
                    }
                }
            }
        };
        if quit {
            break;
        }
        if controller.take_history_dirty() {
            controller.refresh_history().await;
        }
        ui::draw(ui_state, controller).wrap_err("draw failed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::api::{
        CellKind,
        GameStats,
        Suit,
    };

    fn test_controller() -> AppController {
        let (net_tx, _net_rx) = mpsc::unbounded_channel();
        let api = ApiClient::new("http://localhost:9").unwrap();
        AppController::new(api, net_tx)
    }

    fn empty_stats() -> StatsSnapshot {
        StatsSnapshot {
            total_games: 0,
            total_wins: 0,
            total_losses: 0,
            biggest_win: 0,
            biggest_loss: 0,
            total_wagered: 0,
            total_winnings: 0,
            blackjack: GameStats::default(),
            roulette: GameStats::default(),
            minebomb: GameStats::default(),
            slots: GameStats::default(),
        }
    }

    fn card(value: &str, suit: Suit) -> Card {
        Card {
            value: value.to_string(),
            suit,
        }
    }

    #[test]
    fn parse_bet__accepts_positive_integers_only() {
        assert_eq!(parse_bet("50"), Some(50));
        assert_eq!(parse_bet("0"), None);
        assert_eq!(parse_bet(""), None);
        assert_eq!(parse_bet("-5"), None);
        assert_eq!(parse_bet("abc"), None);
    }

    #[test]
    fn ingest_clicker_update__projects_server_values_verbatim() {
        // given
        let mut controller = test_controller();
        let snapshot = ClickerSnapshot {
            click_power: 7,
            click_level: 4,
            auto_level: 2,
            factory_level: 1,
            bank_level: 0,
            click_cost: 61,
            auto_cost: 112,
            factory_cost: 300,
            bank_cost: 1000,
            passive_income: 9,
        };

        // when
        controller.ingest_clicker_update(4321, snapshot.clone());

        // then
        assert_eq!(controller.state.money, Some(4321));
        assert_eq!(controller.state.clicker, snapshot);
        assert!(controller.money_pulse);
    }

    #[test]
    fn ingest_click__floats_the_click_power_from_the_cached_snapshot() {
        // given: the click response itself carries no snapshot
        let mut controller = test_controller();
        controller.state.clicker.click_power = 7;

        // when
        controller.ingest_click(1007);

        // then
        assert_eq!(controller.state.money, Some(1007));
        assert!(controller.clicker_view.click_pulse);
        assert_eq!(controller.clicker_view.floating.last().map(|n| n.amount), Some(7));
    }

    #[test]
    fn ingest_blackjack_start__keeps_the_dealer_hole_card_hidden() {
        // given: the server sends both dealer cards up front
        let mut controller = test_controller();
        let start = BlackjackStart {
            money: 950,
            num_decks: 4,
            player_hand: vec![card("9", Suit::Clubs), card("7", Suit::Diamonds)],
            player_total: 16,
            dealer_hand: vec![card("K", Suit::Spades), card("A", Suit::Hearts)],
        };

        // when
        controller.ingest_blackjack_start(start);

        // then: only the first dealer card reaches the view
        assert_eq!(controller.blackjack.dealer_hand.len(), 1);
        assert_eq!(controller.blackjack.dealer_hand[0].value, "K");
        assert_eq!(controller.blackjack.dealer_total, None);
        assert_eq!(controller.blackjack.phase, BlackjackPhase::InProgress);
    }

    #[test]
    fn passive_collection_due__only_while_the_server_rate_is_positive() {
        // given
        let mut controller = test_controller();

        // then
        assert!(!controller.passive_collection_due());

        // when
        controller.state.clicker.passive_income = 3;

        // then
        assert!(controller.passive_collection_due());
    }

    #[test]
    fn ingest_blackjack_hit__busted_triggers_resolution_exactly_once() {
        // given
        let mut controller = test_controller();
        controller.blackjack.phase = BlackjackPhase::InProgress;
        let busted_hit = BlackjackHit {
            player_hand: vec![
                card("K", Suit::Spades),
                card("Q", Suit::Hearts),
                card("5", Suit::Clubs),
            ],
            player_total: 25,
            busted: true,
        };

        // when
        let first = controller.ingest_blackjack_hit(busted_hit.clone());
        let second = controller.ingest_blackjack_hit(busted_hit);

        // then
        assert!(first);
        assert!(!second);
        assert_eq!(controller.blackjack.phase, BlackjackPhase::Resolved);
    }

    #[test]
    fn ingest_blackjack_hit__non_busted_hand_keeps_the_round_open() {
        // given
        let mut controller = test_controller();
        controller.blackjack.phase = BlackjackPhase::InProgress;
        let hit = BlackjackHit {
            player_hand: vec![card("2", Suit::Diamonds), card("3", Suit::Clubs)],
            player_total: 5,
            busted: false,
        };

        // when
        let must_resolve = controller.ingest_blackjack_hit(hit);

        // then
        assert!(!must_resolve);
        assert_eq!(controller.blackjack.phase, BlackjackPhase::InProgress);
    }

    #[test]
    fn blackjack_resolution__shows_the_dealer_and_schedules_the_table_reset() {
        // given
        let mut controller = test_controller();
        controller.blackjack.phase = BlackjackPhase::InProgress;
        let resolution = BlackjackResolution {
            dealer_hand: vec![card("10", Suit::Spades), card("9", Suit::Hearts)],
            dealer_total: 19,
            result: RoundResult::Win,
            profit: 50,
            money: 1050,
            stats: empty_stats(),
        };

        // when
        controller.ingest_blackjack_resolution(resolution);

        // then
        assert_eq!(controller.blackjack.phase, BlackjackPhase::Resolved);
        assert_eq!(controller.blackjack.dealer_total, Some(19));
        assert_eq!(controller.state.money, Some(1050));
        assert_eq!(
            controller.blackjack.message.as_deref(),
            Some("You win 50 $!")
        );

        // when
        controller.process_effect(Effect::BlackjackBackToBetting);

        // then
        assert_eq!(controller.blackjack.phase, BlackjackPhase::Betting);
        assert!(controller.blackjack.player_hand.is_empty());
        assert!(controller.blackjack.message.is_none());
    }

    #[test]
    fn minebomb_start_request__rejects_bomb_counts_outside_range() {
        // given
        let mut controller = test_controller();
        controller.minebomb.bet_input = String::from("50");

        // when / then
        controller.minebomb.bombs = 2;
        assert!(controller.minebomb_start_request().is_err());
        controller.minebomb.bombs = 11;
        assert!(controller.minebomb_start_request().is_err());
        controller.minebomb.bombs = 3;
        assert_eq!(controller.minebomb_start_request(), Ok((50, 3)));
        controller.minebomb.bombs = 10;
        assert_eq!(controller.minebomb_start_request(), Ok((50, 10)));
    }

    #[test]
    fn minebomb_can_reveal__is_false_for_an_already_revealed_cell() {
        // given
        let mut controller = test_controller();
        controller.minebomb.phase = MinebombPhase::Active;
        controller.ingest_minebomb_reveal(
            6,
            RevealOutcome::Safe {
                multiplier: 1.18,
                potential_win: 59,
                diamonds_found: 1,
            },
        );

        // then
        assert!(!controller.minebomb_can_reveal(6));
        assert!(controller.minebomb_can_reveal(7));
        assert!(controller.minebomb.cashout_enabled);
    }

    #[test]
    fn minebomb_bust__freezes_the_round_and_staggers_the_remaining_bombs() {
        // given
        let mut controller = test_controller();
        controller.minebomb.phase = MinebombPhase::Active;
        let mut layout = vec![CellKind::Safe; GRID_SIZE];
        layout[3] = CellKind::Bomb;
        layout[12] = CellKind::Bomb;
        layout[20] = CellKind::Bomb;

        // when
        controller.ingest_minebomb_reveal(
            12,
            RevealOutcome::Bomb {
                money: 950,
                grid: Some(layout),
                stats: empty_stats(),
            },
        );

        // then
        assert_eq!(controller.minebomb.phase, MinebombPhase::Busted);
        assert_eq!(controller.minebomb.grid[12], CellState::Bomb);
        assert!(!controller.minebomb.cashout_enabled);
        assert_eq!(controller.state.money, Some(950));
        // two staggered bomb reveals + table reset + money pulse
        assert_eq!(controller.timers.len(), 4);

        // when
        controller.process_effect(Effect::MinebombRevealBomb(3));
        controller.process_effect(Effect::MinebombRevealBomb(20));

        // then
        assert_eq!(controller.minebomb.grid[3], CellState::Bomb);
        assert_eq!(controller.minebomb.grid[20], CellState::Bomb);
    }

    #[test]
    fn roulette_spin_request__requires_a_color_in_color_mode() {
        // given
        let mut controller = test_controller();
        controller.roulette.bet_input = String::from("25");
        controller.roulette.mode = RouletteBetMode::Color;

        // when / then
        assert!(controller.roulette_spin_request().is_err());

        controller.state.selected_color = Some(RouletteColor::Red);
        assert_eq!(
            controller.roulette_spin_request(),
            Ok((25, RouletteChoice::Color(RouletteColor::Red)))
        );

        controller.roulette.mode = RouletteBetMode::Number;
        controller.roulette.number = 17;
        assert_eq!(
            controller.roulette_spin_request(),
            Ok((25, RouletteChoice::Number(17)))
        );
    }

    #[test]
    fn roulette_outcome__is_held_until_the_wheel_stops() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Roulette);
        let round = controller.begin_roulette_round();
        let outcome = RouletteOutcome {
            number: 17,
            color: String::from("Black"),
            result: RoundResult::Win,
            profit: 350,
            money: 1350,
            stats: empty_stats(),
        };

        // when: the response lands before the animation deadline
        controller.handle_net_event(NetEvent::Roulette {
            round,
            result: Ok(outcome),
        });

        // then
        assert!(controller.roulette.locked);
        assert!(controller.roulette.message.is_none());
        assert_eq!(controller.state.money, None);

        // when: the wheel stops
        controller.process_effect(Effect::RouletteReveal);

        // then
        assert!(!controller.roulette.locked);
        assert_eq!(controller.state.money, Some(1350));
        assert_eq!(
            controller.roulette.last_result,
            Some((17, String::from("Black")))
        );
        assert!(controller.roulette.message.as_deref().unwrap().contains("350 $"));
    }

    #[test]
    fn slots_outcome__waits_for_the_animation_window() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Slots);
        let round = controller.begin_slots_round();
        let outcome = SlotsOutcome {
            reels: [
                String::from("💎"),
                String::from("💎"),
                String::from("💎"),
            ],
            result: RoundResult::Win,
            profit: 990,
            multiplier: 100,
            money: 1990,
            stats: empty_stats(),
        };

        // when
        controller.handle_net_event(NetEvent::Slots {
            round,
            result: Ok(outcome),
        });

        // then: nothing shown before the reels stop
        assert!(controller.slots.message.is_none());
        assert_ne!(controller.slots.reels[0], "💎");

        // when
        controller.process_effect(Effect::SlotsReveal);

        // then
        assert_eq!(controller.slots.reels[0], "💎");
        assert_eq!(controller.slots.jackpot, Some("MEGA JACKPOT!"));
        assert_eq!(controller.state.money, Some(1990));
        assert!(controller.slots.locked);

        // when
        controller.process_effect(Effect::SlotsClearMessage);

        // then
        assert!(!controller.slots.locked);
        assert!(controller.slots.jackpot.is_none());
    }

    #[test]
    fn handle_net_event__drops_outcomes_from_a_superseded_round() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Slots);
        let stale_round = controller.begin_slots_round();
        let _fresh_round = controller.begin_slots_round();

        // when
        controller.handle_net_event(NetEvent::Slots {
            round: stale_round,
            result: Ok(SlotsOutcome {
                reels: [
                    String::from("🍋"),
                    String::from("🍋"),
                    String::from("🍋"),
                ],
                result: RoundResult::Win,
                profit: 140,
                multiplier: 15,
                money: 1140,
                stats: empty_stats(),
            }),
        });
        controller.process_effect(Effect::SlotsReveal);

        // then
        assert_eq!(controller.state.money, None);
        assert!(controller.slots.message.is_none());
    }

    #[test]
    fn back_to_menu__is_idempotent_and_drops_screen_timers() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Blackjack);
        controller.blackjack.phase = BlackjackPhase::InProgress;
        controller.ingest_blackjack_resolution(BlackjackResolution {
            dealer_hand: vec![card("A", Suit::Spades)],
            dealer_total: 21,
            result: RoundResult::Lose,
            profit: -50,
            money: 950,
            stats: empty_stats(),
        });
        // table reset + money pulse
        assert_eq!(controller.timers.len(), 2);

        // when
        controller.back_to_menu();
        controller.back_to_menu();

        // then: only the global money pulse survives
        assert_eq!(controller.screen, Screen::Menu);
        assert_eq!(controller.timers.len(), 1);
    }

    #[test]
    fn open_screen__abandons_a_roulette_round_in_flight() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Roulette);
        let round = controller.begin_roulette_round();

        // when
        controller.back_to_menu();
        controller.handle_net_event(NetEvent::Roulette {
            round,
            result: Ok(RouletteOutcome {
                number: 0,
                color: String::from("Green"),
                result: RoundResult::Lose,
                profit: -25,
                money: 975,
                stats: empty_stats(),
            }),
        });

        // then: the outcome is dropped and no roulette timer remains
        assert_eq!(controller.state.money, None);
        assert!(controller.roulette.message.is_none());
        assert_eq!(controller.timers.len(), 0);
    }

    #[test]
    fn push_bet_digit__ignores_input_while_a_round_is_locked() {
        // given
        let mut controller = test_controller();
        controller.open_screen(Screen::Slots);
        controller.slots.bet_input = String::from("10");
        controller.begin_slots_round();

        // when
        controller.push_bet_digit('5');

        // then
        assert_eq!(controller.slots.bet_input, "10");
    }

    #[test]
    fn minebomb_move_cursor__stays_inside_the_grid() {
        // given
        let mut controller = test_controller();
        controller.minebomb.cursor = 0;

        // when / then
        controller.minebomb_move_cursor(ui::GridDirection::Up);
        assert_eq!(controller.minebomb.cursor, 0);
        controller.minebomb_move_cursor(ui::GridDirection::Left);
        assert_eq!(controller.minebomb.cursor, 0);
        controller.minebomb_move_cursor(ui::GridDirection::Right);
        assert_eq!(controller.minebomb.cursor, 1);
        controller.minebomb_move_cursor(ui::GridDirection::Down);
        assert_eq!(controller.minebomb.cursor, 6);

        controller.minebomb.cursor = 24;
        controller.minebomb_move_cursor(ui::GridDirection::Down);
        assert_eq!(controller.minebomb.cursor, 24);
        controller.minebomb_move_cursor(ui::GridDirection::Right);
        assert_eq!(controller.minebomb.cursor, 24);
    }

    #[test]
    fn minebomb_bombs__clamp_to_the_allowed_range() {
        // given
        let mut controller = test_controller();

        // when
        for _ in 0..20 {
            controller.minebomb_bombs_up();
        }
        // then
        assert_eq!(controller.minebomb.bombs, MAX_BOMBS);

        // when
        for _ in 0..20 {
            controller.minebomb_bombs_down();
        }
        // then
        assert_eq!(controller.minebomb.bombs, MIN_BOMBS);
    }
}
