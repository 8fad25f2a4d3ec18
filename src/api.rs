use std::fmt;

use color_eyre::eyre::{
    Report,
    Result,
    WrapErr,
    eyre,
};
use serde::{
    Deserialize,
    de::DeserializeOwned,
};
use serde_json::json;

/// HTTP/JSON client for the casino portal server. One method per endpoint;
/// the server is authoritative for every balance and outcome.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

/// The two failure tiers of the portal contract: an application-level
/// rejection carries a message to show the player verbatim; everything else
/// (unreachable server, malformed payload) is a transport failure reported
/// as a generic connection error.
#[derive(Debug)]
pub enum ApiError {
    Rejected(String),
    Transport(Report),
}

impl ApiError {
    /// Text for the on-screen error panel.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(message) => message.clone(),
            ApiError::Transport(_) => String::from("Connection error"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rejected(message) => write!(f, "rejected: {message}"),
            ApiError::Transport(report) => write!(f, "transport: {report}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Suit {
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♠")]
    Spades,
}

impl Suit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub value: String,
    pub suit: Suit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Win,
    Lose,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouletteColor {
    Red,
    Black,
}

impl RouletteColor {
    /// Wire value; the server compares it against the winning color label.
    pub fn label(&self) -> &'static str {
        match self {
            RouletteColor::Red => "Red",
            RouletteColor::Black => "Black",
        }
    }
}

/// A roulette wager. Color bets send the color label, number bets send the
/// number itself; the server validates ranges either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouletteChoice {
    Color(RouletteColor),
    Number(u8),
}

impl RouletteChoice {
    pub fn mode_name(&self) -> &'static str {
        match self {
            RouletteChoice::Color(_) => "color",
            RouletteChoice::Number(_) => "number",
        }
    }

    fn wire_value(&self) -> serde_json::Value {
        match self {
            RouletteChoice::Color(color) => json!(color.label()),
            RouletteChoice::Number(number) => json!(number),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    Click,
    Auto,
    Factory,
    Bank,
}

impl UpgradeKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            UpgradeKind::Click => "click",
            UpgradeKind::Auto => "auto",
            UpgradeKind::Factory => "factory",
            UpgradeKind::Bank => "bank",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            UpgradeKind::Click => "Click power",
            UpgradeKind::Auto => "Auto-clicker",
            UpgradeKind::Factory => "Factory",
            UpgradeKind::Bank => "Bank",
        }
    }
}

/// Server-authoritative clicker snapshot, replaced wholesale on every
/// clicker response. The client never recomputes a cost or level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickerSnapshot {
    pub click_power: i64,
    pub click_level: i64,
    pub auto_level: i64,
    pub factory_level: i64,
    pub bank_level: i64,
    pub click_cost: i64,
    pub auto_cost: i64,
    pub factory_cost: i64,
    pub bank_cost: i64,
    pub passive_income: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GameStats {
    pub games: u64,
    pub wins: u64,
    pub wagered: i64,
    pub won: i64,
}

impl GameStats {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64 * 100.0
        }
    }

    pub fn profit(&self) -> i64 {
        self.won - self.wagered
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_games: u64,
    pub total_wins: u64,
    pub total_losses: u64,
    pub biggest_win: i64,
    pub biggest_loss: i64,
    pub total_wagered: i64,
    pub total_winnings: i64,
    pub blackjack: GameStats,
    pub roulette: GameStats,
    pub minebomb: GameStats,
    #[serde(default)]
    pub slots: GameStats,
}

impl StatsSnapshot {
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_games as f64 * 100.0
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MoneyUpdate {
    pub money: i64,
}

/// Upgrade responses carry the balance plus a fresh snapshot.
#[derive(Clone, Debug, Deserialize)]
struct ClickerUpdate {
    money: i64,
    #[serde(flatten)]
    snapshot: ClickerSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResetOutcome {
    pub money: i64,
    #[serde(default)]
    pub stats: Option<StatsSnapshot>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlackjackStart {
    pub money: i64,
    pub num_decks: u32,
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_hand: Vec<Card>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlackjackHit {
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub busted: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlackjackResolution {
    pub dealer_hand: Vec<Card>,
    pub dealer_total: u32,
    pub result: RoundResult,
    pub profit: i64,
    pub money: i64,
    pub stats: StatsSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouletteOutcome {
    pub number: u8,
    pub color: String,
    pub result: RoundResult,
    pub profit: i64,
    pub money: i64,
    pub stats: StatsSnapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Safe,
    Bomb,
}

/// Outcome of revealing one minebomb cell. The server labels safe cells
/// `diamond`; older deployments said `safe`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RevealOutcome {
    Bomb {
        money: i64,
        #[serde(default)]
        grid: Option<Vec<CellKind>>,
        stats: StatsSnapshot,
    },
    #[serde(alias = "diamond")]
    Safe {
        multiplier: f64,
        potential_win: i64,
        diamonds_found: u32,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct CashoutOutcome {
    pub profit: i64,
    pub multiplier: f64,
    pub money: i64,
    pub stats: StatsSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SlotsOutcome {
    pub reels: [String; 3],
    pub result: RoundResult,
    pub profit: i64,
    pub multiplier: i64,
    pub money: i64,
    pub stats: StatsSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryEntry {
    pub game_type: String,
    pub bet: i64,
    pub result: String,
    pub profit: i64,
    pub multiplier: f64,
    pub date: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .wrap_err("failed to build HTTP client for the portal server")?;
        Ok(Self { base_url, http })
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.get("/api/get_stats").await
    }

    pub async fn clicker_data(&self) -> Result<ClickerSnapshot, ApiError> {
        self.get("/api/clicker/get_data").await
    }

    // The click response carries only the balance, not a snapshot.
    pub async fn click(&self) -> Result<MoneyUpdate, ApiError> {
        self.post("/api/clicker/click", json!({})).await
    }

    pub async fn buy_upgrade(
        &self,
        kind: UpgradeKind,
    ) -> Result<(i64, ClickerSnapshot), ApiError> {
        let response: ClickerUpdate = self
            .post("/api/clicker/upgrade", json!({"type": kind.wire_name()}))
            .await?;
        Ok((response.money, response.snapshot))
    }

    pub async fn passive_income(&self) -> Result<MoneyUpdate, ApiError> {
        self.post("/api/clicker/passive", json!({})).await
    }

    pub async fn reset(&self) -> Result<ResetOutcome, ApiError> {
        self.post("/api/reset", json!({})).await
    }

    pub async fn blackjack_start(&self, bet: u64) -> Result<BlackjackStart, ApiError> {
        self.post("/api/blackjack/start", json!({"bet": bet})).await
    }

    pub async fn blackjack_hit(&self) -> Result<BlackjackHit, ApiError> {
        self.post("/api/blackjack/hit", json!({})).await
    }

    pub async fn blackjack_stand(&self) -> Result<BlackjackResolution, ApiError> {
        self.post("/api/blackjack/stand", json!({})).await
    }

    pub async fn roulette_spin(
        &self,
        bet: u64,
        choice: RouletteChoice,
    ) -> Result<RouletteOutcome, ApiError> {
        self.post(
            "/api/roulette/spin",
            json!({
                "bet": bet,
                "mode": choice.mode_name(),
                "choice": choice.wire_value(),
            }),
        )
        .await
    }

    pub async fn minebomb_start(
        &self,
        bet: u64,
        bombs: u8,
    ) -> Result<MoneyUpdate, ApiError> {
        self.post("/api/minebomb/start", json!({"bet": bet, "bombs": bombs}))
            .await
    }

    pub async fn minebomb_reveal(&self, index: usize) -> Result<RevealOutcome, ApiError> {
        self.post("/api/minebomb/reveal", json!({"index": index}))
            .await
    }

    pub async fn minebomb_cashout(&self) -> Result<CashoutOutcome, ApiError> {
        self.post("/api/minebomb/cashout", json!({})).await
    }

    pub async fn slots_spin(&self, bet: u64) -> Result<SlotsOutcome, ApiError> {
        self.post("/api/slots/spin", json!({"bet": bet})).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get("/api/history").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.get(url);
        self.execute(request, path).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.post(url).json(&body);
        self.execute(request, path).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|err| {
            ApiError::Transport(
                Report::new(err).wrap_err(format!("request to {path} failed")),
            )
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            ApiError::Transport(
                Report::new(err)
                    .wrap_err(format!("failed to read response body from {path}")),
            )
        })?;
        if !status.is_success() {
            // Application rejections carry `{error}`; anything else is noise.
            if let Ok(body) = serde_json::from_slice::<ErrorBody>(&bytes) {
                return Err(ApiError::Rejected(body.error));
            }
            let body = String::from_utf8_lossy(&bytes);
            return Err(ApiError::Transport(eyre!(
                "server responded with {status} to {path}: {body}"
            )));
        }
        serde_json::from_slice(&bytes).map_err(|err| {
            ApiError::Transport(
                Report::new(err).wrap_err(format!("invalid payload from {path}")),
            )
        })
    }
}

impl fmt::Display for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn stats_snapshot__decodes_camel_case_totals_and_per_game_blocks() {
        // given
        let payload = serde_json::json!({
            "totalGames": 12,
            "totalWins": 5,
            "totalLosses": 7,
            "biggestWin": 700,
            "biggestLoss": 250,
            "totalWagered": 1200,
            "totalWinnings": 900,
            "blackjack": {"games": 4, "wins": 2, "wagered": 400, "won": 350},
            "roulette": {"games": 3, "wins": 1, "wagered": 300, "won": 200},
            "minebomb": {"games": 3, "wins": 1, "wagered": 300, "won": 250},
            "slots": {"games": 2, "wins": 1, "wagered": 200, "won": 100}
        });

        // when
        let stats: StatsSnapshot = serde_json::from_value(payload).unwrap();

        // then
        assert_eq!(stats.total_games, 12);
        assert_eq!(stats.biggest_loss, 250);
        assert_eq!(stats.blackjack.games, 4);
        assert_eq!(stats.slots.wins, 1);
        assert_eq!(stats.blackjack.profit(), -50);
    }

    #[test]
    fn stats_snapshot__tolerates_missing_slots_block() {
        // given
        let payload = serde_json::json!({
            "totalGames": 0,
            "totalWins": 0,
            "totalLosses": 0,
            "biggestWin": 0,
            "biggestLoss": 0,
            "totalWagered": 0,
            "totalWinnings": 0,
            "blackjack": {"games": 0, "wins": 0, "wagered": 0, "won": 0},
            "roulette": {"games": 0, "wins": 0, "wagered": 0, "won": 0},
            "minebomb": {"games": 0, "wins": 0, "wagered": 0, "won": 0}
        });

        // when
        let stats: StatsSnapshot = serde_json::from_value(payload).unwrap();

        // then
        assert_eq!(stats.slots.games, 0);
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn reveal_outcome__decodes_bomb_with_disclosed_grid() {
        // given
        let payload = serde_json::json!({
            "type": "bomb",
            "money": 950,
            "grid": ["safe", "bomb", "safe"],
            "stats": {
                "totalGames": 1, "totalWins": 0, "totalLosses": 1,
                "biggestWin": 0, "biggestLoss": 50,
                "totalWagered": 50, "totalWinnings": 0,
                "blackjack": {"games": 0, "wins": 0, "wagered": 0, "won": 0},
                "roulette": {"games": 0, "wins": 0, "wagered": 0, "won": 0},
                "minebomb": {"games": 1, "wins": 0, "wagered": 50, "won": 0},
                "slots": {"games": 0, "wins": 0, "wagered": 0, "won": 0}
            }
        });

        // when
        let outcome: RevealOutcome = serde_json::from_value(payload).unwrap();

        // then
        match outcome {
            RevealOutcome::Bomb { money, grid, .. } => {
                assert_eq!(money, 950);
                assert_eq!(
                    grid,
                    Some(vec![CellKind::Safe, CellKind::Bomb, CellKind::Safe])
                );
            }
            RevealOutcome::Safe { .. } => panic!("expected a bomb outcome"),
        }
    }

    #[test]
    fn reveal_outcome__accepts_diamond_label_for_safe_cells() {
        // given
        let payload = serde_json::json!({
            "type": "diamond",
            "multiplier": 1.18,
            "potential_win": 59,
            "diamonds_found": 2
        });

        // when
        let outcome: RevealOutcome = serde_json::from_value(payload).unwrap();

        // then
        match outcome {
            RevealOutcome::Safe {
                multiplier,
                potential_win,
                diamonds_found,
            } => {
                assert!((multiplier - 1.18).abs() < f64::EPSILON);
                assert_eq!(potential_win, 59);
                assert_eq!(diamonds_found, 2);
            }
            RevealOutcome::Bomb { .. } => panic!("expected a safe outcome"),
        }
    }

    #[test]
    fn card__decodes_suit_symbols_and_flags_red_suits() {
        // given
        let payload = serde_json::json!([
            {"value": "A", "suit": "♥"},
            {"value": "10", "suit": "♠"}
        ]);

        // when
        let hand: Vec<Card> = serde_json::from_value(payload).unwrap();

        // then
        assert!(hand[0].suit.is_red());
        assert!(!hand[1].suit.is_red());
        assert_eq!(hand[0].suit.symbol(), "♥");
    }

    #[test]
    fn money_update__decodes_the_bare_click_payload() {
        // given
        let payload = serde_json::json!({"money": 990});

        // when
        let update: MoneyUpdate = serde_json::from_value(payload).unwrap();

        // then
        assert_eq!(update.money, 990);
    }

    #[test]
    fn clicker_update__flattens_snapshot_next_to_money() {
        // given
        let payload = serde_json::json!({
            "money": 990,
            "clickPower": 2,
            "clickLevel": 2,
            "autoLevel": 0,
            "factoryLevel": 0,
            "bankLevel": 0,
            "clickCost": 15,
            "autoCost": 50,
            "factoryCost": 200,
            "bankCost": 1000,
            "passiveIncome": 0
        });

        // when
        let response: ClickerUpdate = serde_json::from_value(payload).unwrap();

        // then
        assert_eq!(response.money, 990);
        assert_eq!(response.snapshot.click_power, 2);
        assert_eq!(response.snapshot.click_cost, 15);
    }
}
