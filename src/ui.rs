use crate::api::{
    Card,
    RouletteColor,
    UpgradeKind,
};
use crate::client::{
    AppController,
    BlackjackPhase,
    CellState,
    MinebombPhase,
    RouletteBetMode,
    Screen,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{prelude::*, widgets::*};
use std::io::stdout;

pub enum UserEvent {
    Quit,
    Redraw,
    OpenScreen(Screen),
    BackToMenu,
    ResetConfirmed,
    Click,
    BuyUpgrade(UpgradeKind),
    BetDigit(char),
    BetBackspace,
    BlackjackDeal,
    BlackjackHit,
    BlackjackStand,
    RouletteSelectColor(RouletteColor),
    RouletteToggleMode,
    RouletteNumberUp,
    RouletteNumberDown,
    RouletteSpin,
    MinebombBombsUp,
    MinebombBombsDown,
    MinebombMove(GridDirection),
    MinebombStart,
    MinebombReveal,
    MinebombCashout,
    SlotsSpin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug)]
pub struct UiState {
    mode: Mode,
    screen: Screen,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            screen: Screen::Menu,
            terminal: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
    ResetModal,
}

pub type InputEventReceiver = EventStream;

pub fn input_event_stream() -> InputEventReceiver {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    match events.next().await {
        Some(Ok(event)) => Ok(event),
        Some(Err(err)) => Err(err.into()),
        None => Err(eyre!("input event stream closed")),
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

/// Maps a raw terminal event to a user intent, given the modal state and the
/// screen shown at the last draw. Returns None for events that mean nothing.
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let key = match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => key,
        Event::Resize(_, _) => return Some(UserEvent::Redraw),
        _ => return None,
    };

    match state.mode {
        Mode::QuitModal => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(UserEvent::Quit)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::ResetModal => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                state.mode = Mode::Normal;
                Some(UserEvent::ResetConfirmed)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Normal => match state.screen {
            Screen::Menu => match key.code {
                KeyCode::Char('1') => Some(UserEvent::OpenScreen(Screen::Clicker)),
                KeyCode::Char('2') => Some(UserEvent::OpenScreen(Screen::Blackjack)),
                KeyCode::Char('3') => Some(UserEvent::OpenScreen(Screen::Roulette)),
                KeyCode::Char('4') => Some(UserEvent::OpenScreen(Screen::Minebomb)),
                KeyCode::Char('5') => Some(UserEvent::OpenScreen(Screen::Slots)),
                KeyCode::Char('r') => {
                    state.mode = Mode::ResetModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            },
            Screen::Clicker => match key.code {
                KeyCode::Esc => Some(UserEvent::BackToMenu),
                KeyCode::Char('q') => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char(' ') | KeyCode::Enter => Some(UserEvent::Click),
                KeyCode::Char('1') => Some(UserEvent::BuyUpgrade(UpgradeKind::Click)),
                KeyCode::Char('2') => Some(UserEvent::BuyUpgrade(UpgradeKind::Auto)),
                KeyCode::Char('3') => Some(UserEvent::BuyUpgrade(UpgradeKind::Factory)),
                KeyCode::Char('4') => Some(UserEvent::BuyUpgrade(UpgradeKind::Bank)),
                _ => None,
            },
            Screen::Blackjack => match key.code {
                KeyCode::Esc => Some(UserEvent::BackToMenu),
                KeyCode::Char('q') => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Enter => Some(UserEvent::BlackjackDeal),
                KeyCode::Char('h') => Some(UserEvent::BlackjackHit),
                KeyCode::Char('s') => Some(UserEvent::BlackjackStand),
                KeyCode::Backspace => Some(UserEvent::BetBackspace),
                KeyCode::Char(c) if c.is_ascii_digit() => Some(UserEvent::BetDigit(c)),
                _ => None,
            },
            Screen::Roulette => match key.code {
                KeyCode::Esc => Some(UserEvent::BackToMenu),
                KeyCode::Char('q') => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char('r') => {
                    Some(UserEvent::RouletteSelectColor(RouletteColor::Red))
                }
                KeyCode::Char('b') => {
                    Some(UserEvent::RouletteSelectColor(RouletteColor::Black))
                }
                KeyCode::Char('m') => Some(UserEvent::RouletteToggleMode),
                KeyCode::Up => Some(UserEvent::RouletteNumberUp),
                KeyCode::Down => Some(UserEvent::RouletteNumberDown),
                KeyCode::Enter => Some(UserEvent::RouletteSpin),
                KeyCode::Backspace => Some(UserEvent::BetBackspace),
                KeyCode::Char(c) if c.is_ascii_digit() => Some(UserEvent::BetDigit(c)),
                _ => None,
            },
            Screen::Minebomb => match key.code {
                KeyCode::Esc => Some(UserEvent::BackToMenu),
                KeyCode::Char('q') => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Up => Some(UserEvent::MinebombMove(GridDirection::Up)),
                KeyCode::Down => Some(UserEvent::MinebombMove(GridDirection::Down)),
                KeyCode::Left => Some(UserEvent::MinebombMove(GridDirection::Left)),
                KeyCode::Right => Some(UserEvent::MinebombMove(GridDirection::Right)),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    Some(UserEvent::MinebombBombsUp)
                }
                KeyCode::Char('-') => Some(UserEvent::MinebombBombsDown),
                KeyCode::Enter => Some(UserEvent::MinebombStart),
                KeyCode::Char(' ') => Some(UserEvent::MinebombReveal),
                KeyCode::Char('c') => Some(UserEvent::MinebombCashout),
                KeyCode::Backspace => Some(UserEvent::BetBackspace),
                KeyCode::Char(c) if c.is_ascii_digit() => Some(UserEvent::BetDigit(c)),
                _ => None,
            },
            Screen::Slots => match key.code {
                KeyCode::Esc => Some(UserEvent::BackToMenu),
                KeyCode::Char('q') => {
                    state.mode = Mode::QuitModal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Enter => Some(UserEvent::SlotsSpin),
                KeyCode::Backspace => Some(UserEvent::BetBackspace),
                KeyCode::Char(c) if c.is_ascii_digit() => Some(UserEvent::BetDigit(c)),
                _ => None,
            },
        },
    }
}

pub fn draw(state: &mut UiState, app: &AppController) -> Result<()> {
    // Cache the screen so key interpretation matches what is on display.
    state.screen = app.screen;
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, app))?;
        state.terminal = Some(term);
    }
    Ok(())
}

fn ui(f: &mut Frame, state: &UiState, app: &AppController) {
    // Clear the whole frame to avoid leftover fragments
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // money bar
            Constraint::Min(14),   // screen body
            Constraint::Length(5), // status/errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_money_bar(f, chunks[0], app);
    match app.screen {
        Screen::Menu => draw_menu(f, chunks[1], app),
        Screen::Clicker => draw_clicker(f, chunks[1], app),
        Screen::Blackjack => draw_blackjack(f, chunks[1], app),
        Screen::Roulette => draw_roulette(f, chunks[1], app),
        Screen::Minebomb => draw_minebomb(f, chunks[1], app),
        Screen::Slots => draw_slots(f, chunks[1], app),
    }
    draw_status(f, chunks[2], app);
    draw_help(f, chunks[3], app);
    draw_modals(f, state);
}

// Amount first, currency sign after, matching the portal's display order.
fn money_text(money: Option<i64>) -> String {
    match money {
        Some(money) => format!("{money} $"),
        None => String::from("-- $"),
    }
}

fn draw_money_bar(f: &mut Frame, area: Rect, app: &AppController) {
    let style = if app.money_pulse {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let widget = Paragraph::new(Span::styled(money_text(app.state.money), style)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.screen.title()),
    );
    f.render_widget(widget, area);
}

fn draw_menu(f: &mut Frame, area: Rect, app: &AppController) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let games = Paragraph::new(vec![
        Line::from("1  Money Clicker"),
        Line::from("2  Blackjack"),
        Line::from("3  Roulette"),
        Line::from("4  Minebomb"),
        Line::from("5  Slots"),
        Line::from(""),
        Line::from("r  Reset progress"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Games"));
    f.render_widget(games, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(columns[1]);
    draw_stats_panel(f, right[0], app);
    draw_history_panel(f, right[1], app);
}

fn draw_stats_panel(f: &mut Frame, area: Rect, app: &AppController) {
    let lines = match &app.state.stats {
        Some(stats) => vec![
            Line::from(format!(
                "Games: {} | Wins: {} | Losses: {} | Win rate: {:.1}%",
                stats.total_games,
                stats.total_wins,
                stats.total_losses,
                stats.win_rate()
            )),
            Line::from(format!(
                "Wagered: {} $ | Winnings: {} $ | Biggest win: {} $ | Biggest loss: {} $",
                stats.total_wagered,
                stats.total_winnings,
                stats.biggest_win,
                stats.biggest_loss
            )),
            Line::from(format!(
                "Blackjack {:.0}% | Roulette {:.0}% | Minebomb {:.0}% | Slots {:.0}%",
                stats.blackjack.win_rate(),
                stats.roulette.win_rate(),
                stats.minebomb.win_rate(),
                stats.slots.win_rate()
            )),
        ],
        None => vec![Line::from("No stats yet")],
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
    f.render_widget(widget, area);
}

fn draw_history_panel(f: &mut Frame, area: Rect, app: &AppController) {
    let mut lines: Vec<Line> = Vec::new();
    if app.state.history.is_empty() {
        lines.push(Line::from("No games played yet"));
    } else {
        for entry in &app.state.history {
            let style = if entry.profit >= 0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            lines.push(Line::styled(
                format!(
                    "{} | {} | bet {} $ | {} | {:+} $",
                    entry.date, entry.game_type, entry.bet, entry.result, entry.profit
                ),
                style,
            ));
        }
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recent Games"));
    f.render_widget(widget, area);
}

fn draw_clicker(f: &mut Frame, area: Rect, app: &AppController) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let snap = &app.state.clicker;
    let view = &app.clicker_view;
    let button_style = if view.click_pulse {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut lines = vec![
        Line::from(""),
        Line::styled(format!("[ CLICK: +{} $ ]", snap.click_power), button_style),
        Line::from(""),
    ];
    for number in &view.floating {
        lines.push(Line::styled(
            format!("  +{} $", number.amount),
            Style::default().fg(Color::Green),
        ));
    }
    let button = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(button_style)
            .title(format!("Passive: {} $/s", snap.passive_income)),
    );
    f.render_widget(button, columns[0]);

    let upgrades = Paragraph::new(vec![
        Line::from(format!(
            "1  Click power  lvl {}  ({} $)",
            snap.click_level, snap.click_cost
        )),
        Line::from(format!(
            "2  Auto-clicker lvl {}  ({} $)",
            snap.auto_level, snap.auto_cost
        )),
        Line::from(format!(
            "3  Factory      lvl {}  ({} $)",
            snap.factory_level, snap.factory_cost
        )),
        Line::from(format!(
            "4  Bank         lvl {}  ({} $)",
            snap.bank_level, snap.bank_cost
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("Upgrades"));
    f.render_widget(upgrades, columns[1]);
}

fn hand_line(hand: &[Card]) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();
    for card in hand {
        let style = if card.suit.is_red() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!("{}{} ", card.value, card.suit.symbol()),
            style,
        ));
    }
    if spans.is_empty() {
        spans.push(Span::raw("--"));
    }
    Line::from(spans)
}

fn draw_blackjack(f: &mut Frame, area: Rect, app: &AppController) {
    let view = &app.blackjack;
    let mut lines: Vec<Line> = Vec::new();

    let dealer_total = match view.dealer_total {
        Some(total) => format!(" ({total})"),
        None if view.phase == BlackjackPhase::InProgress => String::from(" (?)"),
        None => String::new(),
    };
    lines.push(Line::from(format!("Dealer{dealer_total}:")));
    let mut dealer_line = hand_line(&view.dealer_hand);
    if view.phase == BlackjackPhase::InProgress {
        // Second dealer card stays face down until the round resolves.
        dealer_line.push_span(Span::raw("🂠"));
    }
    lines.push(dealer_line);
    lines.push(Line::from(""));
    let player_total = if view.player_hand.is_empty() {
        String::new()
    } else {
        format!(" ({})", view.player_total)
    };
    lines.push(Line::from(format!("You{player_total}:")));
    lines.push(hand_line(&view.player_hand));
    lines.push(Line::from(""));
    if view.phase == BlackjackPhase::Betting {
        lines.push(Line::from(format!("Bet: {}_", view.bet_input)));
    } else if view.num_decks > 0 {
        lines.push(Line::from(format!("Decks in shoe: {}", view.num_decks)));
    }
    if let Some(message) = &view.message {
        lines.push(Line::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Table"));
    f.render_widget(widget, area);
}

fn draw_roulette(f: &mut Frame, area: Rect, app: &AppController) {
    let view = &app.roulette;
    let mut lines: Vec<Line> = Vec::new();

    let wager = match view.mode {
        RouletteBetMode::Color => {
            let color = match app.state.selected_color {
                Some(RouletteColor::Red) => {
                    Span::styled("Red", Style::default().fg(Color::Red))
                }
                Some(RouletteColor::Black) => Span::styled(
                    "Black",
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                None => Span::raw("none"),
            };
            Line::from(vec![Span::raw("Betting on color: "), color])
        }
        RouletteBetMode::Number => {
            Line::from(format!("Betting on number: {}", view.number))
        }
    };
    lines.push(wager);
    lines.push(Line::from(format!("Bet: {}_", view.bet_input)));
    lines.push(Line::from(""));

    if view.locked && view.last_result.is_none() {
        lines.push(Line::styled(
            "Spinning...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else if let Some((number, color)) = &view.last_result {
        let style = match color.as_str() {
            "Red" => Style::default().fg(Color::Red),
            "Green" => Style::default().fg(Color::Green),
            _ => Style::default().add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(vec![
            Span::raw("Result: "),
            Span::styled(format!("{number} {color}"), style),
        ]));
    }
    if let Some(message) = &view.message {
        lines.push(Line::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Wheel"));
    f.render_widget(widget, area);
}

fn draw_minebomb(f: &mut Frame, area: Rect, app: &AppController) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(area);

    let view = &app.minebomb;
    let grid_area = columns[0];
    let cell_w = (grid_area.width.saturating_sub(2) / 5).max(3);
    let cell_h = (grid_area.height.saturating_sub(2) / 5).max(1);
    let grid_block = Block::default().borders(Borders::ALL).title("Field");
    let inner = grid_block.inner(grid_area);
    f.render_widget(grid_block, grid_area);
    for (index, cell) in view.grid.iter().enumerate() {
        let row = (index / 5) as u16;
        let col = (index % 5) as u16;
        let rect = Rect::new(
            inner.x + col * cell_w,
            inner.y + row * cell_h,
            cell_w,
            cell_h,
        );
        if rect.bottom() > inner.bottom() || rect.right() > inner.right() {
            continue;
        }
        let symbol = match cell {
            CellState::Hidden => "■",
            CellState::Safe => "💎",
            CellState::Bomb => "💣",
        };
        let style = if index == view.cursor && view.phase == MinebombPhase::Active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        f.render_widget(Paragraph::new(Span::styled(symbol, style)), rect);
    }

    let mut lines = vec![Line::from(format!("Bombs: {} (+/- to change)", view.bombs))];
    match view.phase {
        MinebombPhase::Betting => {
            lines.push(Line::from(format!("Bet: {}_", view.bet_input)));
        }
        MinebombPhase::Active => {
            lines.push(Line::from(format!("Multiplier: x{:.2}", view.multiplier)));
            lines.push(Line::from(format!("Potential win: {} $", view.potential_win)));
            lines.push(Line::from(format!("Diamonds: {}", view.diamonds_found)));
            if view.cashout_enabled {
                lines.push(Line::styled(
                    "c to cash out",
                    Style::default().fg(Color::Green),
                ));
            }
        }
        MinebombPhase::Busted | MinebombPhase::CashedOut => {}
    }
    if let Some(message) = &view.message {
        lines.push(Line::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let info = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Round"));
    f.render_widget(info, columns[1]);
}

fn draw_slots(f: &mut Frame, area: Rect, app: &AppController) {
    let view = &app.slots;
    let reel_style = if view.locked {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut lines = vec![
        Line::from(""),
        Line::styled(
            format!(
                "| {} | {} | {} |",
                view.reels[0], view.reels[1], view.reels[2]
            ),
            reel_style,
        ),
        Line::from(""),
        Line::from(format!("Bet: {}_", view.bet_input)),
    ];
    if let Some(jackpot) = view.jackpot {
        lines.push(Line::styled(
            jackpot,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(message) = &view.message {
        lines.push(Line::styled(
            message.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Reels"));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &AppController) {
    let status_widget = if app.errors.is_empty() {
        let mut lines: Vec<Line> = Vec::new();
        if app.status.trim().is_empty() {
            lines.push(Line::from("Ready"));
        } else {
            for line in app.status.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for e in &app.errors {
            lines.push(Line::from(e.clone()));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(status_widget, area);
}

fn draw_help(f: &mut Frame, area: Rect, app: &AppController) {
    let text = match app.screen {
        Screen::Menu => "1-5 open game | r reset | q/Esc quit",
        Screen::Clicker => {
            "Space click | 1-4 buy upgrade | Esc menu | q quit"
        }
        Screen::Blackjack => {
            "digits bet | Enter deal | h hit | s stand | Esc menu | q quit"
        }
        Screen::Roulette => {
            "digits bet | r red | b black | m mode | ↑/↓ number | Enter spin | Esc menu"
        }
        Screen::Minebomb => {
            "digits bet | +/- bombs | Enter start | ←↑↓→ move | Space reveal | c cash out | Esc menu"
        }
        Screen::Slots => "digits bet | Enter spin | Esc menu | q quit",
    };
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match state.mode {
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the game? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::ResetModal => {
            let area = centered_rect(50, 20, f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Confirm Reset");
            let p = Paragraph::new(
                "Reset all progress and go back to 1000 $? (Y/N)",
            )
            .wrap(Wrap { trim: false });
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn interpret_event__menu_digits_open_the_matching_screen() {
        // given
        let mut state = UiState::default();

        // when / then
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char('1'))),
            Some(UserEvent::OpenScreen(Screen::Clicker))
        ));
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char('5'))),
            Some(UserEvent::OpenScreen(Screen::Slots))
        ));
    }

    #[test]
    fn interpret_event__quit_needs_confirmation_through_the_modal() {
        // given
        let mut state = UiState::default();

        // when
        let opened = interpret_event(&mut state, press(KeyCode::Char('q')));
        let declined = interpret_event(&mut state, press(KeyCode::Char('n')));
        let reopened = interpret_event(&mut state, press(KeyCode::Esc));
        let confirmed = interpret_event(&mut state, press(KeyCode::Char('y')));

        // then
        assert!(matches!(opened, Some(UserEvent::Redraw)));
        assert!(matches!(declined, Some(UserEvent::Redraw)));
        assert!(matches!(reopened, Some(UserEvent::Redraw)));
        assert!(matches!(confirmed, Some(UserEvent::Quit)));
    }

    #[test]
    fn interpret_event__reset_fires_only_after_confirmation() {
        // given
        let mut state = UiState::default();

        // when
        interpret_event(&mut state, press(KeyCode::Char('r')));
        let confirmed = interpret_event(&mut state, press(KeyCode::Char('y')));
        let after = interpret_event(&mut state, press(KeyCode::Char('y')));

        // then
        assert!(matches!(confirmed, Some(UserEvent::ResetConfirmed)));
        assert!(after.is_none());
    }

    #[test]
    fn interpret_event__escape_on_a_game_screen_returns_to_the_menu() {
        // given
        let mut state = UiState {
            screen: Screen::Roulette,
            ..UiState::default()
        };

        // when / then
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Esc)),
            Some(UserEvent::BackToMenu)
        ));
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char('7'))),
            Some(UserEvent::BetDigit('7'))
        ));
    }

    #[test]
    fn money_text__puts_the_amount_before_the_currency_sign() {
        assert_eq!(money_text(Some(1350)), "1350 $");
        assert_eq!(money_text(None), "-- $");
    }

    #[test]
    fn interpret_event__ignores_key_releases() {
        // given
        let mut state = UiState::default();
        let mut release = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        // when / then
        assert!(interpret_event(&mut state, Event::Key(release)).is_none());
    }
}
