use crate::store::LocalBalanceStore;
use crate::utils::*;
use clap::Args;
use mines_core as game;
use mines_core::{BalanceStore, MineGenerator};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

type GameSession = game::Session<game::RandomMineGenerator, LocalBalanceStore>;

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewTileState {
    Hidden,
    Coin,
    TriggeredMine,
    Mine,
}

fn tile_state_at<G, S>(session: &game::Session<G, S>, index: game::CellIndex) -> ViewTileState
where
    G: MineGenerator,
    S: BalanceStore,
{
    if session.is_revealed(index) {
        return ViewTileState::Coin;
    }
    if session.triggered_mine() == Some(index) {
        return ViewTileState::TriggeredMine;
    }
    match session.exposed_mines() {
        Some(mines) if mines.contains(index) => ViewTileState::Mine,
        _ => ViewTileState::Hidden,
    }
}

/// The board shows `1.00` before the first hit instead of the zero payout factor.
fn format_multiplier(multiplier: game::Multiplier) -> String {
    if multiplier.is_zero() {
        "1.00".to_string()
    } else {
        multiplier.to_string()
    }
}

fn format_next_multiplier(multiplier: Option<game::Multiplier>) -> String {
    multiplier.map_or_else(|| "N/A".to_string(), |multiplier| multiplier.to_string())
}

fn parse_bet(input: &str) -> game::Result<game::Credits> {
    input
        .trim()
        .parse()
        .map_err(|_| game::SessionError::InvalidBet)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Render(game::Snapshot),
    BetInput(String),
    SelectBombs(game::CellCount),
    PlaceBet,
    Reveal(game::CellIndex),
    CashOut,
    Restart,
    ResetCredits,
}

#[derive(Properties, Clone, PartialEq)]
struct TileProps {
    index: game::CellIndex,
    tile_state: ViewTileState,
    #[prop_or_default]
    locked: bool,
    callback: Callback<game::CellIndex>,
}

#[function_component(TileView)]
fn tile_component(props: &TileProps) -> Html {
    use ViewTileState::*;

    let TileProps {
        index,
        tile_state,
        locked,
        callback,
    } = props.clone();

    let mut class = classes!(
        "tile",
        match tile_state {
            Hidden => classes!(),
            Coin => classes!("open", "coin"),
            TriggeredMine => classes!("open", "mine", "oops"),
            Mine => classes!("open", "mine"),
        }
    );
    if locked {
        class.push("locked");
    }

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("tile {} clicked", index);
        callback.emit(index);
    });

    html! {
        <div {class} {onclick} data-index={index.to_string()}/>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Side of the square board
    #[arg(long)]
    pub(crate) grid_size: Option<game::Coord>,

    /// Bomb count preselected for new rounds
    #[arg(long)]
    pub(crate) bombs: Option<game::CellCount>,
}

impl GameProps {
    fn config(&self) -> game::SessionConfig {
        let defaults = game::SessionConfig::default();
        let config = game::SessionConfig {
            grid_size: self.grid_size.unwrap_or(defaults.grid_size),
            bomb_count: self.bombs.unwrap_or(defaults.bomb_count),
            ..defaults
        };
        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{}, falling back to defaults", err);
                defaults
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: GameSession,
    snapshot: game::Snapshot,
    bet_input: String,
    bomb_count: game::CellCount,
    status: Option<String>,
}

impl GameView {
    fn report(&mut self, result: game::Result<()>) {
        self.status = match result {
            Ok(()) => None,
            Err(err) => {
                log::warn!("{}", err);
                Some(err.to_string())
            }
        };
    }

    fn place_bet(&mut self) {
        let result =
            parse_bet(&self.bet_input).and_then(|bet| self.session.place_bet(bet, self.bomb_count));
        self.report(result);
    }

    fn reveal(&mut self, index: game::CellIndex) {
        let result = self.session.reveal(index).map(|outcome| {
            log::debug!("tile {}: {:?}", index, outcome);
        });
        self.report(result);
    }

    fn cash_out(&mut self) {
        let result = self.session.cash_out().map(|cash_out| {
            log::info!("cashed out {} credits", cash_out.payout);
        });
        self.report(result);
    }

    fn view_board(&self, ctx: &Context<Self>) -> Html {
        let size = self.session.grid_size();
        let playable = self.snapshot.active;
        let callback = ctx.link().callback(Msg::Reveal);

        html! {
            <div class={classes!("board", playable.then_some("playable"))}
                 style={format!("grid-template-columns: repeat({}, 1fr)", size)}>
                {
                    for (0..self.session.cell_count()).map(|index| {
                        let tile_state = tile_state_at(&self.session, index);
                        let locked = !playable || tile_state != ViewTileState::Hidden;
                        html! {
                            <TileView {index} {tile_state} {locked} callback={callback.clone()}/>
                        }
                    })
                }
            </div>
        }
    }

    fn view_controls(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let can_bet = self.snapshot.can_bet();
        let bomb_range = self.session.config().bomb_range();
        let selected = self.bomb_count;

        let oninput = ctx
            .link()
            .callback(|e: InputEvent| BetInput(e.target_unchecked_into::<HtmlInputElement>().value()));
        let onchange = ctx.link().batch_callback(|e: Event| {
            let value = e.target_unchecked_into::<HtmlSelectElement>().value();
            value.parse().ok().map(SelectBombs)
        });

        html! {
            <section class="controls">
                <label>
                    {"Bet"}
                    <input type="number" min="1" value={self.bet_input.clone()}
                           disabled={!can_bet} {oninput}/>
                </label>
                <label>
                    {"Bombs"}
                    <select disabled={!can_bet} {onchange}>
                        {
                            for bomb_range.map(|count| html! {
                                <option value={count.to_string()} selected={count == selected}>
                                    {count}
                                </option>
                            })
                        }
                    </select>
                </label>
                <button disabled={!can_bet} onclick={ctx.link().callback(|_| PlaceBet)}>
                    {"Set bet"}
                </button>
                <button disabled={!self.snapshot.can_cash_out()} onclick={ctx.link().callback(|_| CashOut)}>
                    {"Cash out"}
                </button>
                <button disabled={self.snapshot.active} onclick={ctx.link().callback(|_| Restart)}>
                    {"Restart"}
                </button>
                <button disabled={self.snapshot.active} onclick={ctx.link().callback(|_| ResetCredits)}>
                    {"Reset credits"}
                </button>
            </section>
        }
    }

    fn view_stats(&self) -> Html {
        let snapshot = &self.snapshot;
        html! {
            <dl class="stats">
                <dt>{"Credits"}</dt><dd>{snapshot.balance.to_string()}</dd>
                <dt>{"Current bet"}</dt><dd>{snapshot.bet}</dd>
                <dt>{"Hits"}</dt><dd>{snapshot.hit_count}</dd>
                <dt>{"Multiplier"}</dt><dd>{format_multiplier(snapshot.multiplier_current)}</dd>
                <dt>{"Next"}</dt><dd>{format_next_multiplier(snapshot.multiplier_next)}</dd>
                <dt>{"Cash out"}</dt><dd>{snapshot.cashout_value.to_string()}</dd>
            </dl>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let config = props.config();
        let seed = props.seed.unwrap_or_else(js_random_seed);

        let mut session = game::Session::new(
            config,
            game::RandomMineGenerator::new(seed),
            LocalBalanceStore,
        )
        .expect("config was validated");

        let link = ctx.link().clone();
        session.set_surface(move |snapshot: &game::Snapshot| {
            link.send_message(Msg::Render(*snapshot));
        });

        Self {
            snapshot: session.snapshot(),
            session,
            bet_input: String::new(),
            bomb_count: config.bomb_count,
            status: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Render(snapshot) => {
                let updated = self.snapshot != snapshot;
                self.snapshot = snapshot;
                updated
            }
            BetInput(value) => {
                self.bet_input = value;
                false
            }
            SelectBombs(count) => {
                log::debug!("bomb count selected: {}", count);
                self.bomb_count = count;
                false
            }
            PlaceBet => {
                self.place_bet();
                true
            }
            Reveal(index) => {
                self.reveal(index);
                true
            }
            CashOut => {
                self.cash_out();
                true
            }
            Restart => {
                self.session.reset();
                self.status = None;
                true
            }
            ResetCredits => {
                let result = self.session.reset_balance();
                self.report(result);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let outcome_class = match self.snapshot.last_outcome {
            Some(game::LastOutcome::HitMine(_)) => "lose",
            Some(game::LastOutcome::CashedOut { .. }) => "win",
            _ if self.snapshot.active => "in-progress",
            _ => "not-started",
        };

        html! {
            <div class={classes!("mines", outcome_class)}>
                { self.view_stats() }
                { self.view_board(ctx) }
                { self.view_controls(ctx) }
                if let Some(status) = &self.status {
                    <p class="status">{status.clone()}</p>
                }
            </div>
        }
    }
}
