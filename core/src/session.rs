use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No bet placed, board inert.
    #[default]
    Idle,
    /// Bet recorded, waiting for the round to start.
    Betting,
    /// Mines placed, reveals accepted.
    Active,
    /// A mine was revealed; the round waits for a reset.
    Lost,
    /// Winnings collected; a new bet may be placed right away.
    CashedOut,
}

impl SessionState {
    pub const fn accepts_bet(self) -> bool {
        matches!(self, Self::Idle | Self::Betting | Self::CashedOut)
    }

    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::CashedOut)
    }
}

/// One player's game: balance, the current bet and the round being played.
pub struct Session<G, S> {
    config: SessionConfig,
    state: SessionState,
    balance: Amount,
    bet: Credits,
    bomb_count: CellCount,
    mines: MineSet,
    revealed: BTreeSet<CellIndex>,
    hit_count: CellCount,
    triggered_mine: Option<CellIndex>,
    last_revealed: Option<CellIndex>,
    last_outcome: Option<LastOutcome>,
    generator: G,
    store: S,
    surface: Option<Box<dyn RenderSurface>>,
}

impl<G: MineGenerator, S: BalanceStore> Session<G, S> {
    pub fn new(
        config: SessionConfig,
        generator: G,
        store: S,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;

        let balance = store.load().unwrap_or_else(|| {
            log::debug!(
                "No stored balance, starting with {}",
                config.starting_balance
            );
            Amount::from_credits(config.starting_balance)
        });

        Ok(Self {
            config,
            state: SessionState::Idle,
            balance,
            bet: 0,
            bomb_count: config.bomb_count,
            mines: MineSet::default(),
            revealed: BTreeSet::new(),
            hit_count: 0,
            triggered_mine: None,
            last_revealed: None,
            last_outcome: None,
            generator,
            store,
            surface: None,
        })
    }

    /// Attaches the render surface and draws the current state on it right away.
    pub fn set_surface(&mut self, surface: impl RenderSurface + 'static) {
        self.surface = Some(Box::new(surface));
        self.notify();
    }

    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.set_surface(surface);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn bet(&self) -> Credits {
        self.bet
    }

    pub fn grid_size(&self) -> Coord {
        self.config.grid_size
    }

    pub fn cell_count(&self) -> CellCount {
        self.config.cell_count()
    }

    /// Bomb count of the current round, or of the last one once it ended.
    pub fn bomb_count(&self) -> CellCount {
        self.bomb_count
    }

    pub fn hit_count(&self) -> CellCount {
        self.hit_count
    }

    pub fn is_revealed(&self, index: CellIndex) -> bool {
        self.revealed.contains(&index)
    }

    pub fn revealed(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.revealed.iter().copied()
    }

    pub fn triggered_mine(&self) -> Option<CellIndex> {
        self.triggered_mine
    }

    /// The whole layout, but only after the round was lost.
    pub fn exposed_mines(&self) -> Option<&MineSet> {
        matches!(self.state, SessionState::Lost).then_some(&self.mines)
    }

    pub fn current_multiplier(&self) -> Multiplier {
        multiplier(self.hit_count)
    }

    pub fn next_multiplier(&self) -> Option<Multiplier> {
        next_multiplier(self.hit_count)
    }

    /// What [`Session::cash_out`] would pay right now.
    pub fn cashout_value(&self) -> Amount {
        if self.state.is_active() {
            payout(self.bet, self.hit_count)
        } else {
            Amount::ZERO
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            balance: self.balance,
            bet: self.bet,
            hit_count: self.hit_count,
            multiplier_current: self.current_multiplier(),
            multiplier_next: self.next_multiplier(),
            cashout_value: self.cashout_value(),
            active: self.state.is_active(),
            last_revealed: self.last_revealed,
            last_outcome: self.last_outcome,
        }
    }

    pub fn set_bet(&mut self, amount: Credits) -> Result<()> {
        if !self.state.accepts_bet() {
            return Err(self.reject(SessionError::WrongState(self.state)));
        }
        if amount == 0 || Amount::from_credits(amount) > self.balance {
            return Err(self.reject(SessionError::InvalidBet));
        }

        if self.state.is_finished() {
            self.clear_round();
        }
        self.bet = amount;
        self.state = SessionState::Betting;
        log::debug!("bet set to {}", amount);
        self.notify();
        Ok(())
    }

    pub fn start(&mut self, bomb_count: CellCount) -> Result<()> {
        if !matches!(self.state, SessionState::Betting) {
            return Err(self.reject(SessionError::WrongState(self.state)));
        }
        if self.bet == 0 || Amount::from_credits(self.bet) > self.balance {
            return Err(self.reject(SessionError::InvalidBet));
        }
        if let Err(err) = check_bomb_count(self.cell_count(), bomb_count) {
            return Err(self.reject(err));
        }

        let mines = match self.generator.generate(self.cell_count(), bomb_count) {
            Ok(mines) => mines,
            Err(err) => return Err(self.reject(err)),
        };
        if mines.len() != bomb_count {
            log::warn!(
                "Generated mine count mismatch, actual: {}, requested: {}",
                mines.len(),
                bomb_count
            );
            return Err(self.reject(SessionError::InvalidBombCount));
        }

        self.clear_round();
        self.mines = mines;
        self.bomb_count = bomb_count;
        self.balance = self.balance.saturating_sub(Amount::from_credits(self.bet));
        self.state = SessionState::Active;
        log::debug!(
            "round started: bet {}, {} bombs, balance {}",
            self.bet,
            bomb_count,
            self.balance
        );
        self.persist_balance();
        self.notify();
        Ok(())
    }

    /// Records the bet and starts the round in one step.
    ///
    /// When the round cannot start the bet stays recorded and the session remains in
    /// [`SessionState::Betting`].
    pub fn place_bet(&mut self, amount: Credits, bomb_count: CellCount) -> Result<()> {
        self.set_bet(amount)?;
        self.start(bomb_count)
    }

    pub fn reveal(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        if !self.state.is_active() {
            return Err(self.reject(SessionError::WrongState(self.state)));
        }
        if index >= self.cell_count() {
            return Err(self.reject(SessionError::OutOfRange(index)));
        }
        if self.revealed.contains(&index) {
            return Err(self.reject(SessionError::AlreadyRevealed(index)));
        }

        self.last_revealed = Some(index);
        let outcome = if self.mines.contains(index) {
            self.triggered_mine = Some(index);
            self.state = SessionState::Lost;
            self.last_outcome = Some(LastOutcome::HitMine(index));
            log::debug!(
                "mine hit at {} after {} safe tiles",
                index,
                self.hit_count
            );
            RevealOutcome::HitMine
        } else {
            self.revealed.insert(index);
            self.hit_count += 1;
            self.last_outcome = Some(LastOutcome::Safe(index));
            log::trace!("safe tile at {}, hit count {}", index, self.hit_count);
            RevealOutcome::Safe {
                hit_count: self.hit_count,
                multiplier: self.current_multiplier(),
            }
        };

        self.notify();
        Ok(outcome)
    }

    pub fn cash_out(&mut self) -> Result<CashOut> {
        if !self.state.is_active() {
            return Err(self.reject(SessionError::WrongState(self.state)));
        }
        if self.hit_count == 0 {
            return Err(self.reject(SessionError::NothingToCashOut));
        }

        let cash_out = CashOut {
            hit_count: self.hit_count,
            multiplier: self.current_multiplier(),
            payout: payout(self.bet, self.hit_count),
        };
        self.balance = self.balance.saturating_add(cash_out.payout);
        self.clear_round();
        self.bet = 0;
        self.state = SessionState::CashedOut;
        self.last_outcome = Some(LastOutcome::CashedOut {
            payout: cash_out.payout,
        });
        log::debug!(
            "cashed out {} at x{} after {} hits, balance {}",
            cash_out.payout,
            cash_out.multiplier,
            cash_out.hit_count,
            self.balance
        );
        self.persist_balance();
        self.notify();
        Ok(cash_out)
    }

    /// Back to [`SessionState::Idle`] from anywhere; an active round is abandoned with its bet.
    pub fn reset(&mut self) {
        if self.state.is_active() {
            log::debug!("round abandoned, bet of {} forfeited", self.bet);
        }
        self.clear_round();
        self.bet = 0;
        self.state = SessionState::Idle;
        self.notify();
    }

    /// Restores the starting balance; not allowed in the middle of a round.
    pub fn reset_balance(&mut self) -> Result<()> {
        if self.state.is_active() {
            return Err(self.reject(SessionError::WrongState(self.state)));
        }
        self.balance = Amount::from_credits(self.config.starting_balance);
        log::debug!("balance reset to {}", self.balance);
        self.persist_balance();
        self.notify();
        Ok(())
    }

    fn clear_round(&mut self) {
        self.mines = MineSet::default();
        self.revealed.clear();
        self.hit_count = 0;
        self.triggered_mine = None;
        self.last_revealed = None;
        self.last_outcome = None;
    }

    fn reject(&self, err: SessionError) -> SessionError {
        log::debug!("rejected in {:?}: {}", self.state, err);
        err
    }

    fn persist_balance(&mut self) {
        if let Err(err) = self.store.save(self.balance) {
            log::warn!("failed to save balance {}: {}", self.balance, err);
        }
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        if let Some(surface) = self.surface.as_mut() {
            surface.render(&snapshot);
        }
    }
}

impl<G, S> fmt::Debug for Session<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("balance", &self.balance)
            .field("bet", &self.bet)
            .field("bomb_count", &self.bomb_count)
            .field("revealed", &self.revealed)
            .field("hit_count", &self.hit_count)
            .field("triggered_mine", &self.triggered_mine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    fn session(mines: &[CellIndex]) -> Session<FixedMineGenerator, MemoryStore> {
        Session::new(
            SessionConfig::default(),
            FixedMineGenerator::new(mines),
            MemoryStore::new(),
        )
        .unwrap()
    }

    fn active(mines: &[CellIndex], bet: Credits) -> Session<FixedMineGenerator, MemoryStore> {
        let mut session = session(mines);
        session.place_bet(bet, mines.len() as CellCount).unwrap();
        session
    }

    #[test]
    fn starts_with_stored_balance_or_default() {
        assert_eq!(session(&[0]).balance(), Amount::from_credits(1000));

        let stored = Session::new(
            SessionConfig::default(),
            FixedMineGenerator::new(&[0]),
            MemoryStore::with_balance(Amount::from_hundredths(4_250)),
        )
        .unwrap();
        assert_eq!(stored.balance().to_string(), "42.50");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            grid_size: 1,
            ..SessionConfig::default()
        };
        let result = Session::new(config, FixedMineGenerator::new(&[0]), MemoryStore::new());
        assert_eq!(result.err(), Some(ConfigError::GridTooSmall));
    }

    #[test]
    fn bet_must_be_positive_and_affordable() {
        let mut session = session(&[0]);
        assert_eq!(session.set_bet(0), Err(SessionError::InvalidBet));
        assert_eq!(session.set_bet(1001), Err(SessionError::InvalidBet));
        assert_eq!(session.state(), SessionState::Idle);

        session.set_bet(1000).unwrap();
        assert_eq!(session.state(), SessionState::Betting);
        assert_eq!(session.set_bet(1001), Err(SessionError::InvalidBet));
        assert_eq!(session.state(), SessionState::Betting);
        assert_eq!(session.bet(), 1000);
    }

    #[test]
    fn start_requires_a_bet() {
        let mut session = session(&[0]);
        assert_eq!(
            session.start(1),
            Err(SessionError::WrongState(SessionState::Idle))
        );
    }

    #[test]
    fn start_rejects_unwinnable_bomb_counts() {
        let mut session = session(&[0]);
        session.set_bet(10).unwrap();
        assert_eq!(session.start(0), Err(SessionError::InvalidBombCount));
        assert_eq!(session.start(25), Err(SessionError::InvalidBombCount));
        assert_eq!(session.state(), SessionState::Betting);
        assert_eq!(session.balance(), Amount::from_credits(1000));
    }

    #[test]
    fn start_debits_bet_and_saves_balance() {
        let mut store = MemoryStore::new();
        let mut session = Session::new(
            SessionConfig::default(),
            FixedMineGenerator::new(&[3, 7]),
            &mut store,
        )
        .unwrap();
        session.place_bet(250, 2).unwrap();
        assert_eq!(session.balance(), Amount::from_credits(750));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.bomb_count(), 2);
        drop(session);
        assert_eq!(store.load(), Some(Amount::from_credits(750)));
    }

    #[test]
    fn bet_cannot_change_mid_round() {
        let mut session = active(&[0], 10);
        assert_eq!(
            session.set_bet(20),
            Err(SessionError::WrongState(SessionState::Active))
        );
        assert_eq!(
            session.start(1),
            Err(SessionError::WrongState(SessionState::Active))
        );
    }

    #[test]
    fn safe_reveal_grows_multiplier() {
        let mut session = active(&[0, 1, 2], 100);
        assert_eq!(
            session.reveal(10),
            Ok(RevealOutcome::Safe {
                hit_count: 1,
                multiplier: multiplier(1),
            })
        );
        assert!(session.is_revealed(10));
        assert_eq!(session.cashout_value(), Amount::from_credits(113));
        assert_eq!(session.next_multiplier(), Some(multiplier(2)));
    }

    #[test]
    fn reveal_rejects_repeats_and_out_of_range() {
        let mut session = active(&[0], 100);
        session.reveal(5).unwrap();
        assert_eq!(session.reveal(5), Err(SessionError::AlreadyRevealed(5)));
        assert_eq!(session.reveal(25), Err(SessionError::OutOfRange(25)));
        assert_eq!(session.hit_count(), 1);
        assert_eq!(session.revealed().count(), 1);
    }

    #[test]
    fn mine_ends_round_without_touching_balance() {
        let mut session = active(&[4, 9], 100);
        session.reveal(0).unwrap();
        assert_eq!(session.reveal(9), Ok(RevealOutcome::HitMine));
        assert_eq!(session.state(), SessionState::Lost);
        assert_eq!(session.balance(), Amount::from_credits(900));
        assert_eq!(session.hit_count(), 1);
        assert!(!session.is_revealed(9));
        assert_eq!(session.triggered_mine(), Some(9));
        assert_eq!(session.cashout_value(), Amount::ZERO);

        let exposed: Vec<_> = session.exposed_mines().unwrap().iter().collect();
        assert_eq!(exposed, [4, 9]);

        assert_eq!(
            session.reveal(1),
            Err(SessionError::WrongState(SessionState::Lost))
        );
        assert_eq!(
            session.cash_out(),
            Err(SessionError::WrongState(SessionState::Lost))
        );
        assert_eq!(
            session.set_bet(10),
            Err(SessionError::WrongState(SessionState::Lost))
        );
    }

    #[test]
    fn mines_stay_hidden_while_playing() {
        let session = active(&[4], 100);
        assert!(session.exposed_mines().is_none());
    }

    #[test]
    fn cash_out_needs_a_hit() {
        let mut session = active(&[0], 100);
        assert_eq!(session.cash_out(), Err(SessionError::NothingToCashOut));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.balance(), Amount::from_credits(900));
    }

    #[test]
    fn cash_out_pays_table_multiplier() {
        let mut session = active(&[0], 100);
        for index in 1..=4 {
            session.reveal(index).unwrap();
        }
        let cash_out = session.cash_out().unwrap();
        assert_eq!(cash_out.hit_count, 4);
        assert_eq!(cash_out.payout, Amount::from_credits(200));
        assert_eq!(session.balance(), Amount::from_credits(1100));
        assert_eq!(session.state(), SessionState::CashedOut);
        assert_eq!(session.hit_count(), 0);
        assert_eq!(session.bet(), 0);
        assert_eq!(session.revealed().count(), 0);
    }

    #[test]
    fn new_bet_allowed_straight_after_cash_out() {
        let mut session = active(&[0], 100);
        session.reveal(1).unwrap();
        session.cash_out().unwrap();
        session.set_bet(50).unwrap();
        assert_eq!(session.state(), SessionState::Betting);
        assert_eq!(session.snapshot().last_outcome, None);
    }

    #[test]
    fn reset_forfeits_active_round_and_is_idempotent() {
        let mut session = active(&[0], 100);
        session.reveal(3).unwrap();
        session.reset();
        let first = session.snapshot();
        session.reset();
        assert_eq!(session.snapshot(), first);
        assert_eq!(first.state, SessionState::Idle);
        assert_eq!(first.balance, Amount::from_credits(900));
        assert_eq!(first.bet, 0);
        assert_eq!(first.hit_count, 0);
        assert!(!session.is_revealed(3));
    }

    #[test]
    fn reset_balance_only_between_rounds() {
        let mut session = active(&[0], 100);
        assert_eq!(
            session.reset_balance(),
            Err(SessionError::WrongState(SessionState::Active))
        );
        session.reset();
        session.reset_balance().unwrap();
        assert_eq!(session.balance(), Amount::from_credits(1000));
    }

    #[test]
    fn start_rechecks_bet_after_balance_reset() {
        let mut session = Session::new(
            SessionConfig::default(),
            FixedMineGenerator::new(&[0]),
            MemoryStore::with_balance(Amount::from_credits(5000)),
        )
        .unwrap();
        session.set_bet(3000).unwrap();
        session.reset_balance().unwrap();

        assert_eq!(session.start(1), Err(SessionError::InvalidBet));
        assert_eq!(session.state(), SessionState::Betting);
        assert_eq!(session.balance(), Amount::from_credits(1000));
        assert_eq!(session.bet(), 3000);
    }

    #[test]
    fn small_bets_keep_fractional_winnings() {
        let mut session = active(&[0], 7);
        session.reveal(1).unwrap();
        let cash_out = session.cash_out().unwrap();

        assert_eq!(cash_out.payout, Amount::from_hundredths(791));
        assert_eq!(session.balance().to_string(), "1000.91");
        assert!(session.balance() > Amount::from_credits(1000));

        session.set_bet(1000).unwrap();
        assert_eq!(session.set_bet(1001), Err(SessionError::InvalidBet));
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn surface_sees_every_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut session = session(&[0]).with_surface(move |snapshot: &Snapshot| {
            sink.borrow_mut().push(*snapshot);
        });

        session.set_bet(100).unwrap();
        session.start(1).unwrap();
        session.reveal(1).unwrap();
        let _ = session.reveal(1);
        session.cash_out().unwrap();

        let seen = seen.borrow();
        let states: Vec<_> = seen.iter().map(|snapshot| snapshot.state).collect();
        assert_eq!(
            states,
            [
                SessionState::Idle,
                SessionState::Betting,
                SessionState::Active,
                SessionState::Active,
                SessionState::CashedOut,
            ]
        );
        assert_eq!(seen[3].last_revealed, Some(1));
        assert_eq!(seen[3].cashout_value, Amount::from_credits(113));
        assert_eq!(
            seen[4].last_outcome,
            Some(LastOutcome::CashedOut {
                payout: Amount::from_credits(113)
            })
        );
    }

    #[test]
    fn failed_save_keeps_in_memory_balance() {
        struct BrokenStore;

        impl BalanceStore for BrokenStore {
            fn load(&self) -> Option<Amount> {
                None
            }

            fn save(&mut self, _balance: Amount) -> core::result::Result<(), StoreError> {
                Err(StoreError::Unavailable)
            }
        }

        let mut session = Session::new(
            SessionConfig::default(),
            FixedMineGenerator::new(&[0]),
            BrokenStore,
        )
        .unwrap();
        session.place_bet(100, 1).unwrap();
        session.reveal(1).unwrap();
        session.cash_out().unwrap();
        assert_eq!(session.balance(), Amount::from_credits(1013));
    }
}
