use crate::*;

/// Where the credit balance lives between runs.
pub trait BalanceStore {
    /// Last saved balance, `None` when nothing has been stored yet.
    fn load(&self) -> Option<Amount>;

    fn save(&mut self, balance: Amount) -> core::result::Result<(), StoreError>;
}

/// Balance kept only for the lifetime of the process.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    balance: Option<Amount>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self { balance: None }
    }

    pub const fn with_balance(balance: Amount) -> Self {
        Self {
            balance: Some(balance),
        }
    }
}

impl BalanceStore for MemoryStore {
    fn load(&self) -> Option<Amount> {
        self.balance
    }

    fn save(&mut self, balance: Amount) -> core::result::Result<(), StoreError> {
        self.balance = Some(balance);
        Ok(())
    }
}

impl<S: BalanceStore + ?Sized> BalanceStore for &mut S {
    fn load(&self) -> Option<Amount> {
        (**self).load()
    }

    fn save(&mut self, balance: Amount) -> core::result::Result<(), StoreError> {
        (**self).save(balance)
    }
}
