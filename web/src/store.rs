use crate::utils::*;
use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};
use mines_core::{Amount, BalanceStore, StoreError};

/// Credit balance persisted in the browser's local storage.
///
/// The value is kept as a plain number of credits (`1000.91`), so integer balances
/// saved by earlier builds still load.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct LocalBalanceStore;

impl StorageKey for LocalBalanceStore {
    const KEY: &'static str = "mines:credits";
}

fn to_stored(balance: Amount) -> f64 {
    balance.as_f64()
}

fn from_stored(credits: f64) -> Option<Amount> {
    let hundredths = (credits * 100.0).round();
    (hundredths.is_finite() && hundredths >= 0.0 && hundredths <= u64::MAX as f64)
        .then(|| Amount::from_hundredths(hundredths as u64))
}

impl BalanceStore for LocalBalanceStore {
    fn load(&self) -> Option<Amount> {
        match LocalStorage::get::<f64>(Self::KEY) {
            Ok(credits) => from_stored(credits).or_else(|| {
                log::warn!("ignoring stored balance: {}", credits);
                None
            }),
            Err(StorageError::KeyNotFound(_)) => None,
            Err(err) => {
                log::warn!("ignoring stored balance: {}", err);
                None
            }
        }
    }

    fn save(&mut self, balance: Amount) -> Result<(), StoreError> {
        LocalStorage::set(Self::KEY, to_stored(balance))
            .map_err(|err| StoreError::Rejected(err.to_string()))
    }
}
