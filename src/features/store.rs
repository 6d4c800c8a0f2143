use std::collections::BTreeMap;

use super::account::{Account, AccountKey};

/// Accounts opened during this session, keyed by number and branch
#[derive(Debug, Default)]
pub struct Store {
    accounts: BTreeMap<AccountKey, Account>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    /// Inserts under the account's key, handing back whatever it replaced.
    pub(crate) fn put(&mut self, account: Account) -> Option<Account> {
        self.accounts.insert(account.key().clone(), account)
    }

    pub fn get(&self, key: &AccountKey) -> Option<&Account> {
        self.accounts.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &AccountKey) -> Option<&mut Account> {
        self.accounts.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
