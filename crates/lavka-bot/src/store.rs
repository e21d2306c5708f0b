// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementations of the session/cart stores, plus the
//! conversation-state map.
//!
//! All three are process-wide maps keyed by chat-user identity and are
//! lost on restart. Sessions and carts sit behind the `lavka-core` store
//! traits so they can later move off-process; conversation state is
//! inherently per-process and stays concrete.

use dashmap::DashMap;
use lavka_core::{CartItem, CartStore, Session, SessionStore, UserId};

use crate::state::ConversationState;

/// Process-wide session map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: DashMap<UserId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user: UserId) -> Option<Session> {
        self.inner.get(&user).map(|entry| entry.clone())
    }

    fn insert(&self, user: UserId, session: Session) {
        self.inner.insert(user, session);
    }

    fn remove(&self, user: UserId) -> Option<Session> {
        self.inner.remove(&user).map(|(_, session)| session)
    }
}

/// Process-wide cart map.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    inner: DashMap<UserId, Vec<CartItem>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for InMemoryCartStore {
    fn items(&self, user: UserId) -> Vec<CartItem> {
        self.inner
            .get(&user)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    fn push(&self, user: UserId, item: CartItem) {
        self.inner.entry(user).or_default().push(item);
    }

    fn start(&self, user: UserId) {
        self.inner.insert(user, Vec::new());
    }

    fn clear(&self, user: UserId) {
        self.inner.remove(&user);
    }
}

/// Per-user conversation state. At most one entry per user; absence
/// means idle.
#[derive(Debug, Default)]
pub struct StateMap {
    inner: DashMap<UserId, ConversationState>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId) -> Option<ConversationState> {
        self.inner.get(&user).map(|entry| entry.clone())
    }

    pub fn set(&self, user: UserId, state: ConversationState) {
        self.inner.insert(user, state);
    }

    pub fn clear(&self, user: UserId) {
        self.inner.remove(&user);
    }

    pub fn is_idle(&self, user: UserId) -> bool {
        !self.inner.contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            client_key: "c1".into(),
            phone: "+79991234567".into(),
            name: "Иван".into(),
            address: "ул. Мира, 5".into(),
            is_admin: false,
        }
    }

    fn item() -> CartItem {
        CartItem {
            product_key: "p1".into(),
            name: "Молоко".into(),
            unit_price: 80.0,
            quantity: 2,
            image_url: None,
        }
    }

    #[test]
    fn session_store_round_trip() {
        let store = InMemorySessionStore::new();
        let user = UserId(1);
        assert!(store.get(user).is_none());

        store.insert(user, session());
        assert_eq!(store.get(user).unwrap().name, "Иван");

        let removed = store.remove(user).unwrap();
        assert_eq!(removed.client_key, "c1");
        assert!(store.get(user).is_none());
    }

    #[test]
    fn carts_are_per_user() {
        let store = InMemoryCartStore::new();
        store.push(UserId(1), item());
        assert_eq!(store.items(UserId(1)).len(), 1);
        assert!(store.items(UserId(2)).is_empty());
    }

    #[test]
    fn start_resets_an_existing_cart() {
        let store = InMemoryCartStore::new();
        store.push(UserId(1), item());
        store.start(UserId(1));
        assert!(store.items(UserId(1)).is_empty());
    }

    #[test]
    fn push_preserves_selection_order() {
        let store = InMemoryCartStore::new();
        let mut second = item();
        second.product_key = "p2".into();
        store.push(UserId(1), item());
        store.push(UserId(1), second);
        let items = store.items(UserId(1));
        assert_eq!(items[0].product_key, "p1");
        assert_eq!(items[1].product_key, "p2");
    }

    #[test]
    fn state_map_holds_one_state_per_user() {
        let states = StateMap::new();
        let user = UserId(1);
        assert!(states.is_idle(user));

        states.set(user, ConversationState::EnteringPhone);
        states.set(user, ConversationState::SelectingProducts);
        assert_eq!(states.get(user), Some(ConversationState::SelectingProducts));

        states.clear(user);
        assert!(states.is_idle(user));
    }
}
