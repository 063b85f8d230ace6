use super::*;

fn coin(id: i64, name: &str, symbol: &str, price: f64) -> Coin {
    Coin {
        id: CoinId(id),
        name: name.to_string(),
        symbol: symbol.to_string(),
        price,
        client_id: ClientId::random(),
    }
}

fn bitcoin() -> Coin {
    coin(1, "Bitcoin", "BTC", 50_000.0)
}

fn ids(view: &CoinView) -> Vec<i64> {
    view.coins.iter().map(|coin| coin.id.0).collect()
}

#[test]
fn starts_loading_with_empty_draft_and_no_coins() {
    let store = CoinStore::new(ClientId::random());
    assert!(store.view().loading);
    assert!(store.view().coins.is_empty());
    assert!(store.view().draft.is_empty());
}

#[test]
fn full_load_replaces_coins_and_clears_loading() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::RemoteCoinObserved(coin(9, "Stale", "OLD", 1.0)));

    let loaded = bitcoin();
    let view = store.apply(StoreEvent::FullLoadCompleted(vec![loaded.clone()]));

    assert!(!view.loading);
    assert_eq!(view.coins, vec![loaded]);
}

#[test]
fn full_load_drops_duplicate_identifiers() {
    let mut store = CoinStore::new(ClientId::random());
    let view = store.apply(StoreEvent::FullLoadCompleted(vec![
        coin(1, "Bitcoin", "BTC", 50_000.0),
        coin(1, "Bitcoin again", "BTC", 1.0),
        coin(2, "Ether", "ETH", 3_000.0),
    ]));
    assert_eq!(ids(view), vec![1, 2]);
    assert_eq!(view.coins[0].name, "Bitcoin");
}

#[test]
fn draft_field_changes_leave_coins_untouched() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::FullLoadCompleted(vec![bitcoin()]));
    let before = store.view().coins.clone();

    let view = store.apply(StoreEvent::DraftFieldChanged {
        field: DraftField::Symbol,
        value: "DOGE".into(),
    });

    assert_eq!(view.draft.symbol, "DOGE");
    assert_eq!(view.coins, before);
}

#[test]
fn draft_cleared_always_empties_every_field() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply_all([
        StoreEvent::DraftFieldChanged {
            field: DraftField::Name,
            value: "Dogecoin".into(),
        },
        StoreEvent::DraftFieldChanged {
            field: DraftField::Price,
            value: "0.1".into(),
        },
    ]);
    assert!(!store.view().draft.is_empty());

    let view = store.apply(StoreEvent::DraftCleared);
    assert_eq!(view.draft, CoinDraft::default());

    let view = store.apply(StoreEvent::DraftCleared);
    assert_eq!(view.draft, CoinDraft::default());
}

#[test]
fn submit_flow_appends_confirmed_coin_and_clears_draft() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply_all([
        StoreEvent::FullLoadCompleted(vec![bitcoin()]),
        StoreEvent::DraftFieldChanged {
            field: DraftField::Name,
            value: "Dogecoin".into(),
        },
        StoreEvent::DraftFieldChanged {
            field: DraftField::Symbol,
            value: "DOGE".into(),
        },
        StoreEvent::DraftFieldChanged {
            field: DraftField::Price,
            value: "0.1".into(),
        },
    ]);

    let view = store.apply_all([
        StoreEvent::LocalCoinConfirmed(coin(2, "Dogecoin", "DOGE", 0.1)),
        StoreEvent::DraftCleared,
    ]);

    assert_eq!(ids(view), vec![1, 2]);
    assert!(view.draft.is_empty());
}

#[test]
fn duplicate_push_is_idempotent() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::FullLoadCompleted(Vec::new()));
    let pushed = coin(3, "Litecoin", "LTC", 80.0);

    let once = store
        .apply(StoreEvent::RemoteCoinObserved(pushed.clone()))
        .clone();
    let twice = store.apply(StoreEvent::RemoteCoinObserved(pushed)).clone();

    assert_eq!(once, twice);
    assert_eq!(ids(&twice), vec![3]);
}

#[test]
fn self_echo_is_suppressed_by_identifier() {
    let client_id = ClientId::random();
    let mut store = CoinStore::new(client_id);
    store.apply(StoreEvent::FullLoadCompleted(Vec::new()));
    let own = Coin {
        client_id,
        ..coin(4, "Dogecoin", "DOGE", 0.1)
    };

    store.apply(StoreEvent::LocalCoinConfirmed(own.clone()));
    let view = store.apply(StoreEvent::RemoteCoinObserved(own));

    assert_eq!(ids(view), vec![4]);
}

#[test]
fn echo_arriving_before_confirmation_does_not_duplicate() {
    let client_id = ClientId::random();
    let mut store = CoinStore::new(client_id);
    let own = Coin {
        client_id,
        ..coin(5, "Dogecoin", "DOGE", 0.1)
    };

    let view = store.apply_all([
        StoreEvent::RemoteCoinObserved(own.clone()),
        StoreEvent::LocalCoinConfirmed(own),
    ]);

    assert_eq!(ids(view), vec![5]);
}

#[test]
fn own_client_coin_with_unknown_id_is_still_appended() {
    // A reconnecting client can be re-sent its own coin; it must not be lost.
    let client_id = ClientId::random();
    let mut store = CoinStore::new(client_id);
    let own = Coin {
        client_id,
        ..coin(6, "Dogecoin", "DOGE", 0.1)
    };

    let view = store.apply(StoreEvent::RemoteCoinObserved(own));
    assert_eq!(ids(view), vec![6]);
}

#[test]
fn removing_absent_coin_is_a_no_op() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::FullLoadCompleted(vec![bitcoin()]));
    let before = store.view().clone();

    let view = store.apply(StoreEvent::CoinRemoved(CoinId(42)));
    assert_eq!(view.coins, before.coins);
    assert_eq!(view.draft, before.draft);
    assert_eq!(view.loading, before.loading);
}

#[test]
fn removing_present_coin_keeps_order_of_the_rest() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::FullLoadCompleted(vec![
        coin(1, "Bitcoin", "BTC", 50_000.0),
        coin(2, "Ether", "ETH", 3_000.0),
        coin(3, "Litecoin", "LTC", 80.0),
    ]));

    let view = store.apply(StoreEvent::CoinRemoved(CoinId(2)));
    assert_eq!(ids(view), vec![1, 3]);
}

#[test]
fn disjoint_coins_converge_regardless_of_arrival_order() {
    let local = coin(10, "Dogecoin", "DOGE", 0.1);
    let remote = coin(11, "Ether", "ETH", 3_000.0);

    let mut first = CoinStore::new(ClientId::random());
    first.apply_all([
        StoreEvent::LocalCoinConfirmed(local.clone()),
        StoreEvent::RemoteCoinObserved(remote.clone()),
    ]);

    let mut second = CoinStore::new(ClientId::random());
    second.apply_all([
        StoreEvent::RemoteCoinObserved(remote),
        StoreEvent::LocalCoinConfirmed(local),
    ]);

    let mut first_ids = ids(first.view());
    let mut second_ids = ids(second.view());
    first_ids.sort();
    second_ids.sort();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn reduce_is_deterministic_for_the_same_event_sequence() {
    let events = vec![
        StoreEvent::FullLoadCompleted(vec![bitcoin()]),
        StoreEvent::DraftFieldChanged {
            field: DraftField::Name,
            value: "Dogecoin".into(),
        },
        StoreEvent::RemoteCoinObserved(coin(3, "Litecoin", "LTC", 80.0)),
        StoreEvent::RemoteCoinObserved(coin(3, "Litecoin", "LTC", 80.0)),
        StoreEvent::CoinRemoved(CoinId(1)),
        StoreEvent::DraftCleared,
    ];

    let folded = events
        .iter()
        .cloned()
        .fold(CoinView::default(), |state, event| reduce(&state, event));

    let mut store = CoinStore::new(ClientId::random());
    let stepped = store.apply_all(events).clone();

    assert_eq!(folded, stepped);
    assert_eq!(ids(&stepped), vec![3]);
    assert!(!stepped.loading);
}

#[test]
fn create_pushed_after_its_delete_stays_removed() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::FullLoadCompleted(vec![bitcoin()]));
    let doge = coin(7, "Dogecoin", "DOGE", 0.1);

    let view = store.apply_all([
        StoreEvent::CoinRemoved(doge.id),
        StoreEvent::RemoteCoinObserved(doge.clone()),
        StoreEvent::LocalCoinConfirmed(doge),
    ]);

    assert_eq!(ids(view), vec![1]);
    assert!(view.was_removed(CoinId(7)));
}

#[test]
fn create_and_delete_converge_in_either_order() {
    let doge = coin(7, "Dogecoin", "DOGE", 0.1);

    let mut in_order = CoinStore::new(ClientId::random());
    in_order.apply_all([
        StoreEvent::RemoteCoinObserved(doge.clone()),
        StoreEvent::CoinRemoved(doge.id),
    ]);

    let mut reordered = CoinStore::new(ClientId::random());
    reordered.apply_all([
        StoreEvent::CoinRemoved(doge.id),
        StoreEvent::RemoteCoinObserved(doge),
    ]);

    assert_eq!(in_order.view(), reordered.view());
    assert!(in_order.view().coins.is_empty());
}

#[test]
fn full_load_skips_coins_removed_while_it_was_in_flight() {
    let mut store = CoinStore::new(ClientId::random());
    store.apply(StoreEvent::CoinRemoved(CoinId(2)));

    let view = store.apply(StoreEvent::FullLoadCompleted(vec![
        bitcoin(),
        coin(2, "Ether", "ETH", 3_000.0),
    ]));

    assert_eq!(ids(view), vec![1]);
}
