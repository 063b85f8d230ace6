use std::fmt::Write as _;

use client_core::{CoinView, DraftField};

/// Renders the form, the loading indicator and one row per coin.
pub fn render_view(view: &CoinView) -> String {
    let mut out = String::new();

    let form = DraftField::ALL
        .iter()
        .map(|field| format!("{field}: [{}]", view.draft.get(*field)))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{form}  -> submit");

    if view.loading {
        let _ = writeln!(out, "Loading...");
    } else if view.coins.is_empty() {
        let _ = writeln!(out, "(no coins yet)");
    }

    for coin in &view.coins {
        let _ = writeln!(
            out,
            "#{:<4} {} ({})  {}  [delete {}]",
            coin.id.0, coin.name, coin.symbol, coin.price, coin.id
        );
    }

    out
}

pub fn render_json(view: &CoinView) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}
