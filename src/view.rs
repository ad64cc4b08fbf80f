use std::fmt::Write;

use crate::state::{AppState, ScanProgress, TxFlow, TxOutcome};

const RULE: &str = "----------------------------------------";
const LOADING: &str = "Loading...";

/// Render the single view as plain text.
pub fn render(state: &AppState) -> String {
    let mut out = String::new();

    match state.account {
        Some(account) => {
            let _ = writeln!(out, "User account: {account}");
        }
        None => {
            let _ = writeln!(out, "User account: (not authorized, type `authorize`)");
        }
    }
    let _ = writeln!(out, "NFT Balance:   {}", state.balances.nft_count);
    let _ = writeln!(out, "BUSD Balance:  {}", state.balances.busd);
    let _ = writeln!(out, "MMPRO Balance: {}", state.balances.mmpro);
    let _ = writeln!(out, "NFT Price:     {}", state.balances.nft_price);
    out.push('\n');

    let _ = writeln!(out, "[buy token]{}", pending_suffix(&state.buy));
    let _ = writeln!(out, "[sell <token id>]{}", pending_suffix(&state.sell));
    out.push_str(RULE);
    out.push('\n');

    out.push_str("List Tokens:\n");
    for token in state.tokens.owned() {
        let _ = writeln!(out, "  #{token}");
    }
    if state.token_list_loading() {
        if state.scan.is_running() {
            let _ = writeln!(out, "{LOADING} ({:.0}%)", state.scan.fraction() * 100.0);
        } else {
            let _ = writeln!(out, "{LOADING}");
        }
    }
    if let ScanProgress::Failed { reason } = &state.scan {
        let _ = writeln!(out, "(history incomplete: {reason})");
    } else if state.scan.is_complete() && !state.token_list_in_sync() {
        let _ = writeln!(
            out,
            "(list shows {} but balance is {})",
            state.tokens.owned_count(),
            state.balances.nft_count
        );
    }
    out.push_str(RULE);
    out.push('\n');

    if state.popup.visible {
        out.push_str(&render_popup(state));
    }

    if let Some(status) = &state.status {
        let _ = writeln!(out, "> {status}");
    }
    out
}

fn pending_suffix(flow: &TxFlow) -> String {
    if flow.is_pending() {
        format!(" {LOADING}")
    } else {
        match &flow.last {
            Some(TxOutcome::Reverted(reason)) => format!(" (last attempt failed: {reason})"),
            _ => String::new(),
        }
    }
}

fn render_popup(state: &AppState) -> String {
    let mut out = String::new();
    out.push_str("+--------------------------------------+\n");
    out.push_str("| Need allow some busd to trade.       |\n");
    out.push_str("| allow <amount> | close               |\n");
    out.push_str("+--------------------------------------+\n");
    if state.popup.approve.is_pending() {
        let _ = writeln!(out, "{LOADING}");
    }
    out
}
