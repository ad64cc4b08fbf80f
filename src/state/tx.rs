use alloy_primitives::TxHash;

/// Where one transaction flow is. Idle -> Sending -> Pending -> Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxPhase {
    #[default]
    Idle,
    /// Requested, not yet accepted by the node
    Sending,
    /// Accepted, waiting for one confirmation
    Pending(TxHash),
}

/// How the last attempt of a flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed,
    Reverted(String),
    /// Buy reverted for lack of BUSD allowance
    AllowanceRequired,
}

/// State of one flow: its phase plus the last outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxFlow {
    pub phase: TxPhase,
    pub last: Option<TxOutcome>,
}

impl TxFlow {
    /// The pending flag shown next to the button.
    pub fn is_pending(&self) -> bool {
        self.phase != TxPhase::Idle
    }

    /// Start a new attempt. Returns false if one is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.phase = TxPhase::Sending;
        true
    }

    pub fn submitted(&mut self, tx_hash: TxHash) {
        self.phase = TxPhase::Pending(tx_hash);
    }

    pub fn finish(&mut self, outcome: TxOutcome) {
        self.phase = TxPhase::Idle;
        self.last = Some(outcome);
    }
}
