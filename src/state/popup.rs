use super::tx::{TxFlow, TxOutcome};

/// Modal asking the user to approve a BUSD allowance for the NFT contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowancePopup {
    pub visible: bool,
    /// Approval transaction started from the popup
    pub approve: TxFlow,
}

impl AllowancePopup {
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Close button. A pending approval keeps running.
    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn approval_confirmed(&mut self) {
        self.approve.finish(TxOutcome::Confirmed);
        self.visible = false;
    }
}
