use thiserror::Error;

// Kept separate from plumbing failures so callers can tell bad client
// input apart from upstream trouble.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{what} too long: {len} bytes (max {max})")]
    TooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("dfx failed: {0}")]
    DfxFailed(String),

    #[error(
        "dfx not found. Install it with: sh -ci \"$(curl -fsSL https://internetcomputer.org/install.sh)\""
    )]
    DfxNotFound,
}

impl WalletError {
    // Bad caller input, as opposed to an upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WalletError::TooLong { .. }
                | WalletError::UnknownToken(_)
                | WalletError::InvalidAmount(_)
        )
    }
}
