use std::time::Duration;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("invalid period {0:?}, must be greater than zero")]
    InvalidPeriod(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_period_message() {
        let e = Error::InvalidPeriod(Duration::ZERO);
        assert_eq!(e.to_string(), "invalid period 0ns, must be greater than zero");
    }
}
