//! Query parameter extractors for list endpoints.

use serde::Deserialize;

use crate::http::error::AppError;

/// Pagination for message listings. Without a limit every message is returned.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.limit.is_some_and(|l| l < 0) || self.offset.is_some_and(|o| o < 0) {
            return Err(AppError::Validation(
                "limit and offset must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_are_rejected() {
        assert!(PageQuery { limit: Some(-1), offset: None }.validate().is_err());
        assert!(PageQuery { limit: None, offset: Some(-5) }.validate().is_err());
        assert!(PageQuery { limit: Some(10), offset: Some(0) }.validate().is_ok());
        assert!(PageQuery::default().validate().is_ok());
    }
}
