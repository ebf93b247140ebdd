use serde::Deserialize;
use ::validator::Validate;

pub mod badge;
pub mod bookmark;
pub mod brand;
pub mod follow;
pub mod newsletter;
pub mod tag;
pub mod upload;
pub mod user;
pub mod validator;

/// `skip`/`take` query parameters. Each listing picks its own default page size.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Pagination {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub skip: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub take: Option<i64>,
}

impl Pagination {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    pub fn take_or(&self, default: i64) -> i64 {
        self.take.unwrap_or(default)
    }
}
