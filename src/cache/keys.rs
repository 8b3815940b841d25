//! Feed cache key construction.
//!
//! Keys combine sort and category, plus the requesting user for
//! personalized sorts, so personalized results are never served to
//! the wrong user while shared results are shared across users.

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::types::{Category, FeedSort};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    sort: FeedSort,
    category: Category,
    user: Option<String>,
}

impl FeedKey {
    /// Key for a shared (non-personalized) feed.
    pub fn shared(sort: FeedSort, category: Category) -> Result<Self, DomainError> {
        if sort.is_personalized() {
            return Err(DomainError::invariant(
                "personalized sort requires a user-scoped cache key",
            ));
        }
        Ok(Self {
            sort,
            category,
            user: None,
        })
    }

    /// Key for a personalized feed, scoped to one user.
    pub fn personalized(
        sort: FeedSort,
        category: Category,
        user: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !sort.is_personalized() {
            return Err(DomainError::invariant(
                "shared sort must not carry a user in its cache key",
            ));
        }
        Ok(Self {
            sort,
            category,
            user: Some(user.into()),
        })
    }

    pub fn sort(&self) -> FeedSort {
        self.sort
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(
                f,
                "feed:{}:{}:{}",
                self.sort.as_str(),
                user,
                self.category.as_str()
            ),
            None => write!(f, "feed:{}:{}", self.sort.as_str(), self.category.as_str()),
        }
    }
}
