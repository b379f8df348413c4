//! Assignment & Grades Service (AGS) client for LTI tools.
//!
//! Implements the line-item/result/score wire protocol against a
//! platform's grade service. Every operation is gated on the capability
//! set the platform granted via its OAuth2 scope grant; a missing grant
//! fails synchronously, before any network access.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lti_ags::{AgsCapabilities, AgsClient, LineItem, Score};
//!
//! let client = AgsClient::builder()
//!     .line_items_url(endpoint.lineitems.unwrap())
//!     .access_token(access_token)
//!     .capabilities(AgsCapabilities::from_scopes(&endpoint.scope))
//!     .build()?;
//!
//! let item = client.create_line_item(&LineItem::new("Quiz 1", 100.0)).await?;
//! client.score(item.id.as_deref().unwrap(), &Score::graded("user-42", 83.0, 100.0)).await?;
//! ```

pub mod capabilities;
pub mod client;
pub mod error;
pub mod model;
pub mod query;

pub use capabilities::{
    AgsCapabilities, SCOPE_LINE_ITEM, SCOPE_LINE_ITEM_READONLY, SCOPE_RESULT_READONLY, SCOPE_SCORE,
};
pub use client::{AgsClient, AgsClientBuilder, ListLineItemsFilter, ResultsFilter};
pub use error::{AgsError, Result};
pub use model::{ActivityProgress, GradingProgress, LineItem, LineItemResult, Score};
pub use query::QueryBuilder;
