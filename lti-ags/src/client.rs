//! The capability-gated Assignment & Grades Service client.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::capabilities::AgsCapabilities;
use crate::error::{AgsError, Result};
use crate::model::{LineItem, LineItemResult, Score};
use crate::query::QueryBuilder;

/// Default bound on AGS HTTP round trips.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// AGS media type for a single line item.
pub const MEDIA_TYPE_LINE_ITEM: &str = "application/vnd.ims.lis.v2.lineitem+json";
/// AGS media type for a line-item collection.
pub const MEDIA_TYPE_LINE_ITEM_CONTAINER: &str =
    "application/vnd.ims.lis.v2.lineitemcontainer+json";
/// AGS media type for a result collection.
pub const MEDIA_TYPE_RESULT_CONTAINER: &str =
    "application/vnd.ims.lis.v2.resultcontainer+json";
/// AGS media type for a score update.
pub const MEDIA_TYPE_SCORE: &str = "application/vnd.ims.lis.v1.score+json";

/// Optional filters for the line-item collection.
#[derive(Debug, Clone, Default)]
pub struct ListLineItemsFilter {
    /// Maximum number of items to return.
    pub limit: Option<u32>,
    /// Offset page for a follow-up request.
    pub page: Option<u32>,
    /// Only items coupled to this resource link.
    pub resource_link_id: Option<String>,
    /// Only items carrying this tag.
    pub tag: Option<String>,
    /// Only items carrying this resource id.
    pub resource_id: Option<String>,
}

/// Optional filters for a line item's results.
#[derive(Debug, Clone, Default)]
pub struct ResultsFilter {
    /// Maximum number of results to return.
    pub limit: Option<u32>,
    /// Offset page for a follow-up request.
    pub page: Option<u32>,
    /// Only the result for this user; at most one entry comes back.
    pub user_id: Option<String>,
}

/// REST client for one platform's grade service.
///
/// Built from the line-items collection URL and capability set the launch
/// delivered, plus an access token obtained out-of-band. Every operation
/// checks its capability before any network access and fails with
/// [`AgsError::CapabilityDenied`] when the grant is missing.
///
/// Line-item ids are platform-owned URLs and are used verbatim; only the
/// collection URL is tool-configured. The client never retries: a retried
/// score write risks duplicate submission, so retry policy belongs to the
/// caller.
pub struct AgsClient {
    http: reqwest::Client,
    line_items_url: Url,
    access_token: String,
    capabilities: AgsCapabilities,
}

impl std::fmt::Debug for AgsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgsClient")
            .field("line_items_url", &self.line_items_url)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl AgsClient {
    /// Create a new builder.
    pub fn builder() -> AgsClientBuilder {
        AgsClientBuilder::default()
    }

    /// The granted capability set.
    pub fn capabilities(&self) -> AgsCapabilities {
        self.capabilities
    }

    /// Get the line items of the platform's grade book, optionally
    /// filtered. Results may span multiple pages when `limit` is set.
    pub async fn get_line_items(&self, filter: &ListLineItemsFilter) -> Result<Vec<LineItem>> {
        ensure(
            self.capabilities.can_read_line_items,
            "get_line_items",
            "can_read_line_items",
        )?;

        let query = QueryBuilder::new()
            .param("limit", filter.limit)
            .param("page", filter.page)
            .param("resourceLinkId", filter.resource_link_id.as_deref())
            .param("tag", filter.tag.as_deref())
            .param("resourceId", filter.resource_id.as_deref());

        let mut url = self.line_items_url.clone();
        if !query.is_empty() {
            url.set_query(Some(&query.build()));
        }

        tracing::debug!(%url, "GET line items");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, MEDIA_TYPE_LINE_ITEM_CONTAINER)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Add a new line item. The platform's stored representation comes
    /// back with its assigned id and sub-resource URLs.
    pub async fn create_line_item(&self, line_item: &LineItem) -> Result<LineItem> {
        ensure(
            self.capabilities.can_manage_line_items,
            "create_line_item",
            "can_manage_line_items",
        )?;

        tracing::debug!(url = %self.line_items_url, label = %line_item.label, "POST line item");
        let response = self
            .http
            .post(self.line_items_url.clone())
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, MEDIA_TYPE_LINE_ITEM)
            .header(ACCEPT, MEDIA_TYPE_LINE_ITEM)
            .body(encode_json(line_item)?)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Get the current value of the line item at its platform-assigned URL.
    pub async fn get_line_item(&self, id: &str) -> Result<LineItem> {
        ensure(
            self.capabilities.can_read_line_items,
            "get_line_item",
            "can_read_line_items",
        )?;

        let url = parse_item_url(id)?;
        tracing::debug!(%url, "GET line item");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, MEDIA_TYPE_LINE_ITEM)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Replace the line item's representation. Returns the updated item.
    pub async fn update_line_item(&self, id: &str, line_item: &LineItem) -> Result<LineItem> {
        ensure(
            self.capabilities.can_manage_line_items,
            "update_line_item",
            "can_manage_line_items",
        )?;

        let url = parse_item_url(id)?;
        tracing::debug!(%url, "PUT line item");
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, MEDIA_TYPE_LINE_ITEM)
            .header(ACCEPT, MEDIA_TYPE_LINE_ITEM)
            .body(encode_json(line_item)?)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Remove the line item. The platform may keep it around, no longer
    /// associated with the tool.
    pub async fn delete_line_item(&self, id: &str) -> Result<()> {
        ensure(
            self.capabilities.can_manage_line_items,
            "delete_line_item",
            "can_manage_line_items",
        )?;

        let url = parse_item_url(id)?;
        tracing::debug!(%url, "DELETE line item");
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Get the results for a line item, optionally filtered. With a
    /// `user_id` filter the platform returns at most one result.
    pub async fn get_line_item_results(
        &self,
        id: &str,
        filter: &ResultsFilter,
    ) -> Result<Vec<LineItemResult>> {
        ensure(
            self.capabilities.can_read_grades,
            "get_line_item_results",
            "can_read_grades",
        )?;

        let query = QueryBuilder::new()
            .param("limit", filter.limit)
            .param("page", filter.page)
            .param("userId", filter.user_id.as_deref());

        let mut url = sub_resource_url(id, "results")?;
        if !query.is_empty() {
            url.set_query(Some(&query.build()));
        }

        tracing::debug!(%url, "GET line item results");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, MEDIA_TYPE_RESULT_CONTAINER)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Publish a score update for the line item.
    ///
    /// `Ok(())` means *accepted for processing*, not *graded*: the
    /// platform need not echo a body and may settle the result
    /// asynchronously. Poll [`get_line_item_results`](Self::get_line_item_results)
    /// for the settled grade.
    pub async fn score(&self, line_item_id: &str, score: &Score) -> Result<()> {
        ensure(self.capabilities.can_score, "score", "can_score")?;

        let url = sub_resource_url(line_item_id, "scores")?;
        tracing::debug!(%url, user_id = %score.user_id, "POST score");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, MEDIA_TYPE_SCORE)
            .body(encode_json(score)?)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }
}

fn ensure(granted: bool, operation: &'static str, capability: &'static str) -> Result<()> {
    if granted {
        Ok(())
    } else {
        Err(AgsError::CapabilityDenied {
            operation,
            capability,
        })
    }
}

fn parse_item_url(id: &str) -> Result<Url> {
    Url::parse(id).map_err(|e| AgsError::InvalidUrl(format!("{id}: {e}")))
}

/// Join a sub-resource path onto a platform-assigned line-item URL.
fn sub_resource_url(id: &str, suffix: &str) -> Result<Url> {
    let joined = format!("{}/{suffix}", id.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| AgsError::InvalidUrl(format!("{joined}: {e}")))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AgsError::Decode(e.to_string()))
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AgsError::RemoteRejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = expect_success(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| AgsError::Decode(e.to_string()))
}

/// Builder for [`AgsClient`].
#[derive(Debug, Default)]
pub struct AgsClientBuilder {
    line_items_url: Option<String>,
    access_token: Option<String>,
    capabilities: AgsCapabilities,
    timeout: Option<Duration>,
}

impl AgsClientBuilder {
    /// Set the line-items collection URL from the launch's AGS endpoint.
    pub fn line_items_url(mut self, url: impl Into<String>) -> Self {
        self.line_items_url = Some(url.into());
        self
    }

    /// Set the OAuth2 access token presented on every call.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the granted capability set.
    pub fn capabilities(mut self, capabilities: AgsCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Bound every request with this timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AgsClient> {
        let line_items_url = self
            .line_items_url
            .ok_or_else(|| AgsError::InvalidUrl("line_items_url is required".into()))?;
        let line_items_url = Url::parse(&line_items_url)
            .map_err(|e| AgsError::InvalidUrl(format!("{line_items_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .build()
            .map_err(|e| AgsError::Transport(e.to_string()))?;

        Ok(AgsClient {
            http,
            line_items_url,
            access_token: self.access_token.unwrap_or_default(),
            capabilities: self.capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_resource_url_joins_results_path() {
        let url = sub_resource_url(
            "https://platform.example.edu/course/1/lineitems/7",
            "results",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://platform.example.edu/course/1/lineitems/7/results"
        );

        // Trailing slash on the platform id doesn't double up.
        let url = sub_resource_url(
            "https://platform.example.edu/course/1/lineitems/7/",
            "scores",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://platform.example.edu/course/1/lineitems/7/scores"
        );
    }

    #[test]
    fn test_builder_rejects_bad_collection_url() {
        let err = AgsClient::builder()
            .line_items_url("not a url")
            .access_token("t")
            .build()
            .unwrap_err();
        assert!(matches!(err, AgsError::InvalidUrl(_)));
    }

    #[test]
    fn test_results_query_matches_wire_contract() {
        let query = QueryBuilder::new()
            .param("limit", Some(10))
            .param("page", None::<u32>)
            .param("userId", Some("u1"))
            .build();
        assert_eq!(query, "limit=10&userId=u1");
    }
}
