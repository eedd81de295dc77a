use vigil_db::feed::FeedRequest;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vgl feed`. The feed is read as `--actor`.
pub async fn handle(
    id: &str,
    cursor: Option<String>,
    limit: Option<u32>,
    if_none_match: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if let Some(etag) = if_none_match {
        if ctx.feed.is_not_modified(id, etag).await? {
            tracing::debug!(investigation_id = id, etag, "feed not modified");
            return output(
                &serde_json::json!({ "not_modified": true, "etag": etag }),
                flags.format,
            );
        }
    }

    let mut request = FeedRequest::new(id, flags.actor.as_str());
    if let Some(cursor) = cursor {
        request = request.cursor(cursor);
    }
    if let Some(limit) = limit {
        request = request.limit(limit);
    }

    let page = ctx.feed.fetch(&request).await?;
    output(&page, flags.format)
}
