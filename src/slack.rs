use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Slack Web API base URL.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Page size for cursor-paginated list calls.
const PAGE_LIMIT: u32 = 200;

/// Maximum pages fetched per list call (50 × 200 = 10,000 records).
const MAX_PAGES: usize = 50;

/// One entry from users.list.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
    pub is_restricted: Option<bool>,
    pub is_ultra_restricted: Option<bool>,
    pub is_bot: Option<bool>,
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

impl MemberRecord {
    /// Eligible only when every gating flag is present and false.
    pub fn is_eligible(&self) -> bool {
        !self.deleted
            && self.is_restricted == Some(false)
            && self.is_ultra_restricted == Some(false)
            && self.is_bot == Some(false)
    }
}

/// One entry from conversations.list.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
}

/// One entry from conversations.history. Every field is optional on the
/// wire; the filter decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ts: Option<serde_json::Value>,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageRecord {
    /// Timestamp as seconds since the epoch. Slack sends `ts` as a decimal
    /// string; some exports carry plain numbers.
    pub fn timestamp(&self) -> Option<f64> {
        match self.ts.as_ref()? {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Raw timestamp text, as used in archive permalinks.
    pub fn ts_label(&self) -> Option<String> {
        match self.ts.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Body posted to the incoming webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub channel: String,
    pub username: String,
    pub text: String,
    pub icon_emoji: String,
}

#[derive(Debug, Deserialize)]
struct MembersPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    members: Vec<MemberRecord>,
    #[serde(default)]
    response_metadata: Option<PageCursor>,
}

#[derive(Debug, Deserialize)]
struct ChannelsPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelRecord>,
    #[serde(default)]
    response_metadata: Option<PageCursor>,
}

#[derive(Debug, Deserialize)]
struct HistoryPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<MessageRecord>,
    #[serde(default)]
    response_metadata: Option<PageCursor>,
}

#[derive(Debug, Deserialize)]
struct PageCursor {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

/// Blocking Slack Web API client. One synchronous request per call, no
/// shared state beyond the token.
pub struct SlackClient {
    token: String,
}

impl SlackClient {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// Verify the token; returns the authed user id.
    pub fn auth_test(&self) -> anyhow::Result<String> {
        let body = self.call("auth.test", &[])?;
        let response: AuthTestResponse =
            serde_json::from_str(&body).context("parsing auth.test response")?;
        check_ok(response.ok, response.error.as_deref(), "auth.test")?;
        response
            .user_id
            .ok_or_else(|| anyhow::anyhow!("auth.test response carried no user_id"))
    }

    /// Full member snapshot from users.list.
    pub fn list_members(&self) -> anyhow::Result<Vec<MemberRecord>> {
        let mut members = Vec::new();
        let mut cursor = String::new();
        for _ in 0..MAX_PAGES {
            let params = paged_params(&cursor);
            let body = self.call("users.list", &params)?;
            let page: MembersPage =
                serde_json::from_str(&body).context("parsing users.list response")?;
            check_ok(page.ok, page.error.as_deref(), "users.list")?;
            members.extend(page.members);
            cursor = next_cursor(page.response_metadata);
            if cursor.is_empty() {
                return Ok(members);
            }
        }
        tracing::warn!(
            pages = MAX_PAGES,
            "users.list pagination cap hit, member list may be truncated"
        );
        Ok(members)
    }

    /// Unarchived public channels from conversations.list.
    pub fn list_channels(&self) -> anyhow::Result<Vec<ChannelRecord>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();
        for _ in 0..MAX_PAGES {
            let mut params = paged_params(&cursor);
            params.push(("exclude_archived", "true".to_string()));
            params.push(("types", "public_channel".to_string()));
            let body = self.call("conversations.list", &params)?;
            let page: ChannelsPage =
                serde_json::from_str(&body).context("parsing conversations.list response")?;
            check_ok(page.ok, page.error.as_deref(), "conversations.list")?;
            channels.extend(page.channels);
            cursor = next_cursor(page.response_metadata);
            if cursor.is_empty() {
                return Ok(channels);
            }
        }
        tracing::warn!(
            pages = MAX_PAGES,
            "conversations.list pagination cap hit, channel list may be truncated"
        );
        Ok(channels)
    }

    /// Recent messages for one channel from conversations.history.
    pub fn channel_history(&self, channel_id: &str) -> anyhow::Result<Vec<MessageRecord>> {
        let mut messages = Vec::new();
        let mut cursor = String::new();
        for _ in 0..MAX_PAGES {
            let mut params = paged_params(&cursor);
            params.push(("channel", channel_id.to_string()));
            let body = self.call("conversations.history", &params)?;
            let page: HistoryPage =
                serde_json::from_str(&body).context("parsing conversations.history response")?;
            check_ok(page.ok, page.error.as_deref(), "conversations.history")?;
            messages.extend(page.messages);
            cursor = next_cursor(page.response_metadata);
            if cursor.is_empty() {
                return Ok(messages);
            }
        }
        tracing::warn!(
            channel = channel_id,
            pages = MAX_PAGES,
            "conversations.history pagination cap hit, history may be truncated"
        );
        Ok(messages)
    }

    fn call(&self, method: &str, params: &[(&str, String)]) -> anyhow::Result<String> {
        let url = format!("{SLACK_API_BASE}/{method}");
        let mut request =
            ureq::get(&url).header("authorization", format!("Bearer {}", self.token));
        for (key, value) in params {
            request = request.query(*key, value);
        }
        let body = request
            .call()
            .with_context(|| format!("calling {method}"))?
            .into_body()
            .read_to_string()
            .with_context(|| format!("reading {method} response"))?;
        Ok(body)
    }
}

/// Deliver the rendered report. Fire-and-forget: no retry lives here.
pub fn post_webhook(webhook_url: &str, payload: &WebhookPayload) -> anyhow::Result<()> {
    let body = serde_json::to_string(payload).context("serializing webhook payload")?;
    ureq::post(webhook_url)
        .header("content-type", "application/json")
        .send(body.as_str())
        .context("posting report webhook")?;
    Ok(())
}

fn paged_params(cursor: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", PAGE_LIMIT.to_string())];
    if !cursor.is_empty() {
        params.push(("cursor", cursor.to_string()));
    }
    params
}

fn next_cursor(metadata: Option<PageCursor>) -> String {
    metadata.map(|m| m.next_cursor).unwrap_or_default()
}

fn check_ok(ok: bool, error: Option<&str>, method: &str) -> anyhow::Result<()> {
    if ok {
        Ok(())
    } else {
        anyhow::bail!("{method} failed: {}", error.unwrap_or("unknown error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_with_missing_flags_deserializes() {
        let member: MemberRecord =
            serde_json::from_str(r#"{"id": "U1", "name": "alice"}"#).unwrap();
        assert!(!member.deleted);
        assert_eq!(member.is_restricted, None);
        assert!(!member.is_eligible());
    }

    #[test]
    fn member_with_all_flags_false_is_eligible() {
        let member: MemberRecord = serde_json::from_str(
            r#"{
                "id": "U1",
                "deleted": false,
                "is_restricted": false,
                "is_ultra_restricted": false,
                "is_bot": false,
                "name": "alice",
                "real_name": "Alice Park"
            }"#,
        )
        .unwrap();
        assert!(member.is_eligible());
    }

    #[test]
    fn message_timestamp_accepts_string_and_number() {
        let as_string: MessageRecord =
            serde_json::from_str(r#"{"ts": "1722902400.000200"}"#).unwrap();
        assert_eq!(as_string.timestamp(), Some(1_722_902_400.0002));
        assert_eq!(as_string.ts_label().as_deref(), Some("1722902400.000200"));

        let as_number: MessageRecord = serde_json::from_str(r#"{"ts": 1722902400}"#).unwrap();
        assert_eq!(as_number.timestamp(), Some(1_722_902_400.0));
        assert_eq!(as_number.ts_label().as_deref(), Some("1722902400"));
    }

    #[test]
    fn message_without_ts_has_no_timestamp() {
        let message: MessageRecord = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(message.timestamp(), None);

        let garbled: MessageRecord = serde_json::from_str(r#"{"ts": "not-a-number"}"#).unwrap();
        assert_eq!(garbled.timestamp(), None);
    }

    #[test]
    fn envelope_error_is_surfaced() {
        let page: MembersPage =
            serde_json::from_str(r#"{"ok": false, "error": "invalid_auth"}"#).unwrap();
        let err = check_ok(page.ok, page.error.as_deref(), "users.list").unwrap_err();
        assert!(err.to_string().contains("invalid_auth"));
    }

    #[test]
    fn webhook_payload_uses_wire_field_names() {
        let payload = WebhookPayload {
            channel: "#like-counter".into(),
            username: "Like Counter".into(),
            text: "hello".into(),
            icon_emoji: ":thumbsup:".into(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""icon_emoji":":thumbsup:""#));
        assert!(json.contains(r#""channel":"#));
    }

    #[test]
    fn cursor_pagination_stops_on_empty_cursor() {
        let page: ChannelsPage = serde_json::from_str(
            r#"{"ok": true, "channels": [{"id": "C1", "name": "dev"}],
                "response_metadata": {"next_cursor": ""}}"#,
        )
        .unwrap();
        assert_eq!(page.channels.len(), 1);
        assert!(next_cursor(page.response_metadata).is_empty());
    }
}
