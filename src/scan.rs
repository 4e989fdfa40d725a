use crate::directory::Directory;
use crate::mention;
use crate::slack::{ChannelRecord, MessageRecord};
use crate::tally::Tally;
use crate::window::ReportWindow;

/// A message is worth parsing only when every gate holds: usable in-window
/// timestamp, text present and matching the mention syntax, author present
/// and eligible. Messages failing any gate are skipped silently.
pub fn in_scope(message: &MessageRecord, window: &ReportWindow, roster: &Directory) -> bool {
    let Some(ts) = message.timestamp() else {
        return false;
    };
    if !window.contains(ts) {
        return false;
    }
    let Some(text) = message.text.as_deref() else {
        return false;
    };
    if !mention::matches(text) {
        return false;
    }
    message
        .user
        .as_deref()
        .is_some_and(|user| roster.is_eligible(user))
}

/// Fold one channel's history into the tally, in message order. Returns how
/// many mentions were recorded.
pub fn scan_channel(
    channel: &ChannelRecord,
    messages: &[MessageRecord],
    window: &ReportWindow,
    roster: &Directory,
    archive_url: &str,
    tally: &mut Tally,
) -> usize {
    let mut recorded = 0;
    for message in messages {
        if !in_scope(message, window, roster) {
            continue;
        }
        let (Some(text), Some(author), Some(ts)) = (
            message.text.as_deref(),
            message.user.as_deref(),
            message.ts_label(),
        ) else {
            continue;
        };
        let Some(mention) = mention::parse(text) else {
            continue;
        };
        let link = mention::archive_link(archive_url, &channel.name, &ts, &mention.comment);
        tally.record(&mention.recipient, author, link);
        recorded += 1;
    }
    recorded
}
