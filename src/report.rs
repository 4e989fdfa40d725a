use std::fmt::Write;

use crate::directory::Directory;
use crate::tally::Tally;
use crate::window::ReportWindow;

/// Render the posted summary. Pure: the same window, roster, and tally
/// always produce byte-identical text.
///
/// Recipients no longer present in the roster (deleted between scan and
/// render) are dropped without comment; the header counts rendered lines,
/// so it never disagrees with the visible body.
pub fn render(window: &ReportWindow, roster: &Directory, tally: &Tally) -> String {
    let mut body = String::new();
    let mut rendered = 0;
    for entry in tally.recipients() {
        let Some(recipient) = roster.names(&entry.recipient) else {
            continue;
        };
        let _ = writeln!(body, ">{}", recipient.real_name);
        for per_sender in &entry.senders {
            let sender_name = roster
                .names(&per_sender.sender)
                .map_or(per_sender.sender.as_str(), |names| names.real_name.as_str());
            for link in &per_sender.links {
                let _ = writeln!(body, ">:thumbsup: {sender_name}: {link}");
                rendered += 1;
            }
        }
        body.push_str(">\n");
    }
    format!(
        "Likes for {}: {} in total.\n{}",
        window.label(),
        rendered,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::MemberRecord;
    use crate::window;
    use chrono::NaiveDate;

    fn member(id: &str, real_name: &str) -> MemberRecord {
        MemberRecord {
            id: id.into(),
            deleted: false,
            is_restricted: Some(false),
            is_ultra_restricted: Some(false),
            is_bot: Some(false),
            name: real_name.to_lowercase(),
            real_name: Some(real_name.into()),
        }
    }

    fn fixtures() -> (ReportWindow, Directory) {
        let window =
            window::resolve(NaiveDate::from_ymd_opt(2026, 8, 4).unwrap(), chrono_tz::UTC).unwrap();
        let roster = Directory::from_members(vec![
            member("U_A", "Alice Park"),
            member("U_B", "Bob Lim"),
            member("U_C", "Carol Diaz"),
        ]);
        (window, roster)
    }

    #[test]
    fn empty_tally_renders_header_only() {
        let (window, roster) = fixtures();
        let text = render(&window, &roster, &Tally::default());
        assert_eq!(
            text,
            "Likes for 2026/08/03 00:00:00 - 2026/08/03 23:59:59: 0 in total.\n"
        );
    }

    #[test]
    fn renders_recipient_blocks_in_tally_order() {
        let (window, roster) = fixtures();
        let mut tally = Tally::default();
        tally.record("U_A", "U_B", "<url1|great work>".into());
        tally.record("U_A", "U_C", "<url2|LINK>".into());
        tally.record("U_C", "U_B", "<url3|thanks>".into());

        let text = render(&window, &roster, &tally);
        let expected = "Likes for 2026/08/03 00:00:00 - 2026/08/03 23:59:59: 3 in total.\n\
                        >Alice Park\n\
                        >:thumbsup: Bob Lim: <url1|great work>\n\
                        >:thumbsup: Carol Diaz: <url2|LINK>\n\
                        >\n\
                        >Carol Diaz\n\
                        >:thumbsup: Bob Lim: <url3|thanks>\n\
                        >\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn unknown_recipients_are_dropped_and_not_counted() {
        let (window, roster) = fixtures();
        let mut tally = Tally::default();
        tally.record("U_GONE", "U_B", "<url1|x>".into());
        tally.record("U_A", "U_B", "<url2|y>".into());

        let text = render(&window, &roster, &tally);
        assert!(text.starts_with("Likes for 2026/08/03 00:00:00 - 2026/08/03 23:59:59: 1 in total."));
        assert!(!text.contains("U_GONE"));
        assert!(text.contains(">Alice Park\n"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let (window, roster) = fixtures();
        let mut tally = Tally::default();
        tally.record("U_B", "U_A", "<url|LINK>".into());

        let first = render(&window, &roster, &tally);
        let second = render(&window, &roster, &tally);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_sender_falls_back_to_id() {
        let (window, roster) = fixtures();
        let mut tally = Tally::default();
        tally.record("U_A", "U_MYSTERY", "<url|x>".into());

        let text = render(&window, &roster, &tally);
        assert!(text.contains(">:thumbsup: U_MYSTERY: <url|x>\n"));
    }
}
