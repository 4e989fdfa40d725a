/// Links credited to one sender, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderTally {
    pub sender: String,
    pub links: Vec<String>,
}

/// Everything credited to one recipient, senders in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientTally {
    pub recipient: String,
    pub senders: Vec<SenderTally>,
}

/// Nested recipient → sender → links accumulation.
///
/// Backed by Vecs so first-insertion order is a stated property of the
/// report layout rather than an accident of map iteration. Entries are only
/// ever appended, never removed or overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    recipients: Vec<RecipientTally>,
}

impl Tally {
    /// Credit `recipient` with one link from `sender`.
    pub fn record(&mut self, recipient: &str, sender: &str, link: String) {
        let idx = self
            .recipients
            .iter()
            .position(|r| r.recipient == recipient)
            .unwrap_or_else(|| {
                self.recipients.push(RecipientTally {
                    recipient: recipient.to_string(),
                    senders: Vec::new(),
                });
                self.recipients.len() - 1
            });
        let entry = &mut self.recipients[idx];

        let sidx = entry
            .senders
            .iter()
            .position(|s| s.sender == sender)
            .unwrap_or_else(|| {
                entry.senders.push(SenderTally {
                    sender: sender.to_string(),
                    links: Vec::new(),
                });
                entry.senders.len() - 1
            });
        entry.senders[sidx].links.push(link);
    }

    /// Sum of every sender's link count.
    pub fn total(&self) -> usize {
        self.recipients
            .iter()
            .flat_map(|r| &r.senders)
            .map(|s| s.links.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Recipients in first-insertion order.
    pub fn recipients(&self) -> impl Iterator<Item = &RecipientTally> {
        self.recipients.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_recipient_then_sender_in_order() {
        let mut tally = Tally::default();
        tally.record("A", "B", "c1".into());
        tally.record("A", "B", "c2".into());
        tally.record("A", "C", "c3".into());

        let recipients: Vec<_> = tally.recipients().collect();
        assert_eq!(recipients.len(), 1);
        let a = recipients[0];
        assert_eq!(a.recipient, "A");
        assert_eq!(a.senders.len(), 2);
        assert_eq!(a.senders[0].sender, "B");
        assert_eq!(a.senders[0].links, vec!["c1", "c2"]);
        assert_eq!(a.senders[1].sender, "C");
        assert_eq!(a.senders[1].links, vec!["c3"]);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn recipients_keep_first_seen_order() {
        let mut tally = Tally::default();
        tally.record("Z", "S1", "l1".into());
        tally.record("A", "S1", "l2".into());
        tally.record("Z", "S2", "l3".into());

        let order: Vec<_> = tally.recipients().map(|r| r.recipient.as_str()).collect();
        assert_eq!(order, vec!["Z", "A"]);
    }

    #[test]
    fn empty_tally_totals_zero() {
        let tally = Tally::default();
        assert!(tally.is_empty());
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.recipients().count(), 0);
    }
}
