//! Groups due notices per channel and renders one message body each.
//!
//! Grouping is stable: channels appear in order of their first notice and
//! people keep their input order inside the "today" and "upcoming" blocks.

use indexmap::IndexMap;

use bday_core::ChannelId;

use crate::notice::{DueNotice, NoticeKind};

#[derive(Default)]
struct Buckets {
    today: Vec<String>,
    upcoming: Vec<String>,
}

/// Render the day-of line for one person.
pub fn render_today_line(notice: &DueNotice) -> String {
    format!(
        "🎉 Today is {}'s birthday! Congratulations 🥳🥳🥳",
        notice.person_name
    )
}

/// Render the countdown line for one person, with the date as `dd.mm`.
pub fn render_upcoming_line(notice: &DueNotice) -> String {
    format!(
        "⏰ In {} d. — {}'s birthday ({})",
        notice.days_until,
        notice.person_name,
        notice.occurrence.format("%d.%m")
    )
}

/// Aggregate `(channel, notice)` pairs into one body per channel.
///
/// The "today" block comes first, separated from the "upcoming" block by a
/// blank line. Channels without notices are absent from the result.
pub fn aggregate<I>(notices: I) -> IndexMap<ChannelId, String>
where
    I: IntoIterator<Item = (ChannelId, DueNotice)>,
{
    let mut by_channel: IndexMap<ChannelId, Buckets> = IndexMap::new();
    for (channel, notice) in notices {
        let buckets = by_channel.entry(channel).or_default();
        match notice.kind {
            NoticeKind::Today => buckets.today.push(render_today_line(&notice)),
            NoticeKind::Upcoming => buckets.upcoming.push(render_upcoming_line(&notice)),
        }
    }

    by_channel
        .into_iter()
        .filter_map(|(channel, buckets)| {
            let blocks: Vec<String> = [buckets.today, buckets.upcoming]
                .into_iter()
                .filter(|lines| !lines.is_empty())
                .map(|lines| lines.join("\n"))
                .collect();
            if blocks.is_empty() {
                None
            } else {
                Some((channel, blocks.join("\n\n")))
            }
        })
        .collect()
}
