//! End-to-end command and reminder-run tests against an in-memory store.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate, Utc};

use bday_bot::handler::{ADD_USAGE, BAD_DATE, EMPTY_LIST, REMOVE_USAGE, RUN_DONE};
use bday_bot::{Command, CommandHandler, ReminderRunner};
use bday_core::ChannelId;
use bday_notify::{Dispatcher, Notifier, NotifyError};
use bday_store::BirthdayStore;

const CHAT: ChannelId = ChannelId(-1001);
const OTHER_CHAT: ChannelId = ChannelId(42);

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(ChannelId, String)>>,
    fail_for: Option<ChannelId>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError> {
        if self.fail_for == Some(channel) {
            return Err(NotifyError::Api("Forbidden: bot was kicked".to_string()));
        }
        self.sent.lock().unwrap().push((channel, text.to_string()));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn setup_with(
    notifier: Arc<RecordingNotifier>,
    import_path: PathBuf,
) -> (CommandHandler, Arc<ReminderRunner>) {
    let store = BirthdayStore::in_memory().await.unwrap();
    let runner = Arc::new(ReminderRunner::new(
        Arc::new(store.clone()),
        Dispatcher::new(notifier),
        chrono_tz::UTC,
    ));
    let handler = CommandHandler::new(store, runner.clone(), import_path);
    (handler, runner)
}

async fn setup() -> (CommandHandler, Arc<ReminderRunner>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let (handler, runner) = setup_with(notifier.clone(), PathBuf::from("missing.csv")).await;
    (handler, runner, notifier)
}

async fn send(handler: &CommandHandler, chat: ChannelId, text: &str) -> String {
    let command = Command::parse(text).expect("command");
    handler.handle(chat, command).await.unwrap()
}

#[tokio::test]
async fn add_then_list() {
    let (handler, _, _) = setup().await;

    let reply = send(&handler, CHAT, "/add Alice 1990-04-10 3").await;
    assert!(reply.starts_with("OK, added: Alice"), "{reply}");

    let reply = send(&handler, CHAT, "/add Alice 1990-04-10 3").await;
    assert!(reply.starts_with("Already on the list"), "{reply}");

    let list = send(&handler, CHAT, "/list").await;
    assert!(list.starts_with("Birthdays:"));
    assert!(list.contains("#1 Alice — 1990-04-10 (3 d. ahead)"), "{list}");
}

#[tokio::test]
async fn add_validates_arguments() {
    let (handler, _, _) = setup().await;
    assert_eq!(send(&handler, CHAT, "/add").await, ADD_USAGE);
    assert_eq!(send(&handler, CHAT, "/add Alice 10.04.1990").await, BAD_DATE);
    assert_eq!(send(&handler, CHAT, "/list").await, EMPTY_LIST);
}

#[tokio::test]
async fn negative_lead_is_stored_as_zero() {
    let (handler, _, _) = setup().await;
    send(&handler, CHAT, "/add Bob 1985-01-02 -4").await;
    let list = send(&handler, CHAT, "/list").await;
    assert!(list.contains("Bob — 1985-01-02 (0 d. ahead)"), "{list}");
}

#[tokio::test]
async fn remove_by_name_and_scope() {
    let (handler, _, _) = setup().await;
    send(&handler, CHAT, "/add Alice 1990-04-10").await;
    send(&handler, OTHER_CHAT, "/add Alice 1990-04-10").await;

    assert_eq!(send(&handler, CHAT, "/remove").await, REMOVE_USAGE);
    assert_eq!(send(&handler, CHAT, "/remove Alice").await, "Removed.");
    assert_eq!(send(&handler, CHAT, "/remove Alice").await, "Nothing found.");
    assert!(send(&handler, OTHER_CHAT, "/list").await.contains("Alice"));
}

#[tokio::test]
async fn run_delivers_one_message_per_chat() {
    let (handler, runner, notifier) = setup().await;
    send(&handler, CHAT, "/add Alice 1990-04-10").await;
    send(&handler, CHAT, "/add Bob 1985-04-13 3").await;
    send(&handler, OTHER_CHAT, "/add Carol 2000-07-01").await;

    let summary = runner.run_for_date(date(2024, 4, 10)).await.unwrap();
    assert_eq!(summary.due, 2);
    assert_eq!(summary.channels, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.failed, 0);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, CHAT);
    assert_eq!(
        sent[0].1,
        "🎉 Today is Alice's birthday! Congratulations 🥳🥳🥳\n\n\
         ⏰ In 3 d. — Bob's birthday (13.04)"
    );
}

#[tokio::test]
async fn nothing_due_sends_nothing() {
    let (handler, runner, notifier) = setup().await;
    send(&handler, CHAT, "/add Alice 1990-04-10").await;

    let summary = runner.run_for_date(date(2024, 4, 11)).await.unwrap();
    assert_eq!(summary.due, 0);
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn leap_day_birthday_fires_on_feb_28() {
    let (handler, runner, notifier) = setup().await;
    send(&handler, CHAT, "/add Leo 2000-02-29").await;

    runner.run_for_date(date(2023, 2, 28)).await.unwrap();
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Leo's birthday"));
}

#[tokio::test]
async fn failed_channel_does_not_block_others() {
    let notifier = Arc::new(RecordingNotifier {
        sent: Mutex::new(Vec::new()),
        fail_for: Some(CHAT),
    });
    let (handler, runner) = setup_with(notifier.clone(), PathBuf::from("missing.csv")).await;
    send(&handler, CHAT, "/add Alice 1990-04-10").await;
    send(&handler, OTHER_CHAT, "/add Carol 1990-04-10").await;

    let summary = runner.run_for_date(date(2024, 4, 10)).await.unwrap();
    assert_eq!(summary.channels, 2);
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(notifier.sent.lock().unwrap()[0].0, OTHER_CHAT);
}

#[tokio::test]
async fn import_local_reports_counts() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "\u{feff}Имя;Дата;Дни\nAlice;1990-04-10;3\nBob;not-a-date;1\nCarol;2000-07-01;\n"
    )
    .unwrap();
    file.flush().unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let (handler, _) = setup_with(notifier, file.path().to_path_buf()).await;

    assert_eq!(
        send(&handler, CHAT, "/import_local").await,
        "Imported: 2 (skipped 1 bad rows)"
    );
    // Re-importing adds nothing new.
    assert_eq!(
        send(&handler, CHAT, "/import_local").await,
        "Imported: 0 (skipped 1 bad rows)"
    );
    let list = send(&handler, CHAT, "/list").await;
    assert!(list.contains("Alice") && list.contains("Carol"));
}

#[tokio::test]
async fn import_local_missing_file_and_bad_header() {
    let (handler, _, _) = setup().await;
    let reply = send(&handler, CHAT, "/import_local").await;
    assert!(reply.contains("not found"), "{reply}");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "who,when\nAlice,1990-04-10").unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let (handler, _) = setup_with(notifier, file.path().to_path_buf()).await;
    let reply = send(&handler, CHAT, "/import_local").await;
    assert!(reply.starts_with("Import failed"), "{reply}");
}

#[tokio::test]
async fn start_shows_commands() {
    let (handler, _, _) = setup().await;
    let reply = send(&handler, CHAT, "/start").await;
    assert!(reply.contains("/add") && reply.contains("/remove"));
}

#[tokio::test]
async fn test_now_runs_for_current_date() {
    let (handler, _, notifier) = setup().await;
    // Leap year base keeps a Feb 29 run date valid.
    let today = Utc::now().date_naive();
    let birthday = format!("2000-{:02}-{:02}", today.month(), today.day());
    send(&handler, CHAT, &format!("/add Tess {birthday}")).await;

    assert_eq!(send(&handler, CHAT, "/test_now").await, RUN_DONE);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, CHAT);
    assert_eq!(sent[0].1, "🎉 Today is Tess's birthday! Congratulations 🥳🥳🥳");
}
