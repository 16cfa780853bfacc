use crate::github::{Lookup, Profile, Repo, UserLookup};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::warn;

pub const USER_NOT_FOUND: &str = "User not found";
pub const NETWORK_ERROR: &str = "네트워크 오류가 발생했습니다.";

const ALERT_TTL: Duration = Duration::from_secs(3);

/// Messages consumed by the application loop: terminal key events and
/// completed lookups, all through one channel.
#[derive(Debug)]
pub enum Action {
    Key(KeyEvent),
    LookupDone {
        seq: u64,
        result: Result<Lookup, String>,
    },
}

/// Content of the main display region.
#[derive(Debug)]
pub enum Display {
    Empty,
    Loading,
    Profile {
        profile: Profile,
        repos: Vec<Repo>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Warning,
    Danger,
}

/// Banner message with its own expiry deadline. Showing a new alert replaces
/// the deadline too, so an earlier alert's expiry can never dismiss a later
/// one.
#[derive(Debug)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: &'static str,
    expires_at: Instant,
}

pub struct App {
    pub input: String,
    pub display: Display,
    pub alert: Option<Alert>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    seq: u64,
    client: Arc<dyn UserLookup>,
    tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(client: Arc<dyn UserLookup>, tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            input: String::new(),
            display: Display::Empty,
            alert: None,
            spinner_frame: 0,
            should_quit: false,
            seq: 0,
            client,
            tx,
        }
    }

    /// Pre-fill the search field, as if the user had typed it.
    pub fn set_query(&mut self, query: &str) {
        self.input = query.to_string();
        self.on_input_changed();
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.handle_key(key),
            Action::LookupDone { seq, result } => {
                // A newer search owns the display; drop anything stale.
                if seq != self.seq {
                    return;
                }
                match result {
                    Ok(Lookup::Found { profile, repos }) => {
                        self.alert = None;
                        self.display = Display::Profile { profile, repos };
                    }
                    Ok(Lookup::NotFound) => {
                        self.display = Display::Empty;
                        self.show_alert(AlertKind::Warning, USER_NOT_FOUND);
                    }
                    Err(err) => {
                        warn!(%err, "lookup failed");
                        self.display = Display::Empty;
                        self.show_alert(AlertKind::Danger, NETWORK_ERROR);
                    }
                }
            }
        }
    }

    /// Advance the spinner and expire the alert once its deadline passes.
    pub fn tick(&mut self, now: Instant) {
        if self.alert.as_ref().is_some_and(|a| now >= a.expires_at) {
            self.alert = None;
        }
        if matches!(self.display, Display::Loading) {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.on_input_changed();
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.on_input_changed();
            }
            _ => {}
        }
    }

    /// Every edit of the search field re-runs the search rule; there is no
    /// debounce.
    fn on_input_changed(&mut self) {
        // Whatever was in flight belongs to an older search now.
        self.seq += 1;

        let username = self.input.trim();
        if username.is_empty() {
            self.display = Display::Empty;
            return;
        }

        self.display = Display::Loading;
        self.spawn_lookup(username.to_string(), self.seq);
    }

    fn spawn_lookup(&self, username: String, seq: u64) {
        let tx = self.tx.clone();
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let result = client
                .lookup(&username)
                .await
                .map_err(|e| format!("{e:#}"));
            tx.send(Action::LookupDone { seq, result }).ok();
        });
    }

    pub(crate) fn show_alert(&mut self, kind: AlertKind, message: &'static str) {
        self.alert = Some(Alert {
            kind,
            message,
            expires_at: Instant::now() + ALERT_TTL,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockUserLookup;

    fn sample_profile() -> Profile {
        Profile {
            login: "octocat".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/583231?v=4".to_string(),
            html_url: "https://github.com/octocat".to_string(),
            public_repos: 8,
            public_gists: 8,
            followers: 12345,
            following: 9,
            company: Some("@github".to_string()),
            blog: Some("https://github.blog".to_string()),
            location: Some("San Francisco".to_string()),
            created_at: "2011-01-25T18:44:36Z".parse().unwrap(),
        }
    }

    fn sample_repos() -> Vec<Repo> {
        vec![Repo {
            name: "Hello-World".to_string(),
            html_url: "https://github.com/octocat/Hello-World".to_string(),
            stargazers_count: 3,
            watchers_count: 3,
            forks_count: 2,
        }]
    }

    fn app_with(mock: MockUserLookup) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(mock), tx), rx)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::from(KeyCode::Char(c))
    }

    #[tokio::test]
    async fn whitespace_only_input_clears_without_fetch() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().times(0);
        let (mut app, mut rx) = app_with(mock);

        app.update(Action::Key(key(' ')));

        assert!(matches!(app.display, Display::Empty));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_keystroke_triggers_a_lookup() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup()
            .times(2)
            .returning(|_| Ok(Lookup::NotFound));
        let (mut app, mut rx) = app_with(mock);

        app.update(Action::Key(key('o')));
        assert!(matches!(app.display, Display::Loading));
        app.update(Action::Key(key('c')));

        // Both lookups complete; only the one for the current search applies.
        for _ in 0..2 {
            let action = rx.recv().await.unwrap();
            app.update(action);
        }
        assert!(matches!(app.display, Display::Empty));
        assert_eq!(app.alert.as_ref().unwrap().kind, AlertKind::Warning);
    }

    #[tokio::test]
    async fn lookup_sends_trimmed_username() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup()
            .withf(|u| u == "rust")
            .returning(|_| Ok(Lookup::NotFound));
        let (mut app, mut rx) = app_with(mock);

        app.set_query(" rust ");
        rx.recv().await.unwrap();
    }

    #[tokio::test]
    async fn found_renders_profile_and_clears_alert() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().returning(|_| Ok(Lookup::NotFound));
        let (mut app, _rx) = app_with(mock);

        app.update(Action::Key(key('o')));
        app.show_alert(AlertKind::Warning, USER_NOT_FOUND);

        app.update(Action::LookupDone {
            seq: app.seq,
            result: Ok(Lookup::Found {
                profile: sample_profile(),
                repos: sample_repos(),
            }),
        });

        assert!(app.alert.is_none());
        match &app.display {
            Display::Profile { profile, repos } => {
                assert_eq!(profile.login, "octocat");
                assert_eq!(repos.len(), 1);
            }
            other => panic!("expected profile display, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_result_is_dropped() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().returning(|_| Ok(Lookup::NotFound));
        let (mut app, _rx) = app_with(mock);

        app.update(Action::Key(key('a')));
        let stale = app.seq;
        app.update(Action::Key(key('b')));

        app.update(Action::LookupDone {
            seq: stale,
            result: Ok(Lookup::Found {
                profile: sample_profile(),
                repos: vec![],
            }),
        });

        // The older search no longer owns the display.
        assert!(matches!(app.display, Display::Loading));
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn emptying_input_invalidates_inflight_lookup() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().returning(|_| Ok(Lookup::NotFound));
        let (mut app, _rx) = app_with(mock);

        app.update(Action::Key(key('a')));
        let inflight = app.seq;
        app.update(Action::Key(KeyEvent::from(KeyCode::Backspace)));

        assert!(matches!(app.display, Display::Empty));

        app.update(Action::LookupDone {
            seq: inflight,
            result: Ok(Lookup::Found {
                profile: sample_profile(),
                repos: vec![],
            }),
        });

        assert!(matches!(app.display, Display::Empty));
    }

    #[tokio::test]
    async fn not_found_shows_warning_and_clears_display() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().returning(|_| Ok(Lookup::NotFound));
        let (mut app, _rx) = app_with(mock);

        app.update(Action::Key(key('x')));
        app.update(Action::LookupDone {
            seq: app.seq,
            result: Ok(Lookup::NotFound),
        });

        assert!(matches!(app.display, Display::Empty));
        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert_eq!(alert.message, USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn transport_failure_shows_danger_alert() {
        let mut mock = MockUserLookup::new();
        mock.expect_lookup().returning(|_| Ok(Lookup::NotFound));
        let (mut app, _rx) = app_with(mock);

        app.update(Action::Key(key('x')));
        app.update(Action::LookupDone {
            seq: app.seq,
            result: Err("connection refused".to_string()),
        });

        assert!(matches!(app.display, Display::Empty));
        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Danger);
        assert_eq!(alert.message, NETWORK_ERROR);
    }

    #[tokio::test]
    async fn alert_expires_after_its_deadline() {
        let (mut app, _rx) = app_with(MockUserLookup::new());

        app.show_alert(AlertKind::Warning, USER_NOT_FOUND);
        let shown = Instant::now();

        app.tick(shown);
        assert!(app.alert.is_some());

        app.tick(shown + ALERT_TTL + Duration::from_millis(100));
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn new_alert_replaces_the_old_deadline() {
        let (mut app, _rx) = app_with(MockUserLookup::new());

        // First alert is already due when the second one replaces it.
        app.alert = Some(Alert {
            kind: AlertKind::Warning,
            message: USER_NOT_FOUND,
            expires_at: Instant::now() - Duration::from_millis(1),
        });
        app.show_alert(AlertKind::Danger, NETWORK_ERROR);

        app.tick(Instant::now());
        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Danger);
    }

    #[tokio::test]
    async fn escape_quits() {
        let (mut app, _rx) = app_with(MockUserLookup::new());

        app.update(Action::Key(KeyEvent::from(KeyCode::Esc)));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let (mut app, _rx) = app_with(MockUserLookup::new());

        app.update(Action::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit);
    }
}
