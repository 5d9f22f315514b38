use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use weathercards_core::Config;
use weathercards_weather::{DataStore, Debouncer, RemoteStore, SyncEvent, ThemeStore};

use crate::command::Command;
use crate::error_mapping::StoreErrorExt;
use crate::render;
use crate::session::{Session, View};

/// Receivers the run loop polls besides user input
pub struct SessionChannels {
    /// Debounced search box values
    pub suggestions: UnboundedReceiver<String>,
    /// Background sync outcomes
    pub sync: UnboundedReceiver<SyncEvent>,
}

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from the user's config file
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wire a session to the configured remote store
    pub fn create_session(&self) -> Result<(Session, SessionChannels)> {
        let remote_config = &self.config.remote;
        let remote = RemoteStore::with_timeout(
            &remote_config.base_url,
            Duration::from_secs(remote_config.timeout_secs),
        )
        .map_err(StoreErrorExt::into_app_error)?
        .with_dataset_path(remote_config.dataset_path.clone());

        let (store, sync) = DataStore::new(remote, store_policy(self.config.sync.policy));
        let themes = ThemeStore::open(&self.config.config_dir);
        let (debouncer, suggestions) =
            Debouncer::new(Duration::from_millis(self.config.search.debounce_ms));

        tracing::info!(
            "Session using {} with {:?} sync policy",
            remote_config.base_url,
            self.config.sync.policy
        );

        Ok((
            Session::new(store, themes, debouncer),
            SessionChannels { suggestions, sync },
        ))
    }

    /// Read commands from `input` until `/quit` or end of input, printing to `out`.
    ///
    /// Changes still syncing at exit are waited for, up to the request timeout.
    pub async fn run<R, W>(&self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let (mut session, mut channels) = self.create_session()?;

        let views = session.start().await;
        write_views(&mut out, &views, &session)?;

        let mut lines = input.lines();
        loop {
            let views = tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::debug!("End of input");
                        break;
                    };
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => session.handle(command).await,
                        Err(e) => session.input_error(e),
                    }
                }
                Some(query) = channels.suggestions.recv() => session.on_debounced(&query),
                Some(event) = channels.sync.recv() => session.on_sync_event(event),
            };
            write_views(&mut out, &views, &session)?;
        }

        self.drain(&mut session, &mut channels.sync, &mut out).await
    }

    /// Wait for outstanding syncs so their failures are still reported
    async fn drain<W: Write>(
        &self,
        session: &mut Session,
        sync: &mut UnboundedReceiver<SyncEvent>,
        out: &mut W,
    ) -> Result<()> {
        let timeout = Duration::from_secs(self.config.remote.timeout_secs);

        while session.store().pending_syncs() > 0 {
            match tokio::time::timeout(timeout, sync.recv()).await {
                Ok(Some(event)) => {
                    let views = session.on_sync_event(event);
                    write_views(out, &views, session)?;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Gave up waiting for {} pending changes",
                        session.store().pending_syncs()
                    );
                    break;
                }
            }
        }

        while let Ok(event) = sync.try_recv() {
            let views = session.on_sync_event(event);
            write_views(out, &views, session)?;
        }

        tracing::info!("Session closed");
        Ok(())
    }
}

fn store_policy(policy: weathercards_core::SyncPolicy) -> weathercards_weather::SyncPolicy {
    match policy {
        weathercards_core::SyncPolicy::KeepLocal => weathercards_weather::SyncPolicy::KeepLocal,
        weathercards_core::SyncPolicy::RevertOnFailure => {
            weathercards_weather::SyncPolicy::RevertOnFailure
        }
    }
}

fn write_views<W: Write>(out: &mut W, views: &[View], session: &Session) -> Result<()> {
    let palette = session.palette();
    for view in views {
        if let Some(text) = render::view(view, &palette) {
            writeln!(out, "{}", text)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app_for(server: &MockServer, dir: &std::path::Path) -> App {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(503))
            .mount(server)
            .await;

        let mut config = Config::default();
        config.config_dir = dir.to_path_buf();
        config.remote.base_url = server.uri();
        config.search.debounce_ms = 20;
        App::with_config(config)
    }

    #[tokio::test]
    async fn test_run_search_and_theme() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let app = app_for(&server, dir.path()).await;

        let input: &[u8] = b"/search mombasa\n/theme\n/fly\n/quit\n/search nairobi\n";
        let mut out = Vec::new();
        app.run(input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Weather in Mombasa"));
        assert!(out.contains("Temperature: 28°C (82.4°F)"));
        assert!(out.contains("Theme: dark"));
        assert!(out.contains("Unknown command. Type /help for a list."));
        assert!(!out.contains("Weather in Nairobi"));

        let prefs = std::fs::read_to_string(dir.path().join("preferences.json")).unwrap();
        assert!(prefs.contains("\"dark\""));
    }

    #[tokio::test]
    async fn test_end_of_input_waits_for_sync() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/weather/1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let app = app_for(&server, dir.path()).await;

        let input: &[u8] = b"/search nairobi\n/edit 30\n";
        let mut out = Vec::new();
        app.run(input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Temperature: 30°C (86°F)"));
        assert!(out.contains("Failed to update city data"));
    }
}
