use crate::config::HarvestConfig;
use crate::crawlers::{Browser, BrowserSession};
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// ChromeDriver endpoints tried when the configured WebDriver refuses the connection.
/// Sessions request `goog:chromeOptions`, so whatever server answers must drive Chrome.
const FALLBACK_WEBDRIVER_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:9515", // Try with IP instead of localhost
];

/// Opens a new Chrome session through a WebDriver server for every job
pub struct WebDriverBrowser {
    webdriver_url: String,
    headless: bool,
    poll_interval: Duration,
    next_session: AtomicUsize,
}

impl WebDriverBrowser {
    pub fn new(webdriver_url: &str, headless: bool, poll_interval: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            headless,
            poll_interval,
            next_session: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(&config.webdriver_url, config.headless, config.poll_interval())
    }

    /// Chrome options: maximized window, images disabled, headless unless asked otherwise
    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec!["start-maximized"];
        if self.headless {
            args.push("--headless");
        }

        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "prefs": { "profile.managed_default_content_settings.images": 2 },
            }),
        );
        caps
    }

    async fn connect_to(&self, url: &str) -> std::result::Result<Client, String> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder.connect(url).await.map_err(|e| e.to_string())
    }

    /// Connects to the WebDriver instance, falling back to common local endpoints
    async fn connect(&self, session_id: usize) -> Result<Client> {
        let first_error = match self.connect_to(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!(
                    "Session {} connected to WebDriver at {}",
                    session_id,
                    self.webdriver_url
                );
                return Ok(client);
            }
            Err(e) => e,
        };
        ::log::warn!(
            "Session {} failed to connect to WebDriver at {}: {}",
            session_id,
            self.webdriver_url,
            first_error
        );

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue; // Skip if it's the same as the one we already tried
            }
            if let Ok(client) = self.connect_to(url).await {
                ::log::info!("Session {} connected to fallback WebDriver at {}", session_id, url);
                return Ok(client);
            }
        }

        Err(HarvestError::Session(format!(
            "could not reach a WebDriver server at {} ({}); start ChromeDriver or set WEBDRIVER_URL",
            self.webdriver_url, first_error
        )))
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let client = self.connect(id).await?;
        Ok(Box::new(WebDriverSession {
            id,
            client,
            poll_interval: self.poll_interval,
            current_url: String::new(),
        }))
    }
}

/// One Chrome session driven through fantoccini
pub struct WebDriverSession {
    id: usize,
    client: Client,
    poll_interval: Duration,
    current_url: String,
}

impl WebDriverSession {
    /// Maps a WebDriver command failure onto the harvest error taxonomy
    fn command_error(&self, error: CmdError, context: &str) -> HarvestError {
        let message = error.to_string();
        if message.contains("Unable to find session") || message.contains("invalid session id") {
            ::log::warn!("Session {} lost while {}", self.id, context);
            HarvestError::Session(format!("session lost while {}: {}", context, message))
        } else if message.contains("no such element") {
            HarvestError::missing(context)
        } else {
            HarvestError::Navigation {
                url: self.current_url.clone(),
                reason: format!("{}: {}", context, message),
            }
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        ::log::debug!("Session {} navigating to {}", self.id, url);
        self.current_url = url.to_string();
        self.client.goto(url).await.map_err(|e| {
            if e.to_string().contains("Unable to find session") {
                self.command_error(e, "navigating")
            } else {
                HarvestError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }

    async fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<()> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .every(self.poll_interval)
            .for_element(Locator::Css(css))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(HarvestError::Timeout {
                what: css.to_string(),
                elapsed: timeout,
            }),
            Err(e) => Err(self.command_error(e, css)),
        }
    }

    async fn count(&mut self, css: &str) -> Result<usize> {
        self.client
            .find_all(Locator::Css(css))
            .await
            .map(|found| found.len())
            .map_err(|e| self.command_error(e, css))
    }

    async fn click(&mut self, css: &str, timeout: Duration) -> Result<()> {
        let element = match self
            .client
            .wait()
            .at_most(timeout)
            .every(self.poll_interval)
            .for_element(Locator::Css(css))
            .await
        {
            Ok(element) => element,
            Err(CmdError::WaitTimeout) => return Err(HarvestError::missing(css)),
            Err(e) => return Err(self.command_error(e, css)),
        };
        ::log::trace!("Session {} clicking {}", self.id, css);
        element.click().await.map_err(|e| self.command_error(e, css))
    }

    async fn outer_html(&mut self, css: &str) -> Result<String> {
        let element = self
            .client
            .find(Locator::Css(css))
            .await
            .map_err(|e| self.command_error(e, css))?;
        element.html(false).await.map_err(|e| self.command_error(e, css))
    }

    async fn source(&mut self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| self.command_error(e, "reading page source"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let id = self.id;
        self.client
            .close()
            .await
            .map_err(|e| HarvestError::Session(format!("closing session {}: {}", id, e)))?;
        ::log::debug!("Session {} closed", id);
        Ok(())
    }
}
