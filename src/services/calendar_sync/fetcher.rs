use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::models::calendar_source::CalendarSource;

/// Source of raw calendar text for a refresh pass.
#[cfg_attr(test, mockall::automock)]
pub trait CalendarLoader: Send + Sync {
    fn load(&self) -> Result<String>;
}

impl<F> CalendarLoader for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn load(&self) -> Result<String> {
        self()
    }
}

/// Remove embedded NUL bytes some servers emit.
pub fn strip_nul_bytes(content: String) -> String {
    if content.contains('\0') {
        content.replace('\0', "")
    } else {
        content
    }
}

/// Loads one configured URL: a local file or an HTTP(S)/webcal feed.
pub struct IcsFetcher {
    client: Client,
    url: String,
    max_response_bytes: usize,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl IcsFetcher {
    pub fn new(url: impl Into<String>, verify_ssl: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .context("Failed to build ICS fetch HTTP client")?;

        Ok(Self {
            client,
            url: url.into().trim().to_string(),
            max_response_bytes: 5 * 1024 * 1024,
            max_retries: 2,
            retry_delay_ms: 400,
        })
    }

    pub fn from_source(source: &CalendarSource) -> Result<Self> {
        Self::new(source.url.clone(), source.verify_ssl)
    }

    pub fn fetch_ics(&self) -> Result<String> {
        if let Some(path) = self.url.strip_prefix("file://") {
            return Self::read_file(Path::new(path));
        }

        let url = Self::http_url(&self.url)?;
        let redacted = Self::redact_url(&url);
        let attempts = self.max_retries + 1;

        let mut attempt = 1;
        loop {
            match self.fetch_once(&url) {
                Ok(content) => {
                    log::debug!("Fetched {} bytes from {}", content.len(), redacted);
                    return Ok(content);
                }
                Err(err) if attempt < attempts => {
                    log::warn!("Calendar fetch {}/{} for {} failed: {:#}", attempt, attempts, redacted, err);
                    thread::sleep(Duration::from_millis(self.retry_delay_ms));
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "Failed to fetch calendar from {} after {} attempts",
                        redacted, attempts
                    )));
                }
            }
        }
    }

    /// `webcal://` is plain HTTPS.
    fn http_url(url: &str) -> Result<String> {
        if let Some(rest) = url.strip_prefix("webcal://") {
            return Ok(format!("https://{}", rest));
        }
        if url.starts_with("https://") || url.starts_with("http://") {
            return Ok(url.to_string());
        }
        Err(anyhow!("Unsupported calendar URL scheme"))
    }

    fn read_file(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read calendar file {}", path.display()))?;
        String::from_utf8(bytes).context("Calendar file is not valid UTF-8")
    }

    fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().context("Calendar request failed")?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!("Calendar server answered HTTP {}", response.status()));
        }

        // Reject early when the server announces the size
        if let Some(announced) = response.content_length() {
            self.check_size(usize::try_from(announced).unwrap_or(usize::MAX))?;
        }

        let body = response.bytes().context("Failed to read calendar response body")?;
        self.check_size(body.len())?;

        let content = String::from_utf8(body.to_vec()).context("Calendar response is not valid UTF-8")?;
        if !content.contains("BEGIN:VCALENDAR") && !content.contains("BEGIN:VEVENT") {
            return Err(anyhow!("Response is not an iCalendar document"));
        }

        Ok(content)
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.max_response_bytes {
            return Err(anyhow!(
                "Calendar response of {} bytes exceeds the {} byte limit",
                size,
                self.max_response_bytes
            ));
        }
        Ok(())
    }

    /// Keep scheme and host; private calendar URLs embed tokens in the path.
    pub(crate) fn redact_url(url: &str) -> String {
        if let Some(index) = url.find("/calendar/ical/") {
            let prefix_end = index + "/calendar/ical/".len();
            return format!("{}***redacted***", &url[..prefix_end]);
        }

        if let Some(scheme_end) = url.find("://") {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').unwrap_or(rest.len());
            return format!("{}/***redacted***", &url[..scheme_end + 3 + host_end]);
        }

        "***redacted-url***".to_string()
    }
}

impl CalendarLoader for IcsFetcher {
    fn load(&self) -> Result<String> {
        self.fetch_ics()
    }
}
