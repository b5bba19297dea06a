use std::time::Duration;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use reqwest::Url;
use serde::Deserialize;

use crate::error::FetchError;

pub const DEFAULT_WORD_SOURCE_URL: &str = "https://random-word-api.herokuapp.com/word";

static LANG_DIR: Dir = include_dir!("src/lang");

/// Supplier of target words. Implementations block, so callers run them
/// off the UI thread.
pub trait WordSource: Send + Sync + 'static {
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, FetchError>;
}

/// `GET <base>?number=<count>` returning a JSON array of strings
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpWordSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl WordSource for HttpWordSource {
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, FetchError> {
        let url = words_url(&self.base_url, count)?;
        log::debug!("fetching words from {url}");

        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        parse_words(&resp.text()?)
    }
}

pub fn words_url(base: &str, count: usize) -> Result<Url, FetchError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("number", &count.to_string());
    Ok(url)
}

pub fn parse_words(body: &str) -> Result<Vec<String>, FetchError> {
    let words: Vec<String> = serde_json::from_str(body)?;
    if words.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(words)
}

#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    pub fn load(name: &str) -> Option<Self> {
        let file = LANG_DIR.get_file(format!("{name}.json"))?;
        serde_json::from_str(file.contents_utf8()?).ok()
    }
}

/// Offline source drawing random words from a list compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledWordSource {
    language: Language,
}

impl BundledWordSource {
    pub fn new(name: &str) -> Option<Self> {
        Language::load(name).map(|language| Self { language })
    }

    pub fn english() -> Option<Self> {
        Self::new("english")
    }

    pub fn language(&self) -> &Language {
        &self.language
    }
}

impl WordSource for BundledWordSource {
    fn fetch_words(&self, count: usize) -> Result<Vec<String>, FetchError> {
        let mut rng = rand::thread_rng();
        let words: Vec<String> = (0..count)
            .filter_map(|_| self.language.words.choose(&mut rng).cloned())
            .collect();
        if words.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(words)
    }
}

/// Fixed word list, handed out whole on every fetch
#[derive(Debug, Clone)]
pub struct StaticWordSource {
    words: Vec<String>,
}

impl StaticWordSource {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.split_whitespace().map(str::to_string).collect())
    }
}

impl WordSource for StaticWordSource {
    fn fetch_words(&self, _count: usize) -> Result<Vec<String>, FetchError> {
        if self.words.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(self.words.clone())
    }
}

/// Always fails; stands in for an unreachable word service
#[derive(Debug, Clone, Default)]
pub struct FailingWordSource;

impl WordSource for FailingWordSource {
    fn fetch_words(&self, _count: usize) -> Result<Vec<String>, FetchError> {
        Err(FetchError::Empty)
    }
}
