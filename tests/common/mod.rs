#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use movie_scraper::driver::{Driver, DriverError};
use movie_scraper::images::ImageSource;
use movie_scraper::model::MovieRecord;
use movie_scraper::waits::{SCROLL_HEIGHT, SCROLL_OFFSET};

/// In-memory DOM node. Matches a selector when the selector string is one of
/// its `selectors`, exactly as the scrapers spell them.
#[derive(Debug, Clone, Default)]
pub struct Node {
    selectors: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(selector: &str) -> Self {
        Node {
            selectors: vec![selector.to_string()],
            ..Node::default()
        }
    }

    pub fn also(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    fn label(&self) -> String {
        self.selectors.first().cloned().unwrap_or_default()
    }

    fn matches(&self, selector: &str) -> bool {
        self.selectors.iter().any(|s| s == selector)
    }

    fn collect(&self, selector: &str, out: &mut Vec<Node>) {
        if self.matches(selector) {
            out.push(self.clone());
        }
        for child in &self.children {
            child.collect(selector, out);
        }
    }
}

/// Browser stand-in serving fixed pages by url. Every page reports the same
/// `scroll_height`; scripts and clicks are recorded in order.
#[derive(Default)]
pub struct FakeDriver {
    pages: HashMap<String, Vec<Node>>,
    failing: HashSet<String>,
    scroll_height: i64,
    current: Mutex<Option<String>>,
    visits: Mutex<Vec<String>>,
    scripts: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, nodes: Vec<Node>) -> Self {
        self.pages.insert(url.to_string(), nodes);
        self
    }

    /// Navigation to `url` fails.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn scroll_height(mut self, px: i64) -> Self {
        self.scroll_height = px;
        self
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    /// Number of executed scripts equal to `script`.
    pub fn ran(&self, script: &str) -> usize {
        self.scripts().iter().filter(|s| *s == script).count()
    }

    /// Clicks on elements whose first selector is `selector`.
    pub fn clicks_on(&self, selector: &str) -> usize {
        self.clicks.lock().unwrap().iter().filter(|s| *s == selector).count()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    pub fn visited(&self, url: &str) -> bool {
        self.visits().iter().any(|v| v == url)
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = Node;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.visits.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "connection reset".into(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Node>, DriverError> {
        let current = self.current.lock().unwrap().clone();
        let mut out = Vec::new();
        if let Some(nodes) = current.and_then(|url| self.pages.get(&url)) {
            for node in nodes {
                node.collect(selector, &mut out);
            }
        }
        Ok(out)
    }

    async fn find_within(&self, parent: &Node, selector: &str) -> Result<Vec<Node>, DriverError> {
        let mut out = Vec::new();
        for child in &parent.children {
            child.collect(selector, &mut out);
        }
        Ok(out)
    }

    async fn text(&self, element: &Node) -> Result<String, DriverError> {
        Ok(element.text.clone())
    }

    async fn attribute(&self, element: &Node, name: &str) -> Result<Option<String>, DriverError> {
        Ok(element.attrs.get(name).cloned())
    }

    async fn click(&self, element: &Node) -> Result<(), DriverError> {
        self.clicks.lock().unwrap().push(element.label());
        Ok(())
    }

    async fn execute(&self, script: &str) -> Result<Value, DriverError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(match script {
            SCROLL_OFFSET => Value::from(0),
            SCROLL_HEIGHT => Value::from(self.scroll_height),
            _ => Value::Null,
        })
    }
}

/// Thumbnail bytes are the url itself; urls containing "broken" fail.
pub struct StubImages;

#[async_trait]
impl ImageSource for StubImages {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        if url.is_empty() || url.contains("broken") {
            None
        } else {
            Some(url.as_bytes().to_vec())
        }
    }
}

pub fn record(url: &str, title: &str) -> MovieRecord {
    MovieRecord {
        title: title.to_string(),
        image: Some(vec![0xff, 0xd8]),
        description: format!("{title} aprašymas"),
        release_year: Some(2001),
        duration_minutes: Some(90),
        genre: Some("Drama".to_string()),
        source_url: url.to_string(),
        views: None,
    }
}
