//! In-memory wiki used by the integration tests.
//!
//! Pages live in insertion order. The sheet upload replaces rows by key
//! column, which is the behaviour the publishers rely on from a real wiki.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use torque_sync_core::contract::{ApiCall, RemotePage, WikiTransport};
use torque_sync_core::model::{Competition, Record, Toc, DEFAULT_TITLE_COLUMN};
use torque_sync_core::TransportError;

#[derive(Default)]
pub struct FakeWiki {
    pub calls: Mutex<Vec<ApiCall>>,
    pub pages: Mutex<Vec<(String, String)>>,
    pub saves: Mutex<Vec<String>>,
    /// Sheet rows by key, merged on every upload.
    pub sheet: Mutex<BTreeMap<String, String>>,
    pub failing_titles: HashSet<String>,
    /// Raw actions that are recorded and then answered with an API error.
    pub failing_actions: HashSet<String>,
}

impl FakeWiki {
    pub fn with_pages(pages: &[(&str, &str)]) -> Self {
        let wiki = Self::default();
        *wiki.pages.lock().unwrap() = pages
            .iter()
            .map(|(t, c)| (t.to_string(), c.to_string()))
            .collect();
        wiki
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    pub fn failing_action(mut self, action: &str) -> Self {
        self.failing_actions.insert(action.to_string());
        self
    }

    pub fn calls_for(&self, action: &str) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.action == action)
            .cloned()
            .collect()
    }

    pub fn page(&self, title: &str) -> Option<String> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, c)| c.clone())
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    fn merge_sheet(&self, call: &ApiCall) {
        let Some(key_column) = call.params.get("key_column") else {
            return;
        };
        let Some(data) = call.files.get("data_file") else {
            return;
        };
        let mut rdr = csv::Reader::from_reader(data.as_slice());
        let Ok(headers) = rdr.headers().cloned() else {
            return;
        };
        let Some(idx) = headers.iter().position(|h| h == key_column) else {
            return;
        };
        let mut sheet = self.sheet.lock().unwrap();
        for row in rdr.records().flatten() {
            let key = row.get(idx).unwrap_or_default().to_string();
            sheet.insert(key, row.iter().collect::<Vec<_>>().join(","));
        }
    }
}

#[async_trait]
impl WikiTransport for FakeWiki {
    async fn raw_call(&self, call: ApiCall) -> Result<serde_json::Value, TransportError> {
        if call.action == "torquedataconnectuploadsheet" {
            self.merge_sheet(&call);
        }
        let failing = self.failing_actions.contains(&call.action);
        self.calls.lock().unwrap().push(call);
        if failing {
            return Err(TransportError::Api {
                code: "internal_api_error".to_string(),
                info: "upload rejected".to_string(),
            });
        }
        Ok(serde_json::json!({"result": "Success"}))
    }

    async fn fetch_page(&self, title: &str) -> Result<RemotePage, TransportError> {
        if self.failing_titles.contains(title) {
            return Err(TransportError::Network(format!("connection reset fetching {title}")));
        }
        Ok(match self.page(title) {
            Some(content) => RemotePage::existing(title, content),
            None => RemotePage::missing(title),
        })
    }

    async fn save_page(&self, title: &str, body: &str) -> Result<(), TransportError> {
        self.saves.lock().unwrap().push(title.to_string());
        let mut pages = self.pages.lock().unwrap();
        match pages.iter_mut().find(|(t, _)| t == title) {
            Some(page) => page.1 = body.to_string(),
            None => pages.push((title.to_string(), body.to_string())),
        }
        Ok(())
    }

    async fn list_all_pages(&self) -> Result<Vec<RemotePage>, TransportError> {
        Ok(self
            .pages
            .lock()
            .unwrap()
            .iter()
            .map(|(t, c)| RemotePage::existing(t.clone(), c.clone()))
            .collect())
    }
}

pub fn record(key: &str, title: Option<&str>) -> Record {
    let mut cells = HashMap::new();
    cells.insert("Key".to_string(), key.to_string());
    if let Some(title) = title {
        cells.insert(DEFAULT_TITLE_COLUMN.to_string(), title.to_string());
    }
    Record::new(key, cells)
}

pub fn competition(records: Vec<Record>) -> Competition {
    Competition::new(
        vec!["Key".to_string(), DEFAULT_TITLE_COLUMN.to_string()],
        "Key",
        records,
    )
}

pub fn toc(name: &str, raw: bool) -> Toc {
    Toc {
        name: name.to_string(),
        template: b"{{ toc }}".to_vec(),
        grouped_data: serde_json::json!({"groups": {"North": ["p1"], "South": ["p2"]}}),
        raw,
    }
}
