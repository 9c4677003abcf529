//! Scripted transport for exercising the client without a network
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::transport::{Form, Transport};
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    pub data: Option<Form>,
    /// Bearer token in effect when the call was made
    pub bearer_token: Option<String>,
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    bearer_token: Option<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `path`
    pub fn respond(self, path: &str, response: Result<Value>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        data: Option<Form>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            base_url: base_url.to_string(),
            path: path.to_string(),
            data,
            bearer_token: self.bearer_token.clone(),
        });

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);

        next.unwrap_or_else(|| {
            Err(Error::request(
                format!("{}/{}", base_url, path),
                "no scripted response",
            ))
        })
    }

    fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}
