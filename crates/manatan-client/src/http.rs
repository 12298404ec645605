use std::time::Duration;

use manatan_config::network::NetworkConfig;
use manatan_config::ocr::OcrConfig;
use manatan_types::{ChapterStatus, GroupingMode, LookupResponse, OcrBlock, TextRegion};
use serde::Serialize;
use serde_json::Value;

use crate::{ChapterBackend, ClientError, LookupBackend, OcrBackend, SubtitleSource};

/// Talks to the OCR/dictionary server configured in [`NetworkConfig`].
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    network: NetworkConfig,
    ocr: OcrConfig,
}

impl HttpClient {
    pub fn new(network: &NetworkConfig, ocr: &OcrConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            network: network.clone(),
            ocr: ocr.clone(),
        })
    }

    fn credential_params(&self) -> Vec<(&'static str, String)> {
        match self.network.credentials() {
            Some((user, pass)) => vec![("user", user.to_string()), ("pass", pass.to_string())],
            None => Vec::new(),
        }
    }

    async fn post_json(
        &self,
        context: &'static str,
        path: &str,
        body: &ChapterRequest<'_>,
    ) -> Result<Value, ClientError> {
        let response = self
            .client
            .post(self.network.endpoint(path))
            .json(body)
            .send()
            .await?;
        let response = ClientError::check(context, response)?;
        Ok(response.json::<Value>().await?)
    }

    fn chapter_request<'a>(
        &'a self,
        base_url: &'a str,
        context: &'a str,
        pages: Option<Vec<String>>,
    ) -> ChapterRequest<'a> {
        let (user, pass) = match self.network.credentials() {
            Some((user, pass)) => (Some(user), Some(pass)),
            None => (None, None),
        };
        ChapterRequest {
            base_url,
            context,
            user,
            pass,
            pages,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChapterRequest<'a> {
    base_url: &'a str,
    context: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<String>>,
}

/// The OCR endpoint must answer with an array of blocks; anything else is a
/// failed fetch.
pub fn parse_ocr_body(value: Value) -> Result<Vec<TextRegion>, ClientError> {
    if !value.is_array() {
        return Err(ClientError::InvalidResponse(format!(
            "expected an array of blocks, got {}",
            value_kind(&value)
        )));
    }
    let blocks: Vec<OcrBlock> = serde_json::from_value(value)?;
    Ok(blocks.into_iter().map(TextRegion::from).collect())
}

/// Unknown or missing status values read as idle.
pub fn parse_chapter_status(value: Value) -> ChapterStatus {
    serde_json::from_value(value).unwrap_or_default()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait::async_trait]
impl OcrBackend for HttpClient {
    async fn fetch_regions(
        &self,
        image_url: &str,
        add_space_on_merge: bool,
    ) -> Result<Vec<TextRegion>, ClientError> {
        let mut params = vec![
            ("url", image_url.to_string()),
            ("add_space_on_merge", add_space_on_merge.to_string()),
        ];
        params.extend(self.credential_params());

        let response = self
            .client
            .get(self.network.endpoint(&self.ocr.ocr_path))
            .query(&params)
            .send()
            .await?;
        let body = ClientError::check("OCR", response)?.json::<Value>().await?;
        let regions = parse_ocr_body(body)?;
        tracing::debug!(url = %image_url, regions = regions.len(), "OCR response");
        Ok(regions)
    }
}

#[async_trait::async_trait]
impl LookupBackend for HttpClient {
    async fn lookup(
        &self,
        text: &str,
        byte_offset: usize,
        grouping: GroupingMode,
    ) -> Result<LookupResponse, ClientError> {
        let mut params = vec![
            ("text", text.to_string()),
            ("index", byte_offset.to_string()),
            ("groupingMode", grouping.as_str().to_string()),
        ];
        params.extend(self.credential_params());

        let response = self
            .client
            .get(self.network.endpoint(&self.ocr.lookup_path))
            .query(&params)
            .send()
            .await?;
        let body = ClientError::check("Lookup", response)?.json::<Value>().await?;
        Ok(LookupResponse::from_value(body)?)
    }
}

#[async_trait::async_trait]
impl ChapterBackend for HttpClient {
    async fn check_status(&self, base_url: &str) -> Result<ChapterStatus, ClientError> {
        let body = self.chapter_request(base_url, "Check Status", None);
        let value = self
            .post_json("Chapter status", &self.ocr.chapter_status_path, &body)
            .await?;
        Ok(parse_chapter_status(value))
    }

    async fn preprocess(
        &self,
        base_url: &str,
        context: &str,
        pages: Option<Vec<String>>,
    ) -> Result<(), ClientError> {
        if pages.as_ref().is_some_and(|p| p.is_empty()) {
            return Err(ClientError::InvalidResponse("no pages to process".into()));
        }
        let body = self.chapter_request(base_url, context, pages);
        self.post_json("Chapter preprocess", &self.ocr.chapter_preprocess_path, &body)
            .await?;
        tracing::info!(base_url, "chapter queued for preprocessing");
        Ok(())
    }
}

#[async_trait::async_trait]
impl SubtitleSource for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ClientError> {
        let response = self.client.get(self.network.endpoint(url)).send().await?;
        Ok(ClientError::check("Subtitle download", response)?
            .text()
            .await?)
    }
}
