use std::collections::HashMap;
use std::sync::Arc;

use manatan_client::{
    ChapterBackend, HttpClient, JimakuClient, JimakuSearch, LookupBackend, OcrBackend,
    SubtitleSource,
};
use manatan_config::Config;
use manatan_core::chapter::ChapterProcessor;
use manatan_core::generation::RequestGeneration;
use manatan_core::store::BlockStore;
use tokio::sync::{Mutex, RwLock};

/// External collaborators the handlers talk to.
#[derive(Clone)]
pub struct Backends {
    pub ocr: Arc<dyn OcrBackend>,
    pub lookup: Arc<dyn LookupBackend>,
    pub chapter: Arc<dyn ChapterBackend>,
    pub subtitles: Arc<dyn SubtitleSource>,
    pub jimaku: Arc<dyn JimakuSearch>,
}

impl Backends {
    pub fn http(config: &Config) -> anyhow::Result<Self> {
        let http = Arc::new(HttpClient::new(&config.network, &config.ocr)?);
        let jimaku = Arc::new(JimakuClient::new(
            config.subtitle.jimaku_url.clone(),
            config.subtitle.jimaku_api_key.clone(),
        ));
        Ok(Self {
            ocr: http.clone(),
            lookup: http.clone(),
            chapter: http.clone(),
            subtitles: http,
            jimaku,
        })
    }
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub store: RwLock<BlockStore>,
    pub chapters: Mutex<HashMap<String, ChapterProcessor>>,
    pub lookups: RequestGeneration,
    pub subtitle_loads: RequestGeneration,
    pub backends: Backends,
}

impl AppState {
    pub fn new(config: Config, backends: Backends) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store: RwLock::new(BlockStore::new()),
            chapters: Mutex::new(HashMap::new()),
            lookups: RequestGeneration::new(),
            subtitle_loads: RequestGeneration::new(),
            backends,
        }
    }
}
