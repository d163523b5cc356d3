use crate::browser::BrowserDialog;
use anyhow::Context;
use quill_config::{AppConfig, ConfigManager, DialogConfig};
use quill_core::{Clock, OutcomeBoard, SystemClock};
use quill_document::DialogOptions;
use quill_graph::{Dispatcher, FileStage, GraphClient};
use quill_security::{OAuthSessionProvider, SecretStore, SessionContext, SessionStore};
use std::path::Path;
use std::sync::Arc;

pub fn load_config(config_dir: Option<&Path>) -> anyhow::Result<(ConfigManager, AppConfig)> {
    let config_manager = match config_dir {
        Some(dir) => ConfigManager::with_root(dir),
        None => ConfigManager::new(),
    }
    .context("initialize config manager")?;
    let config = config_manager.load().context("load app config")?;
    Ok((config_manager, config))
}

pub fn dialog_options(config: &DialogConfig) -> DialogOptions {
    DialogOptions {
        height_percent: config.height_percent,
        width_percent: config.width_percent,
        display_in_iframe: config.display_in_iframe,
    }
}

pub struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) provider: Arc<OAuthSessionProvider>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) session: SessionContext,
    pub(crate) stage: FileStage,
    pub(crate) outcomes: OutcomeBoard,
    pub(crate) dialog: BrowserDialog,
}

impl AppState {
    pub fn initialize(
        config_path: &Path,
        config: AppConfig,
        dialog: BrowserDialog,
    ) -> anyhow::Result<Self> {
        let store: Arc<dyn SessionStore> =
            Arc::new(SecretStore::new(config.keychain.service_name.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let provider = OAuthSessionProvider::new(config.oauth.clone(), store.clone(), clock.clone())
            .with_context(|| {
                format!(
                    "invalid [oauth] settings in {}",
                    config_path.display()
                )
            })?;
        let provider = Arc::new(provider);

        let graph = GraphClient::new(config.graph.base_url.clone());
        let dispatcher = Dispatcher::new(graph, provider.clone(), clock)
            .with_upload_folder(config.graph.upload_folder.clone());

        let session = SessionContext::initialize(store).context("restore saved session")?;
        let stage = FileStage::new(config.graph.default_file_name.clone());

        Ok(Self {
            config,
            provider,
            dispatcher,
            session,
            stage,
            outcomes: OutcomeBoard::default(),
            dialog,
        })
    }

    pub fn dialog_options(&self) -> DialogOptions {
        dialog_options(&self.config.dialog)
    }
}
