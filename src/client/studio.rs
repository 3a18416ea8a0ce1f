use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra::*;
use crate::logger::*;
use crate::session::*;
use crate::settings::Settings;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything a front end needs, wired from [`Settings`].
pub struct Studio {
    pub auth_service: Arc<dyn AuthService>,
    pub generation_service: Arc<dyn GenerationService>,
    pub billing_service: Arc<dyn BillingService>,
    pub project_service: Arc<dyn ProjectService>,
    pub community_service: Arc<dyn CommunityService>,
    pub api: Arc<ApiClient>,
    pub events: Arc<EventBus>,
    refresher: Arc<Refresher>,
    refresher_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Studio {
    pub fn try_new(settings: &Settings, cancel: CancellationToken) -> anyhow::Result<Self> {
        let transport: Arc<dyn HttpTransport> = match settings.api.backend.as_str() {
            "fake" => Arc::new(ScriptedTransport::demo()),
            "http" => Arc::new(ReqwestTransport::try_new(
                &settings.api.base_url,
                settings.api.timeout(),
            )?),
            other => return Err(anyhow::anyhow!("Unknown api backend: {}", other)),
        };

        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(
            PathBuf::from(&settings.session.storage_path),
        ));
        let navigator: Arc<dyn Navigator> = Arc::new(ShutdownNavigator::new(cancel.clone()));

        Ok(Self::assemble(
            transport,
            storage,
            navigator,
            &settings.api.refresh_path,
            &settings.session.login_path,
            settings.session.refresh_interval(),
            cancel,
        ))
    }

    /// Wires the session core and services around the given ports.
    pub fn assemble(
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        refresh_path: &str,
        login_path: &str,
        refresh_interval: std::time::Duration,
        cancel: CancellationToken,
    ) -> Self {
        let tokens = Arc::new(TokenStore::new(storage));
        tokens.load_from_storage();

        let events = Arc::new(EventBus::new());
        redirect_on_session_end(&events, navigator.clone(), login_path);

        let token_refresher = Arc::new(TokenRefresher::new(
            transport.clone(),
            tokens,
            events.clone(),
            refresh_path,
        ));
        let api = Arc::new(ApiClient::new(transport, token_refresher.clone()));
        let refresher = Arc::new(Refresher::new(
            token_refresher,
            navigator,
            login_path,
            refresh_interval,
        ));

        Self {
            auth_service: Arc::new(HttpAuthService::new(api.clone())),
            generation_service: Arc::new(HttpGenerationService::new(api.clone())),
            billing_service: Arc::new(HttpBillingService::new(api.clone())),
            project_service: Arc::new(HttpProjectService::new(api.clone())),
            community_service: Arc::new(HttpCommunityService::new(api.clone())),
            api,
            events,
            refresher,
            refresher_handle: Mutex::new(None),
            cancel,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.api.tokens()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Starts the background refresher. Calling it again is a no-op.
    pub fn start_refresher(&self) {
        if let Ok(mut lock) = self.refresher_handle.lock() {
            if lock.is_none() {
                *lock = Some(self.refresher.clone().spawn(self.cancel.child_token()));
            }
        }
    }

    pub async fn shutdown(&self) {
        info!("studio shutting down...");

        self.cancel.cancel();

        let handle = self
            .refresher_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("refresher handle dropped: {:?}", r);
        }
    }
}
