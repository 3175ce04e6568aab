use std::{sync::Arc, time::Duration};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::{
    auth::{auth_middleware, host_middleware},
    configuration::{DatabaseSettings, DraftSettings, Settings},
    hooks::DraftHooks,
    retention::spawn_purge_task,
    routes::{
        count_drafts, discard_draft, document_renamed, editor, get_draft, list_drafts,
        publish_succeeded, save_draft,
    },
    store::{DraftStore, SqliteDraftStore},
    sync::DraftSyncService,
};

pub struct Application {
    listener: TcpListener,
    router: Router,
    port: u16,
}

pub struct ApplicationState {
    pub store: Arc<dyn DraftStore>,
    pub sync: DraftSyncService,
    pub hooks: DraftHooks,
    pub drafts: DraftSettings,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = TcpListener::bind(address).await?;
        let port = listener.local_addr()?.port();

        let store = SqliteDraftStore::new(get_connection_pool(&settings.database));
        store
            .migrate()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let store: Arc<dyn DraftStore> = Arc::new(store);

        if let Some(lifespan_days) = settings.drafts.lifespan_days {
            if settings.drafts.purge_interval_secs > 0 {
                spawn_purge_task(
                    store.clone(),
                    lifespan_days,
                    Duration::from_secs(settings.drafts.purge_interval_secs),
                );
            }
        }

        let application_state = Arc::new(ApplicationState {
            sync: DraftSyncService::new(store.clone()),
            hooks: DraftHooks::new(store.clone()),
            store,
            drafts: settings.drafts,
        });

        let hooks = Router::new()
            .route("/hooks/document-renamed", post(document_renamed))
            .route("/hooks/publish-succeeded", post(publish_succeeded))
            .route_layer(middleware::from_fn_with_state(
                settings.application.hook_signing_key,
                host_middleware,
            ));

        let router = Router::new()
            .route("/drafts", get(list_drafts))
            .route("/drafts/save", post(save_draft))
            .route("/drafts/count", get(count_drafts))
            .route("/drafts/:draft_id", get(get_draft).delete(discard_draft))
            .route("/editor", get(editor))
            .route_layer(middleware::from_fn_with_state(
                settings.application.signing_key,
                auth_middleware,
            ))
            .merge(hooks)
            .route("/", get(|| async { "Hello from drafts server" }))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default().level(tracing::Level::INFO)),
            )
            .with_state(application_state);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy_with(settings.connect_options())
}
