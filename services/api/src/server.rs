use crate::accounts::{account_router, AccountService};
use crate::cli::ServeArgs;
use crate::demo::seed_demo_data;
use crate::infra::{
    AppState, CredentialStore, InMemoryApplicationRepository, InMemoryIdentityDirectory,
    InMemoryJobDirectory,
};
use crate::routes::{file_router, with_operational_routes};
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use job_portal::auth::{Authenticator, TokenService};
use job_portal::config::{AppConfig, ScoringConfig, StorageConfig};
use job_portal::error::AppError;
use job_portal::jobs::{job_router, JobService};
use job_portal::profiles::{profile_router, ObjectStoreResumeStore, ProfileService};
use job_portal::scoring::HttpScoringClient;
use job_portal::telemetry;
use job_portal::workflows::applications::{application_router, ApplicationWorkflow};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) type PortalWorkflow = ApplicationWorkflow<InMemoryApplicationRepository, HttpScoringClient>;

/// Every store and service the HTTP surface needs, wired together.
pub(crate) struct Portal {
    pub(crate) identities: Arc<InMemoryIdentityDirectory>,
    pub(crate) jobs: Arc<InMemoryJobDirectory>,
    pub(crate) credentials: Arc<CredentialStore>,
    pub(crate) tokens: Arc<TokenService>,
    pub(crate) workflow: Arc<PortalWorkflow>,
    pub(crate) job_service: Arc<JobService>,
    profile_service: Arc<ProfileService>,
    resumes: Arc<ObjectStoreResumeStore>,
    account_service: Arc<AccountService>,
    authenticator: Arc<Authenticator>,
}

impl Portal {
    pub(crate) fn assemble(
        tokens: TokenService,
        scoring: &ScoringConfig,
        storage: &StorageConfig,
    ) -> Result<Self, AppError> {
        let identities = Arc::new(InMemoryIdentityDirectory::default());
        let jobs = Arc::new(InMemoryJobDirectory::default());
        let applications = Arc::new(InMemoryApplicationRepository::default());
        let credentials = Arc::new(CredentialStore::default());
        let tokens = Arc::new(tokens);

        let oracle = Arc::new(HttpScoringClient::new(scoring)?);
        let resumes = Arc::new(ObjectStoreResumeStore::from_config(storage)?);

        let workflow = Arc::new(ApplicationWorkflow::new(
            applications,
            jobs.clone(),
            identities.clone(),
            oracle,
        ));
        let job_service = Arc::new(JobService::new(jobs.clone()));
        let profile_service = Arc::new(ProfileService::new(identities.clone(), resumes.clone()));
        let account_service = Arc::new(AccountService::new(
            identities.clone(),
            credentials.clone(),
            tokens.clone(),
        ));
        let authenticator = Arc::new(Authenticator::new(tokens.clone(), identities.clone()));

        Ok(Self {
            identities,
            jobs,
            credentials,
            tokens,
            workflow,
            job_service,
            profile_service,
            resumes,
            account_service,
            authenticator,
        })
    }

    pub(crate) fn router(&self, state: AppState) -> Router {
        let api = Router::new()
            .merge(account_router(self.account_service.clone()))
            .merge(job_router(self.job_service.clone()))
            .merge(profile_router(self.profile_service.clone()))
            .merge(application_router(self.workflow.clone()))
            .merge(file_router(self.resumes.clone()));

        with_operational_routes(api)
            .layer(Extension(self.authenticator.clone()))
            .layer(Extension(state))
    }
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let portal = Portal::assemble(
        TokenService::new(&config.auth),
        &config.scoring,
        &config.storage,
    )?;
    if config.seed_demo_data {
        seed_demo_data(&portal)?;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = portal.router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        %addr,
        scoring_url = %config.scoring.base_url,
        "job portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
