//! Collection stage: pulls profile and post data from the highest-priority
//! source present in the run's data sources.

mod linkedin;
mod proxycurl;
mod quality;
mod sources;
mod synthetic;

pub use linkedin::LinkedInClient;
pub use proxycurl::ProxycurlClient;
pub use quality::assess_data_quality;
pub use sources::{
    CREDENTIALS_KEY, DataSource, GDPR_EXPORT_KEY, LinkedInCredentials, PROXYCURL_KEY,
    select_source,
};
pub use synthetic::stable_hash;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{Config, SourceSettings};
use crate::domain::AnalysisWindow;
use crate::pipeline::{AgentResponse, PipelineState, Stage, StageKind, StagePayload};

pub struct IngestionStage {
    window: AnalysisWindow,
    fallback_credentials: LinkedInCredentials,
    proxycurl: ProxycurlClient,
    linkedin: LinkedInClient,
}

impl IngestionStage {
    pub fn new(window: AnalysisWindow, sources: &SourceSettings, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            window,
            fallback_credentials: LinkedInCredentials {
                li_at: sources.li_at.clone(),
                email: sources.email.clone(),
                password: sources.password.clone(),
            },
            proxycurl: ProxycurlClient::new(&sources.proxycurl_base_url, timeout_secs)?,
            linkedin: LinkedInClient::new(&sources.linkedin_base_url, timeout_secs)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.analysis.window(),
            &config.sources,
            config.llm.timeout_secs,
        )
    }

    async fn collect(&self, state: &PipelineState) -> Result<StagePayload> {
        let subject_id = state.subject_id.as_str();
        let source = select_source(&state.data_sources)?;
        info!(subject_id, source = source.label(), "collecting profile data");

        let (profile, posts) = match source {
            DataSource::GdprExport(reference) => {
                info!(subject_id, export = %reference, "generating export data");
                synthetic::generate(subject_id, &self.window)?
            }
            DataSource::Proxycurl { api_key } => self.proxycurl.fetch(subject_id, &api_key).await?,
            DataSource::LinkedIn(credentials) => {
                let credentials = credentials.or(&self.fallback_credentials);
                self.linkedin
                    .fetch(subject_id, &credentials, &self.window)
                    .await?
            }
        };

        let quality_score = assess_data_quality(&profile, &posts, &self.window);
        info!(subject_id, posts = posts.len(), quality_score, "collected profile data");

        Ok(StagePayload::Ingestion {
            profile,
            posts,
            quality_score,
        })
    }
}

#[async_trait]
impl Stage for IngestionStage {
    fn kind(&self) -> StageKind {
        StageKind::Ingestion
    }

    async fn process(&self, state: &PipelineState) -> AgentResponse {
        let result = self.collect(state).await.map(|payload| {
            let message = format!("Successfully collected data for {}", state.subject_id);
            (payload, message)
        });
        if let Err(error) = &result {
            warn!(subject_id = %state.subject_id, %error, "data ingestion failed");
        }
        AgentResponse::from_result(result, Some(StageKind::Analytics), "Data ingestion failed")
    }
}
