//! Analytics over stored conversations.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use haven_types::analytics::{
    ChatAnalysisContext, MentalHealthAnalytics, ScoreBand, WellnessScore,
};
use haven_types::chat::ChatMessage;
use haven_types::error::SessionError;
use haven_types::llm::Message;
use haven_types::user::User;

use crate::analytics::analyzer::{AnalysisSource, MentalHealthAnalyzer};
use crate::analytics::context::prepare_context;
use crate::analytics::fallback::fallback_analysis;
use crate::repository::chat::ChatRepository;

/// An assessment together with the derived values a report displays.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub analytics: MentalHealthAnalytics,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub wellness: Vec<WellnessScore>,
    pub context: ChatAnalysisContext,
    pub source: AnalysisSource,
}

impl AnalyticsReport {
    fn new(analytics: MentalHealthAnalytics, context: ChatAnalysisContext, source: AnalysisSource) -> Self {
        let band = analytics.band();
        Self {
            band,
            band_label: band.label(),
            wellness: analytics.wellness_scores(),
            analytics,
            context,
            source,
        }
    }
}

/// Picks the conversation to analyze and runs the analyzer over it.
pub struct AnalyticsService<C: ChatRepository> {
    chat_repo: Arc<C>,
    analyzer: MentalHealthAnalyzer,
}

impl<C: ChatRepository> AnalyticsService<C> {
    pub fn new(chat_repo: C, analyzer: MentalHealthAnalyzer) -> Self {
        Self {
            chat_repo: Arc::new(chat_repo),
            analyzer,
        }
    }

    pub fn analyzer(&self) -> &MentalHealthAnalyzer {
        &self.analyzer
    }

    /// Analyze one session the user owns.
    pub async fn session_analytics(
        &self,
        user: &User,
        session_id: &Uuid,
    ) -> Result<AnalyticsReport, SessionError> {
        match self.chat_repo.get_session(session_id).await? {
            Some(session) if session.user_id == user.id => {}
            Some(_) => {
                warn!(user_id = %user.id, session_id = %session_id, "Analytics for another user's session refused");
                return Err(SessionError::NotFound);
            }
            None => return Err(SessionError::NotFound),
        }

        let messages = self.chat_repo.get_messages(session_id, None, None).await?;
        Ok(self.report(user, &messages, Some(*session_id)).await)
    }

    /// Analyze every message the user has sent, across all sessions.
    pub async fn overall_analytics(&self, user: &User) -> Result<AnalyticsReport, SessionError> {
        let messages = self.chat_repo.list_user_messages(&user.id).await?;
        Ok(self.report(user, &messages, None).await)
    }

    async fn report(
        &self,
        user: &User,
        messages: &[ChatMessage],
        session_id: Option<Uuid>,
    ) -> AnalyticsReport {
        let history: Vec<Message> = messages
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        let context = prepare_context(&history);

        if history.is_empty() {
            debug!(user_id = %user.id, "No messages to analyze, using fallback");
            let analytics = fallback_analysis(user.id, &history, session_id);
            return AnalyticsReport::new(analytics, context, AnalysisSource::Fallback);
        }

        let (analytics, source) = self
            .analyzer
            .analyze_with_source(user.id, &history, session_id)
            .await;
        AnalyticsReport::new(analytics, context, source)
    }
}
