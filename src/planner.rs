//! Travel planning service
//!
//! Validates a submission and fans out to the language model and the
//! directions API, collecting everything into a [`TravelPlan`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::config::PlannerConfig;
use crate::directions::DirectionsClient;
use crate::models::{GeneratedText, TravelMode, TravelOption, TravelPlan, TravelQuery};
use crate::recommendations::{GeminiClient, RecommendationService};
use crate::static_map::StaticMapBuilder;
use crate::{Result, TravelPlannerError};

#[derive(Clone)]
pub struct TravelPlanner {
    recommendations: Arc<dyn RecommendationService>,
    directions: DirectionsClient,
    static_map: StaticMapBuilder,
}

impl TravelPlanner {
    pub fn new(
        recommendations: Arc<dyn RecommendationService>,
        directions: DirectionsClient,
        static_map: StaticMapBuilder,
    ) -> Self {
        Self {
            recommendations,
            directions,
            static_map,
        }
    }

    /// Build a planner backed by Gemini and Google Maps
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let maps_key = config
            .maps
            .resolve_api_key()
            .map_err(|e| TravelPlannerError::config(format!("{e:#}")))?;

        let gemini = GeminiClient::new(&config.gemini)?;
        let directions = DirectionsClient::with_api_key(&config.maps, maps_key.clone())?;
        let static_map = StaticMapBuilder::new(&config.maps, maps_key);

        Ok(Self::new(Arc::new(gemini), directions, static_map))
    }

    /// Plan a trip. Only input validation can fail; problems with the
    /// upstream services are reported inside the returned plan.
    #[instrument(skip(self))]
    pub async fn plan(&self, source: &str, destination: &str, mode: TravelMode) -> Result<TravelPlan> {
        let query = TravelQuery::new(source, destination, mode)?;

        let (recommendations, tips, live_travel) = tokio::join!(
            self.recommendations
                .travel_recommendations(query.source(), query.destination()),
            self.recommendations.travel_tips(query.destination()),
            self.directions.fetch_travel_option(&query),
        );

        let plan = TravelPlan {
            map_url: self.static_map.url(query.source(), query.destination()),
            recommendations: GeneratedText::from(recommendations),
            tips: GeneratedText::from(tips),
            live_travel,
            query,
            generated_at: Utc::now(),
        };

        info!(
            "Plan ready (route found: {}, recommendations: {}, tips: {})",
            plan.live_travel.is_route(),
            plan.recommendations.text().is_some(),
            plan.tips.text().is_some()
        );

        Ok(plan)
    }

    /// Directions lookup only, without the language model
    pub async fn live_travel(&self, source: &str, destination: &str, mode: TravelMode) -> Result<TravelOption> {
        let query = TravelQuery::new(source, destination, mode)?;
        Ok(self.directions.fetch_travel_option(&query).await)
    }
}
