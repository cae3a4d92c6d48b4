use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use vitrine::sales::{Channel, ChannelRanking, RemainingPeriod, rank_channel};

use super::goals::{load_goals, parse_channel};
use crate::{error::ApiError, middleware::session::AppUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub channel: Option<String>,
    /// Reference day for the remaining-days projection, today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// GET /sales/ranking - One ranking per requested channel
#[tracing::instrument(name = "GET /sales/ranking", skip(state, user))]
pub async fn get_ranking(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<ChannelRanking>>, ApiError> {
    user.admin(&state)?;

    let channels = match parse_channel(query.channel.as_deref())? {
        Some(channel) => vec![channel],
        None => Channel::ALL.to_vec(),
    };
    let period = query
        .date
        .map(RemainingPeriod::at)
        .unwrap_or_else(RemainingPeriod::now);

    let entries = load_goals(&state).await?;
    let rankings = channels
        .into_iter()
        .map(|channel| rank_channel(&entries, channel, period))
        .collect();

    Ok(Json(rankings))
}
