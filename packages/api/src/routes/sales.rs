use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub mod goals;
pub mod ledger;
pub mod ranking;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Monthly goals per salesperson
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/goals/{goal_id}",
            put(goals::update_goal).delete(goals::delete_goal),
        )
        .route("/ranking", get(ranking::get_ranking))
        // Manual sales ledger
        .route("/ledger", get(ledger::list_sales).post(ledger::create_sale))
        .route("/ledger/summary", get(ledger::get_summary))
        .route(
            "/ledger/{sale_id}",
            put(ledger::update_sale).delete(ledger::delete_sale),
        )
}
