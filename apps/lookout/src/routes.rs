use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use lookout_service::commands::{self, Message};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ServersResponse {
	pub servers: Vec<String>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/servers", get(servers))
		.route("/v1/commands", post(command))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn servers(State(state): State<AppState>) -> Json<ServersResponse> {
	Json(ServersResponse { servers: state.service.servers() })
}

/// Answers a chat message; messages that are not commands get `204 No Content`.
async fn command(State(state): State<AppState>, Json(message): Json<Message>) -> Response {
	let prefix = &state.service.cfg.service.command_prefix;

	match commands::dispatch(&state.service, prefix, &message).await {
		Some(reply) => Json(reply).into_response(),
		None => StatusCode::NO_CONTENT.into_response(),
	}
}
