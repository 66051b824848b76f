use std::convert::Infallible;

use axum::Extension;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use futures::stream;
use grievance_core::UserIdentity;
use tracing::warn;

use crate::dto::GrievanceResponse;
use crate::state::AppState;

/// Live subscription as a server-sent-event stream.
///
/// Opens the caller's dashboard context (role resolution + role-scoped
/// subscription). The first event is the immediate full snapshot; every
/// acknowledged mutation afterwards yields a fresh snapshot event. Client
/// disconnect drops the context, which cancels the subscription.
pub async fn stream_grievances_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let context = state.dashboard_service.open(&identity).await;

    let snapshots = stream::unfold(context, |mut context| async move {
        match context.subscription_mut().next_snapshot().await {
            Ok(Some(records)) => {
                let payload: Vec<GrievanceResponse> =
                    records.into_iter().map(GrievanceResponse::from).collect();

                match serde_json::to_string(&payload) {
                    Ok(json) => {
                        let event = Event::default().event("snapshot").data(json);
                        Some((Ok(event), context))
                    }
                    Err(error) => {
                        warn!(%error, "failed to serialize snapshot; closing stream");
                        None
                    }
                }
            }
            // Cancelled or store torn down: end the stream.
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "snapshot delivery failed; closing stream");
                None
            }
        }
    });

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}
