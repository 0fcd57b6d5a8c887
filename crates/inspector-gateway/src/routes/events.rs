use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use inspector_events::sse;
use tokio::sync::broadcast;

/// `GET /events` (§4.6, §4.7). Honors `Last-Event-ID` for replay, then
/// streams live events framed per §4.6, with periodic heartbeat comments.
pub async fn stream_events(State(state): State<AppState>, headers: HeaderMap) -> Response<Body> {
    let last_event_id = headers
        .get("last-event-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let subscription = state.events.subscribe(last_event_id);

    let highest_replayed_id = subscription.highest_replayed_id;

    let body_stream = async_stream::stream! {
        yield Ok::<_, std::io::Error>(sse::INITIAL_BYTES.to_string());
        for event in subscription.replay {
            yield Ok(sse::frame_event(&event));
        }

        let mut live = subscription.live;
        let mut heartbeat = tokio::time::interval(inspector_events::HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately; discard it so we don't double up
        // with the initial replay/connect burst.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                received = live.recv() => {
                    match received {
                        // The subscription's ring snapshot and its live
                        // receiver are taken as two separate steps, so an
                        // event published in between can appear in both;
                        // skip anything already delivered via replay.
                        Ok(event) if inspector_events::already_replayed(highest_replayed_id, event.event_id) => {}
                        Ok(event) => yield Ok(sse::frame_event(&event)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "SSE subscriber lagged; closing so the client reconnects");
                            break;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    yield Ok(sse::HEARTBEAT_COMMENT.to_string());
                }
            }
        }
    };

    let body = Body::from_stream(body_stream);
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response_headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}
