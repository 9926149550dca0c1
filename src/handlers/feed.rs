use std::convert::Infallible;

use actix_web::{web, HttpResponse, HttpRequest};
use futures_util::stream;
use tokio::sync::mpsc;

use crate::app::AppState;
use crate::db::ChangeFeed;
use crate::errors::AppError;
use crate::models::employee::Employee;
use crate::utils::jwt::bearer_claims;

/// Server-sent events, one `data:` frame with the full ordered list per change.
/// The feed subscription lives as long as the response stream.
pub async fn employee_feed(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    bearer_claims(&req, &state.jwt_secret)?;

    let (tx, rx) = mpsc::unbounded_channel::<Vec<Employee>>();
    let subscription = state.feed.subscribe(Box::new(move |employees| {
        let _ = tx.send(employees);
    }));

    let events = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let employees = rx.recv().await?;
        let frame = match serde_json::to_string(&employees) {
            Ok(json) => format!("data: {}\n\n", json),
            Err(err) => {
                log::error!("Failed to encode employee snapshot: {}", err);
                return None;
            }
        };
        Some((Ok::<_, Infallible>(web::Bytes::from(frame)), (rx, subscription)))
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events))
}
