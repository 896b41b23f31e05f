use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{extract::Request, response::IntoResponse};
use tower::{Layer, Service};
use tracing::trace;

use crate::session::{ActiveSession, SessionManager};

/// Middleware that exposes the request's session id as [`ActiveSession`].
///
/// Only the cookie is read; the store is never contacted.
pub struct SessionService<STORE, SERV> {
    inner: SessionManager<STORE>,
    rest: SERV,
}

impl<STORE, SERV> Service<Request> for SessionService<STORE, SERV>
where
    SERV: Service<Request, Error = Infallible> + Clone + Send + 'static,
    <SERV as Service<Request>>::Response: IntoResponse,
    <SERV as Service<Request>>::Future: Send,
    STORE: Send + Sync + 'static,
{
    type Response = axum::response::Response;

    type Error = Infallible;

    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.rest.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        match self.inner.get_session(req.headers()) {
            Ok(session_id) => {
                trace!(session_id = %session_id, "request carries session");
                req.extensions_mut().insert(ActiveSession::new(session_id));
            }
            Err(_) => trace!("request carries no session"),
        }

        let future = self.rest.call(req);
        Box::pin(async move { future.await.map(IntoResponse::into_response) })
    }
}

impl<SERV, T> Layer<SERV> for SessionManager<T>
where
    T: 'static,
{
    type Service = SessionService<T, SERV>;

    fn layer(&self, inner: SERV) -> Self::Service {
        SessionService {
            inner: self.clone(),
            rest: inner,
        }
    }
}

impl<T, SERV> Clone for SessionService<T, SERV>
where
    SERV: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            rest: self.rest.clone(),
        }
    }
}
