use log::{debug, warn};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tokio::sync::Mutex;
use tower::{BoxError, Layer, Service, ServiceExt};

use crate::types::event::Event;
use crate::types::notice::Notice;

/// Decodes raw datagrams into [`Event`]s. Garbage is logged and dropped
/// rather than failing the receive loop.
pub struct UdpEventService<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> UdpEventService<S> {
    fn new(inner: S) -> Self {
        UdpEventService {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<'a, S> Service<&'a [u8]> for UdpEventService<S>
where
    S: Service<Event, Response = Vec<Notice>> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = Vec<Notice>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, raw: &'a [u8]) -> Self::Future {
        let maybe_event = Event::try_from(raw);
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            let event = match maybe_event {
                Ok(event) => event,
                Err(e) => {
                    warn!("Invalid packet: {e:#}");
                    return Ok(Vec::new());
                }
            };
            debug!("Event received: {event:?}");
            let mut svc = inner.lock().await;
            svc.ready().await.map_err(Into::<BoxError>::into)?;
            let notices = svc.call(event).await.map_err(Into::<BoxError>::into)?;
            Ok::<_, BoxError>(notices)
        })
    }
}

pub struct UdpEventLayer;

impl<S> Layer<S> for UdpEventLayer {
    type Service = UdpEventService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UdpEventService::new(inner)
    }
}
