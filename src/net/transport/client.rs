use tokio::sync::mpsc;

use crate::config::TransportConfig;
use crate::errors::TransferError;
use crate::net::transport::{TransferEvent, Transport};
use crate::net::{OutgoingRequest, ResponseMeta};

/// Network transport backed by `reqwest`.
///
/// DNS, TCP/TLS, redirects and decompression are all left to reqwest's defaults, apart from
/// what [`TransportConfig`] sets explicitly.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransferError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.as_str());
        }
        if let Some(max) = config.max_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(max));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            config: TransportConfig::default(),
        }
    }
}

impl Transport for HttpTransport {
    fn start(&self, request: OutgoingRequest, events: mpsc::Sender<TransferEvent>) {
        let client = self.client.clone();
        tokio::spawn(run(client, request, events));
    }

    fn event_capacity(&self) -> usize {
        self.config.event_capacity
    }
}

async fn run(client: reqwest::Client, request: OutgoingRequest, events: mpsc::Sender<TransferEvent>) {
    let mut builder = client
        .request(request.method, request.url)
        .headers(request.headers);
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let mut res = match builder.send().await {
        Ok(res) => res,
        Err(e) => {
            let _ = events.send(TransferEvent::Failed(e.into())).await;
            return;
        }
    };

    let meta = ResponseMeta::new(res.url().clone(), res.status().as_u16(), res.headers().clone());
    if events.send(TransferEvent::Response(meta)).await.is_err() {
        // Receiver is gone, nobody is interested anymore
        return;
    }

    loop {
        match res.chunk().await {
            Ok(Some(chunk)) => {
                if events.send(TransferEvent::Data(chunk.to_vec())).await.is_err() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = events.send(TransferEvent::Failed(e.into())).await;
                return;
            }
        }
    }

    let _ = events.send(TransferEvent::Finished).await;
}
