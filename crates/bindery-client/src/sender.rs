//! One-shot JSON request sender.

use std::sync::Arc;

use bindery::{Logger, NoopLogger};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use crate::error::{SendError, SendResult};

const JSON: &str = "application/json";

/// Builds and fires a single GET or POST call and decodes its JSON reply.
///
/// Every call opens a fresh connection. Failures are returned and also
/// reported through the configured [`Logger`] at error level.
pub struct Sender {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    params: Vec<(String, String)>,
    payload: Option<Bytes>,
    logger: Arc<dyn Logger>,
}

impl Sender {
    pub fn get(url: &str) -> SendResult<Self> {
        Self::new(Method::GET, url, None)
    }

    /// A POST carrying `payload` encoded as JSON.
    pub fn post<P>(url: &str, payload: &P) -> SendResult<Self>
    where
        P: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(payload).map_err(SendError::Encode)?;
        Self::new(Method::POST, url, Some(Bytes::from(payload)))
    }

    fn new(method: Method, url: &str, payload: Option<Bytes>) -> SendResult<Self> {
        let url = Url::parse(url)?;
        if url.scheme() != "http" {
            return Err(SendError::UnsupportedScheme(url.scheme().to_owned()));
        }
        if url.host_str().is_none() {
            return Err(SendError::MissingHost(url.to_string()));
        }
        Ok(Self {
            method,
            url,
            headers: Vec::new(),
            params: Vec::new(),
            payload,
            logger: Arc::new(NoopLogger),
        })
    }

    /// Set a request header; a later call for the same name wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL the call goes to, query parameters included.
    pub fn target(&self) -> Url {
        let mut target = self.url.clone();
        if !self.params.is_empty() {
            let mut query = target.query_pairs_mut();
            for (name, value) in &self.params {
                query.append_pair(name, value);
            }
        }
        target
    }

    /// Send the call and decode the reply as `T`.
    pub async fn send<T: DeserializeOwned>(&self) -> SendResult<T> {
        let result = match self.exchange().await {
            Ok(body) => serde_json::from_slice(&body).map_err(SendError::Decode),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.logger
                .error(format_args!("{} {} failed: {e}", self.method, self.target()));
        }
        result
    }

    /// Send the call and store the decoded reply in `destination`.
    ///
    /// On failure `destination` is left as it was.
    pub async fn send_into<T: DeserializeOwned>(&self, destination: &mut T) -> SendResult<()> {
        *destination = self.send().await?;
        Ok(())
    }

    async fn exchange(&self) -> SendResult<Bytes> {
        let target = self.target();
        let request = self.build_request(&target)?;
        let address = authority(&target)?;

        match &self.payload {
            Some(payload) => self.logger.info(format_args!(
                "{} {target} headers: {:?} payload: {}",
                self.method,
                request.headers(),
                String::from_utf8_lossy(payload)
            )),
            None => self.logger.info(format_args!(
                "{} {target} headers: {:?}",
                self.method,
                request.headers()
            )),
        }

        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| SendError::Connect {
                address: address.clone(),
                source,
            })?;
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "sender connection closed with error");
            }
        });

        let response = sender.send_request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        self.logger.debug(format_args!(
            "{status} from {target}: {}",
            String::from_utf8_lossy(&body)
        ));

        if !status.is_success() {
            return Err(SendError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    fn build_request(&self, target: &Url) -> SendResult<http::Request<Full<Bytes>>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("bindery-client/0.1"));
        if self.payload.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        for (name, value) in &self.headers {
            let invalid = || SendError::InvalidHeader { name: name.clone() };
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(header, value);
        }
        let host = HeaderValue::from_str(&authority(target)?)
            .map_err(|_| SendError::MissingHost(target.to_string()))?;
        headers.insert(HOST, host);

        let mut builder = http::Request::builder()
            .method(self.method.clone())
            .uri(&target[url::Position::BeforePath..]);
        if let Some(map) = builder.headers_mut() {
            map.extend(headers);
        }
        let body = self.payload.clone().unwrap_or_default();
        Ok(builder.body(Full::new(body))?)
    }
}

/// `host:port` of an http URL.
fn authority(url: &Url) -> SendResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| SendError::MissingHost(url.to_string()))?;
    Ok(format!("{host}:{}", url.port_or_known_default().unwrap_or(80)))
}
