//! HTTP client for the transfer server.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::{future, stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response, StatusCode, Url};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::broadcast;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::{multipart, ProgressTracker, ServerError, State, TransferEvent, TransferHandle};
use crate::config::{TransferConfig, DATABASE_FILE_NAME};
use crate::error::{Error, Result};

const EVENT_CAPACITY: usize = 64;

/// A connection to one transfer server.
///
/// Every operation other than [`prepare_connection`](Self::prepare_connection)
/// needs the connection to be [`State::Connected`] and returns
/// [`ServerError::NotConnected`] without touching the state otherwise. A
/// failed operation leaves the connection in [`State::Error`] until it is
/// prepared again.
#[derive(Debug)]
pub struct TransferServerConnection {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    buffer_size: usize,
    state: State,
    error: Option<ServerError>,
    events: broadcast::Sender<TransferEvent>,
    handle: TransferHandle,
}

impl TransferServerConnection {
    /// Build a connection from the `[transfer]` configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no server URL is configured, the URL doesn't
    /// parse, or the HTTP client can't be built.
    pub fn from_config(config: &TransferConfig) -> Result<Self> {
        let url = config
            .server_url
            .as_deref()
            .ok_or_else(|| Error::config_validation("transfer.server_url is not set"))?;
        Url::parse(url).map_err(|e| {
            Error::config_validation(format!("invalid transfer.server_url '{url}': {e}"))
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            buffer_size: config.buffer_size,
            state: State::Waiting,
            error: None,
            events,
            handle: TransferHandle::new(),
        })
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Why the last operation failed, while in [`State::Error`].
    #[must_use]
    pub fn error(&self) -> Option<ServerError> {
        self.error
    }

    /// Receive state changes and progress.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.events.subscribe()
    }

    /// A handle for cancelling operations from another task.
    ///
    /// A cancellation stays in effect until the connection is prepared again.
    #[must_use]
    pub fn handle(&self) -> TransferHandle {
        self.handle.clone()
    }

    /// Check that the network is up and the server is accepting transfers.
    ///
    /// # Errors
    ///
    /// Returns the reason the server can't be used.
    pub async fn prepare_connection(&mut self) -> std::result::Result<(), ServerError> {
        self.handle.reset();
        self.set_state(State::Connecting, None);

        match self.check_status().await {
            Ok(()) => {
                info!("Connected to transfer server at {}", self.base_url);
                self.set_state(State::Connected, None);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Ask the server whether `key` names an uploaded database.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidKey`] if the server rejects the key.
    pub async fn is_key_valid(&mut self, key: &str) -> std::result::Result<(), ServerError> {
        self.require_connected()?;
        self.set_state(State::Loading, None);

        match self.check_key(key).await {
            Ok(()) => {
                self.set_state(State::Connected, None);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Upload the database at `path` and return the key to download it with.
    ///
    /// # Errors
    ///
    /// Returns the reason the upload failed.
    pub async fn upload_user_data(&mut self, path: &Path) -> std::result::Result<String, ServerError> {
        self.require_connected()?;
        self.set_state(State::Loading, None);

        let result = self.send_file(path).await;
        match self.unless_cancelled(result) {
            Ok(key) => {
                info!("Uploaded {} as {}", path.display(), key);
                self.publish_progress(100);
                self.set_state(State::Connected, None);
                Ok(key)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Download the database stored under `key` to `dest`.
    ///
    /// The key is checked first. A partially written `dest` is removed if
    /// the download fails.
    ///
    /// # Errors
    ///
    /// Returns the reason the download failed.
    pub async fn download_user_data(
        &mut self,
        key: &str,
        dest: &Path,
    ) -> std::result::Result<(), ServerError> {
        self.require_connected()?;
        self.set_state(State::Loading, None);

        match self.receive_file(key, dest).await {
            Ok(()) => {
                info!("Downloaded {} to {}", key, dest.display());
                self.publish_progress(100);
                self.set_state(State::Connected, None);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn check_status(&self) -> std::result::Result<(), ServerError> {
        self.check_network().await?;
        let body = self.get_text(self.endpoint("status", None)?).await?;
        if body == "OK" {
            Ok(())
        } else {
            debug!("Server status was '{}'", body);
            Err(ServerError::ServerUnavailable)
        }
    }

    /// Resolve the server's host as a stand-in for network reachability.
    async fn check_network(&self) -> std::result::Result<(), ServerError> {
        let url = Url::parse(&self.base_url).map_err(|_| ServerError::MalformedUrl)?;
        let host = url.host_str().ok_or(ServerError::MalformedUrl)?;
        let port = url.port_or_known_default().ok_or(ServerError::MalformedUrl)?;

        let mut addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
            debug!("Failed to resolve {}: {}", host, e);
            ServerError::NoInternet
        })?;
        if addrs.next().is_some() {
            Ok(())
        } else {
            Err(ServerError::NoInternet)
        }
    }

    async fn check_key(&self, key: &str) -> std::result::Result<(), ServerError> {
        let body = self.get_text(self.endpoint("valid", Some(key))?).await?;
        if body == "VALID" {
            Ok(())
        } else {
            Err(ServerError::InvalidKey)
        }
    }

    async fn send_file(&mut self, path: &Path) -> std::result::Result<String, ServerError> {
        let file = File::open(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ServerError::FileNotFound,
            _ => ServerError::Io,
        })?;
        let file_len = file.metadata().await.map_err(|_| ServerError::Io)?.len();
        let file_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(DATABASE_FILE_NAME);
        let url = self.endpoint("upload", None)?;

        self.set_state(State::Uploading, None);

        let events = self.events.clone();
        let handle = self.handle.clone();
        let mut progress = ProgressTracker::default();
        let mut sent = 0u64;
        let contents = ReaderStream::with_capacity(file, self.buffer_size).map(move |chunk| {
            if handle.is_cancelled() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "transfer cancelled"));
            }
            let chunk = chunk?;
            sent += chunk.len() as u64;
            if let Some(percent) = progress.advance(sent, file_len).filter(|p| *p < 100) {
                let _ = events.send(TransferEvent::Progress(percent));
            }
            Ok(chunk)
        });

        let head = Bytes::from(multipart::head(file_name));
        let tail = Bytes::from(multipart::tail());
        let body = stream::once(future::ready(Ok::<_, io::Error>(head)))
            .chain(contents)
            .chain(stream::once(future::ready(Ok(tail))));

        let mut request = self
            .client
            .post(url)
            .header(CONNECTION, "Keep-Alive")
            .header(CONTENT_TYPE, multipart::content_type())
            .header(CONTENT_LENGTH, multipart::content_length(file_name, file_len))
            .body(Body::wrap_stream(body));
        if let Some(api_key) = &self.api_key {
            request = request.header(AUTHORIZATION, api_key.as_str());
        }

        let response = request.send().await.map_err(|e| self.request_error(&e))?;
        let response = expect_ok(response)?;
        let key = response.text().await.map_err(|e| self.request_error(&e))?;
        Ok(key.trim().to_string())
    }

    async fn receive_file(&mut self, key: &str, dest: &Path) -> std::result::Result<(), ServerError> {
        self.check_key(key).await?;

        let url = self.endpoint("download", Some(key))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;
        let response = expect_ok(response)?;

        self.set_state(State::Downloading, None);

        let file = File::create(dest).await.map_err(|_| ServerError::Io)?;
        let result = self.write_body(response, file).await;
        let result = self.unless_cancelled(result);
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                warn!("Failed to remove partial download {}: {}", dest.display(), e);
            }
        }
        result
    }

    async fn write_body(&self, response: Response, file: File) -> std::result::Result<(), ServerError> {
        let total = response.content_length().unwrap_or(0);
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);
        let mut body = response.bytes_stream();
        let mut progress = ProgressTracker::default();
        let mut received = 0u64;

        while let Some(chunk) = body.next().await {
            if self.handle.is_cancelled() {
                return Err(ServerError::Cancelled);
            }
            let chunk = chunk.map_err(|e| self.request_error(&e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|_| ServerError::Io)?;
            received += chunk.len() as u64;
            if let Some(percent) = progress.advance(received, total).filter(|p| *p < 100) {
                self.publish_progress(percent);
            }
        }

        writer.flush().await.map_err(|_| ServerError::Io)
    }

    /// GET `url` and return the body trimmed and uppercased.
    async fn get_text(&self, url: Url) -> std::result::Result<String, ServerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;
        let response = expect_ok(response)?;
        let body = response.text().await.map_err(|e| self.request_error(&e))?;
        Ok(body.trim().to_uppercase())
    }

    fn endpoint(&self, path: &str, key: Option<&str>) -> std::result::Result<Url, ServerError> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|_| ServerError::MalformedUrl)?;
        if let Some(key) = key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn request_error(&self, err: &reqwest::Error) -> ServerError {
        if self.handle.is_cancelled() {
            ServerError::Cancelled
        } else {
            debug!("Transfer request failed: {}", err);
            ServerError::from_request(err)
        }
    }

    /// Turn any outcome into [`ServerError::Cancelled`] once a cancel was requested.
    fn unless_cancelled<T>(
        &self,
        result: std::result::Result<T, ServerError>,
    ) -> std::result::Result<T, ServerError> {
        if self.handle.is_cancelled() {
            Err(ServerError::Cancelled)
        } else {
            result
        }
    }

    fn require_connected(&self) -> std::result::Result<(), ServerError> {
        if self.state == State::Connected {
            Ok(())
        } else {
            Err(ServerError::NotConnected)
        }
    }

    fn set_state(&mut self, state: State, error: Option<ServerError>) {
        debug!("Transfer state {} -> {}", self.state, state);
        self.state = state;
        self.error = error;
        let _ = self.events.send(TransferEvent::StateChanged { state, error });
    }

    fn publish_progress(&self, percent: u8) {
        if self.state.is_transferring() {
            let _ = self.events.send(TransferEvent::Progress(percent));
        }
    }

    fn fail(&mut self, error: ServerError) -> ServerError {
        if error == ServerError::Cancelled {
            self.publish_progress(0);
        }
        warn!("Transfer failed while {}: {}", self.state, error);
        self.set_state(State::Error, Some(error));
        error
    }
}

fn expect_ok(response: Response) -> std::result::Result<Response, ServerError> {
    if response.status() == StatusCode::OK {
        Ok(response)
    } else {
        debug!("Transfer server answered {}", response.status());
        Err(ServerError::ServerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes as AxumBytes;
    use axum::extract::{Query, State as AxumState};
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::Router;

    use super::*;

    const KEY: &str = "ABC123";
    const DATABASE: &[u8] = b"SQLite format 3\0 five pin database";

    #[derive(Debug, Default)]
    struct Received {
        body: Vec<u8>,
        content_type: Option<String>,
        authorization: Option<String>,
    }

    type Shared = Arc<Mutex<Received>>;

    async fn valid(Query(params): Query<HashMap<String, String>>) -> &'static str {
        if params.get("key").map(String::as_str) == Some(KEY) {
            "VALID"
        } else {
            "INVALID"
        }
    }

    async fn upload(AxumState(shared): AxumState<Shared>, headers: HeaderMap, body: AxumBytes) -> String {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let mut received = shared.lock().unwrap();
        received.body = body.to_vec();
        received.content_type = header("content-type");
        received.authorization = header("authorization");
        format!("{KEY}\n")
    }

    async fn spawn_server(status: &'static str) -> (String, Shared) {
        let shared = Shared::default();
        let app = Router::new()
            .route("/status", get(move || async move { status }))
            .route("/valid", get(valid))
            .route("/upload", post(upload))
            .route("/download", get(|| async { DATABASE }))
            .with_state(shared.clone());

        (serve(app).await, shared)
    }

    /// A server whose status is fine, that accepts `KEY` in any case and
    /// serves an empty database.
    async fn spawn_lenient_server() -> String {
        let app = Router::new()
            .route("/status", get(|| async { "OK" }))
            .route("/valid", get(|| async { "valid\n" }))
            .route("/download", get(|| async { &b""[..] }));
        serve(app).await
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn connection(url: &str) -> TransferServerConnection {
        connection_with_buffer(url, TransferConfig::default().buffer_size)
    }

    fn connection_with_buffer(url: &str, buffer_size: usize) -> TransferServerConnection {
        let config = TransferConfig {
            server_url: Some(url.to_string()),
            api_key: Some("secret".to_string()),
            buffer_size,
            ..TransferConfig::default()
        };
        TransferServerConnection::from_config(&config).unwrap()
    }

    fn progress(events: &[TransferEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                TransferEvent::Progress(p) => Some(*p),
                TransferEvent::StateChanged { .. } => None,
            })
            .collect()
    }

    fn cancelled() -> TransferEvent {
        TransferEvent::StateChanged {
            state: State::Error,
            error: Some(ServerError::Cancelled),
        }
    }

    async fn connected() -> (TransferServerConnection, Shared) {
        let (url, shared) = spawn_server("ok\n").await;
        let mut conn = connection(&url);
        conn.prepare_connection().await.unwrap();
        (conn, shared)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bowlc-transfer-{}-{name}", std::process::id()))
    }

    fn drain(rx: &mut broadcast::Receiver<TransferEvent>) -> Vec<TransferEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn changed(state: State) -> TransferEvent {
        TransferEvent::StateChanged { state, error: None }
    }

    #[test]
    fn test_from_config_requires_url() {
        let err = TransferServerConnection::from_config(&TransferConfig::default()).unwrap_err();
        assert!(err.to_string().contains("server_url"));
    }

    #[tokio::test]
    async fn test_prepare_connection() {
        let (url, _) = spawn_server("OK").await;
        let mut conn = connection(&url);
        let mut rx = conn.subscribe();
        assert_eq!(conn.state(), State::Waiting);

        conn.prepare_connection().await.unwrap();

        assert_eq!(conn.state(), State::Connected);
        assert_eq!(conn.error(), None);
        assert_eq!(
            drain(&mut rx),
            vec![changed(State::Connecting), changed(State::Connected)]
        );
    }

    #[tokio::test]
    async fn test_prepare_connection_server_down() {
        let (url, _) = spawn_server("MAINTENANCE").await;
        let mut conn = connection(&url);

        let err = conn.prepare_connection().await.unwrap_err();

        assert_eq!(err, ServerError::ServerUnavailable);
        assert_eq!(conn.state(), State::Error);
        assert_eq!(conn.error(), Some(ServerError::ServerUnavailable));
    }

    #[tokio::test]
    async fn test_operations_require_connection() {
        let (url, _) = spawn_server("OK").await;
        let mut conn = connection(&url);

        assert_eq!(conn.is_key_valid(KEY).await, Err(ServerError::NotConnected));
        assert_eq!(
            conn.upload_user_data(Path::new("missing.db")).await,
            Err(ServerError::NotConnected)
        );
        assert_eq!(
            conn.download_user_data(KEY, &temp_path("never.db")).await,
            Err(ServerError::NotConnected)
        );
        assert_eq!(conn.state(), State::Waiting);
    }

    #[tokio::test]
    async fn test_is_key_valid() {
        let (mut conn, _) = connected().await;

        conn.is_key_valid(KEY).await.unwrap();
        assert_eq!(conn.state(), State::Connected);

        assert_eq!(conn.is_key_valid("nope").await, Err(ServerError::InvalidKey));
        assert_eq!(conn.state(), State::Error);
    }

    #[tokio::test]
    async fn test_upload_user_data() {
        let (mut conn, shared) = connected().await;
        let path = temp_path("upload.db");
        std::fs::write(&path, DATABASE).unwrap();
        let mut rx = conn.subscribe();

        let key = conn.upload_user_data(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(key, KEY);
        assert_eq!(conn.state(), State::Connected);

        let received = shared.lock().unwrap();
        let file_name = path.file_name().unwrap().to_str().unwrap();
        let mut expected = multipart::head(file_name).into_bytes();
        expected.extend_from_slice(DATABASE);
        expected.extend_from_slice(multipart::tail().as_bytes());
        assert_eq!(received.body, expected);
        assert_eq!(
            received.content_type.as_deref(),
            Some("multipart/form-data;boundary=*****")
        );
        assert_eq!(received.authorization.as_deref(), Some("secret"));

        assert_eq!(
            drain(&mut rx),
            vec![
                changed(State::Loading),
                changed(State::Uploading),
                TransferEvent::Progress(100),
                changed(State::Connected),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let (mut conn, _) = connected().await;

        let err = conn
            .upload_user_data(&temp_path("does-not-exist.db"))
            .await
            .unwrap_err();

        assert_eq!(err, ServerError::FileNotFound);
        assert_eq!(conn.state(), State::Error);
    }

    #[tokio::test]
    async fn test_download_user_data() {
        let (mut conn, _) = connected().await;
        let dest = temp_path("download.db");

        conn.download_user_data(KEY, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), DATABASE);
        assert_eq!(conn.state(), State::Connected);
        std::fs::remove_file(&dest).unwrap();
    }

    #[tokio::test]
    async fn test_download_invalid_key() {
        let (mut conn, _) = connected().await;
        let dest = temp_path("invalid-key.db");

        let err = conn.download_user_data("nope", &dest).await.unwrap_err();

        assert_eq!(err, ServerError::InvalidKey);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_cancelled() {
        let (mut conn, _) = connected().await;
        let dest = temp_path("cancelled.db");
        let mut rx = conn.subscribe();

        conn.handle().cancel();
        let err = conn.download_user_data(KEY, &dest).await.unwrap_err();

        assert_eq!(err, ServerError::Cancelled);
        assert_eq!(conn.error(), Some(ServerError::Cancelled));
        assert!(!dest.exists());

        let events = drain(&mut rx);
        assert!(events.contains(&TransferEvent::Progress(0)));
        assert_eq!(
            events.last(),
            Some(&TransferEvent::StateChanged {
                state: State::Error,
                error: Some(ServerError::Cancelled),
            })
        );

        // Preparing again clears the cancellation
        conn.prepare_connection().await.unwrap();
        conn.download_user_data(KEY, &dest).await.unwrap();
        std::fs::remove_file(&dest).unwrap();
    }

    #[tokio::test]
    async fn test_key_check_ignores_case() {
        let url = spawn_lenient_server().await;
        let mut conn = connection(&url);
        conn.prepare_connection().await.unwrap();

        conn.is_key_valid(KEY).await.unwrap();

        assert_eq!(conn.state(), State::Connected);
    }

    #[tokio::test]
    async fn test_upload_progress_increases() {
        let (url, shared) = spawn_server("OK").await;
        let mut conn = connection_with_buffer(&url, 16);
        conn.prepare_connection().await.unwrap();
        let path = temp_path("chunked.db");
        let contents: Vec<u8> = (0..=255u8).cycle().take(160).collect();
        std::fs::write(&path, &contents).unwrap();
        let mut rx = conn.subscribe();

        conn.upload_user_data(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let events = drain(&mut rx);
        let percents = progress(&events);
        assert!(percents.len() > 2, "expected chunk progress, got {percents:?}");
        assert!(percents.windows(2).all(|w| w[0] < w[1]), "{percents:?}");
        assert_eq!(percents.last(), Some(&100));
        assert!(percents[..percents.len() - 1].iter().all(|p| *p < 100));
        assert_eq!(events.last(), Some(&changed(State::Connected)));

        let received = shared.lock().unwrap();
        assert!(received.body.windows(contents.len()).any(|w| w == contents.as_slice()));
    }

    #[tokio::test]
    async fn test_upload_cancelled() {
        let (mut conn, _) = connected().await;
        let empty = temp_path("cancelled-empty.db");
        std::fs::write(&empty, b"").unwrap();
        let mut rx = conn.subscribe();

        // Nothing to stream, so only the final check can notice
        conn.handle().cancel();
        let err = conn.upload_user_data(&empty).await.unwrap_err();
        std::fs::remove_file(&empty).unwrap();

        assert_eq!(err, ServerError::Cancelled);
        assert_eq!(conn.state(), State::Error);
        let events = drain(&mut rx);
        assert!(events.contains(&TransferEvent::Progress(0)));
        assert!(!events.contains(&TransferEvent::Progress(100)));
        assert_eq!(events.last(), Some(&cancelled()));

        conn.prepare_connection().await.unwrap();
        let path = temp_path("cancelled-full.db");
        std::fs::write(&path, DATABASE).unwrap();

        conn.handle().cancel();
        let err = conn.upload_user_data(&path).await.unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(err, ServerError::Cancelled);
        assert_eq!(conn.error(), Some(ServerError::Cancelled));
    }

    #[tokio::test]
    async fn test_download_cancelled_empty_body() {
        let url = spawn_lenient_server().await;
        let mut conn = connection(&url);
        conn.prepare_connection().await.unwrap();
        let dest = temp_path("cancelled-empty-download.db");
        let mut rx = conn.subscribe();

        conn.handle().cancel();
        let err = conn.download_user_data(KEY, &dest).await.unwrap_err();

        assert_eq!(err, ServerError::Cancelled);
        assert_eq!(conn.state(), State::Error);
        assert!(!dest.exists());
        let events = drain(&mut rx);
        assert!(!events.contains(&TransferEvent::Progress(100)));
        assert_eq!(events.last(), Some(&cancelled()));
    }

    #[tokio::test]
    async fn test_download_empty_body() {
        let url = spawn_lenient_server().await;
        let mut conn = connection(&url);
        conn.prepare_connection().await.unwrap();
        let dest = temp_path("empty-download.db");

        conn.download_user_data(KEY, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"");
        assert_eq!(conn.state(), State::Connected);
        std::fs::remove_file(&dest).unwrap();
    }
}
