//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::commands::generate::watch_blocking;
use crate::helpers::decode_request_path;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: site.public_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    // Create router with live reload endpoint
    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start file watcher if watch mode is enabled
    if watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            let notify_clients = |_: &Site| {
                // Notify all connected clients to reload
                let _ = reload_tx.send(());
                ControlFlow::Continue(())
            };
            if let Err(e) = watch_blocking(site, notify_clients) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Fallback handler that serves files and injects live reload script
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let Some(clean_path) = decode_request_path(request.uri().path()) else {
        return not_found(&state).await;
    };

    let Some(file_path) = resolve_file(&state.public_dir, &clean_path) else {
        return not_found(&state).await;
    };

    // HTML pages are read directly so the live reload script can be injected
    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) if state.live_reload => Html(inject_live_reload(&content)).into_response(),
            Ok(content) => Html(content).into_response(),
            Err(_) => not_found(&state).await,
        }
    } else {
        // Serve static file using tower-http
        let mut service = ServeDir::new(&state.public_dir);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Map a decoded request path to a file in the output directory
fn resolve_file(public_dir: &Path, clean_path: &str) -> Option<PathBuf> {
    if clean_path.is_empty() {
        let index = public_dir.join("index.html");
        return index.is_file().then_some(index);
    }

    let candidate = public_dir.join(clean_path);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }

    // Try adding .html extension
    let with_html = public_dir.join(format!("{}.html", clean_path.trim_end_matches('/')));
    with_html.is_file().then_some(with_html)
}

/// The generated not-found page with a 404 status
async fn not_found(state: &ServerState) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(content) => {
            let content = if state.live_reload {
                inject_live_reload(&content)
            } else {
                content
            };
            (StatusCode::NOT_FOUND, Html(content)).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn public_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("blog/hello")).unwrap();
        fs::write(tmp.path().join("index.html"), "home").unwrap();
        fs::write(tmp.path().join("blog/hello/index.html"), "post").unwrap();
        fs::write(tmp.path().join("404.html"), "missing").unwrap();
        tmp
    }

    #[test]
    fn test_resolve_file() {
        let tmp = public_dir();
        let root = tmp.path();
        assert_eq!(resolve_file(root, ""), Some(root.join("index.html")));
        assert_eq!(
            resolve_file(root, "blog/hello/"),
            Some(root.join("blog/hello/index.html"))
        );
        assert_eq!(
            resolve_file(root, "blog/hello"),
            Some(root.join("blog/hello/index.html"))
        );
        assert_eq!(resolve_file(root, "404"), Some(root.join("404.html")));
        assert_eq!(resolve_file(root, "blog"), None);
        assert_eq!(resolve_file(root, "nope/"), None);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body><p>x</p></body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</html>"));
        assert_eq!(html.matches("</body>").count(), 1);

        let bare = inject_live_reload("<p>x</p>");
        assert!(bare.starts_with("<p>x</p>"));
        assert!(bare.contains("/__livereload"));
    }

    fn state_for(public_dir: &Path, live_reload: bool) -> Arc<ServerState> {
        let (reload_tx, _) = broadcast::channel(1);
        Arc::new(ServerState {
            public_dir: public_dir.to_path_buf(),
            reload_tx,
            live_reload,
        })
    }

    async fn get(state: &Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = fallback_handler(State(state.clone()), request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_fallback_handler_routes() {
        let tmp = TempDir::new().unwrap();
        let public = tmp.path().join("public");
        fs::create_dir_all(public.join("blog/hello")).unwrap();
        fs::write(public.join("index.html"), "home").unwrap();
        fs::write(public.join("about.html"), "about").unwrap();
        fs::write(public.join("blog/hello/index.html"), "post").unwrap();
        fs::write(public.join("404.html"), "missing").unwrap();
        fs::write(public.join("style.css"), "body {}").unwrap();
        fs::write(tmp.path().join("secret.txt"), "secret").unwrap();
        let state = state_for(&public, false);

        assert_eq!(get(&state, "/").await, (StatusCode::OK, "home".to_string()));
        assert_eq!(get(&state, "/about").await, (StatusCode::OK, "about".to_string()));
        assert_eq!(get(&state, "/blog/hello").await, (StatusCode::OK, "post".to_string()));
        assert_eq!(get(&state, "/blog/hello/").await, (StatusCode::OK, "post".to_string()));
        assert_eq!(get(&state, "/style.css").await, (StatusCode::OK, "body {}".to_string()));

        for uri in ["/missing/", "/%2e%2e/secret.txt", "/blog/..%2F..%2Fsecret.txt"] {
            let (status, body) = get(&state, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body, "missing", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_fallback_handler_injects_live_reload() {
        let tmp = public_dir();
        let state = state_for(tmp.path(), true);

        let (status, body) = get(&state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("home"));
        assert!(body.contains("/__livereload"));

        let (status, body) = get(&state, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/__livereload"));

        fs::remove_file(tmp.path().join("404.html")).unwrap();
        let (status, body) = get(&state, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not found");
    }

    #[tokio::test]
    async fn test_not_found_page() {
        let tmp = public_dir();
        let (reload_tx, _) = broadcast::channel(1);
        let state = ServerState {
            public_dir: tmp.path().to_path_buf(),
            reload_tx,
            live_reload: false,
        };
        let response = not_found(&state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
