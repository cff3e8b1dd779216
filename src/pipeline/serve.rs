// ABOUTME: Development and distribution static file servers
// ABOUTME: Minimal HTTP/1.1 file serving over tokio with layered document roots

use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::runner::{ActionOutput, BuildContext, Result, RunnerError, TaskAction};

/// A static file server that resolves requests against an ordered list of
/// document roots, serving the first match.
pub struct StaticServer {
    listener: TcpListener,
    roots: Arc<Vec<PathBuf>>,
    index_page: String,
}

impl StaticServer {
    pub async fn bind(addr: &str, roots: Vec<PathBuf>, index_page: String) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            roots: Arc::new(roots),
            index_page,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the shutdown future resolves.
    pub async fn run_until(self, shutdown: impl std::future::Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    debug!("Connection from {}", peer);
                    let roots = Arc::clone(&self.roots);
                    let index_page = self.index_page.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &roots, &index_page).await {
                            warn!("Request handling failed: {}", e);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    roots: &[PathBuf],
    index_page: &str,
) -> Result<()> {
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let path = match parse_request_path(&request) {
        Some(p) => p,
        None => {
            write_response(&mut stream, 400, "text/plain", b"Bad Request").await?;
            return Ok(());
        }
    };

    // Reject traversal outside the document roots.
    if path.split('/').any(|seg| seg == "..") {
        write_response(&mut stream, 403, "text/plain", b"Forbidden").await?;
        return Ok(());
    }

    let relative = if path == "/" || path.is_empty() {
        index_page.to_string()
    } else {
        path.trim_start_matches('/').to_string()
    };

    for root in roots {
        let candidate = root.join(&relative);
        if candidate.is_file() {
            let body = tokio::fs::read(&candidate).await?;
            write_response(&mut stream, 200, content_type(&candidate), &body).await?;
            return Ok(());
        }
    }

    write_response(&mut stream, 404, "text/plain", b"Not Found").await?;
    Ok(())
}

fn parse_request_path(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    if method != "GET" && method != "HEAD" {
        return None;
    }
    // Drop the query string.
    Some(path.split('?').next().unwrap_or(path).to_string())
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

async fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum ServeMode {
    /// Serve scratch output layered over the raw sources.
    Dev,
    /// Serve the built distribution only.
    Dist,
}

pub struct ServeTask {
    mode: ServeMode,
}

impl ServeTask {
    pub fn dev() -> Self {
        Self {
            mode: ServeMode::Dev,
        }
    }

    pub fn dist() -> Self {
        Self {
            mode: ServeMode::Dist,
        }
    }

    fn roots(&self, ctx: &BuildContext) -> Vec<PathBuf> {
        let paths = ctx.paths();
        match self.mode {
            ServeMode::Dev => vec![paths.tmp_dir(), paths.app_dir(), paths.root.clone()],
            ServeMode::Dist => vec![paths.dist_dir()],
        }
    }
}

#[async_trait]
impl TaskAction for ServeTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let addr = format!("{}:{}", ctx.config.serve.host, ctx.config.serve.port);
        let roots = self.roots(&ctx);
        let server = StaticServer::bind(&addr, roots, ctx.paths().index_page.clone()).await?;
        let local = server.local_addr()?;

        info!("Serving on http://{} (ctrl-c to stop)", local);

        server
            .run_until(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Ok(ActionOutput::with_message(format!("Served on {}", local)))
    }
}

impl ServeTask {
    /// Bind on the configured host with an ephemeral port and serve until
    /// `shutdown` resolves. Returns the bound address through `on_bound`.
    pub async fn serve_until(
        &self,
        ctx: Arc<BuildContext>,
        on_bound: tokio::sync::oneshot::Sender<SocketAddr>,
        shutdown: impl std::future::Future<Output = ()>,
    ) -> Result<()> {
        let addr = format!("{}:{}", ctx.config.serve.host, ctx.config.serve.port);
        let server = StaticServer::bind(&addr, self.roots(&ctx), ctx.paths().index_page.clone())
            .await?;
        let local = server.local_addr()?;
        on_bound
            .send(local)
            .map_err(|_| RunnerError::action("Server startup notification dropped"))?;
        server.run_until(shutdown).await
    }
}
