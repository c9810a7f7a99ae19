use crate::error::{Error, Result};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tokio::sync::oneshot;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

pub struct PreviewServer {
  addr: SocketAddr,
  shutdown: Option<oneshot::Sender<()>>,
  handle: Option<thread::JoinHandle<io::Result<()>>>,
}

impl PreviewServer {
  pub fn local_addr(&self) -> SocketAddr {
    self.addr
  }

  /// Wildcard binds are shown as localhost.
  pub fn url(&self) -> String {
    if self.addr.ip().is_unspecified() {
      format!("http://localhost:{}/", self.addr.port())
    } else {
      format!("http://{}/", self.addr)
    }
  }

  /// Signal the server to stop and block until the thread exits.
  pub fn stop(mut self) -> Result<()> {
    if let Some(tx) = self.shutdown.take() {
      let _ = tx.send(());
    }
    self.join()
  }

  pub fn wait(mut self) -> Result<()> {
    self.join()
  }

  fn join(&mut self) -> Result<()> {
    let handle = match self.handle.take() {
      Some(handle) => handle,
      None => return Ok(()),
    };
    match handle.join() {
      Ok(result) => result.map_err(Error::Server),
      Err(_) => {
        error!("preview server thread panicked");
        Err(Error::Server(io::Error::new(
          io::ErrorKind::Other,
          "preview server thread panicked",
        )))
      }
    }
  }
}

async fn log_request(req: Request, next: Next) -> Response {
  let method = req.method().clone();
  let path = req.uri().path().to_string();
  let response = next.run(req).await;
  debug!("{} {} {}", method, path, response.status());
  response
}

pub fn router(root: &Path) -> Router {
  Router::new()
    .fallback_service(ServeDir::new(root))
    .layer(middleware::from_fn(log_request))
}

// binds here so address errors reach the caller before the thread starts
pub fn spawn_preview_server(
  root: impl Into<PathBuf>,
  addr: impl ToSocketAddrs,
) -> Result<PreviewServer> {
  let root = root.into();
  if !root.is_dir() {
    return Err(Error::MissingInput(root));
  }
  let listener = TcpListener::bind(addr).map_err(Error::Server)?;
  listener.set_nonblocking(true).map_err(Error::Server)?;
  let addr = listener.local_addr().map_err(Error::Server)?;

  let app = router(&root);
  let worker_threads = std::cmp::max(num_cpus::get().saturating_sub(2), 2);
  let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

  let handle = thread::Builder::new()
    .name("geomap-preview-server".into())
    .spawn(move || -> io::Result<()> {
      let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;
      runtime.block_on(async move {
        let listener = tokio::net::TcpListener::from_std(listener)?;
        info!(%addr, "serving {}", root.display());
        axum::serve(listener, app)
          .with_graceful_shutdown(async move {
            tokio::select! {
              _ = shutdown_rx => {}
              _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
          })
          .await?;
        info!("preview server stopped");
        Ok(())
      })
    })
    .map_err(Error::Server)?;

  Ok(PreviewServer {
    addr,
    shutdown: Some(shutdown_tx),
    handle: Some(handle),
  })
}

pub fn open_browser(url: &str) -> io::Result<()> {
  #[cfg(target_os = "macos")]
  let mut command = {
    let mut command = Command::new("open");
    command.arg(url);
    command
  };
  #[cfg(target_os = "windows")]
  let mut command = {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
  };
  #[cfg(not(any(target_os = "macos", target_os = "windows")))]
  let mut command = {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
  };

  command
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map(|_| ())
}
