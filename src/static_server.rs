// src/static_server.rs

// dependencies
use crate::config::StaticServerConfig;
use crate::content_type::{ContentTypeDetector, detector_for};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::resolve::{PathResolver, ResolvedTarget, normalize_mount_path, strip_mount_prefix};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::uri::PathAndQuery;
use http::{HeaderMap, HeaderValue, Request, Uri};

/// The next handler in the chain, called for every request the mount does not answer.
pub trait Handler<B> {
    type Response;

    fn handle(&self, req: Request<B>) -> Self::Response;
}

impl<B, R, T> Handler<B> for T
where
    T: Fn(Request<B>) -> R,
{
    type Response = R;

    fn handle(&self, req: Request<B>) -> R {
        self(req)
    }
}

// struct type which represents everything the file server needs to answer a matched request
#[derive(Debug)]
pub struct ServeFile<F> {
    pub target: ResolvedTarget,
    // start the response with these, before any body byte is written
    pub headers: HeaderMap,
    pub file: Option<F>,
}

/// Streams a resolved file back to the client.
///
/// Receives the request with the mount path already stripped from its URI. Conditional and
/// range requests, status codes and the body are its business.
pub trait FileServer<B, F> {
    type Response;

    fn serve(&self, req: Request<B>, file: ServeFile<F>) -> Self::Response;
}

impl<B, F, R, T> FileServer<B, F> for T
where
    T: Fn(Request<B>, ServeFile<F>) -> R,
{
    type Response = R;

    fn serve(&self, req: Request<B>, file: ServeFile<F>) -> R {
        self(req, file)
    }
}

// struct type which represents the static file middleware wrapped around a downstream handler
pub struct StaticServer<Fs: FileSystem, H, S> {
    mount_path: String,
    resolver: PathResolver<Fs>,
    detector: Box<dyn ContentTypeDetector<Fs>>,
    next: H,
    file_server: S,
}

// methods for the StaticServer type backed by local disk
impl<H, S> StaticServer<LocalFileSystem, H, S> {
    // create a static file server from it's configuration values
    pub fn from_config(config: StaticServerConfig, next: H, file_server: S) -> Self {
        let fs = LocalFileSystem::new(config.root_dir.clone());
        Self::with_filesystem(config, fs, next, file_server)
    }
}

// methods for the StaticServer type
impl<Fs: FileSystem, H, S> StaticServer<Fs, H, S> {
    // build the middleware on any filesystem backing; config.root_dir is ignored
    pub fn with_filesystem(config: StaticServerConfig, fs: Fs, next: H, file_server: S) -> Self {
        StaticServer {
            mount_path: normalize_mount_path(&config.mount_path),
            resolver: PathResolver::new(fs, config.index_file, config.allow_directory_index),
            detector: detector_for(config.content_type),
            next,
            file_server,
        }
    }

    // handle one request: serve it from the mount, or hand it to the next handler untouched
    pub fn call<B>(&self, req: Request<B>) -> H::Response
    where
        H: Handler<B>,
        S: FileServer<B, Fs::File, Response = H::Response>,
    {
        match self.resolver.resolve(req.uri().path(), &self.mount_path) {
            Some(target) => self.serve(req, target),
            None => {
                log::trace!("no static file for {}, passing through", req.uri().path());
                self.next.handle(req)
            }
        }
    }

    fn serve<B>(&self, req: Request<B>, target: ResolvedTarget) -> H::Response
    where
        H: Handler<B>,
        S: FileServer<B, Fs::File, Response = H::Response>,
    {
        let Some(uri) = self.strip_uri(req.uri()) else {
            log::debug!("could not rewrite {}, passing through", req.uri());
            return self.next.handle(req);
        };

        let detection = self.detector.detect(self.resolver.filesystem(), &target);

        let mut headers = HeaderMap::new();
        if let Some(value) = detection
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            headers.insert(CONTENT_TYPE, value);
        }
        if let Some(len) = detection.content_length {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }

        log::debug!(
            "serving {} from {} ({})",
            req.uri().path(),
            target.relative_path.display(),
            detection.content_type.as_deref().unwrap_or("unknown type"),
        );

        let (mut parts, body) = req.into_parts();
        parts.uri = uri;

        self.file_server.serve(
            Request::from_parts(parts, body),
            ServeFile {
                target,
                headers,
                file: detection.file,
            },
        )
    }

    // the request URI as the file server sees it: mount path removed, query kept
    fn strip_uri(&self, uri: &Uri) -> Option<Uri> {
        if self.mount_path.is_empty() {
            return Some(uri.clone());
        }

        let rest = strip_mount_prefix(&self.mount_path, uri.path())?;
        let path = if rest.is_empty() { "/" } else { rest };
        let path_and_query = match uri.query() {
            Some(query) => PathAndQuery::try_from(format!("{}?{}", path, query)),
            None => PathAndQuery::try_from(path),
        }
        .ok()?;

        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(path_and_query);
        Uri::from_parts(parts).ok()
    }

    // utility to return the mount path
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    // utility to return the path resolver
    pub fn resolver(&self) -> &PathResolver<Fs> {
        &self.resolver
    }
}

// wrap a downstream handler in a static file mount on local disk
pub fn serve<H, S>(
    config: StaticServerConfig,
    file_server: S,
) -> impl FnOnce(H) -> StaticServer<LocalFileSystem, H, S> {
    move |next| StaticServer::from_config(config, next, file_server)
}
