use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Request, Response};
use static_mount::config::{ContentTypeStrategy, StaticServerConfig};
use static_mount::static_server::{ServeFile, StaticServer, serve};
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

type Served = Response<String>;

fn app(req: Request<()>) -> Served {
    Response::new(format!("app {}", req.uri()))
}

// a stand-in for a real file server: echoes the prepared headers and the file contents
fn file_server(root: PathBuf) -> impl Fn(Request<()>, ServeFile<File>) -> Served {
    move |req: Request<()>, served: ServeFile<File>| {
        let body = match served.file {
            Some(mut file) => {
                assert_eq!(file.stream_position().unwrap(), 0);
                let mut body = String::new();
                file.read_to_string(&mut body).unwrap();
                body
            }
            None => match served.target.content_path() {
                Some(path) => fs::read_to_string(root.join(path)).unwrap(),
                None => format!("listing {}", req.uri()),
            },
        };
        let mut res = Response::new(body);
        *res.headers_mut() = served.headers;
        res
    }
}

fn server(
    config: StaticServerConfig,
) -> StaticServer<
    static_mount::LocalFileSystem,
    fn(Request<()>) -> Served,
    impl Fn(Request<()>, ServeFile<File>) -> Served,
> {
    let root = config.root_dir.clone();
    serve(config, file_server(root))(app as fn(Request<()>) -> Served)
}

fn write_file(path: &Path, contents: &[u8]) {
    let mut file = File::create(path).unwrap();
    file.write_all(contents).unwrap();
}

#[test]
fn serves_js_and_passes_missing_files_through() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("app.js"), b"console.log('Hello');");

    let server = server(StaticServerConfig::new("/static/", dir.path()));

    let res = server.call(Request::get("/static/app.js").body(()).unwrap());
    assert_eq!(res.body(), "console.log('Hello');");
    let content_type = res.headers()[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type == "application/javascript" || content_type == "text/javascript");

    let res = server.call(Request::get("/static/missing.js").body(()).unwrap());
    assert_eq!(res.body(), "app /static/missing.js");
}

#[test]
fn requests_outside_the_mount_reach_the_app_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("app.js"), b"run();");

    let server = server(StaticServerConfig::new("/static", dir.path()));

    for uri in ["/app.js", "/api/users?page=2", "/staticapp.js"] {
        let res = server.call(Request::get(uri).body(()).unwrap());
        assert_eq!(res.body(), &format!("app {}", uri));
        assert!(res.headers().is_empty());
    }
}

#[test]
fn directory_without_index_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    write_file(&dir.path().join("docs/notes.txt"), b"notes");

    let server = server(StaticServerConfig::new("/static/", dir.path()));

    let res = server.call(Request::get("/static/docs/").body(()).unwrap());
    assert_eq!(res.body(), "app /static/docs/");
}

#[test]
fn directory_with_index_is_served() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    write_file(&dir.path().join("docs/index.html"), b"<h1>Index</h1>");

    let server = server(StaticServerConfig::new("/static", dir.path()));

    let res = server.call(Request::get("/static/docs/").body(()).unwrap());
    assert_eq!(res.body(), "<h1>Index</h1>");
    assert_eq!(res.headers()[CONTENT_TYPE], "text/html");
}

#[test]
fn directory_index_mode_matches_any_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("images")).unwrap();

    let config = StaticServerConfig::new("/static", dir.path()).with_directory_index(true);
    let server = server(config);

    let res = server.call(Request::get("/static/images").body(()).unwrap());
    assert_eq!(res.body(), "listing /images");
    assert!(res.headers().get(CONTENT_TYPE).is_none());
}

#[test]
fn sniffing_reports_the_full_length() {
    let dir = tempfile::tempdir().unwrap();
    let page = format!("<!DOCTYPE html><html>{}</html>", "x".repeat(4096));
    write_file(&dir.path().join("page.dat"), page.as_bytes());
    write_file(&dir.path().join("tiny"), b"hi");

    let config =
        StaticServerConfig::new("/static", dir.path()).with_content_type(ContentTypeStrategy::Sniff);
    let server = server(config);

    let res = server.call(Request::get("/static/page.dat").body(()).unwrap());
    assert_eq!(res.body(), &page);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(
        res.headers()[CONTENT_LENGTH].to_str().unwrap(),
        page.len().to_string()
    );

    let res = server.call(Request::get("/static/tiny").body(()).unwrap());
    assert_eq!(res.body(), "hi");
    assert_eq!(res.headers()[CONTENT_LENGTH], "2");
}

#[test]
fn blocks_path_traversal_attempts() {
    let parent = tempfile::tempdir().unwrap();
    let root = parent.path().join("root");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("safe.txt"), b"OK");
    write_file(&parent.path().join("outside.txt"), b"NOPE");

    let server = server(StaticServerConfig::new("/static", &root));

    let res = server.call(Request::get("/static/safe.txt").body(()).unwrap());
    assert_eq!(res.body(), "OK");

    for uri in [
        "/static/../outside.txt",
        "/static/%2e%2e/outside.txt",
        "/static/a/../../outside.txt",
    ] {
        let res = server.call(Request::get(uri).body(()).unwrap());
        assert_eq!(res.body(), &format!("app {}", uri));
    }
}

#[test]
fn missing_root_degrades_to_passthrough() {
    let dir = tempfile::tempdir().unwrap();

    let server = server(StaticServerConfig::new("/static", dir.path().join("nowhere")));

    let res = server.call(Request::get("/static/app.js").body(()).unwrap());
    assert_eq!(res.body(), "app /static/app.js");
}

#[cfg(unix)]
fn make_fifo(path: &Path) {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    assert_eq!(rc, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}

#[cfg(unix)]
#[test]
fn fifos_under_the_root_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    make_fifo(&dir.path().join("pipe"));
    fs::create_dir(dir.path().join("docs")).unwrap();
    make_fifo(&dir.path().join("docs/index.html"));

    // sniffing would block forever opening a fifo that has no writer
    let config =
        StaticServerConfig::new("/static", dir.path()).with_content_type(ContentTypeStrategy::Sniff);
    let server = server(config);

    let res = server.call(Request::get("/static/pipe").body(()).unwrap());
    assert_eq!(res.body(), "app /static/pipe");

    let res = server.call(Request::get("/static/docs/").body(()).unwrap());
    assert_eq!(res.body(), "app /static/docs/");
}

#[test]
fn passthrough_hands_over_the_request_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("app.js"), b"run();");

    // both sides return the request they received, so it can be compared field by field
    let server = StaticServer::from_config(
        StaticServerConfig::new("/static", dir.path()),
        |req: Request<String>| ("app", req),
        |req: Request<String>, _served: ServeFile<File>| ("file", req),
    );

    let request = || {
        Request::builder()
            .method("PUT")
            .uri("/api/items/7?dry_run=1")
            .header("x-request-id", "abc-123")
            .header("content-type", "application/json")
            .body(r#"{"name":"lamp"}"#.to_string())
            .unwrap()
    };

    let (handled_by, received) = server.call(request());
    let expected = request();

    assert_eq!(handled_by, "app");
    assert_eq!(received.method(), expected.method());
    assert_eq!(received.uri(), expected.uri());
    assert_eq!(received.version(), expected.version());
    assert_eq!(received.headers(), expected.headers());
    assert_eq!(received.body(), expected.body());

    // a miss under the mount is handed over the same way
    let missing = Request::post("/static/missing.js")
        .header("x-request-id", "def-456")
        .body("payload".to_string())
        .unwrap();
    let (handled_by, received) = server.call(missing);

    assert_eq!(handled_by, "app");
    assert_eq!(received.method(), "POST");
    assert_eq!(received.uri(), "/static/missing.js");
    assert_eq!(received.headers()["x-request-id"], "def-456");
    assert_eq!(received.body(), "payload");
}

#[test]
fn other_methods_on_existing_files_reach_the_file_server() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("app.js"), b"run();");

    let server = server(StaticServerConfig::new("/static", dir.path()));

    for method in ["POST", "DELETE", "OPTIONS"] {
        let req = Request::builder()
            .method(method)
            .uri("/static/app.js")
            .body(())
            .unwrap();
        let res = server.call(req);
        assert_eq!(res.body(), "run();");
    }
}
