//! Development server for shush
//!
//! A minimal static file server for `index.html` and the `wasm-pack`
//! output under `pkg/`. No dependencies beyond tiny_http.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tiny_http::{Header, Response, Server};

const DEFAULT_PORT: u16 = 8080;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = format!("0.0.0.0:{}", port);
    let server = Server::http(&addr)?;

    println!("shush dev server: http://localhost:{}", port);

    for request in server.incoming_requests() {
        let response = match resolve(request.url()) {
            Some(path) => serve_file(&path),
            None => not_found(),
        };
        if let Err(e) = request.respond(response) {
            eprintln!("[serve] respond failed: {}", e);
        }
    }
    Ok(())
}

/// Map a request URL to a file under the current directory.
/// Anything that tries to leave it is refused.
fn resolve(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Some(PathBuf::from("index.html"));
    }

    let path = Path::new(path);
    if path.components().all(|c| matches!(c, Component::Normal(_))) {
        Some(path.to_path_buf())
    } else {
        None
    }
}

fn serve_file(path: &Path) -> Response<std::io::Cursor<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => {
            let response = Response::from_data(contents);
            match Header::from_bytes("Content-Type", mime_type(path)) {
                Ok(header) => response.with_header(header),
                Err(()) => response,
            }
        }
        Err(_) => not_found(),
    }
}

fn not_found() -> Response<std::io::Cursor<Vec<u8>>> {
    let response = Response::from_string("404 Not Found").with_status_code(404);
    match Header::from_bytes("Content-Type", "text/plain") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
