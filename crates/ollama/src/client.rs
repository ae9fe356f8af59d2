//! Blocking HTTP client for the generate endpoint.

use crate::request::GenerateRequest;
use crate::stream::read_stream;
use deck_core::{Error, Result};
use reqwest::blocking::Client;
use std::io::{BufReader, Write};
use std::time::Duration;

/// Client bound to one generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: String,
    http: Client,
}

impl OllamaClient {
    /// Create a client for `endpoint`, e.g. `http://localhost:11434/api/generate`.
    ///
    /// The client has no timeout; a call waits until the server closes the
    /// stream.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// The endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `request` and stream the reply into `out`, returning the full text.
    ///
    /// A non-success status is returned as [`Error::ServerStatus`] carrying
    /// the raw body; nothing is written to `out` in that case.
    pub fn generate<W: Write>(&self, request: &GenerateRequest, out: &mut W) -> Result<String> {
        log::debug!(
            "POST {} (model: {}, parameter: {}, prompt: {} bytes)",
            self.endpoint,
            request.model,
            request.parameter,
            request.prompt.len()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| Error::Http(format!("Request to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let body = response.text().map_err(|e| {
                Error::Http(format!(
                    "Server returned {} and its body could not be read: {}",
                    status, e
                ))
            })?;
            return Err(Error::ServerStatus {
                status: status.as_u16(),
                body,
            });
        }

        read_stream(BufReader::new(response), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Serve exactly one HTTP response and hand back the request body.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        serve_raw(format!(
            "HTTP/1.1 {}\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        ))
    }

    /// Write `response` verbatim and close the connection.
    fn serve_raw(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request_body = read_request_body(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request_body
        });

        (format!("http://{}/api/generate", addr), handle)
    }

    fn read_request_body(stream: &mut TcpStream) -> String {
        let mut reader = std::io::BufReader::new(stream);
        let mut content_length = 0;
        let mut line = String::new();
        loop {
            line.clear();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
        }

        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        String::from_utf8(body).unwrap()
    }

    #[test]
    fn test_generate_streams_and_accumulates() {
        let (endpoint, server) = serve_once(
            "200 OK",
            "{\"response\":\"[[\\\"Intro to Cells\\\"], \"}\n{\"response\":\"[\\\"Cell Structure\\\"]]\"}\n{\"response\":\"\",\"done\":true}\n",
        );

        let client = OllamaClient::new(endpoint).unwrap();
        let request = GenerateRequest::new("llama3.2", "make slides");
        let mut console = Vec::new();
        let text = client.generate(&request, &mut console).unwrap();

        assert_eq!(text, "[[\"Intro to Cells\"], [\"Cell Structure\"]]");
        assert_eq!(String::from_utf8(console).unwrap(), text);

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["model"], "llama3.2");
        assert_eq!(sent["parameter"], "temperature 0.1");
        assert_eq!(sent["prompt"], "make slides");
        assert_eq!(sent["stream"], true);
    }

    #[test]
    fn test_non_success_status_reports_status_and_body() {
        let (endpoint, server) = serve_once(
            "404 Not Found",
            "{\"error\":\"model 'llama3.2' not found\"}",
        );

        let client = OllamaClient::new(endpoint).unwrap();
        let mut console = Vec::new();
        let err = client
            .generate(&GenerateRequest::default(), &mut console)
            .unwrap_err();
        server.join().unwrap();

        match &err {
            Error::ServerStatus { status, body } => {
                assert_eq!(*status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("404"));
        assert!(console.is_empty());
    }

    #[test]
    fn test_unreadable_error_body_is_http_error() {
        // Body is cut off well short of the announced length.
        let (endpoint, server) = serve_raw(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"error\":".to_string(),
        );

        let client = OllamaClient::new(endpoint).unwrap();
        let mut console = Vec::new();
        let err = client
            .generate(&GenerateRequest::default(), &mut console)
            .unwrap_err();
        server.join().unwrap();

        match err {
            Error::Http(message) => assert!(message.contains("500")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(console.is_empty());
    }

    #[test]
    fn test_connection_refused_is_http_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let client = OllamaClient::new(format!("http://{}/api/generate", addr)).unwrap();
        let mut console = Vec::new();
        let err = client
            .generate(&GenerateRequest::default(), &mut console)
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
