//! One-field web form around an agent
//!
//! Binds a TCP listener and serves connections one at a time. `GET /` shows
//! the form; `POST /` runs the handler on the submitted text and renders the
//! Markdown answer under the form. There is no session state.
//!
//! Every accepted connection gets read and write timeouts, so a client that
//! goes quiet is dropped instead of stalling the accept loop.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use pulldown_cmark::{html, Event, Options, Parser};
use tracing::{error, info, warn};

use crate::error::{AgentError, AgentResult};

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Default time a connection may stay silent before it is dropped
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown when the form is submitted without text
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query.";

/// Turns a submitted question into Markdown
pub type Handler = Box<dyn FnMut(&str) -> AgentResult<String>>;

/// A parsed HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A rendered HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        }
    }

    /// Serialize as an HTTP/1.1 response that closes the connection
    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.body.len(),
            self.body
        )
    }
}

/// Single-question form server
pub struct FormServer {
    title: String,
    header: String,
    handler: Handler,
    io_timeout: Duration,
}

impl FormServer {
    pub fn new(title: impl Into<String>, header: impl Into<String>, handler: Handler) -> Self {
        Self {
            title: title.into(),
            header: header.into(),
            handler,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Read and write timeout applied to each connection
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Bind `addr` and serve until the process is stopped
    pub fn serve(&mut self, addr: &str) -> AgentResult<()> {
        let listener = TcpListener::bind(addr)?;
        info!("Serving form on http://{}", listener.local_addr()?);
        self.serve_listener(listener)
    }

    /// Serve connections from an already bound listener, one at a time
    pub fn serve_listener(&mut self, listener: TcpListener) -> AgentResult<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.handle_connection(stream) {
                        warn!("Connection failed: {}", e);
                    }
                }
                Err(e) => warn!("Accept failed: {}", e),
            }
        }
        Ok(())
    }

    fn handle_connection(&mut self, mut stream: TcpStream) -> AgentResult<()> {
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        let parsed = {
            let mut reader = BufReader::new(&mut stream);
            parse_request(&mut reader)
        };
        let response = match parsed {
            Ok(request) => self.handle_request(&request),
            Err(e) => match rejection(&e) {
                Some(response) => response,
                None => {
                    warn!("Dropping connection: {}", e);
                    return Ok(());
                }
            },
        };
        stream.write_all(response.to_http().as_bytes())?;
        stream.flush()?;
        Ok(())
    }

    /// Route one request
    pub fn handle_request(&mut self, request: &Request) -> Response {
        if request.path != "/" {
            return Response {
                status: 404,
                body: "Not Found".to_string(),
            };
        }

        match request.method.as_str() {
            "GET" => Response {
                status: 200,
                body: self.render_page("", None),
            },
            "POST" => {
                let question = form_field(&request.body, "query").unwrap_or_default();
                let question = question.trim();
                let result = if question.is_empty() {
                    Outcome::Error(EMPTY_QUERY_MESSAGE.to_string())
                } else {
                    info!("Form question: {}", question);
                    match (self.handler)(question) {
                        Ok(markdown) => Outcome::Answer(markdown),
                        Err(e) => {
                            error!("Error running the agent: {}", e);
                            Outcome::Error(format!("Error running the agent: {e}"))
                        }
                    }
                };
                Response {
                    status: 200,
                    body: self.render_page(question, Some(&result)),
                }
            }
            _ => Response {
                status: 405,
                body: "Method Not Allowed".to_string(),
            },
        }
    }

    fn render_page(&self, question: &str, outcome: Option<&Outcome>) -> String {
        let result = match outcome {
            None => String::new(),
            Some(Outcome::Answer(markdown)) => {
                format!("<div class=\"answer\">{}</div>", markdown_to_html(markdown))
            }
            Some(Outcome::Error(message)) => {
                format!("<div class=\"error\">{}</div>", escape_html(message))
            }
        };

        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
             <h1>{title}</h1>\n<h2>{header}</h2>\n\
             <form method=\"post\" action=\"/\">\n\
             <label for=\"query\">Enter your query:</label>\n\
             <input type=\"text\" id=\"query\" name=\"query\" value=\"{value}\">\n\
             <button type=\"submit\">Run Query</button>\n</form>\n{result}\n</body>\n</html>\n",
            title = escape_html(&self.title),
            header = escape_html(&self.header),
            value = escape_html(question),
            result = result
        )
    }
}

enum Outcome {
    Answer(String),
    Error(String),
}

/// Response for a request that could not be read
///
/// `None` means the client went silent and gets no answer.
pub fn rejection(error: &AgentError) -> Option<Response> {
    match error {
        AgentError::Io(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ) =>
        {
            None
        }
        AgentError::PayloadTooLarge { .. } => {
            warn!("Rejected request: {}", error);
            Some(Response {
                status: 413,
                body: "Payload Too Large".to_string(),
            })
        }
        _ => {
            warn!("Bad request: {}", error);
            Some(Response {
                status: 400,
                body: "Bad Request".to_string(),
            })
        }
    }
}

/// Read the request line, headers and body from `reader`
///
/// # Errors
/// * [`AgentError::PayloadTooLarge`] - the declared body exceeds [`MAX_BODY_BYTES`]
/// * [`AgentError::Io`] - the client closed or timed out mid-request
pub fn parse_request<R: BufRead>(reader: &mut R) -> AgentResult<Request> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(AgentError::PayloadTooLarge {
            length: content_length,
            limit: MAX_BODY_BYTES,
        });
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// Value of `name` in an `application/x-www-form-urlencoded` body
pub fn form_field(body: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Render Markdown with raw HTML shown as text
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
