//! Tests for the one-field web form

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use zuluai::error::{AgentError, AgentResult};
use zuluai::web::{FormServer, Handler, Request, EMPTY_QUERY_MESSAGE};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

fn get(path: &str) -> Request {
    Request {
        method: "GET".to_string(),
        path: path.to_string(),
        body: String::new(),
    }
}

fn post(body: &str) -> Request {
    Request {
        method: "POST".to_string(),
        path: "/".to_string(),
        body: body.to_string(),
    }
}

/// Handler that records each question and answers in Markdown
fn recording_handler(seen: &Rc<RefCell<Vec<String>>>) -> Handler {
    let seen = Rc::clone(seen);
    Box::new(move |question: &str| -> AgentResult<String> {
        seen.borrow_mut().push(question.to_string());
        Ok(format!("The answer to *{question}* is **42**."))
    })
}

#[test]
fn test_get_renders_form() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut server = FormServer::new("ZuluAI", "CSV Query AI Agent", recording_handler(&seen));

    let res = server.handle_request(&get("/"));

    assert_eq!(res.status, 200);
    assert!(res.body.contains("<h1>ZuluAI</h1>"));
    assert!(res.body.contains("<h2>CSV Query AI Agent</h2>"));
    assert!(res.body.contains("name=\"query\""));
    assert!(res.body.contains("Run Query"));
    assert!(!res.body.contains(EMPTY_QUERY_MESSAGE));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_post_renders_markdown_answer() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut server = FormServer::new("ZuluAI", "SQL Query AI Agent", recording_handler(&seen));

    let res = server.handle_request(&post("query=average+salary%3F"));

    assert_eq!(res.status, 200);
    assert!(res.body.contains("<em>average salary?</em>"));
    assert!(res.body.contains("<strong>42</strong>"));
    assert!(res.body.contains("value=\"average salary?\""));
    assert_eq!(*seen.borrow(), vec!["average salary?".to_string()]);
}

#[test]
fn test_empty_query_is_not_sent() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut server = FormServer::new("ZuluAI", "CSV Query AI Agent", recording_handler(&seen));

    let res = server.handle_request(&post("query=+++"));

    assert_eq!(res.status, 200);
    assert!(res.body.contains(EMPTY_QUERY_MESSAGE));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_handler_error_is_rendered() {
    let mut server = FormServer::new(
        "ZuluAI",
        "CSV Query AI Agent",
        Box::new(|_question: &str| -> AgentResult<String> {
            Err(AgentError::OutputParse("gibberish".to_string()))
        }),
    );

    let res = server.handle_request(&post("query=anything"));

    assert_eq!(res.status, 200);
    assert!(res.body.contains("Error running the agent: Could not parse LLM output: `gibberish`"));
}

#[test]
fn test_unknown_path_and_method() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut server = FormServer::new("ZuluAI", "CSV Query AI Agent", recording_handler(&seen));

    assert_eq!(server.handle_request(&get("/favicon.ico")).status, 404);

    let delete = Request {
        method: "DELETE".to_string(),
        path: "/".to_string(),
        body: String::new(),
    };
    assert_eq!(server.handle_request(&delete).status, 405);
}

#[test]
fn test_markup_in_question_is_escaped() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut server = FormServer::new("ZuluAI", "CSV Query AI Agent", recording_handler(&seen));

    let res = server.handle_request(&post("query=%22%3E%3Cscript%3E"));

    assert!(res.body.contains("value=\"&quot;&gt;&lt;script&gt;\""));
    assert!(!res.body.contains("<script>"));
}

#[test]
fn test_serves_over_tcp() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    // The server loop never returns, so it runs on a detached thread.
    thread::spawn(move || {
        let mut server = FormServer::new(
            "ZuluAI",
            "CSV Query AI Agent",
            Box::new(|question: &str| -> AgentResult<String> {
                Ok(format!("You asked: {question}"))
            }),
        );
        let _ = server.serve_listener(listener);
    });

    let body = "query=mean+grade";
    let mut stream = TcpStream::connect(addr)?;
    write!(
        stream,
        "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )?;
    stream.flush()?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Connection: close"));
    assert!(response.contains("You asked: mean grade"));
    Ok(())
}

/// Start a form server with a short connection timeout on a detached thread
fn spawn_echo_server() -> std::io::Result<std::net::SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        let mut server = FormServer::new(
            "ZuluAI",
            "CSV Query AI Agent",
            Box::new(|question: &str| -> AgentResult<String> {
                Ok(format!("You asked: {question}"))
            }),
        )
        .with_io_timeout(Duration::from_millis(200));
        let _ = server.serve_listener(listener);
    });
    Ok(addr)
}

/// Send a complete `GET /` and return the whole response
fn fetch_form(addr: std::net::SocketAddr) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(CLIENT_TIMEOUT))?;
    stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    Ok(response)
}

#[test]
fn test_idle_connection_does_not_block_others() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_echo_server()?;

    // Connected first and never sends a byte.
    let _idle = TcpStream::connect(addr)?;

    let response = fetch_form(addr)?;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Run Query"));
    Ok(())
}

#[test]
fn test_short_body_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_echo_server()?;

    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(CLIENT_TIMEOUT))?;
    stream.write_all(b"POST / HTTP/1.1\r\nContent-Length: 50\r\n\r\nquery=ab")?;
    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    assert!(response.is_empty());
    assert!(fetch_form(addr)?.starts_with("HTTP/1.1 200 OK\r\n"));
    Ok(())
}
