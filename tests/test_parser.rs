use std::sync::Arc;

use webengine::http::parser::{Assembly, assemble, find_headers_end, parse_form_pairs, parse_request};
use webengine::http::request::{Method, Request};
use webengine::log::{LogLevel, Logger, MemorySink};

fn logger() -> Logger {
    Logger::tracing("test")
}

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /items?a=1&b=2 HTTP/1.1\r\nHost: x\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert!(parsed.valid);
    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/items");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.query_params.get("a").unwrap(), "1");
    assert_eq!(parsed.query_params.get("b").unwrap(), "2");
    assert_eq!(parsed.query_params.len(), 2);
    assert_eq!(parsed.headers.get("Host").unwrap(), "x");
    assert_eq!(parsed.headers.len(), 1);
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_short_request_line_is_invalid() {
    let parsed = parse_request(b"GET /\r\nHost: x\r\n\r\n", &logger());

    assert!(!parsed.valid);
    assert_eq!(parsed, Request::invalid());
    assert!(parsed.headers.is_empty());
    assert!(parsed.path.is_empty());
}

#[test]
fn test_parse_empty_buffer_is_invalid() {
    let parsed = parse_request(b"", &logger());
    assert!(!parsed.valid);
}

#[test]
fn test_parse_extra_request_line_tokens_accepted() {
    let parsed = parse_request(b"GET / HTTP/1.1 trailing junk\r\n\r\n", &logger());

    assert!(parsed.valid);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
}

#[test]
fn test_parse_request_line_whitespace_runs() {
    let parsed = parse_request(b"PUT   /doc \t HTTP/1.0\r\n\r\n", &logger());

    assert!(parsed.valid);
    assert_eq!(parsed.method, Method::PUT);
    assert_eq!(parsed.path, "/doc");
    assert_eq!(parsed.version, "HTTP/1.0");
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("OPTIONS", Method::OPTIONS),
        ("GET", Method::GET),
        ("HEAD", Method::HEAD),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("TRACE", Method::TRACE),
        ("CONNECT", Method::CONNECT),
        ("PATCH", Method::UNKNOWN),
        ("get", Method::UNKNOWN),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let parsed = parse_request(req.as_bytes(), &logger());
        assert!(parsed.valid);
        assert_eq!(parsed.method, expected_method, "method {}", method_str);
    }
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_header_value_trimmed_and_split_at_first_colon() {
    let req = b"GET / HTTP/1.1\r\nReferer:   http://example.com:8080/a   \r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.headers.get("Referer").unwrap(), "http://example.com:8080/a");
}

#[test]
fn test_parse_empty_header_value_is_legal() {
    let parsed = parse_request(b"GET / HTTP/1.1\r\nX-Empty:\r\n\r\n", &logger());

    assert_eq!(parsed.headers.get("X-Empty").unwrap(), "");
}

#[test]
fn test_parse_duplicate_headers_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Tag: first\r\nX-Tag: second\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.headers.get("X-Tag").unwrap(), "second");
    assert_eq!(parsed.headers.len(), 1);
}

#[test]
fn test_parse_header_names_are_case_sensitive() {
    let req = b"GET / HTTP/1.1\r\ncontent-type: text/html\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert!(parsed.headers.contains_key("content-type"));
    assert!(parsed.header("Content-Type").is_none());
}

#[test]
fn test_parse_malformed_header_is_dropped_and_logged() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new("parser", sink.clone());

    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: x\r\n\r\n";
    let parsed = parse_request(req, &logger);

    assert!(parsed.valid);
    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.headers.get("Host").unwrap(), "x");

    let warnings = sink.at_level(LogLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("BrokenHeader"));
    assert_eq!(warnings[0].component, "parser");
}

#[test]
fn test_parse_body_is_raw_bytes_after_header_block() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
    assert!(parsed.is_complete());
}

#[test]
fn test_parse_post_form_parameters() {
    let req = b"POST /form HTTP/1.1\r\nContent-Length: 17\r\n\r\nname=alice&age=30";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.post_params.get("name").unwrap(), "alice");
    assert_eq!(parsed.post_params.get("age").unwrap(), "30");
    assert_eq!(parsed.body, b"name=alice&age=30".to_vec());
}

#[test]
fn test_parse_post_uses_last_body_line_only() {
    let req = b"POST /form HTTP/1.1\r\n\r\nignored=1\r\nkept=2\r\n";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.post_params.len(), 1);
    assert_eq!(parsed.post_params.get("kept").unwrap(), "2");
}

#[test]
fn test_parse_post_params_ignore_headers() {
    let req = b"POST /form HTTP/1.1\r\nCookie: session=abc\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert!(parsed.post_params.is_empty());
}

#[test]
fn test_parse_get_does_not_fill_post_params() {
    let req = b"GET /form HTTP/1.1\r\n\r\na=1";
    let parsed = parse_request(req, &logger());

    assert!(parsed.post_params.is_empty());
    assert_eq!(parsed.body, b"a=1".to_vec());
}

#[test]
fn test_parse_query_string_decoding() {
    let req = b"GET /search?q=hello%20world&x=a+b HTTP/1.1\r\n\r\n";
    let parsed = parse_request(req, &logger());

    assert_eq!(parsed.path, "/search");
    // Raw pairs keep the encoding, url_parameters decode it
    assert_eq!(parsed.query_params.get("q").unwrap(), "hello%20world");
    assert_eq!(parsed.url_parameters.get("q").unwrap(), "hello world");
    assert_eq!(parsed.url_parameters.get("x").unwrap(), "a b");
}

#[test]
fn test_parse_query_split_at_first_question_mark() {
    let parsed = parse_request(b"GET /p?a=1?b HTTP/1.1\r\n\r\n", &logger());

    assert_eq!(parsed.path, "/p");
    assert_eq!(parsed.query_params.get("a").unwrap(), "1?b");
}

#[test]
fn test_parse_empty_query() {
    let parsed = parse_request(b"GET /p? HTTP/1.1\r\n\r\n", &logger());

    assert_eq!(parsed.path, "/p");
    assert!(parsed.query_params.is_empty());
}

#[test]
fn test_parse_missing_final_crlf_is_single_trailing_line() {
    let parsed = parse_request(b"GET / HTTP/1.1\r\nHost: x", &logger());

    assert!(parsed.valid);
    assert_eq!(parsed.headers.get("Host").unwrap(), "x");
    assert!(parsed.body.is_empty());
}

#[test]
fn test_form_pairs_drop_malformed_entries() {
    let pairs = parse_form_pairs("a=1&b&c=&=d&e=f=g&&h=2");

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs.get("a").unwrap(), "1");
    assert_eq!(pairs.get("h").unwrap(), "2");
}

#[test]
fn test_find_headers_end() {
    assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n\r\n"), Some(14));
    assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n"), None);
}

#[test]
fn test_assemble_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    assert!(matches!(assemble(req, &logger()), Assembly::Incomplete));
}

#[test]
fn test_assemble_incomplete_request_partial_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhell";
    assert!(matches!(assemble(req, &logger()), Assembly::Incomplete));
}

#[test]
fn test_assemble_complete_with_exact_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    match assemble(req, &logger()) {
        Assembly::Complete(request) => assert_eq!(request.body, b"hello".to_vec()),
        other => panic!("expected complete request, got {:?}", other),
    }
}

#[test]
fn test_assemble_body_overrun() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 2\r\n\r\nhello";
    assert!(matches!(assemble(req, &logger()), Assembly::Overrun(_)));
}

#[test]
fn test_assemble_without_content_length_completes_at_header_end() {
    let req = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
    assert!(matches!(assemble(req, &logger()), Assembly::Complete(_)));
}

#[test]
fn test_assemble_invalid_request_is_handed_on() {
    match assemble(b"BROKEN\r\n\r\n", &logger()) {
        Assembly::Complete(request) => assert!(!request.valid),
        other => panic!("expected complete request, got {:?}", other),
    }
}

#[test]
fn test_assemble_chunked_is_treated_as_complete() {
    let req = b"POST /api HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel";
    assert!(matches!(assemble(req, &logger()), Assembly::Complete(_)));
}
