use std::collections::HashMap;

use crate::http::request::{Method, Request};
use crate::log::Logger;

const CRLF: &[u8] = b"\r\n";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Outcome of checking an accumulation buffer for a full request.
#[derive(Debug)]
pub enum Assembly {
    /// Header block not terminated yet, or body still short
    Incomplete,
    /// A request is ready for routing (it may still be `valid == false`)
    Complete(Request),
    /// The body already exceeds the announced `Content-Length`
    Overrun(Request),
}

/// Checks whether `buf` holds a complete request and parses it if so.
///
/// Nothing is parsed until the `CRLF CRLF` header terminator shows up; after
/// that, completeness follows [`Request::is_complete`].
pub fn assemble(buf: &[u8], logger: &Logger) -> Assembly {
    if find_headers_end(buf).is_none() {
        return Assembly::Incomplete;
    }

    let request = parse_request(buf, logger);
    if !request.valid || request.is_complete() {
        Assembly::Complete(request)
    } else if request.body_overruns() {
        Assembly::Overrun(request)
    } else {
        Assembly::Incomplete
    }
}

/// Parses raw bytes into a [`Request`].
///
/// Never fails: a request line with fewer than three tokens yields
/// [`Request::invalid`], and header lines without a colon are logged and
/// skipped.
pub fn parse_request(raw: &[u8], logger: &Logger) -> Request {
    let mut rest = raw;

    let request_line = String::from_utf8_lossy(take_line(&mut rest));
    let tokens: Vec<&str> = request_line.split_whitespace().collect();
    if tokens.len() < 3 {
        logger.warning(format!("Malformed request line: {:?}", request_line));
        return Request::invalid();
    }

    let method = Method::from_token(tokens[0]);

    let (path, query) = match tokens[1].split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tokens[1], None),
    };

    let mut request = Request {
        method,
        path: path.to_string(),
        version: tokens[2].to_string(),
        ..Request::default()
    };

    if let Some(query) = query {
        request.query_params = parse_form_pairs(query);
        request.url_parameters = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
    }

    while !rest.is_empty() {
        let line = take_line(&mut rest);
        if line.is_empty() {
            break;
        }
        parse_header_line(&String::from_utf8_lossy(line), &mut request.headers, logger);
    }

    request.body = rest.to_vec();

    if method == Method::POST {
        if let Some(line) = last_non_empty_line(&request.body) {
            request.post_params = parse_form_pairs(&String::from_utf8_lossy(line));
        }
    }

    request.valid = true;
    request
}

/// Splits `name=value&name=value`.
///
/// Empty segments are skipped; a pair survives only when it has exactly one
/// non-empty name and one non-empty value.
pub fn parse_form_pairs(input: &str) -> HashMap<String, String> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let parts: Vec<&str> = pair.split('=').filter(|p| !p.is_empty()).collect();
            match parts.as_slice() {
                [name, value] => Some((name.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Position of the `CRLF CRLF` that ends the header block.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Removes and returns the next CRLF-delimited line. Without a CRLF the whole
/// remainder is the line.
fn take_line<'a>(rest: &mut &'a [u8]) -> &'a [u8] {
    let buf = *rest;
    match buf.windows(CRLF.len()).position(|w| w == CRLF) {
        Some(pos) => {
            *rest = &buf[pos + CRLF.len()..];
            &buf[..pos]
        }
        None => {
            *rest = &[];
            buf
        }
    }
}

fn parse_header_line(line: &str, headers: &mut HashMap<String, String>, logger: &Logger) {
    match line.split_once(':') {
        Some((name, value)) => {
            headers.insert(name.to_string(), value.trim().to_string());
        }
        None => logger.warning(format!("Invalid header line found {}", line)),
    }
}

fn last_non_empty_line(body: &[u8]) -> Option<&[u8]> {
    body.split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .rev()
        .find(|line| !line.is_empty())
}
