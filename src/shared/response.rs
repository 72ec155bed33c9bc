use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

/// Renders the compact JSON error document used for non-streamed responses.
pub fn error_body(status: u16, message: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(48 + message.len());
    let payload = ErrorBody { status, message };
    if sonic_rs::to_writer(&mut buf, &payload).is_err() {
        buf = b"{\"status\":500,\"message\":\"failed to serialize error\"}".to_vec();
    }
    buf.push(b'\n');
    buf
}
