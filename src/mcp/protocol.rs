use super::types::*;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// One line of input that could not be decoded as a request
#[derive(Debug)]
pub struct MalformedLine {
    pub line: String,
    pub error: serde_json::Error,
    /// `true` when the line was valid JSON but not a JSON-RPC request
    pub invalid_request: bool,
    /// Request id recovered from a well-formed but invalid request
    pub id: Value,
}

impl MalformedLine {
    pub fn to_error(&self) -> JsonRpcError {
        if self.invalid_request {
            JsonRpcError::invalid_request()
        } else {
            JsonRpcError::parse_error()
        }
    }
}

/// Line-delimited JSON-RPC framing over any async reader/writer pair
pub struct Protocol<R, W> {
    reader: R,
    writer: W,
}

impl Protocol<BufReader<Stdin>, Stdout> {
    /// MCP stdio transport
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Protocol<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read next JSON-RPC request. `Ok(None)` on EOF; a line that is not a
    /// valid request is returned as `Err(MalformedLine)` so the caller can
    /// answer it and keep reading.
    pub async fn read_request(&mut self) -> Result<Option<std::result::Result<JsonRpcRequest, MalformedLine>>> {
        loop {
            let mut line = Vec::new();
            let read = self
                .reader
                .read_until(b'\n', &mut line)
                .await
                .context("Failed to read from transport")?;
            if read == 0 {
                return Ok(None); // EOF
            }

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(decode_request(trimmed)));
        }
    }

    /// Send JSON-RPC response as one line
    pub async fn send_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let json = serde_json::to_string(&response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Bytes that are not JSON are a parse error; JSON that is not a request
/// is an invalid request.
fn decode_request(bytes: &[u8]) -> std::result::Result<JsonRpcRequest, MalformedLine> {
    let value: Value = serde_json::from_slice(bytes).map_err(|error| MalformedLine {
        line: String::from_utf8_lossy(bytes).into_owned(),
        error,
        invalid_request: false,
        id: Value::Null,
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|error| MalformedLine {
        line: String::from_utf8_lossy(bytes).into_owned(),
        error,
        invalid_request: true,
        id,
    })
}

/// Create success response
pub fn success_response<T: Serialize>(id: Value, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(value),
            error: None,
        },
        Err(e) => error_response(id, JsonRpcError::internal_error(format!("Failed to encode result: {}", e))),
    }
}

/// Create error response
pub fn error_response(id: Value, error: JsonRpcError) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(error),
    }
}
