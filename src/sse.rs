//! Server-Sent Events (SSE) processing for streamed chat responses.
//!
//! The streamed variant of the chat endpoint delivers the response as an
//! event stream: each event's `data:` field carries one JSON-encoded text
//! fragment, and a literal `[DONE]` marks the end of the stream. This module
//! converts the raw byte stream into a stream of text fragments.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::observability;

/// A parsed stream event: either one text fragment or the end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenEvent {
    /// A fragment of response text.
    Delta(String),

    /// The `[DONE]` end-of-stream marker.
    Done,
}

/// Converts a byte stream into a stream of response text fragments.
///
/// The returned stream ends after the `[DONE]` marker (or when the byte
/// stream itself ends); it is finite and cannot be restarted. Fragments are
/// yielded in arrival order.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use futures::stream::{self, StreamExt};
/// use docent::sse::process_token_stream;
///
/// # tokio_test::block_on(async {
/// let bytes = stream::iter(vec![Ok::<_, docent::Error>(Bytes::from_static(
///     b"data: \"Hi\"\n\ndata: [DONE]\n\n",
/// ))]);
/// let fragments: Vec<String> = process_token_stream(bytes)
///     .filter_map(|f| async { f.ok() })
///     .collect()
///     .await;
/// assert_eq!(fragments, vec!["Hi"]);
/// # });
/// ```
pub fn process_token_stream<S>(byte_stream: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<Bytes>> + Unpin + 'static,
{
    // A buffer-and-extract state machine: bytes accumulate until a complete
    // event (terminated by a blank line) can be cut off the front.
    let buffer = String::new();

    stream::unfold(
        (byte_stream, buffer, false),
        move |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }
            loop {
                if let Some((event, remaining)) = extract_fragment(&buffer) {
                    buffer = remaining;
                    return match event {
                        Ok(TokenEvent::Delta(text)) => {
                            observability::STREAM_FRAGMENTS.click();
                            Some((Ok(text), (stream, buffer, false)))
                        }
                        Ok(TokenEvent::Done) => None,
                        Err(e) => {
                            observability::STREAM_ERRORS.click();
                            Some((Err(e), (stream, buffer, true)))
                        }
                    };
                }

                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            observability::STREAM_ERRORS.click();
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer, true),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, true)));
                    }
                    None => {
                        // End of stream; flush anything complete in the buffer.
                        if !buffer.is_empty() {
                            if let Some((event, remaining)) = extract_fragment(&buffer) {
                                buffer = remaining;
                                return match event {
                                    Ok(TokenEvent::Delta(text)) => {
                                        observability::STREAM_FRAGMENTS.click();
                                        Some((Ok(text), (stream, buffer, false)))
                                    }
                                    Ok(TokenEvent::Done) => None,
                                    Err(e) => Some((Err(e), (stream, buffer, true))),
                                };
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extracts a complete SSE event from the front of the buffer.
///
/// Events are delimited by double newlines; the `data:` field carries either
/// a JSON-encoded string fragment or the `[DONE]` marker.
fn extract_fragment(buffer: &str) -> Option<(Result<TokenEvent>, String)> {
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut data = None;
    for line in event_text.lines() {
        if let Some(value) = line.strip_prefix("data: ") {
            data = Some(value);
        }
    }

    match data {
        Some("[DONE]") => Some((Ok(TokenEvent::Done), rest)),
        Some(json_str) => match serde_json::from_str::<String>(json_str) {
            Ok(text) => Some((Ok(TokenEvent::Delta(text)), rest)),
            Err(e) => Some((
                Err(Error::serialization(
                    format!("Failed to parse stream fragment: {e}"),
                    Some(Box::new(e)),
                )),
                rest,
            )),
        },
        // Comment-only or empty events are skipped.
        None => Some((Ok(TokenEvent::Delta(String::new())), rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::iter;

    fn bytes_stream(chunks: Vec<&str>) -> impl Stream<Item = Result<Bytes>> + Unpin {
        iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect_fragments<S: Stream<Item = Result<String>>>(stream: S) -> Vec<String> {
        futures::pin_mut!(stream);
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.expect("fragment"));
        }
        out
    }

    #[test]
    fn extract_single_event() {
        let (event, rest) = extract_fragment("data: \"Hello\"\n\ntail").unwrap();
        assert_eq!(event.unwrap(), TokenEvent::Delta("Hello".to_string()));
        assert_eq!(rest, "tail");
    }

    #[test]
    fn extract_done_marker() {
        let (event, _) = extract_fragment("data: [DONE]\n\n").unwrap();
        assert_eq!(event.unwrap(), TokenEvent::Done);
    }

    #[test]
    fn incomplete_event_waits_for_more_data() {
        assert!(extract_fragment("data: \"partial").is_none());
    }

    #[test]
    fn malformed_payload_is_a_serialization_error() {
        let (event, _) = extract_fragment("data: {not json\n\n").unwrap();
        assert!(matches!(event, Err(Error::Serialization { .. })));
    }

    #[tokio::test]
    async fn fragments_arrive_in_order() {
        let stream = process_token_stream(bytes_stream(vec![
            "data: \"Hello\"\n\ndata: \", \"\n\n",
            "data: \"world\"\n\ndata: [DONE]\n\n",
        ]));
        let fragments = collect_fragments(stream).await;
        assert_eq!(fragments, vec!["Hello", ", ", "world"]);
    }

    #[tokio::test]
    async fn event_split_across_chunks() {
        let stream = process_token_stream(bytes_stream(vec![
            "data: \"Hel",
            "lo\"\n\nda",
            "ta: [DONE]\n\n",
        ]));
        let fragments = collect_fragments(stream).await;
        assert_eq!(fragments, vec!["Hello"]);
    }

    #[tokio::test]
    async fn stream_ends_without_done_marker() {
        let stream = process_token_stream(bytes_stream(vec!["data: \"only\"\n\n"]));
        let fragments = collect_fragments(stream).await;
        assert_eq!(fragments, vec!["only"]);
    }

    #[tokio::test]
    async fn transport_error_terminates_stream() {
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: \"a\"\n\n")),
            Err(Error::streaming("connection reset", None)),
        ];
        let stream = process_token_stream(iter(items));
        futures::pin_mut!(stream);
        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }
}
