// source.rs - Inbound message feed: one JSON envelope per line, as forwarded from the bus

use std::io::BufRead;

use serde::Deserialize;

use crate::router::Metadata;

/// A single bus message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub channel: Option<String>,
    pub message: String,
    #[serde(default)]
    pub user_metadata: Metadata,
}

impl Envelope {
    /// Kind discriminator from the `name` metadata field, empty if absent
    pub fn kind(&self) -> &str {
        self.user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// Envelopes from a line-oriented reader. Malformed lines are logged and skipped;
/// iteration ends at EOF or on a read error.
pub struct JsonLinesSource<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Envelope;

    fn next(&mut self) -> Option<Envelope> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    log::error!("inbound channel read failed: {e}");
                    return None;
                }
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str(trimmed) {
                Ok(envelope) => return Some(envelope),
                Err(e) => {
                    log::warn!("skipping malformed envelope on line {}: {e}", self.line_number)
                }
            }
        }
    }
}

/// Drops envelopes addressed to channels we did not subscribe to
pub struct ChannelFilter {
    channels: Vec<String>,
}

impl ChannelFilter {
    pub fn new(channels: Vec<String>) -> Self {
        Self { channels }
    }

    /// Envelopes without a channel, or with no filter configured, always pass
    pub fn accepts(&self, envelope: &Envelope) -> bool {
        match &envelope.channel {
            Some(channel) if !self.channels.is_empty() => {
                self.channels.iter().any(|c| c == channel)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_envelopes_and_skips_garbage() {
        let input = concat!(
            r#"{"channel":"cactuspi","message":"Line 6\nExpress","#,
            r#""userMetadata":{"name":"subway","priority":1}}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"message":"120,58,34000,9000000","userMetadata":{"name":"covid"}}"#,
            "\n",
        );

        let envelopes: Vec<Envelope> = JsonLinesSource::new(Cursor::new(input)).collect();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].kind(), "subway");
        assert_eq!(envelopes[0].message, "Line 6\nExpress");
        assert_eq!(envelopes[0].channel.as_deref(), Some("cactuspi"));
        assert_eq!(envelopes[1].kind(), "covid");
        assert_eq!(envelopes[1].channel, None);
    }

    #[test]
    fn test_missing_metadata_has_empty_kind() {
        let input = Cursor::new(r#"{"message":"x"}"#);
        let envelopes: Vec<Envelope> = JsonLinesSource::new(input).collect();
        assert_eq!(envelopes[0].kind(), "");
    }

    #[test]
    fn test_channel_filter() {
        let filter = ChannelFilter::new(vec!["cactuspi".to_string()]);
        let mut envelope = Envelope {
            channel: Some("cactuspi".to_string()),
            message: String::new(),
            user_metadata: Metadata::new(),
        };
        assert!(filter.accepts(&envelope));

        envelope.channel = Some("other".to_string());
        assert!(!filter.accepts(&envelope));
        assert!(ChannelFilter::new(Vec::new()).accepts(&envelope));

        envelope.channel = None;
        assert!(filter.accepts(&envelope));
    }
}
