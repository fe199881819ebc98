//! Wire payload passed from hop to hop.

use serde::{Deserialize, Serialize};

/// Body returned by every successfully processed hop.
pub const ACKNOWLEDGEMENT: &str = "Message received and forwarded (maybe)";

/// Message carried along a chain.
///
/// `original_text` is set by the first caller and never changes.
/// `modified_text` is empty on the first hop and carries the previous
/// hop's output afterwards. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub original_text: String,
    pub modified_text: String,
}

/// Position of a hop within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopKind {
    First,
    Relay,
}

impl HopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HopKind::First => "first",
            HopKind::Relay => "relay",
        }
    }
}

impl Envelope {
    /// Envelope that starts a new chain.
    pub fn first_hop(text: impl Into<String>) -> Self {
        Self {
            original_text: text.into(),
            modified_text: String::new(),
        }
    }

    pub fn is_first_hop(&self) -> bool {
        self.modified_text.is_empty()
    }

    pub fn hop_kind(&self) -> HopKind {
        if self.is_first_hop() {
            HopKind::First
        } else {
            HopKind::Relay
        }
    }

    /// Text this hop mutates: the previous output, or the original on the
    /// first hop.
    pub fn working_text(&self) -> &str {
        if self.is_first_hop() {
            &self.original_text
        } else {
            &self.modified_text
        }
    }

    /// Envelope for the next hop, keeping the original text.
    pub fn into_next_hop(self, modified_text: String) -> Self {
        Self {
            original_text: self.original_text,
            modified_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"original_text":"hello world","modified_text":""}"#).unwrap();
        assert_eq!(envelope, Envelope::first_hop("hello world"));

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["original_text"], "hello world");
        assert_eq!(json["modified_text"], "");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let envelope: Envelope = serde_json::from_str(r#"{"original_text":"hi"}"#).unwrap();
        assert!(envelope.is_first_hop());

        let envelope: Envelope = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.working_text(), "");
    }

    #[test]
    fn test_working_text_and_next_hop() {
        let first = Envelope::first_hop("hello world");
        assert_eq!(first.hop_kind(), HopKind::First);
        assert_eq!(first.working_text(), "hello world");

        let relay = first.into_next_hop("changed world".into());
        assert_eq!(relay.hop_kind(), HopKind::Relay);
        assert_eq!(relay.working_text(), "changed world");
        assert_eq!(relay.original_text, "hello world");

        let again = relay.into_next_hop("changed changed".into());
        assert_eq!(again.original_text, "hello world");
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(serde_json::from_str::<Envelope>(r#"{"original_text":5}"#).is_err());
        assert!(serde_json::from_str::<Envelope>("not json").is_err());
    }
}
