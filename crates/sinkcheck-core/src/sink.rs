//! Sink identity and classification

use serde::{Deserialize, Serialize};

/// Name of the sink element under test (e.g. `xvimagesink`, `pulsesink`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SinkId(pub String);

impl SinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SinkId {
    fn from(s: &str) -> Self {
        SinkId(s.to_string())
    }
}

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a sink consumes audio or video buffers.
///
/// Decides which test source feeds the pipeline while a person judges the
/// sink's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkClass {
    Audio,
    Video,
}

impl SinkClass {
    /// Classify an element klass string such as `Sink/Video`.
    ///
    /// The klass must carry a `Sink` segment plus an `Audio` or `Video`
    /// segment; anything else is not a testable sink.
    pub fn from_klass(klass: &str) -> Option<SinkClass> {
        let mut is_sink = false;
        let mut class = None;
        for segment in klass.split('/') {
            match segment.trim() {
                "Sink" => is_sink = true,
                "Video" => class = class.or(Some(SinkClass::Video)),
                "Audio" => class = class.or(Some(SinkClass::Audio)),
                _ => {}
            }
        }
        if is_sink {
            class
        } else {
            None
        }
    }

    /// Test source element that feeds this kind of sink.
    pub fn source_element(&self) -> &'static str {
        match self {
            SinkClass::Audio => "audiotestsrc",
            SinkClass::Video => "videotestsrc",
        }
    }
}

impl std::fmt::Display for SinkClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkClass::Audio => write!(f, "audio"),
            SinkClass::Video => write!(f, "video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_klass_classification() {
        assert_eq!(SinkClass::from_klass("Sink/Video"), Some(SinkClass::Video));
        assert_eq!(SinkClass::from_klass("Sink/Audio"), Some(SinkClass::Audio));
        assert_eq!(
            SinkClass::from_klass("Sink/Video/Overlay"),
            Some(SinkClass::Video)
        );
    }

    #[test]
    fn test_non_sinks_and_other_sinks_are_rejected() {
        assert_eq!(SinkClass::from_klass("Filter/Converter/Video"), None);
        assert_eq!(SinkClass::from_klass("Sink"), None);
        assert_eq!(SinkClass::from_klass("Sink/File"), None);
        assert_eq!(SinkClass::from_klass("Source/Video"), None);
    }

    #[test]
    fn test_source_elements_match_the_class() {
        assert_eq!(SinkClass::Video.source_element(), "videotestsrc");
        assert_eq!(SinkClass::Audio.source_element(), "audiotestsrc");
    }
}
