//! Pipeline description rendering.
//!
//! Every test pipeline has the same shape: a class-appropriate test source,
//! a capsfilter pinning the configuration under test, and the sink itself.
//! The caps are rendered without spaces so the whole filter fits in a single
//! launch token and needs no shell-style quoting.

use sinkcheck_caps::Configuration;
use sinkcheck_core::{SinkClass, SinkId};

/// Renders a configuration as a caps string with no whitespace, suitable for
/// embedding in a `capsfilter caps=` launch token.
pub fn compact_caps(config: &Configuration) -> String {
    let mut out = config.name().to_string();
    for (name, value) in config.fields() {
        out.push(',');
        out.push_str(name);
        out.push('=');
        out.push_str(&value.caps_token());
    }
    out
}

/// Builds the argument vector handed to `gst-launch-1.0` for one
/// configuration. The sink element is always named `sink`.
pub fn launch_args(class: SinkClass, sink: &SinkId, config: &Configuration) -> Vec<String> {
    vec![
        class.source_element().to_string(),
        "!".to_string(),
        "capsfilter".to_string(),
        format!("caps={}", compact_caps(config)),
        "!".to_string(),
        sink.as_str().to_string(),
        "name=sink".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinkcheck_caps::{Fraction, Value};

    fn video_config() -> Configuration {
        Configuration::new(
            "video/x-raw",
            vec![
                ("width".to_string(), Value::Int(320)),
                ("height".to_string(), Value::Int(240)),
                (
                    "framerate".to_string(),
                    Value::Fraction(Fraction::new(25, 1)),
                ),
            ],
        )
    }

    #[test]
    fn test_compact_caps_has_no_spaces() {
        let caps = compact_caps(&video_config());
        assert_eq!(
            caps,
            "video/x-raw,width=(int)320,height=(int)240,framerate=(fraction)25/1"
        );
        assert!(!caps.contains(' '));
    }

    #[test]
    fn test_compact_caps_name_only() {
        let config = Configuration::new("audio/x-raw", vec![]);
        assert_eq!(compact_caps(&config), "audio/x-raw");
    }

    #[test]
    fn test_video_launch_args() {
        let args = launch_args(
            SinkClass::Video,
            &SinkId::from("xvimagesink"),
            &video_config(),
        );
        assert_eq!(
            args,
            vec![
                "videotestsrc",
                "!",
                "capsfilter",
                "caps=video/x-raw,width=(int)320,height=(int)240,framerate=(fraction)25/1",
                "!",
                "xvimagesink",
                "name=sink",
            ]
        );
    }

    #[test]
    fn test_audio_launch_uses_audio_source() {
        let config = Configuration::new(
            "audio/x-raw",
            vec![("rate".to_string(), Value::Int(44100))],
        );
        let args = launch_args(SinkClass::Audio, &SinkId::from("pulsesink"), &config);
        assert_eq!(args[0], "audiotestsrc");
        assert_eq!(args[3], "caps=audio/x-raw,rate=(int)44100");
        assert_eq!(args[5], "pulsesink");
    }
}
