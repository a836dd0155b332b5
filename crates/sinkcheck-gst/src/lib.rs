//! GStreamer process backend for the sinkcheck harness
//!
//! Implements the runtime seam on top of the stock command line tools, so
//! the harness needs a GStreamer install but no native bindings. Discovery
//! scrapes `gst-inspect-1.0`; playback shells out to `gst-launch-1.0` with a
//! capsfilter pinning the configuration under test.

pub mod inspect;
pub mod launch;
pub mod runtime;

pub use inspect::{inspect_sink, scrape_inspect, InspectReport};
pub use launch::{compact_caps, launch_args};
pub use runtime::{GstLaunchOptions, GstLaunchRuntime};
