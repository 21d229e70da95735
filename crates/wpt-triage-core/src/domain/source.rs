use serde::{Deserialize, Serialize};

/// Where an observation came from.
///
/// Variant order is the display priority used when listing engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "mozilla")]
    Mozilla,
    #[serde(rename = "chromium")]
    Chromium,
    #[serde(rename = "webkit")]
    Webkit,
    #[serde(rename = "web-platform-tests")]
    WebPlatformTests,
}

impl Source {
    /// Browser engines, in display priority. The issue tracker is not an engine.
    pub const ENGINES: [Source; 3] = [Source::Mozilla, Source::Chromium, Source::Webkit];

    pub const fn name(self) -> &'static str {
        match self {
            Source::Mozilla => "mozilla",
            Source::Chromium => "chromium",
            Source::Webkit => "webkit",
            Source::WebPlatformTests => "web-platform-tests",
        }
    }

    /// Only the issue tracker files wildcard entries like `/css/foo/*`.
    pub const fn supports_wildcards(self) -> bool {
        matches!(self, Source::WebPlatformTests)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
