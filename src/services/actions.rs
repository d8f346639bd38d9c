/// What the presentation layer should do with a resolved stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Open the stream directly
    Open(String),
    /// Hand the link to the user's clipboard
    Copy(String),
}

/// Terminal action applied to a resolved stream URL
pub trait StreamAction: Send + Sync {
    fn name(&self) -> &'static str;
    fn perform(&self, stream_url: &str) -> ActionOutcome;
}

pub struct OpenStream;

impl StreamAction for OpenStream {
    fn name(&self) -> &'static str {
        "open"
    }

    fn perform(&self, stream_url: &str) -> ActionOutcome {
        ActionOutcome::Open(stream_url.to_string())
    }
}

pub struct CopyLink;

impl StreamAction for CopyLink {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn perform(&self, stream_url: &str) -> ActionOutcome {
        ActionOutcome::Copy(stream_url.to_string())
    }
}

static ACTIONS: [&dyn StreamAction; 2] = [&OpenStream, &CopyLink];

/// Look up a registered action by name
pub fn action_by_name(name: &str) -> Option<&'static dyn StreamAction> {
    ACTIONS.iter().copied().find(|a| a.name() == name)
}
