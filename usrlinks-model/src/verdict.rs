use std::fmt;

use serde::{Deserialize, Serialize};

/// Tri-state outcome of one probe.
///
/// `Present` means the platform reported the handle as unregistered (the
/// handle is available), `Absent` means a profile exists (the handle is
/// taken), and `Indeterminate` means no verdict could be computed. An
/// indeterminate verdict is never a "no".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Present,
    Absent,
    Indeterminate,
}

impl Verdict {
    pub fn is_determinate(self) -> bool {
        !matches!(self, Verdict::Indeterminate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Present => "present",
            Verdict::Absent => "absent",
            Verdict::Indeterminate => "indeterminate",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
