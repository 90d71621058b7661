//! Credit role classification into the XMLTV credits vocabulary

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[[:punct:]]").expect("valid punctuation pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Roles permitted inside `<credits>`, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreditRole {
    Director,
    Actor,
    Writer,
    Adapter,
    Producer,
    Composer,
    Editor,
    Presenter,
    Commentator,
    Guest,
}

impl CreditRole {
    pub const ALL: [CreditRole; 10] = [
        CreditRole::Director,
        CreditRole::Actor,
        CreditRole::Writer,
        CreditRole::Adapter,
        CreditRole::Producer,
        CreditRole::Composer,
        CreditRole::Editor,
        CreditRole::Presenter,
        CreditRole::Commentator,
        CreditRole::Guest,
    ];

    /// Element name used inside `<credits>`
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRole::Director => "director",
            CreditRole::Actor => "actor",
            CreditRole::Writer => "writer",
            CreditRole::Adapter => "adapter",
            CreditRole::Producer => "producer",
            CreditRole::Composer => "composer",
            CreditRole::Editor => "editor",
            CreditRole::Presenter => "presenter",
            CreditRole::Commentator => "commentator",
            CreditRole::Guest => "guest",
        }
    }

    /// Position within the DTD credits content model
    pub(crate) fn dtd_rank(&self) -> usize {
        Self::ALL.iter().position(|r| r == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for CreditRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, strip punctuation and join words with `-`
pub fn normalize_role(role: &str) -> String {
    let stripped = PUNCTUATION.replace_all(role, "");
    let lowered = stripped.trim().to_lowercase();
    WHITESPACE.replace_all(&lowered, "-").into_owned()
}

/// Classify a free text role.
///
/// The first canonical role (in priority order) that prefixes the normalised
/// role, or any of its words, wins. Unmatched roles yield `None` and are
/// dropped from the output.
pub fn classify_role(role: &str) -> Option<CreditRole> {
    let normalized = normalize_role(role);
    if normalized.is_empty() {
        return None;
    }
    CreditRole::ALL.into_iter().find(|candidate| {
        let tag = candidate.as_str();
        normalized.starts_with(tag) || normalized.split('-').any(|word| word.starts_with(tag))
    })
}
