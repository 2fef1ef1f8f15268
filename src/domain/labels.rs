// ============================================================
// Layer 1 - Labels and Sentinels
// ============================================================
// The tag set is a configuration constant. A corpus may carry
// other labels; they are mapped to `unclear` at lookup time.
//
// An earlier five-level scale (probably_not_exploited ..
// probably_exploited) was collapsed into the three labels
// below.

/// Padding sentinel, always id 0 in the word and char tables.
pub const PAD: &str = "<PAD>";

/// Default unknown-token sentinel, always id 1 in the word and
/// char tables. Pretrained embeddings may rename it.
pub const UNK: &str = "<UNK>";

pub const PAD_INDEX: usize = 0;
pub const UNK_INDEX: usize = 1;

/// Exploitability labels, in id order.
pub const TAGS: [&str; 3] = [
    "unlikely_to_be_exploited",
    "unclear",
    "could_be_exploited",
];

/// Label used for any tag outside `TAGS`.
pub const DEFAULT_TAG: &str = "unclear";

/// The marker carried by tokens that name a CVE.
pub const CVE_FLAG: &str = "cve";

/// Flag enumeration, in id order. Unknown flags map to `PAD`.
pub const CVE_FLAGS: [&str; 2] = [PAD, CVE_FLAG];

/// Characters kept per word when encoding characters.
pub const DEFAULT_MAX_CHAR_LEN: usize = 20;
