// Shared prompt fragments sent with every model call.
// The task prompts themselves are templates on disk, see `crate::prompts`.

/// System prompt for every screener call. Keeps the model on plain text
/// output so the line and score parsers see what they expect.
pub const SCREENER_SYSTEM: &str = "You are an experienced technical interviewer \
    helping screen job candidates. \
    Follow the output format in the user's instructions exactly. \
    Respond in plain text only. \
    Do NOT use markdown formatting or code fences. \
    Do NOT add greetings, preambles or closing remarks.";
