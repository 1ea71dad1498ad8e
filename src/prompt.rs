//! Monologue instruction templates.
//!
//! Pure and deterministic: the same prior thought always yields the same prompt.

/// Which template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// No earlier thought in the room
    FreshStart,
    /// Chains onto the most recent thought
    Continuation,
}

/// A composed instruction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub template: PromptTemplate,
    pub text: String,
}

impl Prompt {
    pub fn is_continuation(&self) -> bool {
        self.template == PromptTemplate::Continuation
    }
}

const FRESH_START: &str = "\
You are thinking to yourself. Nobody is addressing you and you are not replying to anyone.

Take a quiet moment to reflect. Consider what is on your mind right now: something you \
have noticed, something you are curious about, or something you would like to understand \
better about yourself or the world.

Write a single, honest, introspective thought in your own voice.";

const CONTINUATION_HEAD: &str = "\
You are continuing an internal monologue. Nobody is addressing you and you are not replying \
to anyone.

Your previous thought was:
";

const CONTINUATION_TAIL: &str = "

What naturally follows from this? Build on it, question it, or let it lead somewhere new. \
Write your next thought in your own voice.";

/// Build the next instruction from the prior thought, if any.
pub fn compose(prior: Option<&str>) -> Prompt {
    match prior {
        None => Prompt {
            template: PromptTemplate::FreshStart,
            text: FRESH_START.to_string(),
        },
        Some(thought) => Prompt {
            template: PromptTemplate::Continuation,
            text: format!("{}\"{}\"{}", CONTINUATION_HEAD, thought, CONTINUATION_TAIL),
        },
    }
}
