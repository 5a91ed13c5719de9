//! System prompt sent with free-text chat calls

use crate::gateway::ActionKind;
use std::fmt::Write;

/// Base system prompt establishing the assistant's role
const BASE_PROMPT: &str = r"You are Nero, a helpful assistant inside a DeFi portfolio dashboard. Answer questions about the user's portfolio, tokens and DeFi concepts, or just chat.

Be concise in your responses. Never ask for seed phrases or private keys.";

/// Build the system prompt, listing the quick actions the dashboard offers
pub fn build_system_prompt(swap_network: &str) -> String {
    let mut prompt = BASE_PROMPT.to_string();

    prompt.push_str(
        "\n\nThe user can run these actions with the quick-action buttons below the chat:\n",
    );
    for kind in ActionKind::ALL {
        let how = if kind.collects_input() {
            "asks for its details step by step"
        } else {
            "runs a demo with sample parameters"
        };
        let _ = writeln!(prompt, "- {kind}: {how}");
    }
    let _ = write!(
        prompt,
        "\nSwaps run on the {swap_network} network. If the user asks you to perform one of \
         these actions, point them to its button instead of pretending to do it."
    );

    prompt
}
