//! Parsers for flow step input
//!
//! A `None` result means the step re-prompts and the flow stays put.

use super::state::TokenPair;

/// `IN/OUT`: exactly two non-empty parts around a single `/`
pub fn parse_token_pair(input: &str) -> Option<TokenPair> {
    let parts: Vec<&str> = input.split('/').collect();
    let [token_in, token_out] = parts.as_slice() else {
        return None;
    };
    let (token_in, token_out) = (token_in.trim(), token_out.trim());
    if token_in.is_empty() || token_out.is_empty() {
        return None;
    }
    Some(TokenPair {
        token_in: token_in.to_uppercase(),
        token_out: token_out.to_uppercase(),
    })
}

/// `TOKEN amount` split on a single space.
///
/// The amount is kept literally; it is not checked to be numeric.
pub fn parse_buy_details(input: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = input.trim().split(' ').collect();
    let [token, amount] = parts.as_slice() else {
        return None;
    };
    if token.is_empty() || amount.is_empty() {
        return None;
    }
    Some((token.to_uppercase(), (*amount).to_string()))
}

/// Swap amounts are accepted as typed, minus surrounding whitespace
pub fn parse_amount(input: &str) -> String {
    input.trim().to_string()
}
