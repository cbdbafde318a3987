//! Topic command implementation.

use super::generate::read_transcript;
use crate::heuristics::extract_topic;
use crate::kit::SourceKind;
use anyhow::Result;

/// Print the topic the resources stage would search for.
pub fn run_topic(input: &str, inline: bool) -> Result<()> {
    let transcript = read_transcript(input, inline, SourceKind::Text)?;
    println!("{}", extract_topic(&transcript.text));
    Ok(())
}
