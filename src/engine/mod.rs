//! Link-consistency engine for a Markdown note vault.
//!
//! The engine rewrites note content so references stay canonical as notes
//! move and mentions become links: [`LinkEngine::rewrite`] is the single
//! entry point every content write goes through, and the link-graph queries
//! ([`LinkEngine::extract_links`], [`LinkEngine::backlinks`],
//! [`LinkEngine::update_links`]) answer questions about the rewritten corpus.

mod exists;
pub(crate) mod frontmatter;
mod links;
mod mentions;
mod normalize;
mod rewrite;

pub use links::LinkReport;
pub use rewrite::LinkEngine;
