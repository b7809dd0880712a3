mod common;
mod filter;
mod templates;
