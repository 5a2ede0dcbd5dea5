// Tag extraction: dictionary, prompt building, model-output parsing and validation.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod dictionary;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod validator;
