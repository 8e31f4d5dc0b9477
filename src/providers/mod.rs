pub mod gemini;
mod http_errors;
pub mod ollama;
pub mod wikimedia;

#[cfg(test)]
pub(crate) mod test_server;
