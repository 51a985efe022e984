use crate::config::FetchConfig;
use reqwest::Client;

/// Builds the HTTP client used by the fetcher
///
/// Redirects are followed automatically (the response reports the final
/// URL) and compressed bodies are transparently decoded. No cookie store is
/// installed on the client; session state is threaded explicitly through
/// each fetch call instead.
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}
