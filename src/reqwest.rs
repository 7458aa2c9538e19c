use super::{HttpRequest, HttpResponse};

pub use reqwest;

///
/// Error type returned by failed reqwest HTTP requests.
///
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error returned by reqwest crate.
    #[error("request failed")]
    Reqwest(#[from] ::reqwest::Error),
}

///
/// Synchronous HTTP client.
///
#[cfg(not(target_arch = "wasm32"))]
pub fn http_client(request: HttpRequest) -> Result<HttpResponse, Error> {
    let client = ::reqwest::blocking::Client::builder()
        // Following the recommendation in
        // https://tools.ietf.org/html/rfc6749#section-5.1.2, we disable redirect following
        // entirely.
        .redirect(::reqwest::redirect::Policy::none())
        .build()?;

    let mut request_builder = client
        .request(request.method, request.url.as_str())
        .body(request.body);
    for (name, value) in &request.headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = client.execute(request_builder.build()?)?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let chunks = response.bytes()?;
    Ok(HttpResponse {
        status_code,
        headers,
        body: chunks.to_vec(),
    })
}

///
/// Asynchronous HTTP client.
///
pub async fn async_http_client(request: HttpRequest) -> Result<HttpResponse, Error> {
    let client = ::reqwest::Client::builder()
        // Following the recommendation in
        // https://tools.ietf.org/html/rfc6749#section-5.1.2, we disable redirect following
        // entirely.
        .redirect(::reqwest::redirect::Policy::none())
        .build()?;

    let mut request_builder = client
        .request(request.method, request.url.as_str())
        .body(request.body);
    for (name, value) in &request.headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = client.execute(request_builder.build()?).await?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let chunks = response.bytes().await?;
    Ok(HttpResponse {
        status_code,
        headers,
        body: chunks.to_vec(),
    })
}
