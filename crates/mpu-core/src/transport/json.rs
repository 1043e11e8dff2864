//! JSON POST for the session API.

use super::CurlOptions;

/// POST `body` (already serialized JSON) to `url`. Returns the status code and
/// raw response body; callers decide what a non-2xx status means.
pub(crate) fn post_json(
    url: &str,
    body: &[u8],
    bearer: Option<&str>,
    opts: &CurlOptions,
) -> Result<(u32, Vec<u8>), curl::Error> {
    let mut response = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    opts.apply(&mut easy)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    list.append("Accept: application/json")?;
    list.append("Expect:")?;
    if let Some(token) = bearer {
        list.append(&format!("Authorization: Bearer {}", token.trim()))?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    Ok((code, response))
}
